//! Boundary to the embedding collaborator.
//!
//! The provider is injected; nothing here holds a client or talks to the
//! network. A failed embedding excludes its item and never fails the batch.

use crate::error::{MatchError, Result};
use crate::matching::vector::validate;
use crate::model::{AssociatedEntity, CandidateRecord, Exclusion, QueryRecord, Vector};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Turns text into an embedding vector.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vector>;
}

impl<F> EmbeddingProvider for F
where
    F: Fn(&str) -> Result<Vector>,
{
    fn embed(&self, text: &str) -> Result<Vector> {
        self(text)
    }
}

/// Raw text for one association (e.g. a portfolio company blurb).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationDocument {
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Raw text for one candidate, ready to embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub associations: Vec<AssociationDocument>,
}

/// Records that embedded successfully, and the ids that did not.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedCandidates {
    pub records: Vec<CandidateRecord>,
    pub excluded: Vec<Exclusion>,
}

/// Embed the founder text. Failure here is fatal to the run.
pub fn embed_query<P: EmbeddingProvider + ?Sized>(
    provider: &P,
    id: &str,
    text: &str,
) -> Result<QueryRecord> {
    let embedding = embed_checked(provider, text)?;
    Ok(QueryRecord::new(id, embedding))
}

/// Embed candidate documents, excluding any whose embedding fails.
///
/// An association whose text fails to embed is kept by name so it still
/// counts toward portfolio overlap.
pub fn embed_candidates<P: EmbeddingProvider + ?Sized>(
    provider: &P,
    docs: &[CandidateDocument],
) -> EmbeddedCandidates {
    let mut out = EmbeddedCandidates::default();
    for doc in docs {
        let embedding = match embed_checked(provider, &doc.text) {
            Ok(v) => v,
            Err(e) => {
                warn!("excluding candidate {}: {e}", doc.id);
                out.excluded.push(Exclusion {
                    id: doc.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let associations = doc
            .associations
            .iter()
            .map(|assoc| {
                let embedding = assoc.text.as_deref().and_then(|text| {
                    embed_checked(provider, text)
                        .map_err(|e| warn!("no embedding for {} of {}: {e}", assoc.name, doc.id))
                        .ok()
                });
                AssociatedEntity {
                    name: assoc.name.clone(),
                    embedding,
                    description: assoc.text.clone(),
                }
            })
            .collect();

        out.records.push(CandidateRecord {
            id: doc.id.clone(),
            embedding,
            associations,
        });
    }
    out
}

/// Call the provider and reject malformed vectors as unavailable.
fn embed_checked<P: EmbeddingProvider + ?Sized>(provider: &P, text: &str) -> Result<Vector> {
    let vector = provider.embed(text).map_err(|e| match e {
        MatchError::EmbeddingUnavailable(_) => e,
        other => MatchError::EmbeddingUnavailable(other.to_string()),
    })?;
    validate(&vector).map_err(|e| MatchError::EmbeddingUnavailable(e.to_string()))?;
    Ok(vector)
}
