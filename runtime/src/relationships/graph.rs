//! Read operations on a built RelationshipGraph.

use crate::error::{MatchError, Result};
use crate::model::{EdgeKind, RelationshipEdge};
use crate::relationships::builder::RelationshipGraphBuilder;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Undirected candidate graph with at most one edge per pair.
///
/// Deserialization replays the edges through the builder, so a document
/// with a self-pair or a repeated pair is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument")]
pub struct RelationshipGraph {
    nodes: BTreeSet<String>,
    edges: Vec<RelationshipEdge>,
}

#[derive(Deserialize)]
struct GraphDocument {
    #[serde(default)]
    nodes: BTreeSet<String>,
    #[serde(default)]
    edges: Vec<RelationshipEdge>,
}

impl TryFrom<GraphDocument> for RelationshipGraph {
    type Error = MatchError;

    fn try_from(doc: GraphDocument) -> Result<Self> {
        let mut builder = RelationshipGraphBuilder::new();
        for node in &doc.nodes {
            builder.add_node(node);
        }
        for edge in &doc.edges {
            if builder.has_edge(&edge.source, &edge.target) {
                return Err(MatchError::InvalidEdge(format!(
                    "repeated pair {} <-> {}",
                    edge.source, edge.target
                )));
            }
            builder.add_edge(&edge.source, &edge.target, edge.kind, edge.weight)?;
        }
        Ok(builder.build())
    }
}

impl RelationshipGraph {
    pub(crate) fn new(nodes: BTreeSet<String>, edges: Vec<RelationshipEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Node ids in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    pub fn edge_between(&self, a: &str, b: &str) -> Option<&RelationshipEdge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    /// Ids adjacent to `id`, sorted.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.source == id {
                    Some(e.target.as_str())
                } else if e.target == id {
                    Some(e.source.as_str())
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Export to a petgraph undirected graph. Node weights are candidate ids.
    pub fn to_petgraph(&self) -> UnGraph<String, RelationshipEdge> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());
        for id in &self.nodes {
            index.insert(id.as_str(), graph.add_node(id.clone()));
        }
        for edge in &self.edges {
            if let (Some(&s), Some(&t)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) {
                graph.add_edge(s, t, edge.clone());
            }
        }
        graph
    }

    /// Number of connected components, isolated nodes included.
    pub fn component_count(&self) -> usize {
        connected_components(&self.to_petgraph())
    }
}
