use super::edge::{Edge, FieldLink, join_fields};
use crate::action::ActionStore;
use crate::error::GraphError;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde_json::{Value, json};

/// Editable data-flow graph between actions.
///
/// There is at most one edge per ordered `(from, to)` pair. Adding a second
/// edge for the same pair appends its field links to the existing one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EdgeGraph {
    nodes: IndexSet<String>,
    edges: IndexMap<(String, String), Vec<FieldLink>>,
}

impl EdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a list of edges, merging repeated pairs.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> bool {
        self.nodes.insert(name.into())
    }

    /// Adds an edge, merging it into an existing edge for the same pair.
    /// Identical field links are only kept once.
    pub fn add_edge(&mut self, edge: &Edge) -> Result<(), GraphError> {
        if edge.from.is_empty() || edge.to.is_empty() {
            return Err(GraphError::InvalidDocument(
                "every edge needs a 'from' and a 'to' node".to_string(),
            ));
        }
        let links = edge
            .links()
            .map_err(|(inputs, outputs)| GraphError::FieldCountMismatch {
                from: edge.from.clone(),
                to: edge.to.clone(),
                inputs,
                outputs,
            })?;

        self.nodes.insert(edge.from.clone());
        self.nodes.insert(edge.to.clone());
        let existing = self
            .edges
            .entry((edge.from.clone(), edge.to.clone()))
            .or_default();
        for link in links {
            if !existing.contains(&link) {
                existing.push(link);
            }
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        self.edges
            .shift_remove(&(from.to_string(), to.to_string()))
            .is_some()
    }

    /// Replaces the whole graph with the edges of a graph or task document.
    ///
    /// Accepts `{edges: [...]}` or `{task: {edges: [...]}}`. Nothing changes
    /// when the document is rejected. Returns the number of merged edges.
    pub fn import(&mut self, document: &Value) -> Result<usize, GraphError> {
        let raw = match document.get("edges") {
            Some(edges @ Value::Array(_)) => edges,
            _ => document
                .get("task")
                .and_then(|task| task.get("edges"))
                .filter(|edges| edges.is_array())
                .ok_or_else(|| {
                    GraphError::InvalidDocument("no 'edges' list found".to_string())
                })?,
        };
        let edges: Vec<Edge> = serde_json::from_value(raw.clone())
            .map_err(|e| GraphError::InvalidDocument(e.to_string()))?;

        let graph = Self::from_edges(&edges)?;
        log::info!(
            "Imported {} edge(s) merged into {} between {} node(s)",
            edges.len(),
            graph.edges.len(),
            graph.nodes.len()
        );
        *self = graph;
        Ok(self.edges.len())
    }

    /// One edge per pair, field lists joined with `, `.
    pub fn export(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|((from, to), links)| {
                Edge::new(
                    from.clone(),
                    to.clone(),
                    &join_fields(links.iter().map(|l| l.input.as_str())),
                    &join_fields(links.iter().map(|l| l.output.as_str())),
                )
            })
            .collect()
    }

    pub fn to_document(&self) -> Value {
        json!({ "edges": self.export() })
    }

    /// Display label of an edge: `input->output` pairs joined with `, `.
    pub fn edge_label(&self, from: &str, to: &str) -> Option<String> {
        self.edges
            .get(&(from.to_string(), to.to_string()))
            .map(|links| links.iter().map(FieldLink::label).join(", "))
    }

    /// Resets the graph to one node per distinct selected operation, in store order.
    pub fn populate_from_actions(&mut self, store: &ActionStore) -> Result<usize, GraphError> {
        let names: IndexSet<String> = store
            .iter()
            .filter_map(|action| action.selected_operation().map(String::from))
            .collect();
        if names.is_empty() {
            return Err(GraphError::NoSelectedOperations);
        }
        self.edges.clear();
        self.nodes = names;
        Ok(self.nodes.len())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}
