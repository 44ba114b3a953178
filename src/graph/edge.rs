use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Sentinel node for values that come from the task instruction rather than
/// from an upstream action's output.
pub const INSTRUCTION_NODE: &str = "instruction";

/// Comma-joined field lists of one edge. `input` names fields on the
/// destination action, `output` names fields on the source, positionally paired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Connection {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// A directed data-flow relation between two named actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub connection: Connection,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, input: &str, output: &str) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            connection: Connection {
                input: input.to_string(),
                output: output.to_string(),
            },
        }
    }

    /// Splits the connection into positional `input -> output` pairs.
    pub fn links(&self) -> Result<Vec<FieldLink>, (usize, usize)> {
        let inputs = split_fields(&self.connection.input);
        let outputs = split_fields(&self.connection.output);
        if inputs.len() != outputs.len() {
            return Err((inputs.len(), outputs.len()));
        }
        Ok(inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| FieldLink { input, output })
            .collect())
    }
}

/// One field-level connection inside an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLink {
    pub input: String,
    pub output: String,
}

impl FieldLink {
    pub fn label(&self) -> String {
        format!("{}->{}", self.input, self.output)
    }
}

fn split_fields(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(String::from)
        .collect()
}

/// Joins field names the way connections are written: `a, b, c`.
pub(crate) fn join_fields<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.format(", ").to_string()
}
