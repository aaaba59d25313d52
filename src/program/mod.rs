//! Line label storage for tokenized programs
//!
//! Maps each leading line number, as written, to the index of the first token of that
//! line. Execution is strictly sequential, so the map is recorded but never consulted
//! by the dispatcher.

use std::collections::BTreeMap;

/// Line label to token position mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLabels {
    positions: BTreeMap<String, usize>,
}

impl LineLabels {
    /// Create an empty label map
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    /// Record a label; a repeated label points at its latest line
    pub fn insert(&mut self, label: &str, position: usize) {
        self.positions.insert(label.to_string(), position);
    }

    /// Token position of a label
    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Labels in ascending string order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions.iter().map(|(label, pos)| (label.as_str(), *pos))
    }
}
