//! Import graph bookkeeping.
//!
//! Generalized from `csa_todo::dag::DependencyGraph`'s node/edge vectors:
//! here nodes are absolute file paths rather than TODO titles, and the graph
//! exists only to record provenance (which file pulled in which) for
//! diagnostics — cycle detection itself is done inline during the
//! depth-first walk in `lib.rs`, since the resolver already holds the
//! visiting stack it needs for a precise cycle path.

use std::path::PathBuf;

/// One resolved import edge: `from` (the importer) to `to` (the import).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNode {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct ImportGraph {
    root: Option<PathBuf>,
    edges: Vec<ImportNode>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_root(&mut self, root: PathBuf) {
        self.root = Some(root);
    }

    pub fn insert_edge(&mut self, from: PathBuf, to: PathBuf) {
        self.edges.push(ImportNode { from, to });
    }

    pub fn root(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }

    pub fn edges(&self) -> &[ImportNode] {
        &self.edges
    }
}
