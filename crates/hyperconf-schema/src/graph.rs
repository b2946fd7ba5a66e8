//! Field dependency graph.
//!
//! Edges point from a parent field to a child field: when values are applied,
//! the parent is always considered before the child. The graph stays acyclic;
//! every rejected mutation leaves it untouched.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

use crate::{ConfError, ConfResult};

/// A directed acyclic graph over field names.
///
/// # Example
///
/// ```
/// use hyperconf_schema::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// for field in ["rate", "epochs", "warmup"] {
///     graph.add_node(field);
/// }
/// graph.add_dependency("epochs", "warmup").unwrap();
/// assert!(graph.add_dependency("warmup", "epochs").is_err());
/// assert_eq!(graph.topological_order(), vec!["rate", "epochs", "warmup"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    // Node -> children, in node insertion order.
    adjacency: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.adjacency.contains_key(&name) {
            return false;
        }
        self.adjacency.insert(name, IndexSet::new());
        true
    }

    /// Whether `name` is a node.
    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
    }

    /// Whether the edge `parent -> child` exists.
    pub fn has_edge(&self, parent: &str, child: &str) -> bool {
        self.adjacency
            .get(parent)
            .is_some_and(|children| children.contains(child))
    }

    /// Whether `to` is reachable from `from`. Every node reaches itself.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }

        let mut seen = IndexSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            if let Some(children) = self.adjacency.get(node) {
                stack.extend(children.iter().map(String::as_str));
            }
        }
        false
    }

    /// Declares that `parent` must be considered before `child`.
    ///
    /// # Errors
    ///
    /// - [`ConfError::UnknownField`] if either name is not a node
    /// - [`ConfError::Cycle`] if `parent == child` or `child` already reaches `parent`
    /// - [`ConfError::DuplicateEdge`] if the edge already exists
    pub fn add_dependency(&mut self, parent: &str, child: &str) -> ConfResult<()> {
        for name in [parent, child] {
            if !self.contains(name) {
                return Err(ConfError::unknown_field(name));
            }
        }
        if parent == child || self.has_path(child, parent) {
            return Err(ConfError::cycle(parent, child));
        }
        if self.has_edge(parent, child) {
            return Err(ConfError::duplicate_edge(parent, child));
        }

        if let Some(children) = self.adjacency.get_mut(parent) {
            children.insert(child.to_owned());
        }
        Ok(())
    }

    /// Copies every node and edge of `other` into this graph.
    ///
    /// Nothing is copied if any edge of `other` is rejected here.
    pub fn merge(&mut self, other: &Self) -> ConfResult<()> {
        let mut merged = self.clone();
        for node in other.nodes() {
            merged.add_node(node);
        }
        for (parent, child) in other.edges() {
            if !merged.has_edge(parent, child) {
                merged.add_dependency(parent, child)?;
            }
        }
        *self = merged;
        Ok(())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.adjacency.keys().map(String::as_str)
    }

    /// Edges as `(parent, child)` pairs, grouped by parent in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.adjacency.iter().flat_map(|(parent, children)| {
            children
                .iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }

    /// Direct children of `parent`.
    pub fn children<'a>(&'a self, parent: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(parent)
            .into_iter()
            .flat_map(|children| children.iter().map(String::as_str))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Parents-before-children order of all nodes.
    ///
    /// Kahn's algorithm; among the nodes that are ready at each step the one
    /// inserted first wins, so the order is stable for a given graph.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree = vec![0_usize; self.adjacency.len()];
        for (_, child) in self.edges() {
            if let Some(index) = self.adjacency.get_index_of(child) {
                in_degree[index] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();

        let mut order = Vec::with_capacity(self.adjacency.len());
        while let Some(index) = ready.pop_first() {
            let Some((node, children)) = self.adjacency.get_index(index) else {
                continue;
            };
            order.push(node.as_str());
            for child in children {
                if let Some(child_index) = self.adjacency.get_index_of(child) {
                    in_degree[child_index] -= 1;
                    if in_degree[child_index] == 0 {
                        ready.insert(child_index);
                    }
                }
            }
        }
        order
    }
}
