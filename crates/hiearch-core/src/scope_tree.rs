//! Scope tree: turns the containment DAG of a view's nodes into strictly
//! nested clusters.
//!
//! Every selected node is walked upward through the scopes that are also
//! selected, producing leaf-first branches. Branches that start at the same
//! node (multi-scoping) are merged into one canonical chain, nodes that are
//! scopes somewhere else are dropped as leaves, and the remaining chains are
//! folded root-first into a nested map.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::trace;

use crate::graph::Graph;
use crate::{Error, Result};

/// Children of one tree level, keyed by node id.
pub type Tree = BTreeMap<String, TreeEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub subtree: Tree,
    /// Dotted path of ids from the root down to this entry.
    pub key_path: String,
}

impl TreeEntry {
    pub fn is_leaf(&self) -> bool {
        self.subtree.is_empty()
    }
}

/// Clustering of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeTree {
    pub roots: Tree,
    /// Every key path a node is reachable under.
    pub key_paths: BTreeMap<String, BTreeSet<String>>,
    /// Immediate children of each scope.
    pub scopes: BTreeMap<String, BTreeSet<String>>,
}

impl ScopeTree {
    /// Build the tree for the node set `view` of `graph`.
    pub fn build(graph: &Graph, view: &BTreeSet<String>) -> Result<Self> {
        let mut walk = BranchWalk::default();
        walk.run(graph, view)?;

        let mut tree = ScopeTree::default();
        for (leaf, chains) in walk.branches {
            if walk.nonleaf.contains(&leaf) {
                continue;
            }
            let mut chains = chains.into_iter();
            let Some(mut chain) = chains.next() else {
                continue;
            };
            for other in chains {
                merge_branch(&mut chain, &other, &walk.rank);
            }
            chain.reverse();
            tree.add_chain(&chain);
        }
        Ok(tree)
    }

    /// Look up the entry at a dotted key path.
    pub fn entry(&self, key_path: &str) -> Option<&TreeEntry> {
        let mut level = &self.roots;
        let mut found = None;
        for id in key_path.split('.') {
            let entry = level.get(id)?;
            level = &entry.subtree;
            found = Some(entry);
        }
        found
    }

    pub fn is_scope(&self, id: &str) -> bool {
        self.scopes.contains_key(id)
    }

    fn add_chain(&mut self, chain: &[String]) {
        let mut level = &mut self.roots;
        for (depth, id) in chain.iter().enumerate() {
            if let Some(child) = chain.get(depth + 1) {
                self.scopes
                    .entry(id.clone())
                    .or_default()
                    .insert(child.clone());
            }
            let entry = level.entry(id.clone()).or_insert_with(|| TreeEntry {
                subtree: Tree::new(),
                key_path: chain[..=depth].join("."),
            });
            self.key_paths
                .entry(id.clone())
                .or_default()
                .insert(entry.key_path.clone());
            level = &mut entry.subtree;
        }
    }
}

/// State of the upward walk over the view's scopes.
#[derive(Default)]
struct BranchWalk {
    /// Leaf-first branches grouped by their leaf.
    branches: BTreeMap<String, Vec<Vec<String>>>,
    /// Nodes that appeared above some other node.
    nonleaf: BTreeSet<String>,
    /// Deepest position each node was reached at; orders merged branches.
    rank: BTreeMap<String, usize>,
}

impl BranchWalk {
    fn run(&mut self, graph: &Graph, view: &BTreeSet<String>) -> Result<()> {
        let mut branch: Vec<String> = Vec::new();
        // frontier[i + 1] holds the unvisited scopes of branch[i]
        let mut frontier: Vec<BTreeSet<String>> = vec![view.clone()];

        while !frontier.is_empty() {
            let mut extended = false;
            while let Some(scope) = frontier.last_mut().and_then(BTreeSet::pop_first) {
                if branch.contains(&scope) {
                    return Err(Error::scope_cycle(&branch, scope)
                        .with_operation("scope_tree::build"));
                }
                if !view.contains(&scope) {
                    continue;
                }

                let parents = graph.node(&scope)?.scope.clone();
                let depth = branch.len();
                if depth > 0 {
                    self.nonleaf.insert(scope.clone());
                }
                let rank = self.rank.entry(scope.clone()).or_default();
                *rank = (*rank).max(depth);

                branch.push(scope);
                frontier.push(parents);
                extended = true;
            }

            if extended {
                if let Some(leaf) = branch.first() {
                    trace!(branch = %branch.join(" -> "), "scope branch");
                    self.branches
                        .entry(leaf.clone())
                        .or_default()
                        .push(branch.clone());
                }
            }

            frontier.pop();
            branch.pop();
        }
        Ok(())
    }
}

/// Fold `other` into `primary`, keeping both leaf-first.
///
/// Nodes already on `primary` are skipped; a new node goes before the first
/// node that sorts after it by `(rank, id)`, looking only past the last
/// matched position.
fn merge_branch(primary: &mut Vec<String>, other: &[String], rank: &BTreeMap<String, usize>) {
    let key = |id: &String| (rank.get(id).copied().unwrap_or_default(), id.clone());
    let mut index = 0;
    for id in other {
        if let Some(position) = primary.iter().position(|existing| existing == id) {
            index = index.max(position + 1);
            continue;
        }
        while index < primary.len() && key(&primary[index]) < key(id) {
            index += 1;
        }
        primary.insert(index, id.clone());
        index += 1;
    }
}
