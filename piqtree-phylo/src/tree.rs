//! Trees returned by IQ-TREE, with the fitted parameters attached.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. Each
//! node owns the parameters of the edge above it; the tree owns the
//! log-likelihood and the raw model blocks.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use piqtree_core::{PiqtreeError, Result, Summarizable};
use serde::{Deserialize, Serialize};

use crate::params::{EdgeParams, TreeParams};

/// Index into the tree's node arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Length of the edge to the parent.
    pub branch_length: Option<f64>,
    pub name: Option<String>,
    /// Model parameters of the edge above this node.
    #[serde(default, skip_serializing_if = "EdgeParams::is_empty")]
    pub params: EdgeParams,
}

impl Node {
    pub(crate) fn detached(id: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            branch_length: None,
            name: None,
            params: EdgeParams::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A rooted tree. IQ-TREE trees are unrooted; the root here is wherever the
/// Newick string put it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhyloTree {
    nodes: Vec<Node>,
    root: NodeId,
    #[serde(default)]
    params: TreeParams,
}

impl PhyloTree {
    /// A tree holding only an unnamed root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(0, None)],
            root: 0,
            params: TreeParams::default(),
        }
    }

    /// Wrap an arena built elsewhere (the Newick reader).
    pub fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Result<Self> {
        match nodes.get(root) {
            Some(node) if node.is_root() => Ok(Self {
                nodes,
                root,
                params: TreeParams::default(),
            }),
            Some(_) => Err(PiqtreeError::InvalidInput(format!(
                "node {root} has a parent and cannot be the root"
            ))),
            None => Err(PiqtreeError::InvalidInput(format!(
                "root {root} outside a {}-node arena",
                nodes.len()
            ))),
        }
    }

    /// Attach a new node under `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        branch_length: Option<f64>,
    ) -> Result<NodeId> {
        let id = self.nodes.len();
        self.nodes
            .get_mut(parent)
            .ok_or_else(|| PiqtreeError::InvalidInput(format!("no node {parent} to attach to")))?
            .children
            .push(id);
        self.nodes.push(Node {
            name,
            branch_length,
            ..Node::detached(id, Some(parent))
        });
        Ok(id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Leaf ids in arena order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|n| n.is_leaf()).map(|n| n.id).collect()
    }

    /// Log-likelihood, model fits and rate block.
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TreeParams {
        &mut self.params
    }

    pub fn lnl(&self) -> Option<f64> {
        self.params.lnl
    }

    /// Node ids, parents before children, children left to right.
    pub fn iter_preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            pending: vec![self.root],
        }
    }

    /// `id` followed by each of its ancestors up to the root.
    fn lineage(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.nodes[n].parent)
    }

    /// Most recent common ancestor of two nodes.
    pub fn mrca(&self, a: NodeId, b: NodeId) -> Result<NodeId> {
        if a.max(b) >= self.nodes.len() {
            return Err(PiqtreeError::InvalidInput(format!(
                "no node {} in a {}-node tree",
                a.max(b),
                self.nodes.len()
            )));
        }
        let above_a: HashSet<NodeId> = self.lineage(a).collect();
        Ok(self
            .lineage(b)
            .find(|n| above_a.contains(n))
            .unwrap_or(self.root))
    }

    /// Tip labels, sorted. Unlabelled tips are skipped.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.is_leaf())
            .filter_map(|n| n.name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Relabel every tip with `rename(current_label)`.
    ///
    /// Fails on an unlabelled tip or on the first error from `rename`.
    pub fn rename_tips<F>(&mut self, mut rename: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        for node in self.nodes.iter_mut().filter(|n| n.is_leaf()) {
            let Some(current) = node.name.as_deref() else {
                return Err(PiqtreeError::InvalidInput(format!(
                    "tip {} has no label",
                    node.id
                )));
            };
            node.name = Some(rename(current)?);
        }
        Ok(())
    }

    /// Path length from the root to each node; a missing length counts as 0.
    fn root_distances(&self) -> Vec<f64> {
        let mut depth = vec![0.0; self.nodes.len()];
        for id in self.iter_preorder() {
            let node = &self.nodes[id];
            if let Some(p) = node.parent {
                depth[id] = depth[p] + node.branch_length.unwrap_or(0.0);
            }
        }
        depth
    }

    /// Patristic distances between all tips.
    ///
    /// Labels come back sorted and the matrix rows follow them, which makes
    /// two renderings of the same unrooted tree directly comparable.
    pub fn tip_to_tip_distances(&self) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
        let mut by_label: BTreeMap<&str, NodeId> = BTreeMap::new();
        for id in self.leaves() {
            let label = self.nodes[id].name.as_deref().ok_or_else(|| {
                PiqtreeError::InvalidInput(format!("tip {id} has no label"))
            })?;
            if by_label.insert(label, id).is_some() {
                return Err(PiqtreeError::InvalidInput(format!(
                    "tip label '{label}' appears more than once"
                )));
            }
        }

        let depth = self.root_distances();
        let tips: Vec<NodeId> = by_label.values().copied().collect();
        let mut matrix = vec![vec![0.0; tips.len()]; tips.len()];
        for (i, &a) in tips.iter().enumerate() {
            for (j, &b) in tips.iter().enumerate().skip(i + 1) {
                let joint = depth[self.mrca(a, b)?];
                let d = depth[a] + depth[b] - 2.0 * joint;
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        let labels = by_label.into_keys().map(str::to_string).collect();
        Ok((labels, matrix))
    }

    /// Same tip labels and every pairwise distance within
    /// `atol + rtol * |other|`.
    pub fn same_tip_distances(&self, other: &PhyloTree, rtol: f64, atol: f64) -> Result<bool> {
        let (labels, mine) = self.tip_to_tip_distances()?;
        let (other_labels, theirs) = other.tip_to_tip_distances()?;
        if labels != other_labels {
            return Ok(false);
        }
        Ok(distances_close(&mine, &theirs, rtol, atol))
    }

    pub fn from_newick(input: &str) -> Result<Self> {
        crate::newick::parse(input)
    }

    pub fn to_newick(&self) -> String {
        crate::newick::write(self)
    }
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhyloTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_newick())
    }
}

impl Summarizable for PhyloTree {
    fn summary(&self) -> String {
        match self.params.lnl {
            Some(lnl) => format!("tree with {} tips, lnL {}", self.leaf_count(), lnl),
            None => format!("tree with {} tips", self.leaf_count()),
        }
    }
}

/// See [`PhyloTree::iter_preorder`].
pub struct Preorder<'a> {
    tree: &'a PhyloTree,
    pending: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

/// Elementwise `|a - b| <= atol + rtol * |b|` over two equally labelled
/// distance matrices.
pub(crate) fn distances_close(a: &[Vec<f64>], b: &[Vec<f64>], rtol: f64, atol: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ra, rb)| {
            ra.len() == rb.len()
                && ra.iter().zip(rb).all(|(x, y)| (x - y).abs() <= atol + rtol * y.abs())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(0:0.1,1:0.2,(2:0.3,3:0.4):0.5);` built by hand.
    fn iqtree_shaped() -> PhyloTree {
        let mut tree = PhyloTree::new();
        let root = tree.root();
        tree.add_child(root, Some("0".into()), Some(0.1)).unwrap();
        tree.add_child(root, Some("1".into()), Some(0.2)).unwrap();
        let clade = tree.add_child(root, None, Some(0.5)).unwrap();
        tree.add_child(clade, Some("2".into()), Some(0.3)).unwrap();
        tree.add_child(clade, Some("3".into()), Some(0.4)).unwrap();
        tree
    }

    #[test]
    fn hand_built_tree_matches_newick() {
        let tree = iqtree_shaped();
        assert_eq!(tree.to_newick(), "(0:0.1,1:0.2,(2:0.3,3:0.4):0.5);");
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn attach_to_missing_parent() {
        let mut tree = PhyloTree::new();
        assert!(tree.add_child(7, None, None).is_err());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn root_must_be_parentless() {
        let tree = iqtree_shaped();
        let nodes = tree.nodes.clone();
        assert!(PhyloTree::from_nodes(nodes.clone(), 3).is_err());
        assert!(PhyloTree::from_nodes(nodes.clone(), 40).is_err());
        assert!(PhyloTree::from_nodes(nodes, 0).is_ok());
    }

    #[test]
    fn preorder_visits_left_to_right() {
        let tree = iqtree_shaped();
        let order: Vec<NodeId> = tree.iter_preorder().collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn mrca_of_tips() {
        let tree = iqtree_shaped();
        assert_eq!(tree.mrca(4, 5).unwrap(), 3);
        assert_eq!(tree.mrca(1, 5).unwrap(), 0);
        assert_eq!(tree.mrca(3, 4).unwrap(), 3);
        assert!(tree.mrca(0, 99).is_err());
    }

    #[test]
    fn tip_distances_sorted_by_label() {
        let tree = PhyloTree::from_newick("((B:0.2,A:0.1):0.3,(C:0.4,D:0.5):0.6);").unwrap();
        let (names, d) = tree.tip_to_tip_distances().unwrap();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert!((d[0][1] - 0.3).abs() < 1e-12);
        // A up to the root and down to C.
        assert!((d[0][2] - 1.4).abs() < 1e-12);
        assert_eq!(d[2][0], d[0][2]);
    }

    #[test]
    fn tip_distances_ignore_rooting_and_child_order() {
        let a = iqtree_shaped();
        let b = PhyloTree::from_newick("((3:0.4,2:0.3):0.25,(1:0.2,0:0.1):0.25):0;").unwrap();
        assert!(a.same_tip_distances(&b, 1e-5, 1e-8).unwrap());
    }

    #[test]
    fn tip_distances_detect_different_topology() {
        let a = iqtree_shaped();
        let b = PhyloTree::from_newick("(0:0.1,2:0.3,(1:0.2,3:0.4):0.5);").unwrap();
        assert!(!a.same_tip_distances(&b, 1e-5, 1e-8).unwrap());
    }

    #[test]
    fn different_labels_never_match() {
        let a = PhyloTree::from_newick("(0:0.1,1:0.2);").unwrap();
        let b = PhyloTree::from_newick("(0:0.1,2:0.2);").unwrap();
        assert!(!a.same_tip_distances(&b, 1e-5, 1e-8).unwrap());
    }

    #[test]
    fn duplicate_tip_labels_rejected() {
        let a = PhyloTree::from_newick("(0:0.1,0:0.2);").unwrap();
        assert!(a.tip_to_tip_distances().is_err());
    }

    #[test]
    fn rename_tips_maps_every_leaf() {
        let mut tree = iqtree_shaped();
        let names = ["a", "b", "c", "d"];
        tree.rename_tips(|label| {
            let i: usize = label.parse().unwrap();
            Ok(names[i].to_string())
        })
        .unwrap();
        assert_eq!(tree.leaf_names(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn rename_stops_at_unlabelled_tip() {
        let mut tree = PhyloTree::from_newick("(0,,1);").unwrap();
        assert!(tree.rename_tips(|l| Ok(l.to_string())).is_err());
    }

    #[test]
    fn summary_includes_likelihood() {
        let mut tree = iqtree_shaped();
        assert_eq!(tree.summary(), "tree with 4 tips");
        tree.params_mut().lnl = Some(-12.5);
        assert_eq!(tree.summary(), "tree with 4 tips, lnL -12.5");
    }
}
