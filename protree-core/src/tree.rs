use std::fmt;

use crate::error::{ProtreeError, Result};
use crate::types::BranchPath;

/// Ratio used by [`Tree::add_branch_default`].
pub const DEFAULT_BRANCH_RATIO: f32 = 0.5;

/// A child tree together with where and how it is attached to its parent.
///
/// The scalar fields are fixed once the branch is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    tree: Tree,
    height: f32,
    angle: f32,
    ratio: f32,
}

impl Branch {
    fn new(height: f32, angle: f32, ratio: f32) -> Self {
        Self {
            tree: Tree::new(),
            height,
            angle,
            ratio,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Relative position along the parent, `0` at the base and `1` at the top.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Angle in radians relative to the parent's direction.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Size of the branch relative to its parent.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }
}

/// A trunk carrying an ordered list of branches, each owning a sub-tree.
///
/// Branches keep their insertion order. A tree without branches is a
/// terminal tree (a leaf at the current growth state).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tree {
    branches: Vec<Branch>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            branches: Vec::new(),
        }
    }

    /// Appends a branch carrying a fresh empty tree.
    ///
    /// Ranges are not checked; `height` is expected in `[0, 1]` and `ratio`
    /// to be positive.
    pub fn add_branch(&mut self, height: f32, angle: f32, ratio: f32) {
        self.branches.push(Branch::new(height, angle, ratio));
    }

    /// Same as [`Tree::add_branch`] with [`DEFAULT_BRANCH_RATIO`].
    pub fn add_branch_default(&mut self, height: f32, angle: f32) {
        self.add_branch(height, angle, DEFAULT_BRANCH_RATIO);
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Mutable access to the tree carried by each branch, in branch order.
    pub fn subtrees_mut(&mut self) -> impl Iterator<Item = &mut Tree> + '_ {
        self.branches.iter_mut().map(Branch::tree_mut)
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn branch_at(&self, index: usize) -> Result<&Tree> {
        let len = self.branches.len();
        self.branches
            .get(index)
            .map(Branch::tree)
            .ok_or(ProtreeError::IndexOutOfRange { index, len })
    }

    pub fn branch_at_mut(&mut self, index: usize) -> Result<&mut Tree> {
        let len = self.branches.len();
        self.branches
            .get_mut(index)
            .map(Branch::tree_mut)
            .ok_or(ProtreeError::IndexOutOfRange { index, len })
    }

    /// Number of levels from this tree down to its deepest terminal tree.
    ///
    /// A terminal tree has depth `1`.
    pub fn depth(&self) -> usize {
        1 + self
            .branches
            .iter()
            .map(|b| b.tree.depth())
            .max()
            .unwrap_or(0)
    }

    /// Number of trees in this structure, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .branches
            .iter()
            .map(|b| b.tree.node_count())
            .sum::<usize>()
    }

    /// Lazily walks, depth first and in branch order, every tree reachable
    /// from this one that currently has no branches.
    ///
    /// Each call starts a fresh traversal of the live structure.
    pub fn terminal_branches(&self) -> TerminalBranches<'_> {
        TerminalBranches { stack: vec![self] }
    }

    /// Snapshot of the paths leading to each terminal tree, in the same
    /// order as [`Tree::terminal_branches`].
    pub fn terminal_paths(&self) -> Vec<BranchPath> {
        let mut paths = Vec::new();
        let mut current = BranchPath::new();
        self.collect_terminal_paths(&mut current, &mut paths);
        paths
    }

    fn collect_terminal_paths(&self, current: &mut BranchPath, out: &mut Vec<BranchPath>) {
        if self.is_leaf() {
            out.push(current.clone());
            return;
        }
        for (i, branch) in self.branches.iter().enumerate() {
            current.push(i);
            branch.tree.collect_terminal_paths(current, out);
            current.pop();
        }
    }

    /// Follows `path` from this tree. An empty path returns `self`.
    pub fn get(&self, path: &[usize]) -> Result<&Tree> {
        path.iter()
            .try_fold(self, |tree, &index| tree.branch_at(index))
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Result<&mut Tree> {
        let mut tree = self;
        for &index in path {
            tree = tree.branch_at_mut(index)?;
        }
        Ok(tree)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tree: {} branch", self.branches.len())
    }
}

/// Iterator returned by [`Tree::terminal_branches`].
#[derive(Debug)]
pub struct TerminalBranches<'a> {
    stack: Vec<&'a Tree>,
}

impl<'a> Iterator for TerminalBranches<'a> {
    type Item = &'a Tree;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tree) = self.stack.pop() {
            if tree.is_leaf() {
                return Some(tree);
            }
            // Reversed so the first branch is visited first.
            self.stack
                .extend(tree.branches.iter().rev().map(|b| &b.tree));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root with 4 branches, each carrying 4 branches of its own.
    fn two_level_tree() -> Tree {
        let mut tree = Tree::new();
        for i in 0..4 {
            tree.add_branch(0.0, 0.0, 0.0);
            let child = tree.branch_at_mut(i).unwrap();
            for _ in 0..4 {
                child.add_branch(0.0, 0.0, 0.0);
            }
        }
        tree
    }

    #[test]
    fn new_tree_is_its_own_terminal_branch() {
        let tree = Tree::new();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.branch_count(), 0);

        let terminals: Vec<&Tree> = tree.terminal_branches().collect();
        assert_eq!(terminals.len(), 1);
        assert!(std::ptr::eq(terminals[0], &tree));
        assert_eq!(tree.terminal_paths(), vec![BranchPath::new()]);
    }

    #[test]
    fn add_branch_keeps_fields_and_order() {
        let mut tree = Tree::new();
        tree.add_branch(0.25, 1.0, 0.6);
        tree.add_branch_default(0.75, -1.0);

        assert_eq!(tree.branch_count(), 2);
        let first = &tree.branches()[0];
        assert_eq!(first.height(), 0.25);
        assert_eq!(first.angle(), 1.0);
        assert_eq!(first.ratio(), 0.6);
        assert!(first.tree().is_leaf());

        let second = &tree.branches()[1];
        assert_eq!(second.height(), 0.75);
        assert_eq!(second.ratio(), DEFAULT_BRANCH_RATIO);
    }

    #[test]
    fn one_branch_gives_depth_two_and_a_single_new_terminal() {
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.3, 0.5);

        assert_eq!(tree.depth(), 2);
        let terminals: Vec<&Tree> = tree.terminal_branches().collect();
        assert_eq!(terminals.len(), 1);
        assert!(std::ptr::eq(terminals[0], tree.branch_at(0).unwrap()));
    }

    #[test]
    fn depth_follows_the_deepest_branch() {
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.0, 0.5);
        tree.add_branch(0.5, 0.0, 0.5);
        tree.get_mut(&[1]).unwrap().add_branch(0.5, 0.0, 0.5);
        tree.get_mut(&[1, 0]).unwrap().add_branch(0.5, 0.0, 0.5);

        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.branch_at(0).unwrap().depth(), 1);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn branch_at_out_of_range() {
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.0, 0.5);

        assert!(tree.branch_at(0).is_ok());
        assert_eq!(
            tree.branch_at(1),
            Err(ProtreeError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(tree.get(&[0, 0]).is_err());
    }

    #[test]
    fn terminal_branches_are_depth_first_in_branch_order() {
        let mut tree = Tree::new();
        tree.add_branch(0.1, 0.0, 0.5);
        tree.add_branch(0.2, 0.0, 0.5);
        tree.add_branch(0.3, 0.0, 0.5);
        tree.get_mut(&[0]).unwrap().add_branch(0.4, 0.0, 0.5);
        tree.get_mut(&[0]).unwrap().add_branch(0.5, 0.0, 0.5);

        let paths = tree.terminal_paths();
        assert_eq!(paths, vec![vec![0, 0], vec![0, 1], vec![1], vec![2]]);

        let lazy: Vec<&Tree> = tree.terminal_branches().collect();
        assert_eq!(lazy.len(), paths.len());
        for (t, path) in lazy.iter().zip(&paths) {
            assert!(std::ptr::eq(*t, tree.get(path).unwrap()));
        }
    }

    #[test]
    fn terminal_branches_reflect_mutation() {
        let mut tree = two_level_tree();
        assert_eq!(tree.terminal_branches().count(), 16);

        for path in tree.terminal_paths() {
            let leaf = tree.get_mut(&path).unwrap();
            for _ in 0..4 {
                leaf.add_branch(0.0, 0.0, 0.0);
            }
        }

        assert_eq!(tree.terminal_branches().count(), 64);
        assert_eq!(tree.depth(), 4);
    }

    #[test]
    fn display_shows_branch_count() {
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.0, 0.5);
        tree.add_branch(0.5, 0.0, 0.5);
        assert_eq!(tree.to_string(), "Tree: 2 branch");
    }
}
