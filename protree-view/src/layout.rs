//! Maps a [`Tree`] to world-space quads.
//!
//! Every tree is drawn as a rectangle growing from its base along its
//! direction `(sin a, cos a)`, where `a` is measured from the world's up
//! axis. A branch starts at `branch.height * height` along its parent, is
//! `branch.ratio` times as large and turns by `branch.angle`.

use glam::Vec2;
use protree_core::tree::{Branch, Tree};

/// Placement of the root trunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trunk {
    pub base: Vec2,
    pub height: f32,
    pub width: f32,
    pub angle: f32,
}

impl Trunk {
    pub fn dir(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), self.angle.cos())
    }

    fn child(&self, branch: &Branch) -> Self {
        Self {
            base: self.base + self.dir() * branch.height() * self.height,
            height: self.height * branch.ratio(),
            width: self.width * branch.ratio(),
            angle: self.angle + branch.angle(),
        }
    }
}

/// One placed tree of the structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub trunk: Trunk,
    /// [`Tree::depth`] of the tree this segment draws.
    pub depth: usize,
    /// Index of the parent segment in the same `Vec`, `None` for a root.
    pub parent: Option<usize>,
}

impl Segment {
    /// Corners in order: base left, base right, top right, top left.
    pub fn corners(&self) -> [Vec2; 4] {
        let dir = self.trunk.dir();
        let half_side = Vec2::new(-dir.y, dir.x) * (self.trunk.width / 2.0);
        let base = self.trunk.base;
        let top = base + dir * self.trunk.height;
        [base + half_side, base - half_side, top - half_side, top + half_side]
    }
}

/// Lays out every tree of the structure in pre-order, so a parent always
/// precedes its children.
pub fn layout(tree: &Tree, trunk: Trunk) -> Vec<Segment> {
    let mut out = Vec::with_capacity(tree.node_count());
    place(tree, trunk, None, &mut out);
    out
}

fn place(tree: &Tree, trunk: Trunk, parent: Option<usize>, out: &mut Vec<Segment>) -> usize {
    let index = out.len();
    out.push(Segment {
        trunk,
        depth: 0,
        parent,
    });

    let deepest = tree
        .branches()
        .iter()
        .map(|branch| place(branch.tree(), trunk.child(branch), Some(index), out))
        .max()
        .unwrap_or(0);

    out[index].depth = deepest + 1;
    deepest + 1
}

/// Keeps the sub-trees whose depth is exactly `depth`, found from the top
/// down, together with everything they carry.
///
/// With `depth == 1` this is the terminal branches. Parent indices are
/// remapped into the returned layout; a kept root of a sub-tree has none.
pub fn of_depth(segments: &[Segment], depth: usize) -> Vec<Segment> {
    let mut new_index: Vec<Option<usize>> = vec![None; segments.len()];
    let mut out = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        let parent = seg.parent.and_then(|p| new_index[p]);
        if seg.depth == depth || parent.is_some() {
            new_index[i] = Some(out.len());
            out.push(Segment { parent, ..*seg });
        }
    }
    out
}
