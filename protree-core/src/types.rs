/// Index path from a root [`crate::tree::Tree`] to one of its descendants.
///
/// Each element is a branch index at the corresponding level. An empty path
/// designates the root. Paths stay valid while the tree only grows, since
/// branches are appended and never reordered or removed.
pub type BranchPath = Vec<usize>;

/// Side of the parent trunk a branch leans towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign applied to a branch angle: `-1.0` for left, `1.0` for right.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_flip() {
        assert_eq!(Side::Left.sign(), -1.0);
        assert_eq!(Side::Right.sign(), 1.0);
        assert_eq!(Side::Left.flipped(), Side::Right);
        assert_eq!(Side::Right.flipped().flipped(), Side::Right);
    }
}
