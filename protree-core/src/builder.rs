//! Stochastic growth of [`Tree`]s.
//!
//! A growth step on a trunk:
//! 1. Picks a starting [`Side`] at random.
//! 2. Adds between `min_branch` and `max_branch` side branches, each at a
//!    random height and at `base_branch_angle` plus a random jitter, signed
//!    by the current side. The side then alternates, or is re-drawn when
//!    `random_side` is set.
//! 3. Optionally adds a top branch at `top_branch_height` whose angle is the
//!    jitter alone.

use rand::Rng;
use rand::rngs::ThreadRng;
use tracing::debug;

use crate::config::BuilderConfig;
use crate::error::Result;
use crate::tree::Tree;
use crate::types::Side;

/// Grows trees according to a [`BuilderConfig`], drawing from its own
/// random generator.
#[derive(Debug)]
pub struct TreeBuilder<R = ThreadRng> {
    config: BuilderConfig,
    rng: R,
}

impl TreeBuilder<ThreadRng> {
    /// Creates a builder backed by the thread-local generator.
    ///
    /// ### Errors
    /// Returns [`crate::error::ProtreeError::InvalidConfig`] if `config` does
    /// not validate.
    pub fn new(config: BuilderConfig) -> Result<Self> {
        Self::with_rng(config, rand::rng())
    }
}

impl<R: Rng> TreeBuilder<R> {
    /// Creates a builder drawing from `rng`. Pass a seeded generator for
    /// reproducible trees.
    pub fn with_rng(config: BuilderConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Runs one growth step on `tree`, then, while `times > 1`, grows every
    /// branch `tree` now carries with `times - 1`.
    ///
    /// `times == 0` runs a single step, like `times == 1`.
    pub fn grow(&mut self, tree: &mut Tree, times: usize) {
        self.grow_step(tree);

        if times > 1 {
            for child in tree.subtrees_mut() {
                self.grow(child, times - 1);
            }
        }
    }

    /// Grows each tree that is terminal before the call, leaving the rest of
    /// the structure untouched.
    ///
    /// ### Returns
    /// The number of terminal trees that were grown.
    pub fn grow_terminal(&mut self, tree: &mut Tree, times: usize) -> Result<usize> {
        // Snapshot first: growing a terminal changes the set being walked.
        let paths = tree.terminal_paths();
        debug!(terminals = paths.len(), times, "growing terminal branches");

        for path in &paths {
            let terminal = tree.get_mut(path)?;
            self.grow(terminal, times);
        }
        Ok(paths.len())
    }

    fn grow_step(&mut self, tree: &mut Tree) {
        let ratio = self.config.branch_trunk_ratio;
        let mut side = self.random_side();
        let count = self
            .rng
            .random_range(self.config.min_branch..=self.config.max_branch);

        for _ in 0..count {
            let height = self.random_height();
            let angle = self.random_base_angle() * side.sign();
            tree.add_branch(height, angle, ratio);

            side = if self.config.random_side {
                self.random_side()
            } else {
                side.flipped()
            };
        }

        if self.config.top_branch {
            let angle = self.random_angle();
            tree.add_branch(self.config.top_branch_height, angle, ratio);
        }

        debug!(
            side_branches = count,
            top_branch = self.config.top_branch,
            "growth step"
        );
    }

    /// Uniform height in `[min_branch_height, max_branch_height]`.
    pub fn random_height(&mut self) -> f32 {
        self.rng
            .random_range(self.config.min_branch_height..=self.config.max_branch_height)
    }

    /// Uniform jitter in `[min_branch_angle, max_branch_angle]`.
    pub fn random_angle(&mut self) -> f32 {
        self.rng
            .random_range(self.config.min_branch_angle..=self.config.max_branch_angle)
    }

    /// `base_branch_angle` plus a [`TreeBuilder::random_angle`] jitter.
    pub fn random_base_angle(&mut self) -> f32 {
        self.config.base_branch_angle + self.random_angle()
    }

    fn random_side(&mut self) -> Side {
        if self.rng.random_bool(0.5) {
            Side::Right
        } else {
            Side::Left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtreeError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded(config: BuilderConfig, seed: u64) -> TreeBuilder<StdRng> {
        TreeBuilder::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    fn fixed_count(count: usize, top_branch: bool) -> BuilderConfig {
        BuilderConfig {
            min_branch: count,
            max_branch: count,
            top_branch,
            ..BuilderConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = BuilderConfig {
            min_branch: 3,
            max_branch: 1,
            ..BuilderConfig::default()
        };
        let res = TreeBuilder::with_rng(cfg, StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(ProtreeError::InvalidConfig(_))));
    }

    #[test]
    fn grow_once_adds_fixed_count_plus_top_branch() {
        let mut builder = seeded(fixed_count(2, true), 1);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 1);

        assert_eq!(tree.branch_count(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn grow_without_top_branch() {
        let mut builder = seeded(fixed_count(4, false), 2);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 1);

        assert_eq!(tree.branch_count(), 4);
    }

    #[test]
    fn branch_count_stays_within_bounds() {
        let cfg = BuilderConfig {
            min_branch: 1,
            max_branch: 4,
            top_branch: true,
            ..BuilderConfig::default()
        };
        let mut builder = seeded(cfg, 3);

        for _ in 0..100 {
            let mut tree = Tree::new();
            builder.grow(&mut tree, 1);
            assert!((2..=5).contains(&tree.branch_count()));
        }
    }

    #[test]
    fn sampled_fields_stay_within_configured_ranges() {
        let cfg = BuilderConfig::default();
        let mut builder = seeded(cfg.clone(), 4);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 1);

        let (side, top) = tree.branches().split_at(tree.branch_count() - 1);
        for b in side {
            assert!(b.height() >= cfg.min_branch_height && b.height() <= cfg.max_branch_height);
            let magnitude = b.angle().abs();
            assert!(magnitude >= cfg.base_branch_angle + cfg.min_branch_angle - 1e-6);
            assert!(magnitude <= cfg.base_branch_angle + cfg.max_branch_angle + 1e-6);
            assert_eq!(b.ratio(), cfg.branch_trunk_ratio);
        }

        let top = &top[0];
        assert_eq!(top.height(), cfg.top_branch_height);
        assert!(top.angle() >= cfg.min_branch_angle && top.angle() <= cfg.max_branch_angle);
        assert_eq!(top.ratio(), cfg.branch_trunk_ratio);
    }

    #[test]
    fn sides_alternate_unless_random_side() {
        // Base angle dominates the jitter, so the sign of each angle is the side.
        let mut builder = seeded(fixed_count(6, false), 5);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 1);

        let signs: Vec<bool> = tree.branches().iter().map(|b| b.angle() > 0.0).collect();
        for pair in signs.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn random_side_keeps_angle_magnitudes() {
        let cfg = BuilderConfig {
            random_side: true,
            ..fixed_count(8, false)
        };
        let mut builder = seeded(cfg.clone(), 6);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 1);

        for b in tree.branches() {
            let magnitude = b.angle().abs();
            assert!(magnitude >= cfg.base_branch_angle + cfg.min_branch_angle - 1e-6);
            assert!(magnitude <= cfg.base_branch_angle + cfg.max_branch_angle + 1e-6);
        }
    }

    #[test]
    fn grow_many_times_adds_one_level_per_time() {
        let mut builder = seeded(BuilderConfig::default(), 7);

        for times in 1..=4 {
            let mut tree = Tree::new();
            builder.grow(&mut tree, times);
            assert_eq!(tree.depth(), 1 + times);
        }
    }

    #[test]
    fn grow_zero_times_runs_one_step() {
        let mut builder = seeded(fixed_count(2, true), 8);
        let mut tree = Tree::new();

        builder.grow(&mut tree, 0);

        assert_eq!(tree.branch_count(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn grow_recurses_into_every_branch_including_existing_ones() {
        let mut builder = seeded(fixed_count(2, false), 9);
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.0, 0.5);

        builder.grow(&mut tree, 2);

        assert_eq!(tree.branch_count(), 3);
        for b in tree.branches() {
            assert_eq!(b.tree().branch_count(), 2);
        }
    }

    #[test]
    fn same_seed_gives_same_tree() {
        let mut a = seeded(BuilderConfig::default(), 42);
        let mut b = seeded(BuilderConfig::default(), 42);
        let mut ta = Tree::new();
        let mut tb = Tree::new();

        a.grow(&mut ta, 3);
        b.grow(&mut tb, 3);

        assert_eq!(ta, tb);
    }

    #[test]
    fn grow_terminal_only_touches_terminal_trees() {
        let mut builder = seeded(fixed_count(2, true), 10);
        let mut tree = Tree::new();
        tree.add_branch(0.5, 0.1, 0.5);
        tree.add_branch(0.6, -0.1, 0.5);
        tree.get_mut(&[0]).unwrap().add_branch(0.7, 0.2, 0.5);

        let before = tree.clone();
        let terminals = before.terminal_paths();
        assert_eq!(terminals, vec![vec![0, 0], vec![1]]);

        let grown = builder.grow_terminal(&mut tree, 1).unwrap();

        assert_eq!(grown, 2);
        assert_eq!(tree.branch_count(), 2);
        assert_eq!(tree.branch_at(0).unwrap().branch_count(), 1);
        for path in &terminals {
            assert_eq!(tree.get(path).unwrap().branch_count(), 3);
        }
        // Pre-existing branch fields are untouched.
        for (old, new) in before.branches().iter().zip(tree.branches()) {
            assert_eq!(old.height(), new.height());
            assert_eq!(old.angle(), new.angle());
        }
        assert_eq!(tree.depth(), before.depth() + 1);
    }

    #[test]
    fn grow_terminal_on_fresh_tree_grows_the_root() {
        let mut builder = seeded(fixed_count(3, false), 11);
        let mut tree = Tree::new();

        let grown = builder.grow_terminal(&mut tree, 2).unwrap();

        assert_eq!(grown, 1);
        assert_eq!(tree.branch_count(), 3);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.terminal_branches().count(), 9);
    }
}
