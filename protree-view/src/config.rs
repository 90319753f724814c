use glam::Vec2;

use crate::palette::{DEFAULT_PALETTE, Rgba};

/// How the tree is colored in the central panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Whole tree in `tree_color`.
    Monochrome,
    /// Whole tree, terminal branches in `leaf_color`.
    Leaves,
    /// Each tree colored by its depth through the palette.
    MultiColor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfig {
    pub trunk_base: Vec2,
    pub trunk_height: f32,
    pub trunk_width: f32,
    pub tree_color: Rgba,
    pub leaf_color: Rgba,
    pub background: Rgba,
    /// Repetitions used by the grow commands.
    pub grow_times: usize,
    /// Palette source, see [`crate::palette`].
    pub palette: String,
    pub draw_mode: DrawMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            trunk_base: Vec2::new(0.0, -250.0),
            trunk_height: 200.0,
            trunk_width: 20.0,
            tree_color: Rgba::new(255, 255, 255, 16),
            leaf_color: Rgba::new(120, 255, 120, 96),
            background: Rgba::new(51, 51, 255, 255),
            grow_times: 1,
            palette: DEFAULT_PALETTE.to_string(),
            draw_mode: DrawMode::Monochrome,
        }
    }
}
