//! Interactive procedural tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the tree, the builder growing
//! it and the depth palette, and implements [`eframe::App`] to draw and
//! control them through an egui UI.

use eframe::App;
use glam::Vec2;
use protree_core::{builder::TreeBuilder, config::BuilderConfig, error::Result, tree::Tree};
use tracing::{info, warn};

use crate::{
    config::{DrawMode, ViewConfig},
    layout::{self, Segment, Trunk},
    palette::Palette,
};

/// Upper bound on the trees a single grow command may create.
const MAX_GROWN_TREES: usize = 250_000;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle key bindings and panel widgets.
/// 2. Lay out the tree from the configured trunk.
/// 3. Paint every segment with the color chosen by the draw mode.
///
/// ### Fields
/// - `tree` - Tree being grown.
/// - `builder` - Builder applied by the grow commands.
/// - `builder_cfg` - Editable copy of the builder parameters, applied on demand.
/// - `cfg` - Viewer configuration (trunk placement, colors, draw mode).
/// - `palette` - Depth to color lookup used in [`DrawMode::MultiColor`].
///
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_grown` - Number of trees grown by the last command.
/// - `error` - Last configuration error, shown in the config panel.
pub struct Viewer {
    tree: Tree,
    builder: TreeBuilder,
    builder_cfg: BuilderConfig,
    cfg: ViewConfig,
    palette: Palette,

    zoom: f32,
    pan: egui::Vec2,

    last_grown: usize,
    error: Option<String>,
}

impl Viewer {
    /// Creates a viewer with an empty tree and default builder parameters.
    ///
    /// ### Errors
    /// Fails if `cfg.palette` does not parse.
    pub fn new(cfg: ViewConfig) -> Result<Self> {
        let builder_cfg = BuilderConfig::default();
        let builder = TreeBuilder::new(builder_cfg.clone())?;
        let palette = cfg.palette.parse()?;

        Ok(Self {
            tree: Tree::new(),
            builder,
            builder_cfg,
            cfg,
            palette,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            last_grown: 0,
            error: None,
        })
    }

    /// Replaces the tree with a bare trunk.
    fn reset(&mut self) {
        self.tree = Tree::new();
        self.last_grown = 0;
        info!("tree reset");
    }

    /// Grows every current terminal branch and highlights the new leaves.
    fn grow_leaves(&mut self) {
        let terminals = self.tree.terminal_branches().count();
        if !self.growth_allowed(terminals) {
            return;
        }
        match self.builder.grow_terminal(&mut self.tree, self.cfg.grow_times) {
            Ok(grown) => {
                self.last_grown = grown;
                self.cfg.draw_mode = DrawMode::Leaves;
                info!(grown, depth = self.tree.depth(), "grew terminal branches");
            }
            Err(e) => {
                warn!(%e, "growing terminal branches failed");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Grows the whole tree from its trunk.
    fn grow_trunk(&mut self) {
        // Every existing tree may be grown again by the recursion.
        if !self.growth_allowed(self.tree.node_count()) {
            return;
        }
        self.builder.grow(&mut self.tree, self.cfg.grow_times);
        self.last_grown = 1;
        info!(depth = self.tree.depth(), "grew trunk");
    }

    /// Upper bound on the trees created by growing `roots` trees
    /// `grow_times` times with the current builder.
    ///
    /// ### Parameters
    /// - `roots` - Number of trees the growth starts from.
    ///
    /// ### Returns
    /// `roots * times * per_step^times`, saturating, where `per_step` is the
    /// most branches a single step can add.
    fn growth_bound(&self, roots: usize) -> usize {
        let cfg = self.builder.config();
        let per_step = cfg.max_branch + usize::from(cfg.top_branch);
        let times = self.cfg.grow_times.max(1);
        let exponent = u32::try_from(times).unwrap_or(u32::MAX);

        roots
            .saturating_mul(per_step.saturating_pow(exponent))
            .saturating_mul(times)
    }

    /// Checks [`Viewer::growth_bound`] against [`MAX_GROWN_TREES`], reporting
    /// a refusal in the config panel.
    fn growth_allowed(&mut self, roots: usize) -> bool {
        let bound = self.growth_bound(roots);
        if bound > MAX_GROWN_TREES {
            warn!(bound, limit = MAX_GROWN_TREES, "growth refused");
            self.error = Some(format!(
                "growth refused: up to {bound} new trees (limit {MAX_GROWN_TREES}); \
                 lower times or max_branch"
            ));
            return false;
        }
        true
    }

    /// Rebuilds the builder from `builder_cfg`, keeping the old one on error.
    fn apply_builder_cfg(&mut self) {
        match TreeBuilder::new(self.builder_cfg.clone()) {
            Ok(builder) => {
                self.builder = builder;
                self.error = None;
            }
            Err(e) => {
                warn!(%e, "rejected builder config");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Re-parses the palette source, keeping the old palette on error.
    fn apply_palette(&mut self) {
        match self.cfg.palette.parse::<Palette>() {
            Ok(palette) => {
                info!(%palette, "palette applied");
                self.palette = palette;
                self.error = None;
            }
            Err(e) => {
                warn!(%e, "rejected palette");
                self.error = Some(e.to_string());
            }
        }
    }

    fn trunk(&self) -> Trunk {
        Trunk {
            base: self.cfg.trunk_base,
            height: self.cfg.trunk_height,
            width: self.cfg.trunk_width,
            angle: 0.0,
        }
    }

    /// Segments to paint with their colors, in painting order.
    ///
    /// ### Returns
    /// One `(segment, color)` pair per painted quad. In
    /// [`DrawMode::Leaves`] the terminal segments are repeated at the end,
    /// in `leaf_color`, so they paint over the rest.
    fn colored_segments(&self) -> Vec<(Segment, egui::Color32)> {
        let segments = layout::layout(&self.tree, self.trunk());
        let base = self.cfg.tree_color.to_color32();

        match self.cfg.draw_mode {
            DrawMode::Monochrome => segments.into_iter().map(|s| (s, base)).collect(),
            DrawMode::Leaves => {
                let leaf = self.cfg.leaf_color.to_color32();
                let leaves = layout::of_depth(&segments, 1);
                segments
                    .into_iter()
                    .map(|s| (s, base))
                    .chain(leaves.into_iter().map(|s| (s, leaf)))
                    .collect()
            }
            DrawMode::MultiColor => segments
                .into_iter()
                .map(|s| {
                    let color = self.palette.get_or(&s.depth, &self.cfg.tree_color);
                    (s, color.to_color32())
                })
                .collect(),
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - World-space position.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding egui position in screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding), using the same `zoom`, `pan`, and `rect` center.
    ///
    /// ### Parameters
    /// - `p` - Screen-space position in egui coordinates.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding position in world-space.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Handles the key bindings, unless a text field has focus.
    ///
    /// - `R` resets the tree.
    /// - `N` grows the terminal branches.
    /// - `D` switches to [`DrawMode::MultiColor`].
    /// - `G` grows from the trunk.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (reset, leaves, multi, trunk) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::N),
                i.key_pressed(egui::Key::D),
                i.key_pressed(egui::Key::G),
            )
        });

        if reset {
            self.reset();
        }
        if leaves {
            self.grow_leaves();
        }
        if multi {
            self.cfg.draw_mode = DrawMode::MultiColor;
        }
        if trunk {
            self.grow_trunk();
        }
    }

    /// Builds the top panel UI (commands, draw mode, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reset (R)").clicked() {
                    self.reset();
                }
                if ui.button("Grow leaves (N)").clicked() {
                    self.grow_leaves();
                }
                if ui.button("Grow trunk (G)").clicked() {
                    self.grow_trunk();
                }

                ui.add(
                    egui::DragValue::new(&mut self.cfg.grow_times)
                        .prefix("times = ")
                        .range(1..=4)
                        .speed(0.1),
                );

                ui.separator();
                ui.selectable_value(&mut self.cfg.draw_mode, DrawMode::Monochrome, "Mono");
                ui.selectable_value(&mut self.cfg.draw_mode, DrawMode::Leaves, "Leaves");
                ui.selectable_value(&mut self.cfg.draw_mode, DrawMode::MultiColor, "Multi (D)");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (depth, counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("last grown = {}", self.last_grown));
                ui.separator();
                ui.label(format!("depth = {}", self.tree.depth()));
                ui.label(format!("trees = {}", self.tree.node_count()));
                ui.label(format!(
                    "terminal = {}",
                    self.tree.terminal_branches().count()
                ));
            });
        });
    }

    /// Builds the right-hand panel for builder parameters and palette.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Builder");
                let cfg = &mut self.builder_cfg;

                ui.separator();
                ui.label("Branch count");
                Self::labeled_drag_usize(ui, "min_branch:", &mut cfg.min_branch, 0..=10, 0.1);
                Self::labeled_drag_usize(ui, "max_branch:", &mut cfg.max_branch, 0..=10, 0.1);

                ui.separator();
                ui.label("Top branch");
                ui.checkbox(&mut cfg.top_branch, "top_branch");
                Self::labeled_drag_f32(
                    ui,
                    "top_branch_height:",
                    &mut cfg.top_branch_height,
                    0.0..=1.0,
                    0.01,
                );

                ui.separator();
                ui.label("Shape");
                Self::labeled_drag_f32(
                    ui,
                    "branch_trunk_ratio:",
                    &mut cfg.branch_trunk_ratio,
                    0.0..=2.0,
                    0.01,
                );
                ui.checkbox(&mut cfg.random_side, "random_side");
                Self::labeled_drag_f32(
                    ui,
                    "base_branch_angle:",
                    &mut cfg.base_branch_angle,
                    -3.2..=3.2,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "min_branch_angle:",
                    &mut cfg.min_branch_angle,
                    -3.2..=3.2,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_branch_angle:",
                    &mut cfg.max_branch_angle,
                    -3.2..=3.2,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "min_branch_height:",
                    &mut cfg.min_branch_height,
                    0.0..=1.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_branch_height:",
                    &mut cfg.max_branch_height,
                    0.0..=1.0,
                    0.01,
                );

                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.apply_builder_cfg();
                    }
                    if ui.button("Defaults").clicked() {
                        self.builder_cfg = BuilderConfig::default();
                        self.apply_builder_cfg();
                    }
                });

                ui.separator();
                ui.heading("Palette");
                ui.label("depth=rrggbbaa; ...");
                ui.text_edit_singleline(&mut self.cfg.palette);
                if ui.button("Apply palette").clicked() {
                    self.apply_palette();
                }

                if let Some(error) = &self.error {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, error.as_str());
                }
            });
    }

    /// Builds the central panel where the tree is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            painter.rect_filled(rect, 0.0, self.cfg.background.to_color32());

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            for (segment, color) in self.colored_segments() {
                let points: Vec<egui::Pos2> = segment
                    .corners()
                    .iter()
                    .map(|&p| self.world_to_screen(p, rect))
                    .collect();
                painter.add(egui::Shape::convex_polygon(
                    points,
                    color,
                    egui::Stroke::NONE,
                ));
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that handles input and builds all panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
