//! Core procedural tree library.
//!
//! Main components:
//! - [`tree`]: recursive tree and branch model.
//! - [`builder`]: stochastic growth of trees.
//! - [`config`]: parameters driving the builder.
//! - [`interval_map`]: successive-interval lookup (e.g. depth to color).
//! - [`error`]: the crate error type.
//! - [`types`]: shared type aliases and small enums.

pub mod builder;
pub mod config;
pub mod error;
pub mod interval_map;
pub mod tree;
pub mod types;
