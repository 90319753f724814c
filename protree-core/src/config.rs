use std::f32::consts::PI;

use crate::error::{ProtreeError, Result};

/// Parameters of a [`crate::builder::TreeBuilder`].
///
/// Heights are relative to the parent trunk (`0` at its base, `1` at its
/// top) and angles are in radians.
#[derive(Clone, Debug, PartialEq)]
pub struct BuilderConfig {
    /// Minimum number of side branches added per growth step.
    pub min_branch: usize,
    /// Maximum number of side branches added per growth step (inclusive).
    pub max_branch: usize,
    /// Whether a top branch is appended after the side branches.
    pub top_branch: bool,
    pub top_branch_height: f32,
    /// Size of the added branches relative to the trunk they grow on.
    pub branch_trunk_ratio: f32,
    /// Re-randomize the side of every branch instead of alternating.
    pub random_side: bool,
    pub base_branch_angle: f32,
    pub min_branch_angle: f32,
    pub max_branch_angle: f32,
    pub min_branch_height: f32,
    pub max_branch_height: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            min_branch: 2,
            max_branch: 5,
            top_branch: true,
            top_branch_height: 0.95,
            branch_trunk_ratio: 0.6,
            random_side: false,
            base_branch_angle: PI / 4.0,
            min_branch_angle: -PI / 6.0,
            max_branch_angle: PI / 6.0,
            min_branch_height: 0.5,
            max_branch_height: 0.9,
        }
    }
}

impl BuilderConfig {
    /// Checks that every sampled range is ordered and finite.
    pub fn validate(&self) -> Result<()> {
        if self.min_branch > self.max_branch {
            return Err(ProtreeError::InvalidConfig(format!(
                "min_branch ({}) is greater than max_branch ({})",
                self.min_branch, self.max_branch
            )));
        }
        check_range("branch angle", self.min_branch_angle, self.max_branch_angle)?;
        check_range(
            "branch height",
            self.min_branch_height,
            self.max_branch_height,
        )?;

        let scalars = [
            ("top_branch_height", self.top_branch_height),
            ("branch_trunk_ratio", self.branch_trunk_ratio),
            ("base_branch_angle", self.base_branch_angle),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ProtreeError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ProtreeError::InvalidConfig(format!(
            "{name} range must be finite, got [{min}, {max}]"
        )));
    }
    if min > max {
        return Err(ProtreeError::InvalidConfig(format!(
            "{name} range is inverted: [{min}, {max}]"
        )));
    }
    // Uniform sampling needs the width itself to be finite.
    if !(max - min).is_finite() {
        return Err(ProtreeError::InvalidConfig(format!(
            "{name} range is too wide: [{min}, {max}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(BuilderConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_branch_count_is_rejected() {
        let cfg = BuilderConfig {
            min_branch: 4,
            max_branch: 3,
            ..BuilderConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ProtreeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_or_nan_ranges_are_rejected() {
        let inverted = BuilderConfig {
            min_branch_height: 0.9,
            max_branch_height: 0.1,
            ..BuilderConfig::default()
        };
        assert!(inverted.validate().is_err());

        let nan = BuilderConfig {
            max_branch_angle: f32::NAN,
            ..BuilderConfig::default()
        };
        assert!(nan.validate().is_err());

        let infinite_ratio = BuilderConfig {
            branch_trunk_ratio: f32::INFINITY,
            ..BuilderConfig::default()
        };
        assert!(infinite_ratio.validate().is_err());

        let too_wide = BuilderConfig {
            min_branch_angle: -f32::MAX,
            max_branch_angle: f32::MAX,
            ..BuilderConfig::default()
        };
        assert!(matches!(
            too_wide.validate(),
            Err(ProtreeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn degenerate_ranges_are_allowed() {
        let cfg = BuilderConfig {
            min_branch: 2,
            max_branch: 2,
            min_branch_angle: 0.0,
            max_branch_angle: 0.0,
            ..BuilderConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
