//! Depth-to-color palettes.
//!
//! A palette is an [`IntervalMap`] from tree depth to [`Rgba`], written in
//! text as `depth=rrggbbaa` rows separated by `;`, e.g.
//! `"5=f028aa40; 8=400000ff"`.

use std::fmt;
use std::str::FromStr;

use protree_core::interval_map::IntervalMap;

pub type Palette = IntervalMap<usize, Rgba>;

/// Source text of the palette used when none is configured.
pub const DEFAULT_PALETTE: &str = "5=f028aa40; 8=400000ff";

/// Unmultiplied 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn to_color32(self) -> egui::Color32 {
        let [r, g, b, a] = self.0;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbaError(String);

impl fmt::Display for ParseRgbaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected rrggbb or rrggbbaa hex digits, got `{}`", self.0)
    }
}

/// Accepts `rrggbb` (opaque) or `rrggbbaa`, with an optional leading `#`.
impl FromStr for Rgba {
    type Err = ParseRgbaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let err = || ParseRgbaError(s.to_string());

        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let mut rgba = [0, 0, 0, 255];
        for (i, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(rgba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protree_core::error::ProtreeError;

    #[test]
    fn parse_hex_colors() {
        assert_eq!("f028aa40".parse::<Rgba>(), Ok(Rgba::new(240, 40, 170, 64)));
        assert_eq!("#400000".parse::<Rgba>(), Ok(Rgba::new(64, 0, 0, 255)));
        assert!("12345".parse::<Rgba>().is_err());
        assert!("zz0000".parse::<Rgba>().is_err());
        assert!("ééé".parse::<Rgba>().is_err());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Rgba::new(240, 40, 170, 64).to_string(), "f028aa40");
    }

    #[test]
    fn default_palette_colors_by_depth() {
        let palette: Palette = DEFAULT_PALETTE.parse().unwrap();
        let fallback = Rgba::new(255, 255, 255, 16);

        assert_eq!(palette.get_or(&1, &fallback), &Rgba::new(240, 40, 170, 64));
        assert_eq!(palette.get_or(&5, &fallback), &Rgba::new(240, 40, 170, 64));
        assert_eq!(palette.get_or(&6, &fallback), &Rgba::new(64, 0, 0, 255));
        assert_eq!(palette.get_or(&9, &fallback), &fallback);
    }

    #[test]
    fn bad_palette_rows_are_reported() {
        let arity: Result<Palette, _> = "5=f028aa40=1".parse();
        assert_eq!(arity, Err(ProtreeError::InvalidArity { found: 3 }));

        let color: Result<Palette, _> = "5=nothex".parse();
        assert!(matches!(color, Err(ProtreeError::InvalidField { .. })));
    }
}
