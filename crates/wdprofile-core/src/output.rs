// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

/// One connected output as reported by the discovery layer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// Either a connector name ("DP-3") or a description that ends with
    /// the connector in parentheses ("Dell Inc. DELL U2415 ABC (DP-3)").
    pub name: String,

    /// Position in the global compositor space.
    pub x: i32,
    pub y: i32,

    pub mode: OutputMode,

    /// Scale factor, may be fractional.
    pub scale: f64,

    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub width: u32,
    pub height: u32,

    /// Refresh rate in mHz (wl_output convention).
    pub refresh_mhz: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    Flipped90,
    Flipped180,
    Flipped270,
}

impl Transform {
    /// Maps a raw `wl_output.transform` value.
    ///
    /// Plain `flipped` (4) and unknown values have no name in the config
    /// dialect and fall back to `Normal`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Transform::Rotate90,
            2 => Transform::Rotate180,
            3 => Transform::Rotate270,
            5 => Transform::Flipped90,
            6 => Transform::Flipped180,
            7 => Transform::Flipped270,
            _ => Transform::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Transform::Normal => "normal",
            Transform::Rotate90 => "90",
            Transform::Rotate180 => "180",
            Transform::Rotate270 => "270",
            Transform::Flipped90 => "flipped-90",
            Transform::Flipped180 => "flipped-180",
            Transform::Flipped270 => "flipped-270",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_wl_output_transforms() {
        assert_eq!(Transform::from_raw(0), Transform::Normal);
        assert_eq!(Transform::from_raw(1), Transform::Rotate90);
        assert_eq!(Transform::from_raw(3), Transform::Rotate270);
        assert_eq!(Transform::from_raw(5), Transform::Flipped90);
        assert_eq!(Transform::from_raw(7), Transform::Flipped270);
    }

    #[test]
    fn unnamed_transforms_fall_back_to_normal() {
        assert_eq!(Transform::from_raw(4), Transform::Normal);
        assert_eq!(Transform::from_raw(42), Transform::Normal);
    }

    #[test]
    fn config_names() {
        assert_eq!(Transform::Rotate180.to_string(), "180");
        assert_eq!(Transform::Flipped180.to_string(), "flipped-180");
    }
}
