//! Overlay theme values

use navtint_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which background the overlay is sitting on.
///
/// `Light` means the content underneath is bright, so the overlay draws
/// dark foreground. `Dark` means the content is dark or saturated brand
/// blue, so the overlay draws light foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stable id for config/serialization
    pub fn id(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Foreground color the overlay renderer should use
    pub fn foreground(self) -> Color {
        match self {
            Self::Light => Color::from_hex(0x111827),
            Self::Dark => Color::WHITE,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Theme a region rule forces when the overlay overlaps it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedTheme {
    Light,
    Dark,
    /// The region claims the overlay but leaves the decision to sampling
    #[default]
    None,
}

impl ForcedTheme {
    pub fn theme(self) -> Option<Theme> {
        match self {
            Self::Light => Some(Theme::Light),
            Self::Dark => Some(Theme::Dark),
            Self::None => None,
        }
    }
}

impl From<Theme> for ForcedTheme {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::Light,
            Theme::Dark => Self::Dark,
        }
    }
}
