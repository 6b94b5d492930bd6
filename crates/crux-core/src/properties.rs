use serde::{Deserialize, Serialize};

use crate::{Vec2i, Vec2u};

/// Basic properties of a window.
///
/// Held separately from [`Window`](crate::Window) so they can be
/// serialized and passed around as a parameter object. Missing fields
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowProperties {
    /// Title shown in the platform UI.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Horizontal screen position in pixels. Negative means unspecified.
    pub position_x: i32,
    /// Vertical screen position in pixels. Negative means unspecified.
    pub position_y: i32,
    /// When a position component is unspecified: `true` centers the window
    /// on that axis, `false` lets the OS decide.
    pub position_centered: bool,
}

impl WindowProperties {
    /// Sentinel for a position component the caller did not specify.
    pub const POSITION_UNDEFINED: i32 = -1;

    /// Both position components unspecified.
    pub const POSITION_UNDEFINED_VEC: Vec2i = Vec2i::splat(Self::POSITION_UNDEFINED);

    /// Creates properties with the given title and size. The position is
    /// left unspecified and centered.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Default::default()
        }
    }

    /// Creates properties from size and position vectors.
    pub fn from_vectors(
        title: impl Into<String>,
        size: Vec2u,
        position: Vec2i,
        centered: bool,
    ) -> Self {
        Self {
            title: title.into(),
            width: size.x,
            height: size.y,
            position_x: position.x,
            position_y: position.y,
            position_centered: centered,
        }
    }

    /// Returns a copy with an explicit screen position.
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    /// Returns a copy with the centering flag set.
    pub fn with_centered(mut self, centered: bool) -> Self {
        self.position_centered = centered;
        self
    }

    pub fn size(&self) -> Vec2u {
        Vec2u::new(self.width, self.height)
    }

    pub fn position(&self) -> Vec2i {
        Vec2i::new(self.position_x, self.position_y)
    }

    /// Interprets each position axis, resolving unspecified components
    /// through `position_centered`.
    pub fn placement(&self) -> (AxisPlacement, AxisPlacement) {
        (
            AxisPlacement::from_component(self.position_x, self.position_centered),
            AxisPlacement::from_component(self.position_y, self.position_centered),
        )
    }
}

impl Default for WindowProperties {
    fn default() -> Self {
        Self {
            title: "Unknown".into(),
            width: 0,
            height: 0,
            position_x: Self::POSITION_UNDEFINED,
            position_y: Self::POSITION_UNDEFINED,
            position_centered: true,
        }
    }
}

/// How a single position axis should be placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPlacement {
    /// An explicit coordinate in screen pixels.
    Fixed(i32),
    /// Center the window on this axis.
    Centered,
    /// Let the OS pick.
    OsDefault,
}

impl AxisPlacement {
    fn from_component(value: i32, centered: bool) -> Self {
        match value {
            v if v >= 0 => Self::Fixed(v),
            _ if centered => Self::Centered,
            _ => Self::OsDefault,
        }
    }

    /// Resolves to a concrete coordinate given the screen and window
    /// extents along this axis. Returns `None` for [`AxisPlacement::OsDefault`].
    ///
    /// A window larger than the screen is pinned to the origin.
    pub fn resolve(self, screen_extent: u32, window_extent: u32) -> Option<i32> {
        match self {
            Self::Fixed(v) => Some(v),
            Self::Centered => {
                let offset = (i64::from(screen_extent) - i64::from(window_extent)) / 2;
                Some(offset.clamp(0, i64::from(i32::MAX)) as i32)
            }
            Self::OsDefault => None,
        }
    }
}
