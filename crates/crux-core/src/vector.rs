use std::fmt;

use serde::{Deserialize, Serialize};

/// A two-component vector used for window positions and extents.
///
/// Equality compares both components. No ordering is defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T,
}

/// Signed vector, used for screen positions.
pub type Vec2i = Vector2<i32>;

/// Unsigned vector, used for window sizes.
pub type Vec2u = Vector2<u32>;

impl<T> Vector2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy> Vector2<T> {
    /// Returns a vector with both components set to `value`.
    pub const fn splat(value: T) -> Self {
        Self { x: value, y: value }
    }
}

impl<T> From<(T, T)> for Vector2<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T> From<Vector2<T>> for (T, T) {
    fn from(v: Vector2<T>) -> Self {
        (v.x, v.y)
    }
}

impl<T: fmt::Display> fmt::Display for Vector2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_requires_both_components() {
        // Arrange
        let a = Vec2i::new(1, 2);

        // Assert
        assert_eq!(a, Vec2i::new(1, 2));
        assert_ne!(a, Vec2i::new(1, 3));
        assert_ne!(a, Vec2i::new(0, 2));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Vec2u::default(), Vec2u::new(0, 0));
    }

    #[test]
    fn converts_from_tuple() {
        // Act
        let v: Vec2u = (800, 600).into();

        // Assert
        assert_eq!(v.x, 800);
        assert_eq!(v.y, 600);
        assert_eq!(<(u32, u32)>::from(v), (800, 600));
    }

    #[test]
    fn splat_repeats_the_value() {
        assert_eq!(Vec2i::splat(-1), Vec2i::new(-1, -1));
    }

    #[test]
    fn displays_as_pair() {
        assert_eq!(Vec2i::new(-1, 5).to_string(), "(-1, 5)");
    }
}
