//! World Coordinates
//!
//! Host coordinates are plain floats; nothing in the session core does
//! physics, so there is no fixed-point layer here.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A point in the host world.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X component
    pub x: f64,
    /// Y component (vertical)
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Position {
    /// World origin
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same column, moved down by `amount`.
    #[inline]
    pub fn lowered(self, amount: f64) -> Self {
        Self {
            y: self.y - amount,
            ..self
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}
