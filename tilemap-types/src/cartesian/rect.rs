use num_traits::Num;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. With integer coordinates it describes a block of pixels where
/// `x_max` and `y_max` are exclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect<N = i32> {
    /// Left border.
    pub x_min: N,
    /// Top border.
    pub y_min: N,
    /// Right border.
    pub x_max: N,
    /// Bottom border.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd> Rect<N> {
    /// Creates a new rectangle from its borders.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Creates a rectangle with the top left corner at `(x, y)`.
    pub fn from_origin(x: N, y: N, width: N, height: N) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Left border.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Right border.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Top border.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Bottom border.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// True if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.x_max <= self.x_min || self.y_max <= self.y_min
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    pub fn translate(&self, dx: N, dy: N) -> Self {
        Self {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Common part of the two rectangles, or `None` if they do not overlap.
    pub fn intersection(&self, other: Self) -> Option<Self> {
        let limited = Self {
            x_min: if self.x_min > other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min > other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max < other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max < other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        };

        if limited.is_empty() {
            None
        } else {
            Some(limited)
        }
    }

    /// True if the point is inside the rectangle. The right and bottom borders are exclusive.
    pub fn contains(&self, x: N, y: N) -> bool {
        self.x_min <= x && x < self.x_max && self.y_min <= y && y < self.y_max
    }
}
