//! User interaction with the map.
//!
//! The application translates input of its windowing system into [`UserEvent`]s and gives them
//! to [`MapController::handle`](crate::MapController::handle). All positions and deltas are in
//! viewport pixels, with `x` growing to the right and `y` growing down.

use tilemap_types::cartesian::{Point2d, Size, Vector2d};
use tilemap_types::geo::GeoPoint2d;

/// Input event handled by the map controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// The pointer was dragged by the given delta. The map content follows the pointer.
    Drag(Vector2d),
    /// The view is moved by the given delta, as done by the arrow keys.
    Move(Vector2d),
    /// Zoom in by one level.
    ZoomIn,
    /// Zoom out by one level.
    ZoomOut,
    /// Double click at the given viewport position. The map is zoomed in around this point.
    DoubleClick(Point2d),
    /// Center the map at the point.
    CenterOn(GeoPoint2d),
    /// Search text entered by the user: either `lon,lat` or a place name for the geocoder.
    Search(String),
    /// A key was pressed.
    Key(MapKey),
    /// The viewport was resized.
    Resize(Size<u32>),
    /// The display switched between standard and high pixel density.
    SetHiDpi(bool),
}

/// Keys that control the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
}

impl MapKey {
    /// Parses a key from its text representation as reported by most toolkits (`"+"`,
    /// `"ArrowUp"`, `"Up"` etc.). Keys that do not control the map give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "+" | "=" | "Plus" | "Add" => Self::Plus,
            "-" | "Minus" | "Subtract" => Self::Minus,
            "Up" | "ArrowUp" => Self::Up,
            "Down" | "ArrowDown" => Self::Down,
            "Left" | "ArrowLeft" => Self::Left,
            "Right" | "ArrowRight" => Self::Right,
            _ => return None,
        })
    }

    /// The event the key stands for. Arrow keys move the view by `pan_step` pixels.
    pub fn to_event(self, pan_step: f64) -> UserEvent {
        match self {
            Self::Plus => UserEvent::ZoomIn,
            Self::Minus => UserEvent::ZoomOut,
            Self::Up => UserEvent::Move(Vector2d::new(0.0, -pan_step)),
            Self::Down => UserEvent::Move(Vector2d::new(0.0, pan_step)),
            Self::Left => UserEvent::Move(Vector2d::new(-pan_step, 0.0)),
            Self::Right => UserEvent::Move(Vector2d::new(pan_step, 0.0)),
        }
    }
}
