/// Messenger is used to notify the application that the map needs to be redrawn.
pub trait Messenger: Send + Sync {
    /// Requests the map to be redrawn.
    fn request_redraw(&self);
}

