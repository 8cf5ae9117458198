pub mod debounce;
pub mod events;
pub mod handler;

// Re-export the essential types
pub use debounce::Debouncer;
pub use events::{EventHandled, InputEvent, KeyCode};
pub use handler::GestureController;
