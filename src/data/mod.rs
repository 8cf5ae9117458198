pub mod store;

pub use store::{JsonFileStore, MemoryStore, PersistedViewport, ViewportStore};
