pub mod centroid;

pub use centroid::{choose_center, median, robust_center};
