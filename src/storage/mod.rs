//! Storage layer: annotation tables, loaders and the local annotation store

pub mod annotation_file;
pub mod loader;
pub mod store;
pub mod table;

pub use annotation_file::{AnnotationHeader, AnnotationReader, AnnotationWriter};
pub use loader::*;
pub use store::*;
pub use table::*;
