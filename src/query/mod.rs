//! Artifact selection: selector parsing and catalogue matching

pub mod matcher;
pub mod selector;

pub use matcher::*;
pub use selector::*;
