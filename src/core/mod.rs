//! Core data types and models

pub mod catalogue;
pub mod merge;
pub mod record;
pub mod temporal;
pub mod vocabulary;

pub use catalogue::*;
pub use merge::*;
pub use record::*;
pub use temporal::*;
pub use vocabulary::*;
