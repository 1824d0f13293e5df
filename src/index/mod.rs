//! Indexing for interval lookups over sample axes

pub mod temporal;

pub use temporal::*;
