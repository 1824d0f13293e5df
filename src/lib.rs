//! LYTAF: artifact filtering for LYRA time series
//!
//! Removes the periods listed in the LYRA annotation databases (LYTAF) from
//! irradiance time series, reports which annotations were applied, and
//! splits series around them.
//!
//! # Core Concepts
//!
//! - **Records**: Annotated intervals with a begin, end and event type
//! - **Catalogue**: Deduplicated records merged from one or more sources
//! - **Selectors**: Event-type names or numeric LYRA codes to act on
//! - **Masks**: Closed-interval sample masks applied to every channel alike
//!
//! # Example
//!
//! ```no_run
//! use lytaf::prelude::*;
//!
//! # fn example(time: Vec<Timestamp>, flux: Vec<f64>) -> lytaf::error::Result<()> {
//! let db = LytafDB::open(&LytafConfig::default())?;
//!
//! let selector = ArtifactSelector::parse("LAR, Offpoint")?;
//! let output = db.remove_events(
//!     &time,
//!     Some(std::slice::from_ref(&flux)),
//!     Some(&selector),
//!     &[],
//!     FilterOptions::with_report(),
//! )?;
//! println!("{} samples left", output.time.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod index;
pub mod query;
pub mod series;
pub mod storage;

/// Main engine type
pub mod db;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::LytafConfig;
    pub use crate::core::*;
    pub use crate::db::{FilteredSeries, LytafDB};
    pub use crate::error::{Error, Result};
    pub use crate::query::{ArtifactCode, ArtifactSelector};
    pub use crate::series::*;
    pub use crate::storage::*;
}
