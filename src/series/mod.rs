//! Series-side operations: filtering, splitting, reporting and export

pub mod export;
pub mod filter;
pub mod model;
pub mod report;
pub mod split;

pub use export::{prep_columns, write_catalogue_csv, write_series_csv};
pub use filter::{check_channels, remove_events, FilterOptions, FilterOutput, FilterWarning};
pub use model::{LyraSeries, NamedChannel};
pub use report::ArtifactStatusReport;
pub use split::{split_series, Segment};
