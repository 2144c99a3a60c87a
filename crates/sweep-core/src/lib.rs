//! Session state for the data sweeper.
//!
//! A [`Session`] owns every loaded [`Dataset`] by name together with the
//! current-dataset pointer. Each dataset keeps the table as loaded and a
//! working table that transforms replace; a transform either succeeds and
//! replaces the working table or fails and leaves it untouched.
//!
//! Column selections live on the dataset and are checked against the
//! working table whenever they are read, so transforms that drop or rename
//! columns never leave a selection pointing at missing columns.

mod dataset;
pub mod error;
mod sample;
mod selection;
mod session;

pub use dataset::Dataset;
pub use error::{Result, SessionError};
pub use sample::{SAMPLE_DATASET, sample_table};
pub use selection::ExportRequest;
pub use session::Session;
