//! Library side of the `data-sweeper` command-line tool.

pub mod logging;
pub mod pipeline;
pub mod recipe;
