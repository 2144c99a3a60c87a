//! One pure function per transform. Inputs are never modified.

pub mod columns;
pub mod convert;
pub mod fill;
pub mod outliers;
pub mod rows;
pub mod text;
