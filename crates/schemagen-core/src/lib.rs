//! Core contracts for schemagen.
//!
//! This crate defines the generated value tree shared by the generation
//! engine, the export layer and the CLI.

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{Value, format_date, parse_date};
