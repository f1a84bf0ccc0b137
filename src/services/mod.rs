//! External service interactions
//!
//! This module contains services for reading data from disk:
//! - Row files (CSV, JSON, YAML)
//! - Column descriptor files and column inference

pub mod loader;

pub use loader::{infer_columns, load_columns, load_rows, DataFormat, LoadedData};
