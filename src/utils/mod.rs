//! Utility module

mod error;

pub use error::{Error, Result, Stage};
