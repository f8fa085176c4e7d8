//! Utility functions
//!
//! Helpers shared by the markup front end and the expression evaluator.

pub mod cursor;
pub mod dtoa;

pub use cursor::{Cursor, CursorError};
