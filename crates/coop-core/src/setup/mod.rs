//! Run Setup
//!
//! Network loading and initial strategy assignment.

pub mod initial;
pub mod loader;

pub use initial::coin_flip;
pub use loader::{load_path, load_signed, load_unsigned, LoadError};
