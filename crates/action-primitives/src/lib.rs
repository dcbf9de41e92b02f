//! Page automation driver boundary
//!
//! This crate defines what the execution engine needs from a browser:
//! - The `PageDriver` trait (navigate, fill, click, wait-for, text, DOM, screenshot)
//! - `ActionError`, the uniform failure value for every driver call
//! - Fixed interaction timeouts and a deadline guard for hung drivers
//! - `perform_interaction`, the single dispatch point for `type` and `click`

mod driver;
pub mod errors;
mod interact;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use driver::*;
pub use errors::*;
pub use interact::*;
pub use types::*;
