//! Chromium DevTools Protocol page driver.
//!
//! Implements the `PageDriver` boundary on top of chromiumoxide: one headless
//! browser process, one page, element operations that poll until their deadline.

pub mod config;
mod driver;
pub mod error;
mod scripts;

pub use config::{CdpConfig, CHROME_PATH_ENV};
pub use driver::ChromiumPageDriver;
pub use error::AdapterError;
