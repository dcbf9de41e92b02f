//! Selector self-heal
//!
//! When a `type` or `click` fails, the healer:
//! - snapshots the live DOM (size-bounded)
//! - asks a selector suggestion service for a corrected selector
//! - extracts the first JSON object from the free-text reply
//! - retries the original action exactly once with the new selector

pub mod errors;
pub mod extract;
pub mod healer;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use errors::*;
pub use extract::*;
pub use healer::*;
pub use types::*;
