//! Page driver module
//!
//! This module contains everything that touches the network:
//! - The `PageDriver` trait the harvester and crawler are written against
//! - Readiness conditions and the typed per-page error
//! - An HTTP implementation with timeouts and response classification

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod traits;

pub use http::{build_http_client, HttpPageDriver};
pub use traits::{DriverError, DriverResult, PageDriver, Readiness};
