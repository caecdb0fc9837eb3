//! ccsvc - census contact-centre case service
//!
//! Resolves census cases across the case registry, a local cache of
//! newly-reported addresses and the address index, validates agent requests
//! against the business rules, and emits one outbound event per accepted
//! operation.

pub mod bus;
pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod products;
pub mod service;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{CaseError, Result};
pub use service::CaseService;
