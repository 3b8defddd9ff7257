#![forbid(unsafe_code)]

pub mod config;
pub mod datamodel;
pub mod encoding;
pub mod pipeline;
pub mod reconcile;
pub mod sources;
pub mod transport;
pub mod writers;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
