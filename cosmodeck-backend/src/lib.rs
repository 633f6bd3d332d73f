pub mod config;
pub mod logging;
pub mod module;
pub mod service;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
