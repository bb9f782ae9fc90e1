//! Parley library exports for the binary and integration tests

pub mod backend;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
