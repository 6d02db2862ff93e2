//! Data preparation for text classification: schema-checked CSV
//! loading, frozen stratified train/validation splits, sanity
//! reports, and tokenized batch loaders for Burn.

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{DataError, Result};
