// src/lib.rs

//! web-monitor library
//!
//! Detects changes on watched web pages and new keyword-relevant entries in
//! feeds, remembering what it has seen in a fingerprint store.

#[cfg(feature = "aws")]
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testutil;
