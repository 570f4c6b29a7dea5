//! Library tests and fixtures

pub mod fixtures;
mod query_tests;
