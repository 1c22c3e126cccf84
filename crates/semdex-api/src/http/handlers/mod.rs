//! HTTP request handlers for the REST API.

pub mod embedding;
pub mod index;
pub mod search;
pub mod stats;
