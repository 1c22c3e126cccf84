//! Infrastructure layer for semdex.
//!
//! Contains implementations of the ports defined in `semdex-core`: SQLite
//! embedding storage, fastembed-backed learned models, and the config loader.

pub mod config;
pub mod generator;
pub mod sqlite;
pub mod vector;
