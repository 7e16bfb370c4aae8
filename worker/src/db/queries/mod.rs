//! Database queries

pub mod client;
pub mod job;
pub mod settings;
