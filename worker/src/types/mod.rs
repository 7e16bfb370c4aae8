//! Type definitions

pub mod client;
pub mod job;
pub mod messages;
pub mod route;
pub mod settings;

pub use client::*;
pub use job::*;
pub use messages::*;
pub use route::*;
pub use settings::*;
