//! Business logic services

pub mod day_route;
pub mod demo;
pub mod directions;
pub mod duration;
pub mod geo;
pub mod packer;
pub mod reconciler;
pub mod recurrence;
pub mod relink;
pub mod travel;
