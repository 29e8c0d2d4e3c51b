//! redseed-lib: declarative seeding of tracker reference data
//!
//! This crate provides everything behind the `redseed` binary:
//! - `desired`: the desired-state document, its categories and schemas
//! - `target`: adapters that list, create and update records in the target
//! - `reconcile`: the create / update / no-op decision for every record
//! - `report`: per-record outcomes of a run

pub mod config;
pub mod consts;
pub mod desired;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod target;
