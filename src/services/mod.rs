//! Planning engine services

pub mod candidates;
pub mod costs;
pub mod planner;
pub mod pm;
pub mod scoring;
pub mod store;

#[cfg(test)]
pub mod testutil;
