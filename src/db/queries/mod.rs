//! Database queries

pub mod backlog;
pub mod rates;
pub mod technician;
pub mod trip;
pub mod unit;
