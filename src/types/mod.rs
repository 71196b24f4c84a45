//! Type definitions

pub mod backlog;
pub mod messages;
pub mod plan;
pub mod task;
pub mod technician;
pub mod trip;
pub mod unit;

pub use backlog::*;
pub use messages::*;
pub use plan::*;
pub use task::*;
pub use technician::*;
pub use trip::*;
pub use unit::*;
