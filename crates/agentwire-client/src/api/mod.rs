//! API endpoint implementations.

mod control;
mod runs;

pub use control::ControlApi;
pub use runs::RunsApi;
