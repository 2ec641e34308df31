//! Domain types and the ports the orchestration layer talks to.

pub mod callback;
pub mod funding;
pub mod meta;
pub mod order;
pub mod ports;
pub mod telemetry;
