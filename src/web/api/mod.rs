pub mod debug;
pub mod error;
pub mod telemetry;
pub mod wind;
