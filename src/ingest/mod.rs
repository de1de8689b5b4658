mod client;
mod error;
mod normalize;
mod types;

pub use client::{HourProbe, UpstreamClient, MAX_WINDOW_HOURS};
pub use error::IngestError;
pub use normalize::normalize;
pub use types::{Frame, PositionReport};
