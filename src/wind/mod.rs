mod client;
mod error;
mod resolver;
mod types;

pub use client::OpenMeteoClient;
pub use error::WindError;
pub use resolver::{
    direction_from_deg, nearest_index, query_window, sample_at, TierClient, WindResolver,
};
pub use types::{WindQuery, WindSample, WindSeries};
