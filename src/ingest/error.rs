use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hour out of range: {0}")]
    HourOutOfRange(u32),
}
