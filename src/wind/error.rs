use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed series: {0}")]
    MalformedSeries(&'static str),
}
