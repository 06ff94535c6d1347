use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipJobError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint {endpoint_url} responded with status {status}: {body}")]
    Api {
        endpoint_url: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {endpoint_url}: {source}")]
    Decode {
        endpoint_url: String,
        #[source]
        source: serde_json::Error,
    },
}
