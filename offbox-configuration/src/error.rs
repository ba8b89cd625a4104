use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid YAML configuration: {0}")]
    Parse(String),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
    #[error("scope url must be http or https, got {0}")]
    UnsupportedScope(String),
    #[error("asset {asset:?} does not resolve against the scope url: {source}")]
    InvalidAsset {
        asset: String,
        #[source]
        source: url::ParseError,
    },
    #[error("classifier markers must not be empty strings")]
    EmptyMarker,
}
