pub type ReittiResult<T> = Result<T, ReittiError>;

#[derive(thiserror::Error, Debug)]
pub enum ReittiError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("gpx error: {0}")]
    Gpx(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReittiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn gpx(msg: impl Into<String>) -> Self {
        Self::Gpx(msg.into())
    }

    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// `true` for the "nothing to render" outcome, which callers report but do not treat as
    /// a failed run.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}

impl From<config::ConfigError> for ReittiError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
