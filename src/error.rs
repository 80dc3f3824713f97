use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Kube(kube::Error),

    #[from]
    Infer(kube::config::InferConfigError),

    #[from]
    HttpHeader(hyper::http::Error),

    /// Forward target could not be parsed as a request URI
    #[from]
    InvalidUri(hyper::http::uri::InvalidUri),

    /// Required cluster object is missing or structurally empty
    NotFoundOrEmpty(String),

    /// Custom error message
    Custom(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Kube(e) => write!(fmt, "{e}"),
            Self::InvalidUri(e) => write!(fmt, "invalid uri: {e}"),
            Self::NotFoundOrEmpty(msg) | Self::Custom(msg) => write!(fmt, "{msg}"),
            _ => write!(fmt, "{self:?}"),
        }
    }
}

impl std::error::Error for Error {}
