#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// HTTP transport failure (connection, timeout, body decode).
    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request with a non-2xx status.
    #[error("{operation} failed with status {status}: {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// Bearer token rejected by the backend (401). The session has expired
    /// and must be torn down via
    /// [`SessionStore::handle_unauthorized`](crate::SessionStore::handle_unauthorized).
    #[error("session expired or token invalid")]
    Unauthorized,

    /// `login` was called with credentials that cannot form a valid session.
    #[error("invalid credentials shape: {0}")]
    InvalidCredentialsShape(&'static str),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
