use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token file {} exists but could not be parsed ({reason}) - delete it and re-run to authorize again", .path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("no authorization code received")]
    NoAuthorizationCode,

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("token refresh failed: {0}")]
    Refresh(String),
}
