//! Authentication module: OAuth token lifecycle.
//!
//! This module provides:
//! - `TokenStore` / `Credential`: on-disk persistence of the token triple
//! - `AuthorizationFlow`: the interactive authorization-code grant
//! - `get_authenticated_session`: the startup decision chain combining both
//!
//! All failures here are fatal for the invocation; nothing retries.

pub mod error;
pub mod flow;
pub mod session;
pub mod token_store;

pub use error::AuthError;
pub use flow::{AuthStrategy, AuthorizationFlow};
pub use session::{get_authenticated_session, AuthorizedSession};
pub use token_store::{Credential, TokenStore};
