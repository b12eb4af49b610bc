//! Session provisioning: the one decision made at every startup.
//!
//! `get_authenticated_session` runs a strict priority chain:
//!
//! 1. saved credential still fresh -> reuse it, no network, no store write
//! 2. saved credential with a refresh token -> refresh, persist, use
//! 3. otherwise -> full authorization flow, persist, use
//!
//! A refresh failure is fatal and deliberately does NOT fall back to the full
//! flow: a revoked refresh token should surface loudly, not trigger a silent
//! re-authorization.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::StravaClient;
use crate::config::Config;

use super::{AuthError, AuthorizationFlow, Credential, TokenStore};

/// An authenticated handle on the API, rebuilt each invocation.
pub struct AuthorizedSession {
    pub credential: Credential,
    pub client: StravaClient,
}

/// Which branch of the priority chain applies to the saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPlan {
    Reuse,
    Refresh,
    Authorize,
}

/// Pure decision procedure - first matching branch wins.
fn plan(saved: Option<&Credential>, now: DateTime<Utc>) -> SessionPlan {
    match saved {
        Some(credential) if credential.is_fresh(now) => SessionPlan::Reuse,
        Some(credential) if !credential.refresh_token.is_empty() => SessionPlan::Refresh,
        _ => SessionPlan::Authorize,
    }
}

/// Return a ready-to-use authenticated session, reusing, refreshing, or
/// re-authorizing the stored credential as needed. Branches that obtain a new
/// credential persist it before the session is constructed.
pub async fn get_authenticated_session(config: &Config) -> Result<AuthorizedSession> {
    let store = TokenStore::new(config.token_path.clone());
    let api = StravaClient::new()?;
    let saved = store.load()?;

    let credential = match (plan(saved.as_ref(), Utc::now()), saved) {
        (SessionPlan::Reuse, Some(credential)) => {
            info!("Using saved token");
            println!("Using saved token.");
            credential
        }
        (SessionPlan::Refresh, Some(stale)) => {
            info!("Saved token expired, refreshing");
            println!("Token expired, refreshing...");
            let fresh = api
                .refresh_access_token(config.client_id, &config.client_secret, &stale.refresh_token)
                .await
                .map_err(|e| AuthError::Refresh(format!("{:#}", e)))?;
            store.save(&fresh)?;
            fresh
        }
        _ => {
            info!("No usable saved token, starting authorization flow");
            println!("No saved token found, starting OAuth flow...");
            let flow = AuthorizationFlow::new(config);
            let credential = flow.run(&api).await?;
            store.save(&credential)?;
            credential
        }
    };

    let client = api.with_token(credential.access_token.clone());
    Ok(AuthorizedSession { credential, client })
}
