//! API client for the Strava v3 REST API.
//!
//! This module provides the `StravaClient` struct for the OAuth token
//! endpoint (code exchange and refresh) and for authenticated data requests
//! (athlete profile, paginated activity feed).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::auth::Credential;
use crate::models::{Activity, Athlete};

use super::ApiError;

/// Base URL for the OAuth endpoints
const OAUTH_BASE_URL: &str = "https://www.strava.com/oauth";

/// Base URL for data endpoints
const API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Activities fetched per page. 200 is the API maximum.
const ACTIVITIES_PER_PAGE: usize = 200;

/// Token endpoint response, shared by code exchange and refresh.
/// Always consumed wholesale - a refresh replaces every field of the saved
/// credential, never merges into it.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
}

impl From<TokenResponse> for Credential {
    fn from(token: TokenResponse) -> Self {
        Credential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_at,
        }
    }
}

/// API client for Strava.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StravaClient {
    client: Client,
    token: Option<String>,
}

impl StravaClient {
    /// Create a new API client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, token: None })
    }

    /// Create a new StravaClient with the given bearer token, sharing the
    /// connection pool with this one.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            token: Some(token),
        }
    }

    /// Exchange an authorization code for a credential
    pub async fn exchange_code(
        &self,
        client_id: i64,
        client_secret: &str,
        code: &str,
    ) -> Result<Credential> {
        let params = [
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
            ("code", code.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ];
        self.token_request(&params)
            .await
            .context("Authorization code exchange request failed")
    }

    /// Trade a refresh token for a brand-new credential
    pub async fn refresh_access_token(
        &self,
        client_id: i64,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Credential> {
        let params = [
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];
        self.token_request(&params)
            .await
            .context("Token refresh request failed")
    }

    async fn token_request(&self, params: &[(&str, String)]) -> Result<Credential> {
        let url = format!("{}/token", OAUTH_BASE_URL);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(params)
            .send()
            .await
            .context("Failed to send token request")?;

        let response = Self::check_response(response).await?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;
        Ok(token.into())
    }

    /// Fetch the authenticated athlete's profile
    pub async fn get_athlete(&self) -> Result<Athlete> {
        let url = format!("{}/athlete", API_BASE_URL);
        self.get(&url).await
    }

    /// Fetch the athlete's activities, newest first.
    ///
    /// Walks the paginated feed until a short page (or `limit` is reached).
    /// `after` restricts the listing to activities started after that instant.
    pub async fn list_activities(
        &self,
        after: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = Vec::new();
        let mut page = 1usize;

        loop {
            let per_page = limit
                .map(|l| l.min(ACTIVITIES_PER_PAGE))
                .unwrap_or(ACTIVITIES_PER_PAGE);

            let mut url = format!(
                "{}/athlete/activities?page={}&per_page={}",
                API_BASE_URL, page, per_page
            );
            if let Some(after) = after {
                url.push_str(&format!("&after={}", after.timestamp()));
            }

            let batch: Vec<Activity> = self.get(&url).await?;
            let fetched = batch.len();
            debug!(page, fetched, "Fetched activity page");
            activities.extend(batch);

            if let Some(limit) = limit {
                if activities.len() >= limit {
                    activities.truncate(limit);
                    break;
                }
            }
            if fetched < per_page {
                break;
            }
            page += 1;
        }

        Ok(activities)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}
