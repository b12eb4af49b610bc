//! Interactive OAuth2 authorization-code flow.
//!
//! Two interchangeable strategies obtain the authorization code:
//!
//! - `Browser`: open the authorization URL in the default browser and wait on
//!   a one-shot localhost listener for the redirect carrying the code.
//! - `Manual`: print the URL, let the user open it themselves, and read the
//!   redirect URL they paste back.
//!
//! Either way the code is then exchanged at the token endpoint for a fresh
//! credential. There is no retry anywhere in the flow - a failed exchange or
//! a redirect without a code aborts the invocation.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};
use url::Url;

use crate::api::StravaClient;
use crate::config::Config;

use super::{AuthError, Credential};

/// Authorization endpoint (the token endpoint lives in the API client)
const AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";

/// Scopes requested: profile read plus all activities
const AUTH_SCOPES: &str = "read,activity:read_all";

/// Fixed loopback redirect target registered with the API application
const REDIRECT_PORT: u16 = 8000;
const CALLBACK_PATH: &str = "/callback";

const SUCCESS_BODY: &str = "Authorization successful. You can close this tab.";
const FAILURE_BODY: &str = "Authorization failed: no code received.";

/// How the authorization code is obtained from the user's browser session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    Browser,
    Manual,
}

pub struct AuthorizationFlow {
    client_id: i64,
    client_secret: String,
    strategy: AuthStrategy,
    listen_timeout: Option<Duration>,
}

impl AuthorizationFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.client_id,
            client_secret: config.client_secret.clone(),
            strategy: config.auth_strategy,
            listen_timeout: config.listen_timeout,
        }
    }

    /// Run the configured strategy to completion and exchange the resulting
    /// code for a credential.
    pub async fn run(&self, api: &StravaClient) -> Result<Credential> {
        let code = match self.strategy {
            AuthStrategy::Browser => self.wait_for_callback().await?,
            AuthStrategy::Manual => self.read_pasted_redirect()?,
        };

        api.exchange_code(self.client_id, &self.client_secret, &code)
            .await
            .map_err(|e| AuthError::Exchange(format!("{:#}", e)).into())
    }

    fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri=http://localhost:{}{}&response_type=code&approval_prompt=auto&scope={}",
            AUTHORIZE_URL, self.client_id, REDIRECT_PORT, CALLBACK_PATH, AUTH_SCOPES
        )
    }

    /// Browser strategy: open the authorization URL, then block on a one-shot
    /// listener until the redirect delivers the code (or the optional timeout
    /// elapses).
    async fn wait_for_callback(&self) -> Result<String> {
        let auth_url = self.authorization_url();
        println!("Opening browser for Strava authorization...\n{}\n", auth_url);
        if webbrowser::open(&auth_url).is_err() {
            warn!("Could not open a browser; open the URL above manually");
        }

        let listener = TcpListener::bind(("127.0.0.1", REDIRECT_PORT))
            .await
            .with_context(|| format!("Failed to bind callback listener on port {}", REDIRECT_PORT))?;

        let code = match self.listen_timeout {
            Some(timeout) => tokio::time::timeout(timeout, accept_one_callback(&listener))
                .await
                .map_err(|_| AuthError::NoAuthorizationCode)??,
            None => accept_one_callback(&listener).await?,
        };

        code.ok_or_else(|| AuthError::NoAuthorizationCode.into())
    }

    /// Manual strategy: the user opens the URL themselves and pastes back the
    /// redirect URL their browser landed on.
    fn read_pasted_redirect(&self) -> Result<String> {
        let auth_url = self.authorization_url();
        println!("Open this URL in your browser and approve access:\n{}\n", auth_url);
        println!("Paste the full redirect URL here and press enter:");

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read redirect URL from stdin")?;

        code_from_redirect_url(line.trim()).ok_or_else(|| AuthError::NoAuthorizationCode.into())
    }
}

/// Accept exactly one request, answer it, and return the extracted code.
/// The listener stops being polled as soon as this returns - it is a wait for
/// a single value, not a server.
async fn accept_one_callback(listener: &TcpListener) -> Result<Option<String>> {
    let (mut stream, peer) = listener
        .accept()
        .await
        .context("Failed to accept callback connection")?;
    debug!(%peer, "Callback connection accepted");

    let request_line = read_request_line(&mut stream).await?;
    let code = code_from_request_line(&request_line);

    if code.is_some() {
        respond(&mut stream, "200 OK", SUCCESS_BODY).await?;
    } else {
        respond(&mut stream, "400 Bad Request", FAILURE_BODY).await?;
    }

    Ok(code)
}

/// Read up to the end of the request head and return the first line.
async fn read_request_line(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .context("Failed to read callback request")?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 8192 {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf);
    Ok(head.lines().next().unwrap_or_default().to_string())
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write callback response")?;
    let _ = stream.shutdown().await;
    Ok(())
}

/// Extract the `code` query parameter from an HTTP request line like
/// `GET /callback?code=abc&scope=read HTTP/1.1`.
fn code_from_request_line(line: &str) -> Option<String> {
    let target = line.split_whitespace().nth(1)?;
    if !target.starts_with(CALLBACK_PATH) {
        return None;
    }
    code_from_redirect_url(&format!("http://localhost:{}{}", REDIRECT_PORT, target))
}

/// Extract the `code` query parameter from a full redirect URL
fn code_from_redirect_url(redirect: &str) -> Option<String> {
    let url = Url::parse(redirect).ok()?;
    url.query_pairs()
        .find(|(key, value)| key == "code" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
