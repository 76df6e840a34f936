use std::fmt;

use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, Url};

use crate::{config::OAuthSettings, types::Token};

#[derive(Debug)]
pub enum AuthError {
    InvalidUrl(String),
    Http(reqwest::Error),
    Rejected { status: u16, body: String },
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidUrl(e) => write!(f, "invalid authorization url: {}", e),
            AuthError::Http(e) => write!(f, "token request failed: {}", e),
            AuthError::Rejected { status, body } => {
                write!(f, "token endpoint answered {}: {}", status, body)
            }
            AuthError::MissingToken => write!(f, "token response carried no access_token"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Http(err)
    }
}

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Builds the URL the user is redirected to for authorization.
///
/// Carries `response_type=code`, `client_id`, `redirect_uri`, `scope` and the
/// given `state`, all properly query-encoded.
///
/// # Example
///
/// ```
/// let url = authorize_url(&settings.oauth, &generate_state())?;
/// // https://accounts.spotify.com/authorize?response_type=code&client_id=...
/// ```
pub fn authorize_url(oauth: &OAuthSettings, state: &str) -> Result<Url, AuthError> {
    Url::parse_with_params(
        &oauth.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", oauth.client_id.as_str()),
            ("redirect_uri", oauth.redirect_uri.as_str()),
            ("scope", oauth.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(e.to_string()))
}

/// Exchanges an authorization code for an access token.
///
/// Sends a form-encoded `authorization_code` grant with the client credentials
/// in the body. Single request, no retry.
///
/// # Errors
///
/// - `AuthError::Http` on network failures or an undecodable body
/// - `AuthError::Rejected` when the token endpoint answers non-2xx
/// - `AuthError::MissingToken` when the body has no usable `access_token`
pub async fn exchange_code(
    client: &Client,
    oauth: &OAuthSettings,
    code: &str,
) -> Result<Token, AuthError> {
    let res = client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", oauth.redirect_uri.as_str()),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let token: Token = res.json().await?;
    if token.access_token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
