use std::sync::Arc;

use axum::{
    Extension,
    extract::Query,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{AppState, STATE_COOKIE, TOKEN_COOKIE, cookie_value, session_cookie},
    spotify::auth,
};

const DEFAULT_TOKEN_MAX_AGE: u64 = 3600;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    if let Some(err) = params.error {
        tracing::warn!(error = %err, "authorization denied");
        return (StatusCode::BAD_REQUEST, Html("<h4>Authorization denied.</h4>")).into_response();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, Html("<h4>Missing authorization code.</h4>"))
            .into_response();
    };

    // a pending state cookie must be answered with the same state
    if let Some(expected) = cookie_value(&headers, STATE_COOKIE) {
        if params.state.as_deref() != Some(expected.as_str()) {
            tracing::warn!(got = ?params.state, "oauth state mismatch");
            return (StatusCode::BAD_REQUEST, Html("<h4>Invalid state.</h4>")).into_response();
        }
    }

    match auth::exchange_code(&state.http, &state.oauth, &code).await {
        Ok(token) => {
            let max_age = if token.expires_in > 0 {
                token.expires_in
            } else {
                DEFAULT_TOKEN_MAX_AGE
            };
            (
                AppendHeaders([
                    (
                        SET_COOKIE,
                        session_cookie(TOKEN_COOKIE, &token.access_token, max_age),
                    ),
                    (SET_COOKIE, session_cookie(STATE_COOKIE, "", 0)),
                ]),
                Redirect::to("/top-data"),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "token exchange failed");
            (StatusCode::BAD_GATEWAY, Html("<h4>Login failed.</h4>")).into_response()
        }
    }
}
