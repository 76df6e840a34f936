use std::sync::Arc;

use axum::{
    Extension,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    api::{AppState, STATE_COOKIE, session_cookie},
    spotify::auth,
};

const STATE_COOKIE_MAX_AGE: u64 = 600;

pub async fn home(Extension(state): Extension<Arc<AppState>>) -> Response {
    let oauth_state = auth::generate_state();

    match auth::authorize_url(&state.oauth, &oauth_state) {
        Ok(url) => (
            [(
                SET_COOKIE,
                session_cookie(STATE_COOKIE, &oauth_state, STATE_COOKIE_MAX_AGE),
            )],
            Redirect::to(url.as_str()),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "cannot build authorization url");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
