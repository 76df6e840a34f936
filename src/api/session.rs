use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};

/// Cookie carrying the access token between `/callback` and `/top-data`.
pub const TOKEN_COOKIE: &str = "sportop_token";
/// Cookie carrying the OAuth `state` between `/` and `/callback`.
pub const STATE_COOKIE: &str = "sportop_state";

/// Looks up a cookie by name across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `Set-Cookie` value for an HttpOnly, path-wide session cookie.
///
/// `max_age` of zero expires the cookie.
pub fn session_cookie(name: &str, value: &str, max_age: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age
    )
}
