//! WebSocket upgrade for debate sessions.
//!
//! The `/ws` endpoint resolves the connection's identity (session cookie,
//! then `visitor_id` query parameter, then guest) and hands the socket to a
//! [`SessionLoop`].

use std::collections::HashMap;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::response::IntoResponse;
use futures_util::StreamExt;

use shurahub_core::identity::resolve_identity;
use shurahub_types::session::Identity;

use crate::session::SessionLoop;
use crate::state::AppState;

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Identity for a request: verified session cookie, else visitor id, else guest.
pub fn request_identity(
    state: &AppState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Identity {
    let auth = &state.config.auth;
    let token = cookie_value(headers, &auth.cookie_name);
    let visitor = query.get(&auth.visitor_param).cloned();
    resolve_identity(state.resolver.as_deref(), token.as_deref(), visitor)
}

/// GET /ws - upgrade to a debate session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let identity = request_identity(&state, &headers, &query);
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (tx, rx) = socket.split();
    SessionLoop::new(state.orchestrator.clone(), identity)
        .run(tx, rx)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; user-session=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            cookie_value(&headers, "user-session").as_deref(),
            Some("abc.def.ghi")
        );
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("user-session=\"tok\""));
        assert_eq!(cookie_value(&headers, "user-session").as_deref(), Some("tok"));
    }
}
