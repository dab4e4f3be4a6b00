// Pure helpers for the browser host. No web-sys here, so host-side tests can
// include this file directly.

use gazeplay_core::ConnectionState;

pub const TRACKER_QUERY_KEY: &str = "tracker";

/// Value of `?tracker=` if it names a WebSocket endpoint.
pub fn tracker_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    (url.starts_with("ws://") || url.starts_with("wss://")).then(|| url.to_string())
}

#[inline]
pub fn is_exit_key(key: &str) -> bool {
    key == "Escape"
}

/// Extra class for the status indicator, on top of `status-indicator`.
pub fn status_class(state: ConnectionState) -> Option<&'static str> {
    match state {
        ConnectionState::Connected => Some("connected"),
        ConnectionState::Disconnected => Some("disconnected"),
        ConnectionState::Connecting => None,
    }
}
