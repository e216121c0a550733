//! Header manipulation for proxied requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Real-IP, X-Forwarded-For, X-Forwarded-Proto
//! - Reinstate Connection/Upgrade when the client asked to upgrade
//!
//! # Design Decisions
//! - X-Forwarded-For appends the client IP, preserving upstream proxies
//! - The original Host header is left untouched for the origin
//! - Upgrade intent is detected before stripping, then re-applied

use std::net::IpAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, UPGRADE};

pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Hop-by-hop headers per RFC 9110 §7.6.1; never forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    HeaderName::from_static("connection"),
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-authenticate"),
    HeaderName::from_static("proxy-authorization"),
    HeaderName::from_static("te"),
    HeaderName::from_static("trailer"),
    HeaderName::from_static("transfer-encoding"),
    HeaderName::from_static("upgrade"),
];

/// Remove hop-by-hop headers from a request or response header map.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

/// The protocol the client asked to upgrade to, if the request carries
/// `Connection: upgrade` alongside an `Upgrade` header.
pub fn upgrade_token(headers: &HeaderMap) -> Option<HeaderValue> {
    let connection = headers.get(CONNECTION)?.to_str().ok()?;
    let wants_upgrade = connection
        .split(',')
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    if !wants_upgrade {
        return None;
    }
    headers.get(UPGRADE).cloned()
}

/// Add the identifying headers the origin expects. Call after
/// [`strip_hop_by_hop`]; passing the upgrade token reinstates the
/// Connection/Upgrade pair for protocol switches.
pub fn apply_forwarding(headers: &mut HeaderMap, client_ip: IpAddr, upgrade: Option<&HeaderValue>) {
    let ip_text = client_ip.to_string();
    // An IP address is always a valid header value.
    let ip_value = HeaderValue::from_str(&ip_text).expect("ip header value");

    headers.insert(X_REAL_IP, ip_value.clone());

    let forwarded = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => HeaderValue::from_str(&format!("{existing}, {ip_text}"))
            .unwrap_or_else(|_| ip_value.clone()),
        None => ip_value,
    };
    headers.insert(X_FORWARDED_FOR, forwarded);

    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(token) = upgrade {
        headers.insert(CONNECTION, HeaderValue::from_static("upgrade"));
        headers.insert(UPGRADE, token.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_ip() -> IpAddr {
        "203.0.113.7".parse().unwrap()
    }

    #[test]
    fn forwarded_for_is_set_when_absent() {
        let mut headers = HeaderMap::new();
        apply_forwarding(&mut headers, client_ip(), None);

        assert_eq!(headers.get(X_FORWARDED_FOR).unwrap(), "203.0.113.7");
        assert_eq!(headers.get(X_REAL_IP).unwrap(), "203.0.113.7");
        assert_eq!(headers.get(X_FORWARDED_PROTO).unwrap(), "http");
    }

    #[test]
    fn forwarded_for_appends_to_existing_chain() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("198.51.100.1"));
        apply_forwarding(&mut headers, client_ip(), None);

        assert_eq!(
            headers.get(X_FORWARDED_FOR).unwrap(),
            "198.51.100.1, 203.0.113.7"
        );
    }

    #[test]
    fn hop_by_hop_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("host", HeaderValue::from_static("example.com"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert_eq!(headers.get("host").unwrap(), "example.com");
    }

    #[test]
    fn upgrade_detected_from_connection_list() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive, Upgrade"));
        headers.insert(UPGRADE, HeaderValue::from_static("websocket"));

        let token = upgrade_token(&headers).unwrap();
        assert_eq!(token, "websocket");

        strip_hop_by_hop(&mut headers);
        apply_forwarding(&mut headers, client_ip(), Some(&token));
        assert_eq!(headers.get(CONNECTION).unwrap(), "upgrade");
        assert_eq!(headers.get(UPGRADE).unwrap(), "websocket");
    }

    #[test]
    fn plain_keep_alive_is_not_an_upgrade() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE, HeaderValue::from_static("websocket"));
        assert!(upgrade_token(&headers).is_none());
    }
}
