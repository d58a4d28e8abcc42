use std::net::SocketAddr;

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

const FINGERPRINT_LEN: usize = 16;

/// Client address, preferring proxy headers over the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("unknown"))
    };
    if let Some(forwarded) = header("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(ip) = header("x-real-ip").or_else(|| header("cf-connecting-ip")) {
        return ip.to_string();
    }
    peer.map(|p| p.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Stable device fingerprint derived from request metadata when the client sends none.
pub fn derive_fingerprint(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: axum::http::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let material = [
        client_ip(headers, peer),
        header(axum::http::header::USER_AGENT),
        header(axum::http::header::ACCEPT_LANGUAGE),
        header(axum::http::header::ACCEPT_ENCODING),
    ]
    .join("|");
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    let digest = hasher.finalize();
    let mut hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_header_wins() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.9");
        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers, Some(peer)), "198.51.100.4");
        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.2"));
        assert_eq!(client_ip(&headers, Some(peer)), "172.16.0.2");
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0"),
        );
        let a = derive_fingerprint(&headers, None);
        let b = derive_fingerprint(&headers, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        headers.insert(
            axum::http::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR"),
        );
        assert_ne!(derive_fingerprint(&headers, None), a);
    }
}
