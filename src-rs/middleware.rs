use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{connect_info::ConnectInfo, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ProxyError, rate_limit::Admission, state::AppState};

pub async fn pollen_rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|value| value.0);
    let key = client_identity(request.headers(), socket_addr, state.config.trust_proxy);

    if let Admission::Denied { retry_after_secs } = state.pollen_limiter.check(&key) {
        tracing::warn!(client = %key, retry_after_secs, "pollen rate limit exceeded");
        return ProxyError::RateLimited { retry_after_secs }.into_response();
    }

    next.run(request).await
}

/// Applies the origin allow-list to every response and answers preflight
/// requests directly.
pub async fn cors_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let headers = cors_headers(origin.as_deref(), &state.config.allowed_origins);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    response.headers_mut().extend(headers);
    response
}

pub fn cors_headers(origin: Option<&str>, allowed_origins: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(origin) = origin {
        if allowed_origins.iter().any(|allowed| allowed == origin) {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
        }
    }

    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

pub fn client_identity(
    headers: &HeaderMap,
    socket_addr: Option<SocketAddr>,
    trust_proxy: bool,
) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty());
        if let Some(candidate) = forwarded {
            return candidate.to_string();
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty());
        if let Some(candidate) = real_ip {
            return candidate.to_string();
        }
    }

    socket_addr
        .map(|address| address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "https://breeze.earth".to_string(),
            "https://www.breeze.earth".to_string(),
        ]
    }

    #[test]
    fn echoes_only_listed_origins() {
        let headers = cors_headers(Some("https://www.breeze.earth"), &allowed());
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://www.breeze.earth"
        );

        let headers = cors_headers(Some("https://evil.example"), &allowed());
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        let headers = cors_headers(None, &allowed());
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn origin_match_is_exact() {
        let headers = cors_headers(Some("https://breeze.earth.evil.example"), &allowed());
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        let headers = cors_headers(Some("http://breeze.earth"), &allowed());
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn method_and_header_lists_are_always_present() {
        let headers = cors_headers(None, &allowed());
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[test]
    fn identity_prefers_forwarded_headers_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 10.0.0.1 , 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        let peer: SocketAddr = "192.168.1.5:4000".parse().unwrap();

        assert_eq!(client_identity(&headers, Some(peer), true), "10.0.0.1");
        assert_eq!(client_identity(&headers, Some(peer), false), "192.168.1.5");

        headers.remove("x-forwarded-for");
        assert_eq!(client_identity(&headers, Some(peer), true), "10.0.0.9");
        assert_eq!(client_identity(&HeaderMap::new(), None, true), "unknown");
    }
}
