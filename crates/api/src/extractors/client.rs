//! Client details attached to activity log entries.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use domain::services::RequestContext;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use crate::middleware::RequestId;

/// Caller IP, user agent and request id, whichever are available.
#[derive(Debug, Clone, Default)]
pub struct ClientContext(pub RequestContext);

impl ClientContext {
    pub fn into_inner(self) -> RequestContext {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.chars().take(500).collect::<String>());

        let request_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone());

        Ok(ClientContext(RequestContext {
            ip_address: forwarded_ip(&parts.headers).or(peer),
            user_agent,
            request_id,
        }))
    }
}

/// First address of `X-Forwarded-For`, falling back to `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    async fn extract(req: Request<()>) -> RequestContext {
        let (mut parts, _) = req.into_parts();
        ClientContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn test_extracts_forwarded_ip_user_agent_and_request_id() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header(header::USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        req.extensions_mut().insert(RequestId("req-1".to_string()));

        let ctx = extract(req).await;
        assert_eq!(ctx.ip_address, Some("203.0.113.7".parse().unwrap()));
        assert_eq!(ctx.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn test_falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("192.0.2.1:5000".parse().unwrap()));

        let ctx = extract(req).await;
        assert_eq!(ctx.ip_address, Some("192.0.2.1".parse().unwrap()));
        assert!(ctx.user_agent.is_none());
    }

    #[test]
    fn test_forwarded_ip_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(forwarded_ip(&headers), Some("198.51.100.4".parse().unwrap()));
    }
}
