//! Request transaction ids.
//!
//! Every request runs inside a task-local scope holding its transid: the
//! client's `X-TransId` header when present, a fresh UUID otherwise. Response
//! envelopes read it from there, so errors raised by extractors and
//! middleware are traced the same way as handler results.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use uuid::Uuid;

pub const TRANSID_HEADER: &str = "x-transid";

tokio::task_local! {
    static TRANSID: String;
}

/// Transid of the request being served, or a fresh one outside a request.
#[must_use]
pub fn current_transid() -> String {
    TRANSID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// The request's transid and whether the client supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub transid: String,
    pub supplied: bool,
}

impl TraceContext {
    fn from_headers(headers: &HeaderMap) -> Self {
        match headers
            .get(TRANSID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            Some(transid) => Self {
                transid: transid.to_string(),
                supplied: true,
            },
            None => Self {
                transid: Uuid::new_v4().to_string(),
                supplied: false,
            },
        }
    }

    /// The client's transid, if one was sent.
    #[must_use]
    pub fn client_transid(&self) -> Option<String> {
        self.supplied.then(|| self.transid.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TraceContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::from_headers(&parts.headers)))
    }
}

pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let context = TraceContext::from_headers(req.headers());
    let transid = context.transid.clone();
    req.extensions_mut().insert(context);

    let mut response = TRANSID.scope(transid.clone(), next.run(req)).await;

    if !response.headers().contains_key(TRANSID_HEADER)
        && let Ok(value) = HeaderValue::from_str(&transid)
    {
        response.headers_mut().insert(TRANSID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_header_is_used() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSID_HEADER, HeaderValue::from_static(" T1 "));

        let context = TraceContext::from_headers(&headers);
        assert_eq!(context.transid, "T1");
        assert_eq!(context.client_transid().as_deref(), Some("T1"));
    }

    #[test]
    fn missing_header_generates_uuid() {
        let context = TraceContext::from_headers(&HeaderMap::new());
        assert!(!context.supplied);
        assert!(context.client_transid().is_none());
        assert!(Uuid::parse_str(&context.transid).is_ok());
    }

    #[tokio::test]
    async fn scoped_transid_is_visible() {
        let seen = TRANSID
            .scope("T-scope".to_string(), async { current_transid() })
            .await;
        assert_eq!(seen, "T-scope");
    }
}
