use crate::error::HttpError;
use http::header::USER_AGENT;
use http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that stamps a User-Agent header on outbound requests
///
/// A header already present on the request is left alone, so callers can
/// identify themselves per request.
#[derive(Clone, Debug)]
pub struct UserAgentLayer {
    value: HeaderValue,
}

impl UserAgentLayer {
    /// Create a layer for the given user agent string
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the string is not a valid header value
    pub fn try_new(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(user_agent.as_ref())?;
        Ok(Self { value })
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            value: self.value.clone(),
        }
    }
}

/// Service produced by [`UserAgentLayer`]
#[derive(Clone, Debug)]
pub struct UserAgentService<S> {
    inner: S,
    value: HeaderValue,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for UserAgentService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        req.headers_mut()
            .entry(USER_AGENT)
            .or_insert_with(|| self.value.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, StatusCode};
    use http_body_util::Full;
    use tower::ServiceExt;

    /// Echoes the User-Agent it received back as the response body.
    #[derive(Clone)]
    struct EchoUaService;

    impl Service<Request<Full<Bytes>>> for EchoUaService {
        type Response = Response<String>;
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            let ua = req
                .headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            std::future::ready(Ok(Response::builder()
                .status(StatusCode::OK)
                .body(ua)
                .unwrap()))
        }
    }

    fn request(user_agent: Option<&str>) -> Request<Full<Bytes>> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri("http://orders-master-staging.orders/things");
        if let Some(ua) = user_agent {
            builder = builder.header(USER_AGENT, ua);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    #[tokio::test]
    async fn test_user_agent_added_when_missing() {
        let layer = UserAgentLayer::try_new("orders/1.0").unwrap();
        let resp = layer.layer(EchoUaService).oneshot(request(None)).await.unwrap();
        assert_eq!(resp.body(), "orders/1.0");
    }

    #[tokio::test]
    async fn test_caller_user_agent_kept() {
        let layer = UserAgentLayer::try_new("orders/1.0").unwrap();
        let resp = layer
            .layer(EchoUaService)
            .oneshot(request(Some("billing/2.3")))
            .await
            .unwrap();
        assert_eq!(resp.body(), "billing/2.3");
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let result = UserAgentLayer::try_new("bad\nagent");
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
