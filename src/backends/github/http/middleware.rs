use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use tower::{Layer, Service};

use crate::{crypto::is_valid_signature, error::ErrorCode};

const GITHUB_SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

/// Rejects POST requests whose body does not match the
/// `X-Hub-Signature-256` header. Disabled when no secret is configured.
pub struct VerifyGitHubSignatureLayer {
    secret: Option<Arc<str>>,
}

impl VerifyGitHubSignatureLayer {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(Into::into),
        }
    }
}

impl<S> Layer<S> for VerifyGitHubSignatureLayer {
    type Service = VerifyGitHubSignatureMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        VerifyGitHubSignatureMiddleware {
            secret: self.secret.clone(),
            inner,
        }
    }
}

#[derive(Clone)]
pub struct VerifyGitHubSignatureMiddleware<S> {
    secret: Option<Arc<str>>,
    inner: S,
}

/// Buffers the body, checks it against the signature header, then hands back
/// a request carrying the same bytes.
async fn verify_request(
    secret: &str,
    mut request: Request<Body>,
) -> Result<Request<Body>, ErrorCode> {
    let signature = request
        .headers()
        .get(GITHUB_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(SIGNATURE_PREFIX))
        .map(ToOwned::to_owned)
        .ok_or(ErrorCode::InvalidSignature)?;

    let body = std::mem::take(request.body_mut());
    let bytes = hyper::body::to_bytes(body)
        .await
        .map_err(|e| ErrorCode::UnhandledError(e.to_string()))?;

    if !is_valid_signature(&signature, &bytes, secret) {
        return Err(ErrorCode::InvalidSignature);
    }

    *request.body_mut() = Body::from(bytes);
    Ok(request)
}

type BoxFuture<'a, Output> = Pin<Box<dyn Future<Output = Output> + Send + 'a>>;

impl<S> Service<Request<Body>> for VerifyGitHubSignatureMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static + Clone,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let secret = match (&self.secret, request.method()) {
            (Some(secret), &Method::POST) => Some(secret.clone()),
            _ => None,
        };

        Box::pin(async move {
            let request = match secret {
                Some(secret) => match verify_request(&secret, request).await {
                    Ok(request) => request,
                    Err(e) => return Ok(e.into_response()),
                },
                None => request,
            };

            inner.call(request).await
        })
    }
}
