use anyhow::Context;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tokio::sync::Mutex;
use tower::{Layer, Service, ServiceExt};

use crate::types::request::RawRequest;

/// Turns a JSON datagram into a [`RawRequest`] for the inner service.
pub struct DecodeService<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> DecodeService<S> {
    fn new(inner: S) -> Self {
        DecodeService {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<S> Service<&[u8]> for DecodeService<S>
where
    S: Service<RawRequest, Error = anyhow::Error> + Send + 'static,
    S::Response: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, raw: &[u8]) -> Self::Future {
        let maybe_request = RawRequest::try_from(raw);
        let inner = self.inner.clone();

        Box::pin(async move {
            let request = maybe_request
                .inspect_err(|e| log::warn!("datagram rejected: {e}"))
                .context("invalid datagram")?;
            log::debug!("request received: {request:?}");
            let mut inner = inner.lock().await;
            ServiceExt::<RawRequest>::ready(&mut *inner)
                .await?
                .call(request)
                .await
        })
    }
}

pub struct DecodeLayer;

impl<S> Layer<S> for DecodeLayer {
    type Service = DecodeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DecodeService::new(inner)
    }
}
