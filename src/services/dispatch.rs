use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Mutex;
use tower::Service;

use crate::strategies::NearestAvailable;
use crate::strategy::Strategy;
use crate::system::ElevatorSystem;
use crate::types::request::RawRequest;
use crate::types::snapshot::SystemSnapshot;

pub type SharedSystem<ST = NearestAvailable> = Arc<Mutex<ElevatorSystem<ST>>>;

/// Feeds requests into one shared system. Every clone locks the same mutex,
/// so requests from any number of callers are applied one at a time.
pub struct DispatchService<ST = NearestAvailable> {
    system: SharedSystem<ST>,
}

impl<ST> Clone for DispatchService<ST> {
    fn clone(&self) -> Self {
        DispatchService {
            system: Arc::clone(&self.system),
        }
    }
}

impl<ST> DispatchService<ST> {
    pub fn new(system: ElevatorSystem<ST>) -> Self {
        DispatchService {
            system: Arc::new(Mutex::new(system)),
        }
    }

    pub fn system(&self) -> SharedSystem<ST> {
        Arc::clone(&self.system)
    }
}

impl<ST> Service<RawRequest> for DispatchService<ST>
where
    ST: Strategy + Send + 'static,
{
    type Response = SystemSnapshot;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RawRequest) -> Self::Future {
        let system = Arc::clone(&self.system);

        Box::pin(async move {
            let mut system = system.lock().await;
            system.take_request(&request)?;
            Ok(system.snapshot())
        })
    }
}
