use crate::{
  DeviceOrchestrator, Executor, NodeCapabilities, NodeError, PublishVolumeRequest, Result,
  StageVolumeRequest, UnpublishVolumeRequest, UnstageVolumeRequest,
};
use futures::channel::oneshot::channel as oneshot;
use std::{
  future::Future,
  io,
  panic::{catch_unwind, AssertUnwindSafe},
  path::PathBuf,
  sync::Arc,
  thread,
};
use tracing::{error, Span};

fn cancelled() -> NodeError {
  NodeError::Io(io::Error::new(
    io::ErrorKind::Interrupted,
    "request was cancelled (thread panicked?)",
  ))
}

// Host operations block on external tools, so each one gets its own thread
// and never stalls the async executor.
fn run<R, F>(operation: &'static str, f: F) -> impl Future<Output = Result<R>>
where
  F: FnOnce() -> Result<R> + Send + 'static,
  R: Send + 'static,
{
  let (sender, receiver) = oneshot();
  let span = Span::current();

  let spawned = thread::Builder::new()
    .name(format!("csi-node:{}", operation))
    .spawn(move || {
      let _enter = span.enter();
      match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => {
          let _ = sender.send(result);
        }
        Err(e) => error!("Node operation {} panicked: {:?}", operation, e),
      }
    });

  async move {
    if let Err(e) = spawned {
      return Err(NodeError::Io(e));
    }

    match receiver.await {
      Ok(result) => result,
      Err(_) => Err(cancelled()),
    }
  }
}

/// Async front of a [`DeviceOrchestrator`], suitable for a gRPC node
/// service.
pub struct NodeDriver<E: Executor> {
  orchestrator: Arc<DeviceOrchestrator<E>>,
}

impl<E: Executor> Clone for NodeDriver<E> {
  fn clone(&self) -> Self {
    NodeDriver {
      orchestrator: self.orchestrator.clone(),
    }
  }
}

impl<E: Executor> NodeDriver<E> {
  pub fn new(orchestrator: DeviceOrchestrator<E>) -> Self {
    NodeDriver {
      orchestrator: Arc::new(orchestrator),
    }
  }

  #[inline]
  pub fn orchestrator(&self) -> &DeviceOrchestrator<E> {
    &self.orchestrator
  }

  #[inline]
  pub fn capabilities(&self) -> NodeCapabilities {
    self.orchestrator.capabilities()
  }

  pub fn stage_volume(
    &self,
    request: StageVolumeRequest,
  ) -> impl Future<Output = Result<PathBuf>> {
    let orchestrator = self.orchestrator.clone();
    run("stage", move || orchestrator.stage_volume(request))
  }

  pub fn unstage_volume(&self, request: UnstageVolumeRequest) -> impl Future<Output = Result<()>> {
    let orchestrator = self.orchestrator.clone();
    run("unstage", move || orchestrator.unstage_volume(request))
  }

  pub fn publish_volume(&self, request: PublishVolumeRequest) -> impl Future<Output = Result<()>> {
    let orchestrator = self.orchestrator.clone();
    run("publish", move || orchestrator.publish_volume(request))
  }

  pub fn unpublish_volume(
    &self,
    request: UnpublishVolumeRequest,
  ) -> impl Future<Output = Result<()>> {
    let orchestrator = self.orchestrator.clone();
    run("unpublish", move || orchestrator.unpublish_volume(request))
  }
}
