//! In-memory [`VolumeProvider`] that records every call it receives.

use crate::provider::{
  ProviderError, RemoteAttachment, RemoteDevice, RemoteVolume, VolumeCreateRequest,
  VolumeProvider,
};
use async_trait::async_trait;
use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
  ListVolumes,
  Get(String),
  Delete(String),
  Create(VolumeCreateRequest),
  Attach {
    volume_id: String,
    device_id: String,
  },
  Detach(String),
  GetNodes,
}

impl ProviderCall {
  fn kind(&self) -> &'static str {
    match self {
      ProviderCall::ListVolumes => "list_volumes",
      ProviderCall::Get(_) => "get",
      ProviderCall::Delete(_) => "delete",
      ProviderCall::Create(_) => "create",
      ProviderCall::Attach { .. } => "attach",
      ProviderCall::Detach(_) => "detach",
      ProviderCall::GetNodes => "get_nodes",
    }
  }

  /// Whether the call changes remote state.
  pub fn is_mutation(&self) -> bool {
    matches!(
      self,
      ProviderCall::Delete(_)
        | ProviderCall::Create(_)
        | ProviderCall::Attach { .. }
        | ProviderCall::Detach(_)
    )
  }
}

struct FakeProviderInner {
  volumes: Vec<RemoteVolume>,
  nodes: Vec<RemoteDevice>,
  log: Vec<ProviderCall>,
  failures: HashMap<&'static str, ProviderError>,
  next_id: u64,
}

impl FakeProviderInner {
  fn next_id(&mut self, prefix: &str) -> String {
    self.next_id += 1;
    format!("{}-{:04}", prefix, self.next_id)
  }

  fn record(&mut self, call: ProviderCall) -> Result<(), ProviderError> {
    let kind = call.kind();
    self.log.push(call);
    match self.failures.remove(kind) {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  fn volume_mut(&mut self, volume_id: &str) -> Result<&mut RemoteVolume, ProviderError> {
    self
      .volumes
      .iter_mut()
      .find(|v| v.id == volume_id)
      .ok_or_else(|| ProviderError::not_found(format!("volume {} not found", volume_id)))
  }
}

pub struct FakeProvider(Mutex<FakeProviderInner>);

impl Default for FakeProvider {
  fn default() -> Self {
    FakeProvider::new(None, None)
  }
}

impl FakeProvider {
  pub fn new(
    volumes: impl IntoIterator<Item = RemoteVolume>,
    nodes: impl IntoIterator<Item = RemoteDevice>,
  ) -> Self {
    let inner = FakeProviderInner {
      volumes: volumes.into_iter().collect(),
      nodes: nodes.into_iter().collect(),
      log: Vec::new(),
      failures: HashMap::new(),
      next_id: 0,
    };

    Self(Mutex::new(inner))
  }

  fn lock(&self) -> MutexGuard<'_, FakeProviderInner> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Makes the next call of the named operation fail with `err`. Names
  /// match the [`VolumeProvider`] method names.
  pub fn fail_next(&self, operation: &'static str, err: ProviderError) {
    self.lock().failures.insert(operation, err);
  }

  pub fn reset_log(&self) {
    self.lock().log.clear();
  }

  pub fn get_log(&self) -> Vec<ProviderCall> {
    self.lock().log.clone()
  }

  pub fn volumes(&self) -> Vec<RemoteVolume> {
    self.lock().volumes.clone()
  }
}

#[async_trait]
impl VolumeProvider for FakeProvider {
  async fn list_volumes(&self) -> Result<Vec<RemoteVolume>, ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::ListVolumes)?;
    Ok(inner.volumes.clone())
  }

  async fn get(&self, volume_id: &str) -> Result<RemoteVolume, ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::Get(volume_id.into()))?;
    inner.volume_mut(volume_id).map(|v| v.clone())
  }

  async fn delete(&self, volume_id: &str) -> Result<(), ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::Delete(volume_id.into()))?;
    let before = inner.volumes.len();
    inner.volumes.retain(|v| v.id != volume_id);
    if inner.volumes.len() == before {
      return Err(ProviderError::not_found(format!(
        "volume {} not found",
        volume_id
      )));
    }

    info!("Fake provider: deleted volume {}", volume_id);
    Ok(())
  }

  async fn create(&self, request: VolumeCreateRequest) -> Result<RemoteVolume, ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::Create(request.clone()))?;
    let id = inner.next_id("vol");
    let volume = RemoteVolume {
      name: format!("volume-{}", id),
      id,
      size_gb: request.size_gb,
      description: request.description,
      attachments: Vec::new(),
    };

    info!("Fake provider: created volume {}", volume.id);
    inner.volumes.push(volume.clone());
    Ok(volume)
  }

  async fn attach(
    &self,
    volume_id: &str,
    device_id: &str,
  ) -> Result<RemoteAttachment, ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::Attach {
      volume_id: volume_id.into(),
      device_id: device_id.into(),
    })?;
    let id = inner.next_id("att");
    let attachment = RemoteAttachment {
      id,
      volume_id: volume_id.into(),
      device_id: device_id.into(),
    };

    inner.volume_mut(volume_id)?.attachments.push(attachment.clone());
    info!(
      "Fake provider: attached volume {} to {}",
      volume_id, device_id
    );
    Ok(attachment)
  }

  async fn detach(&self, attachment_id: &str) -> Result<(), ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::Detach(attachment_id.into()))?;
    for volume in inner.volumes.iter_mut() {
      if let Some(i) = volume
        .attachments
        .iter()
        .position(|a| a.id == attachment_id)
      {
        volume.attachments.remove(i);
        info!("Fake provider: removed attachment {}", attachment_id);
        return Ok(());
      }
    }

    Err(ProviderError::not_found(format!(
      "attachment {} not found",
      attachment_id
    )))
  }

  async fn get_nodes(&self) -> Result<Vec<RemoteDevice>, ProviderError> {
    let mut inner = self.lock();
    inner.record(ProviderCall::GetNodes)?;
    Ok(inner.nodes.clone())
  }
}
