//! The narrow view of the remote block-storage service that the controller
//! depends on. A concrete HTTP client implements [`VolumeProvider`]; tests use
//! [`FakeProvider`](crate::fake::FakeProvider).

use crate::ControllerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BILLING_HOURLY: &str = "hourly";

const NOT_FOUND: u16 = 404;

/// A volume as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteVolume {
  pub id: String,
  pub name: String,
  pub size_gb: u64,
  /// Free text owned by the plugin, holds a serialized
  /// [`VolumeDescription`](crate::VolumeDescription).
  pub description: String,
  pub attachments: Vec<RemoteAttachment>,
}

/// A live link between one volume and one device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteAttachment {
  pub id: String,
  pub volume_id: String,
  pub device_id: String,
}

/// A compute node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteDevice {
  pub id: String,
  pub hostname: String,
  pub network: Vec<NetworkInterface>,
}

impl RemoteDevice {
  pub fn has_address(&self, address: &str) -> bool {
    self.network.iter().any(|n| n.address == address)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInterface {
  pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeCreateRequest {
  pub size_gb: u64,
  pub description: String,
  pub billing_cycle: String,
  pub plan_id: String,
  pub locked: bool,
}

/// Failure reported by a [`VolumeProvider`]. `status` carries the HTTP status
/// of the response when one was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status, .message))]
pub struct ProviderError {
  status: Option<u16>,
  message: String,
}

impl ProviderError {
  pub fn new(status: u16, message: impl Into<String>) -> Self {
    ProviderError {
      status: Some(status),
      message: message.into(),
    }
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(NOT_FOUND, message)
  }

  /// A failure where no response was received at all.
  pub fn transport(message: impl Into<String>) -> Self {
    ProviderError {
      status: None,
      message: message.into(),
    }
  }

  #[inline]
  pub fn status(&self) -> Option<u16> {
    self.status
  }

  #[inline]
  pub fn message(&self) -> &str {
    &self.message
  }

  #[inline]
  pub fn is_not_found(&self) -> bool {
    self.status == Some(NOT_FOUND)
  }
}

fn describe(status: &Option<u16>, message: &str) -> String {
  match status {
    Some(status) => format!("remote service responded {}: {}", status, message),
    None => format!("remote service unreachable: {}", message),
  }
}

/// Operations the controller needs from the remote block-storage service.
///
/// Implementations must not retry on their own; callers retry whole
/// operations instead.
#[async_trait]
pub trait VolumeProvider: Send + Sync + 'static {
  async fn list_volumes(&self) -> Result<Vec<RemoteVolume>, ProviderError>;

  async fn get(&self, volume_id: &str) -> Result<RemoteVolume, ProviderError>;

  async fn delete(&self, volume_id: &str) -> Result<(), ProviderError>;

  async fn create(&self, request: VolumeCreateRequest) -> Result<RemoteVolume, ProviderError>;

  async fn attach(&self, volume_id: &str, device_id: &str)
    -> Result<RemoteAttachment, ProviderError>;

  async fn detach(&self, attachment_id: &str) -> Result<(), ProviderError>;

  async fn get_nodes(&self) -> Result<Vec<RemoteDevice>, ProviderError>;
}

/// Credentials and placement for the remote service.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
  pub auth_token: String,
  pub project_id: String,
  /// Left empty to let the client look the facility up from instance
  /// metadata.
  #[serde(default)]
  pub facility_id: String,
}

impl ProviderConfig {
  pub fn validate(&self) -> Result<(), ControllerError> {
    if self.auth_token.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ProviderConfig.auth_token not specified".into(),
      ));
    }

    if self.project_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ProviderConfig.project_id not specified".into(),
      ));
    }

    Ok(())
  }
}

impl fmt::Debug for ProviderConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProviderConfig")
      .field("auth_token", &"REDACTED")
      .field("project_id", &self.project_id)
      .field("facility_id", &self.facility_id)
      .finish()
  }
}
