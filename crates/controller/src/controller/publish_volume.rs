use crate::{volume::VolumeCapability, ControllerError};
use std::collections::HashMap;

/// Publish context key carrying the remote attachment id.
pub const ATTACHMENT_ID: &str = "AttachmentId";

/// Publish context key carrying the remote volume id.
pub const VOLUME_ID: &str = "VolumeId";

/// Publish context key carrying the remote volume name.
pub const VOLUME_NAME: &str = "VolumeName";

#[derive(Debug)]
pub struct ControllerPublishVolumeRequest {
  volume_id: String,
  node_id: String,
  volume_capability: VolumeCapability,
  readonly: bool,
}

impl ControllerPublishVolumeRequest {
  pub fn new(
    volume_id: impl Into<String>,
    node_id: impl Into<String>,
    volume_capability: VolumeCapability,
  ) -> Result<Self, ControllerError> {
    let volume_id = volume_id.into();
    if volume_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ControllerPublishVolumeRequest.volume_id is empty".into(),
      ));
    }

    let node_id = node_id.into();
    if node_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ControllerPublishVolumeRequest.node_id is empty".into(),
      ));
    }

    Ok(ControllerPublishVolumeRequest {
      volume_id,
      node_id,
      volume_capability,
      readonly: false,
    })
  }

  pub fn with_readonly(mut self, readonly: bool) -> Self {
    self.readonly = readonly;
    self
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// Either the remote device id or an address bound to one of the
  /// device's network interfaces.
  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }

  #[inline]
  pub fn volume_capability(&self) -> &VolumeCapability {
    &self.volume_capability
  }

  #[inline]
  pub fn readonly(&self) -> bool {
    self.readonly
  }
}

#[derive(Debug, Default)]
pub struct ControllerPublishVolumeResponse {
  publish_context: HashMap<String, String>,
}

impl ControllerPublishVolumeResponse {
  pub(crate) fn new(attachment_id: &str, volume_id: &str, volume_name: &str) -> Self {
    let mut publish_context = HashMap::with_capacity(3);
    publish_context.insert(ATTACHMENT_ID.to_owned(), attachment_id.to_owned());
    publish_context.insert(VOLUME_ID.to_owned(), volume_id.to_owned());
    publish_context.insert(VOLUME_NAME.to_owned(), volume_name.to_owned());
    ControllerPublishVolumeResponse { publish_context }
  }

  /// Opaque properties handed to the node on stage and publish.
  #[inline]
  pub fn publish_context(&self) -> &HashMap<String, String> {
    &self.publish_context
  }

  #[inline]
  pub fn attachment_id(&self) -> Option<&str> {
    self.publish_context.get(ATTACHMENT_ID).map(String::as_str)
  }
}
