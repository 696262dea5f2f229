use crate::ControllerError;

#[derive(Debug)]
pub struct ControllerUnpublishVolumeRequest {
  volume_id: String,
  node_id: String,
}

impl ControllerUnpublishVolumeRequest {
  pub fn new(
    volume_id: impl Into<String>,
    node_id: impl Into<String>,
  ) -> Result<Self, ControllerError> {
    let volume_id = volume_id.into();
    if volume_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ControllerUnpublishVolumeRequest.volume_id is empty".into(),
      ));
    }

    Ok(ControllerUnpublishVolumeRequest {
      volume_id,
      node_id: node_id.into(),
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The node to detach from. Same form as on publish.
  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}
