use crate::ControllerError;

#[derive(Debug)]
pub struct DeleteVolumeRequest {
  volume_id: String,
}

impl DeleteVolumeRequest {
  pub fn new(volume_id: impl Into<String>) -> Result<Self, ControllerError> {
    let volume_id = volume_id.into();
    if volume_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "DeleteVolumeRequest.volume_id is empty".into(),
      ));
    }

    Ok(DeleteVolumeRequest { volume_id })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }
}
