use crate::{
  volume::{CapacityRange, VolumeCapability},
  ControllerError,
};

#[derive(Debug)]
pub struct CreateVolumeRequest {
  name: String,
  capacity_range: Option<CapacityRange>,
  volume_capabilities: Vec<VolumeCapability>,
}

impl CreateVolumeRequest {
  pub fn new(name: impl Into<String>) -> Result<Self, ControllerError> {
    let name = name.into();
    if name.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "CreateVolumeRequest.name is empty".into(),
      ));
    }

    Ok(CreateVolumeRequest {
      name,
      capacity_range: None,
      volume_capabilities: Vec::new(),
    })
  }

  pub fn with_capacity_range(mut self, capacity_range: Option<CapacityRange>) -> Self {
    self.capacity_range = capacity_range;
    self
  }

  pub fn with_volume_capabilities(
    mut self,
    volume_capabilities: impl IntoIterator<Item = VolumeCapability>,
  ) -> Self {
    self.volume_capabilities = volume_capabilities.into_iter().collect();
    self
  }

  /// The suggested name for the volume. Retries of the same request carry
  /// the same name, which makes it the idempotency key.
  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// When unset the plugin picks its default size.
  #[inline]
  pub fn capacity_range(&self) -> Option<&CapacityRange> {
    self.capacity_range.as_ref()
  }

  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}
