use crate::volume::VolumeCapability;

#[derive(Debug, Default)]
pub struct GetCapacityRequest {
  volume_capabilities: Vec<VolumeCapability>,
}

impl GetCapacityRequest {
  pub fn new(volume_capabilities: impl IntoIterator<Item = VolumeCapability>) -> Self {
    GetCapacityRequest {
      volume_capabilities: volume_capabilities.into_iter().collect(),
    }
  }

  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[derive(Debug)]
pub struct GetCapacityResponse {
  available_capacity: u64,
}

impl GetCapacityResponse {
  pub fn new(available_capacity: u64) -> Self {
    GetCapacityResponse { available_capacity }
  }

  #[inline]
  pub fn available_capacity(&self) -> u64 {
    self.available_capacity
  }
}
