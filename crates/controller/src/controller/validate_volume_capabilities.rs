use crate::{
  volume::{describe_unsupported, AccessMode, VolumeCapability},
  ControllerError,
};

#[derive(Debug)]
pub struct ValidateVolumeCapabilitiesRequest {
  volume_id: String,
  volume_capabilities: Vec<VolumeCapability>,
}

impl ValidateVolumeCapabilitiesRequest {
  pub fn new(
    volume_id: impl Into<String>,
    volume_capabilities: impl IntoIterator<Item = VolumeCapability>,
  ) -> Result<Self, ControllerError> {
    let volume_id = volume_id.into();
    if volume_id.is_empty() {
      return Err(ControllerError::InvalidArgument(
        "ValidateVolumeCapabilitiesRequest.volume_id is empty".into(),
      ));
    }

    Ok(ValidateVolumeCapabilitiesRequest {
      volume_id,
      volume_capabilities: volume_capabilities.into_iter().collect(),
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Confirmed {
  volume_capabilities: Vec<VolumeCapability>,
}

impl Confirmed {
  pub fn new(volume_capabilities: Vec<VolumeCapability>) -> Self {
    Confirmed {
      volume_capabilities,
    }
  }

  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidateVolumeCapabilitiesResponse {
  Confirmed(Confirmed),
  Message(String),
}

impl ValidateVolumeCapabilitiesResponse {
  /// Builds the rejection message listing every unsupported mode.
  pub(crate) fn unsupported(modes: &[AccessMode]) -> Self {
    ValidateVolumeCapabilitiesResponse::Message(describe_unsupported(modes))
  }

  #[inline]
  pub fn is_confirmed(&self) -> bool {
    matches!(self, ValidateVolumeCapabilitiesResponse::Confirmed(_))
  }
}
