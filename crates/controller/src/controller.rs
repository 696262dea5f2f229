mod capabilities;
mod create_volume;
mod delete_volume;
mod get_capacity;
mod list_volumes;
mod publish_volume;
mod unpublish_volume;
mod validate_volume_capabilities;

use crate::{volume::Volume, ControllerError};
use async_trait::async_trait;

pub use capabilities::*;
pub use create_volume::*;
pub use delete_volume::*;
pub use get_capacity::*;
pub use list_volumes::*;
pub use publish_volume::*;
pub use unpublish_volume::*;
pub use validate_volume_capabilities::*;

#[async_trait]
pub trait ControllerService: Send + Sync + 'static {
  /// Get the set of services provided by this controller.
  #[inline]
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::empty()
  }

  /// Provision a new volume, or return the existing one if a volume with
  /// the requested name was already created.
  ///
  /// This operation MUST be idempotent.
  #[allow(unused_variables)]
  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, ControllerError> {
    unsupported!("CreateVolume")
  }

  /// Deprovision a volume. A volume that does not exist is reported as
  /// deleted.
  ///
  /// This operation MUST be idempotent.
  #[allow(unused_variables)]
  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), ControllerError> {
    unsupported!("DeleteVolume")
  }

  /// Make a volume available on the given node.
  ///
  /// This operation MUST be idempotent.
  #[allow(unused_variables)]
  async fn controller_publish_volume(
    &self,
    request: ControllerPublishVolumeRequest,
  ) -> Result<ControllerPublishVolumeResponse, ControllerError> {
    unsupported!("ControllerPublishVolume")
  }

  /// Undo a publish. A volume that is not published to the node is
  /// reported as unpublished.
  ///
  /// This operation MUST be idempotent.
  #[allow(unused_variables)]
  async fn controller_unpublish_volume(
    &self,
    request: ControllerUnpublishVolumeRequest,
  ) -> Result<(), ControllerError> {
    unsupported!("ControllerUnpublishVolume")
  }

  async fn validate_volume_capabilities(
    &self,
    request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ControllerError>;

  async fn list_volumes(&self) -> Result<ListVolumesResponse, ControllerError> {
    unsupported!("ListVolumes")
  }

  #[allow(unused_variables)]
  async fn get_capacity(
    &self,
    request: GetCapacityRequest,
  ) -> Result<GetCapacityResponse, ControllerError> {
    unsupported!("GetCapacity")
  }
}
