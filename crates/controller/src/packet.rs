use crate::{
  controller::*,
  provider::{RemoteAttachment, RemoteDevice, RemoteVolume, VolumeCreateRequest, BILLING_HOURLY},
  utils::Record,
  volume::{describe_unsupported, unsupported_access_modes, Volume},
  ControllerConfig, ControllerError, VolumeDescription, VolumeProvider,
};
use async_trait::async_trait;
use std::net::IpAddr;
use tracing::{debug, info, instrument, warn};

/// Volume lifecycle controller backed by a remote block-storage service.
///
/// Holds no state about remote entities: every operation re-reads what it
/// needs from the provider, so retries always see current state.
pub struct PacketController<P: VolumeProvider> {
  provider: P,
  config: ControllerConfig,
}

impl<P: VolumeProvider> PacketController<P> {
  pub fn new(provider: P, config: ControllerConfig) -> Self {
    PacketController { provider, config }
  }

  #[inline]
  pub fn provider(&self) -> &P {
    &self.provider
  }

  #[inline]
  pub fn config(&self) -> &ControllerConfig {
    &self.config
  }

  async fn get_nodes(&self) -> Result<Vec<RemoteDevice>, ControllerError> {
    self
      .provider
      .get_nodes()
      .await
      .map_err(|e| ControllerError::remote("list nodes", e))
  }

  /// Finds the device whose id equals `node_id`, or which has a network
  /// interface bound to it.
  async fn resolve_node(&self, node_id: &str) -> Result<Option<RemoteDevice>, ControllerError> {
    let nodes = self.get_nodes().await?;
    Ok(
      nodes
        .into_iter()
        .find(|node| node.id == node_id || node.has_address(node_id)),
    )
  }
}

/// Returns the first volume whose description names `name`. Volumes with
/// descriptions that do not parse were not created through this controller
/// and never match.
fn find_by_name<'a>(volumes: &'a [RemoteVolume], name: &str) -> Option<&'a RemoteVolume> {
  volumes.iter().find(|volume| {
    match volume.description.parse::<VolumeDescription>() {
      Ok(description) => description.name() == name,
      Err(e) => {
        debug!(
          "Skipping volume {} with foreign description: {}",
          volume.id, e
        );
        false
      }
    }
  })
}

fn publish_response(
  attachment: &RemoteAttachment,
  volume: &RemoteVolume,
) -> ControllerPublishVolumeResponse {
  ControllerPublishVolumeResponse::new(&attachment.id, &volume.id, &volume.name)
}

#[async_trait]
impl<P: VolumeProvider> ControllerService for PacketController<P> {
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::CREATE_DELETE_VOLUME
      | ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME
      | ControllerCapabilities::LIST_VOLUMES
  }

  #[instrument(
    name = "controller.create_volume",
    skip(self, request),
    fields(request, response)
  )]
  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, ControllerError> {
    let request = request.record_request();

    let unsupported = unsupported_access_modes(request.volume_capabilities());
    if !unsupported.is_empty() {
      return Err(ControllerError::InvalidArgument(describe_unsupported(
        &unsupported,
      )));
    }

    let size_gb = self.config.volume_size_gb(request.capacity_range());
    let volumes = self
      .provider
      .list_volumes()
      .await
      .map_err(|e| ControllerError::remote("list volumes", e))?;

    if let Some(existing) = find_by_name(&volumes, request.name()) {
      if existing.size_gb != size_gb {
        warn!(
          "Volume {} exists with {}GiB, requested {}GiB; keeping existing size",
          existing.id, existing.size_gb, size_gb
        );
      }

      info!(
        "Volume named {} already exists as {}",
        request.name(),
        existing.id
      );
      return Ok(Volume::from(existing).record_response());
    }

    let description = VolumeDescription::new(request.name());
    let create = VolumeCreateRequest {
      size_gb,
      description: description.to_string(),
      billing_cycle: BILLING_HOURLY.into(),
      plan_id: self.config.plan_id.clone(),
      locked: false,
    };

    let created = self
      .provider
      .create(create)
      .await
      .map_err(|e| ControllerError::remote(format!("create volume {}", request.name()), e))?;

    info!(
      "Created volume {} ({}GiB) for {}",
      created.id,
      created.size_gb,
      request.name()
    );
    Ok(Volume::from(&created).record_response())
  }

  #[instrument(name = "controller.delete_volume", skip(self, request), fields(request))]
  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), ControllerError> {
    let request = request.record_request();

    match self.provider.delete(request.volume_id()).await {
      Ok(()) => {
        info!("Deleted volume {}", request.volume_id());
        Ok(())
      }

      Err(e) if e.is_not_found() => {
        info!("Volume {} already deleted", request.volume_id());
        Ok(())
      }

      Err(e) => Err(ControllerError::remote(
        format!("delete volume {}", request.volume_id()),
        e,
      )),
    }
  }

  #[instrument(
    name = "controller.controller_publish_volume",
    skip(self, request),
    fields(request, response)
  )]
  async fn controller_publish_volume(
    &self,
    request: ControllerPublishVolumeRequest,
  ) -> Result<ControllerPublishVolumeResponse, ControllerError> {
    let request = request.record_request();

    let mode = request.volume_capability().access_mode();
    if !mode.is_supported() {
      return Err(ControllerError::InvalidArgument(describe_unsupported(&[
        mode,
      ])));
    }

    let device = self
      .resolve_node(request.node_id())
      .await?
      .ok_or_else(|| {
        ControllerError::NotFound(format!("no node with address {}", request.node_id()))
      })?;

    let volume = match self.provider.get(request.volume_id()).await {
      Ok(volume) => volume,
      Err(e) if e.is_not_found() => {
        return Err(ControllerError::NotFound(format!(
          "volume {}",
          request.volume_id()
        )))
      }
      Err(e) => {
        return Err(ControllerError::remote(
          format!("get volume {}", request.volume_id()),
          e,
        ))
      }
    };

    if let Some(attachment) = volume.attachments.iter().find(|a| a.device_id == device.id) {
      info!(
        "Volume {} already attached to {} as {}",
        volume.id, device.id, attachment.id
      );
      return Ok(publish_response(attachment, &volume).record_response());
    }

    if let Some(other) = volume.attachments.first() {
      return Err(ControllerError::PublishedToAnotherNode(format!(
        "volume {} is attached to {}",
        volume.id, other.device_id
      )));
    }

    let attachment = self
      .provider
      .attach(&volume.id, &device.id)
      .await
      .map_err(|e| {
        ControllerError::remote(format!("attach volume {} to {}", volume.id, device.id), e)
      })?;

    info!(
      "Attached volume {} to {} as {}",
      volume.id, device.id, attachment.id
    );
    Ok(publish_response(&attachment, &volume).record_response())
  }

  #[instrument(
    name = "controller.controller_unpublish_volume",
    skip(self, request),
    fields(request)
  )]
  async fn controller_unpublish_volume(
    &self,
    request: ControllerUnpublishVolumeRequest,
  ) -> Result<(), ControllerError> {
    let request = request.record_request();

    let volume = match self.provider.get(request.volume_id()).await {
      Ok(volume) => volume,
      Err(e) if e.is_not_found() => {
        info!("Volume {} no longer exists", request.volume_id());
        return Ok(());
      }
      Err(e) => {
        return Err(ControllerError::remote(
          format!("get volume {}", request.volume_id()),
          e,
        ))
      }
    };

    let mut attachment = volume
      .attachments
      .iter()
      .find(|a| a.device_id == request.node_id());

    // Nodes may be named by address, attachments always carry the device id.
    if attachment.is_none() && request.node_id().parse::<IpAddr>().is_ok() {
      if let Some(device) = self.resolve_node(request.node_id()).await? {
        attachment = volume.attachments.iter().find(|a| a.device_id == device.id);
      }
    }

    let attachment = match attachment {
      Some(attachment) => attachment,
      None => {
        info!(
          "Volume {} is not attached to {}",
          volume.id,
          request.node_id()
        );
        return Ok(());
      }
    };

    match self.provider.detach(&attachment.id).await {
      Ok(()) => {
        info!("Detached volume {} ({})", volume.id, attachment.id);
        Ok(())
      }

      Err(e) if e.is_not_found() => {
        info!("Attachment {} already removed", attachment.id);
        Ok(())
      }

      Err(e) => Err(ControllerError::remote(
        format!("detach volume {} ({})", volume.id, attachment.id),
        e,
      )),
    }
  }

  #[instrument(
    name = "controller.validate_volume_capabilities",
    skip(self, request),
    fields(request, response)
  )]
  async fn validate_volume_capabilities(
    &self,
    request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ControllerError> {
    let request = request.record_request();

    let unsupported = unsupported_access_modes(request.volume_capabilities());
    let response = if unsupported.is_empty() {
      ValidateVolumeCapabilitiesResponse::Confirmed(Confirmed::new(
        request.volume_capabilities().to_vec(),
      ))
    } else {
      ValidateVolumeCapabilitiesResponse::unsupported(&unsupported)
    };

    Ok(response.record_response())
  }

  #[instrument(name = "controller.list_volumes", skip(self), fields(response))]
  async fn list_volumes(&self) -> Result<ListVolumesResponse, ControllerError> {
    let volumes = self
      .provider
      .list_volumes()
      .await
      .map_err(|e| ControllerError::remote("list volumes", e))?;

    let entries = volumes.iter().map(Volume::from).collect();
    Ok(ListVolumesResponse::new(entries).record_response())
  }
}
