use crate::provider::RemoteVolume;
use std::{fmt, num::NonZeroU64};

/// Bytes per remote size unit. The remote service sizes volumes in GiB.
pub const GIB: u64 = 1 << 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
  volume_id: String,
  capacity_bytes: u64,
}

impl Volume {
  pub fn new(volume_id: impl Into<String>, capacity_bytes: u64) -> Self {
    Volume {
      volume_id: volume_id.into(),
      capacity_bytes,
    }
  }

  /// The identifier assigned by the remote service.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  #[inline]
  pub fn capacity_bytes(&self) -> u64 {
    self.capacity_bytes
  }
}

impl From<&RemoteVolume> for Volume {
  fn from(value: &RemoteVolume) -> Self {
    Volume::new(value.id.clone(), value.size_gb * GIB)
  }
}

/// Requested bounds for a new volume. At least one bound is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityRange {
  required_bytes: Option<NonZeroU64>,
  limit_bytes: Option<NonZeroU64>,
}

impl CapacityRange {
  pub fn new(required_bytes: u64, limit_bytes: u64) -> Option<Self> {
    let required_bytes = NonZeroU64::new(required_bytes);
    let limit_bytes = NonZeroU64::new(limit_bytes);

    if required_bytes.is_none() && limit_bytes.is_none() {
      None
    } else {
      Some(CapacityRange {
        required_bytes,
        limit_bytes,
      })
    }
  }

  /// Volume MUST be at least this big.
  #[inline]
  pub fn required_bytes(&self) -> Option<NonZeroU64> {
    self.required_bytes
  }

  /// Volume MUST not be bigger than this.
  #[inline]
  pub fn limit_bytes(&self) -> Option<NonZeroU64> {
    self.limit_bytes
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AccessMode {
  Unknown,
  /// Can only be published once as read/write on a single node, at
  /// any given time.
  SingleNodeWriter,
  /// Can only be published once as readonly on a single node, at
  /// any given time.
  SingleNodeReaderOnly,
  /// Can be published as readonly at multiple nodes simultaneously.
  MultiNodeReaderOnly,
  /// Can be published at multiple nodes simultaneously. Only one of
  /// the node can be used as read/write. The rest will be readonly.
  MultiNodeSingleWriter,
  /// Can be published as read/write at multiple nodes
  /// simultaneously.
  MultiNodeMultiWriter,
}

impl AccessMode {
  /// Whether a network block volume can honour this mode. Only one
  /// attachment per volume is ever made.
  #[inline]
  pub fn is_supported(self) -> bool {
    matches!(
      self,
      AccessMode::SingleNodeWriter | AccessMode::SingleNodeReaderOnly
    )
  }
}

impl fmt::Display for AccessMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      AccessMode::Unknown => "UNKNOWN",
      AccessMode::SingleNodeWriter => "SINGLE_NODE_WRITER",
      AccessMode::SingleNodeReaderOnly => "SINGLE_NODE_READER_ONLY",
      AccessMode::MultiNodeReaderOnly => "MULTI_NODE_READER_ONLY",
      AccessMode::MultiNodeSingleWriter => "MULTI_NODE_SINGLE_WRITER",
      AccessMode::MultiNodeMultiWriter => "MULTI_NODE_MULTI_WRITER",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessType {
  /// Indicate that the volume will be accessed via the block device API.
  Block,

  /// Indicate that the volume will be accessed via the filesystem API.
  Mount(MountVolume),
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct MountVolume {
  fs_type: Option<String>,
  mount_flags: Vec<String>,
}

impl MountVolume {
  pub fn new(fs_type: Option<String>, mount_flags: Vec<String>) -> Self {
    MountVolume {
      fs_type: fs_type.filter(|v| !v.is_empty()),
      mount_flags,
    }
  }

  #[inline]
  pub fn fs_type(&self) -> Option<&str> {
    self.fs_type.as_deref()
  }

  /// Mount flags MAY contain sensitive information and are never logged.
  pub fn mount_flags(&self) -> impl Iterator<Item = &str> + ExactSizeIterator {
    self.mount_flags.iter().map(|v| &**v)
  }
}

impl fmt::Debug for MountVolume {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MountVolume")
      .field("fs_type", &self.fs_type)
      .field(
        "mount_flags",
        &format!("REDACTED ({} items)", self.mount_flags.len()),
      )
      .finish()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCapability {
  access_mode: AccessMode,
  access_type: AccessType,
}

impl VolumeCapability {
  pub fn new(access_mode: AccessMode, access_type: AccessType) -> Self {
    VolumeCapability {
      access_mode,
      access_type,
    }
  }

  /// A filesystem capability with default mount settings.
  pub fn mount(access_mode: AccessMode) -> Self {
    Self::new(access_mode, AccessType::Mount(MountVolume::default()))
  }

  #[inline]
  pub fn access_mode(&self) -> AccessMode {
    self.access_mode
  }

  #[inline]
  pub fn access_type(&self) -> &AccessType {
    &self.access_type
  }
}

/// Collects the access modes in `capabilities` that cannot be served. An empty
/// result means every capability is supported.
pub fn unsupported_access_modes<'a>(
  capabilities: impl IntoIterator<Item = &'a VolumeCapability>,
) -> Vec<AccessMode> {
  let mut modes = Vec::new();
  for mode in capabilities.into_iter().map(VolumeCapability::access_mode) {
    if !mode.is_supported() && !modes.contains(&mode) {
      modes.push(mode);
    }
  }

  modes
}

/// Renders a rejection message naming each unsupported mode.
pub(crate) fn describe_unsupported(modes: &[AccessMode]) -> String {
  let modes = modes
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(", ");
  format!("unsupported access modes: {}", modes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  #[test_case(AccessMode::SingleNodeWriter => true)]
  #[test_case(AccessMode::SingleNodeReaderOnly => true)]
  #[test_case(AccessMode::MultiNodeReaderOnly => false)]
  #[test_case(AccessMode::MultiNodeSingleWriter => false)]
  #[test_case(AccessMode::MultiNodeMultiWriter => false)]
  #[test_case(AccessMode::Unknown => false)]
  fn supported_modes(mode: AccessMode) -> bool {
    mode.is_supported()
  }

  #[test]
  fn unsupported_modes_are_deduplicated() {
    let caps = vec![
      VolumeCapability::mount(AccessMode::MultiNodeMultiWriter),
      VolumeCapability::mount(AccessMode::SingleNodeWriter),
      VolumeCapability::new(AccessMode::MultiNodeMultiWriter, AccessType::Block),
      VolumeCapability::mount(AccessMode::MultiNodeReaderOnly),
    ];

    assert_eq!(
      unsupported_access_modes(&caps),
      vec![
        AccessMode::MultiNodeMultiWriter,
        AccessMode::MultiNodeReaderOnly
      ]
    );
  }

  #[test]
  fn capacity_range_requires_a_bound() {
    assert_eq!(CapacityRange::new(0, 0), None);

    let range = CapacityRange::new(0, 10 * GIB).expect("limit only");
    assert_eq!(range.required_bytes(), None);
    assert_eq!(range.limit_bytes().map(NonZeroU64::get), Some(10 * GIB));
  }

  #[test]
  fn mount_flags_are_redacted() {
    let volume = MountVolume::new(Some("ext4".into()), vec!["password=hunter2".into()]);
    let debug = format!("{:?}", volume);

    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("REDACTED (1 items)"));
  }
}
