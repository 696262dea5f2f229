use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Locations and tools the device orchestrator works with. Every path can be
/// redirected, which is how tests run against temporary directories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NodeConfig {
  pub multipath_bindings: PathBuf,
  pub multipath_command: PathBuf,
  /// Upper bound for a single multipath invocation, in seconds.
  pub multipath_timeout_secs: u64,
  pub scsi_id_command: PathBuf,
  pub by_path_dir: PathBuf,
  pub mapper_dir: PathBuf,
  pub proc_mounts: PathBuf,
  /// Where staging records are kept between stage and unstage.
  pub state_dir: PathBuf,
  pub filesystem: String,
  /// Aliases multipath generates on its own. They are never written back.
  pub auto_alias_prefix: String,
}

impl Default for NodeConfig {
  fn default() -> Self {
    NodeConfig {
      multipath_bindings: "/etc/multipath/bindings".into(),
      multipath_command: "/sbin/multipath".into(),
      multipath_timeout_secs: 10,
      scsi_id_command: "/lib/udev/scsi_id".into(),
      by_path_dir: "/dev/disk/by-path".into(),
      mapper_dir: "/dev/mapper".into(),
      proc_mounts: "/proc/mounts".into(),
      state_dir: "/var/lib/csi-packet".into(),
      filesystem: "ext4".into(),
      auto_alias_prefix: "mpath".into(),
    }
  }
}

impl NodeConfig {
  #[inline]
  pub fn multipath_timeout(&self) -> Duration {
    Duration::from_secs(self.multipath_timeout_secs)
  }

  /// The device node multipath creates for `alias`.
  pub fn mapped_device(&self, alias: &str) -> PathBuf {
    self.mapper_dir.join(alias)
  }

  pub(crate) fn staging_record(&self, volume_id: &str) -> PathBuf {
    self.state_dir.join(format!("{}.json", volume_id))
  }

  /// Rooted copy of the defaults, used to point every location into a
  /// scratch directory.
  pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let defaults = NodeConfig::default();
    let reroot = |p: &PathBuf| root.join(p.strip_prefix("/").unwrap_or(p));

    NodeConfig {
      multipath_bindings: reroot(&defaults.multipath_bindings),
      by_path_dir: reroot(&defaults.by_path_dir),
      mapper_dir: reroot(&defaults.mapper_dir),
      proc_mounts: reroot(&defaults.proc_mounts),
      state_dir: reroot(&defaults.state_dir),
      ..defaults
    }
  }
}
