use crate::{
  exec::{Command, Executor, ExecutorExt},
  NodeError, Result,
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlockDeviceInfo {
  pub name: String,
  #[serde(default)]
  pub fstype: Option<String>,
  #[serde(default)]
  pub label: Option<String>,
  #[serde(default)]
  pub uuid: Option<String>,
  #[serde(default)]
  pub mountpoint: Option<String>,
}

impl BlockDeviceInfo {
  /// Whether the device carries no recognizable filesystem.
  pub fn is_unformatted(&self) -> bool {
    self.fstype.as_deref().map_or(true, str::is_empty)
  }
}

#[derive(Deserialize)]
struct LsblkOutput {
  blockdevices: Vec<BlockDeviceInfo>,
}

/// Picks the entry named `name` from `lsblk -J` output.
pub fn parse_lsblk(json: &str, name: &str) -> Result<Option<BlockDeviceInfo>> {
  let output: LsblkOutput =
    serde_json::from_str(json).map_err(|e| NodeError::Parse(format!("lsblk output: {}", e)))?;

  Ok(output.blockdevices.into_iter().find(|d| d.name == name))
}

/// Queries `lsblk` about `device`, whose kernel name is `name`.
pub fn inspect<E: Executor + ?Sized>(exec: &E, device: &Path, name: &str) -> Result<BlockDeviceInfo> {
  if !device.exists() {
    return Err(NodeError::DeviceResolution(format!(
      "{} does not exist",
      device.display()
    )));
  }

  let json = exec.run(
    Command::new("lsblk")
      .args(&["-J", "-i", "--output", "NAME,FSTYPE,LABEL,UUID,MOUNTPOINT"])
      .arg(device),
  )?;

  parse_lsblk(&json, name)?.ok_or_else(|| {
    NodeError::DeviceResolution(format!("device {} not found in lsblk output", name))
  })
}

/// Reads the WWID of `device` through the udev `scsi_id` helper.
pub fn scsi_id<E: Executor + ?Sized>(exec: &E, scsi_id: &Path, device: &Path) -> Result<String> {
  let output = exec.run(Command::new(scsi_id).args(&["-g", "-u", "-d"]).arg(device))?;
  let wwid = output.trim();
  if wwid.is_empty() {
    return Err(NodeError::DeviceResolution(format!(
      "no scsi id for {}",
      device.display()
    )));
  }
  Ok(wwid.to_owned())
}

/// Creates a `filesystem` filesystem on `device`, overwriting whatever is
/// there.
pub fn format<E: Executor + ?Sized>(exec: &E, filesystem: &str, device: &Path) -> Result<()> {
  info!("Formatting {} as {}", device.display(), filesystem);
  exec.run(
    Command::new(format!("mkfs.{}", filesystem))
      .arg("-F")
      .arg(device),
  )?;
  Ok(())
}
