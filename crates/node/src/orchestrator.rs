use crate::{
  blockdev,
  exec::Executor,
  iscsi,
  mount::{self, MountPoint},
  multipath::{self, update_bindings, volume_id_to_alias},
  unix::{mount_path_info, MountPathInfo},
  utils::Record,
  NodeCapabilities, NodeConfig, NodeError, Result,
};
use serde::{Deserialize, Serialize};
use std::{
  fs, io,
  path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

fn required(value: String, field: &str) -> Result<String> {
  if value.is_empty() {
    return Err(NodeError::InvalidArgument(format!("{} is empty", field)));
  }
  Ok(value)
}

fn required_path(value: PathBuf, field: &str) -> Result<PathBuf> {
  if value.as_os_str().is_empty() {
    return Err(NodeError::InvalidArgument(format!("{} is empty", field)));
  }
  Ok(value)
}

#[derive(Debug, Clone)]
pub struct StageVolumeRequest {
  volume_id: String,
  portal: String,
  iqn: String,
  staging_path: PathBuf,
}

impl StageVolumeRequest {
  pub fn new(
    volume_id: impl Into<String>,
    portal: impl Into<String>,
    iqn: impl Into<String>,
    staging_path: impl Into<PathBuf>,
  ) -> Result<Self> {
    Ok(StageVolumeRequest {
      volume_id: required(volume_id.into(), "NodeStageVolumeRequest.volume_id")?,
      portal: required(portal.into(), "NodeStageVolumeRequest.portal")?,
      iqn: required(iqn.into(), "NodeStageVolumeRequest.iqn")?,
      staging_path: required_path(
        staging_path.into(),
        "NodeStageVolumeRequest.staging_target_path",
      )?,
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// Address of the iSCSI target portal.
  #[inline]
  pub fn portal(&self) -> &str {
    &self.portal
  }

  #[inline]
  pub fn iqn(&self) -> &str {
    &self.iqn
  }

  #[inline]
  pub fn staging_path(&self) -> &Path {
    &self.staging_path
  }
}

#[derive(Debug, Clone)]
pub struct UnstageVolumeRequest {
  volume_id: String,
  staging_path: PathBuf,
}

impl UnstageVolumeRequest {
  pub fn new(volume_id: impl Into<String>, staging_path: impl Into<PathBuf>) -> Result<Self> {
    Ok(UnstageVolumeRequest {
      volume_id: required(volume_id.into(), "NodeUnstageVolumeRequest.volume_id")?,
      staging_path: required_path(
        staging_path.into(),
        "NodeUnstageVolumeRequest.staging_target_path",
      )?,
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  #[inline]
  pub fn staging_path(&self) -> &Path {
    &self.staging_path
  }
}

#[derive(Debug, Clone)]
pub struct PublishVolumeRequest {
  volume_id: String,
  staging_path: PathBuf,
  target_path: PathBuf,
}

impl PublishVolumeRequest {
  pub fn new(
    volume_id: impl Into<String>,
    staging_path: impl Into<PathBuf>,
    target_path: impl Into<PathBuf>,
  ) -> Result<Self> {
    Ok(PublishVolumeRequest {
      volume_id: required(volume_id.into(), "NodePublishVolumeRequest.volume_id")?,
      staging_path: required_path(
        staging_path.into(),
        "NodePublishVolumeRequest.staging_target_path",
      )?,
      target_path: required_path(target_path.into(), "NodePublishVolumeRequest.target_path")?,
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  #[inline]
  pub fn staging_path(&self) -> &Path {
    &self.staging_path
  }

  #[inline]
  pub fn target_path(&self) -> &Path {
    &self.target_path
  }
}

#[derive(Debug, Clone)]
pub struct UnpublishVolumeRequest {
  volume_id: String,
  target_path: PathBuf,
}

impl UnpublishVolumeRequest {
  pub fn new(volume_id: impl Into<String>, target_path: impl Into<PathBuf>) -> Result<Self> {
    Ok(UnpublishVolumeRequest {
      volume_id: required(volume_id.into(), "NodeUnpublishVolumeRequest.volume_id")?,
      target_path: required_path(target_path.into(), "NodeUnpublishVolumeRequest.target_path")?,
    })
  }

  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  #[inline]
  pub fn target_path(&self) -> &Path {
    &self.target_path
  }
}

/// What stage learned about a volume, kept until unstage has torn it down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRecord {
  pub volume_id: String,
  pub alias: String,
  pub portal: String,
  pub iqn: String,
  pub wwid: String,
}

/// Turns an iSCSI target into a mounted filesystem and back.
///
/// Every step checks the host first, so repeating an operation after a
/// partial failure picks up where the last attempt stopped.
pub struct DeviceOrchestrator<E: Executor> {
  exec: E,
  config: NodeConfig,
}

impl<E: Executor> DeviceOrchestrator<E> {
  pub fn new(exec: E, config: NodeConfig) -> Self {
    DeviceOrchestrator { exec, config }
  }

  #[inline]
  pub fn executor(&self) -> &E {
    &self.exec
  }

  #[inline]
  pub fn config(&self) -> &NodeConfig {
    &self.config
  }

  #[inline]
  pub fn capabilities(&self) -> NodeCapabilities {
    NodeCapabilities::STAGE_UNSTAGE_VOLUME
  }

  fn mounts(&self) -> Result<Vec<MountPoint>> {
    mount::list_mounts(&self.config.proc_mounts)
  }

  pub fn read_record(&self, volume_id: &str) -> Result<Option<StagingRecord>> {
    let path = self.config.staging_record(volume_id);
    let content = match fs::read(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&content)
      .map(Some)
      .map_err(|e| NodeError::Parse(format!("{}: {}", path.display(), e)))
  }

  fn write_record(&self, record: &StagingRecord) -> Result<()> {
    fs::create_dir_all(&self.config.state_dir)?;
    let content = serde_json::to_vec_pretty(record)
      .map_err(|e| NodeError::Parse(format!("staging record: {}", e)))?;
    fs::write(self.config.staging_record(&record.volume_id), content)?;
    Ok(())
  }

  fn remove_record(&self, volume_id: &str) -> Result<()> {
    match fs::remove_file(self.config.staging_record(volume_id)) {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
      _ => Ok(()),
    }
  }

  /// Whether another staged volume reaches the same target through the
  /// same portal.
  fn target_shared(&self, record: &StagingRecord) -> Result<bool> {
    let entries = match fs::read_dir(&self.config.state_dir) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
      Err(e) => return Err(e.into()),
    };

    for entry in entries {
      let path = entry?.path();
      let volume_id = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if path.extension().map_or(false, |e| e == "json") => stem.to_owned(),
        _ => continue,
      };
      if volume_id == record.volume_id {
        continue;
      }

      if let Some(other) = self.read_record(&volume_id)? {
        if other.portal == record.portal && other.iqn == record.iqn {
          return Ok(true);
        }
      }
    }

    Ok(false)
  }

  /// Attaches, maps, formats when blank, and mounts the volume at its
  /// staging path, which is returned.
  #[instrument(name = "node.stage_volume", skip(self, request), fields(request, response))]
  pub fn stage_volume(&self, request: StageVolumeRequest) -> Result<PathBuf> {
    let request = request.record_request();
    let (portal, iqn) = (request.portal(), request.iqn());

    iscsi::discover(&self.exec, portal)?;
    iscsi::login(&self.exec, portal, iqn)?;

    let device = iscsi::find_device(&self.config.by_path_dir, portal, iqn)?;
    let wwid = blockdev::scsi_id(&self.exec, &self.config.scsi_id_command, &device)?;

    // The record goes first so unstage can always find what to undo.
    let alias = volume_id_to_alias(request.volume_id());
    self.write_record(&StagingRecord {
      volume_id: request.volume_id().to_owned(),
      alias: alias.clone(),
      portal: portal.to_owned(),
      iqn: iqn.to_owned(),
      wwid: wwid.clone(),
    })?;

    let changed = update_bindings(
      &self.config.multipath_bindings,
      &self.config.auto_alias_prefix,
      |table| table.insert(alias.clone(), wwid.clone()),
    )?;
    if !changed {
      info!("Binding {} to {} already present", alias, wwid);
    }

    multipath::create_map(
      &self.exec,
      &self.config.multipath_command,
      &wwid,
      self.config.multipath_timeout(),
    )?;

    let mapped = self.config.mapped_device(&alias);
    let info = blockdev::inspect(&self.exec, &mapped, &alias)?;
    if info.is_unformatted() {
      blockdev::format(&self.exec, &self.config.filesystem, &mapped)?;
    } else {
      info!(
        "{} already has a {} filesystem",
        mapped.display(),
        info.fstype.as_deref().unwrap_or_default()
      );
    }

    let staging = request.staging_path();
    if mount::is_mounted(&self.mounts()?, staging) {
      info!("{} already mounted", staging.display());
    } else {
      fs::create_dir_all(staging)?;
      mount::mount_device(&self.exec, &self.config.filesystem, &mapped, staging)?;
    }

    Ok(staging.to_owned().record_response())
  }

  /// Unmounts the staging path and, once nothing else uses the device,
  /// removes the map, the session and the binding.
  #[instrument(name = "node.unstage_volume", skip(self, request), fields(request))]
  pub fn unstage_volume(&self, request: UnstageVolumeRequest) -> Result<()> {
    let request = request.record_request();
    let staging = request.staging_path();

    if mount::is_mounted(&self.mounts()?, staging) {
      mount::unmount(&self.exec, staging)?;
    } else {
      debug!("{} is not mounted", staging.display());
    }

    let record = match self.read_record(request.volume_id())? {
      Some(record) => record,
      None => {
        info!("No staging record for {}", request.volume_id());
        return Ok(());
      }
    };

    let mapped = self.config.mapped_device(&record.alias);
    let mounts = self.mounts()?;
    let users = mount::mounts_of_device(&mounts, &mapped, staging);
    if let Some(user) = users.first() {
      warn!(
        "{} is still mounted at {}; keeping map and session",
        mapped.display(),
        user.path.display()
      );
      return Ok(());
    }

    if mapped.exists() {
      multipath::flush_map(
        &self.exec,
        &self.config.multipath_command,
        &record.alias,
        self.config.multipath_timeout(),
      )?;
    } else {
      info!("Map {} already removed", record.alias);
    }

    if self.target_shared(&record)? {
      info!("Keeping session to {}, another volume uses it", record.iqn);
    } else {
      iscsi::logout(&self.exec, &record.portal, &record.iqn)?;
    }

    update_bindings(
      &self.config.multipath_bindings,
      &self.config.auto_alias_prefix,
      |table| table.remove(&record.alias),
    )?;
    self.remove_record(request.volume_id())
  }

  /// Bind-mounts the staging path onto the target path.
  #[instrument(name = "node.publish_volume", skip(self, request), fields(request))]
  pub fn publish_volume(&self, request: PublishVolumeRequest) -> Result<()> {
    let request = request.record_request();
    let target = request.target_path();

    fs::create_dir_all(target)?;
    if mount::is_mounted(&self.mounts()?, target) {
      info!("{} already mounted", target.display());
      return Ok(());
    }

    mount::bind_mount(&self.exec, request.staging_path(), target)
  }

  #[instrument(name = "node.unpublish_volume", skip(self, request), fields(request))]
  pub fn unpublish_volume(&self, request: UnpublishVolumeRequest) -> Result<()> {
    let request = request.record_request();
    let target = request.target_path();

    match mount_path_info(target)? {
      MountPathInfo::NotExists => {
        debug!("{} does not exist", target.display());
        Ok(())
      }
      MountPathInfo::Corrupted => {
        warn!("{} is a broken mount, unmounting", target.display());
        mount::unmount(&self.exec, target)
      }
      MountPathInfo::Exists if mount::is_mounted(&self.mounts()?, target) => {
        mount::unmount(&self.exec, target)
      }
      MountPathInfo::Exists => {
        warn!("{} is not mounted", target.display());
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{multipath::BindingTable, FakeExecutor, FakeResponse};
  use std::os::unix::fs::symlink;
  use tempfile::TempDir;

  const VOLUME_ID: &str = "3ee59355-a51a-42a8-b848-86626cc532f0";
  const ALIAS: &str = "volume-3ee59355";
  const PORTAL: &str = "10.144.144.144";
  const IQN: &str = "iqn.2013-05.com.daterainc:tc:01:sn:b06f1e9b8b6b6a77";
  const WWID: &str = "36001405f2b3e1d4a6a5c0c4d3d2e1f0a";

  const UNFORMATTED: &str =
    r#"{"blockdevices":[{"name":"volume-3ee59355","fstype":null,"label":null,"uuid":null,"mountpoint":null}]}"#;
  const FORMATTED: &str =
    r#"{"blockdevices":[{"name":"volume-3ee59355","fstype":"ext4","label":null,"uuid":"0b6e","mountpoint":null}]}"#;

  struct Node {
    dir: TempDir,
    orchestrator: DeviceOrchestrator<FakeExecutor>,
  }

  impl Node {
    fn new() -> Self {
      let dir = tempfile::tempdir().unwrap();
      let config = NodeConfig::rooted_at(dir.path());

      fs::create_dir_all(config.proc_mounts.parent().unwrap()).unwrap();
      fs::write(&config.proc_mounts, "").unwrap();

      let raw = dir.path().join("dev/sdb");
      fs::create_dir_all(&config.by_path_dir).unwrap();
      fs::write(&raw, b"").unwrap();
      symlink(
        &raw,
        config
          .by_path_dir
          .join(format!("ip-{}:3260-iscsi-{}-lun-0", PORTAL, IQN)),
      )
      .unwrap();

      fs::create_dir_all(&config.mapper_dir).unwrap();
      fs::write(config.mapped_device(ALIAS), b"").unwrap();

      let exec = FakeExecutor::with_mount_table(&config.proc_mounts);
      exec.respond(
        "iscsiadm --mode session",
        FakeResponse::failure(21, "iscsiadm: No active sessions."),
      );
      exec.respond("scsi_id", FakeResponse::success(format!("{}\n", WWID)));
      exec.respond("lsblk", FakeResponse::success(UNFORMATTED));

      Node {
        dir,
        orchestrator: DeviceOrchestrator::new(exec, config),
      }
    }

    fn exec(&self) -> &FakeExecutor {
      self.orchestrator.executor()
    }

    fn config(&self) -> &NodeConfig {
      self.orchestrator.config()
    }

    fn path(&self, rel: &str) -> PathBuf {
      self.dir.path().join(rel)
    }

    fn session_active(&self) {
      self.exec().respond(
        "iscsiadm --mode session",
        FakeResponse::success(format!("tcp: [1] {}:3260,1 {} (non-flash)\n", PORTAL, IQN)),
      );
    }

    fn stage(&self) -> Result<PathBuf> {
      let request =
        StageVolumeRequest::new(VOLUME_ID, PORTAL, IQN, self.path("staging")).unwrap();
      self.orchestrator.stage_volume(request)
    }

    fn unstage(&self) -> Result<()> {
      let request = UnstageVolumeRequest::new(VOLUME_ID, self.path("staging")).unwrap();
      self.orchestrator.unstage_volume(request)
    }

    fn publish(&self, target: &str) -> Result<()> {
      let request =
        PublishVolumeRequest::new(VOLUME_ID, self.path("staging"), self.path(target)).unwrap();
      self.orchestrator.publish_volume(request)
    }

    fn unpublish(&self, target: &str) -> Result<()> {
      let request = UnpublishVolumeRequest::new(VOLUME_ID, self.path(target)).unwrap();
      self.orchestrator.unpublish_volume(request)
    }

    fn mounted(&self, rel: &str) -> bool {
      mount::is_mounted(&self.orchestrator.mounts().unwrap(), &self.path(rel))
    }

    fn lines(&self) -> Vec<String> {
      self.exec().get_lines()
    }

    fn bindings(&self) -> BindingTable {
      BindingTable::read(&self.config().multipath_bindings, "mpath").unwrap()
    }
  }

  #[test]
  fn stage_runs_the_full_sequence() {
    let node = Node::new();
    let staging = node.stage().unwrap();
    assert_eq!(staging, node.path("staging"));

    let mapped = node.config().mapped_device(ALIAS);
    assert_eq!(
      node.lines(),
      vec![
        format!(
          "iscsiadm --mode discovery --portal {} --type sendtargets --discover",
          PORTAL
        ),
        "iscsiadm --mode session".into(),
        format!(
          "iscsiadm --mode node --portal {} --targetname {} --login",
          PORTAL, IQN
        ),
        format!(
          "scsi_id -g -u -d {}",
          fs::canonicalize(node.path("dev/sdb")).unwrap().display()
        ),
        format!("multipath {}", WWID),
        format!(
          "lsblk -J -i --output NAME,FSTYPE,LABEL,UUID,MOUNTPOINT {}",
          mapped.display()
        ),
        format!("mkfs.ext4 -F {}", mapped.display()),
        format!(
          "mount -t ext4 --source {} --target {}",
          mapped.display(),
          staging.display()
        ),
      ]
    );

    assert_eq!(node.bindings().get(ALIAS), Some(WWID));
    assert!(node.mounted("staging"));
    assert_eq!(
      node.orchestrator.read_record(VOLUME_ID).unwrap(),
      Some(StagingRecord {
        volume_id: VOLUME_ID.into(),
        alias: ALIAS.into(),
        portal: PORTAL.into(),
        iqn: IQN.into(),
        wwid: WWID.into(),
      })
    );
  }

  #[test]
  fn stage_is_idempotent() {
    let node = Node::new();
    node.stage().unwrap();

    node.session_active();
    node.exec().respond("lsblk", FakeResponse::success(FORMATTED));
    node.exec().reset_log();

    node.stage().unwrap();
    let lines = node.lines();
    assert!(lines[0].starts_with("iscsiadm --mode discovery"));
    assert!(!lines.iter().any(|l| l.ends_with("--login")));
    assert!(!lines.iter().any(|l| l.starts_with("mkfs")));
    assert!(!lines.iter().any(|l| l.starts_with("mount")));
    assert_eq!(node.bindings().kept().len(), 1);
  }

  #[test]
  fn stage_keeps_user_bindings_only() {
    let node = Node::new();
    let bindings = &node.config().multipath_bindings;
    fs::create_dir_all(bindings.parent().unwrap()).unwrap();
    fs::write(
      bindings,
      "# alias wwid\nmpatha 36001405aaaa\nvolume-9c1f02aa 36001405bbbb\n",
    )
    .unwrap();

    node.stage().unwrap();

    let table = node.bindings();
    assert_eq!(
      table.kept().keys().collect::<Vec<_>>(),
      vec![ALIAS, "volume-9c1f02aa"]
    );
    assert!(table.discarded().is_empty());
  }

  #[test]
  fn stage_survives_multipath_timeout() {
    let node = Node::new();
    node.exec().respond("multipath", FakeResponse::TimedOut);
    node.stage().unwrap();
    assert!(node.mounted("staging"));
  }

  #[test]
  fn stage_without_device_stops_before_multipath() {
    let node = Node::new();
    fs::remove_dir_all(&node.config().by_path_dir).unwrap();
    fs::create_dir_all(&node.config().by_path_dir).unwrap();

    let err = node.stage().unwrap_err();
    assert!(matches!(err, NodeError::DeviceResolution(_)));
    assert!(!node.lines().iter().any(|l| l.starts_with("multipath")));
    assert!(node.orchestrator.read_record(VOLUME_ID).unwrap().is_none());
  }

  #[test]
  fn stage_without_record_leaves_bindings_alone() {
    let node = Node::new();
    let state_dir = &node.config().state_dir;
    fs::create_dir_all(state_dir.parent().unwrap()).unwrap();
    fs::write(state_dir, b"not a directory").unwrap();

    assert!(matches!(node.stage().unwrap_err(), NodeError::Io(_)));
    assert_eq!(node.bindings().get(ALIAS), None);
    assert!(!node.lines().iter().any(|l| l.starts_with("multipath")));
  }

  #[test]
  fn stage_reports_tool_failures() {
    let node = Node::new();
    node
      .exec()
      .respond("mkfs.ext4", FakeResponse::failure(1, "device is busy"));

    let err = node.stage().unwrap_err();
    assert!(matches!(err, NodeError::ExternalTool { status: Some(1), .. }));
    assert!(!node.mounted("staging"));
  }

  #[test]
  fn publish_bind_mounts_once() {
    let node = Node::new();
    node.stage().unwrap();
    node.exec().reset_log();

    node.publish("pods/a/volume").unwrap();
    node.publish("pods/a/volume").unwrap();

    assert!(node.path("pods/a/volume").is_dir());
    assert!(node.mounted("pods/a/volume"));
    assert_eq!(
      node.lines(),
      vec![format!(
        "mount --bind {} {}",
        node.path("staging").display(),
        node.path("pods/a/volume").display()
      )]
    );
  }

  #[test]
  fn unpublish_unmounts_target() {
    let node = Node::new();
    node.stage().unwrap();
    node.publish("pods/a/volume").unwrap();
    node.exec().reset_log();

    node.unpublish("pods/a/volume").unwrap();
    node.unpublish("pods/a/volume").unwrap();

    assert!(!node.mounted("pods/a/volume"));
    assert_eq!(
      node.lines(),
      vec![format!("umount {}", node.path("pods/a/volume").display())]
    );
  }

  #[test]
  fn unpublish_missing_target_succeeds() {
    let node = Node::new();
    node.unpublish("pods/gone").unwrap();
    assert!(node.lines().is_empty());
  }

  #[test]
  fn unstage_reverses_stage() {
    let node = Node::new();
    node.stage().unwrap();
    node.session_active();
    node.exec().reset_log();

    node.unstage().unwrap();

    assert_eq!(
      node.lines(),
      vec![
        format!("umount {}", node.path("staging").display()),
        format!("multipath -f {}", ALIAS),
        "iscsiadm --mode session".into(),
        format!(
          "iscsiadm --mode node --portal {} --targetname {} --logout",
          PORTAL, IQN
        ),
      ]
    );
    assert!(!node.mounted("staging"));
    assert_eq!(node.bindings().get(ALIAS), None);
    assert!(node.orchestrator.read_record(VOLUME_ID).unwrap().is_none());
  }

  #[test]
  fn unstage_keeps_device_while_published() {
    let node = Node::new();
    node.stage().unwrap();
    node.publish("pods/a/volume").unwrap();
    node.session_active();
    node.exec().reset_log();

    node.unstage().unwrap();

    assert_eq!(
      node.lines(),
      vec![format!("umount {}", node.path("staging").display())]
    );
    assert_eq!(node.bindings().get(ALIAS), Some(WWID));
    assert!(node.orchestrator.read_record(VOLUME_ID).unwrap().is_some());
  }

  #[test]
  fn unstage_keeps_shared_session() {
    let node = Node::new();
    node.stage().unwrap();
    node
      .orchestrator
      .write_record(&StagingRecord {
        volume_id: "9c1f02aa-0000".into(),
        alias: "volume-9c1f02aa".into(),
        portal: PORTAL.into(),
        iqn: IQN.into(),
        wwid: "36001405bbbb".into(),
      })
      .unwrap();
    node.session_active();
    node.exec().reset_log();

    node.unstage().unwrap();

    assert!(!node.lines().iter().any(|l| l.contains("--logout")));
    assert!(node.orchestrator.read_record(VOLUME_ID).unwrap().is_none());
  }

  #[test]
  fn unstage_twice_is_harmless() {
    let node = Node::new();
    node.stage().unwrap();
    node.unstage().unwrap();
    node.exec().reset_log();

    node.unstage().unwrap();
    assert!(node.lines().is_empty());
  }

  #[test]
  fn requests_require_fields() {
    assert!(matches!(
      StageVolumeRequest::new(VOLUME_ID, "", IQN, "/staging"),
      Err(NodeError::InvalidArgument(_))
    ));
    assert!(matches!(
      PublishVolumeRequest::new(VOLUME_ID, "/staging", ""),
      Err(NodeError::InvalidArgument(_))
    ));
  }
}
