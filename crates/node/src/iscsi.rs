//! iSCSI target discovery, sessions and device lookup, all through
//! `iscsiadm` and the udev `by-path` links.

use crate::{
  exec::{Command, Executor, ExecutorExt},
  NodeError, Result,
};
use std::{
  fs, io,
  path::{Path, PathBuf},
};
use tracing::{debug, info};

const ISCSIADM: &str = "iscsiadm";

fn node_command(portal: &str, iqn: &str) -> Command {
  Command::new(ISCSIADM).args(&["--mode", "node", "--portal", portal, "--targetname", iqn])
}

/// Asks `portal` for its targets. Safe to repeat.
pub fn discover<E: Executor + ?Sized>(exec: &E, portal: &str) -> Result<()> {
  exec.run(Command::new(ISCSIADM).args(&[
    "--mode",
    "discovery",
    "--portal",
    portal,
    "--type",
    "sendtargets",
    "--discover",
  ]))?;
  Ok(())
}

/// Whether a session to `iqn` through `portal` is active. `iscsiadm` exits
/// non-zero when there are no sessions at all, which counts as no match.
pub fn has_session<E: Executor + ?Sized>(exec: &E, portal: &str, iqn: &str) -> Result<bool> {
  let output = match exec.probe(Command::new(ISCSIADM).args(&["--mode", "session"]))? {
    Some(output) if output.is_success() => output,
    _ => return Ok(false),
  };

  Ok(output.text().lines().any(|line| session_matches(line, portal, iqn)))
}

fn session_matches(line: &str, portal: &str, iqn: &str) -> bool {
  match line.find(portal) {
    Some(i) => line[i + portal.len()..].contains(iqn),
    None => false,
  }
}

pub fn login<E: Executor + ?Sized>(exec: &E, portal: &str, iqn: &str) -> Result<()> {
  if has_session(exec, portal, iqn)? {
    info!("Session to {} via {} already active", iqn, portal);
    return Ok(());
  }

  exec.run(node_command(portal, iqn).arg("--login"))?;
  Ok(())
}

/// Ends the session to `iqn`. Having no session is not an error.
pub fn logout<E: Executor + ?Sized>(exec: &E, portal: &str, iqn: &str) -> Result<()> {
  if !has_session(exec, portal, iqn)? {
    info!("No session to {} via {}", iqn, portal);
    return Ok(());
  }

  exec.run(node_command(portal, iqn).arg("--logout"))?;
  Ok(())
}

/// Finds the block device behind the `by-path` link for `portal` and `iqn`.
/// Exactly one link must match, and it must be a symlink.
pub fn find_device(by_path_dir: &Path, portal: &str, iqn: &str) -> Result<PathBuf> {
  // udev creates the directory with its first link, so a missing one
  // means no matches.
  let entries = match fs::read_dir(by_path_dir) {
    Ok(entries) => entries.collect::<io::Result<Vec<_>>>()?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
    Err(e) => return Err(e.into()),
  };

  let mut matches = Vec::new();
  for entry in entries {
    let name = entry.file_name();
    if session_matches(&name.to_string_lossy(), portal, iqn) {
      matches.push(entry.path());
    }
  }

  let link = match matches.len() {
    1 => matches.remove(0),
    0 => {
      return Err(NodeError::DeviceResolution(format!(
        "no device for {} via {} in {}",
        iqn,
        portal,
        by_path_dir.display()
      )))
    }
    n => {
      return Err(NodeError::DeviceResolution(format!(
        "{} devices for {} via {} in {}",
        n,
        iqn,
        portal,
        by_path_dir.display()
      )))
    }
  };

  if !fs::symlink_metadata(&link)?.file_type().is_symlink() {
    return Err(NodeError::DeviceResolution(format!(
      "{} is not a symlink",
      link.display()
    )));
  }

  let device = fs::canonicalize(&link).map_err(|e| {
    NodeError::DeviceResolution(format!("failed to resolve {}: {}", link.display(), e))
  })?;
  debug!("Resolved {} to {}", link.display(), device.display());
  Ok(device)
}
