use crate::{
  exec::{Command, Executor, ExecutorExt},
  NodeError, Result,
};
use smallvec::SmallVec;
use std::{
  fs, io,
  path::{Path, PathBuf},
};

const MAX_LIST_TRIES: usize = 3;
const EXPECTED_FIELDS_PER_MOUNTS_LINE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
  pub device: PathBuf,
  pub path: PathBuf,
  pub fstype: String,
  pub opts: Vec<String>,
}

/// Lists the mounts recorded in `proc_mounts`.
pub fn list_mounts(proc_mounts: &Path) -> Result<Vec<MountPoint>> {
  let content = consistent_read(proc_mounts, MAX_LIST_TRIES)?;
  parse_proc_mounts(&content)
}

/// Reads a file until two reads agree. Files in /proc larger than a page
/// may change between individual reads.
fn consistent_read(path: &Path, attempts: usize) -> io::Result<Vec<u8>> {
  let mut old_content = fs::read(path)?;

  for _ in 0..attempts {
    let new_content = fs::read(path)?;
    if new_content == old_content {
      return Ok(new_content);
    }

    old_content = new_content;
  }

  Err(io::Error::new(
    io::ErrorKind::Other,
    format!(
      "could not get consistent content of '{}' after {} attempts",
      path.display(),
      attempts
    ),
  ))
}

pub fn parse_proc_mounts(content: &[u8]) -> Result<Vec<MountPoint>> {
  let mut out = Vec::new();
  let s = std::str::from_utf8(content)
    .map_err(|_| NodeError::Parse("proc mounts contain invalid UTF8".into()))?;
  for line in s.lines() {
    if line.is_empty() {
      continue;
    }

    let fields = line
      .split_whitespace()
      .collect::<SmallVec<[&str; EXPECTED_FIELDS_PER_MOUNTS_LINE]>>();
    if fields.len() != EXPECTED_FIELDS_PER_MOUNTS_LINE {
      return Err(NodeError::Parse(format!(
        "wrong number of fields (expected {}, got {})",
        EXPECTED_FIELDS_PER_MOUNTS_LINE,
        fields.len()
      )));
    }

    out.push(MountPoint {
      device: unescape(fields[0]).into(),
      path: unescape(fields[1]).into(),
      fstype: fields[2].to_owned(),
      opts: fields[3].split(',').map(str::to_owned).collect(),
    })
  }

  Ok(out)
}

/// Undoes the octal escapes (`\040` for space) the kernel applies to mount
/// fields.
fn unescape(field: &str) -> String {
  let bytes = field.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal(&bytes[i + 1..i + 4]) {
      let value = bytes[i + 1..i + 4]
        .iter()
        .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
      if value <= 0xff {
        out.push(value as u8);
        i += 4;
        continue;
      }
    }

    out.push(bytes[i]);
    i += 1;
  }

  String::from_utf8_lossy(&out).into_owned()
}

fn is_octal(digits: &[u8]) -> bool {
  digits.iter().all(|b| (b'0'..=b'7').contains(b))
}

/// Whether `path` is a mountpoint in `mounts`. Symlinks are resolved the way
/// the kernel resolves them before recording a mount.
pub fn is_mounted(mounts: &[MountPoint], path: &Path) -> bool {
  let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_owned());
  mounts.iter().any(|m| m.path == resolved || m.path == path)
}

/// Mountpoints other than `except` that show `device` as their source.
pub fn mounts_of_device<'a>(
  mounts: &'a [MountPoint],
  device: &Path,
  except: &Path,
) -> Vec<&'a MountPoint> {
  let resolved = fs::canonicalize(device).ok();
  mounts
    .iter()
    .filter(|m| m.device == device || Some(&m.device) == resolved.as_ref())
    .filter(|m| m.path != except)
    .collect()
}

/// Mounts the `filesystem` on `device` at `target`.
pub fn mount_device<E: Executor + ?Sized>(
  exec: &E,
  filesystem: &str,
  device: &Path,
  target: &Path,
) -> Result<()> {
  exec.run(
    Command::new("mount")
      .arg("-t")
      .arg(filesystem)
      .arg("--source")
      .arg(device)
      .arg("--target")
      .arg(target),
  )?;
  Ok(())
}

pub fn bind_mount<E: Executor + ?Sized>(exec: &E, source: &Path, target: &Path) -> Result<()> {
  exec.run(Command::new("mount").arg("--bind").arg(source).arg(target))?;
  Ok(())
}

pub fn unmount<E: Executor + ?Sized>(exec: &E, target: &Path) -> Result<()> {
  exec.run(Command::new("umount").arg(target))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::FakeExecutor;
  use test_case::test_case;

  #[test]
  fn read_proc_mounts() {
    let success_case = "
/dev/0 /path/to/0 type0 flags 0 0
/dev/1    /path/to/1   type1	flags 1 1
/dev/2 /path/to/2 type2 flags,1,2=3 2 2
";

    let mounts = parse_proc_mounts(success_case.as_ref()).expect("parse succeeded");
    assert_eq!(mounts.len(), 3);
    assert_eq!(
      mounts[0],
      MountPoint {
        device: "/dev/0".into(),
        path: "/path/to/0".into(),
        fstype: "type0".into(),
        opts: vec!["flags".into()],
      }
    );
    assert_eq!(
      mounts[2].opts,
      vec!["flags".to_owned(), "1".into(), "2=3".into()]
    );

    let error_cases = &["/dev/0 /path/to/mount\n", "/dev/1 /a type flags 0 0 extra\n"];
    for ec in error_cases {
      parse_proc_mounts(ec.as_ref()).expect_err(&format!("Error case '{}' should fail", ec.trim()));
    }
  }

  #[test_case("/var/lib/kubelet" => "/var/lib/kubelet" ; "plain")]
  #[test_case("/mnt/with\\040space" => "/mnt/with space" ; "space")]
  #[test_case("/mnt/tab\\011x" => "/mnt/tab\tx" ; "tab")]
  #[test_case("/mnt/back\\\\slash" => "/mnt/back\\\\slash" ; "not an escape")]
  #[test_case("/mnt/short\\04" => "/mnt/short\\04" ; "truncated escape")]
  fn unescapes_fields(field: &str) -> String {
    unescape(field)
  }

  #[test]
  fn lists_mounts_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("mounts");
    fs::write(
      &table,
      "/dev/mapper/volume-1 /staging/a ext4 rw 0 0\n/dev/mapper/volume-1 /pods/b ext4 rw,bind 0 0\n",
    )
    .unwrap();

    let mounts = list_mounts(&table).unwrap();
    assert!(is_mounted(&mounts, Path::new("/staging/a")));
    assert!(!is_mounted(&mounts, Path::new("/staging")));

    let others = mounts_of_device(
      &mounts,
      Path::new("/dev/mapper/volume-1"),
      Path::new("/staging/a"),
    );
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].path, PathBuf::from("/pods/b"));
  }

  #[test]
  fn mount_command_lines() {
    let exec = FakeExecutor::new();
    mount_device(
      &exec,
      "ext4",
      Path::new("/dev/mapper/volume-1"),
      Path::new("/staging"),
    )
    .unwrap();
    bind_mount(&exec, Path::new("/staging"), Path::new("/pod")).unwrap();
    unmount(&exec, Path::new("/pod")).unwrap();

    assert_eq!(
      exec.get_lines(),
      vec![
        "mount -t ext4 --source /dev/mapper/volume-1 --target /staging",
        "mount --bind /staging /pod",
        "umount /pod",
      ]
    );
  }
}
