//! Multipath alias bindings and map management.
//!
//! The bindings file maps a stable alias to a device WWID, one pair per
//! line. Lines starting with `#` are comments. Aliases multipath generated
//! on its own carry a reserved prefix; they are read but never written back.

use crate::{
  exec::{Command, Executor, ExecutorExt},
  NodeError, Result,
};
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::{
  collections::{BTreeMap, HashMap},
  fs, io,
  path::{Path, PathBuf},
  process,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};
use tracing::{debug, info};

const HEADER: &str = "\
# Multipath bindings, Version : 1.0
# NOTE: this file is automatically maintained by the multipath program.
# You should not need to edit this file in normal circumstances.
#
# Format:
# alias wwid
#
";

/// Derives the multipath alias for a volume from the first segment of its
/// UUID.
pub fn volume_id_to_alias(volume_id: &str) -> String {
  let segment = volume_id.split('-').next().unwrap_or(volume_id);
  format!("volume-{}", segment)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
  kept: BTreeMap<String, String>,
  discarded: BTreeMap<String, String>,
}

impl BindingTable {
  /// Parses bindings text. Any non-comment line that is not exactly
  /// `alias wwid` fails the whole table.
  pub fn parse(content: &str, auto_prefix: &str) -> Result<Self> {
    let mut table = BindingTable::default();

    for (i, line) in content.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }

      let fields = line.split_whitespace().collect::<SmallVec<[&str; 2]>>();
      let (alias, wwid) = match fields[..] {
        [alias, wwid] => (alias, wwid),
        _ => {
          return Err(NodeError::InvalidBindings {
            line: i + 1,
            reason: format!("expected 2 fields, got {}", fields.len()),
          })
        }
      };

      let entries = if alias.starts_with(auto_prefix) {
        &mut table.discarded
      } else {
        &mut table.kept
      };
      entries.insert(alias.to_owned(), wwid.to_owned());
    }

    Ok(table)
  }

  /// Reads the bindings file. A missing file is an empty table.
  pub fn read(path: &Path, auto_prefix: &str) -> Result<Self> {
    match fs::read_to_string(path) {
      Ok(content) => Self::parse(&content, auto_prefix),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BindingTable::default()),
      Err(e) => Err(e.into()),
    }
  }

  /// Renders the kept entries. Discarded entries are dropped.
  pub fn render(&self) -> String {
    let mut out = String::from(HEADER);
    for (alias, wwid) in &self.kept {
      out.push_str(alias);
      out.push(' ');
      out.push_str(wwid);
      out.push('\n');
    }
    out
  }

  /// Replaces the file at `path` with this table. The content goes to a
  /// sibling file first, so readers never see a partial table.
  pub fn write(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", process::id()));
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, self.render())?;
    if let Err(e) = fs::rename(&tmp, path) {
      let _ = fs::remove_file(&tmp);
      return Err(e.into());
    }
    Ok(())
  }

  #[inline]
  pub fn kept(&self) -> &BTreeMap<String, String> {
    &self.kept
  }

  #[inline]
  pub fn discarded(&self) -> &BTreeMap<String, String> {
    &self.discarded
  }

  pub fn get(&self, alias: &str) -> Option<&str> {
    self.kept.get(alias).map(String::as_str)
  }

  /// Binds `alias` to `wwid`. Returns whether anything changed.
  pub fn insert(&mut self, alias: impl Into<String>, wwid: impl Into<String>) -> bool {
    let wwid = wwid.into();
    match self.kept.insert(alias.into(), wwid.clone()) {
      Some(previous) => previous != wwid,
      None => true,
    }
  }

  pub fn remove(&mut self, alias: &str) -> Option<String> {
    self.kept.remove(alias)
  }
}

static LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
  Lazy::new(|| Mutex::new(HashMap::new()));

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
  let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
  locks
    .entry(path.to_owned())
    .or_insert_with(|| Arc::new(Mutex::new(())))
    .clone()
}

/// Read-modify-write of the bindings file at `path`. Updates to the same
/// file within this process are serialized.
pub fn update_bindings<R>(
  path: &Path,
  auto_prefix: &str,
  f: impl FnOnce(&mut BindingTable) -> R,
) -> Result<R> {
  let lock = file_lock(path);
  let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

  let mut table = BindingTable::read(path, auto_prefix)?;
  let result = f(&mut table);
  table.write(path)?;
  debug!(
    "Wrote {} bindings to {}",
    table.kept().len(),
    path.display()
  );
  Ok(result)
}

/// Asks multipath to build the map for `wwid`. Running past `timeout` is not
/// an error; the map may still be settling.
pub fn create_map<E: Executor + ?Sized>(
  exec: &E,
  multipath: &Path,
  wwid: &str,
  timeout: Duration,
) -> Result<String> {
  exec.run(Command::new(multipath).arg(wwid).timeout(timeout))
}

/// Flushes the map for `alias`.
pub fn flush_map<E: Executor + ?Sized>(
  exec: &E,
  multipath: &Path,
  alias: &str,
  timeout: Duration,
) -> Result<()> {
  exec.run(Command::new(multipath).arg("-f").arg(alias).timeout(timeout))?;
  info!("Flushed multipath map {}", alias);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{FakeExecutor, FakeResponse};
  use std::thread;
  use test_case::test_case;

  const BINDINGS: &str = "\
# Multipath bindings, Version : 1.0
# Format:
# alias wwid
#
mpatha 360014055ee1b3a0d4f1f4e5e2bbb6d7f
volume-3ee59355 36001405f2b3e1d4a6a5c0c4d3d2e1f0a
mpathb 36001405aaaaaaaaaaaaaaaaaaaaaaaaa

volume-9c1f02aa 36001405bbbbbbbbbbbbbbbbbbbbbbbbb
";

  #[test_case("3ee59355-a51a-42a8-b848-86626cc532f0" => "volume-3ee59355")]
  #[test_case("9c1f02aa" => "volume-9c1f02aa")]
  #[test_case("" => "volume-")]
  fn alias(volume_id: &str) -> String {
    volume_id_to_alias(volume_id)
  }

  #[test]
  fn parse_splits_auto_aliases() {
    let table = BindingTable::parse(BINDINGS, "mpath").unwrap();
    assert_eq!(
      table.kept().keys().collect::<Vec<_>>(),
      vec!["volume-3ee59355", "volume-9c1f02aa"]
    );
    assert_eq!(
      table.discarded().keys().collect::<Vec<_>>(),
      vec!["mpatha", "mpathb"]
    );
  }

  #[test_case("volume-1\n" => 1 ; "single field")]
  #[test_case("# ok\nvolume-1 a b\n" => 2 ; "three fields")]
  fn malformed_lines(content: &str) -> usize {
    match BindingTable::parse(content, "mpath").unwrap_err() {
      NodeError::InvalidBindings { line, .. } => line,
      e => panic!("unexpected error {:?}", e),
    }
  }

  #[test]
  fn round_trip_drops_auto_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bindings");
    fs::write(&path, BINDINGS).unwrap();

    let table = BindingTable::read(&path, "mpath").unwrap();
    table.write(&path).unwrap();

    let reread = BindingTable::read(&path, "mpath").unwrap();
    assert_eq!(reread.kept(), table.kept());
    assert!(reread.discarded().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
  }

  #[test]
  fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let table = BindingTable::read(&dir.path().join("bindings"), "mpath").unwrap();
    assert_eq!(table, BindingTable::default());
  }

  #[test]
  fn insert_reports_changes() {
    let mut table = BindingTable::default();
    assert!(table.insert("volume-1", "wwid-1"));
    assert!(!table.insert("volume-1", "wwid-1"));
    assert!(table.insert("volume-1", "wwid-2"));
    assert_eq!(table.get("volume-1"), Some("wwid-2"));
    assert_eq!(table.remove("volume-1"), Some("wwid-2".into()));
  }

  #[test]
  fn concurrent_updates_keep_every_binding() {
    let dir = tempfile::tempdir().unwrap();
    let path = Arc::new(dir.path().join("etc/multipath/bindings"));

    let handles = (0..16)
      .map(|i| {
        let path = path.clone();
        thread::spawn(move || {
          update_bindings(&path, "mpath", |table| {
            table.insert(format!("volume-{:08x}", i), format!("wwid-{}", i))
          })
          .unwrap()
        })
      })
      .collect::<Vec<_>>();

    for handle in handles {
      assert!(handle.join().unwrap());
    }

    let table = BindingTable::read(&path, "mpath").unwrap();
    assert_eq!(table.kept().len(), 16);
  }

  #[test]
  fn map_timeouts_are_benign() {
    let exec = FakeExecutor::new();
    exec.respond("multipath", FakeResponse::TimedOut);

    let output = create_map(
      &exec,
      Path::new("/sbin/multipath"),
      "36001405f2b3e1d4a6a5c0c4d3d2e1f0a",
      Duration::from_secs(10),
    )
    .unwrap();
    assert_eq!(output, "");
    assert_eq!(
      exec.get_log()[0].get_timeout(),
      Some(Duration::from_secs(10))
    );
  }
}
