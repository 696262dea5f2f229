use crate::{NodeError, Result};
use smallvec::SmallVec;
use std::{
  ffi::OsStr,
  fmt,
  panic::{RefUnwindSafe, UnwindSafe},
  path::Path,
  time::Duration,
};
use tracing::{debug, info};

/// A single external program invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
  program: String,
  args: SmallVec<[String; 8]>,
  timeout: Option<Duration>,
}

impl Command {
  pub fn new(program: impl AsRef<OsStr>) -> Self {
    Command {
      program: program.as_ref().to_string_lossy().into_owned(),
      args: SmallVec::new(),
      timeout: None,
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_string_lossy().into_owned());
    self
  }

  pub fn args<I>(mut self, args: I) -> Self
  where
    I: IntoIterator,
    I::Item: AsRef<OsStr>,
  {
    for arg in args {
      self = self.arg(arg);
    }
    self
  }

  /// Kill the program once `timeout` has passed.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  #[inline]
  pub fn program(&self) -> &str {
    &self.program
  }

  #[inline]
  pub fn arguments(&self) -> &[String] {
    &self.args
  }

  #[inline]
  pub fn get_timeout(&self) -> Option<Duration> {
    self.timeout
  }

  /// Base name of the program, used to classify commands in logs.
  pub fn name(&self) -> &str {
    Path::new(&self.program)
      .file_name()
      .and_then(OsStr::to_str)
      .unwrap_or(&self.program)
  }

  fn changes_state(&self) -> bool {
    match self.name() {
      "mount" | "umount" | "multipath" => true,
      "iscsiadm" => self
        .args
        .iter()
        .any(|a| a == "--login" || a == "--logout"),
      name => name.starts_with("mkfs"),
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

impl fmt::Debug for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Command({})", self)
  }
}

/// Exit status and combined stdout/stderr of a finished program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
  code: Option<i32>,
  text: String,
}

impl Output {
  pub fn new(code: Option<i32>, text: impl Into<String>) -> Self {
    Output {
      code,
      text: text.into(),
    }
  }

  pub fn success(text: impl Into<String>) -> Self {
    Self::new(Some(0), text)
  }

  #[inline]
  pub fn code(&self) -> Option<i32> {
    self.code
  }

  #[inline]
  pub fn is_success(&self) -> bool {
    self.code == Some(0)
  }

  #[inline]
  pub fn text(&self) -> &str {
    &self.text
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
  Exited(Output),
  /// The program ran past its timeout and was killed.
  TimedOut,
}

/// Runs external programs on behalf of the device orchestrator.
///
/// Errors are reserved for programs that could not be started at all. A
/// program that ran and failed is reported through [`ExecOutcome`].
pub trait Executor: Send + Sync + UnwindSafe + RefUnwindSafe + 'static {
  fn execute(&self, command: &Command) -> Result<ExecOutcome>;
}

pub trait ExecutorExt: Executor {
  /// Runs `command` and returns its output, failing on a non-zero exit. A
  /// command that times out yields empty output.
  fn run(&self, command: Command) -> Result<String> {
    if command.changes_state() {
      info!("Running {}", command);
    } else {
      debug!("Running {}", command);
    }

    match self.execute(&command)? {
      ExecOutcome::Exited(output) if output.is_success() => Ok(output.text),
      ExecOutcome::Exited(output) => {
        debug!(
          "{} failed with {:?}: {}",
          command,
          output.code,
          output.text.trim_end()
        );
        Err(NodeError::ExternalTool {
          command: command.to_string(),
          status: output.code,
          output: output.text,
        })
      }
      ExecOutcome::TimedOut => {
        debug!(
          "{} timed out after {:?}",
          command,
          command.get_timeout().unwrap_or_default()
        );
        Ok(String::new())
      }
    }
  }

  /// Runs `command` and hands back whatever it produced, successful or not.
  fn probe(&self, command: Command) -> Result<Option<Output>> {
    debug!("Probing {}", command);
    match self.execute(&command)? {
      ExecOutcome::Exited(output) => Ok(Some(output)),
      ExecOutcome::TimedOut => Ok(None),
    }
  }
}

impl<T: Executor + ?Sized> ExecutorExt for T {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{FakeExecutor, FakeResponse};
  use test_case::test_case;

  #[test]
  fn displays_command_line() {
    let command = Command::new("/sbin/multipath")
      .arg("-f")
      .arg("volume-3ee59355");
    assert_eq!(command.to_string(), "/sbin/multipath -f volume-3ee59355");
    assert_eq!(command.name(), "multipath");
  }

  #[test_case(&["mount", "--bind", "/a", "/b"] => true)]
  #[test_case(&["mkfs.ext4", "-F", "/dev/mapper/x"] => true)]
  #[test_case(&["iscsiadm", "--mode", "session"] => false)]
  #[test_case(&["iscsiadm", "--mode", "node", "--logout"] => true)]
  #[test_case(&["lsblk", "-J"] => false)]
  fn state_changing_commands(line: &[&str]) -> bool {
    Command::new(line[0]).args(&line[1..]).changes_state()
  }

  #[test]
  fn run_fails_on_non_zero_exit() {
    let exec = FakeExecutor::new();
    exec.respond("lsblk", FakeResponse::failure(32, "lsblk: not a block device"));

    let err = exec.run(Command::new("lsblk").arg("/dev/nope")).unwrap_err();
    match err {
      NodeError::ExternalTool {
        command,
        status,
        output,
      } => {
        assert_eq!(command, "lsblk /dev/nope");
        assert_eq!(status, Some(32));
        assert_eq!(output, "lsblk: not a block device");
      }
      e => panic!("unexpected error {:?}", e),
    }
  }

  #[test]
  fn run_treats_timeout_as_empty_output() {
    let exec = FakeExecutor::new();
    exec.respond("multipath", FakeResponse::TimedOut);

    let command = Command::new("multipath")
      .arg("36001405f")
      .timeout(Duration::from_secs(10));
    assert_eq!(exec.run(command).unwrap(), "");
  }

  #[test]
  fn probe_keeps_failed_output() {
    let exec = FakeExecutor::new();
    exec.respond("iscsiadm", FakeResponse::failure(21, "No active sessions."));

    let output = exec
      .probe(Command::new("iscsiadm").args(&["--mode", "session"]))
      .unwrap()
      .unwrap();
    assert!(!output.is_success());
    assert_eq!(output.text(), "No active sessions.");
  }
}
