use crate::{
  exec::{Command, ExecOutcome, Executor, Output},
  NodeError, Result,
};
use crossbeam::{scope, select};
use duct::cmd;
use std::{
  io,
  os::unix::process::ExitStatusExt,
  path::{Path, PathBuf},
  process,
  time::Duration,
};
use tracing::{debug, warn};
use which::which;

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsExecutor;

impl OsExecutor {
  pub fn new() -> Self {
    OsExecutor
  }

  fn resolve(command: &Command) -> Result<PathBuf> {
    let program = Path::new(command.program());
    if program.is_absolute() {
      return Ok(program.to_owned());
    }

    which(program).map_err(|e| NodeError::ExternalTool {
      command: command.to_string(),
      status: None,
      output: format!("{} not found: {}", command.program(), e),
    })
  }

  fn wait_bounded(handle: &duct::Handle, timeout: Duration) -> Result<Option<process::Output>> {
    scope::<'_, _, io::Result<Option<process::Output>>>(|s| {
      let (sender, receiver) = crossbeam::channel::bounded(1);

      s.spawn(move |_| {
        let result = handle.wait().map(Clone::clone);
        let _ = sender.send(result);
      });

      select! {
        recv(receiver) -> result => match result {
          Ok(output) => output.map(Some),
          Err(_) => Err(io::Error::new(io::ErrorKind::Other, "waiter thread vanished")),
        },
        default(timeout) => {
          if let Err(e) = handle.kill() {
            warn!("Failed to kill timed out command: {}", e);
          }
          Ok(None)
        },
      }
    })
    .map_err(|e| {
      NodeError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("Failed to spawn threads: {:?}", e),
      ))
    })?
    .map_err(Into::into)
  }
}

fn to_output(output: process::Output) -> Output {
  // stderr is redirected into stdout.
  let text = String::from_utf8_lossy(&output.stdout).into_owned();
  match output.status.code() {
    Some(code) => Output::new(Some(code), text),
    None => {
      debug!("Command terminated by signal {:?}", output.status.signal());
      Output::new(None, text)
    }
  }
}

impl Executor for OsExecutor {
  fn execute(&self, command: &Command) -> Result<ExecOutcome> {
    let program = Self::resolve(command)?;
    let expr = cmd(program, command.arguments())
      .stderr_to_stdout()
      .stdout_capture()
      .unchecked();

    match command.get_timeout() {
      None => Ok(ExecOutcome::Exited(to_output(expr.run()?))),
      Some(timeout) => {
        let handle = expr.start()?;
        match Self::wait_bounded(&handle, timeout)? {
          Some(output) => Ok(ExecOutcome::Exited(to_output(output))),
          None => Ok(ExecOutcome::TimedOut),
        }
      }
    }
  }
}

/// What a `stat` of a mount path says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MountPathInfo {
  Exists,
  NotExists,
  /// The path is a mount whose backing storage went away.
  Corrupted,
}

pub(crate) fn mount_path_info(path: &Path) -> io::Result<MountPathInfo> {
  match path.metadata() {
    Ok(_) => Ok(MountPathInfo::Exists),
    Err(e) => match e.raw_os_error() {
      None => Err(e),
      Some(code) => match code {
        libc::ENOENT => Ok(MountPathInfo::NotExists),
        libc::ENOTCONN | libc::ESTALE | libc::EIO | libc::EACCES => Ok(MountPathInfo::Corrupted),
        _ => Err(e),
      },
    },
  }
}
