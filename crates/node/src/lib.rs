cfg_if::cfg_if! {
  if #[cfg(unix)] {
    mod unix;
    pub use unix::OsExecutor;
  } else {
    compile_error!("Only cfg(unix) is supported at this time")
  }
}

pub mod blockdev;
pub mod iscsi;
pub mod mount;
pub mod multipath;

mod config;
mod exec;
mod fake;
mod orchestrator;
mod runner;
mod utils;

pub use config::NodeConfig;
pub use exec::{Command, ExecOutcome, Executor, ExecutorExt, Output};
pub use fake::{FakeExecutor, FakeResponse};
pub use orchestrator::{
  DeviceOrchestrator, PublishVolumeRequest, StageVolumeRequest, StagingRecord,
  UnpublishVolumeRequest, UnstageVolumeRequest,
};
pub use runner::NodeDriver;

use bitflags::bitflags;
use static_assertions::assert_impl_all;
use std::{io, result};
use thiserror::Error;

pub type Result<T> = result::Result<T, NodeError>;

#[rustfmt::skip]
bitflags! {
  /// Node RPCs a plugin advertises to the orchestrator.
  pub struct NodeCapabilities: u32 {
    const STAGE_UNSTAGE_VOLUME     = 0b_0000_0001;
    const GET_VOLUME_STATS         = 0b_0000_0010;
    const EXPAND_VOLUME            = 0b_0000_0100;
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeError {
  /// The by-path lookup found no device, several devices, or something that
  /// is not a symlink.
  #[error("Device resolution failed: {0}")]
  DeviceResolution(String),

  #[error("`{command}` failed ({}): {output}", describe_status(.status))]
  ExternalTool {
    command: String,
    status: Option<i32>,
    output: String,
  },

  #[error("Invalid multipath bindings on line {line}: {reason}")]
  InvalidBindings { line: usize, reason: String },

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Parse failed: {0}")]
  Parse(String),

  #[error(transparent)]
  Io(#[from] io::Error),
}

fn describe_status(status: &Option<i32>) -> String {
  match status {
    Some(code) => format!("exit status {}", code),
    None => "killed by signal".into(),
  }
}

impl From<NodeError> for tonic::Status {
  fn from(value: NodeError) -> Self {
    use tonic::{Code, Status};

    let code = match &value {
      NodeError::DeviceResolution(_) => Code::NotFound,
      NodeError::InvalidArgument(_) => Code::InvalidArgument,
      NodeError::ExternalTool { .. }
      | NodeError::InvalidBindings { .. }
      | NodeError::Parse(_)
      | NodeError::Io(_) => Code::Internal,
    };

    Status::new(code, value.to_string())
  }
}

assert_impl_all!(OsExecutor: Executor);
assert_impl_all!(FakeExecutor: Executor);
assert_impl_all!(NodeDriver<OsExecutor>: Send, Sync, Clone);
