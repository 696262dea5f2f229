use crate::provider::ProviderError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ControllerError {
  /// A request field is missing, malformed, or asks for an access mode this
  /// plugin cannot serve.
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  /// A referenced volume or node could not be found on a path where absence
  /// is not treated as success.
  #[error("Not found: {0}")]
  NotFound(String),

  /// The volume is already attached to a different node, and only
  /// single-node access modes are supported.
  #[error("Volume published to another node: {0}")]
  PublishedToAnotherNode(String),

  /// The remote block-storage service rejected a call.
  #[error("{operation} failed: {source}")]
  Remote {
    operation: String,
    #[source]
    source: ProviderError,
  },

  #[error("Unsupported method {0} called")]
  Unimplemented(String),
}

impl ControllerError {
  pub(crate) fn remote(operation: impl Into<String>, source: ProviderError) -> Self {
    ControllerError::Remote {
      operation: operation.into(),
      source,
    }
  }
}

impl From<ControllerError> for tonic::Status {
  fn from(value: ControllerError) -> Self {
    use tonic::{Code, Status};

    let code = match &value {
      ControllerError::InvalidArgument(_) => Code::InvalidArgument,
      ControllerError::NotFound(_) => Code::NotFound,
      ControllerError::PublishedToAnotherNode(_) => Code::FailedPrecondition,
      ControllerError::Remote { source, .. } if source.is_not_found() => Code::NotFound,
      ControllerError::Remote { source, .. } if source.status().is_none() => Code::Unavailable,
      ControllerError::Remote { .. } => Code::Internal,
      ControllerError::Unimplemented(_) => Code::Unimplemented,
    };

    Status::new(code, value.to_string())
  }
}
