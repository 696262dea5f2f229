macro_rules! unsupported {
  ($name:expr) => {{
    ::tracing::error!("Unsupported method {} called", $name);
    return Err($crate::ControllerError::Unimplemented($name.into()));
  }};
}

pub mod controller;
pub mod fake;
pub mod provider;
pub mod volume;

mod config;
mod description;
mod error;
mod packet;
mod utils;

pub use config::ControllerConfig;
pub use controller::ControllerService;
pub use description::{DescriptionError, VolumeDescription};
pub use error::ControllerError;
pub use packet::PacketController;
pub use provider::{ProviderConfig, ProviderError, VolumeProvider};
