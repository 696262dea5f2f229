use crate::volume::{CapacityRange, GIB};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ControllerConfig {
  pub min_volume_size_gb: u64,
  pub max_volume_size_gb: u64,
  pub default_volume_size_gb: u64,
  /// Storage plan requested for new volumes.
  pub plan_id: String,
}

impl Default for ControllerConfig {
  fn default() -> Self {
    ControllerConfig {
      min_volume_size_gb: 5,
      max_volume_size_gb: 10_000,
      default_volume_size_gb: 100,
      plan_id: "standard".into(),
    }
  }
}

impl ControllerConfig {
  /// Picks the size, in GiB, for a new volume. Requests outside the
  /// configured band are clamped into it, never rejected.
  pub fn volume_size_gb(&self, range: Option<&CapacityRange>) -> u64 {
    let requested = range.and_then(|r| r.required_bytes().or_else(|| r.limit_bytes()));

    let size_gb = match requested {
      None => self.default_volume_size_gb,
      Some(bytes) => {
        let bytes = bytes.get();
        bytes / GIB + u64::from(bytes % GIB != 0)
      }
    };

    size_gb
      .max(self.min_volume_size_gb)
      .min(self.max_volume_size_gb)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  #[test_case(0, 0 => 100 ; "unspecified uses default")]
  #[test_case(GIB, 0 => 5 ; "below minimum")]
  #[test_case(20 * GIB, 0 => 20 ; "within band")]
  #[test_case(20 * GIB + 1, 0 => 21 ; "rounds up partial gib")]
  #[test_case(0, 50 * GIB => 50 ; "limit only")]
  #[test_case(10 * GIB, 100 * GIB => 10 ; "required wins over limit")]
  #[test_case(20_000 * GIB, 0 => 10_000 ; "above maximum")]
  fn volume_size(required_bytes: u64, limit_bytes: u64) -> u64 {
    let range = CapacityRange::new(required_bytes, limit_bytes);
    ControllerConfig::default().volume_size_gb(range.as_ref())
  }

  #[test]
  fn partial_config() {
    let config: ControllerConfig =
      serde_json::from_str(r#"{"default-volume-size-gb": 50}"#).expect("parse config");

    assert_eq!(config.default_volume_size_gb, 50);
    assert_eq!(config.min_volume_size_gb, 5);
    assert_eq!(config.plan_id, "standard");
  }
}
