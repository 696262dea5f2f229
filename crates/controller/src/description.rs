use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The idempotency key stored in a remote volume's free-text description.
///
/// The wire form is a JSON object `{"Name": ..., "Created": ...}` with an
/// RFC 3339 timestamp, so volumes created by earlier plugin versions remain
/// recognizable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeDescription {
  name: String,
  created: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("Invalid volume description: {0}")]
pub struct DescriptionError(#[from] serde_json::Error);

impl VolumeDescription {
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_created(name, Utc::now())
  }

  pub fn with_created(name: impl Into<String>, created: DateTime<Utc>) -> Self {
    VolumeDescription {
      name: name.into(),
      created,
    }
  }

  /// The orchestrator-assigned volume name.
  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[inline]
  pub fn created(&self) -> DateTime<Utc> {
    self.created
  }
}

impl fmt::Display for VolumeDescription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let serialized = serde_json::to_string(self).map_err(|_| fmt::Error)?;
    f.write_str(&serialized)
  }
}

impl FromStr for VolumeDescription {
  type Err = DescriptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(serde_json::from_str(s)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use test_case::test_case;

  fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(y, mo, d, h, mi, s)
      .single()
      .expect("valid timestamp")
  }

  #[test_case("x" ; "single character")]
  #[test_case("pvc-5c3a0b6e-7f3c-4a7e-9f0e-3f7c1a2b4d5e" ; "pvc name")]
  #[test_case("with \"quotes\" and \\ slashes" ; "escaped characters")]
  #[test_case("ünïcødé 卷" ; "unicode")]
  #[test_case("" ; "empty")]
  fn round_trip(name: &str) {
    let created = at(2019, 3, 14, 15, 9, 26) + Duration::nanoseconds(535_897_932);
    let description = VolumeDescription::with_created(name, created);

    let parsed: VolumeDescription = description
      .to_string()
      .parse()
      .expect("description parses");

    assert_eq!(parsed, description);
  }

  #[test]
  fn wire_format() {
    let created = at(2018, 8, 7, 10, 0, 0);
    let description = VolumeDescription::with_created("kubernetes-volume", created);

    assert_eq!(
      description.to_string(),
      r#"{"Name":"kubernetes-volume","Created":"2018-08-07T10:00:00Z"}"#
    );
  }

  #[test]
  fn parses_foreign_offsets() {
    let parsed: VolumeDescription =
      r#"{"Name":"pvc-1","Created":"2018-08-07T05:00:00.123456-05:00"}"#
        .parse()
        .expect("description parses");

    assert_eq!(parsed.name(), "pvc-1");
    assert_eq!(
      parsed.created(),
      at(2018, 8, 7, 10, 0, 0) + Duration::microseconds(123_456)
    );
  }

  #[test_case("" ; "empty")]
  #[test_case("created by hand" ; "free text")]
  #[test_case(r#"{"Name":"pvc-1"}"# ; "missing created")]
  fn rejects_foreign_descriptions(description: &str) {
    description
      .parse::<VolumeDescription>()
      .expect_err("foreign description should not parse");
  }
}
