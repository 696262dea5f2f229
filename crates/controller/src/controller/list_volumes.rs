use crate::volume::Volume;

#[derive(Debug, Default)]
pub struct ListVolumesResponse {
  entries: Vec<Volume>,
}

impl ListVolumesResponse {
  pub fn new(entries: Vec<Volume>) -> Self {
    ListVolumesResponse { entries }
  }

  /// Every volume the remote service reports. Empty when there are none.
  #[inline]
  pub fn entries(&self) -> &[Volume] {
    &self.entries
  }

  #[inline]
  pub fn into_entries(self) -> Vec<Volume> {
    self.entries
  }
}
