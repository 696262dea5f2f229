use bitflags::bitflags;

#[rustfmt::skip]
bitflags! {
  /// Controller RPCs a plugin advertises to the orchestrator.
  pub struct ControllerCapabilities: u32 {
    const CREATE_DELETE_VOLUME     = 0b_0000_0001;
    const PUBLISH_UNPUBLISH_VOLUME = 0b_0000_0010;
    const LIST_VOLUMES             = 0b_0000_0100;
    const GET_CAPACITY             = 0b_0000_1000;

    /// Indicates the SP supports ControllerPublishVolume.readonly
    /// field.
    const PUBLISH_READONLY         = 0b_0001_0000;
  }
}
