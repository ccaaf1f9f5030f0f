use crate::{proto, Secrets};

/// Arguments of `ControllerUnpublishVolume`. Undoes a previous
/// `ControllerPublishVolume` once the node no longer uses the volume.
#[derive(Debug, Clone, Default)]
pub struct ControllerUnpublishVolumeRequest {
  /// The ID of the volume to take away from the node. The plugin rejects
  /// the call when it is empty.
  pub volume_id: String,

  /// The ID of the node. When empty the plugin MUST unpublish the volume
  /// from all nodes it is published to.
  pub node_id: String,

  /// SHOULD be the same secrets passed to the matching
  /// `ControllerPublishVolume` call.
  pub secrets: Secrets,
}

impl From<&ControllerUnpublishVolumeRequest> for proto::ControllerUnpublishVolumeRequest {
  fn from(value: &ControllerUnpublishVolumeRequest) -> Self {
    proto::ControllerUnpublishVolumeRequest {
      volume_id: value.volume_id.clone(),
      node_id: value.node_id.clone(),
      secrets: value.secrets.clone().into(),
    }
  }
}
