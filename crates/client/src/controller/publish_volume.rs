use crate::{proto, Secrets, VolumeCapability};
use std::collections::HashMap;

/// Arguments of `ControllerPublishVolume`, built by the orchestrator and
/// forwarded to the plugin as they are. Only meaningful when the
/// controller advertises `PUBLISH_UNPUBLISH_VOLUME`.
#[derive(Debug, Clone, Default)]
pub struct ControllerPublishVolumeRequest {
  /// The ID of the volume to make available on a node. The plugin
  /// rejects the call when it is empty.
  pub volume_id: String,

  /// The ID of the node the volume is published to, as returned by
  /// `NodeGetInfo` on that node.
  pub node_id: String,

  /// How the orchestrator intends to use the volume. The plugin fails
  /// the call if it cannot publish the volume as described.
  pub volume_capability: Option<VolumeCapability>,

  /// Publish the volume read only. Only valid when the controller
  /// advertises `PUBLISH_READONLY`.
  pub readonly: bool,

  /// Secrets the plugin needs to publish the volume, if any. They never
  /// appear in `Debug` output.
  pub secrets: Secrets,

  /// The volume context the plugin returned when the volume was created.
  pub volume_context: HashMap<String, String>,
}

impl From<&ControllerPublishVolumeRequest> for proto::ControllerPublishVolumeRequest {
  fn from(value: &ControllerPublishVolumeRequest) -> Self {
    proto::ControllerPublishVolumeRequest {
      volume_id: value.volume_id.clone(),
      node_id: value.node_id.clone(),
      volume_capability: value.volume_capability.as_ref().map(Into::into),
      readonly: value.readonly,
      secrets: value.secrets.clone().into(),
      volume_context: value.volume_context.clone(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerPublishVolumeResponse {
  publish_context: HashMap<String, String>,
}

impl ControllerPublishVolumeResponse {
  /// Opaque static publish properties of the volume. Always present;
  /// empty when the plugin sent none. MUST be passed to subsequent
  /// `NodeStageVolume` or `NodePublishVolume` calls.
  #[inline]
  pub fn publish_context(&self) -> &HashMap<String, String> {
    &self.publish_context
  }

  #[inline]
  pub fn into_publish_context(self) -> HashMap<String, String> {
    self.publish_context
  }
}

impl From<HashMap<String, String>> for ControllerPublishVolumeResponse {
  #[inline]
  fn from(publish_context: HashMap<String, String>) -> Self {
    ControllerPublishVolumeResponse { publish_context }
  }
}

impl From<proto::ControllerPublishVolumeResponse> for ControllerPublishVolumeResponse {
  #[inline]
  fn from(value: proto::ControllerPublishVolumeResponse) -> Self {
    value.publish_context.into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::AccessMode;

  #[test]
  fn request_to_proto() {
    let request = ControllerPublishVolumeRequest {
      volume_id: "vol-1".into(),
      node_id: "node-1".into(),
      volume_capability: Some(VolumeCapability::block(AccessMode::SingleNodeWriter)),
      readonly: true,
      secrets: vec![("token", "abc")].into_iter().collect(),
      volume_context: vec![("pool".to_string(), "fast".to_string())]
        .into_iter()
        .collect(),
    };

    let wire = proto::ControllerPublishVolumeRequest::from(&request);
    assert_eq!(wire.volume_id, "vol-1");
    assert_eq!(wire.node_id, "node-1");
    assert!(wire.readonly);
    assert!(wire.volume_capability.is_some());
    assert_eq!(wire.secrets.get("token").map(String::as_str), Some("abc"));
    assert_eq!(
      wire.volume_context.get("pool").map(String::as_str),
      Some("fast")
    );
  }

  #[test]
  fn empty_request_to_proto() {
    let request = ControllerPublishVolumeRequest::default();
    let wire = proto::ControllerPublishVolumeRequest::from(&request);
    assert!(wire.volume_capability.is_none());
    assert!(wire.secrets.is_empty());
  }
}
