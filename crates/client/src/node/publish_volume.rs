use crate::utils::{path_to_wire, BAD_STAGING_PATH, BAD_TARGET_PATH};
use crate::{proto, CsiError, Secrets, VolumeCapability};
use std::{collections::HashMap, convert::TryFrom, path::PathBuf};

const RPC: &str = "NodePublishVolume";

/// Arguments of `NodePublishVolume`, built by the orchestrator and
/// forwarded to the plugin as they are. Both paths must be valid UTF-8.
#[derive(Debug, Clone, Default)]
pub struct NodePublishVolumeRequest {
  /// The ID of the volume to publish. The plugin rejects the call when
  /// it is empty.
  pub volume_id: String,

  /// Set this to the publish context returned by
  /// `ControllerPublishVolume` when the controller advertises
  /// `PUBLISH_UNPUBLISH_VOLUME`. Leave it empty otherwise.
  pub publish_context: HashMap<String, String>,

  /// The path the volume was staged at by `NodeStageVolume`. It must be
  /// absolute in the root filesystem of the plugin process, and it must
  /// be set when the node advertises `STAGE_UNSTAGE_VOLUME`.
  pub staging_target_path: Option<PathBuf>,

  /// The path the volume is published to. It must be absolute in the
  /// root filesystem of the plugin process and unique per volume. The
  /// parent directory has to exist and be readable and writable by the
  /// plugin. Creating the path itself is up to the plugin, which places
  /// either the block device or the mounted directory there.
  pub target_path: PathBuf,

  /// How the volume will be used on this node. The plugin fails the call
  /// if it cannot provide the volume as described.
  pub volume_capability: Option<VolumeCapability>,

  /// Publish the volume read only.
  pub readonly: bool,

  /// Secrets the plugin needs to publish the volume, if any.
  pub secrets: Secrets,

  /// The volume context the plugin returned when the volume was created.
  /// It must match the context of the volume named by `volume_id`.
  pub volume_context: HashMap<String, String>,
}

impl TryFrom<&NodePublishVolumeRequest> for proto::NodePublishVolumeRequest {
  type Error = CsiError;

  fn try_from(value: &NodePublishVolumeRequest) -> Result<Self, Self::Error> {
    let staging_target_path = match &value.staging_target_path {
      Some(path) => path_to_wire(path, RPC, BAD_STAGING_PATH)?,
      None => String::new(),
    };
    let target_path = path_to_wire(&value.target_path, RPC, BAD_TARGET_PATH)?;

    Ok(proto::NodePublishVolumeRequest {
      volume_id: value.volume_id.clone(),
      publish_context: value.publish_context.clone(),
      staging_target_path,
      target_path,
      volume_capability: value.volume_capability.as_ref().map(Into::into),
      readonly: value.readonly,
      secrets: value.secrets.clone().into(),
      volume_context: value.volume_context.clone(),
    })
  }
}
