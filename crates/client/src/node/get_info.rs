use crate::{proto, CsiError, Topology};
use std::{convert::TryFrom, num::NonZeroU64};

const RPC: &str = "NodeGetInfo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
  node_id: String,
  max_volumes: Option<NonZeroU64>,
  accessible_topology: Option<Topology>,
}

impl NodeInfo {
  /// The identifier of the node as understood by the plugin. Passed as
  /// `node_id` to `ControllerPublishVolume`.
  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }

  /// Maximum number of volumes the plugin can publish on this node.
  /// `None` means the plugin reported no limit.
  #[inline]
  pub fn max_volumes(&self) -> Option<NonZeroU64> {
    self.max_volumes
  }

  /// The topology segments this node can reach volumes in, if the
  /// plugin reports accessibility constraints.
  #[inline]
  pub fn accessible_topology(&self) -> Option<&Topology> {
    self.accessible_topology.as_ref()
  }
}

impl TryFrom<proto::NodeGetInfoResponse> for NodeInfo {
  type Error = CsiError;

  fn try_from(value: proto::NodeGetInfoResponse) -> Result<Self, Self::Error> {
    let node_id = match value.node_id {
      v if v.is_empty() => {
        return Err(CsiError::invalid_response(
          RPC,
          "plugin returned empty node_id field",
        ))
      }
      v => v,
    };

    let max_volumes = match value.max_volumes_per_node {
      v if v < 0 => {
        return Err(CsiError::invalid_response(
          RPC,
          "plugin returned negative max_volumes_per_node",
        ))
      }
      v => NonZeroU64::new(v as u64),
    };

    let accessible_topology = value
      .accessible_topology
      .map(|t| t.segments)
      .filter(|segments| !segments.is_empty());

    Ok(NodeInfo {
      node_id,
      max_volumes,
      accessible_topology,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(node_id: &str, max: i64) -> proto::NodeGetInfoResponse {
    proto::NodeGetInfoResponse {
      node_id: node_id.into(),
      max_volumes_per_node: max,
      accessible_topology: None,
    }
  }

  #[test]
  fn zero_max_volumes_is_unlimited() {
    let info = NodeInfo::try_from(response("node-a", 0)).unwrap();
    assert_eq!(info.node_id(), "node-a");
    assert_eq!(info.max_volumes(), None);
    assert_eq!(info.accessible_topology(), None);
  }

  #[test]
  fn keeps_max_volumes_and_topology() {
    let mut wire = response("node-a", 16);
    wire.accessible_topology = Some(proto::Topology {
      segments: vec![("zone".to_string(), "eu-1".to_string())]
        .into_iter()
        .collect(),
    });

    let info = NodeInfo::try_from(wire).unwrap();
    assert_eq!(info.max_volumes(), NonZeroU64::new(16));
    assert_eq!(
      info
        .accessible_topology()
        .and_then(|t| t.get("zone"))
        .map(String::as_str),
      Some("eu-1")
    );
  }

  #[test]
  fn rejects_empty_node_id() {
    let err = NodeInfo::try_from(response("", 1)).unwrap_err();
    assert!(err.is_invalid_response());
    assert_eq!(
      err.to_string(),
      "NodeGetInfo: plugin returned empty node_id field"
    );
  }

  #[test]
  fn rejects_negative_max_volumes() {
    let err = NodeInfo::try_from(response("node-a", -1)).unwrap_err();
    assert!(err.is_invalid_response());
  }
}
