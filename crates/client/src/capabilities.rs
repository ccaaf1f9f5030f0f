//! Capability sets derived from the capability discovery RPCs.
//!
//! Plugins advertise features as a repeated list of descriptors. The
//! list is unordered, may contain duplicates, and may carry values this
//! client does not know about. Each set below folds such a list into
//! flags with a single pass. Unrecognized descriptors are skipped, so a
//! plugin built against a newer protocol never causes an error here.

use std::iter::FromIterator;

use bitflags::bitflags;

use crate::proto;

#[rustfmt::skip]
bitflags! {
  pub struct PluginCapabilities: u32 {
    /// The plugin provides the Controller service.
    const CONTROLLER_SERVICE               = 0b_0000_0001;

    /// Volumes may not be equally accessible by all nodes in the
    /// cluster, and the plugin reports topology constraints.
    const VOLUME_ACCESSIBILITY_CONSTRAINTS = 0b_0000_0010;

    /// Volumes can be expanded while published on a node.
    const VOLUME_EXPANSION_ONLINE          = 0b_0000_0100;

    /// Volumes can only be expanded while not published on any node.
    const VOLUME_EXPANSION_OFFLINE         = 0b_0000_1000;
  }
}

impl PluginCapabilities {
  #[inline]
  pub fn has_controller_service(&self) -> bool {
    self.contains(PluginCapabilities::CONTROLLER_SERVICE)
  }

  #[inline]
  pub fn has_topologies(&self) -> bool {
    self.contains(PluginCapabilities::VOLUME_ACCESSIBILITY_CONSTRAINTS)
  }
}

impl Default for PluginCapabilities {
  #[inline]
  fn default() -> Self {
    PluginCapabilities::empty()
  }
}

impl<'a> FromIterator<&'a proto::PluginCapability> for PluginCapabilities {
  fn from_iter<I: IntoIterator<Item = &'a proto::PluginCapability>>(iter: I) -> Self {
    use proto::plugin_capability::{service, volume_expansion, Type};

    let mut caps = PluginCapabilities::empty();
    for capability in iter {
      caps |= match &capability.r#type {
        Some(Type::Service(s)) => match service::Type::from_i32(s.r#type) {
          Some(service::Type::ControllerService) => PluginCapabilities::CONTROLLER_SERVICE,
          Some(service::Type::VolumeAccessibilityConstraints) => {
            PluginCapabilities::VOLUME_ACCESSIBILITY_CONSTRAINTS
          }
          _ => PluginCapabilities::empty(),
        },
        Some(Type::VolumeExpansion(e)) => match volume_expansion::Type::from_i32(e.r#type) {
          Some(volume_expansion::Type::Online) => PluginCapabilities::VOLUME_EXPANSION_ONLINE,
          Some(volume_expansion::Type::Offline) => PluginCapabilities::VOLUME_EXPANSION_OFFLINE,
          _ => PluginCapabilities::empty(),
        },
        None => PluginCapabilities::empty(),
      };
    }

    caps
  }
}

impl From<&[proto::PluginCapability]> for PluginCapabilities {
  #[inline]
  fn from(value: &[proto::PluginCapability]) -> Self {
    value.iter().collect()
  }
}

#[rustfmt::skip]
bitflags! {
  pub struct ControllerCapabilities: u32 {
    const CREATE_DELETE_VOLUME         = 0b_0000_0000_0000_0001;
    const PUBLISH_UNPUBLISH_VOLUME     = 0b_0000_0000_0000_0010;
    const LIST_VOLUMES                 = 0b_0000_0000_0000_0100;

    /// Currently the only way to consume a snapshot is to create
    /// a volume from it.
    const CREATE_DELETE_SNAPSHOT       = 0b_0000_0000_0000_1000;
    const LIST_SNAPSHOTS               = 0b_0000_0000_0001_0000;

    /// The source volume of a clone MUST be managed by the same plugin.
    const CLONE_VOLUME                 = 0b_0000_0000_0010_0000;

    /// The plugin honours ControllerPublishVolume.readonly.
    const PUBLISH_READONLY             = 0b_0000_0000_0100_0000;
    const EXPAND_VOLUME                = 0b_0000_0000_1000_0000;

    /// The plugin fills ListVolumesResponse.entry.published_nodes.
    const LIST_VOLUMES_PUBLISHED_NODES = 0b_0000_0001_0000_0000;
    const VOLUME_CONDITION             = 0b_0000_0010_0000_0000;
    const GET_VOLUME                   = 0b_0000_0100_0000_0000;

    /// The plugin supports the SINGLE_NODE_SINGLE_WRITER and
    /// SINGLE_NODE_MULTI_WRITER access modes.
    const SINGLE_NODE_MULTI_WRITER     = 0b_0000_1000_0000_0000;
  }
}

impl ControllerCapabilities {
  #[inline]
  pub fn has_list_volumes(&self) -> bool {
    self.contains(ControllerCapabilities::LIST_VOLUMES)
  }

  #[inline]
  pub fn has_list_volumes_published_nodes(&self) -> bool {
    self.contains(ControllerCapabilities::LIST_VOLUMES_PUBLISHED_NODES)
  }

  #[inline]
  pub fn has_publish_unpublish_volume(&self) -> bool {
    self.contains(ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME)
  }

  #[inline]
  pub fn has_publish_readonly(&self) -> bool {
    self.contains(ControllerCapabilities::PUBLISH_READONLY)
  }
}

impl Default for ControllerCapabilities {
  #[inline]
  fn default() -> Self {
    ControllerCapabilities::empty()
  }
}

impl<'a> FromIterator<&'a proto::ControllerServiceCapability> for ControllerCapabilities {
  fn from_iter<I: IntoIterator<Item = &'a proto::ControllerServiceCapability>>(iter: I) -> Self {
    use proto::controller_service_capability::{rpc::Type as Rpc, Type};

    let mut caps = ControllerCapabilities::empty();
    for capability in iter {
      let rpc = match &capability.r#type {
        Some(Type::Rpc(rpc)) => Rpc::from_i32(rpc.r#type),
        None => None,
      };

      // GET_CAPACITY is not consumed by the orchestrator and is left out.
      caps |= match rpc {
        Some(Rpc::CreateDeleteVolume) => ControllerCapabilities::CREATE_DELETE_VOLUME,
        Some(Rpc::PublishUnpublishVolume) => ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME,
        Some(Rpc::ListVolumes) => ControllerCapabilities::LIST_VOLUMES,
        Some(Rpc::CreateDeleteSnapshot) => ControllerCapabilities::CREATE_DELETE_SNAPSHOT,
        Some(Rpc::ListSnapshots) => ControllerCapabilities::LIST_SNAPSHOTS,
        Some(Rpc::CloneVolume) => ControllerCapabilities::CLONE_VOLUME,
        Some(Rpc::PublishReadonly) => ControllerCapabilities::PUBLISH_READONLY,
        Some(Rpc::ExpandVolume) => ControllerCapabilities::EXPAND_VOLUME,
        Some(Rpc::ListVolumesPublishedNodes) => {
          ControllerCapabilities::LIST_VOLUMES_PUBLISHED_NODES
        }
        Some(Rpc::VolumeCondition) => ControllerCapabilities::VOLUME_CONDITION,
        Some(Rpc::GetVolume) => ControllerCapabilities::GET_VOLUME,
        Some(Rpc::SingleNodeMultiWriter) => ControllerCapabilities::SINGLE_NODE_MULTI_WRITER,
        _ => ControllerCapabilities::empty(),
      };
    }

    caps
  }
}

impl From<&[proto::ControllerServiceCapability]> for ControllerCapabilities {
  #[inline]
  fn from(value: &[proto::ControllerServiceCapability]) -> Self {
    value.iter().collect()
  }
}

#[rustfmt::skip]
bitflags! {
  pub struct NodeCapabilities: u32 {
    const STAGE_UNSTAGE_VOLUME     = 0b_0000_0001;
    const GET_VOLUME_STATS         = 0b_0000_0010;
    const VOLUME_CONDITION         = 0b_0000_0100;
    const SINGLE_NODE_MULTI_WRITER = 0b_0000_1000;
  }
}

impl NodeCapabilities {
  #[inline]
  pub fn has_stage_unstage_volume(&self) -> bool {
    self.contains(NodeCapabilities::STAGE_UNSTAGE_VOLUME)
  }
}

impl Default for NodeCapabilities {
  #[inline]
  fn default() -> Self {
    NodeCapabilities::empty()
  }
}

impl<'a> FromIterator<&'a proto::NodeServiceCapability> for NodeCapabilities {
  fn from_iter<I: IntoIterator<Item = &'a proto::NodeServiceCapability>>(iter: I) -> Self {
    use proto::node_service_capability::{rpc::Type as Rpc, Type};

    let mut caps = NodeCapabilities::empty();
    for capability in iter {
      let rpc = match &capability.r#type {
        Some(Type::Rpc(rpc)) => Rpc::from_i32(rpc.r#type),
        None => None,
      };

      // Node side expansion is read from the plugin capabilities instead.
      caps |= match rpc {
        Some(Rpc::StageUnstageVolume) => NodeCapabilities::STAGE_UNSTAGE_VOLUME,
        Some(Rpc::GetVolumeStats) => NodeCapabilities::GET_VOLUME_STATS,
        Some(Rpc::VolumeCondition) => NodeCapabilities::VOLUME_CONDITION,
        Some(Rpc::SingleNodeMultiWriter) => NodeCapabilities::SINGLE_NODE_MULTI_WRITER,
        _ => NodeCapabilities::empty(),
      };
    }

    caps
  }
}

impl From<&[proto::NodeServiceCapability]> for NodeCapabilities {
  #[inline]
  fn from(value: &[proto::NodeServiceCapability]) -> Self {
    value.iter().collect()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use proptest::prelude::*;
  use test_case::test_case;

  use proto::controller_service_capability::rpc::Type as ControllerRpc;
  use proto::node_service_capability::rpc::Type as NodeRpc;
  use proto::plugin_capability::service::Type as PluginService;
  use proto::plugin_capability::volume_expansion::Type as Expansion;

  pub(crate) fn plugin_service(t: PluginService) -> proto::PluginCapability {
    plugin_service_raw(t as i32)
  }

  fn plugin_service_raw(t: i32) -> proto::PluginCapability {
    proto::PluginCapability {
      r#type: Some(proto::plugin_capability::Type::Service(
        proto::plugin_capability::Service { r#type: t },
      )),
    }
  }

  fn plugin_expansion(t: Expansion) -> proto::PluginCapability {
    proto::PluginCapability {
      r#type: Some(proto::plugin_capability::Type::VolumeExpansion(
        proto::plugin_capability::VolumeExpansion { r#type: t as i32 },
      )),
    }
  }

  pub(crate) fn controller_rpc(t: i32) -> proto::ControllerServiceCapability {
    proto::ControllerServiceCapability {
      r#type: Some(proto::controller_service_capability::Type::Rpc(
        proto::controller_service_capability::Rpc { r#type: t },
      )),
    }
  }

  pub(crate) fn node_rpc(t: i32) -> proto::NodeServiceCapability {
    proto::NodeServiceCapability {
      r#type: Some(proto::node_service_capability::Type::Rpc(
        proto::node_service_capability::Rpc { r#type: t },
      )),
    }
  }

  #[test]
  fn empty_lists_yield_empty_sets() {
    let plugin: &[proto::PluginCapability] = &[];
    let controller: &[proto::ControllerServiceCapability] = &[];
    let node: &[proto::NodeServiceCapability] = &[];

    assert_eq!(
      PluginCapabilities::from(plugin),
      PluginCapabilities::default()
    );
    assert_eq!(
      ControllerCapabilities::from(controller),
      ControllerCapabilities::default()
    );
    assert_eq!(NodeCapabilities::from(node), NodeCapabilities::default());
    assert!(NodeCapabilities::default().is_empty());
  }

  #[test]
  fn plugin_service_and_topologies() {
    let caps: PluginCapabilities = [
      plugin_service(PluginService::ControllerService),
      plugin_service(PluginService::VolumeAccessibilityConstraints),
    ]
    .iter()
    .collect();

    assert!(caps.has_controller_service());
    assert!(caps.has_topologies());
    assert_eq!(
      caps,
      PluginCapabilities::CONTROLLER_SERVICE | PluginCapabilities::VOLUME_ACCESSIBILITY_CONSTRAINTS
    );
  }

  #[test]
  fn plugin_volume_expansion() {
    let caps: PluginCapabilities = [plugin_expansion(Expansion::Online)].iter().collect();
    assert_eq!(caps, PluginCapabilities::VOLUME_EXPANSION_ONLINE);
    assert!(!caps.has_controller_service());
  }

  #[test]
  fn plugin_ignores_missing_and_unknown_types() {
    let caps: PluginCapabilities = [
      proto::PluginCapability { r#type: None },
      plugin_service(PluginService::Unknown),
      plugin_service_raw(42),
    ]
    .iter()
    .collect();

    assert!(caps.is_empty());
  }

  #[test_case(&[ControllerRpc::ListVolumes as i32, ControllerRpc::ListVolumesPublishedNodes as i32]
    => ControllerCapabilities::LIST_VOLUMES | ControllerCapabilities::LIST_VOLUMES_PUBLISHED_NODES
    ; "list volumes")]
  #[test_case(&[ControllerRpc::PublishReadonly as i32, ControllerRpc::PublishUnpublishVolume as i32]
    => ControllerCapabilities::PUBLISH_READONLY | ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME
    ; "publish")]
  #[test_case(&[ControllerRpc::GetCapacity as i32]
    => ControllerCapabilities::empty()
    ; "get capacity is ignored")]
  #[test_case(&[ControllerRpc::Unknown as i32, 99]
    => ControllerCapabilities::empty()
    ; "unknown values are ignored")]
  #[test_case(&[ControllerRpc::CloneVolume as i32, ControllerRpc::CloneVolume as i32]
    => ControllerCapabilities::CLONE_VOLUME
    ; "duplicates are harmless")]
  fn controller_capabilities(types: &[i32]) -> ControllerCapabilities {
    controller_caps(types)
  }

  fn controller_caps(types: &[i32]) -> ControllerCapabilities {
    let descriptors: Vec<_> = types.iter().map(|t| controller_rpc(*t)).collect();
    descriptors.iter().collect()
  }

  #[test]
  fn controller_flags_match_helpers() {
    let caps: ControllerCapabilities = [
      controller_rpc(ControllerRpc::ListVolumes as i32),
      controller_rpc(ControllerRpc::ListVolumesPublishedNodes as i32),
    ]
    .iter()
    .collect();

    assert!(caps.has_list_volumes());
    assert!(caps.has_list_volumes_published_nodes());
    assert!(!caps.has_publish_unpublish_volume());
    assert!(!caps.has_publish_readonly());
  }

  #[test_case(&[NodeRpc::StageUnstageVolume as i32]
    => NodeCapabilities::STAGE_UNSTAGE_VOLUME
    ; "stage unstage")]
  #[test_case(&[NodeRpc::ExpandVolume as i32]
    => NodeCapabilities::empty()
    ; "expand volume is ignored")]
  #[test_case(&[NodeRpc::VolumeMountGroup as i32, 1234]
    => NodeCapabilities::empty()
    ; "unknown values are ignored")]
  #[test_case(&[NodeRpc::GetVolumeStats as i32, NodeRpc::VolumeCondition as i32]
    => NodeCapabilities::GET_VOLUME_STATS | NodeCapabilities::VOLUME_CONDITION
    ; "stats and condition")]
  fn node_capabilities(types: &[i32]) -> NodeCapabilities {
    node_caps(types)
  }

  fn node_caps(types: &[i32]) -> NodeCapabilities {
    let descriptors: Vec<_> = types.iter().map(|t| node_rpc(*t)).collect();
    descriptors.iter().collect()
  }

  #[test]
  fn node_rpc_missing_type_is_ignored() {
    let caps: NodeCapabilities = [proto::NodeServiceCapability { r#type: None }]
      .iter()
      .collect();
    assert_eq!(caps, NodeCapabilities::empty());
  }

  /// Any known or unknown plugin descriptor, picked by index.
  fn plugin_descriptor(index: u8) -> proto::PluginCapability {
    match index % 6 {
      0 => plugin_service(PluginService::ControllerService),
      1 => plugin_service(PluginService::VolumeAccessibilityConstraints),
      2 => plugin_expansion(Expansion::Online),
      3 => plugin_expansion(Expansion::Offline),
      4 => proto::PluginCapability { r#type: None },
      _ => plugin_service_raw(i32::from(index) + 3),
    }
  }

  proptest! {
    #[test]
    fn plugin_derivation_ignores_order_and_duplicates(
      indices in proptest::collection::vec(any::<u8>(), 0..24),
      rotate in 0usize..24,
      repeats in 1usize..4,
    ) {
      let descriptors: Vec<_> = indices.iter().map(|i| plugin_descriptor(*i)).collect();
      let expected: PluginCapabilities = descriptors.iter().collect();

      let mut permuted = descriptors.clone();
      permuted.reverse();
      if !permuted.is_empty() {
        let n = rotate % permuted.len();
        permuted.rotate_left(n);
      }
      let mut repeated = Vec::new();
      for _ in 0..repeats {
        repeated.extend(permuted.iter().cloned());
      }

      prop_assert_eq!(expected, repeated.iter().collect::<PluginCapabilities>());
    }

    #[test]
    fn controller_derivation_ignores_order_and_duplicates(
      mut types in proptest::collection::vec(-2i32..20, 0..32),
      repeats in 1usize..4,
    ) {
      let forward = controller_caps(&types);

      types.reverse();
      let mut repeated = Vec::new();
      for _ in 0..repeats {
        repeated.extend(types.iter().copied());
      }

      prop_assert_eq!(forward, controller_caps(&repeated));
    }

    #[test]
    fn node_derivation_ignores_order_and_duplicates(
      types in proptest::collection::vec(-2i32..10, 0..16),
      rotate in 0usize..16,
    ) {
      let expected = node_caps(&types);

      let mut shuffled = types.clone();
      if !shuffled.is_empty() {
        let n = rotate % shuffled.len();
        shuffled.rotate_left(n);
      }
      shuffled.extend(types.iter().copied());

      prop_assert_eq!(expected, node_caps(&shuffled));
    }

    #[test]
    fn plugin_unknown_values_never_set_flags(value in 3i32..1000) {
      let caps: PluginCapabilities = [plugin_service_raw(value)].iter().collect();
      prop_assert!(caps.is_empty());
    }
  }
}
