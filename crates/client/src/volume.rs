use std::{collections::HashMap, fmt};

use crate::proto;

pub type Topology = HashMap<String, String>;

/// How the orchestrator intends to use a volume. Owned by the caller and
/// only borrowed for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCapability {
  access_mode: AccessMode,
  access_type: AccessType,
}

impl VolumeCapability {
  #[inline]
  pub fn new(access_mode: AccessMode, access_type: AccessType) -> Self {
    VolumeCapability {
      access_mode,
      access_type,
    }
  }

  /// Access through the block device API.
  #[inline]
  pub fn block(access_mode: AccessMode) -> Self {
    VolumeCapability::new(access_mode, AccessType::Block)
  }

  /// Access through a mounted filesystem.
  #[inline]
  pub fn mount(access_mode: AccessMode, mount: MountVolume) -> Self {
    VolumeCapability::new(access_mode, AccessType::Mount(mount))
  }

  #[inline]
  pub fn access_mode(&self) -> AccessMode {
    self.access_mode
  }

  #[inline]
  pub fn access_type(&self) -> &AccessType {
    &self.access_type
  }
}

impl From<&VolumeCapability> for proto::VolumeCapability {
  fn from(value: &VolumeCapability) -> Self {
    let access_mode = Some(value.access_mode.into());
    let access_type = Some((&value.access_type).into());

    proto::VolumeCapability {
      access_mode,
      access_type,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AccessMode {
  Unknown,
  /// Can only be published once as read/write on a single node, at
  /// any given time.
  SingleNodeWriter,
  /// Can only be published once as readonly on a single node, at
  /// any given time.
  SingleNodeReaderOnly,
  /// Can be published as readonly at multiple nodes simultaneously.
  MultiNodeReaderOnly,
  /// Can be published at multiple nodes simultaneously. Only one of
  /// the node can be used as read/write. The rest will be readonly.
  MultiNodeSingleWriter,
  /// Can be published as read/write at multiple nodes
  /// simultaneously.
  MultiNodeMultiWriter,
  /// Can only be published once as read/write at a single workload
  /// on a single node. Requires SINGLE_NODE_MULTI_WRITER.
  SingleNodeSingleWriter,
  /// Can be published as read/write at multiple workloads on a single
  /// node. Requires SINGLE_NODE_MULTI_WRITER.
  SingleNodeMultiWriter,
}

impl From<AccessMode> for proto::volume_capability::AccessMode {
  fn from(value: AccessMode) -> Self {
    use proto::volume_capability::access_mode::Mode;

    let mode = match value {
      AccessMode::Unknown => Mode::Unknown,
      AccessMode::SingleNodeWriter => Mode::SingleNodeWriter,
      AccessMode::SingleNodeReaderOnly => Mode::SingleNodeReaderOnly,
      AccessMode::MultiNodeReaderOnly => Mode::MultiNodeReaderOnly,
      AccessMode::MultiNodeSingleWriter => Mode::MultiNodeSingleWriter,
      AccessMode::MultiNodeMultiWriter => Mode::MultiNodeMultiWriter,
      AccessMode::SingleNodeSingleWriter => Mode::SingleNodeSingleWriter,
      AccessMode::SingleNodeMultiWriter => Mode::SingleNodeMultiWriter,
    } as i32;

    proto::volume_capability::AccessMode { mode }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessType {
  /// Indicate that the volume will be accessed via the block device API.
  Block,

  /// Indicate that the volume will be accessed via the filesystem API.
  Mount(MountVolume),
}

impl From<&AccessType> for proto::volume_capability::AccessType {
  fn from(value: &AccessType) -> Self {
    match value {
      AccessType::Block => {
        proto::volume_capability::AccessType::Block(proto::volume_capability::BlockVolume {})
      }
      AccessType::Mount(v) => proto::volume_capability::AccessType::Mount(v.into()),
    }
  }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct MountVolume {
  fs_type: Option<String>,
  mount_flags: Vec<String>,
}

impl MountVolume {
  pub fn new<I>(fs_type: Option<String>, mount_flags: I) -> Self
  where
    I: IntoIterator,
    I::Item: Into<String>,
  {
    MountVolume {
      fs_type: fs_type.filter(|v| !v.is_empty()),
      mount_flags: mount_flags.into_iter().map(Into::into).collect(),
    }
  }

  /// The filesystem type. `None` lets the plugin pick its default.
  #[inline]
  pub fn fs_type(&self) -> Option<&str> {
    self.fs_type.as_deref()
  }

  /// The mount options that can be used for the volume. `mount_flags`
  /// MAY contain sensitive information and are never logged.
  pub fn mount_flags(&self) -> impl Iterator<Item = &str> + ExactSizeIterator {
    self.mount_flags.iter().map(|v| &**v)
  }
}

impl From<&MountVolume> for proto::volume_capability::MountVolume {
  fn from(value: &MountVolume) -> Self {
    let fs_type = value.fs_type.clone().unwrap_or_default();
    let mount_flags = value.mount_flags.clone();

    proto::volume_capability::MountVolume {
      fs_type,
      mount_flags,
      volume_mount_group: String::new(),
    }
  }
}

impl fmt::Debug for MountVolume {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MountVolume")
      .field("fs_type", &self.fs_type)
      .field(
        "mount_flags",
        &format!("REDACTED ({} items)", self.mount_flags.len()),
      )
      .finish()
  }
}
