//! Client for plugins implementing the Container Storage Interface.
//!
//! [`CsiClient`] wraps the Identity, Controller and Node services of a
//! plugin. Each method performs exactly one remote call and normalizes
//! the response into the domain types exported from this crate.

pub mod capabilities;
pub mod controller;
pub mod node;
pub mod proto;
pub mod rpc;
pub mod volume;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

mod client;
mod error;
mod options;
mod secrets;
mod utils;

pub use capabilities::{ControllerCapabilities, NodeCapabilities, PluginCapabilities};
pub use client::CsiClient;
pub use controller::{
  ControllerPublishVolumeRequest, ControllerPublishVolumeResponse,
  ControllerUnpublishVolumeRequest,
};
pub use error::{CsiError, Result};
pub use node::{NodeInfo, NodePublishVolumeRequest};
pub use options::{ClientOptions, MissingReadiness};
pub use rpc::{ControllerRpc, IdentityRpc, NodeRpc};
pub use secrets::Secrets;
pub use volume::{AccessMode, AccessType, MountVolume, Topology, VolumeCapability};
