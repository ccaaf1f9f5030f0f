use crate::utils::{path_to_wire, record_response, Record, BAD_STAGING_PATH, BAD_TARGET_PATH};
use crate::{
  proto, ClientOptions, ControllerCapabilities, ControllerPublishVolumeRequest,
  ControllerPublishVolumeResponse, ControllerRpc, ControllerUnpublishVolumeRequest, CsiError,
  IdentityRpc, NodeCapabilities, NodeInfo, NodePublishVolumeRequest, NodeRpc, PluginCapabilities,
  Result, VolumeCapability,
};
use std::{collections::HashMap, convert::TryFrom, fmt, future::Future, path::Path};
use tokio_util::sync::CancellationToken;
use tonic::{transport::Channel, Status};
use tracing::{debug, instrument, warn};

const PLUGIN_PROBE: &str = "PluginProbe";
const PLUGIN_GET_INFO: &str = "PluginGetInfo";
const PLUGIN_GET_CAPABILITIES: &str = "PluginGetCapabilities";
const CONTROLLER_GET_CAPABILITIES: &str = "ControllerGetCapabilities";
const CONTROLLER_PUBLISH_VOLUME: &str = "ControllerPublishVolume";
const CONTROLLER_UNPUBLISH_VOLUME: &str = "ControllerUnpublishVolume";
const NODE_GET_CAPABILITIES: &str = "NodeGetCapabilities";
const NODE_GET_INFO: &str = "NodeGetInfo";
const NODE_STAGE_VOLUME: &str = "NodeStageVolume";
const NODE_UNSTAGE_VOLUME: &str = "NodeUnstageVolume";
const NODE_PUBLISH_VOLUME: &str = "NodePublishVolume";
const NODE_UNPUBLISH_VOLUME: &str = "NodeUnpublishVolume";

/// Client for a single plugin.
///
/// Every method performs exactly one remote call and returns either a
/// normalized result or a [`CsiError`]. Nothing is retried. The client
/// keeps no state besides the service handles, so it can be shared
/// between tasks (for instance behind an `Arc`) and called concurrently.
///
/// Each method takes a [`CancellationToken`]. Cancelling it aborts the
/// in-flight call and the method returns [`CsiError::Cancelled`].
///
/// Paths are sent to the plugin as they are. A path that is not valid
/// UTF-8 fails with [`CsiError::InvalidRequest`] and no call is made.
pub struct CsiClient {
  identity: Box<dyn IdentityRpc>,
  controller: Box<dyn ControllerRpc>,
  node: Box<dyn NodeRpc>,
  options: ClientOptions,
}

impl CsiClient {
  pub fn new(
    identity: impl IdentityRpc,
    controller: impl ControllerRpc,
    node: impl NodeRpc,
  ) -> Self {
    CsiClient::with_options(identity, controller, node, ClientOptions::default())
  }

  pub fn with_options(
    identity: impl IdentityRpc,
    controller: impl ControllerRpc,
    node: impl NodeRpc,
    options: ClientOptions,
  ) -> Self {
    CsiClient {
      identity: Box::new(identity),
      controller: Box::new(controller),
      node: Box::new(node),
      options,
    }
  }

  /// Talks to all three services over an already established channel.
  pub fn from_channel(channel: Channel, options: ClientOptions) -> Self {
    let identity = proto::identity_client::IdentityClient::new(channel.clone());
    let controller = proto::controller_client::ControllerClient::new(channel.clone());
    let node = proto::node_client::NodeClient::new(channel);

    CsiClient::with_options(identity, controller, node, options)
  }

  #[inline]
  pub fn options(&self) -> &ClientOptions {
    &self.options
  }

  /// Releases the service handles. Calls still in flight must have
  /// completed before the client is closed.
  pub fn close(self) {
    debug!("closing csi client");
  }

  async fn call<T, F>(&self, rpc: &'static str, cancel: &CancellationToken, call: F) -> Result<T>
  where
    F: Future<Output = std::result::Result<T, Status>>,
  {
    let timed = async {
      match self.options.call_timeout() {
        None => call.await.map_err(CsiError::from),
        Some(timeout) => match tokio::time::timeout(timeout, call).await {
          Ok(result) => result.map_err(CsiError::from),
          Err(_) => Err(CsiError::Timeout { rpc, timeout }),
        },
      }
    };

    let result = tokio::select! {
      biased;

      _ = cancel.cancelled() => Err(CsiError::Cancelled { rpc }),
      result = timed => result,
    };

    if let Err(err) = &result {
      debug!(rpc, error = %err, "call failed");
    }

    result
  }

  /// Whether the plugin is ready to serve its Controller and Node
  /// services. A plugin that leaves the readiness field out is read
  /// according to [`ClientOptions::missing_readiness`].
  #[instrument(name = "Identity.probe", skip(self, cancel), fields(ready))]
  pub async fn plugin_probe(&self, cancel: &CancellationToken) -> Result<bool> {
    let call = self.identity.probe(proto::ProbeRequest {});
    let response = self.call(PLUGIN_PROBE, cancel, call).await?;

    let ready = match response.ready {
      Some(ready) => ready,
      None => {
        let ready = self.options.missing_readiness().as_bool();
        warn!(ready, "plugin omitted readiness, using default");
        ready
      }
    };

    ready.record_as("ready");
    Ok(ready)
  }

  /// The name the plugin reports for itself.
  #[instrument(
    name = "Identity.get_plugin_info",
    skip(self, cancel),
    fields(name, vendor_version)
  )]
  pub async fn plugin_get_info(&self, cancel: &CancellationToken) -> Result<String> {
    let request = proto::GetPluginInfoRequest {};
    let call = self.identity.get_plugin_info(request);
    let response = self.call(PLUGIN_GET_INFO, cancel, call).await?;

    response.vendor_version.record_as("vendor_version");
    if response.name.is_empty() {
      warn!("plugin returned empty name field");
      return Err(CsiError::invalid_response(
        PLUGIN_GET_INFO,
        "plugin returned empty name field",
      ));
    }

    response.name.record_as("name");
    Ok(response.name)
  }

  #[instrument(
    name = "Identity.get_plugin_capabilities",
    skip(self, cancel),
    fields(response)
  )]
  pub async fn plugin_get_capabilities(
    &self,
    cancel: &CancellationToken,
  ) -> Result<PluginCapabilities> {
    let request = proto::GetPluginCapabilitiesRequest {};
    let call = self.identity.get_plugin_capabilities(request);
    let response = self.call(PLUGIN_GET_CAPABILITIES, cancel, call).await?;

    let capabilities = PluginCapabilities::from(&response.capabilities[..]);
    Ok(record_response(capabilities))
  }

  #[instrument(
    name = "Controller.controller_get_capabilities",
    skip(self, cancel),
    fields(response)
  )]
  pub async fn controller_get_capabilities(
    &self,
    cancel: &CancellationToken,
  ) -> Result<ControllerCapabilities> {
    let request = proto::ControllerGetCapabilitiesRequest {};
    let call = self.controller.controller_get_capabilities(request);
    let response = self.call(CONTROLLER_GET_CAPABILITIES, cancel, call).await?;

    let capabilities = ControllerCapabilities::from(&response.capabilities[..]);
    Ok(record_response(capabilities))
  }

  /// Makes the volume available on the node named in `request`. The
  /// returned publish context is empty, never missing, when the plugin
  /// sent none.
  #[instrument(
    name = "Controller.controller_publish_volume",
    skip(self, cancel),
    fields(response)
  )]
  pub async fn controller_publish_volume(
    &self,
    cancel: &CancellationToken,
    request: &ControllerPublishVolumeRequest,
  ) -> Result<ControllerPublishVolumeResponse> {
    let call = self.controller.controller_publish_volume(request.into());
    let response = self.call(CONTROLLER_PUBLISH_VOLUME, cancel, call).await?;

    let response = ControllerPublishVolumeResponse::from(response);
    Ok(record_response(response))
  }

  #[instrument(name = "Controller.controller_unpublish_volume", skip(self, cancel))]
  pub async fn controller_unpublish_volume(
    &self,
    cancel: &CancellationToken,
    request: &ControllerUnpublishVolumeRequest,
  ) -> Result<()> {
    let call = self.controller.controller_unpublish_volume(request.into());
    self.call(CONTROLLER_UNPUBLISH_VOLUME, cancel, call).await?;

    Ok(())
  }

  #[instrument(
    name = "Node.node_get_capabilities",
    skip(self, cancel),
    fields(response)
  )]
  pub async fn node_get_capabilities(
    &self,
    cancel: &CancellationToken,
  ) -> Result<NodeCapabilities> {
    let request = proto::NodeGetCapabilitiesRequest {};
    let call = self.node.node_get_capabilities(request);
    let response = self.call(NODE_GET_CAPABILITIES, cancel, call).await?;

    let capabilities = NodeCapabilities::from(&response.capabilities[..]);
    Ok(record_response(capabilities))
  }

  #[instrument(name = "Node.node_get_info", skip(self, cancel), fields(response))]
  pub async fn node_get_info(&self, cancel: &CancellationToken) -> Result<NodeInfo> {
    let call = self.node.node_get_info(proto::NodeGetInfoRequest {});
    let response = self.call(NODE_GET_INFO, cancel, call).await?;

    match NodeInfo::try_from(response) {
      Ok(info) => Ok(record_response(info)),
      Err(err) => {
        warn!(error = %err, "plugin returned invalid node info");
        Err(err)
      }
    }
  }

  /// Stages the volume at `staging_target_path` so it can later be
  /// published to one or more target paths on this node.
  #[instrument(name = "Node.node_stage_volume", skip(self, cancel))]
  pub async fn node_stage_volume(
    &self,
    cancel: &CancellationToken,
    volume_id: &str,
    publish_context: &HashMap<String, String>,
    staging_target_path: &Path,
    capability: &VolumeCapability,
  ) -> Result<()> {
    let staging_path = path_to_wire(staging_target_path, NODE_STAGE_VOLUME, BAD_STAGING_PATH)?;
    let request = proto::NodeStageVolumeRequest {
      volume_id: volume_id.into(),
      publish_context: publish_context.clone(),
      staging_target_path: staging_path,
      volume_capability: Some(capability.into()),
      secrets: HashMap::new(),
      volume_context: HashMap::new(),
    };

    let call = self.node.node_stage_volume(request);
    self.call(NODE_STAGE_VOLUME, cancel, call).await?;

    Ok(())
  }

  #[instrument(name = "Node.node_unstage_volume", skip(self, cancel))]
  pub async fn node_unstage_volume(
    &self,
    cancel: &CancellationToken,
    volume_id: &str,
    staging_target_path: &Path,
  ) -> Result<()> {
    let staging_path = path_to_wire(staging_target_path, NODE_UNSTAGE_VOLUME, BAD_STAGING_PATH)?;
    let request = proto::NodeUnstageVolumeRequest {
      volume_id: volume_id.into(),
      staging_target_path: staging_path,
    };

    let call = self.node.node_unstage_volume(request);
    self.call(NODE_UNSTAGE_VOLUME, cancel, call).await?;

    Ok(())
  }

  #[instrument(name = "Node.node_publish_volume", skip(self, cancel))]
  pub async fn node_publish_volume(
    &self,
    cancel: &CancellationToken,
    request: &NodePublishVolumeRequest,
  ) -> Result<()> {
    let request = proto::NodePublishVolumeRequest::try_from(request)?;
    let call = self.node.node_publish_volume(request);
    self.call(NODE_PUBLISH_VOLUME, cancel, call).await?;

    Ok(())
  }

  #[instrument(name = "Node.node_unpublish_volume", skip(self, cancel))]
  pub async fn node_unpublish_volume(
    &self,
    cancel: &CancellationToken,
    volume_id: &str,
    target_path: &Path,
  ) -> Result<()> {
    let target_path = path_to_wire(target_path, NODE_UNPUBLISH_VOLUME, BAD_TARGET_PATH)?;
    let request = proto::NodeUnpublishVolumeRequest {
      volume_id: volume_id.into(),
      target_path,
    };

    let call = self.node.node_unpublish_volume(request);
    self.call(NODE_UNPUBLISH_VOLUME, cancel, call).await?;

    Ok(())
  }
}

impl fmt::Debug for CsiClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CsiClient")
      .field("options", &self.options)
      .finish()
  }
}
