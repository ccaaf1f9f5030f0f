//! Raw handles to the three services of a plugin.
//!
//! The traits mirror the protocol RPCs one to one and speak wire types.
//! [`CsiClient`](crate::CsiClient) is written against these traits so
//! each service can be swapped for a test double on its own. Connections
//! are set up elsewhere; the implementations here only wrap a ready
//! [`Channel`].

use crate::proto::{
  self, controller_client::ControllerClient, identity_client::IdentityClient,
  node_client::NodeClient,
};
use async_trait::async_trait;
use tonic::{transport::Channel, Response, Status};

#[async_trait]
pub trait IdentityRpc: Send + Sync + 'static {
  async fn get_plugin_info(
    &self,
    request: proto::GetPluginInfoRequest,
  ) -> Result<proto::GetPluginInfoResponse, Status>;

  async fn get_plugin_capabilities(
    &self,
    request: proto::GetPluginCapabilitiesRequest,
  ) -> Result<proto::GetPluginCapabilitiesResponse, Status>;

  async fn probe(&self, request: proto::ProbeRequest) -> Result<proto::ProbeResponse, Status>;
}

#[async_trait]
pub trait ControllerRpc: Send + Sync + 'static {
  async fn controller_publish_volume(
    &self,
    request: proto::ControllerPublishVolumeRequest,
  ) -> Result<proto::ControllerPublishVolumeResponse, Status>;

  async fn controller_unpublish_volume(
    &self,
    request: proto::ControllerUnpublishVolumeRequest,
  ) -> Result<proto::ControllerUnpublishVolumeResponse, Status>;

  async fn controller_get_capabilities(
    &self,
    request: proto::ControllerGetCapabilitiesRequest,
  ) -> Result<proto::ControllerGetCapabilitiesResponse, Status>;
}

#[async_trait]
pub trait NodeRpc: Send + Sync + 'static {
  async fn node_stage_volume(
    &self,
    request: proto::NodeStageVolumeRequest,
  ) -> Result<proto::NodeStageVolumeResponse, Status>;

  async fn node_unstage_volume(
    &self,
    request: proto::NodeUnstageVolumeRequest,
  ) -> Result<proto::NodeUnstageVolumeResponse, Status>;

  async fn node_publish_volume(
    &self,
    request: proto::NodePublishVolumeRequest,
  ) -> Result<proto::NodePublishVolumeResponse, Status>;

  async fn node_unpublish_volume(
    &self,
    request: proto::NodeUnpublishVolumeRequest,
  ) -> Result<proto::NodeUnpublishVolumeResponse, Status>;

  async fn node_get_capabilities(
    &self,
    request: proto::NodeGetCapabilitiesRequest,
  ) -> Result<proto::NodeGetCapabilitiesResponse, Status>;

  async fn node_get_info(
    &self,
    request: proto::NodeGetInfoRequest,
  ) -> Result<proto::NodeGetInfoResponse, Status>;
}

// The generated clients take `&mut self`. They are cheap to clone and
// share the underlying channel, so every call works on its own copy and
// concurrent calls never wait on each other.

#[async_trait]
impl IdentityRpc for IdentityClient<Channel> {
  async fn get_plugin_info(
    &self,
    request: proto::GetPluginInfoRequest,
  ) -> Result<proto::GetPluginInfoResponse, Status> {
    IdentityClient::get_plugin_info(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn get_plugin_capabilities(
    &self,
    request: proto::GetPluginCapabilitiesRequest,
  ) -> Result<proto::GetPluginCapabilitiesResponse, Status> {
    IdentityClient::get_plugin_capabilities(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn probe(&self, request: proto::ProbeRequest) -> Result<proto::ProbeResponse, Status> {
    IdentityClient::probe(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }
}

#[async_trait]
impl ControllerRpc for ControllerClient<Channel> {
  async fn controller_publish_volume(
    &self,
    request: proto::ControllerPublishVolumeRequest,
  ) -> Result<proto::ControllerPublishVolumeResponse, Status> {
    ControllerClient::controller_publish_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn controller_unpublish_volume(
    &self,
    request: proto::ControllerUnpublishVolumeRequest,
  ) -> Result<proto::ControllerUnpublishVolumeResponse, Status> {
    ControllerClient::controller_unpublish_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn controller_get_capabilities(
    &self,
    request: proto::ControllerGetCapabilitiesRequest,
  ) -> Result<proto::ControllerGetCapabilitiesResponse, Status> {
    ControllerClient::controller_get_capabilities(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }
}

#[async_trait]
impl NodeRpc for NodeClient<Channel> {
  async fn node_stage_volume(
    &self,
    request: proto::NodeStageVolumeRequest,
  ) -> Result<proto::NodeStageVolumeResponse, Status> {
    NodeClient::node_stage_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn node_unstage_volume(
    &self,
    request: proto::NodeUnstageVolumeRequest,
  ) -> Result<proto::NodeUnstageVolumeResponse, Status> {
    NodeClient::node_unstage_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn node_publish_volume(
    &self,
    request: proto::NodePublishVolumeRequest,
  ) -> Result<proto::NodePublishVolumeResponse, Status> {
    NodeClient::node_publish_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn node_unpublish_volume(
    &self,
    request: proto::NodeUnpublishVolumeRequest,
  ) -> Result<proto::NodeUnpublishVolumeResponse, Status> {
    NodeClient::node_unpublish_volume(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn node_get_capabilities(
    &self,
    request: proto::NodeGetCapabilitiesRequest,
  ) -> Result<proto::NodeGetCapabilitiesResponse, Status> {
    NodeClient::node_get_capabilities(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }

  async fn node_get_info(
    &self,
    request: proto::NodeGetInfoRequest,
  ) -> Result<proto::NodeGetInfoResponse, Status> {
    NodeClient::node_get_info(&mut self.clone(), request)
      .await
      .map(Response::into_inner)
  }
}
