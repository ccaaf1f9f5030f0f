//! In-memory doubles for the three plugin services.
//!
//! Each fake answers with the response queued through its `set_next_*`
//! methods (or the default wire response when nothing is queued), fails
//! once with the status passed to `fail_next`, and keeps a log of the
//! requests it received.

use crate::{proto, rpc::*};
use async_trait::async_trait;
use std::{
  future::Future,
  pin::Pin,
  sync::{Arc, Mutex, MutexGuard},
};
use tonic::Status;

#[derive(Debug, Clone)]
pub enum FakeRequest {
  GetPluginInfo,
  GetPluginCapabilities,
  Probe,
  ControllerPublishVolume(proto::ControllerPublishVolumeRequest),
  ControllerUnpublishVolume(proto::ControllerUnpublishVolumeRequest),
  ControllerGetCapabilities,
  NodeStageVolume(proto::NodeStageVolumeRequest),
  NodeUnstageVolume(proto::NodeUnstageVolumeRequest),
  NodePublishVolume(proto::NodePublishVolumeRequest),
  NodeUnpublishVolume(proto::NodeUnpublishVolumeRequest),
  NodeGetCapabilities,
  NodeGetInfo,
}

type Delay = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Default)]
struct Shared {
  next_err: Option<Status>,
  delay: Option<Delay>,
  log: Vec<FakeRequest>,
}

impl Shared {
  /// Logs the request and hands back what the fake should do with it.
  fn begin(&mut self, request: FakeRequest) -> (Option<Delay>, Option<Status>) {
    self.log.push(request);
    (self.delay.clone(), self.next_err.take())
  }
}

async fn answer<T, F>(delay: Option<Delay>, err: Option<Status>, response: F) -> Result<T, Status>
where
  F: FnOnce() -> T,
{
  if let Some(delay) = delay {
    delay().await;
  }

  match err {
    Some(status) => Err(status),
    None => Ok(response()),
  }
}

macro_rules! fake_common {
  ($name:ident, $inner:ty) => {
    impl $name {
      pub fn new() -> Self {
        Self::default()
      }

      /// The next call fails with `status`. Later calls succeed again.
      pub fn fail_next(&self, status: Status) {
        self.lock().shared.next_err = Some(status);
      }

      /// Every call waits on the future returned by `delay` before it
      /// answers. Used to keep a call in flight.
      pub fn delay_with<F, Fut>(&self, delay: F)
      where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
      {
        self.lock().shared.delay = Some(Arc::new(move || Box::pin(delay())));
      }

      pub fn get_log(&self) -> Vec<FakeRequest> {
        self.lock().shared.log.clone()
      }

      pub fn reset_log(&self) {
        self.lock().shared.log.clear();
      }

      fn lock(&self) -> MutexGuard<'_, $inner> {
        // A test that panicked while holding the lock already failed.
        match self.0.lock() {
          Ok(guard) => guard,
          Err(poisoned) => poisoned.into_inner(),
        }
      }
    }
  };
}

#[derive(Default)]
struct IdentityInner {
  shared: Shared,
  plugin_info: Option<proto::GetPluginInfoResponse>,
  plugin_capabilities: Option<proto::GetPluginCapabilitiesResponse>,
  probe: Option<proto::ProbeResponse>,
}

/// Cloning shares the state, so a test can keep a handle after moving
/// the fake into a client.
#[derive(Default, Clone)]
pub struct FakeIdentity(Arc<Mutex<IdentityInner>>);

fake_common!(FakeIdentity, IdentityInner);

impl FakeIdentity {
  pub fn set_next_plugin_info(&self, response: proto::GetPluginInfoResponse) {
    self.lock().plugin_info = Some(response);
  }

  pub fn set_next_plugin_capabilities(&self, response: proto::GetPluginCapabilitiesResponse) {
    self.lock().plugin_capabilities = Some(response);
  }

  pub fn set_next_probe(&self, response: proto::ProbeResponse) {
    self.lock().probe = Some(response);
  }
}

#[async_trait]
impl IdentityRpc for FakeIdentity {
  async fn get_plugin_info(
    &self,
    _request: proto::GetPluginInfoRequest,
  ) -> Result<proto::GetPluginInfoResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::GetPluginInfo);
      (delay, err, inner.plugin_info.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }

  async fn get_plugin_capabilities(
    &self,
    _request: proto::GetPluginCapabilitiesRequest,
  ) -> Result<proto::GetPluginCapabilitiesResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::GetPluginCapabilities);
      (delay, err, inner.plugin_capabilities.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }

  async fn probe(&self, _request: proto::ProbeRequest) -> Result<proto::ProbeResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::Probe);
      (delay, err, inner.probe.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }
}

#[derive(Default)]
struct ControllerInner {
  shared: Shared,
  publish_volume: Option<proto::ControllerPublishVolumeResponse>,
  capabilities: Option<proto::ControllerGetCapabilitiesResponse>,
}

#[derive(Default, Clone)]
pub struct FakeController(Arc<Mutex<ControllerInner>>);

fake_common!(FakeController, ControllerInner);

impl FakeController {
  pub fn set_next_publish_volume(&self, response: proto::ControllerPublishVolumeResponse) {
    self.lock().publish_volume = Some(response);
  }

  pub fn set_next_capabilities(&self, response: proto::ControllerGetCapabilitiesResponse) {
    self.lock().capabilities = Some(response);
  }
}

#[async_trait]
impl ControllerRpc for FakeController {
  async fn controller_publish_volume(
    &self,
    request: proto::ControllerPublishVolumeRequest,
  ) -> Result<proto::ControllerPublishVolumeResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner
        .shared
        .begin(FakeRequest::ControllerPublishVolume(request));
      (delay, err, inner.publish_volume.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }

  async fn controller_unpublish_volume(
    &self,
    request: proto::ControllerUnpublishVolumeRequest,
  ) -> Result<proto::ControllerUnpublishVolumeResponse, Status> {
    let (delay, err) = self
      .lock()
      .shared
      .begin(FakeRequest::ControllerUnpublishVolume(request));

    answer(delay, err, Default::default).await
  }

  async fn controller_get_capabilities(
    &self,
    _request: proto::ControllerGetCapabilitiesRequest,
  ) -> Result<proto::ControllerGetCapabilitiesResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::ControllerGetCapabilities);
      (delay, err, inner.capabilities.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }
}

#[derive(Default)]
struct NodeInner {
  shared: Shared,
  capabilities: Option<proto::NodeGetCapabilitiesResponse>,
  info: Option<proto::NodeGetInfoResponse>,
}

#[derive(Default, Clone)]
pub struct FakeNode(Arc<Mutex<NodeInner>>);

fake_common!(FakeNode, NodeInner);

impl FakeNode {
  pub fn set_next_capabilities(&self, response: proto::NodeGetCapabilitiesResponse) {
    self.lock().capabilities = Some(response);
  }

  pub fn set_next_info(&self, response: proto::NodeGetInfoResponse) {
    self.lock().info = Some(response);
  }
}

#[async_trait]
impl NodeRpc for FakeNode {
  async fn node_stage_volume(
    &self,
    request: proto::NodeStageVolumeRequest,
  ) -> Result<proto::NodeStageVolumeResponse, Status> {
    let (delay, err) = self
      .lock()
      .shared
      .begin(FakeRequest::NodeStageVolume(request));

    answer(delay, err, Default::default).await
  }

  async fn node_unstage_volume(
    &self,
    request: proto::NodeUnstageVolumeRequest,
  ) -> Result<proto::NodeUnstageVolumeResponse, Status> {
    let (delay, err) = self
      .lock()
      .shared
      .begin(FakeRequest::NodeUnstageVolume(request));

    answer(delay, err, Default::default).await
  }

  async fn node_publish_volume(
    &self,
    request: proto::NodePublishVolumeRequest,
  ) -> Result<proto::NodePublishVolumeResponse, Status> {
    let (delay, err) = self
      .lock()
      .shared
      .begin(FakeRequest::NodePublishVolume(request));

    answer(delay, err, Default::default).await
  }

  async fn node_unpublish_volume(
    &self,
    request: proto::NodeUnpublishVolumeRequest,
  ) -> Result<proto::NodeUnpublishVolumeResponse, Status> {
    let (delay, err) = self
      .lock()
      .shared
      .begin(FakeRequest::NodeUnpublishVolume(request));

    answer(delay, err, Default::default).await
  }

  async fn node_get_capabilities(
    &self,
    _request: proto::NodeGetCapabilitiesRequest,
  ) -> Result<proto::NodeGetCapabilitiesResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::NodeGetCapabilities);
      (delay, err, inner.capabilities.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }

  async fn node_get_info(
    &self,
    _request: proto::NodeGetInfoRequest,
  ) -> Result<proto::NodeGetInfoResponse, Status> {
    let (delay, err, response) = {
      let mut inner = self.lock();
      let (delay, err) = inner.shared.begin(FakeRequest::NodeGetInfo);
      (delay, err, inner.info.take())
    };

    answer(delay, err, || response.unwrap_or_default()).await
  }
}
