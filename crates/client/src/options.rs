use std::time::Duration;

/// How to read a probe response that carries no readiness value.
#[derive(Eq, Clone, Copy, PartialEq, Debug, Hash)]
pub enum MissingReadiness {
  /// Treat the plugin as ready. Several plugins omit the field instead of
  /// sending `true`, and the protocol allows the caller to assume readiness.
  Ready,

  /// Treat the plugin as not ready until it says otherwise.
  NotReady,
}

impl MissingReadiness {
  #[inline]
  pub(crate) fn as_bool(self) -> bool {
    match self {
      MissingReadiness::Ready => true,
      MissingReadiness::NotReady => false,
    }
  }
}

impl Default for MissingReadiness {
  #[inline]
  fn default() -> Self {
    MissingReadiness::Ready
  }
}

/// Per client settings. Every field has a default, so
/// `ClientOptions::default()` gives the usual behaviour.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientOptions {
  call_timeout: Option<Duration>,
  missing_readiness: MissingReadiness,
}

impl ClientOptions {
  #[inline]
  pub fn new() -> Self {
    ClientOptions::default()
  }

  /// Upper bound for a single remote call. No bound by default.
  pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
    self.call_timeout = Some(timeout);
    self
  }

  pub fn with_missing_readiness(mut self, missing_readiness: MissingReadiness) -> Self {
    self.missing_readiness = missing_readiness;
    self
  }

  #[inline]
  pub fn call_timeout(&self) -> Option<Duration> {
    self.call_timeout
  }

  #[inline]
  pub fn missing_readiness(&self) -> MissingReadiness {
    self.missing_readiness
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let options = ClientOptions::default();
    assert_eq!(options.call_timeout(), None);
    assert_eq!(options.missing_readiness(), MissingReadiness::Ready);
    assert!(options.missing_readiness().as_bool());
  }

  #[test]
  fn builder() {
    let options = ClientOptions::new()
      .with_call_timeout(Duration::from_secs(5))
      .with_missing_readiness(MissingReadiness::NotReady);

    assert_eq!(options.call_timeout(), Some(Duration::from_secs(5)));
    assert!(!options.missing_readiness().as_bool());
  }
}
