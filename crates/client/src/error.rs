use std::{result, time::Duration};
use thiserror::Error;

pub type Result<T> = result::Result<T, CsiError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CsiError {
  /// The remote call itself failed. The status is exactly what the
  /// transport or the plugin reported.
  #[error(transparent)]
  Transport(#[from] tonic::Status),

  /// The request cannot be put on the wire unchanged. Nothing was sent
  /// to the plugin.
  #[error("{rpc}: {message}")]
  InvalidRequest {
    rpc: &'static str,
    message: &'static str,
  },

  /// The call succeeded but the plugin sent a response that violates
  /// the protocol.
  #[error("{rpc}: {message}")]
  InvalidResponse {
    rpc: &'static str,
    message: &'static str,
  },

  /// The caller cancelled the call before the plugin answered.
  #[error("{rpc}: call cancelled")]
  Cancelled { rpc: &'static str },

  /// The per-call timeout from [`ClientOptions`](crate::ClientOptions)
  /// elapsed before the plugin answered.
  #[error("{rpc}: no response within {timeout:?}")]
  Timeout {
    rpc: &'static str,
    timeout: Duration,
  },
}

impl CsiError {
  #[inline]
  pub(crate) fn invalid_response(rpc: &'static str, message: &'static str) -> Self {
    CsiError::InvalidResponse { rpc, message }
  }

  #[inline]
  pub(crate) fn invalid_request(rpc: &'static str, message: &'static str) -> Self {
    CsiError::InvalidRequest { rpc, message }
  }

  #[inline]
  pub fn is_transport(&self) -> bool {
    matches!(self, CsiError::Transport(_))
  }

  #[inline]
  pub fn is_invalid_request(&self) -> bool {
    matches!(self, CsiError::InvalidRequest { .. })
  }

  #[inline]
  pub fn is_invalid_response(&self) -> bool {
    matches!(self, CsiError::InvalidResponse { .. })
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool {
    matches!(self, CsiError::Cancelled { .. })
  }

  #[inline]
  pub fn is_timeout(&self) -> bool {
    matches!(self, CsiError::Timeout { .. })
  }

  /// The underlying gRPC status, if the error came from the transport.
  pub fn status(&self) -> Option<&tonic::Status> {
    match self {
      CsiError::Transport(status) => Some(status),
      _ => None,
    }
  }
}
