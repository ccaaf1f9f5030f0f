use crate::{CsiError, Result};
use std::{fmt, path::Path};
use tracing::{field, Span};

/// Records a value as a field of the current span. Fields must be
/// declared on the span up front, otherwise recording is a no-op.
pub(crate) trait Record {
  fn record_as(&self, field: &'static str);
}

impl<T: fmt::Debug + ?Sized> Record for T {
  #[inline]
  fn record_as(&self, field: &'static str) {
    Span::current().record(field, &field::debug(self));
  }
}

#[inline]
pub(crate) fn record_response<T: fmt::Debug>(response: T) -> T {
  response.record_as("response");
  response
}

pub(crate) const BAD_STAGING_PATH: &str = "staging_target_path is not valid UTF-8";
pub(crate) const BAD_TARGET_PATH: &str = "target_path is not valid UTF-8";

/// Paths go on the wire as strings. A path that is not valid UTF-8 would
/// reach the plugin altered, so it is rejected before any call is made.
pub(crate) fn path_to_wire(
  path: &Path,
  rpc: &'static str,
  message: &'static str,
) -> Result<String> {
  match path.to_str() {
    Some(path) => Ok(path.to_owned()),
    None => Err(CsiError::invalid_request(rpc, message)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utf8_path_is_kept() {
    let path = path_to_wire(Path::new("/var/lib/csi/vol-1"), "Rpc", "bad path");
    assert_eq!(path.unwrap(), "/var/lib/csi/vol-1");
  }

  #[cfg(unix)]
  #[test]
  fn non_utf8_path_is_rejected() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let path = Path::new(OsStr::from_bytes(b"/var/lib/csi/vol-\xff"));
    let err = path_to_wire(path, "NodeStageVolume", "bad path").unwrap_err();
    assert!(err.is_invalid_request());
    assert_eq!(err.to_string(), "NodeStageVolume: bad path");
  }
}
