use std::{collections::HashMap, fmt, iter::FromIterator};

/// Secrets forwarded to the plugin. The values never show up in
/// `Debug` output, so requests carrying them are safe to trace.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets(HashMap<String, String>);

impl Secrets {
  #[inline]
  pub fn new() -> Self {
    Secrets::default()
  }

  #[inline]
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl AsRef<HashMap<String, String>> for Secrets {
  #[inline]
  fn as_ref(&self) -> &HashMap<String, String> {
    &self.0
  }
}

impl From<HashMap<String, String>> for Secrets {
  #[inline]
  fn from(v: HashMap<String, String>) -> Self {
    Secrets(v)
  }
}

impl From<Secrets> for HashMap<String, String> {
  #[inline]
  fn from(v: Secrets) -> Self {
    v.0
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secrets {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Secrets(
      iter
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    )
  }
}

impl fmt::Debug for Secrets {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut m = f.debug_map();
    for k in self.0.keys() {
      m.key(k).value(&"SECRET");
    }

    m.finish()
  }
}
