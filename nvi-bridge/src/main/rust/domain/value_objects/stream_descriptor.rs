use serde::Serialize;

use super::StreamKey;

/// One addressable remote stream, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub alias: String,
    pub site: String,
    pub uri: String,
}

impl StreamDescriptor {
    pub fn new(
        site: impl Into<String>,
        alias: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            site: site.into(),
            uri: uri.into(),
        }
    }

    pub fn key(&self) -> StreamKey {
        StreamKey::new(self.site.clone(), self.alias.clone())
    }

    pub fn matches(&self, key: &StreamKey) -> bool {
        self.site == key.site() && self.alias == key.alias()
    }
}
