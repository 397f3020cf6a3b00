use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::errors::{DomainError, Result};

/// Composite `(site, alias)` key addressing one remote stream.
///
/// The textual form is `site:alias`, split at the first colon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StreamKey {
    site: String,
    alias: String,
}

impl StreamKey {
    pub fn new(site: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            alias: alias.into(),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.site, self.alias)
    }
}

impl FromStr for StreamKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once(':') {
            Some((site, alias)) if !alias.is_empty() => Ok(Self::new(site, alias)),
            _ => Err(DomainError::InvalidStreamKey(s.to_string())),
        }
    }
}
