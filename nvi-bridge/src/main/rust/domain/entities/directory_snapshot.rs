use std::time::SystemTime;

use serde::Serialize;

use crate::domain::value_objects::{StreamDescriptor, StreamKey};

/// Immutable result of one discovery query.
#[derive(Debug, Clone, Serialize)]
pub struct DirectorySnapshot {
    streams: Vec<StreamDescriptor>,
    #[serde(skip)]
    taken_at: SystemTime,
}

impl DirectorySnapshot {
    pub fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams,
            taken_at: SystemTime::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn taken_at(&self) -> SystemTime {
        self.taken_at
    }

    /// First descriptor matching the composite key
    pub fn lookup(&self, key: &StreamKey) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|stream| stream.matches(key))
    }

    /// `site:alias` labels of every stream with an alias, in discovery order
    pub fn selection_list(&self) -> Vec<String> {
        self.streams
            .iter()
            .filter(|stream| !stream.alias.is_empty())
            .map(|stream| stream.key().to_string())
            .collect()
    }
}

impl Default for DirectorySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
