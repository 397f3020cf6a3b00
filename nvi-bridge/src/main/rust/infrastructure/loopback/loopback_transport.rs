use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::station::{OwnedAudio, OwnedVideo, Payload, Station};
use crate::domain::errors::TransportError;
use crate::domain::media::{TransportAudioFrame, TransportVideoFrame};
use crate::domain::ports::{FrameReceiver, FrameSender, PolledFrames, Transport};
use crate::domain::value_objects::{SenderConfig, StreamDescriptor};

pub const LOOPBACK_SITE: &str = "local";

/// In-process transport: every sender is discoverable and receivable in the same process.
///
/// Frames are copied on send, so host buffers can be reused as soon as
/// `send_*` returns. Dropping the last handle to a sender closes its stream
/// and every receiver attached to it fails its next poll.
#[derive(Debug)]
pub struct LoopbackTransport {
    site: String,
    stations: Mutex<BTreeMap<String, Weak<Station>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::with_site(LOOPBACK_SITE)
    }

    pub fn with_site(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            stations: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn uri_for(&self, alias: &str) -> String {
        format!("loopback://{}/{}", self.site, alias)
    }

    fn live_station(&self, uri: &str) -> Option<Arc<Station>> {
        self.stations
            .lock()
            .get(uri)
            .and_then(Weak::upgrade)
            .filter(|station| !station.is_closed())
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackTransport {
    fn allocate_receiver(&self, uri: &str) -> Result<Box<dyn FrameReceiver>, TransportError> {
        let station = self
            .live_station(uri)
            .ok_or_else(|| TransportError::ReceiverAllocation {
                uri: uri.to_string(),
                reason: "no live sender".to_string(),
            })?;

        tracing::debug!(uri = %uri, "Loopback receiver attached");
        Ok(Box::new(LoopbackReceiver {
            station,
            last_seen: 0,
            current: None,
        }))
    }

    fn allocate_sender(
        &self,
        config: &SenderConfig,
    ) -> Result<Arc<dyn FrameSender>, TransportError> {
        let uri = self.uri_for(config.alias());
        let mut stations = self.stations.lock();

        let taken = stations
            .get(&uri)
            .and_then(Weak::upgrade)
            .is_some_and(|station| !station.is_closed());
        if taken {
            return Err(TransportError::SenderAllocation(format!(
                "{} is already published",
                uri
            )));
        }

        stations.retain(|_, station| station.strong_count() > 0);
        let station = Arc::new(Station::new(config.alias()));
        stations.insert(uri.clone(), Arc::downgrade(&station));

        tracing::debug!(uri = %uri, "Loopback sender published");
        Ok(Arc::new(LoopbackSender { station }))
    }

    fn enumerate_streams(
        &self,
        _timeout: Duration,
        capacity: usize,
    ) -> Result<Vec<StreamDescriptor>, TransportError> {
        let stations = self.stations.lock();
        Ok(stations
            .iter()
            .filter_map(|(uri, station)| station.upgrade().map(|station| (uri, station)))
            .filter(|(_, station)| !station.is_closed())
            .map(|(uri, station)| {
                StreamDescriptor::new(self.site.as_str(), station.alias(), uri.as_str())
            })
            .take(capacity)
            .collect())
    }
}

struct LoopbackSender {
    station: Arc<Station>,
}

impl FrameSender for LoopbackSender {
    fn send_video(&self, frame: &TransportVideoFrame<'_>) -> Result<(), TransportError> {
        self.station.publish(Payload::Video(OwnedVideo::copy_of(frame)))
    }

    fn send_audio(&self, frame: &TransportAudioFrame<'_>) -> Result<(), TransportError> {
        self.station.publish(Payload::Audio(OwnedAudio::copy_of(frame)))
    }
}

impl Drop for LoopbackSender {
    fn drop(&mut self) {
        tracing::debug!(alias = %self.station.alias(), "Loopback sender closed");
        self.station.close();
    }
}

struct LoopbackReceiver {
    station: Arc<Station>,
    last_seen: u64,
    /// Payload borrowed by the frames returned from the latest poll
    current: Option<Arc<Payload>>,
}

impl FrameReceiver for LoopbackReceiver {
    fn poll(&mut self, timeout: Duration) -> Result<PolledFrames<'_>, TransportError> {
        self.current = None;

        let deadline = Instant::now() + timeout;
        if let Some((seq, payload)) = self.station.next_after(self.last_seen, deadline)? {
            self.last_seen = seq;
            self.current = Some(payload);
        }

        Ok(self
            .current
            .as_deref()
            .map(Payload::frames)
            .unwrap_or_default())
    }
}
