mod loopback_transport;
mod station;

pub use loopback_transport::{LoopbackTransport, LOOPBACK_SITE};
pub use station::STATION_CLOSED;
