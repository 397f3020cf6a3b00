pub mod host;
pub mod loopback;
pub mod metrics;
