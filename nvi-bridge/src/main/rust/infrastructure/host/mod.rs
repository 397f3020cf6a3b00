mod logging_sink;
mod test_pattern;

pub use logging_sink::{LoggingSink, SinkStats};
pub use test_pattern::{TestPattern, ToneGenerator};
