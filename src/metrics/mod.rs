use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref CHANGE_EVENTS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("change_events", "Change events emitted to listeners"),
        &["kind"]
    )
    .expect("Should succeed to create metric");

    pub static ref SKIPPED_POSITIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("skipped_positions", "Position checks skipped per pass"),
        &["reason"]
    )
    .expect("Should succeed to create metric");

    pub static ref DIFFED_POSITIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("diffed_positions", "Positions fully diffed per channel"),
        &["channel"]
    )
    .expect("Should succeed to create metric");

    pub static ref LISTENER_PANICS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("listener_panics", "Listener callbacks that panicked during dispatch"),
        &["stage"]
    )
    .expect("Should succeed to create metric");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(CHANGE_EVENTS_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(SKIPPED_POSITIONS_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(DIFFED_POSITIONS_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(LISTENER_PANICS_METRIC.clone()))
        .expect("collector can be registered");
}

/// Text-encodes everything in `registry` for scraping or logging.
pub fn gather_metrics(registry: &Registry) -> String {
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
