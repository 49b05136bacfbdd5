use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub rides_requested_total: IntCounterVec,
    pub rides_closed_total: IntCounterVec,
    pub ride_operation_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let rides_requested_total = IntCounterVec::new(
            Opts::new("rides_requested_total", "Ride requests by initial status"),
            &["outcome"],
        )
        .expect("valid rides_requested_total metric");

        let rides_closed_total = IntCounterVec::new(
            Opts::new("rides_closed_total", "Rides moved to a terminal status"),
            &["status"],
        )
        .expect("valid rides_closed_total metric");

        let ride_operation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ride_operation_latency_seconds",
                "Latency of ride lifecycle operations in seconds",
            ),
            &["operation"],
        )
        .expect("valid ride_operation_latency_seconds metric");

        registry
            .register(Box::new(rides_requested_total.clone()))
            .expect("register rides_requested_total");
        registry
            .register(Box::new(rides_closed_total.clone()))
            .expect("register rides_closed_total");
        registry
            .register(Box::new(ride_operation_latency_seconds.clone()))
            .expect("register ride_operation_latency_seconds");

        Self {
            registry,
            rides_requested_total,
            rides_closed_total,
            ride_operation_latency_seconds,
        }
    }

    pub fn observe_latency(&self, operation: &str, seconds: f64) {
        self.ride_operation_latency_seconds
            .with_label_values(&[operation])
            .observe(seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
