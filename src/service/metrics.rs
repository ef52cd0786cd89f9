use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramOpts, HistogramVec,
    IntCounterVec, TextEncoder,
};

const DEFAULT_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1000.0,
];

// Invocations per function and response code
static REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pingcalc_requests_total",
        "Function invocations since pingcalc started",
        &[
            "function", // Function ID, or "unmatched"
            "code",     // HTTP status code
        ]
    )
    .expect("Failed to register prometheus metric: pingcalc_requests_total")
});

// Invocation latency, body read included
static LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "pingcalc_latency",
        "Function invocation latency in milliseconds",
    )
    .buckets(DEFAULT_BUCKETS.to_vec());
    register_histogram_vec!(opts, &["function"])
        .expect("Failed to register prometheus metric: pingcalc_latency")
});

/// Record one finished invocation.
pub fn observe(function: &str, code: u16, elapsed: Duration) {
    let code = code.to_string();
    REQUESTS.with_label_values(&[function, code.as_str()]).inc();
    LATENCY
        .with_label_values(&[function])
        .observe(elapsed.as_secs_f64() * 1000.0);
}

/// Number of invocations recorded for a function and code.
pub fn request_count(function: &str, code: u16) -> u64 {
    let code = code.to_string();
    REQUESTS.with_label_values(&[function, code.as_str()]).get()
}

/// Render the default registry in the Prometheus text format.
pub fn render() -> Result<Vec<u8>, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_and_render() {
        let before = request_count("metrics-test", 200);
        observe("metrics-test", 200, Duration::from_millis(3));
        assert_eq!(request_count("metrics-test", 200), before + 1);

        let text = String::from_utf8(render().unwrap()).unwrap();
        assert!(text.contains("pingcalc_requests_total"));
        assert!(text.contains(r#"function="metrics-test""#));
        assert!(text.contains("pingcalc_latency_bucket"));
    }
}
