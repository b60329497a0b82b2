//! Response metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder every
//! call is a no-op.

use metrics::{counter, describe_counter};

/// Counter of committed responses, labelled by status code.
pub const RESPONSES_TOTAL: &str = "hermes_responses_total";

/// Counter of body bytes handed to the sink.
pub const RESPONSE_BYTES_TOTAL: &str = "hermes_response_bytes_total";

/// Counter of render failures, labelled by format.
pub const RENDER_FAILURES_TOTAL: &str = "hermes_render_failures_total";

/// Counter of errors the status translator had to patch up, labelled by kind.
pub const STATUS_ANOMALIES_TOTAL: &str = "hermes_status_anomalies_total";

/// Registers descriptions for all Hermes metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(RESPONSES_TOTAL, "Responses committed by status code");
    describe_counter!(RESPONSE_BYTES_TOTAL, "Response body bytes written");
    describe_counter!(RENDER_FAILURES_TOTAL, "Render engine failures by format");
    describe_counter!(
        STATUS_ANOMALIES_TOTAL,
        "Errors converted to a fallback API status"
    );
}

/// Records a response commit with its status code.
pub fn record_response(status_code: u16) {
    counter!(RESPONSES_TOTAL, "status" => status_code.to_string()).increment(1);
}

/// Records body bytes written to the sink.
pub fn record_response_bytes(bytes: usize) {
    counter!(RESPONSE_BYTES_TOTAL).increment(bytes as u64);
}

/// Records a render engine failure.
pub fn record_render_failure(format: &'static str) {
    counter!(RENDER_FAILURES_TOTAL, "format" => format).increment(1);
}

/// Records a status translation anomaly.
///
/// `kind` is `"opaque"` for errors without a status or `"malformed"` for
/// statuses with an unknown coarse flag.
pub fn record_status_anomaly(kind: &'static str) {
    counter!(STATUS_ANOMALIES_TOTAL, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_response(200);
        record_response_bytes(42);
        record_render_failure("json");
        record_status_anomaly("opaque");
    }

    #[test]
    fn test_metric_names() {
        assert!(RESPONSES_TOTAL.starts_with("hermes_"));
        assert!(STATUS_ANOMALIES_TOTAL.ends_with("_total"));
    }
}
