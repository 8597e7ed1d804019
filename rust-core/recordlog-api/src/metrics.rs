// SPDX-License-Identifier: PMPL-1.0-or-later
//! Prometheus metrics for the produce/consume endpoints.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

/// Counters exported on `/metrics`.
pub struct ApiMetrics {
    registry: Registry,
    /// Records accepted by the produce endpoint.
    pub records_produced: IntCounter,
    /// Payload bytes accepted by the produce endpoint.
    pub bytes_produced: IntCounter,
    /// Records returned by the consume endpoint.
    pub records_consumed: IntCounter,
    /// Consume requests for offsets that do not exist.
    pub offsets_not_found: IntCounter,
    /// Records currently held by the log.
    pub records_stored: IntGauge,
}

impl ApiMetrics {
    /// Create the metrics and register them with a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let records_produced = IntCounter::new(
            "recordlog_records_produced_total",
            "Number of records appended through the API",
        )?;
        registry.register(Box::new(records_produced.clone()))?;

        let bytes_produced = IntCounter::new(
            "recordlog_bytes_produced_total",
            "Payload bytes appended through the API",
        )?;
        registry.register(Box::new(bytes_produced.clone()))?;

        let records_consumed = IntCounter::new(
            "recordlog_records_consumed_total",
            "Number of records read through the API",
        )?;
        registry.register(Box::new(records_consumed.clone()))?;

        let offsets_not_found = IntCounter::new(
            "recordlog_offsets_not_found_total",
            "Consume requests for offsets outside the log",
        )?;
        registry.register(Box::new(offsets_not_found.clone()))?;

        let records_stored = IntGauge::new("recordlog_records", "Records held by the log")?;
        registry.register(Box::new(records_stored.clone()))?;

        Ok(Self {
            registry,
            records_produced,
            bytes_produced,
            records_consumed,
            offsets_not_found,
            records_stored,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.records_produced.inc();
        metrics.bytes_produced.inc_by(13);

        let text = metrics.render().unwrap();
        assert!(text.contains("recordlog_records_produced_total 1"));
        assert!(text.contains("recordlog_bytes_produced_total 13"));
        assert!(text.contains("recordlog_offsets_not_found_total 0"));
    }
}
