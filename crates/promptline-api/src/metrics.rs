//! Prometheus registry behind `/metrics`.
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use promptline_core::PipelineRun;

pub struct Metrics {
    registry: Registry,
    runs: IntCounterVec,
    stage_latency: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let runs = IntCounterVec::new(
            Opts::new("promptline_pipeline_runs_total", "Pipeline runs by outcome"),
            &["pipeline", "outcome"],
        )?;
        let stage_latency = HistogramVec::new(
            HistogramOpts::new(
                "promptline_stage_latency_seconds",
                "Latency of one stage generation call",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["pipeline", "stage"],
        )?;

        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(stage_latency.clone()))?;

        Ok(Self {
            registry,
            runs,
            stage_latency,
        })
    }

    pub fn record_success(&self, run: &PipelineRun) {
        self.runs.with_label_values(&[run.pipeline.as_str(), "success"]).inc();
        for record in &run.records {
            self.stage_latency
                .with_label_values(&[run.pipeline.as_str(), record.stage_key.as_str()])
                .observe(record.latency_ms as f64 / 1000.0);
        }
    }

    /// `code` is the error family, e.g. `GENERATION`.
    pub fn record_failure(&self, pipeline: &str, code: &str) {
        let outcome = code.to_lowercase();
        self.runs.with_label_values(&[pipeline, outcome.as_str()]).inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_counter_is_exported() {
        let metrics = Metrics::new().unwrap();
        metrics.record_failure("startup-trends", "GENERATION");
        let text = metrics.encode().unwrap();
        assert!(text.contains("promptline_pipeline_runs_total"));
        assert!(text.contains("outcome=\"generation\""));
    }
}
