use crate::{
    config::EngineConfig,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};

///
/// EvalContext
///
/// Read-only evaluation context handed to every protocol call.
/// Carries the engine configuration and gates metrics emission.
///

#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    config: EngineConfig,
}

impl EvalContext {
    /// Build a context from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        if self.config.metrics {
            sink::record(event);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        config::EngineConfig,
        context::EvalContext,
        error::ErrorClass,
        obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    };
    use std::cell::Cell;

    struct CountingSink(Cell<usize>);

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            median_block_len: 2,
            ..EngineConfig::default()
        };

        let err = EvalContext::new(config).expect_err("even block length must be rejected");
        assert_eq!(err.class, ErrorClass::Config);
    }

    #[test]
    fn disabled_metrics_emit_nothing() {
        let sink = CountingSink(Cell::new(0));
        let quiet = EvalContext::new(EngineConfig::default().without_metrics())
            .expect("default config is valid");
        let loud = EvalContext::default();

        with_metrics_sink(&sink, || {
            quiet.record(MetricsEvent::Cumulate { aggregate: "count" });
            loud.record(MetricsEvent::Cumulate { aggregate: "count" });
        });

        assert_eq!(sink.0.get(), 1);
    }
}
