//! Test data builders for creating test objects

use rtplot::{
    Axis, InlineExecutor, Plot, PlotConfig, PlotSample, SampleBuffer, ScreenRegion,
    TaskExecutor, ThreadPool,
};
use std::sync::Arc;

/// Builder for numeric test plots
pub struct PlotBuilder {
    x_range: (f64, f64),
    width: i32,
    executor: Option<Arc<dyn TaskExecutor>>,
    config: PlotConfig,
    updates: bool,
}

impl PlotBuilder {
    pub fn new() -> Self {
        Self {
            x_range: (0.0, 100.0),
            width: 101,
            executor: None,
            config: PlotConfig::default(),
            updates: false,
        }
    }

    pub fn x_range(mut self, low: f64, high: f64) -> Self {
        self.x_range = (low, high);
        self
    }

    /// Use a real worker pool instead of the inline executor
    pub fn threads(mut self, threads: usize) -> Self {
        self.executor = Some(Arc::new(ThreadPool::new(threads).unwrap()));
        self
    }

    pub fn executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(mut self, config: PlotConfig) -> Self {
        self.config = config;
        if self.updates {
            self.config.update.throttle_ms = 10;
        }
        self
    }

    /// Keep the throttled background updates running
    ///
    /// By default the update thread is stopped right away, so that only the
    /// test itself changes the plot.
    pub fn with_updates(mut self) -> Self {
        self.updates = true;
        self.config.update.throttle_ms = 10;
        self
    }

    pub fn build(self) -> Plot<f64> {
        let mut x_axis = Axis::horizontal("x", self.x_range.0, self.x_range.1);
        x_axis.set_bounds(ScreenRegion::new(0, 0, self.width, 20));
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(InlineExecutor) as Arc<dyn TaskExecutor>);
        let plot = Plot::new(x_axis, executor, self.config).unwrap();
        if !self.updates {
            plot.dispose();
        }
        plot
    }
}

impl Default for PlotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffer holding `(position, value)` pairs
pub fn buffer(samples: &[(f64, f64)]) -> Arc<SampleBuffer<f64>> {
    Arc::new(SampleBuffer::from_samples(
        samples
            .iter()
            .map(|&(x, y)| PlotSample::new(x, y))
            .collect(),
    ))
}

/// Buffer with positions 0, 1, 2, .. for `values`
pub fn indexed(values: &[f64]) -> Arc<SampleBuffer<f64>> {
    Arc::new(SampleBuffer::from_samples(
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| PlotSample::new(i as f64, y))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtplot::PlotDataProvider;

    #[test]
    fn test_plot_builder() {
        let plot = PlotBuilder::new().x_range(-5.0, 5.0).build();
        assert_eq!(plot.x_axis().value_range().low, -5.0);
        assert_eq!(indexed(&[1.0, 2.0]).len(), 2);
    }
}
