//! Time-axis plot with scrolling
//!
//! A [`TimePlot`] is a [`Plot`] over wall-clock time. While scrolling, a
//! ticker thread moves the X axis every scroll step so that its end stays
//! one step ahead of now, keeping the visible duration. When the user moves
//! the X range far enough away from now, scrolling turns itself off.

use crate::axis::Axis;
use crate::config::PlotConfig;
use crate::error::{PlotError, Result, ResultExt};
use crate::executor::TaskExecutor;
use crate::listener::PlotListener;
use crate::plot::{Plot, PlotInner};
use crate::sync;
use chrono::{DateTime, Duration, Utc};
use crossbeam_channel::{bounded, select, tick, Sender};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::JoinHandle;

/// Visible duration of a new time plot
const DEFAULT_SPAN_SECS: i64 = 60;

/// Whether an X range ending at `end` is far enough from `now` to stop scrolling
///
/// The distance is measured in percent of the visible span plus one scroll
/// step. Ranges without a positive span never stop scrolling.
pub fn should_stop_scrolling(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    step: Duration,
    threshold_percent: f64,
) -> bool {
    let span = seconds(end - start);
    if span <= 0.0 {
        return false;
    }
    let distance = seconds(end - now).abs();
    distance * 100.0 / (span + seconds(step)) > threshold_percent
}

fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

struct ScrollState {
    scrolling: AtomicBool,
    step: Mutex<Duration>,
    threshold_percent: f64,
    /// End of the X range last set by scrolling
    last_end: Mutex<Option<DateTime<Utc>>>,
}

impl ScrollState {
    fn step(&self) -> Duration {
        *sync::lock(&self.step)
    }

    /// Put the end of the X axis one step after `now`, keeping its span
    fn scroll(&self, inner: &PlotInner<DateTime<Utc>>, now: DateTime<Utc>) {
        let range = inner.x_axis_snapshot().value_range();
        let end = now + self.step();
        let start = end - (range.high - range.low);
        *sync::lock(&self.last_end) = Some(end);
        if inner.set_x_range(start, end) {
            inner.fire_x_axis_change();
        }
    }
}

/// Turns scrolling off when the user moves the X range away from now
struct ScrollStopper {
    state: Weak<ScrollState>,
}

impl PlotListener<DateTime<Utc>> for ScrollStopper {
    fn changed_x_axis(&self, axis: &Axis<DateTime<Utc>>) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        if !state.scrolling.load(Ordering::SeqCst) {
            return;
        }
        let range = axis.value_range();
        if *sync::lock(&state.last_end) == Some(range.high) {
            // Our own scroll
            return;
        }
        if should_stop_scrolling(
            range.low,
            range.high,
            Utc::now(),
            state.step(),
            state.threshold_percent,
        ) {
            tracing::debug!("X axis moved away from now, stopping scroll");
            state.scrolling.store(false, Ordering::SeqCst);
        }
    }
}

struct Ticker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Ticker {
    fn start(
        inner: Weak<PlotInner<DateTime<Utc>>>,
        state: Arc<ScrollState>,
        step: Duration,
    ) -> Result<Self> {
        let period = step
            .to_std()
            .map_err(|e| PlotError::InvalidRange(format!("scroll step {}: {}", step, e)))?;
        if period.is_zero() {
            return Err(PlotError::InvalidRange(format!("scroll step {}", step)));
        }
        let (stop, stopped) = bounded(1);
        let thread = std::thread::Builder::new()
            .name("rtplot-scroll".to_string())
            .spawn(move || {
                let ticks = tick(period);
                loop {
                    select! {
                        recv(ticks) -> _ => {
                            if !state.scrolling.load(Ordering::SeqCst) {
                                break;
                            }
                            let Some(inner) = inner.upgrade() else {
                                break;
                            };
                            state.scroll(&inner, Utc::now());
                        }
                        recv(stopped) -> _ => break,
                    }
                }
                tracing::debug!("Scroll ticker stopped");
            })
            .context("Failed to spawn scroll ticker")?;
        Ok(Self { stop, thread })
    }

    fn stop(self) {
        let _ = self.stop.send(());
        if self.thread.thread().id() == std::thread::current().id() {
            return;
        }
        if self.thread.join().is_err() {
            tracing::warn!("Scroll ticker panicked");
        }
    }
}

/// A plot over time that can follow the current time
pub struct TimePlot {
    plot: Plot<DateTime<Utc>>,
    scroll: Arc<ScrollState>,
    ticker: Mutex<Option<Ticker>>,
}

impl TimePlot {
    /// Create a time plot showing the last minute; scrolling starts off
    pub fn new(executor: Arc<dyn TaskExecutor>, config: PlotConfig) -> Result<Self> {
        let now = Utc::now();
        let x_axis = Axis::horizontal("Time", now - Duration::seconds(DEFAULT_SPAN_SECS), now);
        let scroll = Arc::new(ScrollState {
            scrolling: AtomicBool::new(false),
            step: Mutex::new(config.scroll_step()),
            threshold_percent: f64::from(config.scroll.stop_threshold_percent),
            last_end: Mutex::new(None),
        });
        let plot = Plot::new(x_axis, executor, config)?;
        plot.add_listener(Arc::new(ScrollStopper {
            state: Arc::downgrade(&scroll),
        }));
        Ok(Self {
            plot,
            scroll,
            ticker: Mutex::new(None),
        })
    }

    pub fn plot(&self) -> &Plot<DateTime<Utc>> {
        &self.plot
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.scrolling.load(Ordering::SeqCst)
    }

    /// Turn scrolling on or off
    ///
    /// Turning it on scrolls once right away, so that the X axis ends near
    /// now before any listener sees the range, then every scroll step.
    pub fn set_scrolling(&self, enabled: bool) -> Result<()> {
        let mut ticker = sync::lock(&self.ticker);
        if let Some(previous) = ticker.take() {
            previous.stop();
        }
        if !enabled {
            self.scroll.scrolling.store(false, Ordering::SeqCst);
            return Ok(());
        }
        self.scroll_now(Utc::now());
        self.scroll.scrolling.store(true, Ordering::SeqCst);
        *ticker = Some(Ticker::start(
            Arc::downgrade(self.plot.inner()),
            Arc::clone(&self.scroll),
            self.scroll.step(),
        )?);
        tracing::debug!("Scrolling every {}", self.scroll.step());
        Ok(())
    }

    pub fn scroll_step(&self) -> Duration {
        self.scroll.step()
    }

    /// Change the scroll step; a running scroll restarts with the new period
    pub fn set_scroll_step(&self, step: Duration) -> Result<()> {
        if step <= Duration::zero() {
            return Err(PlotError::InvalidRange(format!("scroll step {}", step)));
        }
        *sync::lock(&self.scroll.step) = step;
        self.set_scrolling(self.is_scrolling())
    }

    /// Move the X axis so that it ends one scroll step after `now`
    pub fn scroll_now(&self, now: DateTime<Utc>) {
        self.scroll.scroll(self.plot.inner(), now);
    }

    /// Stop scrolling and the plot's update thread
    pub fn dispose(&self) {
        self.scroll.scrolling.store(false, Ordering::SeqCst);
        if let Some(ticker) = sync::lock(&self.ticker).take() {
            ticker.stop();
        }
        self.plot.dispose();
    }
}

impl Deref for TimePlot {
    type Target = Plot<DateTime<Utc>>;

    fn deref(&self) -> &Self::Target {
        &self.plot
    }
}

impl Drop for TimePlot {
    fn drop(&mut self) {
        self.dispose();
    }
}
