//! Count-up display
//!
//! A spring-driven counter standing in for the coin amount overlay. It is
//! armed with a `start_when` flag and reports completion by sending on a
//! single-use channel supplied by whoever is waiting for it; the sender is
//! consumed, so completion is delivered at most once per arming.

use crate::spring::{Spring, SpringConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Longest spring step in seconds
const MAX_STEP: f64 = 1.0 / 60.0;

/// Counting direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountDirection {
    /// `from` → `to`
    #[default]
    Up,
    /// `to` → `from`
    Down,
}

/// Count-up parameters
#[derive(Clone, Debug, PartialEq)]
pub struct CountUpConfig {
    pub from: f32,
    pub to: f32,
    pub direction: CountDirection,
    /// Wait between arming and the first step
    pub delay: Duration,
    /// Thousands separator; empty disables grouping
    pub separator: String,
    pub frame: Duration,
}

impl CountUpConfig {
    pub fn new(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            direction: CountDirection::Up,
            delay: Duration::ZERO,
            separator: ",".to_string(),
            frame: Duration::from_secs_f64(1.0 / 60.0),
        }
    }

    pub fn start_value(&self) -> f32 {
        match self.direction {
            CountDirection::Up => self.from,
            CountDirection::Down => self.to,
        }
    }

    pub fn end_value(&self) -> f32 {
        match self.direction {
            CountDirection::Up => self.to,
            CountDirection::Down => self.from,
        }
    }
}

struct CountState {
    started: bool,
    finished: bool,
    generation: u64,
    value: f64,
    text: String,
    on_end: Option<oneshot::Sender<()>>,
}

/// Spring-driven counter
#[derive(Clone)]
pub struct CountUp {
    config: Arc<CountUpConfig>,
    inner: Arc<Mutex<CountState>>,
}

impl CountUp {
    pub fn new(config: CountUpConfig) -> Self {
        let value = f64::from(config.start_value());
        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(CountState {
                started: false,
                finished: false,
                generation: 0,
                value,
                text: String::new(),
                on_end: None,
            })),
        }
    }

    pub fn config(&self) -> &CountUpConfig {
        &self.config
    }

    pub fn value(&self) -> f64 {
        self.inner.lock().unwrap().value
    }

    /// Formatted display text; empty until started
    pub fn text(&self) -> String {
        self.inner.lock().unwrap().text.clone()
    }

    pub fn is_started(&self) -> bool {
        self.inner.lock().unwrap().started
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().unwrap().finished
    }

    /// Arm the counter and register `on_end`
    ///
    /// Returns `false` if the counter already ran since the last reset; the
    /// sender is dropped in that case so the waiter is not left hanging.
    pub fn start(&self, on_end: oneshot::Sender<()>) -> bool {
        {
            let mut state = self.inner.lock().unwrap();
            if state.started {
                tracing::warn!("count-up already started, completion will not be reported");
                return false;
            }
            state.on_end = Some(on_end);
        }
        self.set_start_when(true)
    }

    /// Drive the `start_when` flag
    ///
    /// `true` starts counting once; `false` disarms, abandons any running
    /// count (dropping a pending completion sender) and clears the display.
    pub fn set_start_when(&self, start: bool) -> bool {
        let mut state = self.inner.lock().unwrap();
        if !start {
            state.generation += 1;
            state.started = false;
            state.finished = false;
            state.value = f64::from(self.config.start_value());
            state.text.clear();
            state.on_end = None;
            return false;
        }

        if state.started {
            return false;
        }

        state.started = true;
        state.value = f64::from(self.config.start_value());
        state.text = format_amount(state.value, &self.config.separator);
        let generation = state.generation;
        drop(state);

        tracing::debug!(
            from = self.config.start_value(),
            to = self.config.end_value(),
            "count-up started"
        );
        tokio::spawn(run(Arc::clone(&self.inner), Arc::clone(&self.config), generation));
        true
    }

    /// Disarm and clear; same as `set_start_when(false)`
    pub fn reset(&self) {
        self.set_start_when(false);
    }
}

async fn run(inner: Arc<Mutex<CountState>>, config: Arc<CountUpConfig>, generation: u64) {
    if !config.delay.is_zero() {
        tokio::time::sleep(config.delay).await;
    }

    let start = f64::from(config.start_value());
    let end = f64::from(config.end_value());
    let mut spring = Spring::new(SpringConfig::count_up(end - start), start);
    spring.set_target(end);

    // Large frames are split so the integration stays stable at low fps
    let frame = config.frame.as_secs_f64();
    let substeps = (frame / MAX_STEP).ceil().max(1.0) as u32;
    let dt = frame / f64::from(substeps);
    let mut ticker = tokio::time::interval(config.frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        for _ in 0..substeps {
            spring.step(dt);
        }

        let on_end = {
            let mut state = inner.lock().unwrap();
            if state.generation != generation {
                return;
            }
            state.value = spring.value();
            state.text = format_amount(state.value, &config.separator);

            if spring.value() != end {
                continue;
            }
            state.finished = true;
            state.on_end.take()
        };

        tracing::debug!(value = end, "count-up finished");
        if let Some(on_end) = on_end {
            // The waiter may have given up (stage timeout); nothing to do then
            let _ = on_end.send(());
        }
        return;
    }
}

/// Round `value` and group thousands with `separator`
pub fn format_amount(value: f64, separator: &str) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len() + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(9999.0, ","), "9,999");
        assert_eq!(format_amount(1234567.0, ","), "1,234,567");
        assert_eq!(format_amount(999.4, ","), "999");
        assert_eq!(format_amount(9999.0, ""), "9999");
        assert_eq!(format_amount(0.0, ","), "0");
        assert_eq!(format_amount(-1234.6, "."), "-1.235");
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_end_fires_once() {
        let counter = CountUp::new(CountUpConfig::new(0.0, 100.0));
        assert_eq!(counter.text(), "");

        let (tx, rx) = oneshot::channel();
        assert!(counter.start(tx));
        assert_eq!(counter.text(), "0");

        rx.await.expect("count-up should report completion");
        assert_eq!(counter.value(), 100.0);
        assert_eq!(counter.text(), "100");
        assert!(counter.is_finished());

        // Already ran: a second waiter is released instead of hanging
        let (tx, rx) = oneshot::channel();
        assert!(!counter.start(tx));
        assert!(rx.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_abandons_running_count() {
        let counter = CountUp::new(CountUpConfig::new(0.0, 9999.0));
        let (tx, rx) = oneshot::channel();
        counter.start(tx);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(counter.value() > 0.0);

        counter.reset();
        assert!(rx.await.is_err());
        assert_eq!(counter.text(), "");
        assert!(!counter.is_started());

        // The abandoned task must not write over the reset display
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.value(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_frame_rate_still_settles() {
        let mut config = CountUpConfig::new(0.0, 9999.0);
        config.frame = Duration::from_millis(200);
        let counter = CountUp::new(config);

        let (tx, rx) = oneshot::channel();
        counter.start(tx);
        rx.await.unwrap();
        assert_eq!(counter.text(), "9,999");
    }

    #[tokio::test(start_paused = true)]
    async fn test_million_amount_reports_end() {
        let counter = CountUp::new(CountUpConfig::new(0.0, 1_000_000.0));

        let (tx, rx) = oneshot::channel();
        counter.start(tx);
        tokio::time::timeout(Duration::from_secs(600), rx)
            .await
            .expect("count-up should settle on a large amount")
            .unwrap();
        assert_eq!(counter.value(), 1_000_000.0);
        assert_eq!(counter.text(), "1,000,000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_down_with_delay() {
        let mut config = CountUpConfig::new(0.0, 50.0);
        config.direction = CountDirection::Down;
        config.delay = Duration::from_secs(1);
        let counter = CountUp::new(config);

        let (tx, rx) = oneshot::channel();
        counter.start(tx);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.value(), 50.0);
        assert_eq!(counter.text(), "50");

        rx.await.unwrap();
        assert_eq!(counter.value(), 0.0);
    }
}
