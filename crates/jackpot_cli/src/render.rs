//! Terminal rendering of show frames and run reports

use jackpot_core::ComponentId;
use jackpot_sequence::report::StageOutcome;
use jackpot_sequence::{SequenceReport, ShowFrame};
use std::time::Duration;

/// Frames are printed at most ten times a second whatever the tick rate
const MAX_PRINT_RATE: u32 = 10;

pub fn tick_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.clamp(1, MAX_PRINT_RATE)))
}

pub fn millis(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

pub fn timeout_label(timeout: Option<Duration>) -> String {
    timeout.map_or_else(|| "none".to_string(), millis)
}

/// One-line summary of a frame
pub fn frame_line(frame: &ShowFrame) -> String {
    let layers: Vec<String> = frame
        .opacity
        .iter()
        .map(|(id, opacity)| {
            let marker = if frame.visible.contains(id) {
                '*'
            } else if frame.eligible.contains(id) {
                '.'
            } else {
                ' '
            };
            format!("{marker}{}={opacity:.2}", short_name(*id))
        })
        .collect();

    format!(
        "[{:<8}] {:<7} amount={:>10} spin={:>5.1} landed={} {}",
        frame.phase.name(),
        frame.stage.as_deref().unwrap_or("-"),
        if frame.amount.is_empty() { "-" } else { frame.amount.as_str() },
        frame.aperture_rotation,
        frame.landed,
        layers.join(" "),
    )
}

pub fn print_frame(frame: &ShowFrame) {
    println!("{}", frame_line(frame));
}

pub fn print_report(report: &SequenceReport) {
    println!();
    println!("Sequence {} ({})", report.epoch, status(report));
    println!("-------------------------");
    for stage in &report.stages {
        let mark = match stage.outcome {
            StageOutcome::Completed => "ok",
            StageOutcome::TimedOut(_) => "timeout",
            StageOutcome::Failed(_) => "failed",
        };
        println!(
            "  {}. {:<8} {:<8} {:>8}  {}",
            stage.index,
            stage.id,
            mark,
            millis(stage.elapsed),
            stage.outcome
        );
    }
    println!("Total:        {}", millis(report.elapsed));
}

fn status(report: &SequenceReport) -> &'static str {
    if report.superseded {
        "superseded"
    } else if report.is_clean() {
        "clean"
    } else {
        "complete with warnings"
    }
}

fn short_name(id: ComponentId) -> &'static str {
    match id {
        ComponentId::Aperture => "ap",
        ComponentId::Background => "bg",
        ComponentId::Dice => "dc",
        ComponentId::Lottie => "lt",
        ComponentId::Amount => "am",
        ComponentId::Projectile => "pj",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_is_capped() {
        assert_eq!(tick_interval(60), Duration::from_millis(100));
        assert_eq!(tick_interval(5), Duration::from_millis(200));
        assert_eq!(tick_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn test_timeout_label() {
        assert_eq!(timeout_label(Some(Duration::from_secs(2))), "2000ms");
        assert_eq!(timeout_label(None), "none");
    }
}
