use std::time::Duration;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use crate::pipeline::events::ScanEvent;
use crate::utils::formatting::format_duration;
use super::status::format_result_line;

/// Renders orchestrator events: a bar over the candidate list plus one
/// status line per result.
pub struct ScanProgress {
    bar: ProgressBar,
    exposed: usize,
}

impl ScanProgress {
    /// `show_bar` is off for interactive runs so prompts are not redrawn over.
    pub fn new(show_bar: bool) -> Self {
        let bar = if show_bar {
            ProgressBar::new(0)
        } else {
            ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden())
        };
        let bar_style = ProgressStyle::default_bar()
            .template("  {spinner:.cyan} {bar:30.yellow/dark_gray} {pos}/{len} candidates | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(bar_style);
        Self { bar, exposed: 0 }
    }

    pub fn handle_event(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::ScanStarted { target, candidates, .. } => {
                self.bar.set_length(*candidates as u64);
                self.bar.set_message(format!("Scanning {}", target));
                self.bar.enable_steady_tick(Duration::from_millis(120));
                self.println(&format!(
                    "  {} {} candidate(s) for {}",
                    style("\u{25b6}").cyan(),
                    candidates,
                    style(target).bold(),
                ));
            }
            ScanEvent::CandidateStarted { candidate } => {
                self.bar.set_message(candidate.to_string());
            }
            ScanEvent::ResultRecorded { result } => {
                if result.is_exposed() {
                    self.exposed += 1;
                }
                self.println(&format_result_line(result));
                self.bar.inc(1);
            }
            ScanEvent::ScanCompleted { duration_ms, interrupted } => {
                let msg = format!(
                    "{} in {} | {} real IP(s)",
                    if *interrupted { "Stopped" } else { "Done" },
                    format_duration(*duration_ms),
                    self.exposed,
                );
                if *interrupted {
                    self.bar.abandon_with_message(msg);
                } else {
                    self.bar.finish_with_message(msg);
                }
            }
        }
    }

    /// Print above the bar, or plainly when the bar is hidden.
    pub fn println(&self, msg: &str) {
        if self.bar.is_hidden() {
            println!("{}", msg);
        } else {
            self.bar.println(msg);
        }
    }
}
