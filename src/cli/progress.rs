//! Research Progress Rendering
//!
//! Turns broadcast research events into terminal lines.

use console::style;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::research::ResearchEvent;

pub struct ConsoleRenderer {
    receiver: broadcast::Receiver<ResearchEvent>,
    show_bar: bool,
}

impl ConsoleRenderer {
    pub fn new(receiver: broadcast::Receiver<ResearchEvent>) -> Self {
        Self {
            receiver,
            show_bar: true,
        }
    }

    pub fn with_bar(mut self, show: bool) -> Self {
        self.show_bar = show;
        self
    }

    /// Print events until the batch finishes or the sender goes away
    pub fn start_render_loop(mut self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.receiver.recv().await {
                    Ok(event) => {
                        let finished = matches!(event, ResearchEvent::BatchFinished { .. });
                        if let Some(line) = render_event(&event, self.show_bar) {
                            println!("{}", line);
                        }
                        if finished {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Progress renderer skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// One terminal line for an event, if it deserves one
pub fn render_event(event: &ResearchEvent, show_bar: bool) -> Option<String> {
    match event {
        ResearchEvent::BatchStarted { total, provider } => Some(format!(
            "{} Researching {} package{} with {}",
            style("▶").cyan(),
            total,
            if *total == 1 { "" } else { "s" },
            style(provider).bold()
        )),
        ResearchEvent::Analyzing {
            position,
            total,
            key,
        } => {
            let bar = if show_bar {
                format!("{} ", render_progress_bar(position - 1, *total, 20))
            } else {
                String::new()
            };
            Some(format!(
                "  {}{} {}",
                bar,
                style(event.status_label().unwrap_or_default()).dim(),
                key
            ))
        }
        ResearchEvent::Analyzed { key, failed, .. } => {
            let mark = if *failed {
                style("✗").red()
            } else {
                style("✓").green()
            };
            Some(format!(
                "  {} {} {}",
                mark,
                key,
                style(event.status_label().unwrap_or_default()).dim()
            ))
        }
        ResearchEvent::Skipped { key } => {
            Some(format!("  {} {} skipped", style("-").yellow(), key))
        }
        ResearchEvent::Discarded { key } => Some(format!(
            "  {} {} discarded after cancellation",
            style("-").yellow(),
            key
        )),
        ResearchEvent::BatchFinished { .. } => None,
    }
}

/// Render a simple progress bar
fn render_progress_bar(completed: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }

    let progress = (completed as f32 / total as f32).min(1.0);
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::{BatchSummary, ProgressReporter};

    #[test]
    fn test_progress_bar_render() {
        assert_eq!(render_progress_bar(0, 10, 10), "[░░░░░░░░░░]");
        assert_eq!(render_progress_bar(5, 10, 10), "[█████░░░░░]");
        assert_eq!(render_progress_bar(10, 10, 10), "[██████████]");
        assert_eq!(render_progress_bar(0, 0, 4), "[    ]");
    }

    #[test]
    fn test_render_analyzing_line() {
        console::set_colors_enabled(false);
        let line = render_event(
            &ResearchEvent::Analyzing {
                position: 3,
                total: 4,
                key: "Git".to_string(),
            },
            false,
        )
        .unwrap();
        assert_eq!(line, "  Analyzing (3/4) Git");
    }

    #[test]
    fn test_finished_event_has_no_line() {
        let event = ResearchEvent::BatchFinished {
            summary: BatchSummary::default(),
        };
        assert!(render_event(&event, true).is_none());
    }

    #[tokio::test]
    async fn test_render_loop_stops_on_finish() {
        let reporter = ProgressReporter::new();
        let handle = ConsoleRenderer::new(reporter.subscribe())
            .with_bar(false)
            .start_render_loop();

        reporter.emit(ResearchEvent::Skipped {
            key: "A".to_string(),
        });
        reporter.emit(ResearchEvent::BatchFinished {
            summary: BatchSummary::default(),
        });

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
