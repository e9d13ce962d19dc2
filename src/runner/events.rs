use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;
use tokio::sync::broadcast;

/// Run progress events for real-time output
#[derive(Debug, Clone)]
pub enum TestEvent {
    RunStarted {
        session_id: String,
        group_count: usize,
        step_count: usize,
    },
    RunFinished {
        success_count: u32,
        failure_count: u32,
        total_duration_ms: u64,
    },

    GroupStarted {
        name: String,
        step_count: usize,
    },
    /// Remaining steps of a group skipped after a failure
    GroupAbandoned {
        name: String,
        remaining: usize,
    },

    StepStarted {
        group: String,
        index: usize,
        description: String,
    },
    StepPassed {
        group: String,
        index: usize,
        duration_ms: u64,
    },
    StepFailed {
        group: String,
        index: usize,
        error: String,
        duration_ms: u64,
    },

    ReportSaved {
        path: String,
    },

    Log {
        message: String,
    },
}

/// Event emitter for broadcasting run events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    /// Send an event; dropped silently when nobody listens
    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Print events until every emitter is dropped
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let is_tty = std::io::stdout().is_terminal();
        let mut spinner: Option<(ProgressBar, String)> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Console output skipped {} events", missed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::RunStarted {
                    session_id,
                    group_count,
                    step_count,
                } => {
                    println!(
                        "\n{} Run started: {} ({} groups, {} steps)",
                        "▶".green().bold(),
                        session_id.cyan(),
                        group_count,
                        step_count
                    );
                }

                TestEvent::GroupStarted { name, step_count } => {
                    println!(
                        "\n  {} Group: {} ({} steps)",
                        "→".blue(),
                        name.white().bold(),
                        step_count
                    );
                }

                TestEvent::GroupAbandoned { name, remaining } => {
                    println!(
                        "    {} Skipping {} remaining step(s) of {}",
                        "○".yellow(),
                        remaining,
                        name
                    );
                }

                TestEvent::StepStarted { description, .. } => {
                    let pb = if is_tty {
                        ProgressBar::new_spinner()
                    } else {
                        ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
                    };
                    pb.set_style(
                        ProgressStyle::with_template("    {spinner:.cyan} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    pb.set_message(description.clone());
                    pb.enable_steady_tick(StdDuration::from_millis(80));
                    spinner = Some((pb, description));
                }

                TestEvent::StepPassed { duration_ms, .. } => {
                    if let Some((pb, description)) = spinner.take() {
                        pb.finish_and_clear();
                        println!(
                            "    {} {} {}",
                            "✓".green(),
                            description,
                            format!("({}ms)", duration_ms).dimmed()
                        );
                    }
                }

                TestEvent::StepFailed {
                    error, duration_ms, ..
                } => {
                    if let Some((pb, description)) = spinner.take() {
                        pb.finish_and_clear();
                        println!(
                            "    {} {} {}",
                            "✗".red(),
                            description,
                            format!("({}ms)", duration_ms).dimmed()
                        );
                    }
                    println!("      {}", error.red());
                }

                TestEvent::ReportSaved { path } => {
                    println!("\n{} Report saved to: {}", "📄".blue(), path.cyan());
                }

                TestEvent::RunFinished {
                    success_count,
                    failure_count,
                    total_duration_ms,
                } => {
                    println!("\n{} Run finished", "■".blue().bold());
                    println!(
                        "  {} passed, {} failed",
                        success_count.to_string().green(),
                        failure_count.to_string().red()
                    );
                    println!("  Duration: {}ms", total_duration_ms);
                }

                TestEvent::Log { message } => {
                    match &spinner {
                        Some((pb, _)) => pb.println(format!("      {}", message)),
                        None => println!("      {}", message),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_listener_is_harmless() {
        let emitter = EventEmitter::default();
        emitter.emit(TestEvent::Log {
            message: "nobody listening".into(),
        });

        let mut receiver = emitter.subscribe();
        emitter.emit(TestEvent::ReportSaved {
            path: "relatorios/r.json".into(),
        });
        match receiver.recv().await.unwrap() {
            TestEvent::ReportSaved { path } => assert_eq!(path, "relatorios/r.json"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
