use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner showing which instance is being processed.
///
/// Without a terminal (cron, Docker) it stays hidden and progress goes to the log.
pub struct SyncUI {
    spinner: ProgressBar,
    interactive: bool,
}

impl SyncUI {
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && is_interactive();
        let spinner = if interactive {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress spinner disabled"
            );
            ProgressBar::hidden()
        };

        Self { spinner, interactive }
    }

    pub fn start_instance(&self, position: usize, total: usize, name: &str) {
        let msg = format!("[{}/{}] Syncing labels for {}", position, total, name);
        if self.interactive {
            self.spinner.set_message(msg);
        } else {
            tracing::info!(operation = "progress", current = position, total = total, instance = name, "{}", msg);
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
