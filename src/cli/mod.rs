//! Command-line front end

pub mod cherry_pick;
pub mod context;
pub mod style;

use async_trait::async_trait;
use gh_cherry_pick::cherry_pick::{ProgressCallback, Step};
use gh_cherry_pick::error::Error;
use indicatif::ProgressBar;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use style::{Stylize, check, cross, spinner_style};

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Spinner-per-step progress display
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
    /// Print step details above the spinner
    detailed: bool,
}

impl CliProgress {
    /// One line per step
    pub const fn compact() -> Self {
        Self {
            spinner: Mutex::new(None),
            detailed: false,
        }
    }

    /// One line per step plus every detail message
    pub const fn detailed() -> Self {
        Self {
            spinner: Mutex::new(None),
            detailed: true,
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_step_started(&self, step: Step) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("{} ...", step.title()));
        spinner.enable_steady_tick(Duration::from_millis(80));

        let previous = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(spinner);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    async fn on_message(&self, message: &str) {
        if !self.detailed {
            return;
        }
        let guard = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let line = format!("  {}", message.muted());
        match guard.as_ref() {
            Some(spinner) => spinner.println(line),
            None => anstream::eprintln!("{line}"),
        }
    }

    async fn on_step_finished(&self, _step: Step, summary: &str) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_with_message(format!("{} {summary}", check()));
        }
    }

    async fn on_step_failed(&self, step: Step, _error: &Error) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_with_message(format!("{} {}", cross(), step.title().warn()));
        }
    }
}
