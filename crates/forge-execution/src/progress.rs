use crate::console::ConsoleLog;
use forge_core::config::ProgressConfig;
use forge_core::project::{ProjectConfig, join_stacks};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Lines appended once the real backend call has returned successfully.
pub const SUCCESS_STEPS: [&str; 3] = [
    "[SUCCESS] Response received.",
    "[INFO] Validating markdown structure...",
    "[INFO] Finalizing output...",
];

/// Builds the scripted status lines for a generation request.
///
/// One `[STACK]` line per selected stack, framed by fixed lines describing
/// the project, the constraint count and the tone.
pub fn simulation_steps(config: &ProjectConfig) -> Vec<String> {
    let name = if config.name.trim().is_empty() {
        "Untitled"
    } else {
        config.name.as_str()
    };

    let mut steps = vec![
        format!("[INFO] Starting compile job for project: \"{name}\""),
        format!(
            "[CTX] Parsing description ({} chars)...",
            config.description.chars().count()
        ),
    ];
    steps.extend(
        config
            .selected_stacks
            .iter()
            .map(|stack| format!("[STACK] Loading definitions for {stack}...")),
    );
    steps.push("[WARN] Checking constraint compatibility...".to_string());
    steps.push(format!(
        "[INFO] {} active constraints applied.",
        config.active_constraints().count()
    ));
    steps.push(format!("[INFO] Tone setting: {}", config.tone));
    steps.push("[REQ] Initiating handshake with Gemini API...".to_string());
    steps.push("[NET] Sending payload (approx. 4kb)...".to_string());
    steps.push("[WAIT] Awaiting token stream...".to_string());

    tracing::trace!(
        "[Progress] Built {} steps for stacks [{}]",
        steps.len(),
        join_stacks(&config.selected_stacks)
    );
    steps
}

/// Starts cosmetic timers that replay status lines at a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(config.interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns a timer that pushes one step into `log` per interval.
    ///
    /// The first line appears one interval after the call. The timer ends on
    /// its own once every step has been emitted. Must be called from within
    /// a Tokio runtime.
    pub fn start(&self, steps: Vec<String>, log: ConsoleLog) -> ProgressHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            for step in steps {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        tracing::debug!("[Progress] Timer cancelled");
                        return;
                    }
                    _ = ticker.tick() => log.push(step),
                }
            }
            tracing::debug!("[Progress] All steps emitted");
        });

        ProgressHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owner's handle on a running progress timer.
///
/// Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct ProgressHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True while the timer may still emit lines.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .task
                .as_ref()
                .is_some_and(|task| !task.is_finished())
    }

    /// Waits until the timer has stopped, either by cancellation or by
    /// running out of steps.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("[Progress] Timer task failed: {}", e);
            }
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Holds at most one running timer.
///
/// Installing a new timer cancels the previous one first, so lines from two
/// requests never interleave.
#[derive(Debug, Default)]
pub struct ProgressSlot {
    current: Option<ProgressHandle>,
}

impl ProgressSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handle` and returns the previous (now cancelled) handle.
    pub fn replace(&mut self, handle: ProgressHandle) -> Option<ProgressHandle> {
        let previous = self.current.take();
        if let Some(previous) = &previous {
            previous.cancel();
            tracing::debug!("[Progress] Superseded running timer");
        }
        self.current = Some(handle);
        previous
    }

    /// Cancels and releases the current timer. Returns whether one was held.
    pub fn stop(&mut self) -> bool {
        match self.current.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(ProgressHandle::is_active)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
