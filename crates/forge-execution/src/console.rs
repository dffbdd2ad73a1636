use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Default)]
struct ConsoleState {
    lines: Vec<String>,
    subscribers: Vec<mpsc::UnboundedSender<String>>,
}

/// Append-only list of status lines shared between a session and its
/// progress timer.
///
/// Cloning is cheap; every clone points at the same buffer. Subscribers
/// receive each line as it is pushed.
#[derive(Clone, Default)]
pub struct ConsoleLog {
    inner: Arc<Mutex<ConsoleState>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ConsoleState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "forge_console", "{}", line);

        let mut state = self.state();
        state
            .subscribers
            .retain(|subscriber| subscriber.send(line.clone()).is_ok());
        state.lines.push(line);
    }

    /// Returns a receiver that gets every line pushed from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<String> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state().subscribers.push(sender);
        receiver
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.state().lines.clone()
    }

    pub fn clear(&self) {
        self.state().lines.clear();
    }

    pub fn len(&self) -> usize {
        self.state().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ConsoleLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleLog")
            .field("lines", &self.len())
            .finish()
    }
}
