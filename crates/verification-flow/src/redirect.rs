//! Deferred navigation after a successful verification

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Delay between a successful verification and the jump to the login page.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(3000);

/// Where to go, and how long to wait first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
    pub delay: Duration,
}

impl Redirect {
    pub fn to_login(login_path: impl Into<String>) -> Self {
        Self {
            target: login_path.into(),
            delay: REDIRECT_DELAY,
        }
    }
}

/// Performs the actual navigation.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, target: &str);
}

/// Forwards navigation targets over a channel.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, target: &str) {
        // Receiver gone means nobody is looking at the page any more.
        let _ = self.tx.send(target.to_string());
    }
}

/// A single scheduled navigation. Dropping the timer cancels it.
pub struct RedirectTimer {
    redirect: Redirect,
    handle: JoinHandle<()>,
}

impl RedirectTimer {
    /// Schedule `redirect`. The deadline is fixed now, not when the task
    /// first gets polled.
    pub fn schedule(redirect: Redirect, navigator: Arc<dyn Navigator>) -> Self {
        let deadline = Instant::now() + redirect.delay;
        let target = redirect.target.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            debug!("Redirecting to {}", target);
            navigator.navigate(&target);
        });

        Self { redirect, handle }
    }

    pub fn redirect(&self) -> &Redirect {
        &self.redirect
    }

    /// Whether the navigation already happened (or the timer was aborted)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RedirectTimer {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Cancelling pending redirect to {}", self.redirect.target);
        }
        self.handle.abort();
    }
}
