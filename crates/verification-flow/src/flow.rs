//! Verification flow controller
//!
//! Owns one [`VerificationAttempt`] per distinct token. Activating the flow
//! again with the token it already processed is a no-op, so a re-rendered
//! page never re-issues the request.

use guildgate_common::{Error, VerificationAttempt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::VerificationApi;
use crate::redirect::{Navigator, Redirect, RedirectTimer};

/// Shown once the endpoint accepts the token.
pub const SUCCESS_MESSAGE: &str = "Your email has been verified! Redirecting to login...";

pub struct VerificationFlow {
    api: Arc<dyn VerificationApi>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,

    /// `None` until the first activation; afterwards the token it saw.
    last_token: Option<Option<String>>,
    attempt: VerificationAttempt,
    redirect: Option<Redirect>,
    timer: Option<RedirectTimer>,
}

impl VerificationFlow {
    pub fn new(api: Arc<dyn VerificationApi>, login_path: impl Into<String>) -> Self {
        Self {
            api,
            navigator: None,
            login_path: login_path.into(),
            last_token: None,
            attempt: VerificationAttempt::new(None),
            redirect: None,
            timer: None,
        }
    }

    /// Navigate through `navigator` once the success delay has elapsed.
    /// Without one, the redirect is only exposed via [`Self::redirect`].
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Run the flow for the token found in the page's query string.
    ///
    /// An empty token counts as absent.
    pub async fn activate(&mut self, token: Option<&str>) -> &VerificationAttempt {
        let token = token.filter(|t| !t.is_empty());

        if let Some(seen) = &self.last_token {
            if seen.as_deref() == token {
                debug!("Token already processed, skipping verification");
                return &self.attempt;
            }
        }

        self.last_token = Some(token.map(str::to_string));
        self.attempt = VerificationAttempt::new(token.map(str::to_string));
        self.redirect = None;
        self.timer = None;

        let Some(token) = token else {
            warn!("Verification link carries no token");
            self.attempt.mark_failed(&Error::MissingToken);
            return &self.attempt;
        };

        match self.api.verify(token).await {
            Ok(()) => {
                info!("Email verified");
                self.attempt.mark_success(SUCCESS_MESSAGE);

                let redirect = Redirect::to_login(self.login_path.clone());
                if let Some(navigator) = &self.navigator {
                    self.timer = Some(RedirectTimer::schedule(redirect.clone(), navigator.clone()));
                }
                self.redirect = Some(redirect);
            }
            Err(e) => {
                info!("Email verification failed: {}", e);
                self.attempt.mark_failed(&e);
            }
        }

        &self.attempt
    }

    pub fn attempt(&self) -> &VerificationAttempt {
        &self.attempt
    }

    /// Redirect scheduled by the last successful attempt
    pub fn redirect(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    /// Path the error state links back to
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Tear the flow down, cancelling any redirect that has not fired yet.
    pub fn teardown(mut self) {
        self.timer.take();
    }
}
