//! Email verification flow
//!
//! Drives what the user sees after clicking an email-verification link:
//!
//! - no token in the link: fail immediately, no request
//! - token present: one `GET <endpoint>?token=...`
//! - accepted: success message, then navigate to login after 3 seconds
//! - rejected: the server's reason, or a generic fallback
//!
//! The outcome is a [`VerificationAttempt`](guildgate_common::VerificationAttempt)
//! whose status never moves backwards.

pub mod client;
pub mod flow;
pub mod redirect;

pub use client::{HttpVerificationClient, VerificationApi};
pub use flow::{VerificationFlow, SUCCESS_MESSAGE};
pub use redirect::{ChannelNavigator, Navigator, Redirect, RedirectTimer, REDIRECT_DELAY};
