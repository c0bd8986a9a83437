//! Newsletter signup form. Write-only side effect, unrelated to selection.

use lone_star_ledger_client::{ClientError, DataService};
use lone_star_ledger_models::NewsletterSignup;

use crate::ValidationRejection;

/// Pending email address for the newsletter signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsletterForm {
    email: String,
}

impl NewsletterForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending address.
    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    /// The pending address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Posts the signup. Returns whether the service accepted it.
    ///
    /// The address is cleared once the service has answered, accepted or
    /// not. It is kept when the address is refused locally or the service
    /// could not be reached.
    pub async fn submit(&mut self, service: &dyn DataService) -> bool {
        let email = self.email.trim();
        if !is_plausible_email(email) {
            log::debug!(
                "Not submitting signup: {}",
                ValidationRejection::InvalidEmail {
                    input: email.to_string()
                }
            );
            return false;
        }

        let signup = NewsletterSignup {
            email: email.to_string(),
        };
        match service.subscribe_newsletter(&signup).await {
            Ok(()) => {
                log::info!("Subscribed {} to the newsletter", signup.email);
                self.email.clear();
                true
            }
            Err(e @ ClientError::Status { .. }) => {
                log::error!("Newsletter signup rejected: {e}");
                self.email.clear();
                false
            }
            Err(e) => {
                log::error!("Newsletter signup failed: {e}");
                false
            }
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
