//! Contact form. Delivery is simulated: the submission is logged after a
//! configurable delay.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ContactError::Missing(field));
            }
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(())
    }
}

/// One `@`, non-empty local part, and a dot inside the domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Validate, wait `delay`, then report success.
pub async fn submit(form: &ContactForm, delay: Duration) -> Result<(), ContactError> {
    form.validate()?;
    tokio::time::sleep(delay).await;
    info!(
        from = %form.email.trim(),
        subject = %form.subject.trim(),
        message_len = form.message.len(),
        "contact form submitted"
    );
    Ok(())
}
