//! Registration form validation. Runs before any backend call; a failure is
//! surfaced as a validation banner and nothing is submitted.

use serde::{Deserialize, Serialize};

use crate::errors::UiError;
use crate::models::user::Plan;
use crate::platform::provinces;

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

/// The form exactly as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub province: String,
    pub plan: String,
}

/// A form that passed validation, trimmed and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub province: String,
    pub plan: Plan,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<ValidRegistration, UiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("Please enter your full name."));
        }

        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err(invalid("Please enter a valid email address."));
        }

        let phone = self.phone.trim();
        if !looks_like_phone(phone) {
            return Err(invalid("Please enter a valid phone number."));
        }

        let province = self.province.trim();
        if provinces::find(province).is_none() {
            return Err(invalid("Please select your province."));
        }

        let plan = self
            .plan
            .parse::<Plan>()
            .map_err(|_| invalid("Please choose a plan."))?;

        Ok(ValidRegistration {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            province: province.to_string(),
            plan,
        })
    }
}

fn invalid(message: &str) -> UiError {
    UiError::Validation(message.to_string())
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn looks_like_phone(phone: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')');
    if phone.is_empty() || !phone.chars().all(allowed) {
        return false;
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}
