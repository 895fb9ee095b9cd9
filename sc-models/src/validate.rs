//! Input validation for every write that leaves the process.
//!
//! Callers pass already-normalized field sets; all checks report the first
//! offending field as `ScError::Validation`.

use lazy_static::lazy_static;
use regex::Regex;
use sc_core::error::{ScError, ScResult};

use crate::models::contact_message::ContactFields;
use crate::models::offering::OfferingFields;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_PRICE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 5_000;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_MESSAGE_LEN: usize = 5_000;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
}

/// Whether `email` has the shape local@domain.tld.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// Check an offering field set (title, description and price are required).
pub fn validate_offering(fields: &OfferingFields) -> ScResult<()> {
    required("title", &fields.title, MAX_TITLE_LEN)?;
    required("description", &fields.description, MAX_DESCRIPTION_LEN)?;
    required("price", &fields.price, MAX_PRICE_LEN)?;
    if let Some(ref url) = fields.image_ref {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ScError::Validation("image_url must be an http(s) URL".into()));
        }
    }
    Ok(())
}

/// Check a contact form submission.
pub fn validate_contact(fields: &ContactFields) -> ScResult<()> {
    required("name", &fields.name, MAX_NAME_LEN)?;
    required("email", &fields.email, MAX_EMAIL_LEN)?;
    if !is_valid_email(&fields.email) {
        return Err(ScError::Validation("email is not a valid address".into()));
    }
    required("message", &fields.message, MAX_MESSAGE_LEN)
}

fn required(field: &str, value: &str, max_len: usize) -> ScResult<()> {
    if value.trim().is_empty() {
        return Err(ScError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(ScError::Validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}
