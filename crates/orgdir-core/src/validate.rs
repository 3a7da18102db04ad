//! Field validation shared by all create operations.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

pub const ACTIVITY_NAME_MAX: usize = 100;
pub const BUILDING_ADDRESS_MAX: usize = 255;
pub const ORGANIZATION_NAME_MAX: usize = 150;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(?:8-\d{3}|\d)-\d{3}-\d{3}(?:-\d{2}-\d{2})?$").expect("valid phone regex")
});

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::EmptyField { field });
  }
  if value.chars().count() > max {
    return Err(Error::FieldTooLong { field, max });
  }
  Ok(())
}

pub fn activity_name(name: &str) -> Result<()> {
  bounded_text("name", name, ACTIVITY_NAME_MAX)
}

pub fn building_address(address: &str) -> Result<()> {
  bounded_text("address", address, BUILDING_ADDRESS_MAX)
}

pub fn organization_name(name: &str) -> Result<()> {
  bounded_text("name", name, ORGANIZATION_NAME_MAX)
}

/// Accepts `8-XXX-XXX-XXX[-XX-XX]` and `X-XXX-XXX[-XX-XX]`.
pub fn phone(number: &str) -> Result<()> {
  if PHONE_RE.is_match(number) {
    Ok(())
  } else {
    Err(Error::InvalidPhone(number.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_known_phone_shapes() {
    for p in ["8-900-999-00-11", "8-923-666-13-13", "2-222-222", "3-333-333-33-33"] {
      assert!(phone(p).is_ok(), "{p}");
    }
  }

  #[test]
  fn rejects_malformed_phones() {
    for p in ["", "89009990011", "8-900-99", "+7-900-999-00-11", "8-900-999-00-11x"] {
      assert!(matches!(phone(p), Err(Error::InvalidPhone(_))), "{p}");
    }
  }

  #[test]
  fn names_must_be_non_blank() {
    assert!(matches!(activity_name("   "), Err(Error::EmptyField { .. })));
    assert!(activity_name("Еда").is_ok());
  }

  #[test]
  fn length_limit_counts_characters_not_bytes() {
    let cyrillic = "я".repeat(ACTIVITY_NAME_MAX);
    assert!(activity_name(&cyrillic).is_ok());
    let too_long = "я".repeat(ACTIVITY_NAME_MAX + 1);
    assert!(matches!(
      activity_name(&too_long),
      Err(Error::FieldTooLong { max: ACTIVITY_NAME_MAX, .. })
    ));
  }
}
