// storefront/src/validation.rs

//! Input checks for cart and checkout requests. Each check reports the first
//! violated field only.

use crate::errors::{AppError, Result};
use crate::models::cart_item::{MAX_CART_QUANTITY, MIN_CART_QUANTITY};
use crate::models::ShippingAddress;

pub const NAME_MAX: usize = 50;
pub const PHONE_MAX: usize = 20;
pub const POSTAL_CODE_MAX: usize = 10;
pub const ADDRESS_MAX: usize = 200;
pub const ADDRESS_DETAIL_MAX: usize = 200;
pub const ORDER_NOTE_MAX: usize = 500;

pub fn validate_cart_quantity(quantity: i32) -> Result<()> {
  if quantity < MIN_CART_QUANTITY {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  if quantity > MAX_CART_QUANTITY {
    return Err(AppError::Validation(format!(
      "Quantity must be at most {}.",
      MAX_CART_QUANTITY
    )));
  }
  Ok(())
}

/// Blank means missing; the length limit applies to the value as stored.
fn required(field: &str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(AppError::Validation(format!("{} is required.", field)));
  }
  if value.chars().count() > max {
    return Err(AppError::Validation(format!(
      "{} must be at most {} characters.",
      field, max
    )));
  }
  Ok(())
}

fn digits_and_hyphens(field: &str, value: &str) -> Result<()> {
  if value.chars().all(|c| c.is_ascii_digit() || c == '-') {
    Ok(())
  } else {
    Err(AppError::Validation(format!(
      "{} may only contain digits and hyphens.",
      field
    )))
  }
}

fn at_most(field: &str, value: Option<&str>, max: usize) -> Result<()> {
  match value {
    Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
      "{} must be at most {} characters.",
      field, max
    ))),
    _ => Ok(()),
  }
}

/// Checks, in order: name, phone, postal code, address, address detail, note.
pub fn validate_checkout(address: &ShippingAddress, note: Option<&str>) -> Result<()> {
  required("Recipient name", &address.name, NAME_MAX)?;
  required("Phone", &address.phone, PHONE_MAX)?;
  digits_and_hyphens("Phone", &address.phone)?;
  required("Postal code", &address.postal_code, POSTAL_CODE_MAX)?;
  digits_and_hyphens("Postal code", &address.postal_code)?;
  required("Address", &address.address, ADDRESS_MAX)?;
  at_most("Address detail", address.address_detail.as_deref(), ADDRESS_DETAIL_MAX)?;
  at_most("Order note", note, ORDER_NOTE_MAX)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn address() -> ShippingAddress {
    ShippingAddress {
      name: "Hong Gildong".to_string(),
      phone: "010-1234-5678".to_string(),
      postal_code: "04524".to_string(),
      address: "1 Sejong-daero, Jung-gu, Seoul".to_string(),
      address_detail: Some("Apt 101".to_string()),
    }
  }

  fn message(result: Result<()>) -> String {
    match result {
      Err(AppError::Validation(m)) => m,
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn valid_address_passes() {
    assert!(validate_checkout(&address(), Some("Leave at the door")).is_ok());
    assert!(validate_checkout(&address(), None).is_ok());
  }

  #[test]
  fn first_violation_wins() {
    let mut addr = address();
    addr.name = String::new();
    addr.phone = "abc".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Recipient name"));
  }

  #[test]
  fn phone_and_postal_code_are_digits_and_hyphens() {
    let mut addr = address();
    addr.phone = "+82 10 1234".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Phone"));

    let mut addr = address();
    addr.postal_code = "AB-12".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Postal code"));
  }

  #[test]
  fn padded_phone_and_postal_code_are_rejected() {
    let mut addr = address();
    addr.phone = "  010-1234  ".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Phone"));

    let mut addr = address();
    addr.postal_code = " 04524".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Postal code"));

    let mut addr = address();
    addr.name = "   ".to_string();
    assert!(message(validate_checkout(&addr, None)).starts_with("Recipient name is required"));
  }

  #[test]
  fn length_limits_count_characters() {
    let mut addr = address();
    addr.name = "가".repeat(NAME_MAX);
    assert!(validate_checkout(&addr, None).is_ok());
    addr.name = "가".repeat(NAME_MAX + 1);
    assert!(message(validate_checkout(&addr, None)).contains("at most 50"));

    addr.name = format!("{}{}", "n".repeat(NAME_MAX), " ".repeat(30));
    assert!(message(validate_checkout(&addr, None)).contains("at most 50"));

    let long_note = "n".repeat(ORDER_NOTE_MAX + 1);
    assert!(message(validate_checkout(&address(), Some(&long_note))).starts_with("Order note"));
  }

  #[test]
  fn cart_quantity_bounds() {
    assert!(validate_cart_quantity(0).is_err());
    assert!(validate_cart_quantity(-3).is_err());
    assert!(validate_cart_quantity(1).is_ok());
    assert!(validate_cart_quantity(999).is_ok());
    assert!(validate_cart_quantity(1000).is_err());
  }
}
