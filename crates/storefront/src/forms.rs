//! HTML form payloads and their validation.
//!
//! Each form deserializes from the raw request (so a failed submission can be
//! re-rendered with what the user typed) and exposes a `clean` method that
//! turns it into validated domain input or a [`FieldErrors`] map. Length
//! rules come from `validator`; typed fields (price, SKU, ids) are parsed by
//! hand with the core newtypes.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use chrono::{DateTime, Utc};

use corner_store_core::{CategoryId, OrderId, Price, Sku};

use crate::models::{NewCategory, NewPayment, NewProduct, NewShipment, ProfileUpdate};

const REQUIRED: &str = "This field is required.";

/// Field name to error messages, in field order for stable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with a single message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// First message for a field, for inline display next to the input.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                out.add(&field, message);
            }
        }
        out
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Run the derived validators, collecting messages into `errors`.
fn collect(form: &impl Validate, errors: &mut FieldErrors) {
    if let Err(e) = form.validate() {
        for (field, messages) in FieldErrors::from(e).0 {
            for message in messages {
                errors.add(&field, message);
            }
        }
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Check that both fields were filled in.
    ///
    /// # Errors
    ///
    /// Returns field errors for missing or over-long values.
    pub fn clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        collect(self, &mut errors);
        errors.into_result()
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryForm {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    /// Validate into a [`NewCategory`]. Name uniqueness is checked by the store.
    ///
    /// # Errors
    ///
    /// Returns field errors when the name is blank or too long.
    pub fn clean(&self) -> Result<NewCategory, FieldErrors> {
        let trimmed = Self {
            name: self.name.trim().to_owned(),
            description: self.description.clone(),
        };

        let mut errors = FieldErrors::new();
        if trimmed.name.is_empty() {
            errors.add("name", REQUIRED);
        }
        collect(&trimmed, &mut errors);
        errors.into_result()?;

        Ok(NewCategory {
            name: trimmed.name,
            description: blank_to_none(&trimmed.description),
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product form fields. The image travels separately as a multipart file.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductForm {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category: String,
}

impl ProductForm {
    /// Pre-fill the form from an existing product, for the edit page.
    #[must_use]
    pub fn from_product(product: &crate::models::Product) -> Self {
        Self {
            sku: product.sku.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            stock: product.stock.to_string(),
            category: product.category_id.to_string(),
        }
    }

    /// Validate into a [`NewProduct`] with the given stored image path.
    ///
    /// SKU uniqueness and category existence are checked by the catalog
    /// service, which owns the store.
    ///
    /// # Errors
    ///
    /// Returns field errors for every field that fails to parse.
    pub fn clean(&self, image: Option<String>) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();

        let sku = match Sku::parse(&self.sku) {
            Ok(sku) => Some(sku),
            Err(corner_store_core::SkuError::Empty) => {
                errors.add("sku", REQUIRED);
                None
            }
            Err(e) => {
                errors.add("sku", capitalize(&e.to_string()));
                None
            }
        };

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        }
        collect(self, &mut errors);

        let description = self.description.trim().to_owned();
        if description.is_empty() {
            errors.add("description", REQUIRED);
        }

        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(corner_store_core::PriceError::Empty) => {
                errors.add("price", REQUIRED);
                None
            }
            Err(e) => {
                errors.add("price", capitalize(&e.to_string()));
                None
            }
        };

        let stock = match self.stock.trim() {
            "" => {
                errors.add("stock", REQUIRED);
                None
            }
            raw => match raw.parse::<i32>() {
                Ok(n) if n >= 0 => u32::try_from(n).ok(),
                Ok(_) => {
                    errors.add("stock", "Ensure this value is greater than or equal to 0.");
                    None
                }
                Err(_) => {
                    errors.add("stock", "Enter a whole number.");
                    None
                }
            },
        };

        let category_id = match self.category.trim() {
            "" => {
                errors.add("category", REQUIRED);
                None
            }
            raw => raw.parse::<CategoryId>().ok().or_else(|| {
                errors.add("category", INVALID_CHOICE);
                None
            }),
        };

        match (sku, price, stock, category_id) {
            (Some(sku), Some(price), Some(stock), Some(category_id)) if errors.is_empty() => {
                Ok(NewProduct {
                    sku,
                    name,
                    description,
                    price,
                    stock,
                    category_id,
                    image,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Message for a category id that does not exist.
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut out: String = first.to_uppercase().collect();
        out.push_str(chars.as_str());
        out.push('.');
        out
    })
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(
        length(max = 15, message = "Ensure this value has at most 15 characters."),
        custom(function = "validate_phone")
    )]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some("Enter a valid phone number.".into());
    Err(err)
}

impl ProfileForm {
    /// Pre-fill the form from a stored profile.
    #[must_use]
    pub fn from_customer(customer: &crate::models::Customer) -> Self {
        Self {
            phone: customer.phone.clone().unwrap_or_default(),
            address: customer.address.clone(),
        }
    }

    /// Validate into a [`ProfileUpdate`]. A blank phone clears it.
    ///
    /// # Errors
    ///
    /// Returns field errors for an over-long or malformed phone number.
    pub fn clean(&self) -> Result<ProfileUpdate, FieldErrors> {
        let trimmed = Self {
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
        };

        let mut errors = FieldErrors::new();
        collect(&trimmed, &mut errors);
        errors.into_result()?;

        Ok(ProfileUpdate {
            phone: blank_to_none(&trimmed.phone),
            address: trimmed.address,
        })
    }
}

// =============================================================================
// Payment & shipment (administrative)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PaymentForm {
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub payment_method: String,
    #[serde(default)]
    pub amount: String,
}

impl PaymentForm {
    /// Validate into a [`NewPayment`] against `order_id`.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank method or a bad amount.
    pub fn clean(&self, order_id: OrderId) -> Result<NewPayment, FieldErrors> {
        let trimmed = Self {
            payment_method: self.payment_method.trim().to_owned(),
            amount: self.amount.clone(),
        };

        let mut errors = FieldErrors::new();
        if trimmed.payment_method.is_empty() {
            errors.add("payment_method", REQUIRED);
        }
        collect(&trimmed, &mut errors);

        let amount = match Price::parse(&trimmed.amount) {
            Ok(amount) => Some(amount),
            Err(corner_store_core::PriceError::Empty) => {
                errors.add("amount", REQUIRED);
                None
            }
            Err(e) => {
                errors.add("amount", capitalize(&e.to_string()));
                None
            }
        };

        match amount {
            Some(amount) if errors.is_empty() => Ok(NewPayment {
                order_id,
                payment_method: trimmed.payment_method,
                amount,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ShipmentForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub state: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub country: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "Ensure this value has at most 10 characters."))]
    pub zip_code: String,
}

impl ShipmentForm {
    /// Validate into a [`NewShipment`]. The order is optional.
    ///
    /// # Errors
    ///
    /// Returns field errors for blank or over-long address parts.
    pub fn clean(
        &self,
        order_id: Option<OrderId>,
        shipment_date: DateTime<Utc>,
    ) -> Result<NewShipment, FieldErrors> {
        let trimmed = Self {
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            country: self.country.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
        };

        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("address", &trimmed.address),
            ("city", &trimmed.city),
            ("state", &trimmed.state),
            ("country", &trimmed.country),
            ("zip_code", &trimmed.zip_code),
        ] {
            if value.is_empty() {
                errors.add(field, REQUIRED);
            }
        }
        collect(&trimmed, &mut errors);
        errors.into_result()?;

        Ok(NewShipment {
            order_id,
            shipment_date,
            address: trimmed.address,
            city: trimmed.city,
            state: trimmed.state,
            country: trimmed.country,
            zip_code: trimmed.zip_code,
        })
    }
}
