/// Common types and utilities shared across handlers and services
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A numeric field as sent by the dashboard: either a JSON number or a
/// numeric string typed into a form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Parses the input as a finite `f64`. Text that does not parse, and
    /// NaN or infinite values, are rejected with an error naming `field`.
    pub fn to_f64(&self, field: &str) -> Result<f64, ServiceError> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(raw) => raw.trim().parse::<f64>().map_err(|_| invalid(field))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(field))
        }
    }

    /// Parses the input as a positive database id.
    pub fn to_id(&self, field: &str) -> Result<i32, ServiceError> {
        let value = self.to_f64(field)?;
        if value.fract() != 0.0 || value < 1.0 || value > f64::from(i32::MAX) {
            return Err(ServiceError::ValidationError(format!(
                "{} must be a positive whole number",
                field
            )));
        }
        Ok(value as i32)
    }

    pub fn to_decimal(&self, field: &str) -> Result<Decimal, ServiceError> {
        match self {
            NumericInput::Number(n) if n.is_finite() => {
                Decimal::from_f64(*n).ok_or_else(|| invalid(field))
            }
            NumericInput::Number(_) => Err(invalid(field)),
            NumericInput::Text(raw) => {
                let trimmed = raw.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .map_err(|_| invalid(field))
            }
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

fn invalid(field: &str) -> ServiceError {
    ServiceError::ValidationError(format!("{} must be a valid number", field))
}

pub fn require_positive(value: f64, field: &str) -> Result<f64, ServiceError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ServiceError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )))
    }
}

pub fn require_non_negative(value: f64, field: &str) -> Result<f64, ServiceError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )))
    }
}

pub fn require_non_negative_decimal(value: Decimal, field: &str) -> Result<Decimal, ServiceError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )))
    } else {
        Ok(value)
    }
}

/// Trims optional free-text input; blank strings become `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// JSON body extractor whose rejections render as `{ "error": ... }`.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

/// Path extractor whose rejections render as `{ "error": ... }`.
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_parse() {
        let n: NumericInput = serde_json::from_value(json!(2.5)).unwrap();
        assert_eq!(n.to_f64("width").unwrap(), 2.5);

        let int: NumericInput = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(int.to_f64("width").unwrap(), 3.0);

        let text: NumericInput = serde_json::from_value(json!(" 12.75 ")).unwrap();
        assert_eq!(text.to_f64("width").unwrap(), 12.75);
        assert_eq!(text.to_decimal("cost").unwrap(), dec!(12.75));
    }

    #[test]
    fn non_numeric_text_is_rejected_instead_of_becoming_nan() {
        for raw in ["abc", "", "NaN", "inf", "-infinity"] {
            let input = NumericInput::Text(raw.to_string());
            let err = input.to_f64("packages[0].length").unwrap_err();
            assert!(matches!(err, ServiceError::ValidationError(ref m) if m.contains("packages[0].length")));
            assert!(input.to_decimal("cost").is_err());
        }
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(NumericInput::Text("7".into()).to_id("customerId").unwrap(), 7);
        assert_eq!(NumericInput::Number(12.0).to_id("customerId").unwrap(), 12);
        assert!(NumericInput::Number(1.5).to_id("customerId").is_err());
        assert!(NumericInput::Number(0.0).to_id("customerId").is_err());
        assert!(NumericInput::Text("".into()).to_id("customerId").is_err());
    }

    #[test]
    fn sign_checks() {
        assert!(require_positive(0.0, "weight").is_err());
        assert!(require_positive(0.1, "weight").is_ok());
        assert!(require_non_negative(0.0, "amount").is_ok());
        assert!(require_non_negative(-1.0, "amount").is_err());
        assert!(require_non_negative_decimal(dec!(-0.01), "cost").is_err());
        assert!(require_non_negative_decimal(dec!(0), "cost").is_ok());
    }

    #[test]
    fn blank_optional_text_is_dropped() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" Ali ".into())), Some("Ali".into()));
        assert_eq!(clean_optional(None), None);
    }
}
