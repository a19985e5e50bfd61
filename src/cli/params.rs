//! Raw query parameter validation.
//!
//! Turns untrusted text into the validated facets of a [`Query`]. A missing
//! or empty parameter becomes the facet's absent sentinel.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::CliError;
use crate::model::Query;

/// Make or model text; empty means absent.
pub fn parse_name(raw: Option<&str>) -> String {
    raw.unwrap_or_default().to_string()
}

/// Non-negative budget. Scientific notation is accepted.
///
/// # Examples
///
/// ```
/// use carserv::cli::params::parse_budget;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_budget(Some("40000")).unwrap(), Decimal::from(40000));
/// assert_eq!(parse_budget(None).unwrap(), Decimal::ZERO);
/// assert!(parse_budget(Some("-1")).is_err());
/// assert!(parse_budget(Some("cheap")).is_err());
/// ```
pub fn parse_budget(raw: Option<&str>) -> Result<Decimal, CliError> {
    let Some(text) = present(raw) else {
        return Ok(Decimal::ZERO);
    };
    let budget = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| CliError::InvalidParam {
            name: "budget",
            message: format!("invalid number '{}': {}", text, e),
        })?;
    if budget < Decimal::ZERO {
        return Err(CliError::InvalidParam {
            name: "budget",
            message: format!("budget must be a positive number: {}", budget),
        });
    }
    Ok(budget)
}

/// Non-negative model year.
pub fn parse_year(raw: Option<&str>) -> Result<u32, CliError> {
    let Some(text) = present(raw) else {
        return Ok(0);
    };
    let year: i64 = text.parse().map_err(|e| CliError::InvalidParam {
        name: "year",
        message: format!("invalid integer '{}': {}", text, e),
    })?;
    if year < 0 {
        return Err(CliError::InvalidParam {
            name: "year",
            message: format!("year must be a positive number: {}", year),
        });
    }
    u32::try_from(year).map_err(|_| CliError::InvalidParam {
        name: "year",
        message: format!("year out of range: {}", year),
    })
}

/// Builds a [`Query`] from raw text parameters.
pub fn build_query(
    make: Option<&str>,
    model: Option<&str>,
    budget: Option<&str>,
    year: Option<&str>,
) -> Result<Query, CliError> {
    Ok(Query {
        make: parse_name(make),
        model: parse_name(model),
        budget: parse_budget(budget)?,
        year: parse_year(year)?,
    })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[test]
fn test_negative_year_message() {
    let err = parse_year(Some("-2020")).unwrap_err();
    assert_eq!(err.to_string(), "Invalid year: year must be a positive number: -2020");
}

#[test]
fn test_blank_params_are_absent() {
    let query = build_query(Some(""), None, Some("  "), Some("")).unwrap();
    assert!(query.is_empty());
}
