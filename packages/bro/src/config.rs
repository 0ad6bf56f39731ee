//! Configuration constants and validation functions for the BRO client.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{BroError, Result};

/// Base URL of the public BRO CPT service.
pub const BRO_CPT_BASE_URL: &str = "https://publiek.broservices.nl/sr/cpt/v1";

/// HTTP timeout in seconds.
///
/// Characteristics searches over large areas can take a while to assemble
/// server side.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Reference sent along with every request so BRO can attribute traffic.
pub const REQUEST_REFERENCE: &str = concat!("Requested-with-bro-v", env!("CARGO_PKG_VERSION"));

/// Earliest registration date the BRO holds records for.
pub const MIN_BEGIN_DATE: &str = "2015-01-01";

/// BRO CPT ID pattern: CPT followed by 12 digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BRO_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CPT\d{12}$").expect("valid regex"));

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate a BRO CPT identifier.
///
/// # Examples
/// ```
/// use bro::config::validate_bro_id;
///
/// assert!(validate_bro_id("CPT000000053405").is_ok());
/// assert!(validate_bro_id("BHR000000053405").is_err());
/// ```
pub fn validate_bro_id(bro_id: &str) -> Result<()> {
    if BRO_ID_PATTERN.is_match(bro_id) {
        Ok(())
    } else {
        Err(BroError::InvalidBroId(bro_id.to_string()))
    }
}

/// Validate a date string (YYYY-MM-DD) and return it parsed.
///
/// Dates before [`MIN_BEGIN_DATE`] are rejected since the registry has no
/// records that old.
///
/// # Examples
/// ```
/// use bro::config::validate_date;
///
/// assert!(validate_date("2023-03-03").is_ok());
/// assert!(validate_date("2014-12-31").is_err());
/// assert!(validate_date("2023-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(BroError::InvalidDate(date_str.to_string()));
    }

    let parsed = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| BroError::InvalidDate(date_str.to_string()))?;

    let minimum = NaiveDate::parse_from_str(MIN_BEGIN_DATE, "%Y-%m-%d")
        .map_err(|_| BroError::InvalidDate(MIN_BEGIN_DATE.to_string()))?;
    if parsed < minimum {
        return Err(BroError::InvalidDate(date_str.to_string()));
    }

    Ok(parsed)
}

/// Validate both ends of a registration period and their order.
pub fn validate_date_range(begin_date: &str, end_date: &str) -> Result<()> {
    let begin = validate_date(begin_date)?;
    let end = validate_date(end_date)?;
    if begin > end {
        return Err(BroError::InvalidDateRange {
            begin: begin_date.to_string(),
            end: end_date.to_string(),
        });
    }
    Ok(())
}

/// Build the characteristics search URL.
///
/// The request reference is appended as a query parameter by the HTTP layer.
pub fn characteristics_url(base_url: &str) -> String {
    format!("{}/characteristics/searches", base_url.trim_end_matches('/'))
}

/// Build the URL of a single CPT object.
///
/// # Panics
/// Debug builds panic if bro_id doesn't match expected format.
pub fn object_url(base_url: &str, bro_id: &str) -> String {
    debug_assert!(
        BRO_ID_PATTERN.is_match(bro_id),
        "bro_id should be validated before calling object_url"
    );
    format!("{}/objects/{bro_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bro_id_valid() {
        assert!(validate_bro_id("CPT000000053405").is_ok());
        assert!(validate_bro_id("CPT999999999999").is_ok());
    }

    #[test]
    fn test_validate_bro_id_invalid() {
        assert!(validate_bro_id("").is_err());
        assert!(validate_bro_id("CPT00000005340").is_err()); // 11 digits
        assert!(validate_bro_id("CPT0000000534051").is_err()); // 13 digits
        assert!(validate_bro_id("cpt000000053405").is_err()); // Lowercase
        assert!(validate_bro_id("CPT000000053405/../x").is_err());
    }

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2015-01-01").is_ok());
        assert!(validate_date("2023-03-03").is_ok());
    }

    #[test]
    fn test_validate_date_invalid_format() {
        assert!(validate_date("").is_err());
        assert!(validate_date("2023/03/03").is_err());
        assert!(validate_date("03-03-2023").is_err());
        assert!(validate_date("2023-3-3").is_err());
    }

    #[test]
    fn test_validate_date_invalid_date() {
        assert!(validate_date("2023-02-30").is_err());
        assert!(validate_date("2023-00-01").is_err());
    }

    #[test]
    fn test_validate_date_before_registry() {
        assert!(validate_date("2014-12-31").is_err());
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range("2015-01-01", "2023-03-03").is_ok());
        assert!(validate_date_range("2023-03-03", "2023-03-03").is_ok());
        assert!(matches!(
            validate_date_range("2023-03-04", "2023-03-03"),
            Err(BroError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_request_reference() {
        assert!(REQUEST_REFERENCE.starts_with("Requested-with-bro-v"));
        assert!(REQUEST_REFERENCE.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_characteristics_url() {
        assert_eq!(
            characteristics_url(BRO_CPT_BASE_URL),
            "https://publiek.broservices.nl/sr/cpt/v1/characteristics/searches"
        );
        assert_eq!(
            characteristics_url("http://localhost:8080/"),
            "http://localhost:8080/characteristics/searches"
        );
    }

    #[test]
    fn test_object_url() {
        assert_eq!(
            object_url(BRO_CPT_BASE_URL, "CPT000000053405"),
            "https://publiek.broservices.nl/sr/cpt/v1/objects/CPT000000053405"
        );
    }
}
