//! Normalization and validation of untrusted input.
//!
//! Everything here is pure: raw strings in, typed values or an
//! [`ApiError`] naming the offending field out. Length checks on free
//! text run *after* HTML stripping, so markup cannot smuggle an
//! undersized comment past the limit.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const COMMENT_MIN_LEN: usize = 10;
pub const COMMENT_MAX_LEN: usize = 1000;
pub const KEYWORD_MAX_LEN: usize = 100;
pub const PRICE_MAX: u32 = 999_999;
pub const PAGE_MAX: u32 = 1000;

static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static KEYWORD_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\u{00C0}-\u{017F}\s.,'\-&()\[\]]+$").unwrap());

/// Parse a boundary identifier. The store keys rows by UUID, so anything
/// that does not parse as one is rejected before touching the store.
pub fn parse_id(value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::InvalidId { value: value.to_string() })
}

/// Reduce markup to plain text: script/style bodies go first, then every
/// remaining tag, then the common entities are decoded.
pub fn strip_html(input: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_RE.replace_all(input, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, "");
    decode_entities(&without_tags)
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Trim, strip markup, and re-check length on the stripped text.
///
/// A comment that only becomes too short once its markup is removed is a
/// distinct failure from one that was too short to begin with.
pub fn sanitize_comment(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > COMMENT_MAX_LEN {
        return Err(ApiError::validation(
            "COMMENT_TOO_LONG",
            format!("comment must be at most {COMMENT_MAX_LEN} characters"),
        ));
    }
    let stripped = strip_html(trimmed).trim().to_string();
    let len = stripped.chars().count();
    if len < COMMENT_MIN_LEN {
        if trimmed.chars().count() >= COMMENT_MIN_LEN {
            return Err(ApiError::validation(
                "INVALID_COMMENT_CONTENT",
                format!("comment must contain at least {COMMENT_MIN_LEN} characters of text"),
            ));
        }
        return Err(ApiError::validation(
            "COMMENT_TOO_SHORT",
            format!("comment must be at least {COMMENT_MIN_LEN} characters"),
        ));
    }
    if len > COMMENT_MAX_LEN {
        return Err(ApiError::validation(
            "COMMENT_TOO_LONG",
            format!("comment must be at most {COMMENT_MAX_LEN} characters"),
        ));
    }
    Ok(stripped)
}

/// Round to the nearest half step. Normative transform, not a check.
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Validate and normalize a review rating: finite, within [1, 5], then
/// rounded to the nearest 0.5.
pub fn normalize_rating(raw: Option<f64>) -> ApiResult<f64> {
    let value = raw.ok_or_else(|| ApiError::validation("MISSING_RATING", "rating is required"))?;
    if !value.is_finite() || !(1.0..=5.0).contains(&value) {
        return Err(ApiError::validation(
            "INVALID_RATING",
            format!("rating must be a number between 1 and 5, got {value}"),
        ));
    }
    Ok(round_to_half(value))
}

/// Normalize a search keyword. Empty after stripping means "no filter".
pub fn sanitize_keyword(raw: &str) -> ApiResult<Option<String>> {
    let stripped = strip_html(raw.trim());
    let keyword = stripped.trim().to_string();
    if keyword.is_empty() {
        return Ok(None);
    }
    if keyword.chars().count() > KEYWORD_MAX_LEN {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            format!("keyword must be at most {KEYWORD_MAX_LEN} characters"),
        ));
    }
    if !KEYWORD_CHARS_RE.is_match(&keyword) {
        return Err(ApiError::validation("VALIDATION_ERROR", "keyword contains forbidden characters"));
    }
    Ok(Some(keyword))
}

/// Coerce a price bound from its raw query value.
pub fn parse_price(field: &str, raw: &str) -> ApiResult<Decimal> {
    let value: Decimal = raw.trim().parse().map_err(|_| {
        ApiError::validation(
            "VALIDATION_ERROR",
            format!("{field} must be a number between 0 and {PRICE_MAX}, got '{raw}'"),
        )
    })?;
    if value < Decimal::ZERO || value > Decimal::from(PRICE_MAX) {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            format!("{field} must be between 0 and {PRICE_MAX}, got '{raw}'"),
        ));
    }
    Ok(value)
}

/// Coerce a minimum-aggregate-rating filter: [0, 5] in half steps.
pub fn parse_min_rating(raw: &str) -> ApiResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        ApiError::validation(
            "VALIDATION_ERROR",
            format!("ratings filter must be a number between 0 and 5, got '{raw}'"),
        )
    })?;
    if !value.is_finite() || !(0.0..=5.0).contains(&value) {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            format!("ratings filter must be between 0 and 5, got '{raw}'"),
        ));
    }
    if (value * 2.0).fract() != 0.0 {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            format!("ratings filter must be a multiple of 0.5, got '{raw}'"),
        ));
    }
    Ok(value)
}

/// Coerce a page number: integer in [1, PAGE_MAX].
pub fn parse_page(raw: &str) -> ApiResult<u32> {
    let value: u32 = raw.trim().parse().map_err(|_| {
        ApiError::validation(
            "VALIDATION_ERROR",
            format!("page must be an integer between 1 and {PAGE_MAX}, got '{raw}'"),
        )
    })?;
    if !(1..=PAGE_MAX).contains(&value) {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            format!("page must be between 1 and {PAGE_MAX}, got '{raw}'"),
        ));
    }
    Ok(value)
}

/// Prices are stored with two decimal places, half rounding away from zero.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("0188a8f0-1111-7abc-9def-0123456789ab").is_ok());
        let err = parse_id("663c2f9b8e4d5a0012345678").unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");
        assert_eq!(parse_id("").unwrap_err().code(), "INVALID_ID");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<b>hello</b> world"), "hello world");
        assert_eq!(strip_html("<script>alert('x')</script>safe"), "safe");
        assert_eq!(strip_html("<style>p{}</style>text"), "text");
        assert_eq!(strip_html("a &amp; b"), "a & b");
        assert_eq!(strip_html("no markup at all"), "no markup at all");
    }

    #[test]
    fn test_comment_stripped_length_law() {
        // Raw length 16, stripped length 9: rejected for content, not size.
        let err = sanitize_comment("<b></b>123456789").unwrap_err();
        assert_eq!(err.code(), "INVALID_COMMENT_CONTENT");
    }

    #[test]
    fn test_comment_too_short_and_too_long() {
        assert_eq!(sanitize_comment("short").unwrap_err().code(), "COMMENT_TOO_SHORT");
        let long = "x".repeat(COMMENT_MAX_LEN + 1);
        assert_eq!(sanitize_comment(&long).unwrap_err().code(), "COMMENT_TOO_LONG");
    }

    #[test]
    fn test_comment_accepts_plain_text() {
        let comment = sanitize_comment("  Great quality and fast shipping  ").unwrap();
        assert_eq!(comment, "Great quality and fast shipping");
    }

    #[test]
    fn test_rating_rounding_law() {
        assert_eq!(normalize_rating(Some(4.3)).unwrap(), 4.5);
        assert_eq!(normalize_rating(Some(2.1)).unwrap(), 2.0);
        assert_eq!(normalize_rating(Some(1.0)).unwrap(), 1.0);
        assert_eq!(normalize_rating(Some(5.0)).unwrap(), 5.0);
        // Always a 0.5 multiple.
        for raw in [1.1, 1.26, 3.74, 4.99] {
            let stored = normalize_rating(Some(raw)).unwrap();
            assert_eq!((stored * 2.0).fract(), 0.0);
        }
    }

    #[test]
    fn test_rating_rejections() {
        assert_eq!(normalize_rating(None).unwrap_err().code(), "MISSING_RATING");
        assert_eq!(normalize_rating(Some(0.4)).unwrap_err().code(), "INVALID_RATING");
        assert_eq!(normalize_rating(Some(5.5)).unwrap_err().code(), "INVALID_RATING");
        assert_eq!(normalize_rating(Some(f64::NAN)).unwrap_err().code(), "INVALID_RATING");
        assert_eq!(normalize_rating(Some(f64::INFINITY)).unwrap_err().code(), "INVALID_RATING");
    }

    #[test]
    fn test_keyword() {
        assert_eq!(sanitize_keyword("  linen shirt ").unwrap().as_deref(), Some("linen shirt"));
        assert_eq!(sanitize_keyword("<i></i>").unwrap(), None);
        assert!(sanitize_keyword("robe d'été").unwrap().is_some());
        assert_eq!(sanitize_keyword("{$ne:null}").unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("price[gt]", "19.99").unwrap(), Decimal::new(1999, 2));
        assert_eq!(parse_price("price[gt]", "-1").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(parse_price("price[lt]", "abc").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(parse_price("price[lt]", "1000000").unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_min_rating() {
        assert_eq!(parse_min_rating("3.5").unwrap(), 3.5);
        assert_eq!(parse_min_rating("3.3").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(parse_min_rating("6").unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("3").unwrap(), 3);
        assert_eq!(parse_page("0").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(parse_page("1001").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(parse_page("two").unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(Decimal::new(19995, 3)), Decimal::new(2000, 2));
        assert_eq!(round_price(Decimal::new(19985, 3)), Decimal::new(1999, 2));
        assert_eq!(round_price(Decimal::new(1999, 2)), Decimal::new(1999, 2));
    }
}
