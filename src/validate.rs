//! Input validation and normalization.
//!
//! Enum inputs resolve in three tiers: exact match, synonym lookup, then an
//! error carrying the closest valid value. Field checks enforce the ranges
//! the schema's CHECK constraints also guard, so callers get a
//! `ValidationError` naming the field instead of a constraint failure.

use crate::error::{Error, Result};
use crate::model::{
    AttachmentKind, DocumentCategory, DocumentReference, Furnishing, IncomeKind, LeaseType,
    ListingPatch, NewListing, Patch,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Lowest and highest accepted credit score.
pub const CREDIT_SCORE_RANGE: std::ops::RangeInclusive<u16> = 300..=850;

// ── Synonym maps ─────────────────────────────────────────────

static LEASE_TYPES: LazyLock<HashMap<&str, LeaseType>> = LazyLock::new(|| {
    [
        ("month-to-month", LeaseType::MonthToMonth),
        ("month to month", LeaseType::MonthToMonth),
        ("monthly", LeaseType::MonthToMonth),
        ("m2m", LeaseType::MonthToMonth),
        ("mtm", LeaseType::MonthToMonth),
        ("annual", LeaseType::Annual),
        ("yearly", LeaseType::Annual),
        ("year", LeaseType::Annual),
        ("12-month", LeaseType::Annual),
        ("12 month", LeaseType::Annual),
    ]
    .into_iter()
    .collect()
});

static FURNISHINGS: LazyLock<HashMap<&str, Furnishing>> = LazyLock::new(|| {
    [
        ("furnished", Furnishing::Furnished),
        ("unfurnished", Furnishing::Unfurnished),
        ("none", Furnishing::Unfurnished),
        ("semi-furnished", Furnishing::SemiFurnished),
        ("semi furnished", Furnishing::SemiFurnished),
        ("semi", Furnishing::SemiFurnished),
        ("partial", Furnishing::SemiFurnished),
        ("partly furnished", Furnishing::SemiFurnished),
    ]
    .into_iter()
    .collect()
});

static DOCUMENT_CATEGORIES: LazyLock<HashMap<&str, DocumentCategory>> = LazyLock::new(|| {
    [
        ("personal", DocumentCategory::Personal),
        ("id", DocumentCategory::Personal),
        ("identity", DocumentCategory::Personal),
        ("listing", DocumentCategory::Listing),
        ("property", DocumentCategory::Listing),
        ("general", DocumentCategory::General),
        ("other", DocumentCategory::Other),
        ("misc", DocumentCategory::Other),
    ]
    .into_iter()
    .collect()
});

static INCOME_KINDS: LazyLock<HashMap<&str, IncomeKind>> = LazyLock::new(|| {
    [
        ("employment", IncomeKind::Employment),
        ("employed", IncomeKind::Employment),
        ("job", IncomeKind::Employment),
        ("salary", IncomeKind::Employment),
        ("self-employed", IncomeKind::SelfEmployed),
        ("self employed", IncomeKind::SelfEmployed),
        ("selfemployed", IncomeKind::SelfEmployed),
        ("freelance", IncomeKind::SelfEmployed),
        ("contractor", IncomeKind::SelfEmployed),
        ("other", IncomeKind::Other),
    ]
    .into_iter()
    .collect()
});

static ATTACHMENT_KINDS: LazyLock<HashMap<&str, AttachmentKind>> = LazyLock::new(|| {
    [
        ("file", AttachmentKind::File),
        ("document", AttachmentKind::File),
        ("folder", AttachmentKind::Folder),
        ("directory", AttachmentKind::Folder),
        ("link", AttachmentKind::Link),
        ("url", AttachmentKind::Link),
    ]
    .into_iter()
    .collect()
});

// ── Normalization ────────────────────────────────────────────

fn normalize<T: Copy>(
    field: &'static str,
    input: &str,
    table: &HashMap<&str, T>,
    describe: impl Fn(T) -> &'static str,
) -> Result<T> {
    let lower = input.trim().to_lowercase();

    if let Some(&value) = table.get(lower.as_str()) {
        return Ok(value);
    }

    let reason = match find_closest_match(&lower, table) {
        Some(value) => format!("unknown value '{input}' (did you mean '{}'?)", describe(value)),
        None => format!("unknown value '{input}'"),
    };
    Err(Error::validation(field, reason))
}

/// Resolve a lease type from its spelling or a synonym.
///
/// # Errors
///
/// Returns a validation error with the closest valid value.
pub fn normalize_lease_type(input: &str) -> Result<LeaseType> {
    normalize("lease_type", input, &LEASE_TYPES, |v| v.as_str())
}

/// Resolve a furnishing state.
///
/// # Errors
///
/// Returns a validation error with the closest valid value.
pub fn normalize_furnishing(input: &str) -> Result<Furnishing> {
    normalize("furnishing", input, &FURNISHINGS, |v| v.as_str())
}

/// Resolve a document category.
///
/// # Errors
///
/// Returns a validation error with the closest valid value.
pub fn normalize_document_category(input: &str) -> Result<DocumentCategory> {
    normalize("document_type", input, &DOCUMENT_CATEGORIES, |v| v.label())
}

/// Resolve an income source kind.
///
/// # Errors
///
/// Returns a validation error with the closest valid value.
pub fn normalize_income_kind(input: &str) -> Result<IncomeKind> {
    normalize("source", input, &INCOME_KINDS, |v| v.label())
}

/// Resolve a checklist attachment kind.
///
/// # Errors
///
/// Returns a validation error with the closest valid value.
pub fn normalize_attachment_kind(input: &str) -> Result<AttachmentKind> {
    normalize("type", input, &ATTACHMENT_KINDS, |v| v.as_str())
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a validation error naming `field`.
pub fn parse_date(field: &'static str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(field, format!("'{input}' is not a YYYY-MM-DD date")))
}

/// Find the closest key within edit distance 3, reporting its canonical value.
fn find_closest_match<T: Copy>(input: &str, table: &HashMap<&str, T>) -> Option<T> {
    let mut best: Option<(T, usize)> = None;

    for (&key, &value) in table {
        let dist = levenshtein_distance(input, key);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            best = Some((value, dist));
        }
    }

    best.map(|(value, _)| value)
}

// ── Field checks ─────────────────────────────────────────────

/// Reject empty or whitespace-only text.
///
/// # Errors
///
/// Returns a validation error naming `field`.
pub fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

/// Reject negative or non-finite amounts.
///
/// # Errors
///
/// Returns a validation error naming `field`.
pub fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(field, format!("must be a non-negative number, got {value}")));
    }
    Ok(())
}

fn non_negative_opt(field: &'static str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |v| non_negative(field, v))
}

fn non_negative_patch(field: &'static str, patch: &Patch<f64>) -> Result<()> {
    patch.as_set().map_or(Ok(()), |&v| non_negative(field, v))
}

/// Reject credit scores outside 300..=850.
///
/// # Errors
///
/// Returns a validation error on `credit_score_min`.
pub fn credit_score(value: u16) -> Result<()> {
    if !CREDIT_SCORE_RANGE.contains(&value) {
        return Err(Error::validation(
            "credit_score_min",
            format!("{value} is outside 300-850"),
        ));
    }
    Ok(())
}

/// Check a new listing before insert.
///
/// # Errors
///
/// Returns the first field that fails.
pub fn validate_new_listing(listing: &NewListing) -> Result<()> {
    require_text("address", &listing.address)?;
    require_text("source_link", &listing.source_link)?;
    non_negative("price_rent", listing.price_rent)?;
    non_negative_opt("bathrooms", listing.bathrooms)?;
    non_negative_opt("upfront_fees", listing.upfront_fees)?;
    non_negative_opt("minimum_income", listing.minimum_income)?;
    listing.credit_score_min.map_or(Ok(()), credit_score)
}

/// Check the fields a listing update sets.
///
/// # Errors
///
/// Returns the first field that fails.
pub fn validate_listing_patch(patch: &ListingPatch) -> Result<()> {
    if let Some(address) = &patch.address {
        require_text("address", address)?;
    }
    if let Some(link) = &patch.source_link {
        require_text("source_link", link)?;
    }
    non_negative_opt("price_rent", patch.price_rent)?;
    non_negative_patch("bathrooms", &patch.bathrooms)?;
    non_negative_patch("upfront_fees", &patch.upfront_fees)?;
    non_negative_patch("minimum_income", &patch.minimum_income)?;
    patch.credit_score_min.as_set().map_or(Ok(()), |&v| credit_score(v))
}

/// Check a task's attachment list: links must carry a URL.
///
/// # Errors
///
/// Returns a validation error on `document_references`.
pub fn validate_task_references(references: &[DocumentReference]) -> Result<()> {
    for reference in references {
        if reference.kind == AttachmentKind::Link
            && reference.url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(Error::validation(
                "document_references",
                format!("link '{}' has no url", reference.name),
            ));
        }
    }
    Ok(())
}

/// Check that document content is complete: bytes and MIME type together.
///
/// # Errors
///
/// Returns a validation error on `data` or `mime_type`.
pub fn validate_document_content(data: Option<&[u8]>, mime_type: Option<&str>) -> Result<()> {
    match (data, mime_type) {
        (None, None) => Err(Error::validation("data", "document content is required")),
        (Some(_), None) => Err(Error::validation(
            "mime_type",
            "must be supplied together with data",
        )),
        (None, Some(_)) => Err(Error::validation(
            "data",
            "must be supplied together with mime_type",
        )),
        (Some(data), Some(mime)) => {
            if data.is_empty() {
                return Err(Error::validation("data", "document content is empty"));
            }
            require_text("mime_type", mime)
        }
    }
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_normalize_lease_type() {
        assert_eq!(normalize_lease_type("annual").unwrap(), LeaseType::Annual);
        assert_eq!(normalize_lease_type("Monthly").unwrap(), LeaseType::MonthToMonth);
        assert_eq!(normalize_lease_type("12-month").unwrap(), LeaseType::Annual);

        let err = normalize_lease_type("anual").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Validation);
        assert!(err.to_string().contains("did you mean 'annual'"));
    }

    #[test]
    fn test_normalize_income_kind() {
        assert_eq!(normalize_income_kind("self employed").unwrap(), IncomeKind::SelfEmployed);
        assert_eq!(normalize_income_kind("Employment").unwrap(), IncomeKind::Employment);
        assert!(normalize_income_kind("lottery").is_err());
    }

    #[test]
    fn test_normalize_document_category() {
        assert_eq!(
            normalize_document_category("PERSONAL").unwrap(),
            DocumentCategory::Personal
        );
        assert_eq!(normalize_document_category("misc").unwrap(), DocumentCategory::Other);
        assert_eq!(normalize_attachment_kind("url").unwrap(), AttachmentKind::Link);
        assert_eq!(normalize_furnishing("semi").unwrap(), Furnishing::SemiFurnished);
    }

    #[test]
    fn test_credit_score_bounds() {
        assert!(credit_score(300).is_ok());
        assert!(credit_score(850).is_ok());
        assert!(credit_score(299).is_err());
        assert!(credit_score(851).is_err());
    }

    #[test]
    fn test_validate_new_listing() {
        let mut listing = NewListing::new("1 Elm St, Austin, TX, 78701", "https://x", 1500.0);
        assert!(validate_new_listing(&listing).is_ok());

        listing.price_rent = -1.0;
        assert!(validate_new_listing(&listing).is_err());

        listing.price_rent = 10.0;
        listing.address = "  ".to_string();
        let err = validate_new_listing(&listing).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "address", .. }));
    }

    #[test]
    fn test_document_content_pairs() {
        assert!(validate_document_content(Some(b"x"), Some("text/plain")).is_ok());
        assert!(validate_document_content(Some(b"x"), None).is_err());
        assert!(validate_document_content(None, Some("text/plain")).is_err());
        assert!(validate_document_content(Some(b""), Some("text/plain")).is_err());
    }

    #[test]
    fn test_link_reference_needs_url() {
        let mut link = DocumentReference::link("1", "portal", "https://x");
        assert!(validate_task_references(std::slice::from_ref(&link)).is_ok());
        link.url = Some(String::new());
        assert!(validate_task_references(&[link]).is_err());
        assert!(validate_task_references(&[DocumentReference::file("2", "a.pdf")]).is_ok());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("reminder_date", "2026-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert!(parse_date("reminder_date", "31/01/2026").is_err());
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }
}
