//! Listing model for Rentvault.
//!
//! A listing is a bookmarked rental property. It may point at documents the
//! user wants to send with an application (`reference_document_ids`), but it
//! never owns them.

use super::Patch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lease terms offered by a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseType {
    #[serde(rename = "month-to-month")]
    MonthToMonth,
    #[serde(rename = "annual")]
    Annual,
}

impl LeaseType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MonthToMonth => "month-to-month",
            Self::Annual => "annual",
        }
    }

    /// Parse the stored spelling.
    #[must_use]
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "month-to-month" => Some(Self::MonthToMonth),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl fmt::Display for LeaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Furnishing state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Furnishing {
    Furnished,
    Unfurnished,
    SemiFurnished,
}

impl Furnishing {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Furnished => "furnished",
            Self::Unfurnished => "unfurnished",
            Self::SemiFurnished => "semi-furnished",
        }
    }

    /// Parse the stored spelling.
    #[must_use]
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "furnished" => Some(Self::Furnished),
            "unfurnished" => Some(Self::Unfurnished),
            "semi-furnished" => Some(Self::SemiFurnished),
            _ => None,
        }
    }
}

impl fmt::Display for Furnishing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of document ids referenced by a listing.
///
/// This is a weak reference: ids may dangle after the document is deleted,
/// and readers must tolerate that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<i64>", into = "Vec<i64>")]
pub struct DocumentRefs(Vec<i64>);

impl DocumentRefs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id, ignoring duplicates. Returns true if it was added.
    pub fn insert(&mut self, id: i64) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove an id. Returns true if it was present.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.0.len();
        self.0.retain(|&existing| existing != id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

impl From<Vec<i64>> for DocumentRefs {
    fn from(ids: Vec<i64>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<DocumentRefs> for Vec<i64> {
    fn from(refs: DocumentRefs) -> Self {
        refs.0
    }
}

impl FromIterator<i64> for DocumentRefs {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut refs = Self::new();
        for id in iter {
            refs.insert(id);
        }
        refs
    }
}

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    /// "Street, City, State, Zip"
    pub address: String,
    pub source_link: String,
    pub price_rent: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub square_footage: Option<u32>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_other: Option<String>,
    pub housing_type: Option<String>,
    pub lease_type: Option<LeaseType>,
    pub upfront_fees: Option<f64>,
    pub utilities: Vec<String>,
    pub amenities: Vec<String>,
    pub credit_score_min: Option<u16>,
    pub minimum_income: Option<f64>,
    pub references_required: bool,
    pub reference_document_ids: DocumentRefs,
    pub layout_description: Option<String>,
    pub pet_policy: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub favorite: bool,
    pub notes: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Listing {
    /// Structured view of the address, when it follows the expected shape.
    #[must_use]
    pub fn parsed_address(&self) -> Option<Address> {
        Address::parse(&self.address)
    }
}

/// Fields supplied when bookmarking a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewListing {
    pub address: String,
    pub source_link: String,
    pub price_rent: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub square_footage: Option<u32>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_other: Option<String>,
    pub housing_type: Option<String>,
    pub lease_type: Option<LeaseType>,
    pub upfront_fees: Option<f64>,
    pub utilities: Vec<String>,
    pub amenities: Vec<String>,
    pub credit_score_min: Option<u16>,
    pub minimum_income: Option<f64>,
    pub references_required: bool,
    pub reference_document_ids: DocumentRefs,
    pub layout_description: Option<String>,
    pub pet_policy: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub favorite: bool,
    pub notes: Option<String>,
}

impl NewListing {
    /// Start a listing from its two required text fields and the rent.
    #[must_use]
    pub fn new(address: impl Into<String>, source_link: impl Into<String>, price_rent: f64) -> Self {
        Self {
            address: address.into(),
            source_link: source_link.into(),
            price_rent,
            ..Self::default()
        }
    }
}

/// Partial update of a listing. Unmentioned fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub address: Option<String>,
    pub source_link: Option<String>,
    pub price_rent: Option<f64>,
    pub bedrooms: Patch<u32>,
    pub bathrooms: Patch<f64>,
    pub square_footage: Patch<u32>,
    pub contact_email: Patch<String>,
    pub contact_phone: Patch<String>,
    pub contact_other: Patch<String>,
    pub housing_type: Patch<String>,
    pub lease_type: Patch<LeaseType>,
    pub upfront_fees: Patch<f64>,
    /// An empty list clears the field.
    pub utilities: Option<Vec<String>>,
    /// An empty list clears the field.
    pub amenities: Option<Vec<String>>,
    pub credit_score_min: Patch<u16>,
    pub minimum_income: Patch<f64>,
    pub references_required: Option<bool>,
    pub reference_document_ids: Option<DocumentRefs>,
    pub layout_description: Patch<String>,
    pub pet_policy: Patch<String>,
    pub furnishing: Patch<Furnishing>,
    pub favorite: Option<bool>,
    pub notes: Patch<String>,
}

/// Address components of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Parse "Street, City, State, Zip" or "Street, City, State Zip".
    ///
    /// Returns `None` when the address has fewer than three comma-separated parts.
    #[must_use]
    pub fn parse(address: &str) -> Option<Self> {
        let parts: Vec<&str> = address.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [street, city, state, zip, ..] => Some(Self {
                street: (*street).to_string(),
                city: (*city).to_string(),
                state: (*state).to_string(),
                zip: (*zip).to_string(),
            }),
            [street, city, state_zip] => {
                let mut words = state_zip.split_whitespace();
                let state = words.next().unwrap_or_default().to_string();
                let zip = words.collect::<Vec<_>>().join(" ");
                Some(Self {
                    street: (*street).to_string(),
                    city: (*city).to_string(),
                    state,
                    zip,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.street, self.city, self.state, self.zip)
    }
}

/// Favorites first, keeping the relative order inside each group.
#[must_use]
pub fn sort_listings_by_favorite(listings: &[Listing]) -> Vec<Listing> {
    let (mut favorites, others): (Vec<Listing>, Vec<Listing>) =
        listings.iter().cloned().partition(|l| l.favorite);
    favorites.extend(others);
    favorites
}

/// Number of listings marked favorite.
#[must_use]
pub fn favorite_count(listings: &[Listing]) -> usize {
    listings.iter().filter(|l| l.favorite).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i64, favorite: bool) -> Listing {
        Listing {
            id,
            address: "1 Main St, Springfield, IL, 62701".to_string(),
            source_link: "https://example.com".to_string(),
            price_rent: 1200.0,
            bedrooms: None,
            bathrooms: None,
            square_footage: None,
            contact_email: None,
            contact_phone: None,
            contact_other: None,
            housing_type: None,
            lease_type: None,
            upfront_fees: None,
            utilities: Vec::new(),
            amenities: Vec::new(),
            credit_score_min: None,
            minimum_income: None,
            references_required: false,
            reference_document_ids: DocumentRefs::new(),
            layout_description: None,
            pet_policy: None,
            furnishing: None,
            favorite,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_sort_by_favorite_is_stable_partition() {
        let listings = vec![
            listing(1, false),
            listing(2, true),
            listing(3, false),
            listing(4, true),
        ];
        let ids: Vec<i64> = sort_listings_by_favorite(&listings)
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
        assert_eq!(favorite_count(&listings), 2);
    }

    #[test]
    fn test_document_refs_dedupe_in_order() {
        let refs: DocumentRefs = vec![3, 1, 3, 2, 1].into();
        assert_eq!(refs.as_slice(), &[3, 1, 2]);

        let json = serde_json::to_string(&refs).unwrap();
        assert_eq!(json, "[3,1,2]");
    }

    #[test]
    fn test_address_parse_four_parts() {
        let address = Address::parse("12 Oak Ave, Portland, OR, 97201").unwrap();
        assert_eq!(address.street, "12 Oak Ave");
        assert_eq!(address.city, "Portland");
        assert_eq!(address.state, "OR");
        assert_eq!(address.zip, "97201");
        assert_eq!(address.to_string(), "12 Oak Ave, Portland, OR, 97201");
    }

    #[test]
    fn test_address_parse_state_zip_together() {
        let address = Address::parse("12 Oak Ave, Portland, OR 97201").unwrap();
        assert_eq!(address.state, "OR");
        assert_eq!(address.zip, "97201");
        assert!(Address::parse("just a street").is_none());
    }

    #[test]
    fn test_lease_type_serde_spelling() {
        let json = serde_json::to_string(&LeaseType::MonthToMonth).unwrap();
        assert_eq!(json, "\"month-to-month\"");
        assert_eq!(LeaseType::from_stored("annual"), Some(LeaseType::Annual));
        assert_eq!(
            serde_json::to_string(&Furnishing::SemiFurnished).unwrap(),
            "\"semi-furnished\""
        );
    }
}
