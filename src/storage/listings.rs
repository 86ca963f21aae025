//! Listing repository.

use crate::error::{Error, Result};
use crate::model::{
    DocumentRefs, Entity, Furnishing, LeaseType, Listing, ListingPatch, NewListing,
};
use crate::storage::codec::{Cell, decode_enum, decode_list, encode_list};
use crate::storage::update::Update;
use crate::storage::EncryptedStore;
use crate::validate::{validate_listing_patch, validate_new_listing};
use rusqlite::{OptionalExtension, Transaction};
use tracing::debug;

const LISTING_COLUMNS: &str = "id, address, source_link, price_rent, bedrooms, bathrooms,
    square_footage, contact_email, contact_phone, contact_other, housing_type, lease_type,
    upfront_fees, utilities, amenities, credit_score_min, minimum_income, references_required,
    reference_document_ids, layout_description, pet_policy, furnishing, favorite, notes,
    created_at, updated_at";

impl EncryptedStore {
    /// Bookmark a listing. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range fields or reference ids
    /// that do not name an existing document.
    pub fn add_listing(&mut self, listing: &NewListing) -> Result<i64> {
        validate_new_listing(listing)?;
        let now = chrono::Utc::now().timestamp_millis();
        let utilities = encode_list(&listing.utilities)?;
        let amenities = encode_list(&listing.amenities)?;
        let references = encode_list(listing.reference_document_ids.as_slice())?;

        self.mutate("add_listing", |tx| {
            ensure_documents_exist(tx, &listing.reference_document_ids)?;

            tx.execute(
                "INSERT INTO listings (
                    address, source_link, price_rent, bedrooms, bathrooms, square_footage,
                    contact_email, contact_phone, contact_other, housing_type, lease_type,
                    upfront_fees, utilities, amenities, credit_score_min, minimum_income,
                    references_required, reference_document_ids, layout_description,
                    pet_policy, furnishing, favorite, notes, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                          ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?24)",
                rusqlite::params![
                    listing.address,
                    listing.source_link,
                    listing.price_rent,
                    listing.bedrooms,
                    listing.bathrooms,
                    listing.square_footage,
                    listing.contact_email,
                    listing.contact_phone,
                    listing.contact_other,
                    listing.housing_type,
                    listing.lease_type.as_ref().map(LeaseType::as_str),
                    listing.upfront_fees,
                    utilities,
                    amenities,
                    listing.credit_score_min,
                    listing.minimum_income,
                    listing.references_required,
                    references,
                    listing.layout_description,
                    listing.pet_policy,
                    listing.furnishing.as_ref().map(Furnishing::as_str),
                    listing.favorite,
                    listing.notes,
                    now,
                ],
            )?;

            let id = tx.last_insert_rowid();
            debug!(id, "Added listing");
            Ok(id)
        })
    }

    /// Get a listing as stored, reference ids included verbatim.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no listing has this id.
    pub fn get_listing(&self, id: i64) -> Result<Listing> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], map_listing_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: Entity::Listing,
                id,
            })
    }

    /// All listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_listings(&self) -> Result<Vec<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_listing_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing id, or a validation error for the
    /// fields being set.
    pub fn update_listing(&mut self, id: i64, patch: ListingPatch) -> Result<()> {
        validate_listing_patch(&patch)?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("listings");
        update.set("address", patch.address);
        update.set("source_link", patch.source_link);
        update.set("price_rent", patch.price_rent);
        update.patch("bedrooms", patch.bedrooms);
        update.patch("bathrooms", patch.bathrooms);
        update.patch("square_footage", patch.square_footage);
        update.patch("contact_email", patch.contact_email);
        update.patch("contact_phone", patch.contact_phone);
        update.patch("contact_other", patch.contact_other);
        update.patch("housing_type", patch.housing_type);
        update.patch("lease_type", patch.lease_type.map(|v| v.as_str()));
        update.patch("upfront_fees", patch.upfront_fees);
        update.set("utilities", patch.utilities.map(|v| encode_list(&v)).transpose()?);
        update.set("amenities", patch.amenities.map(|v| encode_list(&v)).transpose()?);
        update.patch("credit_score_min", patch.credit_score_min);
        update.patch("minimum_income", patch.minimum_income);
        update.set("references_required", patch.references_required);
        let references = patch.reference_document_ids;
        update.set(
            "reference_document_ids",
            references
                .as_ref()
                .map(|refs| encode_list(refs.as_slice()))
                .transpose()?,
        );
        update.patch("layout_description", patch.layout_description);
        update.patch("pet_policy", patch.pet_policy);
        update.patch("furnishing", patch.furnishing.map(|v| v.as_str()));
        update.set("favorite", patch.favorite);
        update.patch("notes", patch.notes);

        self.mutate("update_listing", |tx| {
            if let Some(refs) = &references {
                ensure_documents_exist(tx, refs)?;
            }
            if update.execute(tx, id, now)? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Listing,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Delete a listing. Referenced documents are untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no listing has this id.
    pub fn delete_listing(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_listing", |tx| {
            let rows = tx.execute("DELETE FROM listings WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Listing,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Flip the favorite flag. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no listing has this id.
    pub fn toggle_listing_favorite(&mut self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("toggle_listing_favorite", |tx| {
            let rows = tx.execute(
                "UPDATE listings SET favorite = 1 - favorite, updated_at = ?1 WHERE id = ?2",
                rusqlite::params![now, id],
            )?;
            if rows == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Listing,
                    id,
                });
            }
            let favorite: bool =
                tx.query_row("SELECT favorite FROM listings WHERE id = ?1", [id], |row| row.get(0))?;
            Ok(favorite)
        })
    }
}

/// Reject reference ids that do not name a document at write time.
fn ensure_documents_exist(tx: &Transaction, refs: &DocumentRefs) -> Result<()> {
    let mut stmt = tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1)")?;
    for id in refs.iter() {
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        if !exists {
            return Err(Error::validation(
                "reference_document_ids",
                format!("document {id} does not exist"),
            ));
        }
    }
    Ok(())
}

// Helper to map listing rows
fn map_listing_row(row: &rusqlite::Row) -> rusqlite::Result<Listing> {
    let id: i64 = row.get(0)?;
    let cell = |column| Cell::new("listings", column, id);
    let references: Vec<i64> = decode_list(row.get(18)?, cell("reference_document_ids"));

    Ok(Listing {
        id,
        address: row.get(1)?,
        source_link: row.get(2)?,
        price_rent: row.get(3)?,
        bedrooms: row.get(4)?,
        bathrooms: row.get(5)?,
        square_footage: row.get(6)?,
        contact_email: row.get(7)?,
        contact_phone: row.get(8)?,
        contact_other: row.get(9)?,
        housing_type: row.get(10)?,
        lease_type: decode_enum(row.get(11)?, LeaseType::from_stored, cell("lease_type")),
        upfront_fees: row.get(12)?,
        utilities: decode_list(row.get(13)?, cell("utilities")),
        amenities: decode_list(row.get(14)?, cell("amenities")),
        credit_score_min: row.get(15)?,
        minimum_income: row.get(16)?,
        references_required: row.get(17)?,
        reference_document_ids: references.into(),
        layout_description: row.get(19)?,
        pet_policy: row.get(20)?,
        furnishing: decode_enum(row.get(21)?, Furnishing::from_stored, cell("furnishing")),
        favorite: row.get(22)?,
        notes: row.get(23)?,
        created_at: row.get(24)?,
        updated_at: row.get(25)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{DocumentCategory, DocumentContent, NewDocument, Patch};

    fn sample() -> NewListing {
        NewListing {
            bedrooms: Some(2),
            bathrooms: Some(1.5),
            lease_type: Some(LeaseType::Annual),
            utilities: vec!["water".to_string(), "trash".to_string()],
            amenities: vec!["gym".to_string()],
            credit_score_min: Some(650),
            furnishing: Some(Furnishing::SemiFurnished),
            contact_email: Some("landlord@example.com".to_string()),
            ..NewListing::new("9 Pine Rd, Denver, CO, 80202", "https://rent.example/9", 1850.0)
        }
    }

    #[test]
    fn test_listing_crud() {
        let mut store = EncryptedStore::open_memory().unwrap();

        let id = store.add_listing(&sample()).unwrap();
        let listing = store.get_listing(id).unwrap();
        assert_eq!(listing.address, "9 Pine Rd, Denver, CO, 80202");
        assert_eq!(listing.bathrooms, Some(1.5));
        assert_eq!(listing.lease_type, Some(LeaseType::Annual));
        assert_eq!(listing.utilities, vec!["water", "trash"]);
        assert_eq!(listing.furnishing, Some(Furnishing::SemiFurnished));
        assert_eq!(listing.created_at, listing.updated_at);
        assert!(listing.contact_phone.is_none());

        store
            .update_listing(
                id,
                ListingPatch {
                    price_rent: Some(1900.0),
                    contact_email: Patch::Clear,
                    notes: Patch::Set(String::new()),
                    ..ListingPatch::default()
                },
            )
            .unwrap();
        let updated = store.get_listing(id).unwrap();
        assert!((updated.price_rent - 1900.0).abs() < f64::EPSILON);
        assert!(updated.contact_email.is_none());
        assert_eq!(updated.notes.as_deref(), Some(""));
        assert_eq!(updated.bedrooms, Some(2));
        assert_eq!(updated.created_at, listing.created_at);

        store.delete_listing(id).unwrap();
        let err = store.get_listing(id).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert!(store.list_listings().unwrap().is_empty());
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let err = store.update_listing(42, ListingPatch::default()).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert_eq!(store.delete_listing(42).unwrap_err().error_code(), ErrorCode::NotFound);
        assert_eq!(
            store.toggle_listing_favorite(42).unwrap_err().error_code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_empty_patch_restamps_updated_at() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let id = store.add_listing(&sample()).unwrap();
        store
            .conn()
            .execute("UPDATE listings SET updated_at = 1 WHERE id = ?1", [id])
            .unwrap();

        store.update_listing(id, ListingPatch::default()).unwrap();
        assert!(store.get_listing(id).unwrap().updated_at > 1);
    }

    #[test]
    fn test_toggle_favorite() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let id = store.add_listing(&sample()).unwrap();

        assert!(store.toggle_listing_favorite(id).unwrap());
        assert!(store.get_listing(id).unwrap().favorite);
        assert!(!store.toggle_listing_favorite(id).unwrap());
        assert!(!store.get_listing(id).unwrap().favorite);
    }

    #[test]
    fn test_references_must_exist_at_write_time() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let doc = store
            .add_document(&NewDocument::new(
                "lease.pdf",
                DocumentCategory::Listing,
                DocumentContent::new(b"%PDF-1.4".to_vec(), "application/pdf"),
            ))
            .unwrap();

        let mut listing = sample();
        listing.reference_document_ids = vec![doc, 999].into();
        let err = store.add_listing(&listing).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Validation);
        assert!(store.list_listings().unwrap().is_empty());

        listing.reference_document_ids = vec![doc].into();
        let id = store.add_listing(&listing).unwrap();

        store.delete_document(doc).unwrap();
        let kept = store.get_listing(id).unwrap();
        assert_eq!(kept.reference_document_ids.as_slice(), &[doc]);
    }

    #[test]
    fn test_malformed_json_fails_closed() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let id = store.add_listing(&sample()).unwrap();
        store
            .conn()
            .execute(
                "UPDATE listings SET amenities = '{broken', reference_document_ids = 'x' WHERE id = ?1",
                [id],
            )
            .unwrap();

        let listing = store.get_listing(id).unwrap();
        assert!(listing.amenities.is_empty());
        assert!(listing.reference_document_ids.is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let first = store.add_listing(&sample()).unwrap();
        let second = store.add_listing(&sample()).unwrap();

        let ids: Vec<i64> = store.list_listings().unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second, first]);
    }
}
