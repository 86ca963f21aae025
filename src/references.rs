//! Resolving a listing's weak document references.
//!
//! The store never joins listings to documents. Callers fetch documents
//! (or summaries) and hydrate here; ids whose document was deleted are
//! skipped, never an error.

use crate::model::{Document, DocumentSummary, Listing};
use std::collections::HashMap;

/// Anything carrying a document id.
pub trait HasDocumentId {
    fn document_id(&self) -> i64;
}

impl HasDocumentId for Document {
    fn document_id(&self) -> i64 {
        self.id
    }
}

impl HasDocumentId for DocumentSummary {
    fn document_id(&self) -> i64 {
        self.id
    }
}

/// Documents referenced by `listing`, in reference order. Dangling ids are omitted.
#[must_use]
pub fn hydrate_references<'a, D: HasDocumentId>(listing: &Listing, documents: &'a [D]) -> Vec<&'a D> {
    let by_id: HashMap<i64, &D> = documents.iter().map(|d| (d.document_id(), d)).collect();
    listing
        .reference_document_ids
        .iter()
        .filter_map(|id| by_id.get(&id).copied())
        .collect()
}

/// Reference ids of `listing` with no matching document.
#[must_use]
pub fn dangling_references<D: HasDocumentId>(listing: &Listing, documents: &[D]) -> Vec<i64> {
    listing
        .reference_document_ids
        .iter()
        .filter(|id| !documents.iter().any(|d| d.document_id() == *id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentCategory, DocumentRefs};

    fn summary(id: i64) -> DocumentSummary {
        DocumentSummary {
            id,
            name: format!("doc-{id}"),
            document_type: DocumentCategory::Listing,
            mime_type: "application/pdf".to_string(),
            size: 1,
            reminder_date: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn listing_with(refs: DocumentRefs) -> Listing {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "address": "1 A St, B, C, 00000",
            "source_link": "https://x",
            "price_rent": 1.0,
            "bedrooms": null,
            "bathrooms": null,
            "square_footage": null,
            "contact_email": null,
            "contact_phone": null,
            "contact_other": null,
            "housing_type": null,
            "lease_type": null,
            "upfront_fees": null,
            "utilities": [],
            "amenities": [],
            "credit_score_min": null,
            "minimum_income": null,
            "references_required": true,
            "reference_document_ids": refs,
            "layout_description": null,
            "pet_policy": null,
            "furnishing": null,
            "favorite": false,
            "notes": null,
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_hydrate_in_reference_order_skipping_dangling() {
        let docs = vec![summary(1), summary(2), summary(3)];
        let listing = listing_with(vec![3, 9, 1].into());

        let ids: Vec<i64> = hydrate_references(&listing, &docs).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(dangling_references(&listing, &docs), vec![9]);
    }

    #[test]
    fn test_empty_references() {
        let listing = listing_with(DocumentRefs::new());
        assert!(hydrate_references::<DocumentSummary>(&listing, &[]).is_empty());
    }
}
