//! Data models for Rentvault.
//!
//! This module contains all domain models:
//! - Listing (rental property bookmark)
//! - Document (encrypted binary artifact plus metadata)
//! - ChecklistTask (rental-application to-do item)
//! - Profile, IncomeSource, AdditionalInfo (single-user auxiliary records)
//!
//! Each entity has a stored shape (`Listing`), an insert shape without id and
//! timestamps (`NewListing`), and a partial-update shape (`ListingPatch`).

pub mod checklist;
pub mod document;
pub mod listing;
pub mod patch;
pub mod profile;

pub use checklist::{AttachmentKind, ChecklistPatch, ChecklistTask, DocumentReference, NewChecklistTask};
pub use document::{
    Document, DocumentCategory, DocumentContent, DocumentPatch, DocumentSummary, NewDocument,
};
pub use listing::{
    Address, DocumentRefs, Furnishing, LeaseType, Listing, ListingPatch, NewListing,
    favorite_count, sort_listings_by_favorite,
};
pub use patch::Patch;
pub use profile::{
    AdditionalInfo, AdditionalInfoPatch, IncomeKind, IncomeSource, IncomeSourcePatch,
    NewAdditionalInfo, NewIncomeSource, Profile, ProfileFields, ProfilePatch,
};

/// The entity kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Listing,
    Document,
    Checklist,
    Profile,
    IncomeSource,
    AdditionalInfo,
}

impl Entity {
    /// Table holding this entity.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Listing => "listings",
            Self::Document => "documents",
            Self::Checklist => "checklists",
            Self::Profile => "profile",
            Self::IncomeSource => "income_sources",
            Self::AdditionalInfo => "additional_info",
        }
    }

    /// Human label used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Listing => "Listing",
            Self::Document => "Document",
            Self::Checklist => "Checklist task",
            Self::Profile => "Profile",
            Self::IncomeSource => "Income source",
            Self::AdditionalInfo => "Additional info",
        }
    }

    /// CLI subcommand that manages this entity.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Document => "document",
            Self::Checklist => "task",
            Self::Profile => "profile",
            Self::IncomeSource => "income",
            Self::AdditionalInfo => "extra",
        }
    }
}
