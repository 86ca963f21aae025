//! Listing command implementations.

use super::{DeletedOutput, IdOutput, open_vault, print_json, truncate};
use crate::cli::{Cli, ListingCommands, ListingFields};
use crate::error::{Error, Result};
use crate::model::{
    DocumentRefs, DocumentSummary, Listing, ListingPatch, NewListing, Patch, favorite_count,
    sort_listings_by_favorite,
};
use crate::validate::{normalize_furnishing, normalize_lease_type};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct ListingListOutput {
    listings: Vec<Listing>,
    count: usize,
    favorites: usize,
}

#[derive(Serialize)]
struct ListingShowOutput {
    listing: Listing,
    documents: Vec<DocumentSummary>,
}

#[derive(Serialize)]
struct FavoriteOutput {
    id: i64,
    favorite: bool,
}

/// Execute listing commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute(command: &ListingCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        ListingCommands::Add {
            address,
            link,
            rent,
            fields,
            favorite,
        } => add(cli, new_listing(address, link, *rent, fields, *favorite)?, json),
        ListingCommands::List { favorites } => list(cli, *favorites, json),
        ListingCommands::Show { id } => show(cli, *id, json),
        ListingCommands::Update {
            id,
            address,
            link,
            rent,
            fields,
            clear,
        } => {
            let mut patch = listing_patch(fields, clear)?;
            patch.address.clone_from(address);
            patch.source_link.clone_from(link);
            patch.price_rent = *rent;
            update(cli, *id, patch, json)
        }
        ListingCommands::Favorite { id } => favorite(cli, *id, json),
        ListingCommands::Delete { id } => delete(cli, *id, json),
    }
}

fn new_listing(
    address: &str,
    link: &str,
    rent: f64,
    fields: &ListingFields,
    favorite: bool,
) -> Result<NewListing> {
    Ok(NewListing {
        bedrooms: fields.bedrooms,
        bathrooms: fields.bathrooms,
        square_footage: fields.square_footage,
        contact_email: fields.contact_email.clone(),
        contact_phone: fields.contact_phone.clone(),
        contact_other: fields.contact_other.clone(),
        housing_type: fields.housing_type.clone(),
        lease_type: fields
            .lease_type
            .as_deref()
            .map(normalize_lease_type)
            .transpose()?,
        upfront_fees: fields.upfront_fees,
        utilities: fields.utilities.clone(),
        amenities: fields.amenities.clone(),
        credit_score_min: fields.credit_score_min,
        minimum_income: fields.minimum_income,
        references_required: fields.references_required.unwrap_or(false),
        reference_document_ids: fields.documents.iter().copied().collect(),
        layout_description: fields.layout_description.clone(),
        pet_policy: fields.pet_policy.clone(),
        furnishing: fields
            .furnishing
            .as_deref()
            .map(normalize_furnishing)
            .transpose()?,
        favorite,
        notes: fields.notes.clone(),
        ..NewListing::new(address, link, rent)
    })
}

fn set_or_keep<T>(value: Option<T>) -> Patch<T> {
    value.map_or(Patch::Keep, Patch::Set)
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Build a patch from update flags. `clear` names optional fields to null out.
fn listing_patch(fields: &ListingFields, clear: &[String]) -> Result<ListingPatch> {
    let mut patch = ListingPatch {
        bedrooms: set_or_keep(fields.bedrooms),
        bathrooms: set_or_keep(fields.bathrooms),
        square_footage: set_or_keep(fields.square_footage),
        contact_email: set_or_keep(fields.contact_email.clone()),
        contact_phone: set_or_keep(fields.contact_phone.clone()),
        contact_other: set_or_keep(fields.contact_other.clone()),
        housing_type: set_or_keep(fields.housing_type.clone()),
        lease_type: set_or_keep(
            fields
                .lease_type
                .as_deref()
                .map(normalize_lease_type)
                .transpose()?,
        ),
        upfront_fees: set_or_keep(fields.upfront_fees),
        utilities: non_empty(&fields.utilities),
        amenities: non_empty(&fields.amenities),
        credit_score_min: set_or_keep(fields.credit_score_min),
        minimum_income: set_or_keep(fields.minimum_income),
        references_required: fields.references_required,
        reference_document_ids: non_empty(&fields.documents).map(DocumentRefs::from),
        layout_description: set_or_keep(fields.layout_description.clone()),
        pet_policy: set_or_keep(fields.pet_policy.clone()),
        furnishing: set_or_keep(
            fields
                .furnishing
                .as_deref()
                .map(normalize_furnishing)
                .transpose()?,
        ),
        notes: set_or_keep(fields.notes.clone()),
        ..ListingPatch::default()
    };

    for field in clear {
        match field.trim().to_lowercase().replace('_', "-").as_str() {
            "bedrooms" => patch.bedrooms = Patch::Clear,
            "bathrooms" => patch.bathrooms = Patch::Clear,
            "sqft" | "square-footage" => patch.square_footage = Patch::Clear,
            "contact-email" => patch.contact_email = Patch::Clear,
            "contact-phone" => patch.contact_phone = Patch::Clear,
            "contact-other" => patch.contact_other = Patch::Clear,
            "housing-type" => patch.housing_type = Patch::Clear,
            "lease-type" => patch.lease_type = Patch::Clear,
            "upfront-fees" => patch.upfront_fees = Patch::Clear,
            "utilities" => patch.utilities = Some(Vec::new()),
            "amenities" => patch.amenities = Some(Vec::new()),
            "credit-score-min" => patch.credit_score_min = Patch::Clear,
            "minimum-income" => patch.minimum_income = Patch::Clear,
            "docs" | "documents" => patch.reference_document_ids = Some(DocumentRefs::new()),
            "layout" | "layout-description" => patch.layout_description = Patch::Clear,
            "pet-policy" => patch.pet_policy = Patch::Clear,
            "furnishing" => patch.furnishing = Patch::Clear,
            "notes" => patch.notes = Patch::Clear,
            other => {
                return Err(Error::validation(
                    "clear",
                    format!("'{other}' is not a clearable listing field"),
                ));
            }
        }
    }

    Ok(patch)
}

fn add(cli: &Cli, listing: NewListing, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let id = vault.add_listing(&listing)?;

    if json {
        print_json(&IdOutput { id })
    } else {
        println!("Added listing #{id}: {}", listing.address);
        Ok(())
    }
}

fn list(cli: &Cli, favorites_only: bool, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let mut listings = sort_listings_by_favorite(&vault.list_listings()?);
    if favorites_only {
        listings.retain(|l| l.favorite);
    }
    let favorites = favorite_count(&listings);

    if json {
        return print_json(&ListingListOutput {
            count: listings.len(),
            favorites,
            listings,
        });
    }

    if listings.is_empty() {
        println!("No listings saved.");
        return Ok(());
    }

    println!("Listings ({} saved, {favorites} favorite):", listings.len());
    println!();
    for listing in &listings {
        let star = if listing.favorite {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{star} #{:<4} {:>9.2}  {}",
            listing.id,
            listing.price_rent,
            truncate(&listing.address, 60)
        );
    }
    Ok(())
}

fn show(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let listing = vault.get_listing(id)?;
    let documents = vault.listing_documents(id)?;

    if json {
        return print_json(&ListingShowOutput { listing, documents });
    }

    println!("{} {}", format!("#{}", listing.id).bold(), listing.address.bold());
    if let Some(address) = listing.parsed_address() {
        println!("  {}, {} {}", address.city, address.state, address.zip);
    }
    println!("  Rent:      {:.2}", listing.price_rent);
    println!("  Link:      {}", listing.source_link);
    if let Some(bedrooms) = listing.bedrooms {
        println!("  Bedrooms:  {bedrooms}");
    }
    if let Some(bathrooms) = listing.bathrooms {
        println!("  Bathrooms: {bathrooms}");
    }
    if let Some(lease) = listing.lease_type {
        println!("  Lease:     {lease}");
    }
    if let Some(furnishing) = listing.furnishing {
        println!("  Furnished: {furnishing}");
    }
    if !listing.utilities.is_empty() {
        println!("  Utilities: {}", listing.utilities.join(", "));
    }
    if !listing.amenities.is_empty() {
        println!("  Amenities: {}", listing.amenities.join(", "));
    }
    if let Some(notes) = &listing.notes {
        println!("  Notes:     {notes}");
    }
    if listing.favorite {
        println!("  {}", "★ Favorite".yellow());
    }
    if !documents.is_empty() {
        println!();
        println!("{}", "Documents".cyan().bold());
        for doc in &documents {
            println!("  #{:<4} {} ({})", doc.id, doc.name, doc.document_type);
        }
    }
    Ok(())
}

fn update(cli: &Cli, id: i64, patch: ListingPatch, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.update_listing(id, patch)?;

    if json {
        print_json(&IdOutput { id })
    } else {
        println!("Updated listing #{id}");
        Ok(())
    }
}

fn favorite(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let favorite = vault.toggle_listing_favorite(id)?;

    if json {
        print_json(&FavoriteOutput { id, favorite })
    } else {
        let state = if favorite { "favorited" } else { "unfavorited" };
        println!("Listing #{id} {state}");
        Ok(())
    }
}

fn delete(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.delete_listing(id)?;

    if json {
        print_json(&DeletedOutput { id, deleted: true })
    } else {
        println!("Deleted listing #{id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeaseType;

    #[test]
    fn test_listing_patch_from_flags() {
        let fields = ListingFields {
            lease_type: Some("yearly".to_string()),
            notes: Some("near park".to_string()),
            ..ListingFields::default()
        };
        let patch = listing_patch(&fields, &["pet_policy".to_string(), "docs".to_string()]).unwrap();

        assert_eq!(patch.lease_type, Patch::Set(LeaseType::Annual));
        assert_eq!(patch.notes, Patch::Set("near park".to_string()));
        assert_eq!(patch.pet_policy, Patch::Clear);
        assert_eq!(patch.reference_document_ids, Some(DocumentRefs::new()));
        assert!(patch.bedrooms.is_keep());
        assert!(patch.utilities.is_none());
    }

    #[test]
    fn test_unknown_clear_field() {
        assert!(listing_patch(&ListingFields::default(), &["address".to_string()]).is_err());
    }
}
