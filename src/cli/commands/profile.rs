//! Profile, income source and additional info commands.

use super::{DeletedOutput, IdOutput, open_vault, optional_date, print_json};
use crate::cli::{Cli, ExtraCommands, IncomeArgs, IncomeCommands, ProfileArgs, ProfileCommands};
use crate::error::{Error, Result};
use crate::model::{
    AdditionalInfo, AdditionalInfoPatch, IncomeSource, IncomeSourcePatch, NewAdditionalInfo,
    NewIncomeSource, Patch, Profile, ProfileFields, ProfilePatch,
};
use crate::validate::normalize_income_kind;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct MonthlyIncomeOutput {
    monthly_income: Option<f64>,
}

#[derive(Serialize)]
struct IncomeListOutput {
    income_sources: Vec<IncomeSource>,
    count: usize,
}

#[derive(Serialize)]
struct ExtraListOutput {
    items: Vec<AdditionalInfo>,
    count: usize,
}

fn set_or_keep<T>(value: Option<T>) -> Patch<T> {
    value.map_or(Patch::Keep, Patch::Set)
}

fn unknown_field(kind: &str, field: &str) -> Error {
    Error::validation("clear", format!("'{field}' is not a clearable {kind} field"))
}

fn done(json: bool, id: Option<i64>, message: &str) -> Result<()> {
    if json {
        match id {
            Some(id) => print_json(&IdOutput { id }),
            None => print_json(&serde_json::json!({ "success": true })),
        }
    } else {
        println!("{message}");
        Ok(())
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Execute profile commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute(command: &ProfileCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        ProfileCommands::Save { fullname, fields } => {
            let fields = ProfileFields {
                fullname: fullname.clone(),
                date_of_birth: optional_date("date_of_birth", fields.dob.as_deref())?,
                gender: fields.gender.clone(),
                phone: fields.phone.clone(),
                email: fields.contact_email.clone(),
                address: fields.address.clone(),
                monthly_income: fields.income,
            };
            open_vault(cli)?.save_profile(&fields)?;
            done(json, None, "Saved profile")
        }
        ProfileCommands::Show => {
            let profile = open_vault(cli)?.get_profile()?;
            if json {
                print_json(&profile)
            } else {
                print_profile(&profile);
                Ok(())
            }
        }
        ProfileCommands::Update {
            fullname,
            fields,
            clear,
        } => {
            let patch = profile_patch(fullname.clone(), fields, clear)?;
            open_vault(cli)?.update_profile(patch)?;
            done(json, None, "Updated profile")
        }
        ProfileCommands::MonthlyIncome { amount } => {
            let vault = open_vault(cli)?;
            if let Some(amount) = amount {
                vault.set_monthly_income(*amount)?;
            }
            let monthly_income = vault.get_monthly_income()?;
            if json {
                print_json(&MonthlyIncomeOutput { monthly_income })
            } else {
                match monthly_income {
                    Some(income) => println!("Monthly income: {income:.2}"),
                    None => println!("Monthly income: not set"),
                }
                Ok(())
            }
        }
        ProfileCommands::Delete => {
            open_vault(cli)?.delete_profile()?;
            done(json, None, "Deleted profile")
        }
    }
}

fn profile_patch(fullname: Option<String>, fields: &ProfileArgs, clear: &[String]) -> Result<ProfilePatch> {
    let mut patch = ProfilePatch {
        fullname,
        date_of_birth: set_or_keep(optional_date("date_of_birth", fields.dob.as_deref())?),
        gender: set_or_keep(fields.gender.clone()),
        phone: set_or_keep(fields.phone.clone()),
        email: set_or_keep(fields.contact_email.clone()),
        address: set_or_keep(fields.address.clone()),
        monthly_income: set_or_keep(fields.income),
    };

    for field in clear {
        match field.trim().to_lowercase().replace('_', "-").as_str() {
            "dob" | "date-of-birth" => patch.date_of_birth = Patch::Clear,
            "gender" => patch.gender = Patch::Clear,
            "phone" => patch.phone = Patch::Clear,
            "email" | "contact-email" => patch.email = Patch::Clear,
            "address" => patch.address = Patch::Clear,
            "income" | "monthly-income" => patch.monthly_income = Patch::Clear,
            other => return Err(unknown_field("profile", other)),
        }
    }
    Ok(patch)
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.fullname.bold());
    let rows = [
        ("Born", profile.date_of_birth.map(|d| d.to_string())),
        ("Gender", profile.gender.clone()),
        ("Phone", profile.phone.clone()),
        ("Email", profile.email.clone()),
        ("Address", profile.address.clone()),
        ("Income", profile.monthly_income.map(|i| format!("{i:.2} / month"))),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {label:<8} {value}");
        }
    }
}

// ============================================================================
// Income sources
// ============================================================================

/// Execute income source commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute_income(command: &IncomeCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        IncomeCommands::Add { source, fields } => {
            let income = NewIncomeSource {
                employer_name: fields.employer.clone(),
                job_title: fields.title.clone(),
                employment_length: fields.length.clone(),
                employer_contact: fields.contact.clone(),
                ..NewIncomeSource::new(normalize_income_kind(source)?)
            };
            let id = open_vault(cli)?.add_income_source(&income)?;
            done(json, Some(id), &format!("Added income source #{id}"))
        }
        IncomeCommands::List => {
            let income_sources = open_vault(cli)?.list_income_sources()?;
            if json {
                return print_json(&IncomeListOutput {
                    count: income_sources.len(),
                    income_sources,
                });
            }
            if income_sources.is_empty() {
                println!("No income sources.");
            }
            for income in &income_sources {
                print_income(income);
            }
            Ok(())
        }
        IncomeCommands::Show { id } => {
            let income = open_vault(cli)?.get_income_source(*id)?;
            if json {
                print_json(&income)
            } else {
                print_income(&income);
                Ok(())
            }
        }
        IncomeCommands::Update {
            id,
            source,
            fields,
            clear,
        } => {
            let patch = income_patch(source.as_deref(), fields, clear)?;
            open_vault(cli)?.update_income_source(*id, patch)?;
            done(json, Some(*id), &format!("Updated income source #{id}"))
        }
        IncomeCommands::Delete { id } => {
            open_vault(cli)?.delete_income_source(*id)?;
            if json {
                print_json(&DeletedOutput { id: *id, deleted: true })
            } else {
                println!("Deleted income source #{id}");
                Ok(())
            }
        }
    }
}

fn income_patch(source: Option<&str>, fields: &IncomeArgs, clear: &[String]) -> Result<IncomeSourcePatch> {
    let mut patch = IncomeSourcePatch {
        source: source.map(normalize_income_kind).transpose()?,
        employer_name: set_or_keep(fields.employer.clone()),
        job_title: set_or_keep(fields.title.clone()),
        employment_length: set_or_keep(fields.length.clone()),
        employer_contact: set_or_keep(fields.contact.clone()),
    };

    for field in clear {
        match field.trim().to_lowercase().as_str() {
            "employer" => patch.employer_name = Patch::Clear,
            "title" => patch.job_title = Patch::Clear,
            "length" => patch.employment_length = Patch::Clear,
            "contact" => patch.employer_contact = Patch::Clear,
            other => return Err(unknown_field("income source", other)),
        }
    }
    Ok(patch)
}

fn print_income(income: &IncomeSource) {
    let employer = income.employer_name.as_deref().unwrap_or("-");
    let title = income
        .job_title
        .as_deref()
        .map(|t| format!(" ({t})"))
        .unwrap_or_default();
    println!("#{:<4} {:<14} {employer}{title}", income.id, income.source.label());
}

// ============================================================================
// Additional info
// ============================================================================

/// Execute additional info commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute_extra(command: &ExtraCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        ExtraCommands::Add { label, value, icon } => {
            let info = NewAdditionalInfo {
                icon: icon.clone(),
                ..NewAdditionalInfo::new(label.as_str(), value.as_str())
            };
            let id = open_vault(cli)?.add_additional_info(&info)?;
            done(json, Some(id), &format!("Added #{id}: {label}"))
        }
        ExtraCommands::Set {
            id,
            label,
            value,
            icon,
        } => {
            let info = NewAdditionalInfo {
                icon: icon.clone(),
                ..NewAdditionalInfo::new(label.as_str(), value.as_str())
            };
            let id = open_vault(cli)?.set_additional_info(*id, &info)?;
            done(json, Some(id), &format!("Saved #{id}: {label}"))
        }
        ExtraCommands::List => {
            let items = open_vault(cli)?.list_additional_info()?;
            if json {
                return print_json(&ExtraListOutput {
                    count: items.len(),
                    items,
                });
            }
            if items.is_empty() {
                println!("No additional information.");
            }
            for item in &items {
                let icon = item.icon.as_deref().unwrap_or("•");
                println!("{icon} #{:<4} {}: {}", item.id, item.label.bold(), item.value);
            }
            Ok(())
        }
        ExtraCommands::Show { id } => {
            let item = open_vault(cli)?.get_additional_info(*id)?;
            if json {
                print_json(&item)
            } else {
                println!("{}: {}", item.label.bold(), item.value);
                Ok(())
            }
        }
        ExtraCommands::Update {
            id,
            label,
            value,
            icon,
            clear_icon,
        } => {
            let patch = AdditionalInfoPatch {
                label: label.clone(),
                value: value.clone(),
                icon: if *clear_icon {
                    Patch::Clear
                } else {
                    set_or_keep(icon.clone())
                },
            };
            open_vault(cli)?.update_additional_info(*id, patch)?;
            done(json, Some(*id), &format!("Updated #{id}"))
        }
        ExtraCommands::Delete { id } => {
            open_vault(cli)?.delete_additional_info(*id)?;
            if json {
                print_json(&DeletedOutput { id: *id, deleted: true })
            } else {
                println!("Deleted #{id}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_profile_patch_from_flags() {
        let fields = ProfileArgs {
            dob: Some("1990-04-01".to_string()),
            ..ProfileArgs::default()
        };
        let patch = profile_patch(None, &fields, &["phone".to_string()]).unwrap();

        assert_eq!(
            patch.date_of_birth,
            Patch::Set(NaiveDate::from_ymd_opt(1990, 4, 1).unwrap())
        );
        assert_eq!(patch.phone, Patch::Clear);
        assert!(patch.gender.is_keep());
        assert!(profile_patch(None, &ProfileArgs::default(), &["fullname".to_string()]).is_err());
    }

    #[test]
    fn test_income_patch_normalizes_source() {
        let patch = income_patch(Some("freelance"), &IncomeArgs::default(), &[]).unwrap();
        assert_eq!(patch.source, Some(crate::model::IncomeKind::SelfEmployed));
    }
}
