//! Profile, income source and additional-info repositories.

use crate::error::{Error, Result};
use crate::model::{
    AdditionalInfo, AdditionalInfoPatch, Entity, IncomeKind, IncomeSource, IncomeSourcePatch,
    NewAdditionalInfo, NewIncomeSource, Profile, ProfileFields, ProfilePatch,
};
use crate::storage::EncryptedStore;
use crate::storage::codec::{Cell, decode_date, decode_enum, encode_date};
use crate::storage::update::Update;
use crate::validate::{non_negative, require_text};
use rusqlite::OptionalExtension;

/// The profile table holds at most this row.
const PROFILE_ID: i64 = 1;

const PROFILE_COLUMNS: &str =
    "fullname, date_of_birth, gender, phone, email, address, monthly_income, created_at, updated_at";

const INCOME_COLUMNS: &str = "id, source, employer_name, job_title, employment_length,
    employer_contact, created_at, updated_at";

const INFO_COLUMNS: &str = "id, label, value, icon, created_at, updated_at";

fn profile_not_found() -> Error {
    Error::NotFound {
        entity: Entity::Profile,
        id: PROFILE_ID,
    }
}

impl EncryptedStore {
    // ======================
    // Profile
    // ======================

    /// Create or replace the profile. `created_at` survives a replace.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or negative income.
    pub fn save_profile(&mut self, fields: &ProfileFields) -> Result<()> {
        require_text("fullname", &fields.fullname)?;
        if let Some(income) = fields.monthly_income {
            non_negative("monthly_income", income)?;
        }
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("save_profile", |tx| {
            tx.execute(
                "INSERT INTO profile (id, fullname, date_of_birth, gender, phone, email, address, monthly_income, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                   fullname = excluded.fullname,
                   date_of_birth = excluded.date_of_birth,
                   gender = excluded.gender,
                   phone = excluded.phone,
                   email = excluded.email,
                   address = excluded.address,
                   monthly_income = excluded.monthly_income,
                   updated_at = excluded.updated_at",
                rusqlite::params![
                    PROFILE_ID,
                    fields.fullname,
                    fields.date_of_birth.map(encode_date),
                    fields.gender,
                    fields.phone,
                    fields.email,
                    fields.address,
                    fields.monthly_income,
                    now,
                ],
            )?;
            Ok(())
        })
    }

    /// Get the profile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no profile has been saved.
    pub fn get_profile(&self) -> Result<Profile> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE id = ?1");
        self.conn()
            .query_row(&sql, [PROFILE_ID], map_profile_row)
            .optional()?
            .ok_or_else(profile_not_found)
    }

    /// Apply a partial update to the profile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no profile has been saved.
    pub fn update_profile(&mut self, patch: ProfilePatch) -> Result<()> {
        if let Some(name) = &patch.fullname {
            require_text("fullname", name)?;
        }
        if let Some(&income) = patch.monthly_income.as_set() {
            non_negative("monthly_income", income)?;
        }
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("profile");
        update.set("fullname", patch.fullname);
        update.patch("date_of_birth", patch.date_of_birth.map(encode_date));
        update.patch("gender", patch.gender);
        update.patch("phone", patch.phone);
        update.patch("email", patch.email);
        update.patch("address", patch.address);
        update.patch("monthly_income", patch.monthly_income);

        self.mutate("update_profile", |tx| {
            if update.execute(tx, PROFILE_ID, now)? == 0 {
                return Err(profile_not_found());
            }
            Ok(())
        })
    }

    /// Delete the profile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no profile has been saved.
    pub fn delete_profile(&mut self) -> Result<()> {
        self.mutate("delete_profile", |tx| {
            if tx.execute("DELETE FROM profile WHERE id = ?1", [PROFILE_ID])? == 0 {
                return Err(profile_not_found());
            }
            Ok(())
        })
    }

    /// Monthly income from the profile; `None` when unset or no profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_monthly_income(&self) -> Result<Option<f64>> {
        let income: Option<Option<f64>> = self
            .conn()
            .query_row(
                "SELECT monthly_income FROM profile WHERE id = ?1",
                [PROFILE_ID],
                |row| row.get(0),
            )
            .optional()?;
        Ok(income.flatten())
    }

    /// Set the profile's monthly income.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no profile has been saved, or a validation
    /// error for a negative amount.
    pub fn set_monthly_income(&mut self, amount: f64) -> Result<()> {
        self.update_profile(ProfilePatch {
            monthly_income: crate::model::Patch::Set(amount),
            ..ProfilePatch::default()
        })
    }

    // ======================
    // Income sources
    // ======================

    /// Add an income source. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_income_source(&mut self, income: &NewIncomeSource) -> Result<i64> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("add_income_source", |tx| {
            tx.execute(
                "INSERT INTO income_sources (source, employer_name, job_title, employment_length, employer_contact, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![
                    income.source.as_str(),
                    income.employer_name,
                    income.job_title,
                    income.employment_length,
                    income.employer_contact,
                    now,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Get an income source.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no income source has this id.
    pub fn get_income_source(&self, id: i64) -> Result<IncomeSource> {
        let sql = format!("SELECT {INCOME_COLUMNS} FROM income_sources WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], map_income_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: Entity::IncomeSource,
                id,
            })
    }

    /// All income sources, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_income_sources(&self) -> Result<Vec<IncomeSource>> {
        let sql =
            format!("SELECT {INCOME_COLUMNS} FROM income_sources ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_income_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Apply a partial update to an income source.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no income source has this id.
    pub fn update_income_source(&mut self, id: i64, patch: IncomeSourcePatch) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("income_sources");
        update.set("source", patch.source.map(|s| s.as_str()));
        update.patch("employer_name", patch.employer_name);
        update.patch("job_title", patch.job_title);
        update.patch("employment_length", patch.employment_length);
        update.patch("employer_contact", patch.employer_contact);

        self.mutate("update_income_source", |tx| {
            if update.execute(tx, id, now)? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::IncomeSource,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Delete an income source.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no income source has this id.
    pub fn delete_income_source(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_income_source", |tx| {
            if tx.execute("DELETE FROM income_sources WHERE id = ?1", [id])? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::IncomeSource,
                    id,
                });
            }
            Ok(())
        })
    }

    // ======================
    // Additional info
    // ======================

    /// Add a label/value pair. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty label.
    pub fn add_additional_info(&mut self, info: &NewAdditionalInfo) -> Result<i64> {
        self.set_additional_info(None, info)
    }

    /// Insert a pair, or replace the one with `id` (creating it under that id
    /// if absent). Returns the row id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty label.
    pub fn set_additional_info(&mut self, id: Option<i64>, info: &NewAdditionalInfo) -> Result<i64> {
        require_text("label", &info.label)?;
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("set_additional_info", |tx| {
            tx.execute(
                "INSERT INTO additional_info (id, label, value, icon, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                   label = excluded.label,
                   value = excluded.value,
                   icon = excluded.icon,
                   updated_at = excluded.updated_at",
                rusqlite::params![id, info.label, info.value, info.icon, now],
            )?;
            Ok(id.unwrap_or_else(|| tx.last_insert_rowid()))
        })
    }

    /// Get one label/value pair.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this id.
    pub fn get_additional_info(&self, id: i64) -> Result<AdditionalInfo> {
        let sql = format!("SELECT {INFO_COLUMNS} FROM additional_info WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], map_info_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: Entity::AdditionalInfo,
                id,
            })
    }

    /// All label/value pairs, oldest first (display order).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_additional_info(&self) -> Result<Vec<AdditionalInfo>> {
        let sql = format!("SELECT {INFO_COLUMNS} FROM additional_info ORDER BY created_at ASC, id ASC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_info_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Apply a partial update to a label/value pair.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this id.
    pub fn update_additional_info(&mut self, id: i64, patch: AdditionalInfoPatch) -> Result<()> {
        if let Some(label) = &patch.label {
            require_text("label", label)?;
        }
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("additional_info");
        update.set("label", patch.label);
        update.set("value", patch.value);
        update.patch("icon", patch.icon);

        self.mutate("update_additional_info", |tx| {
            if update.execute(tx, id, now)? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::AdditionalInfo,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Delete a label/value pair.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this id.
    pub fn delete_additional_info(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_additional_info", |tx| {
            if tx.execute("DELETE FROM additional_info WHERE id = ?1", [id])? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::AdditionalInfo,
                    id,
                });
            }
            Ok(())
        })
    }
}

fn map_profile_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        fullname: row.get(0)?,
        date_of_birth: decode_date(row.get(1)?, Cell::new("profile", "date_of_birth", PROFILE_ID)),
        gender: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        address: row.get(5)?,
        monthly_income: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_income_row(row: &rusqlite::Row) -> rusqlite::Result<IncomeSource> {
    let id: i64 = row.get(0)?;
    Ok(IncomeSource {
        id,
        source: decode_enum(
            row.get(1)?,
            IncomeKind::from_stored,
            Cell::new("income_sources", "source", id),
        )
        .unwrap_or(IncomeKind::Other),
        employer_name: row.get(2)?,
        job_title: row.get(3)?,
        employment_length: row.get(4)?,
        employer_contact: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_info_row(row: &rusqlite::Row) -> rusqlite::Result<AdditionalInfo> {
    Ok(AdditionalInfo {
        id: row.get(0)?,
        label: row.get(1)?,
        value: row.get(2)?,
        icon: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
