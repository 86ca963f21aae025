//! Dynamic UPDATE statements for partial updates.

use crate::model::Patch;
use rusqlite::ToSql;
use rusqlite::Transaction;
use rusqlite::types::Null;

/// Collects `column = ?` clauses from a partial update.
///
/// `updated_at` is always written, so an update that mentions no field still
/// re-stamps the row.
pub(crate) struct Update {
    table: &'static str,
    set_clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Update {
    pub(crate) fn new(table: &'static str) -> Self {
        Self {
            table,
            set_clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Set a required column when a value is given.
    pub(crate) fn set<T: ToSql + 'static>(&mut self, column: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.push(column, Box::new(value));
        }
    }

    /// Apply an optional column's patch. `Clear` writes NULL.
    pub(crate) fn patch<T: ToSql + 'static>(&mut self, column: &'static str, patch: Patch<T>) {
        match patch.into_change() {
            None => {}
            Some(None) => self.push(column, Box::new(Null)),
            Some(Some(value)) => self.push(column, Box::new(value)),
        }
    }

    fn push(&mut self, column: &'static str, value: Box<dyn ToSql>) {
        self.set_clauses.push(format!("{column} = ?"));
        self.params.push(value);
    }

    /// Number of fields being changed, not counting `updated_at`.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.set_clauses.len()
    }

    /// Run the update on row `id`. Returns the number of rows changed.
    pub(crate) fn execute(self, tx: &Transaction, id: i64, now: i64) -> rusqlite::Result<usize> {
        let mut set_clauses = vec!["updated_at = ?".to_string()];
        set_clauses.extend(self.set_clauses);

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            self.table,
            set_clauses.join(", ")
        );

        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(self.params.len() + 2);
        params.push(&now);
        params.extend(self.params.iter().map(|p| p.as_ref()));
        params.push(&id);

        tx.execute(&sql, params.as_slice())
    }
}
