//! Conditional `UPDATE` statements for the catalog.
//!
//! Each statement only touches rows that still carry the placeholder photo,
//! so photos curated by hand after a previous run survive a re-import.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::config::OutputConfig;

const HEADER: &str = "-- Auto-generated: encyclopedia photos for persons\n\
                      -- Run after the initial seed to replace placeholder photos\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub display_name: String,
    pub photo_path: String,
}

/// Quote `value` as a single-quoted SQL literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub struct UpdateEmitter {
    table: String,
    name_column: String,
    photo_column: String,
    placeholder: String,
    records: Vec<UpdateRecord>,
}

impl UpdateEmitter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            table: config.table.clone(),
            name_column: config.name_column.clone(),
            photo_column: config.photo_column.clone(),
            placeholder: config.placeholder.clone(),
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, display_name: &str, photo_path: &str) {
        self.records.push(UpdateRecord {
            display_name: display_name.to_string(),
            photo_path: photo_path.to_string(),
        });
    }

    pub fn records(&self) -> &[UpdateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn statement(&self, record: &UpdateRecord) -> String {
        format!(
            "UPDATE {table} SET {photo} = {path} WHERE {name} = {value} AND {photo} = {placeholder};",
            table = self.table,
            photo = self.photo_column,
            path = sql_literal(&record.photo_path),
            name = self.name_column,
            value = sql_literal(&record.display_name),
            placeholder = sql_literal(&self.placeholder),
        )
    }

    /// Full artifact text: header, then one statement per line.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for record in &self.records {
            let _ = writeln!(out, "{}", self.statement(record));
        }
        out
    }

    /// Replace `path` with the rendered artifact in one step.
    ///
    /// Returns `false` without touching the file when there is nothing to emit.
    pub fn write_artifact(&self, path: &Path) -> Result<bool> {
        if self.records.is_empty() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        fs::write(tmp_path, self.render())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(tmp_path, path)
            .with_context(|| format!("Failed to move update artifact to {}", path.display()))?;

        Ok(true)
    }
}
