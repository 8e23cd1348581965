use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::{Settings, SettingsError};

/// Convert any serializable settings struct to a TOML table.
fn to_table<T: Settings>(value: &T) -> Result<Table, SettingsError> {
    match Value::try_from(value)? {
        Value::Table(table) => Ok(table),
        _ => Err(SettingsError::NotATable(T::SECTION)),
    }
}

/// Merge default + delta recursively (tables only).
fn merge_tables(default: &Table, delta: &Table) -> Table {
    let mut merged = default.clone();
    for (key, delta_value) in delta {
        match (merged.get(key), delta_value) {
            (Some(Value::Table(default_table)), Value::Table(delta_table)) => {
                let nested = merge_tables(default_table, delta_table);
                merged.insert(key.clone(), Value::Table(nested));
            }
            _ => {
                merged.insert(key.clone(), delta_value.clone());
            }
        }
    }
    merged
}

fn parse_document(text: &str, path: Option<&Path>) -> Result<Table, SettingsError> {
    if text.trim().is_empty() {
        return Ok(Table::new());
    }
    text.parse::<Table>().map_err(|source| SettingsError::Parse {
        path: path.map(Path::to_path_buf),
        source,
    })
}

/// Builder for `SettingsStore`.
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Reads the settings file if one was given and it exists.
    ///
    /// A missing file is not an error: every section then resolves to its defaults.
    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let document = match &self.settings_file {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)?;
                parse_document(&content, Some(path))?
            }
            Some(path) => {
                debug!("settings file {:?} not found, using defaults", path);
                Table::new()
            }
            None => Table::new(),
        };

        Ok(SettingsStore {
            file_path: self.settings_file,
            document,
            defaults: HashMap::new(),
            values: HashMap::new(),
        })
    }
}

/// Settings store.
///
/// Holds the raw document plus one merged (defaults + file) table per
/// registered section.
#[derive(Debug)]
pub struct SettingsStore {
    file_path: Option<PathBuf>,
    document: Table,
    defaults: HashMap<&'static str, Table>,
    values: HashMap<&'static str, Table>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    /// Store backed by an in-memory TOML document instead of a file.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            file_path: None,
            document: parse_document(text, None)?,
            defaults: HashMap::new(),
            values: HashMap::new(),
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Check if a section is already registered.
    pub fn is_registered<T: Settings>(&self) -> bool {
        self.values.contains_key(T::name())
    }

    /// Register a section type (loads defaults and applies the file's table if present).
    ///
    /// The merged value is validated immediately so a malformed section is
    /// reported here rather than on first access.
    pub fn register<T: Settings>(&mut self) -> Result<(), SettingsError> {
        let section = T::name();
        if self.values.contains_key(section) {
            return Err(SettingsError::AlreadyRegistered(section));
        }

        let default_table = to_table(&T::default())?;
        let merged = match self.document.get(section) {
            Some(Value::Table(delta)) => merge_tables(&default_table, delta),
            Some(_) => return Err(SettingsError::NotATable(section)),
            None => default_table.clone(),
        };

        Value::Table(merged.clone())
            .try_into::<T>()
            .map_err(|source| SettingsError::Section { section, source })?;

        self.defaults.insert(section, default_table);
        self.values.insert(section, merged);
        Ok(())
    }

    /// Typed view of a registered section.
    pub fn get<T: Settings>(&self) -> Result<T, SettingsError> {
        let section = T::name();
        let table = self
            .values
            .get(section)
            .ok_or(SettingsError::NotRegistered(section))?;
        Value::Table(table.clone())
            .try_into::<T>()
            .map_err(|source| SettingsError::Section { section, source })
    }

    /// Registers the section on first use, then returns it.
    pub fn load<T: Settings>(&mut self) -> Result<T, SettingsError> {
        if !self.is_registered::<T>() {
            self.register::<T>()?;
        }
        self.get::<T>()
    }

    /// Re-read the backing file and re-merge every registered section.
    ///
    /// Stores built from a string keep their document unchanged.
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(path) = &self.file_path {
            self.document = if path.exists() {
                parse_document(&fs::read_to_string(path)?, Some(path))?
            } else {
                Table::new()
            };
        }

        for (section, default_table) in &self.defaults {
            let merged = match self.document.get(*section) {
                Some(Value::Table(delta)) => merge_tables(default_table, delta),
                Some(_) => return Err(SettingsError::NotATable(*section)),
                None => default_table.clone(),
            };
            self.values.insert(*section, merged);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_defaults_for_missing_keys() {
        let default: Table = "a = 1\nb = 2\n[nested]\nc = 3\nd = 4".parse().unwrap();
        let delta: Table = "b = 20\n[nested]\nd = 40".parse().unwrap();

        let merged = merge_tables(&default, &delta);

        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(20));
        assert_eq!(merged["nested"]["c"].as_integer(), Some(3));
        assert_eq!(merged["nested"]["d"].as_integer(), Some(40));
    }

    #[test]
    fn blank_document_is_empty_table() {
        assert!(parse_document("  \n", None).unwrap().is_empty());
    }
}
