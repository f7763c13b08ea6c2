// SPDX-License-Identifier: MIT

//! JSON-file store: durable local persistence without a database server.
//!
//! The whole activity table lives in one JSON file, the credential record in
//! another. Writes go through a temp file and rename so a crash mid-write
//! never truncates existing data, and they complete before control returns.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{ActivityStore, CredentialStore};
use crate::error::{Error, Result};
use crate::models::{Activity, Credentials};

const ACTIVITIES_FILE: &str = "activities.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// File-backed implementation of both store traits.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating the directory if needed) a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("creating {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("reading {}: {}", path.display(), e)))?;
        let value = serde_json::from_str(&contents)
            .map_err(|e| Error::Storage(format!("parsing {}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| Error::Storage(format!("serializing {}: {}", path.display(), e)))?;
        fs::write(&tmp, json)
            .map_err(|e| Error::Storage(format!("writing {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Storage(format!("replacing {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn load_activity_table(&self) -> Result<HashMap<u64, Activity>> {
        let all: Vec<Activity> = self.read_json(ACTIVITIES_FILE)?.unwrap_or_default();
        Ok(all.into_iter().map(|a| (a.id, a)).collect())
    }

    fn store_activity_table(&self, table: &HashMap<u64, Activity>) -> Result<()> {
        let all: Vec<&Activity> = table.values().collect();
        self.write_json(ACTIVITIES_FILE, &all)
    }
}

#[async_trait]
impl ActivityStore for JsonFileStore {
    async fn bulk_upsert(&self, activities: &[Activity]) -> Result<()> {
        let mut table = self.load_activity_table()?;
        for activity in activities {
            table.insert(activity.id, activity.clone());
        }
        self.store_activity_table(&table)
    }

    async fn get_all(&self) -> Result<Vec<Activity>> {
        let table = self.load_activity_table()?;
        let mut all: Vec<Activity> = table.into_values().collect();
        all.sort_by_key(|a| std::cmp::Reverse(a.start_date_utc()));
        Ok(all)
    }

    async fn clear_all(&self) -> Result<()> {
        self.write_json::<Vec<Activity>>(ACTIVITIES_FILE, &Vec::new())
    }

    async fn replace_all(&self, activities: &[Activity]) -> Result<()> {
        let table: HashMap<u64, Activity> =
            activities.iter().map(|a| (a.id, a.clone())).collect();
        self.store_activity_table(&table)
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Credentials>> {
        self.read_json(CREDENTIALS_FILE)
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        self.write_json(CREDENTIALS_FILE, credentials)
    }

    async fn clear(&self) -> Result<()> {
        let path = self.dir.join(CREDENTIALS_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::Storage(format!("removing {}: {}", path.display(), e)))?;
        }
        Ok(())
    }
}
