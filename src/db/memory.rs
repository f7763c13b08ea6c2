// SPDX-License-Identifier: MIT

//! In-memory store for tests and embedding.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::{ActivityStore, CredentialStore};
use crate::error::Result;
use crate::models::{Activity, Credentials};

/// In-memory implementation of both store traits.
#[derive(Default)]
pub struct MemoryStore {
    activities: Mutex<HashMap<u64, Activity>>,
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn bulk_upsert(&self, activities: &[Activity]) -> Result<()> {
        let mut table = self.activities.lock().expect("store lock poisoned");
        for activity in activities {
            table.insert(activity.id, activity.clone());
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Activity>> {
        let table = self.activities.lock().expect("store lock poisoned");
        let mut all: Vec<Activity> = table.values().cloned().collect();
        all.sort_by_key(|a| std::cmp::Reverse(a.start_date_utc()));
        Ok(all)
    }

    async fn clear_all(&self) -> Result<()> {
        self.activities
            .lock()
            .expect("store lock poisoned")
            .clear();
        Ok(())
    }

    async fn replace_all(&self, activities: &[Activity]) -> Result<()> {
        let mut table = self.activities.lock().expect("store lock poisoned");
        table.clear();
        for activity in activities {
            table.insert(activity.id, activity.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .expect("store lock poisoned")
            .clone())
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.credentials.lock().expect("store lock poisoned") = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.credentials.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}
