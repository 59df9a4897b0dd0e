use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use std::collections::{BTreeMap, HashSet};

use crate::entities::{prelude::*, site_config};
use crate::models::{ConfigEntry, ConfigKind};

impl From<site_config::Model> for ConfigEntry {
    fn from(model: site_config::Model) -> Self {
        Self {
            kind: ConfigKind::from_db(&model.kind),
            key: model.key,
            value: model.value.unwrap_or_default(),
        }
    }
}

/// Key-value access to the `site_config` table.
///
/// Generic over the connection so several writes can share one transaction.
pub struct ConfigRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ConfigRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Full snapshot used to render the story page. Null values map to "".
    pub async fn get_all(&self) -> Result<BTreeMap<String, String>> {
        let rows = SiteConfig::find()
            .all(self.conn)
            .await
            .context("Failed to load site config")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.key, row.value.unwrap_or_default()))
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<ConfigEntry>> {
        let rows = SiteConfig::find()
            .order_by_asc(site_config::Column::Key)
            .all(self.conn)
            .await
            .context("Failed to list site config")?;

        Ok(rows.into_iter().map(ConfigEntry::from).collect())
    }

    pub async fn get(&self, key: &str) -> Result<Option<ConfigEntry>> {
        let row = SiteConfig::find_by_id(key.to_string())
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to query config key '{key}'"))?;

        Ok(row.map(ConfigEntry::from))
    }

    /// Upsert. A new entry gets `kind`; an existing one keeps its kind and
    /// only has its value replaced.
    pub async fn set(&self, key: &str, value: &str, kind: ConfigKind) -> Result<()> {
        let existing = SiteConfig::find_by_id(key.to_string())
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to query config key '{key}'"))?;

        if let Some(model) = existing {
            let mut active: site_config::ActiveModel = model.into();
            active.value = Set(Some(value.to_string()));
            active.update(self.conn).await?;
        } else {
            let active = site_config::ActiveModel {
                key: Set(key.to_string()),
                value: Set(Some(value.to_string())),
                kind: Set(kind.as_str().to_string()),
            };
            SiteConfig::insert(active)
                .exec_without_returning(self.conn)
                .await?;
        }

        Ok(())
    }

    /// Overwrites the value of an existing entry. Returns `false` without
    /// writing anything when the key does not exist.
    pub async fn update_existing(&self, key: &str, value: &str) -> Result<bool> {
        let Some(model) = SiteConfig::find_by_id(key.to_string())
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to query config key '{key}'"))?
        else {
            return Ok(false);
        };

        let mut active: site_config::ActiveModel = model.into();
        active.value = Set(Some(value.to_string()));
        active.update(self.conn).await?;

        Ok(true)
    }

    /// Inserts every default whose key is absent. Existing values are left
    /// untouched. Returns the number of inserted entries.
    pub async fn seed_defaults(&self, defaults: &[(&str, &str, ConfigKind)]) -> Result<usize> {
        let present: HashSet<String> = SiteConfig::find()
            .select_only()
            .column(site_config::Column::Key)
            .into_tuple::<String>()
            .all(self.conn)
            .await
            .context("Failed to load existing config keys")?
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let missing: Vec<site_config::ActiveModel> = defaults
            .iter()
            .filter(|(key, _, _)| !present.contains(*key) && seen.insert(*key))
            .map(|(key, value, kind)| site_config::ActiveModel {
                key: Set((*key).to_string()),
                value: Set(Some((*value).to_string())),
                kind: Set(kind.as_str().to_string()),
            })
            .collect();

        let inserted = missing.len();
        if inserted > 0 {
            SiteConfig::insert_many(missing)
                .exec_without_returning(self.conn)
                .await
                .context("Failed to seed default config")?;
        }

        Ok(inserted)
    }
}
