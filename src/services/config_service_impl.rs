//! `SeaORM` implementation of the `ConfigService` trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use tracing::{debug, info};

use crate::constants::DEFAULT_SITE_CONFIG;
use crate::db::{ConfigRepository, Store};
use crate::models::{ConfigEntry, ConfigKind};
use crate::services::config_service::{
    BulkUpdateOutcome, ConfigError, ConfigService, ImageAssignment,
};

pub struct SeaOrmConfigService {
    store: Store,
    upload_prefix: String,
}

impl SeaOrmConfigService {
    #[must_use]
    pub const fn new(store: Store, upload_prefix: String) -> Self {
        Self {
            store,
            upload_prefix,
        }
    }
}

#[async_trait]
impl ConfigService for SeaOrmConfigService {
    async fn snapshot(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        Ok(self.store.config_repo().get_all().await?)
    }

    async fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.store.config_repo().list().await?)
    }

    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, ConfigError> {
        Ok(self.store.config_repo().get(key).await?)
    }

    async fn update_single(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::KeyMissing);
        }

        let repo = self.store.config_repo();
        let entry = repo
            .get(key)
            .await?
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;

        let value = entry
            .kind
            .validate(value, &self.upload_prefix)
            .map_err(|source| ConfigError::InvalidValue {
                key: key.to_string(),
                source,
            })?;

        repo.update_existing(key, value.as_str()).await?;
        info!(key, kind = %value.kind(), "Config value updated");
        Ok(())
    }

    async fn validate_fields(&self, fields: &[(String, String)]) -> Result<(), ConfigError> {
        let entries = self.store.config_repo().list().await?;
        let kinds: BTreeMap<&str, ConfigKind> =
            entries.iter().map(|e| (e.key.as_str(), e.kind)).collect();

        let invalid: Vec<String> = fields
            .iter()
            .filter(|(key, value)| {
                kinds
                    .get(key.as_str())
                    .is_some_and(|kind| kind.validate(value, &self.upload_prefix).is_err())
            })
            .map(|(key, _)| key.clone())
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidFields(invalid))
        }
    }

    async fn bulk_update(
        &self,
        fields: &[(String, String)],
        images: &[ImageAssignment],
    ) -> Result<BulkUpdateOutcome, ConfigError> {
        self.validate_fields(fields).await?;

        let txn = self.store.conn.begin().await?;
        let repo = ConfigRepository::new(&txn);
        let mut outcome = BulkUpdateOutcome::default();

        for (key, raw) in fields {
            let Some(entry) = repo.get(key).await? else {
                debug!(key = %key, "Ignoring unknown config field");
                outcome.ignored.push(key.clone());
                continue;
            };

            let value = entry
                .kind
                .validate(raw, &self.upload_prefix)
                .map_err(|source| ConfigError::InvalidValue {
                    key: key.clone(),
                    source,
                })?;

            repo.update_existing(key, value.as_str()).await?;
            debug!(key = %key, kind = %value.kind(), "Config field updated");
            outcome.updated += 1;
        }

        // Uploads are applied after the text fields so a file wins over a
        // URL typed into the same entry.
        for image in images {
            repo.set(&image.key, &image.public_path, ConfigKind::Image)
                .await?;
            outcome.images += 1;
        }

        txn.commit().await?;

        info!(
            updated = outcome.updated,
            images = outcome.images,
            ignored = outcome.ignored.len(),
            "Dashboard settings saved"
        );
        Ok(outcome)
    }

    async fn seed_defaults(&self) -> Result<usize, ConfigError> {
        let inserted = self
            .store
            .config_repo()
            .seed_defaults(DEFAULT_SITE_CONFIG)
            .await?;

        if inserted > 0 {
            info!(inserted, "Seeded default page content");
        }
        Ok(inserted)
    }
}
