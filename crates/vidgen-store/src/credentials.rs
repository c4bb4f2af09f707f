//! Access to the externally-owned credential table.
//!
//! Credentials are provisioned out of band (seed scripts, admin tooling);
//! the API surface only ever reads them. Row order is the resolution
//! order.

use sqlx::SqlitePool;

use vidgen_models::Credential;

use crate::error::{StoreError, StoreResult};
use crate::rows::CredentialRow;

#[derive(Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All stored credentials in provisioning order.
    pub async fn list(&self) -> StoreResult<Vec<Credential>> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, provider, api_key, enabled, video_enabled, allowed_models
             FROM credentials ORDER BY position, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Credential::try_from).collect()
    }

    /// Provisioning aid used by seed tooling; request handlers never write
    /// credentials.
    pub async fn insert(&self, credential: &Credential, position: i64) -> StoreResult<()> {
        let allowed_models = credential
            .allowed_models
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::corrupt("credentials", e.to_string()))?;

        sqlx::query(
            "INSERT INTO credentials (id, provider, api_key, enabled, video_enabled, allowed_models, position)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&credential.id)
        .bind(credential.provider.as_str())
        .bind(&credential.api_key)
        .bind(credential.enabled)
        .bind(credential.video_enabled)
        .bind(allowed_models)
        .bind(position)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_memory, migrate};
    use vidgen_models::Provider;

    fn credential(id: &str, provider: Provider, allowed: Option<Vec<String>>) -> Credential {
        Credential {
            id: id.into(),
            provider,
            api_key: format!("key-{id}"),
            enabled: true,
            video_enabled: true,
            allowed_models: allowed,
        }
    }

    #[tokio::test]
    async fn test_list_in_provisioning_order() {
        let pool = connect_memory().await.unwrap();
        migrate(&pool).await.unwrap();

        let repo = CredentialRepository::new(pool);
        repo.insert(&credential("b", Provider::WaveSpeed, None), 2)
            .await
            .unwrap();
        repo.insert(&credential("a", Provider::OpenAi, None), 1)
            .await
            .unwrap();

        let creds = repo.list().await.unwrap();
        let ids: Vec<&str> = creds.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(creds[0].provider, Provider::OpenAi);
    }

    #[tokio::test]
    async fn test_allow_list_round_trips_as_json() {
        let pool = connect_memory().await.unwrap();
        migrate(&pool).await.unwrap();

        let repo = CredentialRepository::new(pool);
        repo.insert(
            &credential("a", Provider::OpenAi, Some(vec!["sora-2".into()])),
            1,
        )
        .await
        .unwrap();

        let creds = repo.list().await.unwrap();
        assert_eq!(creds[0].allowed_models, Some(vec!["sora-2".to_string()]));
    }
}
