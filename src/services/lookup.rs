//! src/services/lookup.rs
//!
//! Tenant → prefix lookup. The router only needs a read-only `get`; the
//! mapping itself is written by an external administrative process.
//! Backed by SQLite; tests use the in-memory map in `services::memory`.

use crate::models::tenant::TenantPrefix;
use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{io, str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::debug;

const INIT_MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Read-only key → value lookup from tenant identifier to storage prefix.
#[async_trait]
pub trait PrefixLookup: Send + Sync {
    /// Prefix mapped to `tenant`, or `None` when the tenant is unmapped.
    async fn get(&self, tenant: &str) -> LookupResult<Option<String>>;

    /// Cheap connectivity check used by `/_/readyz`.
    async fn health_check(&self) -> LookupResult<()>;
}

/// Lookup backed by the `tenant_prefixes` SQLite table.
#[derive(Clone)]
pub struct SqlitePrefixLookup {
    db: Arc<SqlitePool>,
}

impl SqlitePrefixLookup {
    /// Wrap an existing pool.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str) -> LookupResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let db_path = options.get_filename();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
        debug!("Opening SQLite lookup at {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create the mapping table from the embedded migration.
    pub async fn migrate(&self) -> LookupResult<()> {
        let statements = INIT_MIGRATION
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PrefixLookup for SqlitePrefixLookup {
    async fn get(&self, tenant: &str) -> LookupResult<Option<String>> {
        let row = sqlx::query_as::<_, TenantPrefix>(
            "SELECT tenant, prefix FROM tenant_prefixes WHERE tenant = ?",
        )
        .bind(tenant)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|mapping| mapping.prefix))
    }

    async fn health_check(&self) -> LookupResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}
