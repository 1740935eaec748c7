//! Database access layer
//!
//! One long-lived SQLite connection per process, read caches per
//! [`QueryCategory`] and scoped transactional writes that invalidate every
//! read cache once committed.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    JsonValue, QueryResult, Statement, TransactionTrait, Value,
};
use tracing::{Level, debug, info, warn};

use bizdash_common::{timed_async, traced};

use crate::model::{DatabaseInfo, DatabaseStatus, QueryCategory};
use crate::schema;

/// Rows of a tabular query result, one JSON object per row
pub type Rows = Arc<Vec<JsonValue>>;

const IN_MEMORY_URL: &str = "sqlite::memory:";
const CACHE_CAPACITY: u64 = 10_000;

/// Location of the database file and cache time-to-live per query class
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub data_dir: PathBuf,
    pub db_file: String,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
    pub ttl_realtime: Duration,
    pub ttl_dashboard: Duration,
    pub ttl_reports: Duration,
    pub ttl_master: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            db_file: "business_dashboard.db".to_string(),
            connect_timeout: Duration::from_secs(30),
            sqlx_logging: false,
            ttl_realtime: Duration::from_secs(30),
            ttl_dashboard: Duration::from_secs(300),
            ttl_reports: Duration::from_secs(1800),
            ttl_master: Duration::from_secs(3600),
        }
    }
}

impl DatabaseConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_path().display())
    }

    pub fn ttl(&self, category: QueryCategory) -> Duration {
        match category {
            QueryCategory::Realtime => self.ttl_realtime,
            QueryCategory::Dashboard => self.ttl_dashboard,
            QueryCategory::Reports => self.ttl_reports,
            QueryCategory::Master => self.ttl_master,
        }
    }
}

/// One cache per query class. A zero TTL leaves the class uncached.
#[derive(Clone)]
struct QueryCaches {
    realtime: Option<Cache<String, Rows>>,
    dashboard: Option<Cache<String, Rows>>,
    reports: Option<Cache<String, Rows>>,
    master: Option<Cache<String, Rows>>,
}

impl QueryCaches {
    fn new(config: &DatabaseConfig) -> Self {
        let build = |category: QueryCategory| {
            let ttl = config.ttl(category);
            (!ttl.is_zero()).then(|| {
                Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_live(ttl)
                    .build()
            })
        };

        Self {
            realtime: build(QueryCategory::Realtime),
            dashboard: build(QueryCategory::Dashboard),
            reports: build(QueryCategory::Reports),
            master: build(QueryCategory::Master),
        }
    }

    fn get(&self, category: QueryCategory) -> Option<&Cache<String, Rows>> {
        match category {
            QueryCategory::Realtime => self.realtime.as_ref(),
            QueryCategory::Dashboard => self.dashboard.as_ref(),
            QueryCategory::Reports => self.reports.as_ref(),
            QueryCategory::Master => self.master.as_ref(),
        }
    }

    fn clear(&self) {
        for category in QueryCategory::ALL {
            if let Some(cache) = self.get(category) {
                cache.invalidate_all();
            }
        }
    }
}

/// Shared handle to the process-wide database connection
#[derive(Clone)]
pub struct Database {
    conn: DatabaseConnection,
    config: DatabaseConfig,
    caches: QueryCaches,
    /// Bumped by every committed write; loads started under an older value are not cached
    generation: Arc<AtomicU64>,
    in_memory: bool,
}

/// Decode one result row by the runtime storage class of each cell.
///
/// Expression columns such as `COUNT(*)` carry no declared type, so the
/// declared-type driven JSON decoding would skip them.
fn row_to_json(row: &QueryResult) -> JsonValue {
    let object = row
        .column_names()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, cell_to_json(row, idx)))
        .collect();
    JsonValue::Object(object)
}

fn cell_to_json(row: &QueryResult, idx: usize) -> JsonValue {
    if let Ok(value) = row.try_get_by_index::<Option<i64>>(idx) {
        return value.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<f64>>(idx) {
        return JsonValue::from(value);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<String>>(idx) {
        return JsonValue::from(value);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<Vec<u8>>>(idx) {
        return JsonValue::from(value);
    }
    JsonValue::Null
}

impl Database {
    /// Create the data directory if needed, connect and bootstrap the schema
    pub async fn connect(config: DatabaseConfig) -> anyhow::Result<Self> {
        if !config.data_dir.exists() {
            std::fs::create_dir_all(&config.data_dir)?;
            info!("Created data directory {}", config.data_dir.display());
        }

        let url = config.url();
        Self::open(config, &url, false).await
    }

    /// Isolated in-memory database with the same schema
    pub async fn connect_in_memory() -> anyhow::Result<Self> {
        Self::open(DatabaseConfig::default(), IN_MEMORY_URL, true).await
    }

    /// In-memory database with custom cache settings
    pub async fn connect_in_memory_with(config: DatabaseConfig) -> anyhow::Result<Self> {
        Self::open(config, IN_MEMORY_URL, true).await
    }

    async fn open(config: DatabaseConfig, url: &str, in_memory: bool) -> anyhow::Result<Self> {
        let mut opt = ConnectOptions::new(url);

        // a single connection serializes access and keeps an in-memory database alive
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(config.connect_timeout)
            .acquire_timeout(config.connect_timeout)
            .sqlx_logging(config.sqlx_logging);

        let conn = sea_orm::Database::connect(opt).await?;
        timed_async("SCHEMA_BOOTSTRAP", schema::bootstrap(&conn)).await?;

        info!(
            url = url,
            ttl_realtime = config.ttl_realtime.as_secs(),
            ttl_dashboard = config.ttl_dashboard.as_secs(),
            ttl_reports = config.ttl_reports.as_secs(),
            ttl_master = config.ttl_master.as_secs(),
            "Database connection established"
        );

        Ok(Self {
            caches: QueryCaches::new(&config),
            generation: Arc::new(AtomicU64::new(0)),
            conn,
            config,
            in_memory,
        })
    }

    /// The underlying connection, for uncached ORM reads
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run a parameterized query, serving repeated calls from the category's cache
    pub async fn query(
        &self,
        sql: &str,
        params: Vec<Value>,
        category: QueryCategory,
    ) -> anyhow::Result<Rows> {
        let key = format!("{sql}|{params:?}");
        self.cached(&key, category, move || async move {
            self.query_fresh(sql, params).await
        })
        .await
    }

    /// Memoize the rows produced by `load` under `key` in the category's cache.
    ///
    /// Rows are only stored when no write committed while `load` ran.
    pub async fn cached<F, Fut>(
        &self,
        key: &str,
        category: QueryCategory,
        load: F,
    ) -> anyhow::Result<Rows>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<JsonValue>>>,
    {
        let Some(cache) = self.caches.get(category) else {
            return load().await.map(Arc::new);
        };

        if let Some(rows) = cache.get(key) {
            debug!(category = %category, "Query cache hit");
            return Ok(rows);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let rows = Arc::new(load().await?);
        if self.generation.load(Ordering::Acquire) == generation {
            cache.insert(key.to_string(), rows.clone());
        } else {
            debug!(category = %category, "Write committed during load, result not cached");
        }
        Ok(rows)
    }

    /// Run a parameterized query without touching the caches
    pub async fn query_fresh(&self, sql: &str, params: Vec<Value>) -> anyhow::Result<Vec<JsonValue>> {
        let statement = Statement::from_sql_and_values(DbBackend::Sqlite, sql, params);
        let rows = self.conn.query_all(statement).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits and clears every read cache when `f` succeeds. Otherwise rolls
    /// back and returns the error of `f` unchanged.
    pub async fn write<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'c>>
            + Send,
        T: Send,
    {
        let txn = self.conn.begin().await?;

        match f(&txn).await {
            Ok(value) => {
                txn.commit().await?;
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.clear_cache();
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                debug!("Transaction rolled back: {}", e);
                Err(e)
            }
        }
    }

    /// Clear every query cache
    pub fn clear_cache(&self) {
        traced("clear_cache", Level::DEBUG, || self.caches.clear());
    }

    /// `SELECT 1` round trip
    pub async fn ping(&self) -> bool {
        match self.query_fresh("SELECT 1 AS test", vec![]).await {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                warn!("Database ping failed: {}", e);
                false
            }
        }
    }

    pub fn info(&self) -> DatabaseInfo {
        if self.in_memory {
            return DatabaseInfo {
                database_path: IN_MEMORY_URL.to_string(),
                database_url: IN_MEMORY_URL.to_string(),
                data_directory: String::new(),
                database_exists: true,
                data_dir_exists: false,
            };
        }

        let path = self.config.db_path();
        DatabaseInfo {
            database_path: path.display().to_string(),
            database_url: self.config.url(),
            data_directory: self.config.data_dir.display().to_string(),
            database_exists: path.exists(),
            data_dir_exists: self.config.data_dir.exists(),
        }
    }

    /// Run every health check. Never fails; a failed check reads `false`.
    pub async fn status(&self) -> DatabaseStatus {
        let info = self.info();
        let connection_ok = self.ping().await;

        let writeable = if connection_ok {
            self.write(|txn| {
                Box::pin(async move {
                    txn.execute_unprepared(
                        "CREATE TEMP TABLE IF NOT EXISTS bizdash_write_check (id INTEGER)",
                    )
                    .await?;
                    txn.execute_unprepared("DROP TABLE bizdash_write_check")
                        .await?;
                    Ok(())
                })
            })
            .await
            .inspect_err(|e| warn!("Database write check failed: {}", e))
            .is_ok()
        } else {
            false
        };

        DatabaseStatus {
            data_dir_exists: info.data_dir_exists,
            database_exists: info.database_exists,
            connection_ok,
            writeable,
        }
    }
}
