use async_trait::async_trait;
use detour_core::error::{Result, StorageError};
use detour_core::{Host, NewRedirect, ReadRedirectStorage, Redirect, RedirectStorage, RedirectType};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, MySqlPool, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT host, source_uri_path, target_uri_path, status_code, start_date_time,
           end_date_time, comment, creator, type, hit_counter, last_hit, creation_date_time
    FROM redirects
"#;

/// MySQL implementation of the redirect storage contract.
///
/// "All hosts" is stored as `host = NULL` together with an empty `host_key`,
/// so the unique index on `(host_key, source_uri_path)` also covers
/// redirects without a host. Timestamps are stored as unix seconds.
/// Every `add_redirect` runs in its own transaction, which makes
/// `persist_all` a no-op.
#[derive(Debug, Clone)]
pub struct MySqlRedirectStorage {
    pool: MySqlPool,
}

impl MySqlRedirectStorage {
    /// Creates a storage from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a storage by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn host_key(host: Option<&Host>) -> &str {
    host.map(Host::as_str).unwrap_or_default()
}

fn parse_timestamp(column: &str, seconds: Option<i64>) -> Result<Option<Timestamp>> {
    seconds
        .map(|value| {
            Timestamp::from_second(value).map_err(|e| {
                StorageError::InvalidData(format!("invalid {column} timestamp '{value}': {e}"))
            })
        })
        .transpose()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn redirect_from_row(row: &MySqlRow) -> Result<Redirect> {
    let host: Option<String> = row.try_get("host").map_err(map_sqlx_error)?;
    let redirect_type: String = row.try_get("type").map_err(map_sqlx_error)?;

    Ok(Redirect {
        host: Host::normalize(host.as_deref()),
        source_uri_path: row.try_get("source_uri_path").map_err(map_sqlx_error)?,
        target_uri_path: row.try_get("target_uri_path").map_err(map_sqlx_error)?,
        status_code: row.try_get("status_code").map_err(map_sqlx_error)?,
        start_date_time: parse_timestamp(
            "start_date_time",
            row.try_get("start_date_time").map_err(map_sqlx_error)?,
        )?,
        end_date_time: parse_timestamp(
            "end_date_time",
            row.try_get("end_date_time").map_err(map_sqlx_error)?,
        )?,
        comment: row.try_get("comment").map_err(map_sqlx_error)?,
        creator: row.try_get("creator").map_err(map_sqlx_error)?,
        redirect_type: RedirectType::from(redirect_type),
        hit_counter: row.try_get("hit_counter").map_err(map_sqlx_error)?,
        last_hit: parse_timestamp("last_hit", row.try_get("last_hit").map_err(map_sqlx_error)?)?,
        creation_date_time: parse_timestamp(
            "creation_date_time",
            Some(row.try_get("creation_date_time").map_err(map_sqlx_error)?),
        )?
        .unwrap_or(Timestamp::UNIX_EPOCH),
    })
}

/// Creates one redirect and rewrites the chain ending at its source.
async fn insert_one(conn: &mut MySqlConnection, redirect: &Redirect) -> Result<Vec<Redirect>> {
    let key = host_key(redirect.host.as_ref());

    sqlx::query(
        r#"
        DELETE FROM redirects
        WHERE host_key = ?
          AND source_uri_path IN (?, ?)
        "#,
    )
    .bind(key)
    .bind(&redirect.source_uri_path)
    .bind(&redirect.target_uri_path)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let dependents = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE host_key = ? AND target_uri_path = ? FOR UPDATE"
    ))
    .bind(key)
    .bind(&redirect.source_uri_path)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let mut rewritten = Vec::with_capacity(dependents.len());
    for row in &dependents {
        let mut dependent = redirect_from_row(row)?;
        dependent.target_uri_path = redirect.target_uri_path.clone();

        sqlx::query(
            r#"
            UPDATE redirects
            SET target_uri_path = ?
            WHERE host_key = ?
              AND source_uri_path = ?
            "#,
        )
        .bind(&dependent.target_uri_path)
        .bind(key)
        .bind(&dependent.source_uri_path)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        debug!(
            source_uri_path = %dependent.source_uri_path,
            target_uri_path = %dependent.target_uri_path,
            "rewrote redirect chain"
        );
        rewritten.push(dependent);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO redirects (
            host, host_key, source_uri_path, target_uri_path, status_code, start_date_time,
            end_date_time, comment, creator, type, hit_counter, last_hit, creation_date_time
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?)
        "#,
    )
    .bind(redirect.host.as_ref().map(Host::as_str))
    .bind(key)
    .bind(&redirect.source_uri_path)
    .bind(&redirect.target_uri_path)
    .bind(redirect.status_code)
    .bind(redirect.start_date_time.map(|ts| ts.as_second()))
    .bind(redirect.end_date_time.map(|ts| ts.as_second()))
    .bind(redirect.comment.as_deref())
    .bind(redirect.creator.as_deref())
    .bind(redirect.redirect_type.as_str())
    .bind(redirect.creation_date_time.as_second())
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(rewritten),
        Err(err) if is_unique_violation(&err) => {
            Err(StorageError::Conflict(redirect.identity().to_string()))
        }
        Err(err) => Err(map_sqlx_error(err)),
    }
}

#[async_trait]
impl ReadRedirectStorage for MySqlRedirectStorage {
    async fn get_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
        include_inactive: bool,
    ) -> Result<Option<Redirect>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE host_key = ? AND source_uri_path = ? LIMIT 1"
        ))
        .bind(host_key(host))
        .bind(source_uri_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let redirect = redirect_from_row(&row)?;
        if !include_inactive && !redirect.is_active_at(Timestamp::now()) {
            return Ok(None);
        }
        Ok(Some(redirect))
    }

    async fn get_all(&self, host: Option<&Host>) -> Result<Vec<Redirect>> {
        let rows = match host {
            Some(host) => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE host_key = ? ORDER BY host_key, source_uri_path"
                ))
                .bind(host.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY host_key, source_uri_path"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.iter().map(redirect_from_row).collect()
    }
}

#[async_trait]
impl RedirectStorage for MySqlRedirectStorage {
    async fn add_redirect(&self, redirect: NewRedirect) -> Result<Vec<Redirect>> {
        let now = Timestamp::now();
        let hosts = if redirect.hosts.is_empty() {
            vec![None]
        } else {
            redirect.hosts.clone()
        };

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut created = Vec::with_capacity(hosts.len());
        let mut rewritten = Vec::new();
        for host in hosts {
            let new = redirect.to_redirect(host, now);
            rewritten.extend(insert_one(&mut tx, &new).await?);
            created.push(new);
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        created.extend(rewritten);
        Ok(created)
    }

    async fn remove_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM redirects
            WHERE host_key = ?
              AND source_uri_path = ?
            "#,
        )
        .bind(host_key(host))
        .bind(source_uri_path)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn persist_all(&self) -> Result<()> {
        Ok(())
    }
}
