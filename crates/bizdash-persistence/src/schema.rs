//! Schema bootstrap from `conf/sqlite-schema.sql`

use sea_orm::{ConnectionTrait, DbErr};
use tracing::debug;

const SQLITE_SCHEMA: &str = include_str!("../../../conf/sqlite-schema.sql");

/// Tables in creation order: core, geo, infrastructure, business
pub const TABLES: [&str; 7] = [
    "partner",
    "microcluster",
    "partnerterritory",
    "kecamatan",
    "desa",
    "site",
    "retailer",
];

/// Split a schema script into executable statements, dropping comment lines
pub fn statements(sql: &str) -> Vec<String> {
    let stripped = sql
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !line.starts_with("--") && !line.starts_with("/*")
        })
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Enable foreign keys and create every table and index that does not exist yet
pub async fn bootstrap<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;

    let statements = statements(SQLITE_SCHEMA);
    for statement in &statements {
        db.execute_unprepared(statement).await?;
    }

    debug!("Schema bootstrap executed {} statements", statements.len());
    Ok(())
}
