use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::*;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Pool, Postgres, Row};
use tracing::info;

use crate::segments::{
    COMPANY_ID, CREATE_TIME, DELIVERY_TIME, DESTINATION_CITY, END_LAT, END_LNG, END_TIME_ZONE,
    MILES, ORDER_ID, ORIGIN_CITY, PICK_UP_TIME, ROUTE_TYPE, START_LAT, START_LNG, START_TIME_ZONE,
};
use crate::source::{RowSource, SourceError};

pub type DbPool = Pool<Postgres>;

const TEXT_COLUMNS: [&str; 10] = [
    ORDER_ID,
    COMPANY_ID,
    ORIGIN_CITY,
    DESTINATION_CITY,
    PICK_UP_TIME,
    DELIVERY_TIME,
    CREATE_TIME,
    START_TIME_ZONE,
    END_TIME_ZONE,
    ROUTE_TYPE,
];

const FLOAT_COLUMNS: [&str; 5] = [MILES, START_LAT, START_LNG, END_LAT, END_LNG];

/// Establish a new Postgres connection pool for the segment query.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .with_context(|| "failed to connect to Postgres")
}

/// Runs the configured segment query. The query must return the text columns
/// as `text` and the distance/coordinate columns as `float8`.
#[derive(Debug, Clone)]
pub struct PostgresRowSource {
    pool: DbPool,
    query: String,
}

impl PostgresRowSource {
    pub fn new(pool: DbPool, query: impl Into<String>) -> Self {
        Self {
            pool,
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl RowSource for PostgresRowSource {
    async fn fetch_segments(&self) -> Result<DataFrame, SourceError> {
        let rows = sqlx::query(self.query.as_str())
            .fetch_all(&self.pool)
            .await?;
        info!(rows = rows.len(), "Fetched segment rows");
        rows_to_frame(&rows)
    }
}

fn rows_to_frame(rows: &[PgRow]) -> std::result::Result<DataFrame, SourceError> {
    let mut columns: Vec<Column> = Vec::with_capacity(TEXT_COLUMNS.len() + FLOAT_COLUMNS.len());

    for name in TEXT_COLUMNS {
        let values = rows
            .iter()
            .map(|row| row.try_get::<Option<String>, _>(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        columns.push(Series::new(name.into(), values).into());
    }

    for name in FLOAT_COLUMNS {
        let values = rows
            .iter()
            .map(|row| row.try_get::<Option<f64>, _>(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        columns.push(Series::new(name.into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}
