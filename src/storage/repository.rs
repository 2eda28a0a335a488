use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::domain::{ApartmentId, Cents, ChargeKey, ChargeRecord};

use super::MIGRATION_001_CHARGES;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Aggregated counts and amounts over a filtered set of charges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeTotals {
    pub paid_count: i64,
    pub unpaid_count: i64,
    pub collected: Cents,
    pub outstanding: Cents,
}

/// Repository for persisting and querying charge documents.
///
/// Each charge is stored under its document key (`"{apartment_id}-{period}"`).
/// Writes that guard an invariant are conditional, so the existence check and
/// the mutation happen in a single statement.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the charges collection if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_CHARGES)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get a charge by its key.
    pub async fn get_charge(&self, key: &ChargeKey) -> Result<Option<ChargeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT departamento_id, periodo, monto_cents, pagado, fecha_pago
            FROM gastos_comunes
            WHERE doc_key = ?
            "#,
        )
        .bind(key.doc_key())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch charge {}", key))?;

        row.as_ref().map(Self::row_to_charge).transpose()
    }

    /// Insert a charge unless one already exists under the same key.
    /// Returns false when the key was taken; the stored charge is left untouched.
    pub async fn insert_charge_if_absent(&self, charge: &ChargeRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO gastos_comunes (doc_key, departamento_id, departamento, periodo, monto_cents, pagado, fecha_pago)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(doc_key) DO NOTHING
            "#,
        )
        .bind(charge.key().doc_key())
        .bind(charge.apartment_id)
        .bind(charge.apartment_id)
        .bind(&charge.period)
        .bind(charge.amount_cents)
        .bind(charge.paid)
        .bind(charge.payment_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save charge {}", charge.key()))?;

        Ok(result.rows_affected() == 1)
    }

    /// Flip an unpaid charge to paid with the given date.
    /// Returns false if no unpaid charge exists under the key.
    pub async fn mark_paid(&self, key: &ChargeKey, payment_date: NaiveDate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE gastos_comunes
            SET pagado = 1, fecha_pago = ?
            WHERE doc_key = ? AND pagado = 0
            "#,
        )
        .bind(payment_date.format(DATE_FORMAT).to_string())
        .bind(key.doc_key())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update charge {}", key))?;

        Ok(result.rows_affected() == 1)
    }

    /// List charges with optional exact-match filters, ordered by apartment then period.
    pub async fn list_charges(
        &self,
        apartment_id: Option<ApartmentId>,
        period: Option<&str>,
        paid: Option<bool>,
    ) -> Result<Vec<ChargeRecord>> {
        let mut query = String::from(
            "SELECT departamento_id, periodo, monto_cents, pagado, fecha_pago FROM gastos_comunes WHERE 1=1",
        );
        push_filters(&mut query, apartment_id, period, paid);
        query.push_str(" ORDER BY departamento_id, periodo");

        let mut sql_query = sqlx::query(&query);
        if let Some(id) = apartment_id {
            sql_query = sql_query.bind(id);
        }
        if let Some(p) = period {
            sql_query = sql_query.bind(p);
        }
        if let Some(flag) = paid {
            sql_query = sql_query.bind(flag);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list charges")?;

        rows.iter().map(Self::row_to_charge).collect()
    }

    /// Compute paid/unpaid counts and amounts using SQL aggregation.
    pub async fn charge_totals(
        &self,
        apartment_id: Option<ApartmentId>,
        period: Option<&str>,
    ) -> Result<ChargeTotals> {
        let mut query = String::from(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN pagado = 1 THEN 1 ELSE 0 END), 0) as paid_count,
                COALESCE(SUM(CASE WHEN pagado = 0 THEN 1 ELSE 0 END), 0) as unpaid_count,
                COALESCE(SUM(CASE WHEN pagado = 1 THEN monto_cents ELSE 0 END), 0) as collected,
                COALESCE(SUM(CASE WHEN pagado = 0 THEN monto_cents ELSE 0 END), 0) as outstanding
            FROM gastos_comunes
            WHERE 1=1"#,
        );
        push_filters(&mut query, apartment_id, period, None);

        let mut sql_query = sqlx::query(&query);
        if let Some(id) = apartment_id {
            sql_query = sql_query.bind(id);
        }
        if let Some(p) = period {
            sql_query = sql_query.bind(p);
        }

        let row = sql_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to compute charge totals")?;

        Ok(ChargeTotals {
            paid_count: row.get("paid_count"),
            unpaid_count: row.get("unpaid_count"),
            collected: row.get("collected"),
            outstanding: row.get("outstanding"),
        })
    }

    /// Delete every charge. Returns the number of deleted documents.
    pub async fn delete_all_charges(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM gastos_comunes")
            .execute(&self.pool)
            .await
            .context("Failed to delete charges")?;
        Ok(result.rows_affected())
    }

    fn row_to_charge(row: &sqlx::sqlite::SqliteRow) -> Result<ChargeRecord> {
        let payment_date_str: Option<String> = row.try_get("fecha_pago")?;

        Ok(ChargeRecord {
            apartment_id: row.try_get("departamento_id")?,
            period: row.try_get("periodo")?,
            amount_cents: row.try_get("monto_cents")?,
            paid: row.try_get::<i32, _>("pagado")? != 0,
            payment_date: payment_date_str
                .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
                .transpose()
                .context("Invalid fecha_pago date")?,
        })
    }
}

fn push_filters(
    query: &mut String,
    apartment_id: Option<ApartmentId>,
    period: Option<&str>,
    paid: Option<bool>,
) {
    if apartment_id.is_some() {
        query.push_str(" AND departamento_id = ?");
    }
    if period.is_some() {
        query.push_str(" AND periodo = ?");
    }
    if paid.is_some() {
        query.push_str(" AND pagado = ?");
    }
}
