use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Per-introducer commission terms. Flat amounts per qualified month, or an
/// optional percentage of the month's voucher fee that takes precedence.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CommissionRate {
    pub id: Uuid,
    pub introducer: String,
    pub first_month_amount: f64,
    pub subsequent_month_amount: f64,
    pub voucher_rate_pct: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpsertCommissionRate {
    pub introducer: String,
    pub first_month_amount: f64,
    pub subsequent_month_amount: f64,
    pub voucher_rate_pct: Option<f64>,
}

const SELECT: &str = "SELECT id, introducer, first_month_amount, subsequent_month_amount, \
                      voucher_rate_pct, created_at, updated_at FROM commission_rates";

impl CommissionRate {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(&format!("{SELECT} ORDER BY introducer ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_introducer(
        pool: &SqlitePool,
        introducer: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(&format!("{SELECT} WHERE introducer = ?1"))
            .bind(introducer)
            .fetch_optional(pool)
            .await
    }

    pub async fn create_or_update(
        pool: &SqlitePool,
        data: &UpsertCommissionRate,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, CommissionRate>(
            "INSERT INTO commission_rates (id, introducer, first_month_amount, \
             subsequent_month_amount, voucher_rate_pct) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(introducer) DO UPDATE SET \
                 first_month_amount = excluded.first_month_amount, \
                 subsequent_month_amount = excluded.subsequent_month_amount, \
                 voucher_rate_pct = excluded.voucher_rate_pct, \
                 updated_at = CURRENT_TIMESTAMP \
             RETURNING id, introducer, first_month_amount, subsequent_month_amount, \
             voucher_rate_pct, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.introducer)
        .bind(data.first_month_amount)
        .bind(data.subsequent_month_amount)
        .bind(data.voucher_rate_pct)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_by_introducer(
        pool: &SqlitePool,
        introducer: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM commission_rates WHERE introducer = ?1")
            .bind(introducer)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_db;

    #[tokio::test]
    async fn upsert_is_keyed_on_introducer() {
        let db = memory_db().await;
        let first = CommissionRate::create_or_update(
            &db.pool,
            &UpsertCommissionRate {
                introducer: "Ms. Lee".to_string(),
                first_month_amount: 800.0,
                subsequent_month_amount: 300.0,
                voucher_rate_pct: None,
            },
        )
        .await
        .unwrap();

        let second = CommissionRate::create_or_update(
            &db.pool,
            &UpsertCommissionRate {
                introducer: "Ms. Lee".to_string(),
                first_month_amount: 1000.0,
                subsequent_month_amount: 300.0,
                voucher_rate_pct: Some(5.0),
            },
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.first_month_amount, 1000.0);
        assert_eq!(second.voucher_rate_pct, Some(5.0));
        assert_eq!(CommissionRate::list(&db.pool).await.unwrap().len(), 1);

        let found = CommissionRate::find_by_introducer(&db.pool, "Ms. Lee")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.first_month_amount, 1000.0);
        assert!(
            CommissionRate::find_by_introducer(&db.pool, "Mr. Ho")
                .await
                .unwrap()
                .is_none()
        );
    }
}
