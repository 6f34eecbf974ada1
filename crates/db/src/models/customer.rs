use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "customer_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CustomerType {
    Voucher,
    #[default]
    Private,
    Other,
}

/// Community-care-voucher application progress.
#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "voucher_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VoucherStatus {
    #[default]
    NotApplied,
    Pending,
    Approved,
    Rejected,
}

/// Home-care assessment status, gates voucher qualification.
#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "lds_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LdsStatus {
    #[default]
    NotAssessed,
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "home_visit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HomeVisitStatus {
    #[default]
    Pending,
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Customer {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub hkid: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub district: Option<String>,
    pub customer_type: CustomerType,
    pub introducer: Option<String>,
    pub project_manager: Option<String>,
    pub voucher_status: VoucherStatus,
    pub lds_status: LdsStatus,
    pub home_visit_status: HomeVisitStatus,
    pub copay_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCustomer {
    pub name: String,
    pub hkid: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub district: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub introducer: Option<String>,
    pub project_manager: Option<String>,
    pub voucher_status: Option<VoucherStatus>,
    pub lds_status: Option<LdsStatus>,
    pub home_visit_status: Option<HomeVisitStatus>,
    pub copay_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCustomer {
    pub name: String,
    pub hkid: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub district: Option<String>,
    pub customer_type: CustomerType,
    pub introducer: Option<String>,
    pub project_manager: Option<String>,
    pub voucher_status: VoucherStatus,
    pub lds_status: LdsStatus,
    pub home_visit_status: HomeVisitStatus,
    pub copay_level: Option<String>,
}

/// Filters for the customer list screen.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CustomerFilter {
    pub q: Option<String>,
    pub district: Option<String>,
    pub customer_type: Option<CustomerType>,
}

const SELECT: &str = "SELECT id, code, name, hkid, phone, address, district, customer_type, \
                      introducer, project_manager, voucher_status, lds_status, \
                      home_visit_status, copay_level, created_at, updated_at FROM customers";

impl Customer {
    /// Allocate the next customer code from the server-side sequence.
    /// Uniqueness under concurrent requests is owned by the atomic
    /// `UPDATE ... RETURNING`.
    pub async fn next_code(pool: &SqlitePool) -> Result<String, sqlx::Error> {
        let value: i64 = sqlx::query_scalar(
            "UPDATE id_counters SET value = value + 1 WHERE name = 'customer' RETURNING value",
        )
        .fetch_one(pool)
        .await?;
        Ok(format!("C{value:05}"))
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCustomer) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let code = Self::next_code(pool).await?;
        let customer_type = data.customer_type.clone().unwrap_or_default();
        let voucher_status = data.voucher_status.clone().unwrap_or_default();
        let lds_status = data.lds_status.clone().unwrap_or_default();
        let home_visit_status = data.home_visit_status.clone().unwrap_or_default();

        sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (id, code, name, hkid, phone, address, district, \
             customer_type, introducer, project_manager, voucher_status, lds_status, \
             home_visit_status, copay_level) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
             RETURNING id, code, name, hkid, phone, address, district, customer_type, \
             introducer, project_manager, voucher_status, lds_status, home_visit_status, \
             copay_level, created_at, updated_at",
        )
        .bind(id)
        .bind(code)
        .bind(&data.name)
        .bind(&data.hkid)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.district)
        .bind(customer_type)
        .bind(&data.introducer)
        .bind(&data.project_manager)
        .bind(voucher_status)
        .bind(lds_status)
        .bind(home_visit_status)
        .bind(&data.copay_level)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool, filter: &CustomerFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "{SELECT} \
             WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%' \
                    OR phone LIKE '%' || ?1 || '%' \
                    OR code LIKE '%' || ?1 || '%') \
               AND (?2 IS NULL OR district = ?2) \
               AND (?3 IS NULL OR customer_type = ?3) \
             ORDER BY created_at DESC"
        ))
        .bind(&filter.q)
        .bind(&filter.district)
        .bind(&filter.customer_type)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCustomer,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            "UPDATE customers SET name = ?2, hkid = ?3, phone = ?4, address = ?5, \
             district = ?6, customer_type = ?7, introducer = ?8, project_manager = ?9, \
             voucher_status = ?10, lds_status = ?11, home_visit_status = ?12, \
             copay_level = ?13, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1 \
             RETURNING id, code, name, hkid, phone, address, district, customer_type, \
             introducer, project_manager, voucher_status, lds_status, home_visit_status, \
             copay_level, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.hkid)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.district)
        .bind(&data.customer_type)
        .bind(&data.introducer)
        .bind(&data.project_manager)
        .bind(&data.voucher_status)
        .bind(&data.lds_status)
        .bind(&data.home_visit_status)
        .bind(&data.copay_level)
        .fetch_optional(pool)
        .await
    }

    /// Hard delete. Service records for the customer go with it (FK cascade).
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_db;

    fn sample(name: &str) -> CreateCustomer {
        CreateCustomer {
            name: name.to_string(),
            hkid: Some("A123456(7)".to_string()),
            phone: "91234567".to_string(),
            address: None,
            district: Some("Kwun Tong".to_string()),
            customer_type: Some(CustomerType::Voucher),
            introducer: Some("Ms. Lee".to_string()),
            project_manager: None,
            voucher_status: Some(VoucherStatus::Approved),
            lds_status: None,
            home_visit_status: None,
            copay_level: Some("L3".to_string()),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_codes() {
        let db = memory_db().await;
        let a = Customer::create(&db.pool, &sample("Chan Tai Man")).await.unwrap();
        let b = Customer::create(&db.pool, &sample("Wong Siu Ming")).await.unwrap();
        assert_eq!(a.code, "C00001");
        assert_eq!(b.code, "C00002");
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn round_trips_status_enums() {
        let db = memory_db().await;
        let created = Customer::create(&db.pool, &sample("Chan Tai Man")).await.unwrap();
        let found = Customer::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.customer_type, CustomerType::Voucher);
        assert_eq!(found.voucher_status, VoucherStatus::Approved);
        assert_eq!(found.lds_status, LdsStatus::NotAssessed);
    }

    #[tokio::test]
    async fn list_filters_by_free_text_and_district() {
        let db = memory_db().await;
        Customer::create(&db.pool, &sample("Chan Tai Man")).await.unwrap();
        let mut other = sample("Wong Siu Ming");
        other.district = Some("Sha Tin".to_string());
        Customer::create(&db.pool, &other).await.unwrap();

        let filter = CustomerFilter {
            q: Some("Chan".to_string()),
            ..Default::default()
        };
        let hits = Customer::list(&db.pool, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Chan Tai Man");

        let filter = CustomerFilter {
            district: Some("Sha Tin".to_string()),
            ..Default::default()
        };
        let hits = Customer::list(&db.pool, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Wong Siu Ming");
    }

    #[tokio::test]
    async fn delete_is_hard() {
        let db = memory_db().await;
        let created = Customer::create(&db.pool, &sample("Chan Tai Man")).await.unwrap();
        assert_eq!(Customer::delete(&db.pool, created.id).await.unwrap(), 1);
        assert!(Customer::find_by_id(&db.pool, created.id).await.unwrap().is_none());
    }
}
