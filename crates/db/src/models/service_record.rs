use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One row per service visit. Fee/salary derived figures are computed at
/// read time and never stored.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub service_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours: f64,
    pub service_fee: f64,
    pub staff_salary: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    pub fn profit(&self) -> f64 {
        self.service_fee - self.staff_salary
    }

    pub fn hourly_rate(&self) -> f64 {
        if self.hours > 0.0 { self.service_fee / self.hours } else { 0.0 }
    }

    pub fn hourly_salary(&self) -> f64 {
        if self.hours > 0.0 { self.staff_salary / self.hours } else { 0.0 }
    }
}

/// Record joined with customer/staff names and the derived figures, as shown
/// on the services screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ServiceRecordView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: ServiceRecord,
    pub customer_name: String,
    pub staff_name: Option<String>,
    pub profit: f64,
    pub hourly_rate: f64,
    pub hourly_salary: f64,
}

impl std::ops::Deref for ServiceRecordView {
    type Target = ServiceRecord;
    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl ServiceRecordView {
    fn from_parts(record: ServiceRecord, customer_name: String, staff_name: Option<String>) -> Self {
        let profit = record.profit();
        let hourly_rate = record.hourly_rate();
        let hourly_salary = record.hourly_salary();
        Self {
            record,
            customer_name,
            staff_name,
            profit,
            hourly_rate,
            hourly_salary,
        }
    }
}

#[derive(Debug, FromRow)]
struct ServiceRecordViewRow {
    id: Uuid,
    customer_id: Uuid,
    staff_id: Option<Uuid>,
    service_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    hours: f64,
    service_fee: f64,
    staff_salary: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    customer_name: String,
    staff_name: Option<String>,
}

impl From<ServiceRecordViewRow> for ServiceRecordView {
    fn from(row: ServiceRecordViewRow) -> Self {
        let record = ServiceRecord {
            id: row.id,
            customer_id: row.customer_id,
            staff_id: row.staff_id,
            service_date: row.service_date,
            start_time: row.start_time,
            end_time: row.end_time,
            hours: row.hours,
            service_fee: row.service_fee,
            staff_salary: row.staff_salary,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self::from_parts(record, row.customer_name, row.staff_name)
    }
}

/// Form payload shared by create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ServiceRecordForm {
    pub customer_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub service_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours: f64,
    pub service_fee: f64,
    pub staff_salary: f64,
    pub notes: Option<String>,
}

impl ServiceRecordForm {
    /// Basic form validation: positive hours, end after start.
    pub fn validate(&self) -> Result<(), String> {
        if self.hours <= 0.0 {
            return Err("hours must be greater than zero".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && end <= start
        {
            return Err("end time must be after start time".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ServiceRecordFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
}

const SELECT: &str = "SELECT id, customer_id, staff_id, service_date, start_time, end_time, \
                      hours, service_fee, staff_salary, notes, created_at, updated_at \
                      FROM service_records";

const SELECT_VIEW: &str =
    "SELECT sr.id, sr.customer_id, sr.staff_id, sr.service_date, sr.start_time, sr.end_time, \
     sr.hours, sr.service_fee, sr.staff_salary, sr.notes, sr.created_at, sr.updated_at, \
     c.name AS customer_name, s.name AS staff_name \
     FROM service_records sr \
     JOIN customers c ON c.id = sr.customer_id \
     LEFT JOIN care_staff s ON s.id = sr.staff_id";

impl ServiceRecord {
    pub async fn create(pool: &SqlitePool, data: &ServiceRecordForm) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, ServiceRecord>(
            "INSERT INTO service_records (id, customer_id, staff_id, service_date, start_time, \
             end_time, hours, service_fee, staff_salary, notes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             RETURNING id, customer_id, staff_id, service_date, start_time, end_time, hours, \
             service_fee, staff_salary, notes, created_at, updated_at",
        )
        .bind(id)
        .bind(data.customer_id)
        .bind(data.staff_id)
        .bind(data.service_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.hours)
        .bind(data.service_fee)
        .bind(data.staff_salary)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRecord>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_views(
        pool: &SqlitePool,
        filter: &ServiceRecordFilter,
    ) -> Result<Vec<ServiceRecordView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ServiceRecordViewRow>(&format!(
            "{SELECT_VIEW} \
             WHERE (?1 IS NULL OR sr.service_date >= ?1) \
               AND (?2 IS NULL OR sr.service_date <= ?2) \
               AND (?3 IS NULL OR sr.customer_id = ?3) \
               AND (?4 IS NULL OR sr.staff_id = ?4) \
             ORDER BY sr.service_date DESC, sr.start_time DESC"
        ))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.customer_id)
        .bind(filter.staff_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &ServiceRecordForm,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRecord>(
            "UPDATE service_records SET customer_id = ?2, staff_id = ?3, service_date = ?4, \
             start_time = ?5, end_time = ?6, hours = ?7, service_fee = ?8, staff_salary = ?9, \
             notes = ?10, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1 \
             RETURNING id, customer_id, staff_id, service_date, start_time, end_time, hours, \
             service_fee, staff_salary, notes, created_at, updated_at",
        )
        .bind(id)
        .bind(data.customer_id)
        .bind(data.staff_id)
        .bind(data.service_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.hours)
        .bind(data.service_fee)
        .bind(data.staff_salary)
        .bind(&data.notes)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_records WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Visit count and fee/profit totals for the given month prefix
    /// (`YYYY-MM`), for the dashboard.
    pub async fn month_totals(
        pool: &SqlitePool,
        month: &str,
    ) -> Result<(i64, f64, f64), sqlx::Error> {
        let row: (i64, f64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(service_fee), 0.0), \
             COALESCE(SUM(service_fee - staff_salary), 0.0) \
             FROM service_records WHERE service_date LIKE ?1 || '%'",
        )
        .bind(month)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::customer::{CreateCustomer, Customer},
        test_utils::memory_db,
    };

    async fn seed_customer(pool: &SqlitePool) -> Customer {
        Customer::create(
            pool,
            &CreateCustomer {
                name: "Chan Tai Man".to_string(),
                hkid: None,
                phone: "91234567".to_string(),
                address: None,
                district: None,
                customer_type: None,
                introducer: None,
                project_manager: None,
                voucher_status: None,
                lds_status: None,
                home_visit_status: None,
                copay_level: None,
            },
        )
        .await
        .unwrap()
    }

    fn form(customer_id: Uuid, fee: f64, salary: f64) -> ServiceRecordForm {
        ServiceRecordForm {
            customer_id,
            staff_id: None,
            service_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(12, 0, 0),
            hours: 3.0,
            service_fee: fee,
            staff_salary: salary,
            notes: None,
        }
    }

    #[test]
    fn profit_is_fee_minus_salary_including_negative() {
        let record = ServiceRecord {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            staff_id: None,
            service_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            start_time: None,
            end_time: None,
            hours: 2.0,
            service_fee: 300.0,
            staff_salary: 380.0,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.profit(), -80.0);
        assert_eq!(record.hourly_rate(), 150.0);
        assert_eq!(record.hourly_salary(), 190.0);
    }

    #[test]
    fn zero_hours_never_divides() {
        let mut record = ServiceRecord {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            staff_id: None,
            service_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            start_time: None,
            end_time: None,
            hours: 0.0,
            service_fee: 300.0,
            staff_salary: 100.0,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.hourly_rate(), 0.0);
        record.hours = -1.0;
        assert_eq!(record.hourly_salary(), 0.0);
    }

    #[test]
    fn form_rejects_inverted_time_range() {
        let mut data = form(Uuid::new_v4(), 400.0, 250.0);
        assert!(data.validate().is_ok());
        data.end_time = NaiveTime::from_hms_opt(8, 0, 0);
        assert!(data.validate().is_err());
        data.end_time = None;
        data.hours = 0.0;
        assert!(data.validate().is_err());
    }

    #[tokio::test]
    async fn views_join_names_and_derive_profit() {
        let db = memory_db().await;
        let customer = seed_customer(&db.pool).await;
        ServiceRecord::create(&db.pool, &form(customer.id, 450.0, 300.0))
            .await
            .unwrap();

        let views = ServiceRecord::list_views(&db.pool, &ServiceRecordFilter::default())
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].customer_name, "Chan Tai Man");
        assert_eq!(views[0].staff_name, None);
        assert_eq!(views[0].profit, 150.0);
        assert_eq!(views[0].hourly_rate, 150.0);
    }

    #[tokio::test]
    async fn deleting_customer_cascades_to_records() {
        let db = memory_db().await;
        let customer = seed_customer(&db.pool).await;
        let record = ServiceRecord::create(&db.pool, &form(customer.id, 450.0, 300.0))
            .await
            .unwrap();

        Customer::delete(&db.pool, customer.id).await.unwrap();
        assert!(ServiceRecord::find_by_id(&db.pool, record.id).await.unwrap().is_none());
    }
}
