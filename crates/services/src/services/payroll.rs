//! Per-staff monthly salary rollups for the payroll screen.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use utils::time::month_key;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct PayrollLine {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub service_date: NaiveDate,
    pub hours: f64,
    pub staff_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PayrollSummary {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub month: String,
    pub visit_count: u32,
    pub total_hours: f64,
    pub total_salary: f64,
    pub avg_hourly_salary: f64,
}

/// Group visits by (staff, month) and total them. `month` restricts the
/// output to one `YYYY-MM` bucket when given.
pub fn compute_payroll(lines: &[PayrollLine], month: Option<&str>) -> Vec<PayrollSummary> {
    struct Acc {
        name: String,
        visit_count: u32,
        total_hours: f64,
        total_salary: f64,
    }

    let mut buckets: BTreeMap<(Uuid, String), Acc> = BTreeMap::new();
    for line in lines {
        let key_month = month_key(line.service_date);
        if month.is_some_and(|m| m != key_month) {
            continue;
        }
        let acc = buckets.entry((line.staff_id, key_month)).or_insert_with(|| Acc {
            name: line.staff_name.clone(),
            visit_count: 0,
            total_hours: 0.0,
            total_salary: 0.0,
        });
        acc.visit_count += 1;
        acc.total_hours += line.hours;
        acc.total_salary += line.staff_salary;
    }

    let mut summaries: Vec<PayrollSummary> = buckets
        .into_iter()
        .map(|((staff_id, month), acc)| PayrollSummary {
            staff_id,
            staff_name: acc.name,
            month,
            visit_count: acc.visit_count,
            total_hours: acc.total_hours,
            total_salary: acc.total_salary,
            avg_hourly_salary: if acc.total_hours > 0.0 {
                acc.total_salary / acc.total_hours
            } else {
                0.0
            },
        })
        .collect();

    summaries.sort_by(|a, b| {
        (a.month.as_str(), a.staff_name.as_str()).cmp(&(b.month.as_str(), b.staff_name.as_str()))
    });
    summaries
}

pub struct PayrollService;

impl PayrollService {
    async fn assigned_lines(pool: &SqlitePool) -> Result<Vec<PayrollLine>, sqlx::Error> {
        sqlx::query_as::<_, PayrollLine>(
            "SELECT sr.staff_id, s.name AS staff_name, sr.service_date, sr.hours, sr.staff_salary \
             FROM service_records sr \
             JOIN care_staff s ON s.id = sr.staff_id \
             WHERE sr.staff_id IS NOT NULL \
             ORDER BY sr.service_date ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn summaries(
        pool: &SqlitePool,
        month: Option<&str>,
    ) -> Result<Vec<PayrollSummary>, PayrollError> {
        let lines = Self::assigned_lines(pool).await?;
        Ok(compute_payroll(&lines, month))
    }
}
