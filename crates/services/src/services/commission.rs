//! Introducer commission aggregation over voucher-customer billing rows.
//!
//! Recomputed from scratch on every request: group rows by (customer,
//! month), sum fees and hours, qualify months against the fee threshold,
//! number the qualified months per customer, then price each qualified
//! month from the introducer's rate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use db::models::commission_rate::CommissionRate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use utils::time::month_key;
use uuid::Uuid;

/// Default monthly fee a voucher customer must reach before the month
/// counts toward commission.
pub const DEFAULT_QUALIFYING_FEE: f64 = 2500.0;

/// Rollup label for qualified months whose customer has no introducer.
pub const UNASSIGNED_INTRODUCER: &str = "(unassigned)";

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One billing row joined with the customer fields commission needs.
#[derive(Debug, Clone, FromRow)]
pub struct BillingLine {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub introducer: Option<String>,
    pub service_date: NaiveDate,
    pub hours: f64,
    pub service_fee: f64,
}

/// Per-(customer, month) aggregation result.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CustomerMonthGroup {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub introducer: Option<String>,
    pub month: String,
    pub total_hours: f64,
    pub total_fee: f64,
    pub qualified: bool,
    /// 1-based position among this customer's qualified months; unset for
    /// unqualified months.
    pub month_seq: Option<i32>,
    pub commission: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct IntroducerCommission {
    pub introducer: String,
    pub qualified_months: u32,
    pub commission_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CommissionSummary {
    pub threshold: f64,
    pub groups: Vec<CustomerMonthGroup>,
    pub by_introducer: Vec<IntroducerCommission>,
    pub total_commission: f64,
}

/// Commission for one qualified month under the introducer's terms.
fn month_commission(rate: Option<&CommissionRate>, total_fee: f64, month_seq: i32) -> f64 {
    let Some(rate) = rate else {
        return 0.0;
    };
    match rate.voucher_rate_pct {
        Some(pct) => total_fee * pct / 100.0,
        None if month_seq == 1 => rate.first_month_amount,
        None => rate.subsequent_month_amount,
    }
}

/// Single-pass groupby plus a per-customer running counter over qualified
/// months. Pure; the caller supplies already-fetched rows.
pub fn compute_commissions(
    lines: &[BillingLine],
    rates: &[CommissionRate],
    threshold: f64,
) -> CommissionSummary {
    struct CustomerAcc {
        name: String,
        introducer: Option<String>,
        months: BTreeMap<String, (f64, f64)>, // month -> (hours, fee)
    }

    let mut customers: BTreeMap<Uuid, CustomerAcc> = BTreeMap::new();
    for line in lines {
        let acc = customers.entry(line.customer_id).or_insert_with(|| CustomerAcc {
            name: line.customer_name.clone(),
            introducer: line.introducer.clone(),
            months: BTreeMap::new(),
        });
        let (hours, fee) = acc.months.entry(month_key(line.service_date)).or_insert((0.0, 0.0));
        *hours += line.hours;
        *fee += line.service_fee;
    }

    let mut groups = Vec::new();
    let mut rollups: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    let mut total_commission = 0.0;

    for (customer_id, acc) in customers {
        let rate = acc
            .introducer
            .as_deref()
            .and_then(|name| rates.iter().find(|r| r.introducer == name));
        let mut seq = 0;

        // BTreeMap iteration gives months in ascending order, which is what
        // the first-month/subsequent-month distinction relies on.
        for (month, (total_hours, total_fee)) in acc.months {
            let qualified = total_fee >= threshold;
            let month_seq = if qualified {
                seq += 1;
                Some(seq)
            } else {
                None
            };
            let commission = match month_seq {
                Some(seq) => month_commission(rate, total_fee, seq),
                None => 0.0,
            };

            if qualified {
                let label = acc
                    .introducer
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNASSIGNED_INTRODUCER.to_string());
                let entry = rollups.entry(label).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += commission;
                total_commission += commission;
            }

            groups.push(CustomerMonthGroup {
                customer_id,
                customer_name: acc.name.clone(),
                introducer: acc.introducer.clone(),
                month,
                total_hours,
                total_fee,
                qualified,
                month_seq,
                commission,
            });
        }
    }

    groups.sort_by(|a, b| {
        (a.customer_name.as_str(), a.month.as_str()).cmp(&(b.customer_name.as_str(), b.month.as_str()))
    });

    let by_introducer = rollups
        .into_iter()
        .map(|(introducer, (qualified_months, commission_total))| IntroducerCommission {
            introducer,
            qualified_months,
            commission_total,
        })
        .collect();

    CommissionSummary {
        threshold,
        groups,
        by_introducer,
        total_commission,
    }
}

pub struct CommissionService;

impl CommissionService {
    /// Billing rows of voucher-type customers, joined with the customer
    /// fields the aggregation keys on.
    async fn qualifying_lines(pool: &SqlitePool) -> Result<Vec<BillingLine>, sqlx::Error> {
        sqlx::query_as::<_, BillingLine>(
            "SELECT sr.customer_id, c.name AS customer_name, c.introducer, \
             sr.service_date, sr.hours, sr.service_fee \
             FROM service_records sr \
             JOIN customers c ON c.id = sr.customer_id \
             WHERE c.customer_type = 'voucher' \
             ORDER BY sr.service_date ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn summary(
        pool: &SqlitePool,
        threshold: f64,
    ) -> Result<CommissionSummary, CommissionError> {
        let lines = Self::qualifying_lines(pool).await?;
        let rates = CommissionRate::list(pool).await?;
        tracing::debug!(
            line_count = lines.len(),
            rate_count = rates.len(),
            threshold,
            "computing commission summary"
        );
        Ok(compute_commissions(&lines, &rates, threshold))
    }
}
