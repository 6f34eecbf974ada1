//! Printable HTML reports and tabular export.
//!
//! Reports are rendered server-side and opened in a browser tab for manual
//! print-to-PDF; export produces a CSV (or HTML table) of service records
//! with exactly the caller-selected columns, in order.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use db::models::service_record::ServiceRecordView;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tera::Tera;
use thiserror::Error;
use ts_rs::TS;

use super::commission::CommissionSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown export column: {0}")]
    UnknownColumn(String),
    #[error("no columns selected")]
    NoColumns,
}

/// Columns the export screen can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportColumn {
    ServiceDate,
    CustomerName,
    StaffName,
    Hours,
    ServiceFee,
    StaffSalary,
    Profit,
    HourlyRate,
    HourlySalary,
    Notes,
}

impl ExportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            Self::ServiceDate => "Date",
            Self::CustomerName => "Customer",
            Self::StaffName => "Staff",
            Self::Hours => "Hours",
            Self::ServiceFee => "Service Fee",
            Self::StaffSalary => "Staff Salary",
            Self::Profit => "Profit",
            Self::HourlyRate => "Hourly Rate",
            Self::HourlySalary => "Hourly Salary",
            Self::Notes => "Notes",
        }
    }

    pub fn value(&self, row: &ServiceRecordView) -> String {
        match self {
            Self::ServiceDate => row.service_date.to_string(),
            Self::CustomerName => row.customer_name.clone(),
            Self::StaffName => row.staff_name.clone().unwrap_or_default(),
            Self::Hours => row.hours.to_string(),
            Self::ServiceFee => format!("{:.2}", row.service_fee),
            Self::StaffSalary => format!("{:.2}", row.staff_salary),
            Self::Profit => format!("{:.2}", row.profit),
            Self::HourlyRate => format!("{:.2}", row.hourly_rate),
            Self::HourlySalary => format!("{:.2}", row.hourly_salary),
            Self::Notes => row.notes.clone().unwrap_or_default(),
        }
    }
}

/// Parse the user's column keys, preserving order. Unknown keys are an
/// input error rather than being silently dropped.
pub fn parse_columns(keys: &[String]) -> Result<Vec<ExportColumn>, ReportError> {
    if keys.is_empty() {
        return Err(ReportError::NoColumns);
    }
    keys.iter()
        .map(|key| ExportColumn::from_str(key).map_err(|_| ReportError::UnknownColumn(key.clone())))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Html,
}

pub struct ExportFile {
    pub content_type: &'static str,
    pub filename: String,
    pub body: Vec<u8>,
}

pub struct ReportService {
    tera: Tera,
}

impl ReportService {
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            "service_report.html",
            include_str!("../templates/service_report.html"),
        )?;
        tera.add_raw_template(
            "commission_report.html",
            include_str!("../templates/commission_report.html"),
        )?;
        tera.add_raw_template(
            "export_table.html",
            include_str!("../templates/export_table.html"),
        )?;
        Ok(Self { tera })
    }

    /// Printable service-visit report over a date range.
    pub fn render_service_report(
        &self,
        rows: &[ServiceRecordView],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<String, ReportError> {
        let total_fee: f64 = rows.iter().map(|r| r.service_fee).sum();
        let total_salary: f64 = rows.iter().map(|r| r.staff_salary).sum();

        let mut context = tera::Context::new();
        context.insert("rows", rows);
        context.insert("from", &from.map(|d| d.to_string()));
        context.insert("to", &to.map(|d| d.to_string()));
        context.insert("total_fee", &total_fee);
        context.insert("total_salary", &total_salary);
        context.insert("total_profit", &(total_fee - total_salary));
        context.insert("generated_at", &now_stamp());

        Ok(self.tera.render("service_report.html", &context)?)
    }

    /// Printable commission statement.
    pub fn render_commission_report(
        &self,
        summary: &CommissionSummary,
    ) -> Result<String, ReportError> {
        let mut context = tera::Context::from_serialize(summary)?;
        context.insert("generated_at", &now_stamp());
        Ok(self.tera.render("commission_report.html", &context)?)
    }

    pub fn export_records(
        &self,
        columns: &[ExportColumn],
        rows: &[ServiceRecordView],
        format: ExportFormat,
    ) -> Result<ExportFile, ReportError> {
        if columns.is_empty() {
            return Err(ReportError::NoColumns);
        }
        let stamp = Utc::now().format("%Y%m%d");
        match format {
            ExportFormat::Csv => Ok(ExportFile {
                content_type: "text/csv",
                filename: format!("service-records-{stamp}.csv"),
                body: export_csv(columns, rows)?,
            }),
            ExportFormat::Html => Ok(ExportFile {
                content_type: "text/html",
                filename: format!("service-records-{stamp}.html"),
                body: self.export_html(columns, rows)?.into_bytes(),
            }),
        }
    }

    fn export_html(
        &self,
        columns: &[ExportColumn],
        rows: &[ServiceRecordView],
    ) -> Result<String, ReportError> {
        let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| columns.iter().map(|c| c.value(row)).collect())
            .collect();

        let mut context = tera::Context::new();
        context.insert("title", "Service Records");
        context.insert("headers", &headers);
        context.insert("rows", &cells);
        context.insert("generated_at", &now_stamp());
        Ok(self.tera.render("export_table.html", &context)?)
    }
}

fn export_csv(columns: &[ExportColumn], rows: &[ServiceRecordView]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.value(row)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}

fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M").to_string()
}
