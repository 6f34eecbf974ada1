use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// At most this many uploaded certificates per staff member.
pub const MAX_CERTIFICATES: usize = 5;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "contract_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Pending,
    Active,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CareStaff {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub hkid: Option<String>,
    pub address: Option<String>,
    pub job_positions: Vec<String>,
    pub languages: Vec<String>,
    pub contract_status: ContractStatus,
    pub certificate_urls: Vec<String>,
    pub id_copy_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row shape; the tag and certificate lists live as JSON text columns.
#[derive(Debug, FromRow)]
struct CareStaffRow {
    id: Uuid,
    name: String,
    phone: String,
    email: Option<String>,
    hkid: Option<String>,
    address: Option<String>,
    job_positions: String,
    languages: String,
    contract_status: ContractStatus,
    certificate_urls: String,
    id_copy_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl From<CareStaffRow> for CareStaff {
    fn from(row: CareStaffRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            hkid: row.hkid,
            address: row.address,
            job_positions: parse_tags(&row.job_positions),
            languages: parse_tags(&row.languages),
            contract_status: row.contract_status,
            certificate_urls: parse_tags(&row.certificate_urls),
            id_copy_url: row.id_copy_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCareStaff {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub hkid: Option<String>,
    pub address: Option<String>,
    pub job_positions: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub contract_status: Option<ContractStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCareStaff {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub hkid: Option<String>,
    pub address: Option<String>,
    pub job_positions: Vec<String>,
    pub languages: Vec<String>,
    pub contract_status: ContractStatus,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CareStaffFilter {
    pub q: Option<String>,
    pub contract_status: Option<ContractStatus>,
    pub job_position: Option<String>,
}

const SELECT: &str = "SELECT id, name, phone, email, hkid, address, job_positions, languages, \
                      contract_status, certificate_urls, id_copy_url, created_at, updated_at \
                      FROM care_staff";

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

impl CareStaff {
    pub async fn create(pool: &SqlitePool, data: &CreateCareStaff) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let job_positions = encode_tags(data.job_positions.as_deref().unwrap_or_default());
        let languages = encode_tags(data.languages.as_deref().unwrap_or_default());
        let contract_status = data.contract_status.clone().unwrap_or_default();

        let row = sqlx::query_as::<_, CareStaffRow>(
            "INSERT INTO care_staff (id, name, phone, email, hkid, address, job_positions, \
             languages, contract_status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             RETURNING id, name, phone, email, hkid, address, job_positions, languages, \
             contract_status, certificate_urls, id_copy_url, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.hkid)
        .bind(&data.address)
        .bind(job_positions)
        .bind(languages)
        .bind(contract_status)
        .fetch_one(pool)
        .await?;
        Ok(row.into())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, CareStaffRow>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list(
        pool: &SqlitePool,
        filter: &CareStaffFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Tag filtering matches against the JSON-encoded element, so a query
        // for `nurse` does not match `nurse-assistant`.
        let rows = sqlx::query_as::<_, CareStaffRow>(&format!(
            "{SELECT} \
             WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%' OR phone LIKE '%' || ?1 || '%') \
               AND (?2 IS NULL OR contract_status = ?2) \
               AND (?3 IS NULL OR job_positions LIKE '%\"' || ?3 || '\"%') \
             ORDER BY created_at DESC"
        ))
        .bind(&filter.q)
        .bind(&filter.contract_status)
        .bind(&filter.job_position)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCareStaff,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, CareStaffRow>(
            "UPDATE care_staff SET name = ?2, phone = ?3, email = ?4, hkid = ?5, \
             address = ?6, job_positions = ?7, languages = ?8, contract_status = ?9, \
             updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1 \
             RETURNING id, name, phone, email, hkid, address, job_positions, languages, \
             contract_status, certificate_urls, id_copy_url, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.hkid)
        .bind(&data.address)
        .bind(encode_tags(&data.job_positions))
        .bind(encode_tags(&data.languages))
        .bind(&data.contract_status)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Overwrite the document columns. Callers enforce [`MAX_CERTIFICATES`]
    /// before getting here.
    pub async fn update_documents(
        pool: &SqlitePool,
        id: Uuid,
        certificate_urls: &[String],
        id_copy_url: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE care_staff SET certificate_urls = ?2, id_copy_url = ?3, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
        )
        .bind(id)
        .bind(encode_tags(certificate_urls))
        .bind(id_copy_url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM care_staff WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_active(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM care_staff WHERE contract_status = 'active'")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_db;

    fn sample() -> CreateCareStaff {
        CreateCareStaff {
            name: "Lam Mei Ling".to_string(),
            phone: "67891234".to_string(),
            email: None,
            hkid: None,
            address: None,
            job_positions: Some(vec!["nurse".to_string(), "care-worker".to_string()]),
            languages: Some(vec!["cantonese".to_string(), "english".to_string()]),
            contract_status: Some(ContractStatus::Active),
        }
    }

    #[tokio::test]
    async fn tags_survive_the_json_columns() {
        let db = memory_db().await;
        let created = CareStaff::create(&db.pool, &sample()).await.unwrap();
        let found = CareStaff::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.job_positions, vec!["nurse", "care-worker"]);
        assert_eq!(found.languages, vec!["cantonese", "english"]);
        assert!(found.certificate_urls.is_empty());
    }

    #[tokio::test]
    async fn job_position_filter_matches_whole_tags_only() {
        let db = memory_db().await;
        CareStaff::create(&db.pool, &sample()).await.unwrap();

        let filter = CareStaffFilter {
            job_position: Some("nurse".to_string()),
            ..Default::default()
        };
        assert_eq!(CareStaff::list(&db.pool, &filter).await.unwrap().len(), 1);

        let filter = CareStaffFilter {
            job_position: Some("nur".to_string()),
            ..Default::default()
        };
        assert!(CareStaff::list(&db.pool, &filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn document_columns_update_in_place() {
        let db = memory_db().await;
        let created = CareStaff::create(&db.pool, &sample()).await.unwrap();
        let certs = vec!["/api/care-staff/x/documents/cert1.pdf".to_string()];
        let updated = CareStaff::update_documents(&db.pool, created.id, &certs, Some("/id.jpg"))
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let found = CareStaff::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.certificate_urls, certs);
        assert_eq!(found.id_copy_url.as_deref(), Some("/id.jpg"));
    }
}
