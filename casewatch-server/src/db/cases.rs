//! Case repository - reads against the live PostgreSQL schema
//!
//! List and search compose their WHERE clause with `QueryBuilder` so every
//! filter value is a bound parameter. Ordering always matches the fallback
//! dataset: detection date descending, then case id.

use std::collections::HashMap;

use casewatch_core::{
    AiDetection, Case, CaseDetail, CaseDocument, CaseFilter, CaseRelations, CaseStatus,
    amount_facets, DoctorRef, FacetCount, FilterOptions, Investigation, PageRequest, PatientRef,
    PrescribedMedication, Prescription, RegionStat, Statistics, TrendPoint,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid {column} in case '{id}': {reason}")]
    Decode {
        column: &'static str,
        id: String,
        reason: String,
    },
}

const CASE_COLUMNS: &str = "case_id, case_type, status, complexity_score, \
    amount_mad::float8 AS amount_mad, detection_date, patient_name, doctor_name, \
    pharmacy_name, prescription_count, document_count";

const SEARCH_COLUMNS: [&str; 5] = [
    "case_id",
    "patient_name",
    "doctor_name",
    "pharmacy_name",
    "case_type",
];

const ORDER_NEWEST_FIRST: &str = " ORDER BY detection_date DESC, case_id ASC";

/// Case summary row
#[derive(Debug, FromRow)]
struct CaseRow {
    case_id: String,
    case_type: String,
    status: String,
    complexity_score: i32,
    amount_mad: f64,
    detection_date: DateTime<Utc>,
    patient_name: String,
    doctor_name: String,
    pharmacy_name: String,
    prescription_count: i32,
    document_count: i32,
}

impl TryFrom<CaseRow> for Case {
    type Error = DbError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let status: CaseStatus = row.status.parse().map_err(|e| DbError::Decode {
            column: "status",
            id: row.case_id.clone(),
            reason: format!("{}", e),
        })?;

        Ok(Case {
            id: row.case_id,
            case_type: row.case_type,
            status,
            complexity_score: row.complexity_score,
            amount_mad: row.amount_mad,
            detection_date: row.detection_date,
            patient_name: row.patient_name,
            doctor_name: row.doctor_name,
            pharmacy_name: row.pharmacy_name,
            prescription_count: row.prescription_count,
            document_count: row.document_count,
        })
    }
}

#[derive(Debug, FromRow)]
struct CaseHeaderRow {
    #[sqlx(flatten)]
    case: CaseRow,
    investigation_date: Option<DateTime<Utc>>,
    resolution_date: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct PrescriptionRow {
    prescription_id: String,
    prescription_date: Option<NaiveDate>,
    total_amount_mad: f64,
    is_fraudulent: Option<bool>,
    fraud_indicators: Vec<String>,
    patient_name: String,
    patient_national_id: Option<String>,
    doctor_name: String,
    doctor_specialty: Option<String>,
    pharmacy_name: String,
}

#[derive(Debug, FromRow)]
struct PrescriptionItemRow {
    prescription_id: String,
    medication_name: String,
    dosage: Option<String>,
    quantity: i32,
    unit_price_mad: f64,
    total_price_mad: f64,
    is_suspicious: Option<bool>,
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    document_id: String,
    document_type: String,
    file_name: String,
    file_path: Option<String>,
    scan_quality: Option<String>,
    is_authentic: Option<bool>,
    file_size: Option<i64>,
    mime_type: Option<String>,
}

impl From<DocumentRow> for CaseDocument {
    fn from(r: DocumentRow) -> Self {
        Self {
            id: r.document_id,
            document_type: r.document_type,
            file_name: r.file_name,
            file_path: r.file_path,
            scan_quality: r.scan_quality,
            is_authentic: r.is_authentic,
            file_size: r.file_size,
            mime_type: r.mime_type,
        }
    }
}

#[derive(Debug, FromRow)]
struct DetectionRow {
    agent_type: String,
    detection_method: Option<String>,
    confidence_score: f64,
    risk_indicators: Vec<String>,
    analysis_details: serde_json::Value,
    detected_at: Option<DateTime<Utc>>,
}

impl From<DetectionRow> for AiDetection {
    fn from(r: DetectionRow) -> Self {
        Self {
            agent_type: r.agent_type,
            detection_method: r.detection_method,
            confidence_score: r.confidence_score,
            risk_indicators: r.risk_indicators,
            analysis_details: r.analysis_details,
            detected_at: r.detected_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct InvestigationRow {
    investigation_id: String,
    investigator_name: String,
    investigation_type: String,
    status: String,
    findings: Option<String>,
    recommendations: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl From<InvestigationRow> for Investigation {
    fn from(r: InvestigationRow) -> Self {
        Self {
            id: r.investigation_id,
            investigator_name: r.investigator_name,
            investigation_type: r.investigation_type,
            status: r.status,
            findings: r.findings,
            recommendations: r.recommendations,
            start_date: r.start_date,
            end_date: r.end_date,
        }
    }
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    total_cases: i64,
    confirmed_cases: i64,
    total_amount: f64,
}

#[derive(Debug, FromRow)]
struct FacetRow {
    value: String,
    count: i64,
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` escaped.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CaseFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(case_type) = filter.case_type() {
        qb.push(" AND case_type = ").push_bind(case_type.to_owned());
    }
    if let Some(min) = filter.min_amount {
        qb.push(" AND amount_mad::float8 >= ").push_bind(min);
    }
    if let Some(max) = filter.max_amount {
        qb.push(" AND amount_mad::float8 <= ").push_bind(max);
    }
    if let Some(term) = filter.search_term() {
        push_search(qb, term);
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Case repository
pub struct CaseRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CaseRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lightweight liveness probe.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(self.pool).await?;
        Ok(())
    }

    /// Filtered listing, newest first, windowed by `page`.
    pub async fn list(&self, page: PageRequest, filter: &CaseFilter) -> Result<Vec<Case>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fraud_cases WHERE TRUE",
            CASE_COLUMNS
        ));
        push_filter(&mut qb, filter);
        qb.push(ORDER_NEWEST_FIRST)
            .push(" LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(clamp_i64(page.offset()));

        let rows: Vec<CaseRow> = qb.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(Case::try_from).collect()
    }

    /// Free-text search across id, party names and category.
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<Case>, DbError> {
        self.list(
            PageRequest::new(limit, 0),
            &CaseFilter::default().with_search(term),
        )
        .await
    }

    /// Case with all related entities, `None` if the id is unknown.
    pub async fn get_detail(&self, case_id: &str) -> Result<Option<CaseDetail>, DbError> {
        let header: Option<CaseHeaderRow> = sqlx::query_as(&format!(
            "SELECT {}, investigation_date, resolution_date FROM fraud_cases WHERE case_id = $1",
            CASE_COLUMNS
        ))
        .bind(case_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let related = CaseRelations {
            investigation_date: header.investigation_date,
            resolution_date: header.resolution_date,
            prescriptions: self.prescriptions(case_id).await?,
            documents: self.documents(case_id).await?,
            ai_detections: self.ai_detections(case_id).await?,
            investigations: self.investigations(case_id).await?,
        };

        Ok(Some(CaseDetail::new(Case::try_from(header.case)?, related)))
    }

    async fn prescriptions(&self, case_id: &str) -> Result<Vec<Prescription>, DbError> {
        let rows: Vec<PrescriptionRow> = sqlx::query_as(
            r#"
            SELECT prescription_id, prescription_date,
                   total_amount_mad::float8 AS total_amount_mad, is_fraudulent,
                   fraud_indicators, patient_name, patient_national_id,
                   doctor_name, doctor_specialty, pharmacy_name
            FROM prescriptions
            WHERE case_id = $1
            ORDER BY prescription_date DESC NULLS LAST, prescription_id
            "#,
        )
        .bind(case_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.prescription_id.clone()).collect();
        let items: Vec<PrescriptionItemRow> = sqlx::query_as(
            r#"
            SELECT prescription_id, medication_name, dosage, quantity,
                   unit_price_mad::float8 AS unit_price_mad,
                   total_price_mad::float8 AS total_price_mad, is_suspicious
            FROM prescription_items
            WHERE prescription_id = ANY($1)
            ORDER BY prescription_id, id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut medications: HashMap<String, Vec<PrescribedMedication>> = HashMap::new();
        for item in items {
            medications
                .entry(item.prescription_id)
                .or_default()
                .push(PrescribedMedication {
                    name: item.medication_name,
                    dosage: item.dosage,
                    quantity: item.quantity,
                    unit_price_mad: item.unit_price_mad,
                    total_price_mad: item.total_price_mad,
                    is_suspicious: item.is_suspicious,
                });
        }

        Ok(rows
            .into_iter()
            .map(|r| Prescription {
                medications: medications.remove(&r.prescription_id).unwrap_or_default(),
                id: r.prescription_id,
                date: r.prescription_date,
                amount_mad: r.total_amount_mad,
                is_fraudulent: r.is_fraudulent,
                fraud_indicators: r.fraud_indicators,
                patient: PatientRef {
                    full_name: r.patient_name,
                    national_id: r.patient_national_id,
                },
                doctor: DoctorRef {
                    full_name: r.doctor_name,
                    specialty: r.doctor_specialty,
                },
                pharmacy_name: r.pharmacy_name,
            })
            .collect())
    }

    async fn documents(&self, case_id: &str) -> Result<Vec<CaseDocument>, DbError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT document_id, document_type, file_name, file_path, scan_quality,
                   is_authentic, file_size, mime_type
            FROM case_documents
            WHERE case_id = $1
            ORDER BY document_id
            "#,
        )
        .bind(case_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CaseDocument::from).collect())
    }

    async fn ai_detections(&self, case_id: &str) -> Result<Vec<AiDetection>, DbError> {
        let rows: Vec<DetectionRow> = sqlx::query_as(
            r#"
            SELECT agent_type, detection_method, confidence_score, risk_indicators,
                   analysis_details, detected_at
            FROM ai_detections
            WHERE case_id = $1
            ORDER BY detected_at DESC NULLS LAST, id
            "#,
        )
        .bind(case_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AiDetection::from).collect())
    }

    async fn investigations(&self, case_id: &str) -> Result<Vec<Investigation>, DbError> {
        let rows: Vec<InvestigationRow> = sqlx::query_as(
            r#"
            SELECT investigation_id, investigator_name, investigation_type, status,
                   findings, recommendations, start_date, end_date
            FROM investigations
            WHERE case_id = $1
            ORDER BY start_date DESC NULLS LAST, investigation_id
            "#,
        )
        .bind(case_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Investigation::from).collect())
    }

    /// Totals plus the region and monthly breakdown tables.
    pub async fn statistics(&self) -> Result<Statistics, DbError> {
        let totals: TotalsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_cases,
                COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed_cases,
                COALESCE(SUM(amount_mad), 0)::float8 AS total_amount
            FROM fraud_cases
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        let by_region: Vec<(String, i64, f64)> = sqlx::query_as(
            r#"
            SELECT region, case_count, total_amount::float8
            FROM fraud_stats_by_region
            ORDER BY case_count DESC, region
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let trends: Vec<(NaiveDate, i64, f64)> = sqlx::query_as(
            r#"
            SELECT month, case_count, total_amount::float8
            FROM fraud_trends
            ORDER BY month DESC
            LIMIT 12
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(Statistics::new(
            count(totals.total_cases),
            count(totals.confirmed_cases),
            totals.total_amount,
            by_region
                .into_iter()
                .map(|(region, case_count, total_amount)| RegionStat {
                    region,
                    case_count,
                    total_amount,
                })
                .collect(),
            trends
                .into_iter()
                .map(|(month, case_count, total_amount)| TrendPoint {
                    month,
                    case_count,
                    total_amount,
                })
                .collect(),
        ))
    }

    /// Status, case type, region and amount range facets with their counts.
    pub async fn filter_options(&self) -> Result<FilterOptions, DbError> {
        let status: Vec<FacetRow> = sqlx::query_as(
            "SELECT status AS value, COUNT(*) AS count FROM fraud_cases GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let case_type: Vec<FacetRow> = sqlx::query_as(
            "SELECT case_type AS value, COUNT(*) AS count FROM fraud_cases GROUP BY case_type ORDER BY case_type",
        )
        .fetch_all(self.pool)
        .await?;

        let regions: Vec<FacetRow> = sqlx::query_as(
            r#"
            SELECT region AS value, case_count::int8 AS count
            FROM fraud_stats_by_region
            ORDER BY case_count DESC, region
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let amounts: AmountRangeRow = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN amount_mad >= 0 AND amount_mad < 10000 THEN 1 ELSE 0 END), 0)::int8 AS up_to_10k,
                COALESCE(SUM(CASE WHEN amount_mad >= 10000 AND amount_mad < 100000 THEN 1 ELSE 0 END), 0)::int8 AS up_to_100k,
                COALESCE(SUM(CASE WHEN amount_mad >= 100000 AND amount_mad < 1000000 THEN 1 ELSE 0 END), 0)::int8 AS up_to_1m,
                COALESCE(SUM(CASE WHEN amount_mad >= 1000000 THEN 1 ELSE 0 END), 0)::int8 AS over_1m
            FROM fraud_cases
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        let plain = |rows: Vec<FacetRow>| -> Vec<FacetCount> {
            rows.into_iter()
                .map(|r| FacetCount::plain(r.value, count(r.count)))
                .collect()
        };

        Ok(FilterOptions {
            status: status.into_iter().map(status_facet).collect(),
            case_type: plain(case_type),
            regions: plain(regions),
            amount_ranges: amount_facets([
                count(amounts.up_to_10k),
                count(amounts.up_to_100k),
                count(amounts.up_to_1m),
                count(amounts.over_1m),
            ]),
        })
    }
}

#[derive(Debug, FromRow)]
struct AmountRangeRow {
    up_to_10k: i64,
    up_to_100k: i64,
    up_to_1m: i64,
    over_1m: i64,
}

/// Status facet labelled like the fallback; unknown values label themselves.
fn status_facet(row: FacetRow) -> FacetCount {
    match row.value.parse::<CaseStatus>() {
        Ok(status) => FacetCount::new(status.as_str(), status.label(), count(row.count)),
        Err(_) => FacetCount::plain(row.value, count(row.count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("IDRISSI"), "%IDRISSI%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("DET_0"), "%DET\\_0%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn filter_sql_binds_every_value() {
        let filter = CaseFilter::default()
            .with_status(CaseStatus::Confirmed)
            .with_case_type("Réseau organisé")
            .with_amount_range(Some(10.0), Some(20.0))
            .with_search("tazi");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM fraud_cases WHERE TRUE");
        push_filter(&mut qb, &filter);
        let sql = qb.sql();

        assert!(sql.contains("status = $1"));
        assert!(sql.contains("case_type = $2"));
        assert!(sql.contains("amount_mad::float8 >= $3"));
        assert!(sql.contains("amount_mad::float8 <= $4"));
        assert!(sql.contains("case_id ILIKE $5"));
        assert!(sql.contains("case_type ILIKE $9"));
        assert!(!sql.contains("tazi"));
    }

    #[test]
    fn empty_filter_adds_no_predicates() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM fraud_cases WHERE TRUE");
        push_filter(&mut qb, &CaseFilter::default());
        assert_eq!(qb.sql(), "SELECT 1 FROM fraud_cases WHERE TRUE");
    }

    #[test]
    fn status_facets_carry_labels() {
        let known = status_facet(FacetRow {
            value: "resolved".into(),
            count: 4,
        });
        assert_eq!(known, FacetCount::new("resolved", "Résolu", 4));

        let unknown = status_facet(FacetRow {
            value: "archived".into(),
            count: 1,
        });
        assert_eq!(unknown.label, "archived");
    }

    #[test]
    fn unknown_status_fails_decode() {
        let row = CaseRow {
            case_id: "DET_9".into(),
            case_type: "x".into(),
            status: "archived".into(),
            complexity_score: 1,
            amount_mad: 1.0,
            detection_date: Utc::now(),
            patient_name: "p".into(),
            doctor_name: "d".into(),
            pharmacy_name: "ph".into(),
            prescription_count: 0,
            document_count: 0,
        };
        let err = Case::try_from(row).unwrap_err();
        assert!(err.to_string().contains("DET_9"));
    }

    // Integration tests - run with DATABASE_URL set
    // cargo test -p casewatch-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn seeded_listing_matches_fallback() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url, &Default::default())
            .await
            .expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");
        let dataset = casewatch_core::FallbackDataset::demo();
        crate::db::seed::seed(&pool, &dataset).await.expect("seed failed");

        let filter = CaseFilter::default().with_status(CaseStatus::Confirmed);
        let live = CaseRepo::new(&pool)
            .list(PageRequest::new(2, 0), &filter)
            .await
            .expect("list failed");
        let ids: Vec<_> = live.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["DET_001", "DET_003"]);
    }
}
