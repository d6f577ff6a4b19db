//! Demo data loader
//!
//! Copies a fallback dataset into an empty database so the live and fallback
//! paths can be compared side by side. Never touches a populated database.

use casewatch_core::{Case, CaseRelations, FallbackDataset};
use sqlx::{PgConnection, PgPool};

/// Insert every case of `dataset` with its relations and breakdown rows.
///
/// Runs in one transaction. Returns the number of cases inserted, or 0 when
/// `fraud_cases` already holds data.
pub async fn seed(pool: &PgPool, dataset: &FallbackDataset) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fraud_cases")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "fraud_cases already populated, skipping seed");
        return Ok(0);
    }

    for case in dataset.cases() {
        let related = dataset.relations(&case.id).cloned().unwrap_or_default();
        insert_case(&mut *tx, case, &related).await?;
    }

    let stats = dataset.statistics();
    for region in &stats.by_region {
        sqlx::query(
            "INSERT INTO fraud_stats_by_region (region, case_count, total_amount) VALUES ($1, $2, $3)",
        )
        .bind(&region.region)
        .bind(region.case_count)
        .bind(region.total_amount)
        .execute(&mut *tx)
        .await?;
    }
    for point in &stats.trends {
        sqlx::query("INSERT INTO fraud_trends (month, case_count, total_amount) VALUES ($1, $2, $3)")
            .bind(point.month)
            .bind(point.case_count)
            .bind(point.total_amount)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(cases = dataset.len(), "Seeded demo cases");
    Ok(dataset.len())
}

async fn insert_case(
    conn: &mut PgConnection,
    case: &Case,
    related: &CaseRelations,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO fraud_cases (
            case_id, case_type, status, complexity_score, amount_mad, detection_date,
            patient_name, doctor_name, pharmacy_name, prescription_count, document_count,
            investigation_date, resolution_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(&case.id)
    .bind(&case.case_type)
    .bind(case.status.as_str())
    .bind(case.complexity_score)
    .bind(case.amount_mad)
    .bind(case.detection_date)
    .bind(&case.patient_name)
    .bind(&case.doctor_name)
    .bind(&case.pharmacy_name)
    .bind(case.prescription_count)
    .bind(case.document_count)
    .bind(related.investigation_date)
    .bind(related.resolution_date)
    .execute(&mut *conn)
    .await?;

    for p in &related.prescriptions {
        sqlx::query(
            r#"
            INSERT INTO prescriptions (
                prescription_id, case_id, prescription_date, total_amount_mad, is_fraudulent,
                fraud_indicators, patient_name, patient_national_id, doctor_name,
                doctor_specialty, pharmacy_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&p.id)
        .bind(&case.id)
        .bind(p.date)
        .bind(p.amount_mad)
        .bind(p.is_fraudulent)
        .bind(&p.fraud_indicators)
        .bind(&p.patient.full_name)
        .bind(&p.patient.national_id)
        .bind(&p.doctor.full_name)
        .bind(&p.doctor.specialty)
        .bind(&p.pharmacy_name)
        .execute(&mut *conn)
        .await?;

        for m in &p.medications {
            sqlx::query(
                r#"
                INSERT INTO prescription_items (
                    prescription_id, medication_name, dosage, quantity,
                    unit_price_mad, total_price_mad, is_suspicious
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&p.id)
            .bind(&m.name)
            .bind(&m.dosage)
            .bind(m.quantity)
            .bind(m.unit_price_mad)
            .bind(m.total_price_mad)
            .bind(m.is_suspicious)
            .execute(&mut *conn)
            .await?;
        }
    }

    for d in &related.documents {
        sqlx::query(
            r#"
            INSERT INTO case_documents (
                document_id, case_id, document_type, file_name, file_path,
                scan_quality, is_authentic, file_size, mime_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&d.id)
        .bind(&case.id)
        .bind(&d.document_type)
        .bind(&d.file_name)
        .bind(&d.file_path)
        .bind(&d.scan_quality)
        .bind(d.is_authentic)
        .bind(d.file_size)
        .bind(&d.mime_type)
        .execute(&mut *conn)
        .await?;
    }

    for a in &related.ai_detections {
        sqlx::query(
            r#"
            INSERT INTO ai_detections (
                case_id, agent_type, detection_method, confidence_score,
                risk_indicators, analysis_details, detected_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&case.id)
        .bind(&a.agent_type)
        .bind(&a.detection_method)
        .bind(a.confidence_score)
        .bind(&a.risk_indicators)
        .bind(&a.analysis_details)
        .bind(a.detected_at)
        .execute(&mut *conn)
        .await?;
    }

    for i in &related.investigations {
        sqlx::query(
            r#"
            INSERT INTO investigations (
                investigation_id, case_id, investigator_name, investigation_type,
                status, findings, recommendations, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&i.id)
        .bind(&case.id)
        .bind(&i.investigator_name)
        .bind(&i.investigation_type)
        .bind(&i.status)
        .bind(&i.findings)
        .bind(&i.recommendations)
        .bind(i.start_date)
        .bind(i.end_date)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
