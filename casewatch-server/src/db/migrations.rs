//! Database migrations for the case tables

use sqlx::PgPool;

/// Statements run in order; each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS fraud_cases (
        case_id TEXT PRIMARY KEY,
        case_type TEXT NOT NULL,
        status TEXT NOT NULL
            CHECK (status IN ('detected', 'investigation', 'confirmed', 'resolved', 'pending')),
        complexity_score INTEGER NOT NULL,
        amount_mad NUMERIC(14, 2) NOT NULL,
        detection_date TIMESTAMPTZ NOT NULL,
        patient_name TEXT NOT NULL,
        doctor_name TEXT NOT NULL,
        pharmacy_name TEXT NOT NULL,
        prescription_count INTEGER NOT NULL DEFAULT 0,
        document_count INTEGER NOT NULL DEFAULT 0,
        investigation_date TIMESTAMPTZ,
        resolution_date TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS prescriptions (
        prescription_id TEXT PRIMARY KEY,
        case_id TEXT NOT NULL REFERENCES fraud_cases(case_id) ON DELETE CASCADE,
        prescription_date DATE,
        total_amount_mad NUMERIC(14, 2) NOT NULL DEFAULT 0,
        is_fraudulent BOOLEAN,
        fraud_indicators TEXT[] NOT NULL DEFAULT '{}',
        patient_name TEXT NOT NULL,
        patient_national_id TEXT,
        doctor_name TEXT NOT NULL,
        doctor_specialty TEXT,
        pharmacy_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS prescription_items (
        id BIGSERIAL PRIMARY KEY,
        prescription_id TEXT NOT NULL REFERENCES prescriptions(prescription_id) ON DELETE CASCADE,
        medication_name TEXT NOT NULL,
        dosage TEXT,
        quantity INTEGER NOT NULL,
        unit_price_mad NUMERIC(12, 2) NOT NULL DEFAULT 0,
        total_price_mad NUMERIC(14, 2) NOT NULL DEFAULT 0,
        is_suspicious BOOLEAN
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS case_documents (
        document_id TEXT PRIMARY KEY,
        case_id TEXT NOT NULL REFERENCES fraud_cases(case_id) ON DELETE CASCADE,
        document_type TEXT NOT NULL,
        file_name TEXT NOT NULL,
        file_path TEXT,
        scan_quality TEXT,
        is_authentic BOOLEAN,
        file_size BIGINT,
        mime_type TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ai_detections (
        id BIGSERIAL PRIMARY KEY,
        case_id TEXT NOT NULL REFERENCES fraud_cases(case_id) ON DELETE CASCADE,
        agent_type TEXT NOT NULL,
        detection_method TEXT,
        confidence_score DOUBLE PRECISION NOT NULL DEFAULT 0,
        risk_indicators TEXT[] NOT NULL DEFAULT '{}',
        analysis_details JSONB NOT NULL DEFAULT 'null'::jsonb,
        detected_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS investigations (
        investigation_id TEXT PRIMARY KEY,
        case_id TEXT NOT NULL REFERENCES fraud_cases(case_id) ON DELETE CASCADE,
        investigator_name TEXT NOT NULL,
        investigation_type TEXT NOT NULL,
        status TEXT NOT NULL,
        findings TEXT,
        recommendations TEXT,
        start_date DATE,
        end_date DATE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fraud_stats_by_region (
        region TEXT PRIMARY KEY,
        case_count BIGINT NOT NULL,
        total_amount NUMERIC(16, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fraud_trends (
        month DATE PRIMARY KEY,
        case_count BIGINT NOT NULL,
        total_amount NUMERIC(16, 2) NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_fraud_cases_status ON fraud_cases(status)",
    "CREATE INDEX IF NOT EXISTS idx_fraud_cases_type ON fraud_cases(case_type)",
    "CREATE INDEX IF NOT EXISTS idx_fraud_cases_amount ON fraud_cases(amount_mad)",
    "CREATE INDEX IF NOT EXISTS idx_fraud_cases_date ON fraud_cases(detection_date DESC, case_id)",
    "CREATE INDEX IF NOT EXISTS idx_prescriptions_case ON prescriptions(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_prescription_items_prescription ON prescription_items(prescription_id)",
    "CREATE INDEX IF NOT EXISTS idx_case_documents_case ON case_documents(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_ai_detections_case ON ai_detections(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_investigations_case ON investigations(case_id)",
];

/// Run all case-table migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running case table migrations...");

    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = SCHEMA.len(), "Migrations complete");
    Ok(())
}
