//! Case listing and detail endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use casewatch_core::{
    AiDetection, Case, CaseDetail, CaseDocument, CaseStatus, DoctorRef, Investigation,
    PatientRef, PrescribedMedication, Prescription,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::http::envelope::{Envelope, PaginationMeta};
use crate::http::error::ApiError;
use crate::http::extractors::CaseListQuery;
use crate::http::server::AppState;
use crate::repository::Sourced;

#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CaseMetrics {
    pub prescription_count: i32,
    pub document_count: i32,
}

/// Case summary as shown in the dashboard list
#[derive(Debug, Serialize)]
pub struct CaseResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub status: CaseStatus,
    pub complexity_score: i32,
    pub amount_mad: f64,
    pub detection_date: DateTime<Utc>,
    pub patient: NamedRef,
    pub doctor: NamedRef,
    pub pharmacy: NamedRef,
    pub metrics: CaseMetrics,
}

impl From<Case> for CaseResponse {
    fn from(c: Case) -> Self {
        Self {
            id: c.id,
            case_type: c.case_type,
            status: c.status,
            complexity_score: c.complexity_score,
            amount_mad: c.amount_mad,
            detection_date: c.detection_date,
            patient: NamedRef { name: c.patient_name },
            doctor: NamedRef { name: c.doctor_name },
            pharmacy: NamedRef { name: c.pharmacy_name },
            metrics: CaseMetrics {
                prescription_count: c.prescription_count,
                document_count: c.document_count,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaseInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub status: CaseStatus,
    pub complexity_score: i32,
    pub amount_mad: f64,
    pub detection_date: DateTime<Utc>,
    pub investigation_date: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PrescriptionResponse {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub amount_mad: f64,
    pub is_fraudulent: Option<bool>,
    pub fraud_indicators: Vec<String>,
    pub patient: PatientRef,
    pub doctor: DoctorRef,
    pub pharmacy: NamedRef,
    pub medications: Vec<PrescribedMedication>,
}

impl From<Prescription> for PrescriptionResponse {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            date: p.date,
            amount_mad: p.amount_mad,
            is_fraudulent: p.is_fraudulent,
            fraud_indicators: p.fraud_indicators,
            patient: p.patient,
            doctor: p.doctor,
            pharmacy: NamedRef {
                name: p.pharmacy_name,
            },
            medications: p.medications,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub document_type: String,
    pub file_name: String,
    pub file_path: Option<String>,
    pub scan_quality: Option<String>,
    pub is_authentic: Option<bool>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

impl From<CaseDocument> for DocumentResponse {
    fn from(d: CaseDocument) -> Self {
        Self {
            id: d.id,
            document_type: d.document_type,
            file_name: d.file_name,
            file_path: d.file_path,
            scan_quality: d.scan_quality,
            is_authentic: d.is_authentic,
            file_size: d.file_size,
            mime_type: d.mime_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvestigationResponse {
    pub id: String,
    pub investigator_name: String,
    #[serde(rename = "type")]
    pub investigation_type: String,
    pub status: String,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<Investigation> for InvestigationResponse {
    fn from(i: Investigation) -> Self {
        Self {
            id: i.id,
            investigator_name: i.investigator_name,
            investigation_type: i.investigation_type,
            status: i.status,
            findings: i.findings,
            recommendations: i.recommendations,
            start_date: i.start_date,
            end_date: i.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AiDetectionResponse {
    pub agent_type: String,
    pub detection_method: Option<String>,
    pub confidence_score: f64,
    pub risk_indicators: Vec<String>,
    pub analysis_details: serde_json::Value,
    pub detection_timestamp: Option<DateTime<Utc>>,
}

impl From<AiDetection> for AiDetectionResponse {
    fn from(d: AiDetection) -> Self {
        Self {
            agent_type: d.agent_type,
            detection_method: d.detection_method,
            confidence_score: d.confidence_score,
            risk_indicators: d.risk_indicators,
            analysis_details: d.analysis_details,
            detection_timestamp: d.detected_at,
        }
    }
}

/// Full case view
#[derive(Debug, Serialize)]
pub struct CaseDetailResponse {
    pub case_info: CaseInfo,
    pub prescriptions: Vec<PrescriptionResponse>,
    pub documents: Vec<DocumentResponse>,
    pub ai_detections: Vec<AiDetectionResponse>,
    pub investigations: Vec<InvestigationResponse>,
}

impl From<CaseDetail> for CaseDetailResponse {
    fn from(detail: CaseDetail) -> Self {
        let CaseDetail { case, related } = detail;
        Self {
            case_info: CaseInfo {
                id: case.id,
                case_type: case.case_type,
                status: case.status,
                complexity_score: case.complexity_score,
                amount_mad: case.amount_mad,
                detection_date: case.detection_date,
                investigation_date: related.investigation_date,
                resolution_date: related.resolution_date,
            },
            prescriptions: related.prescriptions.into_iter().map(Into::into).collect(),
            documents: related.documents.into_iter().map(Into::into).collect(),
            ai_detections: related.ai_detections.into_iter().map(Into::into).collect(),
            investigations: related.investigations.into_iter().map(Into::into).collect(),
        }
    }
}

/// GET /cases - filtered listing with page metadata
async fn list_cases(
    State(state): State<Arc<AppState>>,
    query: CaseListQuery,
) -> Json<Envelope<Vec<CaseResponse>>> {
    let answer = state.repository.list_cases(query.window, &query.filter).await;
    let pagination = PaginationMeta::new(query.page, query.window.limit(), answer.data.len());

    Json(
        Envelope::new(answer.map(|cases| cases.into_iter().map(CaseResponse::from).collect()))
            .with_pagination(pagination)
            .with_filters(query.filter),
    )
}

/// GET /cases/{id} - case with prescriptions, documents, detections and investigations
async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(case_id): Path<String>,
) -> Result<Json<Envelope<CaseDetailResponse>>, ApiError> {
    let Sourced { data, source } = state.repository.get_case_detail(&case_id).await;
    let detail = data.ok_or(ApiError::NotFound {
        resource: "case",
        id: case_id,
    })?;

    Ok(Json(Envelope::new(Sourced {
        data: CaseDetailResponse::from(detail),
        source,
    })))
}

/// Case routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cases", get(list_cases))
        .route("/cases/{id}", get(get_case))
}
