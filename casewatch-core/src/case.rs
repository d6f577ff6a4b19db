//! Fraud case records.
//!
//! `Case` is the summary row every list/search query returns. `CaseDetail`
//! adds the child collections that only the detail lookup loads.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Lifecycle status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Detected,
    Investigation,
    Confirmed,
    Resolved,
    Pending,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 5] = [
        CaseStatus::Detected,
        CaseStatus::Investigation,
        CaseStatus::Confirmed,
        CaseStatus::Resolved,
        CaseStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Investigation => "investigation",
            Self::Confirmed => "confirmed",
            Self::Resolved => "resolved",
            Self::Pending => "pending",
        }
    }

    /// Dashboard label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Detected => "Détecté",
            Self::Investigation => "En investigation",
            Self::Confirmed => "Confirmé",
            Self::Resolved => "Résolu",
            Self::Pending => "En attente",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "status",
                value: s.to_owned(),
            })
    }
}

/// Summary record of one detected or suspected fraud instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub case_type: String,
    pub status: CaseStatus,
    pub complexity_score: i32,
    pub amount_mad: f64,
    pub detection_date: DateTime<Utc>,
    pub patient_name: String,
    pub doctor_name: String,
    pub pharmacy_name: String,
    #[serde(default)]
    pub prescription_count: i32,
    #[serde(default)]
    pub document_count: i32,
}

impl Case {
    /// Case-insensitive substring match across id, party names and category.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_term(&self, needle: &str) -> bool {
        [
            &self.id,
            &self.patient_name,
            &self.doctor_name,
            &self.pharmacy_name,
            &self.case_type,
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Listing order: detection date descending, then id ascending.
    pub fn newest_first(a: &Case, b: &Case) -> Ordering {
        b.detection_date
            .cmp(&a.detection_date)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Patient as referenced from a prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRef {
    pub full_name: String,
    pub national_id: Option<String>,
}

/// Prescribing doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRef {
    pub full_name: String,
    pub specialty: Option<String>,
}

/// One medication line on a prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedication {
    pub name: String,
    pub dosage: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub unit_price_mad: f64,
    #[serde(default)]
    pub total_price_mad: f64,
    pub is_suspicious: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount_mad: f64,
    pub is_fraudulent: Option<bool>,
    #[serde(default)]
    pub fraud_indicators: Vec<String>,
    pub patient: PatientRef,
    pub doctor: DoctorRef,
    pub pharmacy_name: String,
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
}

/// Scanned document attached to a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDocument {
    pub id: String,
    pub document_type: String,
    pub file_name: String,
    pub file_path: Option<String>,
    pub scan_quality: Option<String>,
    pub is_authentic: Option<bool>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// Detection record left by one of the analysis agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetection {
    pub agent_type: String,
    pub detection_method: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub risk_indicators: Vec<String>,
    #[serde(default)]
    pub analysis_details: serde_json::Value,
    pub detected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    pub id: String,
    pub investigator_name: String,
    pub investigation_type: String,
    pub status: String,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything hanging off a case that the detail view shows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseRelations {
    pub investigation_date: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub prescriptions: Vec<Prescription>,
    pub documents: Vec<CaseDocument>,
    pub ai_detections: Vec<AiDetection>,
    pub investigations: Vec<Investigation>,
}

/// A case together with its related entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetail {
    pub case: Case,
    #[serde(flatten)]
    pub related: CaseRelations,
}

impl CaseDetail {
    pub fn new(case: Case, related: CaseRelations) -> Self {
        Self { case, related }
    }

    /// Detail view of a case with no related records loaded
    pub fn bare(case: Case) -> Self {
        Self::new(case, CaseRelations::default())
    }
}
