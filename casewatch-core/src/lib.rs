//! casewatch-core: typed fraud-case records and the query primitives shared
//! by the live datastore and the in-memory fallback dataset.

pub mod case;
pub mod config;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod page;
pub mod stats;
pub mod validation;

pub use case::{
    AiDetection, Case, CaseDetail, CaseDocument, CaseRelations, CaseStatus, DoctorRef,
    Investigation, PatientRef, PrescribedMedication, Prescription,
};
pub use config::CasewatchConfig;
pub use error::{CoreError, Result};
pub use fallback::FallbackDataset;
pub use filter::CaseFilter;
pub use page::PageRequest;
pub use stats::{
    amount_facets, detection_rate, region_facets, AmountRange, FacetCount, FilterOptions,
    RegionStat, Statistics, TrendPoint, AMOUNT_RANGES,
};
pub use validation::ValidationError;
