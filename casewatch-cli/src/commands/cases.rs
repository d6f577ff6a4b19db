//! One-shot case queries through the repository facade
//!
//! Output is a plain table by default and the tagged `{ data, source }` JSON
//! with `--json`.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use casewatch_core::{Case, CaseFilter, CaseStatus, PageRequest};
use casewatch_server::{build_repository, CaseRepository, Sourced};

use super::{load_config, SourceArgs};

#[derive(Parser, Debug)]
pub struct CasesArgs {
    /// Skip the database and answer from the fallback dataset
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: CasesCommands,
}

#[derive(Subcommand, Debug)]
pub enum CasesCommands {
    /// List cases, newest first
    List(ListArgs),
    /// Show one case with its related records
    Show(ShowArgs),
    /// Free-text search across id, patient, doctor, pharmacy and case type
    Search(SearchArgs),
    /// Totals, detection rate and breakdowns
    Stats,
    /// Status, case type, region and amount range values with counts
    Filters,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number (1-indexed)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Cases per page (max 1000)
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Filter by status (detected, investigation, confirmed, resolved, pending)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by case type (exact match)
    #[arg(long)]
    pub case_type: Option<String>,

    /// Case-insensitive text filter
    #[arg(long)]
    pub search: Option<String>,

    /// Minimum amount in MAD
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Maximum amount in MAD
    #[arg(long)]
    pub max_amount: Option<f64>,
}

impl ListArgs {
    fn filter(&self) -> Result<CaseFilter> {
        let mut filter = CaseFilter::default().with_amount_range(self.min_amount, self.max_amount);
        if let Some(status) = &self.status {
            filter = filter.with_status(status.parse::<CaseStatus>()?);
        }
        if let Some(case_type) = &self.case_type {
            filter = filter.with_case_type(case_type.as_str());
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.as_str());
        }
        filter.validate()?;
        Ok(filter)
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Case ID (e.g. DET_001)
    pub id: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term
    pub term: String,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

pub async fn run_cases(args: CasesArgs) -> Result<()> {
    let repository = open_repository(&args)?;

    match &args.command {
        CasesCommands::List(list) => {
            let filter = list.filter()?;
            let page = PageRequest::from_page(list.page, list.limit);
            let answer = repository.list_cases(page, &filter).await;
            emit(args.json, &answer, |cases| print_cases(cases))
        }
        CasesCommands::Show(show) => {
            let answer = repository.get_case_detail(&show.id).await;
            if answer.data.is_none() {
                bail!("case '{}' not found ({} source)", show.id, answer.source);
            }
            emit(args.json, &answer, |detail| {
                if let Some(detail) = detail {
                    print_cases(std::slice::from_ref(&detail.case));
                    println!(
                        "prescriptions: {}  documents: {}  detections: {}  investigations: {}",
                        detail.related.prescriptions.len(),
                        detail.related.documents.len(),
                        detail.related.ai_detections.len(),
                        detail.related.investigations.len(),
                    );
                }
            })
        }
        CasesCommands::Search(search) => {
            let term = search.term.trim();
            if term.is_empty() {
                bail!("search term cannot be empty");
            }
            let answer = repository.search_cases(term, search.limit).await;
            emit(args.json, &answer, |cases| print_cases(cases))
        }
        CasesCommands::Stats => {
            let answer = repository.statistics().await;
            emit(args.json, &answer, |stats| {
                println!("total cases:         {}", stats.total_cases);
                println!("confirmed cases:     {}", stats.confirmed_cases);
                println!("total amount (MAD):  {:.2}", stats.total_amount_mad);
                println!("detection rate:      {}%", stats.detection_rate);
                println!("false positive rate: {}%", stats.false_positive_rate());
                for region in &stats.by_region {
                    println!(
                        "  {:<28} {:>6} cases  {:>14.2} MAD",
                        region.region, region.case_count, region.total_amount
                    );
                }
            })
        }
        CasesCommands::Filters => {
            let answer = repository.filter_options().await;
            emit(args.json, &answer, |options| {
                for (name, facets) in [
                    ("status", &options.status),
                    ("case_type", &options.case_type),
                    ("regions", &options.regions),
                    ("amount_ranges", &options.amount_ranges),
                ] {
                    println!("{name}:");
                    for facet in facets {
                        println!("  {:<28} {:<28} {}", facet.value, facet.label, facet.count);
                    }
                }
            })
        }
    }
}

fn open_repository(args: &CasesArgs) -> Result<CaseRepository> {
    let config = load_config(&args.source)?;
    if args.offline {
        let dataset = config.fallback_dataset().context("Failed to load fallback dataset")?;
        return Ok(CaseRepository::fallback_only(Arc::new(dataset)));
    }
    build_repository(&config).context("Failed to build case repository")
}

fn emit<T: Serialize>(json: bool, answer: &Sourced<T>, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(answer)?);
    } else {
        println!("source: {}", answer.source);
        print(&answer.data);
    }
    Ok(())
}

fn print_cases(cases: &[Case]) {
    for case in cases {
        println!(
            "{:<10} {:<14} {:>14.2} MAD  {}  {}",
            case.id,
            case.status.as_str(),
            case.amount_mad,
            case.detection_date.format("%Y-%m-%d"),
            case.patient_name,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(status: Option<&str>, min: Option<f64>, max: Option<f64>) -> ListArgs {
        ListArgs {
            page: 1,
            limit: 20,
            status: status.map(String::from),
            case_type: None,
            search: None,
            min_amount: min,
            max_amount: max,
        }
    }

    #[test]
    fn status_flag_is_parsed() {
        let filter = list(Some("Confirmed"), None, None).filter().unwrap();
        assert_eq!(filter.status, Some(CaseStatus::Confirmed));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = list(Some("lost"), None, None).filter().unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(list(None, Some(10.0), Some(1.0)).filter().is_err());
    }
}
