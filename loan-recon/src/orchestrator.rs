//! Sequencing of one reconciliation run.
//!
//! Every step that touches the filesystem runs on the blocking pool and is awaited before the
//! next one starts, so a run is strictly sequential while the async caller stays responsive
//! to its event stream.

use crate::config::RunSettings;
use crate::events::EventSink;
use crate::merger::{order_loan_files, DealMerge, LoanFile};
use crate::report::{bundle_archive, BillingReportWriter, LoanReportWriter, OutputPaths};
use extractors::{extract_billing_units, extract_sheet, read_deal_mapping, MonthYear};
use shared_types::{
    CollectionMonth, Deal, LoanFileInput, LoanId, LoanRecord, ReconError, Result, RunEvent,
    RunRequest, RunResult,
};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

const LOAN_PROGRESS_START: f64 = 10.0;
const LOAN_PROGRESS_RANGE: f64 = 60.0;

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ReconError::Task(e.to_string()))?
}

/// Starts a run on the current runtime. The event stream closes when the run finishes.
pub fn spawn_run(
    request: RunRequest,
    settings: RunSettings,
) -> (UnboundedReceiver<RunEvent>, JoinHandle<RunResult>) {
    let (events, receiver) = EventSink::channel();
    let handle = tokio::spawn(async move { run(request, settings, events).await });
    (receiver, handle)
}

/// Runs to completion. Failures are reported in the result, never as a panic or `Err`.
pub async fn run(request: RunRequest, settings: RunSettings, events: EventSink) -> RunResult {
    match execute(request, settings, &events).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("Run failed: {}", err);
            events.log(format!("Error: {}", err));
            RunResult::failed(err)
        }
    }
}

struct ValidatedRequest {
    month: CollectionMonth,
    loan_files: Vec<LoanFileInput>,
    dropped_files: usize,
}

fn validate(request: &RunRequest, settings: &RunSettings) -> Result<ValidatedRequest> {
    if request.loan_files.is_empty() && request.billing_path.is_none() {
        return Err(ReconError::Config(
            "No loan files and no billing file provided.".to_string(),
        ));
    }

    let month = CollectionMonth::parse(&request.collection_month).ok_or_else(|| {
        ReconError::Config(format!(
            "Invalid collection month '{}': expected YYYY-MM",
            request.collection_month
        ))
    })?;

    let kept = request.loan_files.len().min(settings.max_loan_files);
    Ok(ValidatedRequest {
        month,
        loan_files: request.loan_files[..kept].to_vec(),
        dropped_files: request.loan_files.len() - kept,
    })
}

async fn execute(
    request: RunRequest,
    settings: RunSettings,
    events: &EventSink,
) -> Result<RunResult> {
    let validated = validate(&request, &settings)?;
    let month = validated.month;
    if validated.dropped_files > 0 {
        events.log(format!(
            "Only {} loan files are processed per run; ignoring the last {}",
            settings.max_loan_files, validated.dropped_files
        ));
    }

    tracing::info!(
        "Starting reconciliation for {} with {} loan file(s)",
        month,
        validated.loan_files.len()
    );
    events.progress(2.0, "Initializing...");

    tokio::fs::create_dir_all(&request.output_dir).await?;
    let paths = OutputPaths::new(&request.output_dir, month);

    events.progress(5.0, "Reading configuration...");

    let mut deals: Vec<Deal> = Vec::new();
    if let Some(mapping_path) = request.mapping_path.clone() {
        if request.payout_day != 0 {
            events.log("Reading deal mapping file...");
            let payout_day = request.payout_day;
            let mapping = blocking(move || {
                read_deal_mapping(Some(mapping_path.as_path()), month, payout_day)
            })
            .await?;
            for warning in &mapping.warnings {
                events.log(warning.as_str());
            }
            deals = mapping.deals;
            events.progress(8.0, format!("Loaded {} deal(s)", deals.len()));
        }
    }

    let mut result = RunResult {
        success: true,
        deals: deals.len() as u32,
        ..RunResult::default()
    };

    let loan_files = order_loan_files(&validated.loan_files);
    if !loan_files.is_empty() && !deals.is_empty() {
        let out_path = paths.loan_report.clone();
        let sink = events.clone();
        let deals_for_report = deals.clone();
        let rows = blocking(move || {
            build_loan_report(&loan_files, &deals_for_report, &out_path, &sink)
        })
        .await?;

        result.loan_report = Some(paths.loan_report.clone());
        result.loan_rows = rows;
        events.progress(70.0, "Loan report completed");
    }

    if let Some(billing_path) = request.billing_path.clone() {
        events.progress(75.0, "Processing billing units...");
        let allowed: HashSet<LoanId> = deals
            .iter()
            .flat_map(|deal| deal.loan_ids.iter().cloned())
            .collect();
        let out_path = paths.billing_report.clone();
        let sink = events.clone();
        let rows = blocking(move || {
            build_billing_report(&billing_path, &allowed, &out_path, &sink)
        })
        .await?;

        result.billing_report = Some(paths.billing_report.clone());
        result.billing_rows = rows;
        events.progress(85.0, "Billing units completed");
    }

    if let (Some(loan_report), Some(billing_report)) =
        (result.loan_report.clone(), result.billing_report.clone())
    {
        events.progress(90.0, "Creating ZIP archive...");
        events.log(format!("Creating {}_final_report.zip ...", month.file_stem()));

        let archive_path = paths.archive.clone();
        let level = settings.compression_level;
        blocking(move || {
            bundle_archive(
                &archive_path,
                &[loan_report.as_path(), billing_report.as_path()],
                level,
            )
        })
        .await?;

        events.log(format!("ZIP created at: {}", paths.archive.display()));
        events.progress(95.0, "ZIP archive created");
        result.archive = Some(paths.archive.clone());
    }

    tracing::info!(
        "Reconciliation finished: {} deal(s), {} loan row(s), {} billing row(s)",
        result.deals,
        result.loan_rows,
        result.billing_rows
    );
    events.log("Done ✅");
    events.progress(100.0, "Processing complete!");
    Ok(result)
}

/// Writes every deal's records to the loan report, deal by deal. Returns the row count.
fn build_loan_report(
    files: &[LoanFile],
    deals: &[Deal],
    out_path: &Path,
    events: &EventSink,
) -> Result<u32> {
    events.log("Generating loan_report.csv ...");
    events.progress(LOAN_PROGRESS_START, "Starting loan report generation");

    let mut writer = LoanReportWriter::create(out_path)?;
    let per_deal = LOAN_PROGRESS_RANGE / deals.len() as f64;

    for (index, deal) in deals.iter().enumerate() {
        let start = LOAN_PROGRESS_START + index as f64 * per_deal;
        for record in reconcile_deal(files, deal, events, start, per_deal)? {
            writer.write(&record)?;
        }
    }

    let rows = writer.finish()?;
    events.log(format!("Loan report written to: {}", out_path.display()));
    Ok(rows)
}

/// Seeds the deal, merges every file in order and returns the derived records.
fn reconcile_deal(
    files: &[LoanFile],
    deal: &Deal,
    events: &EventSink,
    progress_start: f64,
    progress_range: f64,
) -> Result<Vec<LoanRecord>> {
    let mut merge = DealMerge::seed(deal);
    let wanted: HashSet<LoanId> = deal.loan_ids.iter().cloned().collect();
    let month = MonthYear::new(deal.collection_month);

    events.log(format!(
        "Processing deal: {} ({} LANs)",
        deal.name,
        deal.loan_ids.len()
    ));

    let total = files.len() as f64;
    for (index, file) in files.iter().enumerate() {
        let file_start = progress_start + progress_range * index as f64 / total;
        let file_end = progress_start + progress_range * (index + 1) as f64 / total;

        events.progress(
            file_start,
            format!("Processing {}: {}", deal.name, file.declared_type),
        );
        events.log(format!(
            "  Processing: {} [{}]",
            file.file_name(),
            file.declared_type
        ));

        match file.sheet_type {
            Some(sheet_type) => {
                let extraction =
                    extract_sheet(&file.path, sheet_type, &wanted, &month, |sheet_name| {
                        events.log(format!("Processing \"{}\" as \"{}\"", sheet_name, sheet_type))
                    })?;
                let updated = merge.merge(&extraction.records);
                tracing::debug!(
                    "{}: {} of {} loan(s) updated from {}",
                    deal.name,
                    updated,
                    merge.len(),
                    file.file_name()
                );
            }
            None => {
                tracing::warn!("Unknown sheet type {:?} for {:?}", file.declared_type, file.path);
                events.log(format!(
                    "Unknown sheet type: {}, skipping file",
                    file.declared_type
                ));
            }
        }

        events.progress(
            file_end,
            format!("Completed {} for {}", file.declared_type, deal.name),
        );
    }

    Ok(merge.finalize())
}

/// Writes the billing units report. Returns the row count.
fn build_billing_report(
    billing_path: &Path,
    allowed: &HashSet<LoanId>,
    out_path: &Path,
    events: &EventSink,
) -> Result<u32> {
    events.log("Generating billing_units.csv ...");

    let mut writer = BillingReportWriter::create(out_path)?;
    let summary = extract_billing_units(billing_path, allowed, |row| writer.write(&row))?;
    let rows = writer.finish()?;

    tracing::debug!(
        "Billing sheet \"{}\": {} month group(s), {} row(s) read",
        summary.sheet_name,
        summary.month_groups,
        summary.rows_read
    );
    events.log(format!("Billing units report written to: {}", out_path.display()));
    Ok(rows)
}
