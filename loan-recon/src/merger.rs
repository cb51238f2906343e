//! Per-deal loan record assembly: seed, merge partial records, derive.

use extractors::{format_month_label, next_period_date, PartialRecord};
use shared_types::{Deal, LoanFileInput, LoanId, LoanRecord, LoanStatus, SheetType, StandardField};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// A loan file with its declared type resolved. Unknown types stay `None` and are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanFile {
    pub path: PathBuf,
    pub declared_type: String,
    pub sheet_type: Option<SheetType>,
}

impl From<&LoanFileInput> for LoanFile {
    fn from(input: &LoanFileInput) -> Self {
        Self {
            path: input.file_path.clone(),
            declared_type: input.sheet_type.clone(),
            sheet_type: SheetType::from_label(&input.sheet_type),
        }
    }
}

impl LoanFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Loan files in processing order: preferred sheet-type order, unknown types last, ties kept
/// in input order.
pub fn order_loan_files(inputs: &[LoanFileInput]) -> Vec<LoanFile> {
    let mut files: Vec<LoanFile> = inputs.iter().map(LoanFile::from).collect();
    files.sort_by_key(|file| {
        file.sheet_type
            .map(|sheet_type| sheet_type.preferred_rank())
            .unwrap_or(usize::MAX)
    });
    files
}

/// The records of one deal while its files are merged in.
#[derive(Debug, Clone)]
pub struct DealMerge {
    records: Vec<(LoanId, LoanRecord)>,
    index: HashMap<LoanId, usize>,
}

impl DealMerge {
    /// One defaulted record per member loan, in membership order.
    pub fn seed(deal: &Deal) -> Self {
        let collection_month = format_month_label(deal.collection_month);
        let payout_date = next_period_date(deal.collection_month, deal.payout_day);

        let mut records = Vec::with_capacity(deal.loan_ids.len());
        let mut index = HashMap::with_capacity(deal.loan_ids.len());

        for loan_id in &deal.loan_ids {
            if index.contains_key(loan_id) {
                continue;
            }
            let mut record = LoanRecord::blank();
            record.set(StandardField::DealName, deal.name.as_str());
            record.set(StandardField::LanNo, loan_id.as_str());
            record.set(StandardField::CustomerId, loan_id.as_str());
            record.set(StandardField::CollectionMonth, collection_month.as_str());
            record.set(StandardField::CurrentPayoutDate, payout_date.as_str());

            index.insert(loan_id.clone(), records.len());
            records.push((loan_id.clone(), record));
        }

        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Overwrites seeded records with every field a sheet touched. Loans outside the deal
    /// are ignored. Returns how many records were updated.
    pub fn merge(&mut self, partials: &BTreeMap<LoanId, PartialRecord>) -> usize {
        let mut updated = 0;
        for (loan_id, partial) in partials {
            let Some(position) = self.index.get(loan_id) else {
                continue;
            };
            let record = &mut self.records[*position].1;
            for (field, value) in partial {
                record.set(*field, value.clone());
            }
            updated += 1;
        }
        updated
    }

    /// Runs the derivation pass and yields the final records in seed order.
    pub fn finalize(self) -> Vec<LoanRecord> {
        self.records
            .into_iter()
            .map(|(_, mut record)| {
                derive_fields(&mut record);
                record
            })
            .collect()
    }
}

pub fn customer_collections(record: &LoanRecord) -> f64 {
    record.number(StandardField::OpeningPrincipalOverdue)
        + record.number(StandardField::OpeningInterestOverdue)
        + record.number(StandardField::BillingPrincipal)
        + record.number(StandardField::BillingInterest)
        - record.number(StandardField::InputClosingPrincipalOverdue)
        - record.number(StandardField::InputClosingInterestOverdue)
        + record.number(StandardField::BillingPrepayment)
}

/// Status implied by the closing position, if any. `None` keeps the current status.
pub fn classify_status(record: &LoanRecord) -> Option<LoanStatus> {
    let opening = record.number(StandardField::OpeningPrincipal);
    let prepayment = record.number(StandardField::Prepayment);
    let collections = record.number(StandardField::CustomerCollections);
    let closing = record.number(StandardField::ClosingPrincipal);

    if closing == 0.0 && opening == prepayment + collections {
        Some(LoanStatus::Prepayment)
    } else if closing == 0.0 && collections < opening {
        Some(LoanStatus::WrittenOff)
    } else {
        None
    }
}

pub fn derive_fields(record: &mut LoanRecord) {
    let collections = customer_collections(record);
    record.set(StandardField::CustomerCollections, collections);

    if let Some(status) = classify_status(record) {
        record.set(StandardField::Status, status.label());
    }
}
