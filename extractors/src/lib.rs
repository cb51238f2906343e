//! Extractors Crate
//!
//! Readers that turn loan-servicing spreadsheets into the reconciliation's domain data. Each
//! input is streamed row by row from its first worksheet; nothing here holds a whole sheet in
//! memory or fails on a malformed cell.
//!
//! # Architecture
//!
//! - **Types**: Deals, loan records and billing rows are defined in the `shared-types` crate
//! - **Row source**: [`workbook`] streams `.xlsx`, legacy workbooks and `.csv` files
//! - **Implementations**: the mapping, loan-extract and billing readers live in this crate
//!
//! # Available Extractors
//!
//! - [`read_deal_mapping`]: groups the mapping file's loans into deals
//! - [`extract_sheet`]: partial loan records from one of the seven loan-extract sheet types
//! - [`extract_billing_units`]: per (loan, month) billing rows from the billing extract
//!
//! # Example
//!
//! ```rust,ignore
//! use extractors::{extract_sheet, MonthYear};
//! use shared_types::{CollectionMonth, SheetType};
//!
//! let month = MonthYear::new(CollectionMonth::parse("2024-03").unwrap());
//! let extraction = extract_sheet(path, SheetType::Emi, &loan_ids, &month, |sheet| {
//!     println!("Reading {}", sheet);
//! })?;
//! ```

pub mod billing_units;
pub mod deal_mapping;
pub mod header_resolver;
pub mod normalize;
pub mod sheet_config;
pub mod sheet_extractor;
pub mod workbook;

// Re-export commonly used types
pub use billing_units::{extract_billing_units, BillingSummary};
pub use deal_mapping::{read_deal_mapping, DealMapping};
pub use normalize::{format_month_label, next_period_date, to_number, MonthYear};
pub use sheet_extractor::{extract_sheet, PartialRecord, SheetExtraction};
pub use workbook::CellValue;
