//! Shared Types Crate
//!
//! Domain model of a loan portfolio reconciliation run: deals and loan identifiers, the
//! canonical loan record, billing rows, and the request/event/result types exchanged with
//! whatever drives a run (the CLI, or a desktop UI through the generated TypeScript types).

pub mod billing;
pub mod deal;
pub mod error;
pub mod loan_record;
pub mod run;
pub mod sheet_type;

pub use billing::BillingRow;
pub use deal::{CollectionMonth, Deal, LoanId};
pub use error::{ReconError, Result};
pub use loan_record::{number_from_text, FieldValue, LoanRecord, LoanStatus, StandardField};
pub use run::{LoanFileInput, RunEvent, RunRequest, RunResult};
pub use sheet_type::SheetType;
