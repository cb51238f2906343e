//! Declarative configuration of the seven loan-extract sheet types.

use crate::header_resolver::{HeaderPredicate, HeaderRule, MonthColumn, MonthFieldRule, RowView};
use crate::normalize::{date_serial_to_dmy, number_to_percent_label, to_number};
use shared_types::{FieldValue, SheetType, StandardField};

/// Derives one record field from the current row only.
pub type ComputeFn = fn(&RowView<'_>) -> FieldValue;

#[derive(Clone, Copy)]
pub struct ComputedRule {
    pub field: StandardField,
    pub compute: ComputeFn,
}

pub struct SheetConfig {
    pub sheet_type: SheetType,
    /// Header of the column carrying the loan number.
    pub key_column: &'static str,
    pub renames: &'static [HeaderRule<StandardField>],
    pub month_fields: &'static [MonthFieldRule],
    /// Applied in order, after the renamed columns.
    pub computed: &'static [ComputedRule],
}

impl SheetConfig {
    pub fn for_sheet_type(sheet_type: SheetType) -> &'static SheetConfig {
        match sheet_type {
            SheetType::ClosingLoanDump => &CLOSING_LOAN_DUMP,
            SheetType::OpeningLoanDump => &OPENING_LOAN_DUMP,
            SheetType::Emi => &EMI,
            SheetType::OpeDueList => &OPE_DUE_LIST,
            SheetType::PartPayment => &PART_PAYMENT,
            SheetType::EffectiveClosureDate => &EFFECTIVE_CLOSURE_DATE,
            SheetType::EarlyClosure => &EARLY_CLOSURE,
        }
    }
}

fn overdue_total(row: &RowView<'_>) -> FieldValue {
    FieldValue::Number(to_number(row.get("Overdue POS")) + to_number(row.get("Overdue Interest")))
}

fn customer_billing(row: &RowView<'_>) -> FieldValue {
    FieldValue::Number(
        to_number(row.month_value(MonthColumn::Principal))
            + to_number(row.month_value(MonthColumn::Interest)),
    )
}

fn instalment_due_date(row: &RowView<'_>) -> FieldValue {
    FieldValue::Text(date_serial_to_dmy(row.get("CURRENT_MONTH_INSTLAMENT_DUE_DATE")))
}

fn effective_rate(row: &RowView<'_>) -> FieldValue {
    FieldValue::Text(number_to_percent_label(row.get("LOAN EFF RATE")))
}

fn early_closure_date(row: &RowView<'_>) -> FieldValue {
    FieldValue::Text(date_serial_to_dmy(row.get("Early Closure Date")))
}

fn author_date(row: &RowView<'_>) -> FieldValue {
    FieldValue::Text(date_serial_to_dmy(row.get("Author Date")))
}

static CLOSING_LOAN_DUMP: SheetConfig = SheetConfig {
    sheet_type: SheetType::ClosingLoanDump,
    key_column: "Loan Number",
    renames: &[
        HeaderRule {
            target: StandardField::DpdDays,
            predicates: &[HeaderPredicate::Exact("DPD")],
        },
        HeaderRule {
            target: StandardField::ClosingPrincipal,
            predicates: &[HeaderPredicate::Exact("Total POS")],
        },
        HeaderRule {
            target: StandardField::InputClosingPrincipalOverdue,
            predicates: &[HeaderPredicate::Exact("Overdue POS")],
        },
        HeaderRule {
            target: StandardField::InputClosingInterestOverdue,
            predicates: &[HeaderPredicate::Exact("Overdue Interest")],
        },
    ],
    month_fields: &[],
    computed: &[ComputedRule {
        field: StandardField::InputClosingOverdue,
        compute: overdue_total,
    }],
};

static OPENING_LOAN_DUMP: SheetConfig = SheetConfig {
    sheet_type: SheetType::OpeningLoanDump,
    key_column: "Loan Number",
    renames: &[
        HeaderRule {
            target: StandardField::OpeningPrincipal,
            predicates: &[HeaderPredicate::Exact("Total POS")],
        },
        HeaderRule {
            target: StandardField::OpeningPrincipalOverdue,
            predicates: &[HeaderPredicate::Exact("Overdue POS")],
        },
        HeaderRule {
            target: StandardField::OpeningInterestOverdue,
            predicates: &[HeaderPredicate::Exact("Overdue Interest")],
        },
    ],
    month_fields: &[],
    computed: &[ComputedRule {
        field: StandardField::OpeningOverdue,
        compute: overdue_total,
    }],
};

static EMI: SheetConfig = SheetConfig {
    sheet_type: SheetType::Emi,
    key_column: "loan_no",
    renames: &[],
    month_fields: &[
        MonthFieldRule {
            column: MonthColumn::Principal,
            field: StandardField::BillingPrincipal,
        },
        MonthFieldRule {
            column: MonthColumn::Interest,
            field: StandardField::BillingInterest,
        },
    ],
    computed: &[ComputedRule {
        field: StandardField::CustomerBilling,
        compute: customer_billing,
    }],
};

static OPE_DUE_LIST: SheetConfig = SheetConfig {
    sheet_type: SheetType::OpeDueList,
    key_column: "LOAN_NO",
    renames: &[],
    month_fields: &[],
    computed: &[
        ComputedRule {
            field: StandardField::CurrentPayoutDate,
            compute: instalment_due_date,
        },
        ComputedRule {
            field: StandardField::CustomerRoi,
            compute: effective_rate,
        },
    ],
};

static PART_PAYMENT: SheetConfig = SheetConfig {
    sheet_type: SheetType::PartPayment,
    key_column: "LOAN NO",
    renames: &[HeaderRule {
        target: StandardField::BillingPrepayment,
        predicates: &[HeaderPredicate::Exact("PREPAYMENT AMOUNT")],
    }],
    month_fields: &[],
    computed: &[ComputedRule {
        field: StandardField::CurrentPayoutDate,
        compute: early_closure_date,
    }],
};

static EFFECTIVE_CLOSURE_DATE: SheetConfig = SheetConfig {
    sheet_type: SheetType::EffectiveClosureDate,
    key_column: "Loan Number",
    renames: &[],
    month_fields: &[],
    computed: &[ComputedRule {
        field: StandardField::CurrentPayoutDate,
        compute: early_closure_date,
    }],
};

static EARLY_CLOSURE: SheetConfig = SheetConfig {
    sheet_type: SheetType::EarlyClosure,
    key_column: "Loan Number",
    renames: &[],
    month_fields: &[],
    computed: &[ComputedRule {
        field: StandardField::CurrentPayoutDate,
        compute: author_date,
    }],
};
