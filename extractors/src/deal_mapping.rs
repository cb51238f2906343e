//! Deal to loan mapping reader.

use crate::header_resolver::{find_column, HeaderPredicate, HeaderRule, Selection};
use crate::normalize::normalize_identifier;
use crate::workbook::{stream_first_sheet, CellValue};
use shared_types::{CollectionMonth, Deal, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MappingColumn {
    LoanId,
    DealName,
}

impl MappingColumn {
    fn label(&self) -> &'static str {
        match self {
            MappingColumn::LoanId => "loan number",
            MappingColumn::DealName => "deal name",
        }
    }
}

const MAPPING_COLUMNS: [HeaderRule<MappingColumn>; 2] = [
    HeaderRule {
        target: MappingColumn::LoanId,
        predicates: &[
            HeaderPredicate::EqualsIgnoreCase("lanno"),
            HeaderPredicate::EqualsIgnoreCase("lan"),
            HeaderPredicate::ContainsIgnoreCase("loan"),
        ],
    },
    HeaderRule {
        target: MappingColumn::DealName,
        predicates: &[
            HeaderPredicate::EqualsIgnoreCase("dealname"),
            HeaderPredicate::ContainsIgnoreCase("deal"),
        ],
    },
];

/// Deals read from the mapping file plus anything worth telling the user.
#[derive(Debug, Default)]
pub struct DealMapping {
    pub deals: Vec<Deal>,
    pub warnings: Vec<String>,
}

struct MappingLayout {
    loan_column: usize,
    deal_column: usize,
}

struct DealMappingBuilder {
    collection_month: CollectionMonth,
    payout_day: u32,
    layout: Option<MappingLayout>,
    header_seen: bool,
    deals: Vec<Deal>,
    by_name: HashMap<String, usize>,
    warnings: Vec<String>,
}

impl DealMappingBuilder {
    fn new(collection_month: CollectionMonth, payout_day: u32) -> Self {
        Self {
            collection_month,
            payout_day,
            layout: None,
            header_seen: false,
            deals: Vec::new(),
            by_name: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    fn push_row(&mut self, cells: Vec<CellValue>) {
        if !self.header_seen {
            self.header_seen = true;
            self.layout = self.resolve_layout(&cells);
            return;
        }
        let Some(layout) = &self.layout else {
            return;
        };

        let loan_id = cells.get(layout.loan_column).and_then(normalize_identifier);
        let deal_name = cells
            .get(layout.deal_column)
            .map(CellValue::label)
            .filter(|name| !name.is_empty());
        let (Some(loan_id), Some(deal_name)) = (loan_id, deal_name) else {
            return;
        };

        let index = match self.by_name.get(&deal_name) {
            Some(index) => *index,
            None => {
                self.deals.push(Deal::new(
                    deal_name.clone(),
                    self.collection_month,
                    self.payout_day,
                ));
                self.by_name.insert(deal_name, self.deals.len() - 1);
                self.deals.len() - 1
            }
        };
        self.deals[index].add_loan(loan_id);
    }

    fn resolve_layout(&mut self, cells: &[CellValue]) -> Option<MappingLayout> {
        let labels: Vec<String> = cells.iter().map(CellValue::label).collect();
        let mut missing = Vec::new();

        let mut locate = |column: MappingColumn| {
            let found = find_column(&MAPPING_COLUMNS, &column, &labels, Selection::FirstMatch);
            if found.is_none() {
                missing.push(column.label());
            }
            found
        };
        let loan_column = locate(MappingColumn::LoanId);
        let deal_column = locate(MappingColumn::DealName);

        for column in missing {
            let message = format!("Mapping file has no {} column; no deals loaded", column);
            warn!("{}", message);
            self.warnings.push(message);
        }

        Some(MappingLayout {
            loan_column: loan_column?,
            deal_column: deal_column?,
        })
    }

    fn finish(self) -> DealMapping {
        DealMapping {
            deals: self.deals,
            warnings: self.warnings,
        }
    }
}

/// Reads the first sheet of the mapping file into deals, in first-appearance order.
///
/// No path means no deals.
pub fn read_deal_mapping(
    path: Option<&Path>,
    collection_month: CollectionMonth,
    payout_day: u32,
) -> Result<DealMapping> {
    let Some(path) = path else {
        return Ok(DealMapping::default());
    };

    let mut builder = DealMappingBuilder::new(collection_month, payout_day);
    stream_first_sheet(path, |row| {
        builder.push_row(row);
        Ok(())
    })?;
    let mapping = builder.finish();

    debug!("Read {} deal(s) from {:?}", mapping.deals.len(), path);
    Ok(mapping)
}
