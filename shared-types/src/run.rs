use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ts_rs::TS;

/// A loan extract and the sheet type the user declared for it.
///
/// The sheet type stays free text so that an unknown declaration can be reported and skipped
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoanFileInput {
    #[ts(type = "string")]
    pub file_path: PathBuf,
    pub sheet_type: String,
}

/// Everything one end-to-end run needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    #[serde(default)]
    #[ts(type = "string | null")]
    pub mapping_path: Option<PathBuf>,
    #[serde(default)]
    pub loan_files: Vec<LoanFileInput>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub billing_path: Option<PathBuf>,
    /// `YYYY-MM`
    pub collection_month: String,
    pub payout_day: u32,
    #[ts(type = "string")]
    pub output_dir: PathBuf,
}

/// Progress and log events streamed to the driver while a run executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RunEvent {
    Log {
        message: String,
    },
    Progress {
        value: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
}

/// Outcome of a run. On failure only `error` carries detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub error: Option<String>,
    #[ts(type = "string | null")]
    pub loan_report: Option<PathBuf>,
    #[ts(type = "string | null")]
    pub billing_report: Option<PathBuf>,
    #[ts(type = "string | null")]
    pub archive: Option<PathBuf>,
    pub deals: u32,
    pub loan_rows: u32,
    pub billing_rows: u32,
}

impl RunResult {
    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_event_serialization() {
        let log = RunEvent::Log {
            message: "Reading deal mapping file...".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&log).unwrap(),
            r#"{"kind":"log","message":"Reading deal mapping file..."}"#
        );

        let progress = RunEvent::Progress {
            value: 8,
            status: Some("Loaded 2 deal(s)".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&progress).unwrap(),
            r#"{"kind":"progress","value":8,"status":"Loaded 2 deal(s)"}"#
        );

        let bare = RunEvent::Progress {
            value: 100,
            status: None,
        };
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"{"kind":"progress","value":100}"#
        );
    }

    #[test]
    fn test_run_request_from_ui_payload() {
        let payload = r#"{
            "mappingPath": "/data/mapping.xlsx",
            "loanFiles": [{"filePath": "/data/closing.xlsx", "sheetType": "Closing Loan Dump"}],
            "collectionMonth": "2024-01",
            "payoutDay": 10,
            "outputDir": "/data/out"
        }"#;

        let request: RunRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.mapping_path, Some(PathBuf::from("/data/mapping.xlsx")));
        assert_eq!(request.loan_files.len(), 1);
        assert_eq!(request.loan_files[0].sheet_type, "Closing Loan Dump");
        assert!(request.billing_path.is_none());
        assert_eq!(request.payout_day, 10);
    }

    #[test]
    fn test_failed_result() {
        let result = RunResult::failed("No loan files and no billing file provided.");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("No loan files and no billing file provided.")
        );
        assert!(result.archive.is_none());
    }
}
