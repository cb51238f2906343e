//! Report files of a run: the loan report, the billing units report and their archive.

use shared_types::{BillingRow, CollectionMonth, LoanRecord, ReconError, Result, StandardField};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn csv_error(err: csv::Error) -> ReconError {
    ReconError::Csv(err.to_string())
}

fn archive_error(err: zip::result::ZipError) -> ReconError {
    ReconError::Archive(err.to_string())
}

/// Where a run writes its outputs, named after the collection month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub loan_report: PathBuf,
    pub billing_report: PathBuf,
    pub archive: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, month: CollectionMonth) -> Self {
        let stem = month.file_stem();
        Self {
            loan_report: output_dir.join(format!("{}_loan_report.csv", stem)),
            billing_report: output_dir.join(format!("{}_billing_units.csv", stem)),
            archive: output_dir.join(format!("{}_final_report.zip", stem)),
        }
    }
}

/// Streams loan records into the loan report, header first.
pub struct LoanReportWriter {
    writer: csv::Writer<File>,
    rows: u32,
}

impl LoanReportWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
        writer
            .write_record(StandardField::headers())
            .map_err(csv_error)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write(&mut self, record: &LoanRecord) -> Result<()> {
        self.writer.write_record(record.to_row()).map_err(csv_error)?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes and returns the number of data rows written.
    pub fn finish(mut self) -> Result<u32> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

/// Streams billing rows into the billing units report, header first.
pub struct BillingReportWriter {
    writer: csv::Writer<File>,
    rows: u32,
}

impl BillingReportWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
        writer
            .write_record(BillingRow::HEADERS)
            .map_err(csv_error)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write(&mut self, row: &BillingRow) -> Result<()> {
        self.writer.write_record(row.to_row()).map_err(csv_error)?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<u32> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

/// Writes `files` into a deflate-compressed zip at `archive_path`, each under its file name.
pub fn bundle_archive(archive_path: &Path, files: &[&Path], compression_level: i64) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level));

    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ReconError::Archive(format!("{:?} has no file name", path)))?;

        zip.start_file(name, options).map_err(archive_error)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut zip)?;
    }

    let mut file = zip.finish().map_err(archive_error)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::LoanId;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new(Path::new("/out"), CollectionMonth::parse("2024-03").unwrap());
        assert_eq!(paths.loan_report, PathBuf::from("/out/2024_03_loan_report.csv"));
        assert_eq!(paths.billing_report, PathBuf::from("/out/2024_03_billing_units.csv"));
        assert_eq!(paths.archive, PathBuf::from("/out/2024_03_final_report.zip"));
    }

    #[test]
    fn test_loan_report_writer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loans.csv");

        let mut writer = LoanReportWriter::create(&path).unwrap();
        let mut record = LoanRecord::blank();
        record.set(StandardField::DealName, "Deal, One");
        record.set(StandardField::LanNo, "A1");
        writer.write(&record).unwrap();
        assert_eq!(writer.finish().unwrap(), 1);

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Deal Name,lanNo,Customer ID,Collection Month"));
        assert!(header.ends_with("Legal Action taken by the company,Status"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Deal, One\",A1,,"));
        assert!(row.ends_with(",0,,Active"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_billing_report_writer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("billing.csv");

        let mut writer = BillingReportWriter::create(&path).unwrap();
        writer
            .write(&BillingRow {
                loan_id: LoanId::new("A1").unwrap(),
                month_label: "Mar-2024".to_string(),
                principal_billing: 1000.0,
                interest_billing: 12.5,
            })
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 1);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Customer,Month,PrincipalBilling,InterestBilling\nA1,Mar-2024,1000,12.5\n"
        );
    }

    #[test]
    fn test_bundle_archive() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::write(&first, "x,y\n1,2\n").unwrap();
        fs::write(&second, "z\n").unwrap();
        let archive_path = dir.path().join("bundle.zip");

        bundle_archive(&archive_path, &[first.as_path(), second.as_path()], 9).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut contents = String::new();
        archive
            .by_name("a.csv")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "x,y\n1,2\n");
        assert!(archive.by_name("b.csv").is_ok());
    }

    #[test]
    fn test_bundle_archive_missing_input() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");
        let result = bundle_archive(&dir.path().join("bundle.zip"), &[missing.as_path()], 9);
        assert!(matches!(result, Err(ReconError::Io(_))));
    }
}
