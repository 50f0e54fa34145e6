use crate::model::JobRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Header row, in column order. Matches the serde names on [`JobRecord`].
pub const COLUMNS: [&str; 6] = [
    "Titulo",
    "Empresa",
    "Detalle",
    "Ubicacion",
    "Modo de Trabajo",
    "Enlace",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes records as UTF-8 CSV with a header row.
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    utf8_bom: bool,
}

impl CsvExporter {
    pub fn new(utf8_bom: bool) -> Self {
        Self { utf8_bom }
    }

    pub fn write_to<W: Write>(&self, mut out: W, records: &[JobRecord]) -> Result<(), ExportError> {
        if self.utf8_bom {
            out.write_all(UTF8_BOM)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Create (or truncate) `path` and write every record to it.
    pub fn write_file(&self, path: &Path, records: &[JobRecord]) -> Result<(), ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(BufWriter::new(file), records)?;
        info!(
            target: "crawl.export",
            path = %path.display(),
            rows = records.len(),
            "records exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NOT_AVAILABLE;

    fn record(title: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: "Acme, S.A.".to_string(),
            detail: "Turno \"mañana\"".to_string(),
            location: "Mendoza".to_string(),
            work_mode: NOT_AVAILABLE.to_string(),
            link: "https://www.zonajobs.com.ar/empleos/1.html".to_string(),
        }
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let mut out = Vec::new();
        CsvExporter::new(false)
            .write_to(&mut out, &[record("Chofer"), record("Cajero")])
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Titulo,Empresa,Detalle,Ubicacion,Modo de Trabajo,Enlace"
        );
        assert_eq!(
            lines[1],
            r#"Chofer,"Acme, S.A.","Turno ""mañana""",Mendoza,N/A,https://www.zonajobs.com.ar/empleos/1.html"#
        );
        assert!(lines[2].starts_with("Cajero,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn bom_prefixes_output() {
        let mut out = Vec::new();
        CsvExporter::new(true).write_to(&mut out, &[]).unwrap();
        assert!(out.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&out[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn write_file_roundtrips_through_csv_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        CsvExporter::new(false)
            .write_file(&path, &[record("Chofer")])
            .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());
        let rows: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Acme, S.A.");
    }

    #[test]
    fn unwritable_path_reports_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("jobs.csv");
        let err = CsvExporter::new(true).write_file(&path, &[]).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
    }
}
