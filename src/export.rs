use std::future::Future;
use std::path::Path;

use anyhow::Result;

use crate::db::{BackofficeDb, QueryResult};

/// The ten BuyPy base tables the bulk export covers. A literal list: the
/// back-office exports these whether or not the schema grows.
pub const EXPORT_TABLES: [&str; 10] = [
    "Cliente",
    "Produto",
    "Livro",
    "Autor",
    "LivroAutor",
    "ConsumivelEletronica",
    "Encomenda",
    "ItemEncomenda",
    "Recomendacao",
    "Operador",
];

/// Outcome of one export run. Failures are recorded by table name only; the
/// aggregate dialog names them and the rest of the run is unaffected.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub exported: Vec<String>,
    pub failed: Vec<String>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_success() {
            format!("All {} tables exported to CSV.", self.exported.len())
        } else {
            format!("Export failed for: {}", self.failed.join(", "))
        }
    }
}

/// File name for a table's dump: the table name lowercased, `.csv` appended.
pub fn csv_file_name(table: &str) -> String {
    format!("{}.csv", table.to_lowercase())
}

/// Writes one table dump as UTF-8 CSV: header row of column names, then one
/// record per row. NULL cells become empty fields. Overwrites any existing
/// file at `path`.
pub fn write_csv(dump: &QueryResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&dump.columns)?;
    for row in &dump.rows {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

/// Dumps every table in [`EXPORT_TABLES`] to a CSV file in `dir`. A table
/// that cannot be read or written is recorded by name and the loop moves on;
/// there is no transactional guarantee across the files.
pub async fn export_all_tables(db: &BackofficeDb, dir: &Path) -> ExportReport {
    export_tables_with(|table| db.dump_table(table), dir).await
}

/// The export loop itself, over any dump operation.
pub async fn export_tables_with<F, Fut>(dump: F, dir: &Path) -> ExportReport
where
    F: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<QueryResult>>,
{
    let mut report = ExportReport::default();

    for table in EXPORT_TABLES {
        let outcome = match dump(table).await {
            Ok(dump) => write_csv(&dump, &dir.join(csv_file_name(table))),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => report.exported.push(table.to_string()),
            Err(_) => report.failed.push(table.to_string()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("buypy-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn dump(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> QueryResult {
        QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    #[test]
    fn export_list_has_ten_tables() {
        assert_eq!(EXPORT_TABLES.len(), 10);
    }

    #[test]
    fn file_name_is_lowercased_table_name() {
        assert_eq!(csv_file_name("LivroAutor"), "livroautor.csv");
        assert_eq!(csv_file_name("Cliente"), "cliente.csv");
    }

    #[test]
    fn csv_has_header_then_rows() {
        let path = temp_path("books.csv");
        let dump = dump(
            &["id", "title"],
            vec![
                vec![Some("1"), Some("Os Maias")],
                vec![Some("2"), Some("Ensaio sobre a Cegueira")],
            ],
        );

        write_csv(&dump, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,title");
        assert_eq!(lines[1], "1,Os Maias");
        assert_eq!(lines[2], "2,Ensaio sobre a Cegueira");
    }

    #[test]
    fn csv_quotes_embedded_delimiters() {
        let path = temp_path("quoting.csv");
        let dump = dump(
            &["id", "notes"],
            vec![vec![Some("1"), Some("comma, inside")]],
        );

        write_csv(&dump, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"comma, inside\""));
    }

    #[test]
    fn csv_writes_null_as_empty_field() {
        let path = temp_path("nulls.csv");
        let dump = dump(&["id", "vat"], vec![vec![Some("7"), None]]);

        write_csv(&dump, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().nth(1), Some("7,"));
    }

    #[test]
    fn csv_overwrites_existing_file() {
        let path = temp_path("overwrite.csv");
        fs::write(&path, "stale contents\n").unwrap();

        let dump = dump(&["id"], vec![vec![Some("1")]]);
        write_csv(&dump, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().next(), Some("id"));
    }

    #[tokio::test]
    async fn one_unreadable_table_does_not_abort_the_rest() {
        let dir = std::env::temp_dir().join(format!("buypy-export-run-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let report = export_tables_with(
            |table| {
                let result = if table == "Livro" {
                    Err(anyhow::anyhow!("table Livro does not exist"))
                } else {
                    Ok(dump(&["id"], vec![vec![Some("1")]]))
                };
                async move { result }
            },
            &dir,
        )
        .await;

        assert_eq!(report.failed, vec!["Livro".to_string()]);
        assert_eq!(report.exported.len(), 9);
        assert!(!report.is_success());

        assert!(!dir.join("livro.csv").exists());
        for table in EXPORT_TABLES.iter().filter(|t| **t != "Livro") {
            assert!(dir.join(csv_file_name(table)).exists());
        }
    }

    #[test]
    fn summary_reports_success_with_count() {
        let report = ExportReport {
            exported: EXPORT_TABLES.iter().map(|t| t.to_string()).collect(),
            failed: vec![],
        };
        assert!(report.is_success());
        assert_eq!(report.summary(), "All 10 tables exported to CSV.");
    }

    #[test]
    fn summary_names_failed_tables() {
        let report = ExportReport {
            exported: vec!["Cliente".to_string()],
            failed: vec!["Livro".to_string(), "Autor".to_string()],
        };
        assert!(!report.is_success());
        assert_eq!(report.summary(), "Export failed for: Livro, Autor");
    }
}
