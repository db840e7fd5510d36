use crate::config::toml_config::OUTPUT_FORMATS;
use crate::utils::error::{ClientError, Result};
use crate::utils::table::{render_records, Tabular};
use crate::utils::validation::validate_one_of;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        validate_one_of("output.format", raw, OUTPUT_FORMATS)?;
        Ok(match raw {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        })
    }
}

fn to_csv(headers: Vec<&str>, rows: Vec<Vec<String>>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ClientError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ClientError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn render_list<T: Tabular + Serialize>(
    records: &[T],
    format: OutputFormat,
    width: usize,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => to_csv(
            T::columns().iter().map(|c| c.header).collect(),
            records.iter().map(Tabular::cells).collect(),
        ),
        OutputFormat::Table if records.is_empty() => Ok("Kayıt bulunamadı.".to_string()),
        OutputFormat::Table => Ok(format!(
            "{}\n({} kayıt)",
            render_records(records, width),
            records.len()
        )),
    }
}

/// Single record: vertical `Header: value` layout for tables.
pub fn render_one<T: Tabular + Serialize>(
    record: &T,
    format: OutputFormat,
    width: usize,
) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let columns = T::columns();
            let label_width = columns
                .iter()
                .map(|c| c.header.chars().count())
                .max()
                .unwrap_or(0);
            Ok(columns
                .iter()
                .zip(record.cells())
                .map(|(column, value)| {
                    let pad = label_width - column.header.chars().count();
                    format!("{}{} : {}", column.header, " ".repeat(pad), value)
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
        _ => render_list(std::slice::from_ref(record), format, width),
    }
}

pub fn notify_success(message: &str) {
    println!("✅ {}", message);
}

pub fn notify_error(err: &ClientError) {
    eprintln!("❌ {}", err.user_friendly_message());
    eprintln!("💡 {}", err.recovery_suggestion());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Parca;

    fn parts() -> Vec<Parca> {
        vec![
            Parca {
                id: Some(1),
                ad: "Kapı kontağı, çift".into(),
                stok: 4,
                birim_fiyat: 250.0,
            },
            Parca {
                id: Some(2),
                ad: "Halat".into(),
                stok: 0,
                birim_fiyat: 1200.0,
            },
        ]
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let out = render_list(&parts(), OutputFormat::Csv, 100).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Id,Ad,Stok,Birim Fiyat"));
        assert_eq!(lines.next(), Some("1,\"Kapı kontağı, çift\",4,250.00 ₺"));
    }

    #[test]
    fn test_json_output_uses_backend_names() {
        let out = render_list(&parts(), OutputFormat::Json, 100).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[1]["unitPrice"], 1200.0);
        assert_eq!(value[1]["name"], "Halat");
    }

    #[test]
    fn test_table_output() {
        let out = render_list(&parts(), OutputFormat::Table, 100).unwrap();
        assert!(out.ends_with("(2 kayıt)"));
        let empty: Vec<Parca> = vec![];
        assert_eq!(
            render_list(&empty, OutputFormat::Table, 100).unwrap(),
            "Kayıt bulunamadı."
        );

        let one = render_one(&parts()[1], OutputFormat::Table, 100).unwrap();
        assert!(one.contains("Ad          : Halat"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("csv").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::parse("yaml").is_err());
    }
}
