//! CSV table → JSON record array conversion.
//!
//! Every row becomes one object keyed by the column headers, in header order.
//! Cell types are inferred per column so a numeric column stays numeric
//! across all records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

/// Tables converted when none are named on the command line.
pub const DEFAULT_TABLES: &[&str] = &[
    "companies",
    "education_and_skills",
    "employment_details",
    "industry_info",
    "jobs",
];

/// Cell spellings read as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Narrowest kind every present cell of a column fits.
pub fn infer_kind<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let present: Vec<&str> = cells.into_iter().filter(|c| !is_missing(c)).collect();
    if present.is_empty() {
        return ColumnKind::Text;
    }
    if present.iter().all(|c| c.trim().parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present.iter().all(|c| c.trim().parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if present.iter().all(|c| parse_bool(c).is_some()) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

/// Converts one cell according to its column's kind. Missing cells become null.
pub fn cell_value(cell: &str, kind: ColumnKind) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => cell
            .trim()
            .parse::<i64>()
            .map_or(Value::Null, Value::from),
        ColumnKind::Float => cell
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        ColumnKind::Boolean => parse_bool(cell).map_or(Value::Null, Value::Bool),
        ColumnKind::Text => Value::String(cell.to_string()),
    }
}

/// Reads a headed CSV stream into JSON records.
pub fn read_records<R: std::io::Read>(reader: R) -> Result<Vec<Value>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("failed to read CSV header row")?
        .clone();

    let rows = csv_reader
        .records()
        .enumerate()
        .map(|(index, record)| record.with_context(|| format!("malformed CSV row {}", index + 2)))
        .collect::<Result<Vec<_>>>()?;

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| infer_kind(rows.iter().map(|row| row.get(col).unwrap_or(""))))
        .collect();
    debug!("Inferred column kinds: {kinds:?}");

    Ok(rows
        .iter()
        .map(|row| {
            let record: Map<String, Value> = headers
                .iter()
                .zip(&kinds)
                .zip(row.iter())
                .map(|((header, kind), cell)| (header.to_string(), cell_value(cell, *kind)))
                .collect();
            Value::Object(record)
        })
        .collect())
}

/// Output file stem for a table. `education_and_skills` is shortened.
pub fn output_name(table: &str) -> &str {
    match table {
        "education_and_skills" => "education_skills",
        other => other,
    }
}

/// Converts `<input_dir>/<table>.csv` into `<output_dir>/<output_name>.json`.
/// Returns the written path and the number of records.
pub fn convert_table(
    input_dir: &Path,
    output_dir: &Path,
    table: &str,
    pretty: bool,
) -> Result<(PathBuf, usize)> {
    let input = input_dir.join(format!("{table}.csv"));
    let output = output_dir.join(format!("{}.json", output_name(table)));

    let file = File::open(&input).with_context(|| format!("cannot open {}", input.display()))?;
    let records = read_records(file).with_context(|| format!("cannot parse {}", input.display()))?;

    let out = File::create(&output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(out);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &records)?;
    } else {
        serde_json::to_writer(&mut writer, &records)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} records from {} to {}",
        records.len(),
        input.display(),
        output.display()
    );
    Ok((output, records.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_infer_kind() {
        assert_eq!(infer_kind(["1", "2", ""]), ColumnKind::Integer);
        assert_eq!(infer_kind(["1", "2.5"]), ColumnKind::Float);
        assert_eq!(infer_kind(["True", "false", "NA"]), ColumnKind::Boolean);
        assert_eq!(infer_kind(["1", "x"]), ColumnKind::Text);
        assert_eq!(infer_kind(["", "NaN"]), ColumnKind::Text);
    }

    #[test]
    fn test_read_records_types_columns() {
        let csv = "id,title,average_salary,remote,Level\n\
                   1,Engineer,85000.5,True,Entry Level\n\
                   2,Analyst,60000,false,\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![
                json!({
                    "id": 1, "title": "Engineer", "average_salary": 85000.5,
                    "remote": true, "Level": "Entry Level"
                }),
                json!({
                    "id": 2, "title": "Analyst", "average_salary": 60000.0,
                    "remote": false, "Level": null
                }),
            ]
        );
    }

    #[test]
    fn test_records_keep_header_order() {
        let records = read_records("zeta,alpha\n1,2\n".as_bytes()).unwrap();
        let keys: Vec<_> = records[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let err = read_records("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("malformed CSV row 3"));
    }

    #[test]
    fn test_convert_table_writes_renamed_output() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("education_and_skills.csv"),
            "id,skill\n1,Rust\n2,SQL\n",
        )
        .unwrap();

        let (path, count) =
            convert_table(input.path(), output.path(), "education_and_skills", false).unwrap();
        assert_eq!(count, 2);
        assert_eq!(path, output.path().join("education_skills.json"));

        let written: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!([{ "id": 1, "skill": "Rust" }, { "id": 2, "skill": "SQL" }])
        );
    }

    #[test]
    fn test_convert_table_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_table(dir.path(), dir.path(), "jobs", false).unwrap_err();
        assert!(err.to_string().contains("jobs.csv"));
    }
}
