//! Row and column file loading
//!
//! Rows come from CSV, JSON (an array of objects) or YAML (a sequence of
//! mappings). Column descriptors come from a YAML or JSON list, or are
//! inferred from the loaded data when no column file is given.

use crate::model::{Align, ColumnDescriptor, ColumnKind, Record};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Number, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Supported row file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
    Yaml,
}

impl DataFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<DataFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            _ => Err(anyhow!(
                "Unsupported data file {}: expected .csv, .json, .yaml or .yml",
                path.display()
            )),
        }
    }
}

/// Rows read from a file, with field keys in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedData {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Load rows from a CSV, JSON or YAML file
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<LoadedData> {
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let data = match format {
        DataFormat::Csv => parse_csv(contents.as_bytes()),
        DataFormat::Json => parse_json(&contents),
        DataFormat::Yaml => parse_yaml(&contents),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    log::info!(
        "Loaded {} rows with {} fields from {}",
        data.records.len(),
        data.headers.len(),
        path.display()
    );
    Ok(data)
}

/// Parse CSV with a header row, typing each field
pub fn parse_csv<R: Read>(reader: R) -> Result<LoadedData> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut records = Vec::new();

    for result in reader.records() {
        let line = result?;
        let record: Record = headers
            .iter()
            .zip(line.iter())
            .map(|(header, field)| (header.clone(), infer_value(field)))
            .collect();
        records.push(record);
    }

    Ok(LoadedData { headers, records })
}

/// Parse a JSON array of objects
pub fn parse_json(text: &str) -> Result<LoadedData> {
    let value: Value = serde_json::from_str(text)?;
    records_from_value(value)
}

/// Parse a YAML sequence of mappings
pub fn parse_yaml(text: &str) -> Result<LoadedData> {
    let value: Value = serde_yaml::from_str(text)?;
    records_from_value(value)
}

fn records_from_value(value: Value) -> Result<LoadedData> {
    let Value::Array(items) = value else {
        bail!("Expected a list of records at the top level");
    };

    let mut headers: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(items.len());

    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(record) = item else {
            bail!("Record {} is not an object", i + 1);
        };
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        records.push(record);
    }

    Ok(LoadedData { headers, records })
}

/// Type a raw CSV field: empty as null, then boolean, integer, float,
/// falling back to the original text. Zero-padded numbers such as `007`
/// stay text so identifiers keep their padding.
pub fn infer_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    let digits = trimmed.trim_start_matches('-');
    let zero_padded = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    if !zero_padded {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Some(n) = trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
        {
            return Value::Number(n);
        }
    }

    Value::String(field.to_string())
}

/// Load column descriptors from a YAML or JSON file
pub fn load_columns<P: AsRef<Path>>(path: P) -> Result<Vec<ColumnDescriptor>> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both
    let columns: Vec<ColumnDescriptor> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse columns from {}", path.display()))?;

    if let Some(column) = columns
        .iter()
        .find(|c| c.kind == ColumnKind::Normal && c.key.is_empty())
    {
        bail!(
            "Column {:?} in {} has no key",
            column.display_label(),
            path.display()
        );
    }

    Ok(columns)
}

/// Build a default column layout for loaded data: expand, selection and
/// index markers, then one sortable, filterable column per field.
/// Columns holding only numbers are right aligned.
pub fn infer_columns(data: &LoadedData) -> Vec<ColumnDescriptor> {
    let mut columns = vec![
        ColumnDescriptor::special(ColumnKind::Expand),
        ColumnDescriptor::special(ColumnKind::Selection),
        ColumnDescriptor::special(ColumnKind::Index),
    ];

    for header in &data.headers {
        let mut values = data
            .records
            .iter()
            .filter_map(|r| r.get(header))
            .filter(|v| !v.is_null())
            .peekable();
        let numeric = values.peek().is_some() && values.all(Value::is_number);

        let mut column = ColumnDescriptor::new(header.clone(), header.clone())
            .sortable()
            .filterable();
        if numeric {
            column = column.align(Align::Right);
        }
        columns.push(column);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tabular-view-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value(""), Value::Null);
        assert_eq!(infer_value("  "), Value::Null);
        assert_eq!(infer_value("TRUE"), json!(true));
        assert_eq!(infer_value("false"), json!(false));
        assert_eq!(infer_value("42"), json!(42));
        assert_eq!(infer_value("-7"), json!(-7));
        assert_eq!(infer_value("2.5"), json!(2.5));
        assert_eq!(infer_value("0.5"), json!(0.5));
        assert_eq!(infer_value("0"), json!(0));
        assert_eq!(infer_value("007"), json!("007"));
        assert_eq!(infer_value("NaN"), json!("NaN"));
        assert_eq!(infer_value("Alice"), json!("Alice"));
    }

    #[test]
    fn test_parse_csv() {
        let csv = "id, name ,age\n1,Alice,30\n2,Bob,\n3,Carol\n";
        let data = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(data.headers, vec!["id", "name", "age"]);
        assert_eq!(data.records.len(), 3);
        assert_eq!(data.records[0].get("age"), Some(&json!(30)));
        assert_eq!(data.records[1].get("age"), Some(&Value::Null));
        assert_eq!(data.records[2].get("age"), None);
        assert_eq!(data.records[2].get("name"), Some(&json!("Carol")));
    }

    #[test]
    fn test_parse_json_collects_headers_in_order() {
        let data = parse_json(r#"[{"b": 1, "a": 2}, {"c": 3, "a": 4}]"#).unwrap();
        assert_eq!(data.headers, vec!["b", "a", "c"]);
        assert_eq!(data.records.len(), 2);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "- name: Alice\n  age: 30\n- name: Bob\n  age: 25\n";
        let data = parse_yaml(yaml).unwrap();
        assert_eq!(data.headers, vec!["name", "age"]);
        assert_eq!(data.records[1].get("age"), Some(&json!(25)));
    }

    #[test]
    fn test_parse_rejects_non_lists() {
        assert!(parse_json(r#"{"a": 1}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
        assert!(parse_yaml("name: Alice").is_err());
    }

    #[test]
    fn test_data_format_from_path() {
        assert_eq!(DataFormat::from_path(Path::new("a.CSV")).unwrap(), DataFormat::Csv);
        assert_eq!(DataFormat::from_path(Path::new("a.yml")).unwrap(), DataFormat::Yaml);
        assert!(DataFormat::from_path(Path::new("a.txt")).is_err());
        assert!(DataFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_load_rows_from_file() {
        let path = temp_file("people.csv", "name,age\nAlice,30\n");
        let data = load_rows(&path).unwrap();
        assert_eq!(data.records.len(), 1);

        let missing = path.with_file_name("missing.csv");
        let err = load_rows(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }

    #[test]
    fn test_load_columns_from_file() {
        let path = temp_file(
            "columns.yaml",
            "- key: name\n  sortable: true\n- type: index\n",
        );
        let columns = load_columns(&path).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].kind, ColumnKind::Index);

        let bad = temp_file("bad-columns.yaml", "- label: Nameless\n");
        assert!(load_columns(&bad).is_err());
    }

    #[test]
    fn test_infer_columns() {
        let data = parse_csv("name,age,note\nAlice,30,\nBob,25,x\n".as_bytes()).unwrap();
        let columns = infer_columns(&data);

        let kinds: Vec<ColumnKind> = columns.iter().take(3).map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Expand, ColumnKind::Selection, ColumnKind::Index]
        );
        assert_eq!(columns[3].key, "name");
        assert_eq!(columns[3].align, Align::Left);
        assert_eq!(columns[4].align, Align::Right);
        assert_eq!(columns[5].align, Align::Left);
        assert!(columns[4].sortable && columns[4].filterable);
    }
}
