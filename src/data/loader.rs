use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};
use crate::error::{ExplorerError, ExplorerResult};

const UTF8_BOM: char = '\u{feff}';

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-delimited with a header row (a UTF-8 BOM is tolerated)
/// * `.tsv`     – tab-delimited, same rules as CSV
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path, measure_column: &str) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',', measure_column),
        "tsv" => load_delimited(path, b'\t', measure_column),
        "json" => load_json(path, measure_column),
        "parquet" | "pq" => load_parquet(path, measure_column),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8, measure_column: &str) -> Result<Table> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_delimited(file, delimiter, measure_column)
}

/// Parse delimited text with a header row.  Rows must all have the header's
/// width; empty cells become `Null`.
pub fn read_delimited<R: Read>(input: R, delimiter: u8, measure_column: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches(UTF8_BOM).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        bail!("header row is empty");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }
    widen_mixed_numeric_columns(&mut rows, headers.len());

    Table::new(headers, rows, measure_column)
}

/// Give each column one numeric type: a column holding any float reads its
/// integers as floats too, so `1` and `1.0` are the same value.
fn widen_mixed_numeric_columns(rows: &mut [Vec<CellValue>], width: usize) {
    for col in 0..width {
        let has_float = rows
            .iter()
            .any(|row| matches!(row.get(col), Some(CellValue::Float(_))));
        if !has_float {
            continue;
        }
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(col) {
                if let CellValue::Integer(i) = *cell {
                    *cell = CellValue::Float(i as f64);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).  Columns are
/// ordered by first appearance; a key missing from a record reads as `Null`.
fn load_json(path: &Path, measure_column: &str) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(text.trim_start_matches(UTF8_BOM), measure_column)
}

pub fn read_json(text: &str, measure_column: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut rows: Vec<Vec<CellValue>> = objects
        .into_iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();
    widen_mixed_numeric_columns(&mut rows, headers.len());

    Table::new(headers, rows, measure_column)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.  Works with files written by
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path, measure_column: &str) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Table::new(headers, rows, measure_column)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => {
            let text = array_value_to_string(col.as_ref(), row)
                .with_context(|| format!("formatting {other:?} value"))?;
            CellValue::String(text)
        }
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// TableCache – process-wide memoization keyed by source identifier
// ---------------------------------------------------------------------------

/// Memoizes loaded tables for the lifetime of the application.
///
/// Populated lazily on first access per source, never invalidated, dropped on
/// exit.  Loading happens outside the lock, so two first loads of the same
/// source may both read the file; the first insert wins and both callers get
/// the cached table.  Failed loads are not cached.
#[derive(Debug)]
pub struct TableCache {
    measure_column: String,
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl TableCache {
    pub fn new(measure_column: impl Into<String>) -> Self {
        Self {
            measure_column: measure_column.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self, source_id: &str) -> ExplorerResult<Arc<Table>> {
        if let Some(table) = self.get(source_id) {
            log::debug!("Cache hit for {source_id}");
            return Ok(table);
        }

        let table = load_file(Path::new(source_id), &self.measure_column).map_err(|e| {
            ExplorerError::DataSource {
                source_id: source_id.to_string(),
                reason: format!("{e:#}"),
            }
        })?;
        log::info!(
            "Loaded {source_id}: {} rows, columns {:?}",
            table.len(),
            table.columns().iter().map(|c| &c.name).collect::<Vec<_>>()
        );

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let cached = tables
            .entry(source_id.to_string())
            .or_insert_with(|| Arc::new(table));
        Ok(Arc::clone(cached))
    }

    pub fn get(&self, source_id: &str) -> Option<Arc<Table>> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(source_id).cloned()
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn unique_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("discipline-explorer-{prefix}-{nanos}"));
        fs::create_dir_all(&dir).expect("should create temp dir");
        dir
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn csv_with_bom_keeps_first_header_clean() {
        let text = "\u{feff}官職,処分内容,人数\n自衛官,停職,120\n事務官,戒告,\n";
        let table = read_delimited(text.as_bytes(), b',', "人数").unwrap();

        assert_eq!(table.columns()[0].name, "官職");
        assert_eq!(table.measure_index(), 2);
        assert_eq!(
            table.rows()[0],
            vec![s("自衛官"), s("停職"), CellValue::Integer(120)]
        );
        assert_eq!(table.rows()[1][2], CellValue::Null);
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let text = "dept,count\nA,1\nB,2,extra\n";
        let err = read_delimited(text.as_bytes(), b',', "count").unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }

    #[test]
    fn csv_without_measure_is_rejected() {
        let text = "dept,role\nA,X\n";
        let err = read_delimited(text.as_bytes(), b',', "count").unwrap_err();
        assert!(err.to_string().contains("missing measure column"));
    }

    #[test]
    fn json_records_keep_document_column_order() {
        let text = r#"[{"role": "X", "dept": "A", "count": 5},
                       {"dept": "B", "count": 2.5}]"#;
        let table = read_json(text, "count").unwrap();

        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["role", "dept", "count"]);
        assert_eq!(table.rows()[1], vec![CellValue::Null, s("B"), CellValue::Float(2.5)]);
    }

    #[test]
    fn tsv_file_is_loaded_by_extension() {
        let dir = unique_test_dir("tsv");
        let path = dir.join("data.tsv");
        fs::write(&path, "dept\tcount\nA\t3\n").unwrap();

        let table = load_file(&path, "count").unwrap();
        assert_eq!(table.rows(), &[vec![s("A"), CellValue::Integer(3)]]);

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn parquet_file_is_loaded() {
        let dir = unique_test_dir("parquet");
        let path = dir.join("data.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("dept", DataType::Utf8, true),
            Field::new("count", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("A"), None])),
                Arc::new(Int64Array::from(vec![Some(4), Some(7)])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path, "count").unwrap();
        assert_eq!(
            table.rows(),
            &[
                vec![s("A"), CellValue::Integer(4)],
                vec![CellValue::Null, CellValue::Integer(7)],
            ]
        );

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn parquet_nan_reads_as_null() {
        let dir = unique_test_dir("parquet-nan");
        let path = dir.join("data.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("score", DataType::Float64, true),
            Field::new("count", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![f64::NAN, f64::NAN, 1.5])),
                Arc::new(Int64Array::from(vec![1, 2, 3])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path, "count").unwrap();
        let scores: Vec<_> = table.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            scores,
            vec![CellValue::Null, CellValue::Null, CellValue::Float(1.5)]
        );

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn mixed_integer_and_float_columns_read_as_float() {
        let text = "code,count\n1,1\n1.0,2\n2,3\n";
        let table = read_delimited(text.as_bytes(), b',', "count").unwrap();

        let codes: Vec<_> = table.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            codes,
            vec![
                CellValue::Float(1.0),
                CellValue::Float(1.0),
                CellValue::Float(2.0)
            ]
        );
        // The measure column has no floats and stays integral.
        assert_eq!(table.rows()[2][1], CellValue::Integer(3));
    }

    #[test]
    fn json_numbers_share_a_column_type() {
        let text = r#"[{"code": 1, "count": 1}, {"code": 1.0, "count": 2}]"#;
        let table = read_json(text, "count").unwrap();
        assert_eq!(table.rows()[0][0], table.rows()[1][0]);
        assert_eq!(table.rows()[0][0].to_string(), "1.0");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx"), "count").unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn cache_serves_repeat_loads_without_rereading() {
        let dir = unique_test_dir("cache");
        let path = dir.join("data.csv");
        fs::write(&path, "dept,count\nA,1\nB,2\n").unwrap();
        let source = path.to_string_lossy().into_owned();

        let cache = TableCache::new("count");
        let first = cache.load(&source).unwrap();
        fs::remove_file(&path).unwrap();
        let second = cache.load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn failed_loads_are_reported_and_not_cached() {
        let cache = TableCache::new("count");
        let err = cache.load("/nonexistent/discipline-explorer.csv").unwrap_err();

        assert!(matches!(
            err,
            ExplorerError::DataSource { ref source_id, .. }
                if source_id == "/nonexistent/discipline-explorer.csv"
        ));
        assert!(cache.is_empty());
    }
}
