use parquet::basic::{Compression, LogicalType, Repetition, Type as PhysicalType, ZstdLevel};
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RowAccessor;
use parquet::schema::types::{Type, TypePtr};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

// Every column is a required UTF-8 string
fn build_schema(columns: &[&str]) -> Result<TypePtr> {
    let fields = columns
        .iter()
        .map(|name| {
            Type::primitive_type_builder(name, PhysicalType::BYTE_ARRAY)
                .with_repetition(Repetition::REQUIRED)
                .with_logical_type(Some(LogicalType::String))
                .build()
                .map(Arc::new)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Arc::new(
        Type::group_type_builder("schema")
            .with_fields(fields)
            .build()?,
    ))
}

/// Write rows of strings as a single-row-group, ZSTD-compressed parquet file
pub fn write_string_table<const N: usize>(
    path: &Path,
    columns: &[&str; N],
    rows: &[[&str; N]],
) -> Result<()> {
    let schema = build_schema(columns)?;
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::default()))
            .build(),
    );

    // Column-major copy of the rows
    let values: Vec<Vec<ByteArray>> = (0..N)
        .map(|c| rows.iter().map(|row| ByteArray::from(row[c])).collect())
        .collect();

    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    let mut column_values = values.iter();
    while let Some(mut column) = row_group.next_column()? {
        if let Some(batch) = column_values.next() {
            column
                .typed::<ByteArrayType>()
                .write_batch(batch, None, None)?;
        }
        column.close()?;
    }
    row_group.close()?;
    writer.close()?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a string table back as (column names, rows)
pub fn read_string_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    let columns: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut rows = Vec::new();
    for row in reader.get_row_iter(None)? {
        let row = row?;
        let values = (0..columns.len())
            .map(|i| row.get_string(i).map(|s| s.to_string()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.push(values);
    }
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn string_table_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        let rows = [["1", "2023-05-16 14:00:00", "Order Created"], ["2", "", "x, y"]];

        write_string_table(&path, &["Order_num", "Date", "Activity"], &rows).unwrap();
        let (columns, read) = read_string_table(&path).unwrap();

        assert_eq!(columns, vec!["Order_num", "Date", "Activity"]);
        assert_eq!(read.len(), 2);
        assert_eq!(read[1], vec!["2", "", "x, y"]);
    }

    #[test]
    fn empty_table_is_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        write_string_table::<1>(&path, &["Order_num"], &[]).unwrap();
        let (columns, rows) = read_string_table(&path).unwrap();
        assert_eq!(columns, vec!["Order_num"]);
        assert!(rows.is_empty());
    }
}
