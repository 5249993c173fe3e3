// File adapters: export CSV in, trail/meta/quarantine CSV and parquet out

pub mod csv_io;
pub mod parquet_out;

pub use csv_io::{read_export, read_meta, read_trail, write_batch_outputs, ExportBatch, WrittenFiles};
pub use parquet_out::{read_string_table, write_string_table};
