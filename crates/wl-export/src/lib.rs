// Sequence export for wallights.

pub mod csv;

pub use csv::CsvSink;
