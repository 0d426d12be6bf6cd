use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wl_core::record::EmitterStateRecord;
use wl_core::traits::RecordSink;

/// Column names of the LED sequence table.
pub const HEADER: [&str; 7] = [
    "time",
    "strip",
    "led_index",
    "intensity",
    "color_R",
    "color_G",
    "color_B",
];

/// Writes LED records as CSV rows for the strip controller.
///
/// The header row is written on construction; [`finish`](RecordSink::finish)
/// must be called to flush the buffered rows.
pub struct CsvSink<W: Write> {
    out: W,
    rows: usize,
    path: Option<PathBuf>,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create output file: {}", path.display()))?;
        let mut sink = Self::new(BufWriter::new(file))?;
        sink.path = Some(path.to_path_buf());
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps any writer and writes the header.
    ///
    /// # Errors
    /// Returns an I/O error if the header cannot be written.
    ///
    /// # Example
    /// ```
    /// use wl_core::layout::Side;
    /// use wl_core::record::EmitterStateRecord;
    /// use wl_core::traits::RecordSink;
    /// use wl_export::csv::CsvSink;
    ///
    /// let mut buf = Vec::new();
    /// let mut sink = CsvSink::new(&mut buf).unwrap();
    /// sink.write_record(&EmitterStateRecord::new(0.0, Side::Right, 4, 10, 150)).unwrap();
    /// sink.finish().unwrap();
    /// let text = String::from_utf8(buf).unwrap();
    /// assert_eq!(text.lines().nth(1), Some("0.0,right,4,10,10,245,150"));
    /// ```
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", HEADER.join(",")).context("Cannot write CSV header")?;
        Ok(Self {
            out,
            rows: 0,
            path: None,
        })
    }

    /// Data rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &EmitterStateRecord) -> Result<()> {
        let (r, g, b) = record.color;
        writeln!(
            self.out,
            "{},{},{},{},{},{},{}",
            format_seconds(record.time),
            record.side,
            record.led_index,
            record.intensity,
            r,
            g,
            b
        )
        .context("Cannot write CSV row")?;
        self.rows += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.out.flush().context("Cannot flush CSV output")?;
        match &self.path {
            Some(p) => log::info!("Wrote {} LED records to {}", self.rows, p.display()),
            None => log::debug!("Wrote {} LED records", self.rows),
        }
        Ok(())
    }
}

/// Formats a timestamp as the shortest decimal that reads back exactly.
///
/// Whole seconds keep a decimal point (`1.0`). Values below `1e-4` or from
/// `1e16` up use an exponent with an explicit sign and at least two digits
/// (`2.2675736961451248e-05`, `1e+16`).
///
/// # Example
/// ```
/// use wl_export::csv::format_seconds;
/// assert_eq!(format_seconds(0.0), "0.0");
/// assert_eq!(format_seconds(0.011_609_977_324_263_039), "0.011609977324263039");
/// assert_eq!(format_seconds(1.0 / 44100.0), "2.2675736961451248e-05");
/// ```
#[must_use]
pub fn format_seconds(time: f64) -> String {
    // Debug picks the same fixed/exponent cutoffs; only the exponent differs.
    let shortest = format!("{time:?}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
