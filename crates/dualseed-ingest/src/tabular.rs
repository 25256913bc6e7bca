//! Shared CSV plumbing: decoding readers, header lookup and tolerant field parsing

use crate::error::{IngestError, Result};
use csv::StringRecord;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A streaming CSV reader over a decoded source
pub type TabularReader = csv::Reader<Box<dyn Read>>;

/// Look up an encoding by label
///
/// WHATWG labels (`utf-8`, `latin1`, `cp1252`, ...) are accepted as is. Codec
/// spellings common in existing scripts are folded onto them: underscores
/// become dashes, `latin-1` means `latin1` and `utf-8-sig` means `utf-8`
/// (a leading BOM is always stripped).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let folded = label.trim().to_ascii_lowercase().replace('_', "-");
    let whatwg = match folded.as_str() {
        "latin-1" | "l1" | "iso8859-1" | "8859-1" => "latin1",
        "utf-8-sig" | "utf8-sig" | "u8" => "utf-8",
        other => other,
    };
    Encoding::for_label(whatwg.as_bytes())
        .ok_or_else(|| IngestError::UnknownEncoding(label.to_string()))
}

fn open_decoded(path: &Path, decoder: &DecodeReaderBytesBuilder) -> Result<TabularReader> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let decoded: Box<dyn Read> = Box::new(decoder.build(file));

    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(decoded))
}

/// Open a header-row CSV file, transcoding it from `encoding` to UTF-8
///
/// Undecodable bytes become U+FFFD.
pub fn open_csv(path: &Path, encoding: &'static Encoding) -> Result<TabularReader> {
    open_decoded(path, DecodeReaderBytesBuilder::new().encoding(Some(encoding)))
}

/// Open a UTF-8 CSV file
///
/// Bytes pass through untouched apart from a leading BOM, so invalid UTF-8
/// surfaces as a CSV error on the offending record.
pub fn open_utf8_csv(path: &Path) -> Result<TabularReader> {
    open_decoded(
        path,
        DecodeReaderBytesBuilder::new()
            .encoding(Some(UTF_8))
            .utf8_passthru(true)
            .strip_bom(true),
    )
}

/// Column positions resolved once from the header row
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn read(reader: &mut TabularReader, path: &Path) -> Result<Self> {
        let headers = reader.headers().map_err(|e| IngestError::csv(path, e))?;
        Ok(Self {
            names: headers.iter().map(str::to_string).collect(),
        })
    }

    /// Position of `column`, if declared
    pub fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|name| name == column)
    }

    /// Position of `column`, or a missing-column error
    pub fn require(&self, column: &str, path: &Path) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| IngestError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    }
}

/// Field at `index`, or the empty string when the column or cell is absent
pub fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

/// Parse a messy integer cell, falling back to zero
///
/// Thousands separators are stripped. Values containing a decimal point are
/// parsed as floats and truncated toward zero.
pub fn parse_lenient_int(value: &str) -> i64 {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0;
    }

    if cleaned.contains('.') {
        return match cleaned.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => parsed.trunc() as i64,
            _ => 0,
        };
    }

    cleaned.parse::<i64>().unwrap_or(0)
}

/// Normalize a watch status: trimmed, spaces to `_`, lower-case
pub fn normalize_status(status: &str) -> String {
    status.trim().replace(' ', "_").to_lowercase()
}

/// Number of data rows (lines minus header), used only to size progress bars
pub fn count_data_rows(path: &Path) -> Result<u64> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut lines = 0u64;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| IngestError::io(path, e))?;
        if read == 0 {
            break;
        }
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}

/// Row progress bar for a CSV pass; hidden unless `show` is set
pub fn row_progress(path: &Path, message: &str, show: bool) -> Result<ProgressBar> {
    if !show {
        return Ok(ProgressBar::hidden());
    }
    let total = count_data_rows(path)?;
    Ok(counter_progress(total, message, "row"))
}

/// Counter bar with a `{pos}/{len} unit` readout
pub fn counter_progress(total: u64, message: &str, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template = format!("{{msg}} [{{elapsed_precise}}] [{{wide_bar:.cyan/blue}}] {{pos}}/{{len}} {unit}");
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
