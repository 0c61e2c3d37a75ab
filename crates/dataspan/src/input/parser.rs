//! Tabular decoder: delimited text with delimiter detection, plus spreadsheets.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DataspanError, Result};
use super::source::{row_from_pairs, Dataset, SourceMetadata};
use super::spreadsheet;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Extensions decoded as spreadsheet workbooks.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Comma-separated text.
    Csv,
    /// Tab-separated text.
    Tsv,
    /// Text with another single-byte delimiter.
    Delimited(u8),
    /// Spreadsheet workbook (first sheet only).
    Spreadsheet,
}

impl InputFormat {
    /// Guess the format from a file extension. `None` means "delimited, detect".
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" => Some(InputFormat::Csv),
            "tsv" | "tab" => Some(InputFormat::Tsv),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => Some(InputFormat::Spreadsheet),
            _ => None,
        }
    }

    /// The delimiter byte for text formats.
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            InputFormat::Csv => Some(b','),
            InputFormat::Tsv => Some(b'\t'),
            InputFormat::Delimited(d) => Some(*d),
            InputFormat::Spreadsheet => None,
        }
    }

    /// Short label used in source metadata.
    pub fn label(&self) -> String {
        match self {
            InputFormat::Csv => "csv".to_string(),
            InputFormat::Tsv => "tsv".to_string(),
            InputFormat::Delimited(b';') => "csv-semicolon".to_string(),
            InputFormat::Delimited(b'|') => "psv".to_string(),
            InputFormat::Delimited(_) => "delimited".to_string(),
            InputFormat::Spreadsheet => "spreadsheet".to_string(),
        }
    }

    fn from_delimiter(delimiter: u8) -> Self {
        match delimiter {
            b',' => InputFormat::Csv,
            b'\t' => InputFormat::Tsv,
            d => InputFormat::Delimited(d),
        }
    }
}

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Format to use (None = from extension, then delimiter detection).
    pub format: Option<InputFormat>,
    /// Delimiter to use for text input (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

impl DecoderConfig {
    /// Force a delimiter for text input.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Limit the number of rows read.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }
}

/// Decodes tabular files into a [`Dataset`].
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder with default configuration.
    pub fn new() -> Self {
        Self {
            config: DecoderConfig::default(),
        }
    }

    /// Create a decoder with custom configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a file and return the dataset and metadata.
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| DataspanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| DataspanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let format = self.config.format.or_else(|| InputFormat::from_path(path));
        let (dataset, format) = self.decode_detected(&contents, format)?;

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format.label(),
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source_metadata))
    }

    /// Decode an in-memory buffer. `None` format means detect a text delimiter.
    pub fn decode_bytes(&self, bytes: &[u8], format: Option<InputFormat>) -> Result<Dataset> {
        let format = format.or(self.config.format);
        self.decode_detected(bytes, format).map(|(dataset, _)| dataset)
    }

    fn decode_detected(
        &self,
        bytes: &[u8],
        format: Option<InputFormat>,
    ) -> Result<(Dataset, InputFormat)> {
        let format = match format {
            Some(InputFormat::Spreadsheet) => InputFormat::Spreadsheet,
            _ => match self.config.delimiter {
                Some(d) => InputFormat::from_delimiter(d),
                None => match format {
                    Some(f) => f,
                    None => InputFormat::from_delimiter(detect_delimiter(bytes)?),
                },
            },
        };

        let dataset = match format {
            InputFormat::Spreadsheet => {
                spreadsheet::decode_first_sheet(bytes, self.config.max_rows)?
            }
            text => {
                let delimiter = text.delimiter().ok_or_else(|| {
                    DataspanError::InvalidDelimiter(format!("{:?}", text))
                })?;
                self.decode_delimited(bytes, delimiter)?
            }
        };

        Ok((dataset, format))
    }

    /// Decode delimited text with the given delimiter.
    fn decode_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        if delimiter == self.config.quote || delimiter == b'\n' || delimiter == b'\r' {
            return Err(DataspanError::InvalidDelimiter(
                (delimiter as char).escape_default().to_string(),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        // Invalid UTF-8 in a cell is replaced, not fatal
        let mut records = reader.byte_records();

        let (headers, pending) = if self.config.has_header {
            match records.next() {
                Some(record) => {
                    let record = record?;
                    let names: Vec<Cow<'_, str>> = record.iter().map(lossy_field).collect();
                    (unique_headers(names.iter().map(|n| n.as_ref())), None)
                }
                None => return Err(DataspanError::EmptyData("No header row found".to_string())),
            }
        } else {
            // Generate column names from the first record's width
            match records.next() {
                Some(record) => {
                    let record = record?;
                    let headers = (0..record.len())
                        .map(|i| format!("column_{}", i + 1))
                        .collect();
                    (headers, Some(record))
                }
                None => return Err(DataspanError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() {
            return Err(DataspanError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();

        for result in pending.into_iter().map(Ok).chain(records) {
            if let Some(max) = self.config.max_rows {
                if rows.len() >= max {
                    break;
                }
            }

            let record = result?;
            // Short rows leave trailing columns absent; extra fields are dropped
            let row = row_from_pairs(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, value)| (header.clone(), lossy_field(value).into_owned())),
            );
            if !row.is_empty() {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(DataspanError::EmptyData("No data rows found".to_string()));
        }

        Ok(Dataset::new(headers, rows))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Make header names usable as row keys.
///
/// Blank names become `__EMPTY`, `__EMPTY_1`, ...; repeated names get a
/// numeric suffix (`name`, `name_1`, ...).
pub(crate) fn unique_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for name in raw {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() { "__EMPTY" } else { trimmed };

        let mut candidate = base.to_string();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// Decode one field, replacing invalid UTF-8 sequences.
fn lossy_field(field: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(field)
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<Cow<'_, str>> = bytes
        .split(|&b| b == b'\n')
        .take(10)
        .map(String::from_utf8_lossy)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DataspanError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Tab gets a slight bonus as it's rare inside actual values
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
