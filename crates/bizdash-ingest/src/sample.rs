//! Sampling of uploaded files into small frames
//!
//! CSV files are scanned lazily, line by line, until the header and the
//! sample rows are complete. Leading metadata lines are skipped and quoted
//! fields may span lines. XLSX workbooks are opened as zip archives and the
//! first worksheet is read with the shared string table.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use bizdash_common::{BizdashError, timed};

use crate::detection::Separator;

/// Data rows kept per sample
pub const SAMPLE_ROWS: usize = 5;

/// Worksheet columns available in a workbook, `A` through `XFD`
pub const MAX_COLUMNS: usize = 16_384;

/// Header plus a handful of data rows
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    /// Rename columns present in `mappings`, leaving the others untouched
    pub fn rename(&self, mappings: &BTreeMap<String, String>) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .map(|c| mappings.get(c).cloned().unwrap_or_else(|| c.clone()))
                .collect(),
            rows: self.rows.clone(),
        }
    }

    pub fn head(&self, n: usize) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Upload formats, by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Unsupported,
}

impl FileFormat {
    pub fn from_filename(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        if name.ends_with(".csv") {
            FileFormat::Csv
        } else if name.ends_with(".xlsx") {
            FileFormat::Xlsx
        } else if name.ends_with(".xls") {
            FileFormat::Xls
        } else {
            FileFormat::Unsupported
        }
    }
}

/// Read the header and up to [`SAMPLE_ROWS`] rows of an uploaded file
pub fn read_sample(
    file_name: &str,
    content: &[u8],
    separator: Separator,
) -> Result<Frame, BizdashError> {
    let result = timed(&format!("READ_SAMPLE {file_name}"), || {
        match FileFormat::from_filename(file_name) {
            FileFormat::Csv => read_csv(content, separator),
            FileFormat::Xlsx => read_xlsx(content),
            FileFormat::Xls => Err(anyhow::anyhow!(
                "legacy .xls workbooks are not supported, save the file as .xlsx"
            )),
            FileFormat::Unsupported => Err(anyhow::anyhow!("unsupported file format")),
        }
    });

    result.map_err(|e| BizdashError::FileReadError {
        file: file_name.to_string(),
        message: e.to_string(),
    })
}

/// Whether a line looks like tabular data rather than leading metadata.
///
/// Metadata lines are blank or start with a quote and hold few commas.
pub fn is_data_line(line: &str) -> bool {
    (!line.trim().is_empty() && !line.starts_with('"'))
        || line.contains('|')
        || line.matches(',').count() > 3
}

/// Split one delimited record. Fields may be quoted, `""` inside quotes is a literal quote.
pub fn split_record(line: &str, separator: char) -> Vec<String> {
    scan_record(line, separator).0
}

/// Fields of `line` and whether a quoted field is still open at its end
fn scan_record(line: &str, separator: char) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == separator && !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            c => field.push(c),
        }
    }
    fields.push(field);

    (fields, in_quotes)
}

/// Lines of `content` without line terminators, decoded one at a time
fn text_lines(content: &[u8]) -> impl Iterator<Item = Cow<'_, str>> {
    let content = content.strip_prefix(b"\xef\xbb\xbf").unwrap_or(content);
    content.split(|b| *b == b'\n').map(|line| {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        String::from_utf8_lossy(line)
    })
}

/// Join physical lines into records while a quoted field is open
fn records<'a>(
    mut lines: impl Iterator<Item = Cow<'a, str>> + 'a,
    separator: char,
) -> impl Iterator<Item = Vec<String>> + 'a {
    std::iter::from_fn(move || {
        loop {
            let mut record = lines.next()?.into_owned();
            let (mut fields, mut open) = scan_record(&record, separator);

            while open {
                let Some(next) = lines.next() else { break };
                record.push('\n');
                record.push_str(&next);
                (fields, open) = scan_record(&record, separator);
            }

            if !record.trim().is_empty() {
                return Some(fields);
            }
        }
    })
}

fn read_csv(content: &[u8], separator: Separator) -> anyhow::Result<Frame> {
    let mut lines = text_lines(content);

    // metadata lines are only kept in case no data line follows
    let mut skipped = Vec::new();
    let body: Box<dyn Iterator<Item = Cow<'_, str>> + '_> = loop {
        match lines.next() {
            Some(line) if is_data_line(&line) => {
                break Box::new(std::iter::once(line).chain(lines));
            }
            Some(line) => skipped.push(line),
            None => break Box::new(skipped.into_iter()),
        }
    };

    let mut records = records(body, separator.as_char());

    let columns: Vec<String> = records
        .next()
        .ok_or_else(|| anyhow::anyhow!("no columns to parse from file"))?
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect();

    let rows = records
        .take(SAMPLE_ROWS)
        .map(|record| fit_row(record, columns.len()))
        .collect();

    Ok(Frame { columns, rows })
}

/// Pad short rows and truncate long ones to the header width
fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

static SHARED_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<si>(.*?)</si>").expect("Invalid regex pattern"));
static TEXT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<t(?:\s[^>]*)?>(.*?)</t>").expect("Invalid regex pattern"));
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<row[^>]*>(.*?)</row>").expect("Invalid regex pattern"));
static CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<c\b([^>]*?)(?:/>|>(.*?)</c>)").expect("Invalid regex pattern")
});
static CELL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\br="([A-Z]+)\d+""#).expect("Invalid regex pattern"));
static CELL_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bt="([^"]+)""#).expect("Invalid regex pattern"));
static CELL_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<v>(.*?)</v>").expect("Invalid regex pattern"));

fn read_xlsx(content: &[u8]) -> anyhow::Result<Frame> {
    let mut archive = ZipArchive::new(Cursor::new(content))?;

    let shared_strings = match read_entry(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml),
        None => Vec::new(),
    };

    let sheet_name = first_worksheet(&archive)
        .ok_or_else(|| anyhow::anyhow!("workbook has no worksheet"))?;
    let sheet = read_entry(&mut archive, &sheet_name)?
        .ok_or_else(|| anyhow::anyhow!("workbook has no worksheet"))?;

    let mut rows = ROW
        .captures_iter(&sheet)
        .map(|row| parse_row(&row[1], &shared_strings))
        .filter(|row| {
            row.as_ref()
                .map_or(true, |cells| cells.iter().any(|cell| !cell.is_empty()))
        });

    let columns = rows
        .next()
        .ok_or_else(|| anyhow::anyhow!("no columns to parse from file"))??;
    let rows = rows
        .take(SAMPLE_ROWS)
        .map(|row| row.map(|row| fit_row(row, columns.len())))
        .collect::<anyhow::Result<_>>()?;

    Ok(Frame { columns, rows })
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> anyhow::Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// `sheet1.xml` when present, otherwise the first worksheet by name
fn first_worksheet(archive: &ZipArchive<Cursor<&[u8]>>) -> Option<String> {
    let mut sheets: Vec<&str> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        .collect();

    if sheets.contains(&"xl/worksheets/sheet1.xml") {
        return Some("xl/worksheets/sheet1.xml".to_string());
    }

    sheets.sort_unstable();
    sheets.first().map(|s| s.to_string())
}

fn unescape(text: &str) -> String {
    htmlescape::decode_html(text).unwrap_or_else(|_| text.to_string())
}

fn parse_shared_strings(xml: &str) -> Vec<String> {
    SHARED_STRING
        .captures_iter(xml)
        .map(|item| {
            TEXT_RUN
                .captures_iter(&item[1])
                .map(|run| unescape(&run[1]))
                .collect::<String>()
        })
        .collect()
}

/// Zero-based column index of a reference such as `AB`, `None` past [`MAX_COLUMNS`]
fn column_index(letters: &str) -> Option<usize> {
    let number = letters.bytes().try_fold(0usize, |acc, b| {
        acc.checked_mul(26)?
            .checked_add(usize::from(b - b'A' + 1))
            .filter(|n| *n <= MAX_COLUMNS)
    })?;
    number.checked_sub(1)
}

fn parse_row(xml: &str, shared_strings: &[String]) -> anyhow::Result<Vec<String>> {
    let mut cells: Vec<String> = Vec::new();

    for (position, cell) in CELL.captures_iter(xml).enumerate() {
        let attributes = &cell[1];
        let body = cell.get(2).map(|m| m.as_str()).unwrap_or_default();

        let index = match CELL_REF.captures(attributes) {
            Some(reference) => column_index(&reference[1]).ok_or_else(|| {
                anyhow::anyhow!("cell {} lies beyond the last worksheet column", &reference[1])
            })?,
            None => position,
        };
        let value = cell_value(attributes, body, shared_strings);

        if cells.len() <= index {
            cells.resize(index + 1, String::new());
        }
        cells[index] = value;
    }

    Ok(cells)
}

fn cell_value(attributes: &str, body: &str, shared_strings: &[String]) -> String {
    let cell_type = CELL_TYPE.captures(attributes).map(|t| t[1].to_string());
    let raw = CELL_VALUE.captures(body).map(|v| v[1].to_string());

    match (cell_type.as_deref(), raw) {
        (Some("s"), Some(raw)) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared_strings.get(i).cloned())
            .unwrap_or_default(),
        (Some("inlineStr"), _) => TEXT_RUN
            .captures_iter(body)
            .map(|run| unescape(&run[1]))
            .collect(),
        (Some("b"), Some(raw)) => {
            if raw.trim() == "1" {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        (_, Some(raw)) => unescape(&raw),
        (_, None) => String::new(),
    }
}
