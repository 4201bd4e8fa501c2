//! CSV loading for the assessment catalog.
//!
//! The source is a header row plus one row per assessment. Header names are
//! matched loosely (case, spacing and punctuation are ignored) so both the
//! snake_case export and the human-labelled export load the same way.

use std::io::Read;
use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::catalog::AssessmentRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("catalog line {line}: url is empty")]
    MissingUrl { line: usize },

    #[error("catalog line {line}: duration '{value}' is not a whole number of minutes")]
    InvalidDuration { line: usize, value: String },

    #[error("catalog line {line}: column '{column}' has unrecognised flag '{value}'")]
    InvalidFlag {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("catalog contains no assessments")]
    Empty,
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    name: Option<usize>,
    url: usize,
    remote_support: usize,
    adaptive_support: usize,
    duration: usize,
    test_type: usize,
    description: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, CatalogError> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.contains(&normalize_header(h).as_str()))
        };
        let require = |column: &'static str, aliases: &[&str]| {
            find(aliases).ok_or(CatalogError::MissingColumn(column))
        };

        Ok(Columns {
            name: find(&["name", "assessmentname"]),
            url: require("url", &["url", "link"])?,
            remote_support: require(
                "remote_support",
                &["remotesupport", "remotetestingsupport", "remote"],
            )?,
            adaptive_support: require(
                "adaptive_support",
                &["adaptivesupport", "adaptiveirtsupport", "adaptive"],
            )?,
            duration: require("duration", &["duration", "durationminutes"])?,
            test_type: require("test_type", &["testtype", "type"])?,
            description: require("description", &["description"])?,
        })
    }
}

/// Lowercases and drops everything that is not alphanumeric:
/// `"Adaptive/IRT Support"` → `"adaptiveirtsupport"`.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub(crate) fn read_records<R: Read>(reader: R) -> Result<Vec<AssessmentRecord>, CatalogError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::resolve(rdr.headers()?)?;

    let mut records = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        // header is line 1
        let line = idx + 2;
        records.push(parse_row(&row, &columns, line)?);
    }
    Ok(records)
}

fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    line: usize,
) -> Result<AssessmentRecord, CatalogError> {
    let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

    let url = cell(columns.url);
    if url.is_empty() {
        return Err(CatalogError::MissingUrl { line });
    }

    let name = columns
        .name
        .map(cell)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(AssessmentRecord {
        name,
        url: url.to_string(),
        duration: parse_duration(cell(columns.duration), line)?,
        test_type: split_tags(cell(columns.test_type)),
        remote_support: parse_flag(cell(columns.remote_support), "remote_support", line)?,
        adaptive_support: parse_flag(cell(columns.adaptive_support), "adaptive_support", line)?,
        description: cell(columns.description).to_string(),
    })
}

/// Accepts `"30"`, `"30 minutes"` and blank (0). Anything else is a load error.
fn parse_duration(value: &str, line: usize) -> Result<u32, CatalogError> {
    if value.is_empty() {
        return Ok(0);
    }
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits
        .parse::<u32>()
        .map_err(|_| CatalogError::InvalidDuration {
            line,
            value: value.to_string(),
        })
}

fn parse_flag(value: &str, column: &'static str, line: usize) -> Result<bool, CatalogError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Ok(false),
        "yes" | "y" | "true" | "1" => Ok(true),
        _ => Err(CatalogError::InvalidFlag {
            line,
            column,
            value: value.to_string(),
        }),
    }
}

pub(crate) fn split_tags(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
