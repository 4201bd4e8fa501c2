//! Catalog Provider: the read-only table of assessments offered to the model.
//!
//! Loaded once at startup and shared behind an `Arc`. Records are never
//! mutated after load, so the prompt rendering is stable for the process lifetime.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

mod loader;

pub use loader::CatalogError;
pub(crate) use loader::split_tags;

/// A single assessment product from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub name: Option<String>,
    pub url: String,
    /// Minutes.
    pub duration: u32,
    pub test_type: Vec<String>,
    pub remote_support: bool,
    pub adaptive_support: bool,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<AssessmentRecord>,
}

const RENDER_HEADER: &str =
    "name | url | duration | test_type | remote_support | adaptive_support | description";

impl Catalog {
    /// Loads the catalog from a CSV file. Any problem with the file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        info!(
            "Loaded {} assessments from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parses a catalog from CSV. A header with no rows is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog = Self {
            records: loader::read_records(reader)?,
        };
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders every record, in source order, as a pipe-separated table for the prompt.
    ///
    /// Output is a pure function of the loaded records, so repeated calls are
    /// byte-identical. `|`, `\` and line breaks inside cells are escaped so no
    /// field can spill into its neighbour.
    pub fn render_for_prompt(&self) -> String {
        let mut out = String::from(RENDER_HEADER);
        for record in self.records() {
            out.push('\n');
            let cells = [
                escape_cell(record.name.as_deref().unwrap_or("")),
                escape_cell(&record.url),
                record.duration.to_string(),
                escape_cell(&record.test_type.join(", ")),
                yes_no(record.remote_support).to_string(),
                yes_no(record.adaptive_support).to_string(),
                escape_cell(&record.description),
            ];
            out.push_str(&cells.join(" | "));
        }
        out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn escape_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
