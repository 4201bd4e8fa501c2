//! Field-name contract between the prompt and the reply parser.
//!
//! The model is told to answer with objects keyed by these names, and the
//! parser reads the same names back. Both sides go through `SchemaVariant::fields`
//! so they cannot drift apart.

use std::str::FromStr;

use serde::Serialize;

/// JSON keys the model is asked to use for each recommendation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaFields {
    /// `None` when the variant does not ask for a name.
    pub name: Option<&'static str>,
    pub url: &'static str,
    pub adaptive_support: &'static str,
    pub description: &'static str,
    pub duration: &'static str,
    pub remote_support: &'static str,
    pub test_type: &'static str,
}

const STANDARD_FIELDS: SchemaFields = SchemaFields {
    name: None,
    url: "url",
    adaptive_support: "adaptive_support",
    description: "description",
    duration: "duration",
    remote_support: "remote_support",
    test_type: "test_type",
};

const LABELED_FIELDS: SchemaFields = SchemaFields {
    name: Some("Assessment Name"),
    url: "URL",
    adaptive_support: "Adaptive Support",
    description: "Description",
    duration: "Duration",
    remote_support: "Remote Support",
    test_type: "Type",
};

/// Which field-name convention the deployment uses. Selected once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// snake_case keys: `url`, `adaptive_support`, ..., `test_type`.
    #[default]
    Standard,
    /// Human-labelled keys: `Assessment Name`, `URL`, ..., `Type`.
    Labeled,
}

impl SchemaVariant {
    pub fn fields(self) -> &'static SchemaFields {
        match self {
            SchemaVariant::Standard => &STANDARD_FIELDS,
            SchemaVariant::Labeled => &LABELED_FIELDS,
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(SchemaVariant::Standard),
            "labeled" | "labelled" => Ok(SchemaVariant::Labeled),
            other => Err(format!("unknown response schema '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard() {
        assert_eq!(SchemaVariant::default(), SchemaVariant::Standard);
    }

    #[test]
    fn test_from_str_accepts_both_spellings() {
        assert_eq!("Standard".parse::<SchemaVariant>(), Ok(SchemaVariant::Standard));
        assert_eq!("labeled".parse::<SchemaVariant>(), Ok(SchemaVariant::Labeled));
        assert_eq!(" labelled ".parse::<SchemaVariant>(), Ok(SchemaVariant::Labeled));
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("camel".parse::<SchemaVariant>().is_err());
    }

    #[test]
    fn test_standard_fields_match_output_names() {
        let f = SchemaVariant::Standard.fields();
        assert_eq!(f.url, "url");
        assert_eq!(f.test_type, "test_type");
        assert!(f.name.is_none());
    }

    #[test]
    fn test_labeled_fields() {
        let f = SchemaVariant::Labeled.fields();
        assert_eq!(f.url, "URL");
        assert_eq!(f.test_type, "Type");
        assert_eq!(f.name, Some("Assessment Name"));
    }
}
