//! Catalog file model.
//!
//! A catalog declares command types and their parameters in YAML or JSON.
//! Commands are listed parent-before-child.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! types:
//!   - name: label
//!     kind: string
//!     description: a text label
//! commands:
//!   - name: image
//!     abstract: true
//!   - name: image:convert
//!     parent: image
//!     description: Convert an image
//!     arguments:
//!       - { name: color, type: integer }
//!       - { name: shape, default: circle }
//!       - { name: sizes, variadic: true }
//!     options:
//!       - { name: verbose, type: boolean, aliases: [v] }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use command_params_core::{Value, ValueKind};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

fn default_type() -> String {
    "string".to_string()
}

fn is_default_type(name: &str) -> bool {
    name == "string"
}

/// Extra textual type tag registered before commands are declared.
///
/// The tag accepts values of nominal type `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: ValueKind,
    /// Description fragment for error messages; defaults to
    /// `an instance of <Kind>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One positional argument declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDecl {
    pub name: String,
    #[serde(rename = "type", default = "default_type", skip_serializing_if = "is_default_type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<bool>,
}

/// One named option declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDecl {
    pub name: String,
    #[serde(rename = "type", default = "default_type", skip_serializing_if = "is_default_type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<bool>,
}

/// One command type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDecl {
    pub name: String,
    /// Parent command name; the shared base when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDecl>,
}

/// Top-level catalog file.
///
/// # Examples
///
/// ```
/// use command_params_catalog::Catalog;
///
/// let catalog = Catalog::from_yaml_str(r#"
/// version: "1.0"
/// commands:
///   - name: build
///     options:
///       - { name: release, type: boolean }
/// "#).unwrap();
/// assert_eq!(catalog.commands.len(), 1);
/// assert_eq!(catalog.commands[0].options[0].type_name, "boolean");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog format version (e.g., `"1.0"`).
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub commands: Vec<CommandDecl>,
}

enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml" | "yml") => Ok(Format::Yaml),
        _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
    }
}

impl Catalog {
    /// Loads a catalog, choosing JSON or YAML by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](CatalogError::UnsupportedFormat) for
    /// other extensions, [`IoError`](CatalogError::IoError) if the file
    /// cannot be read, or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let catalog: Catalog = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        catalog.check()?;
        Ok(catalog)
    }

    /// Saves the catalog, choosing JSON or YAML by file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.check()?;
        Ok(catalog)
    }

    fn check(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(CatalogError::InvalidCatalog(
                "catalog version cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
