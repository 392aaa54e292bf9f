//! Declarative catalogs of command types.
//!
//! A [`Catalog`] is the configuration layer over `command-params-core`: a
//! YAML or JSON file listing extra type tags and command types with their
//! arguments and options. [`Catalog::build`] turns it into a
//! [`CommandSet`](command_params_core::CommandSet) ready for resolution.
//!
//! # Quick start
//!
//! ```no_run
//! use command_params_catalog::Catalog;
//! use command_params_core::Invocation;
//!
//! let commands = Catalog::load("commands.yaml").unwrap().build().unwrap();
//! let params = commands
//!     .resolve_named("image:convert", &Invocation::new(vec!["small".into()]))
//!     .unwrap();
//! println!("{}", params.to_json());
//! ```

mod config;
mod error;
mod loader;

pub use config::{ArgumentDecl, Catalog, CommandDecl, OptionDecl, TypeDecl};
pub use error::{CatalogError, Result};
