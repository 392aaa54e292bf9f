//! Schema-driven resolution of command parameters.
//!
//! This crate turns an already-tokenized invocation (positional values plus
//! a keyed option map) into a validated, defaulted parameter set, or reports
//! precisely why it cannot:
//!
//! - [`TypeRegistry`] — maps [`TypeTag`]s to validation predicates and the
//!   description fragments used in error messages.
//! - [`ArgumentSpec`] / [`OptionSpec`] — immutable description of one
//!   positional argument or named option.
//! - [`CommandSet`] — command types with their own [`Schema`]s, declared
//!   through a [`CommandBuilder`], and the effective-schema inheritance
//!   policy (arguments override, options merge with ancestors winning).
//! - [`resolve_arguments`] / [`resolve_options`] — the resolution engine,
//!   including variadic splitting around at most one variadic argument.
//! - [`ResolvedParams`] — the result, with value accessors and presence
//!   predicates.
//!
//! # Example
//!
//! ```
//! use command_params_core::*;
//!
//! let mut commands = CommandSet::new();
//! let draw = commands.add_command("draw", None).unwrap();
//! commands
//!     .declare(draw)
//!     .unwrap()
//!     .variadic(ArgumentSpec::new("sizes"))
//!     .unwrap()
//!     .argument(ArgumentSpec::new("transparency").with_type(TypeTag::Boolean))
//!     .unwrap()
//!     .argument(ArgumentSpec::new("background"))
//!     .unwrap();
//!
//! let invocation = Invocation::new(vec![
//!     "small".into(), "medium".into(), "large".into(), true.into(), "checkerboard".into(),
//! ]);
//! let params = commands.resolve(draw, &invocation).unwrap();
//! assert_eq!(params.get("sizes").unwrap().to_string(), r#"["small", "medium", "large"]"#);
//! assert!(params.is_set("transparency").unwrap());
//! assert_eq!(params.value("background").unwrap(), &Value::from("checkerboard"));
//! ```

mod command;
mod error;
mod params;
mod resolve;
mod schema;
mod spec;
mod types;
mod usage;
mod value;

pub use command::{BASE_COMMAND, CommandId, CommandSet, CommandType};
pub use error::{AccessError, DeclarationError, ExpectedCount, ResolveError};
pub use params::{Invocation, ResolvedParams};
pub use resolve::{resolve_arguments, resolve_options};
pub use schema::{CommandBuilder, OptionTable, Schema};
pub use spec::{ArgumentSpec, DefaultValue, OptionSpec, ParameterSpec, hyphenate};
pub use types::{TypeDef, TypeRegistry, TypeTag};
pub use usage::{argument_label, option_label, render_usage};
pub use value::{Value, ValueKind};
