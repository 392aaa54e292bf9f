//! Error types for declaration, resolution and parameter access.

use std::fmt;

use thiserror::Error;

/// Expected positional count reported by [`ResolveError::ExtraArguments`].
///
/// # Examples
///
/// ```
/// use command_params_core::ExpectedCount;
///
/// assert_eq!(ExpectedCount::Exact(3).to_string(), "3");
/// assert_eq!(ExpectedCount::Range(0, 3).to_string(), "0..3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedCount {
    Exact(usize),
    /// Inclusive `min..max`.
    Range(usize, usize),
}

impl fmt::Display for ExpectedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedCount::Exact(n) => write!(f, "{n}"),
            ExpectedCount::Range(min, max) => write!(f, "{min}..{max}"),
        }
    }
}

/// Failure to resolve a raw invocation against an effective schema.
///
/// Every variant aborts the whole resolution call; no partial result is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A non-variadic schema received more positional values than specs.
    #[error("too many arguments: given {given}, expected {expected}")]
    ExtraArguments {
        given: usize,
        expected: ExpectedCount,
    },
    /// A positional spec failed validation.
    #[error("invalid argument {name}: expected {expected}, received {received}")]
    InvalidArgument {
        name: String,
        expected: String,
        received: String,
    },
    /// A named spec failed validation.
    #[error("invalid option :{name}: expected {expected}, received {received}")]
    InvalidOption {
        name: String,
        expected: String,
        received: String,
    },
    /// The raw option map contains keys absent from the effective table.
    #[error("{}", unknown_options_message(.names, .owner, .valid))]
    UnknownOption {
        names: Vec<String>,
        owner: String,
        valid: Vec<String>,
    },
    /// A spec names a type tag the registry does not know.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// No command type with this name exists.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

fn unknown_options_message(names: &[String], owner: &str, valid: &[String]) -> String {
    let noun = if names.len() == 1 { "option" } else { "options" };
    let listed = symbol_list(names);
    let mut message = format!("unknown {noun} {listed} for {owner}");
    if !valid.is_empty() {
        message.push_str(&format!(" (valid options: {})", symbol_list(valid)));
    }
    message
}

fn symbol_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!(":{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure while declaring command types or their parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A second variadic argument was declared on the same command type.
    #[error("variadic argument `{existing}` already defined")]
    DuplicateVariadic { existing: String },
    #[error("argument `{0}` already defined")]
    DuplicateArgument(String),
    /// Parameters cannot be declared on abstract command types.
    #[error("cannot declare parameters on abstract command type {0}")]
    AbstractCommand(String),
    #[error("parameter `{name}` has unknown type `{type_name}`")]
    UnknownType { name: String, type_name: String },
    #[error("duplicate command type: {0}")]
    DuplicateCommand(String),
    #[error("unknown command type: {0}")]
    UnknownCommand(String),
}

/// Failure to read a parameter from a resolved set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no parameter named `{0}`")]
    Missing(String),
    #[error("parameter `{0}` has no value accessor")]
    NoAccessor(String),
    #[error("parameter `{0}` has no presence predicate")]
    NoPredicate(String),
}
