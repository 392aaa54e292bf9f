//! Raw invocations and resolved parameter sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::schema::OptionTable;
use crate::spec::{ArgumentSpec, ParameterSpec};
use crate::value::Value;

/// Already-tokenized raw input: positional values plus keyed option values.
///
/// # Examples
///
/// ```
/// use command_params_core::{Invocation, Value};
///
/// let invocation: Invocation =
///     serde_json::from_str(r#"{"arguments": [1, "x"], "options": {"verbose": true}}"#).unwrap();
/// assert_eq!(invocation.arguments, vec![Value::from(1), Value::from("x")]);
/// assert_eq!(invocation.options["verbose"], Value::Bool(true));
///
/// let empty: Invocation = serde_json::from_str("{}").unwrap();
/// assert!(empty.arguments.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
}

impl Invocation {
    pub fn new(arguments: Vec<Value>) -> Self {
        Self {
            arguments,
            options: IndexMap::new(),
        }
    }

    pub fn with_option(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.options.insert(name.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Accessors {
    value: bool,
    predicate: bool,
}

impl Accessors {
    fn of<S: ParameterSpec + ?Sized>(spec: &S) -> Self {
        Self {
            value: spec.has_accessor(),
            predicate: spec.has_predicate(),
        }
    }
}

/// Fully resolved parameters of one invocation.
///
/// Beyond plain lookup with [`get`](Self::get), the set exposes the
/// accessors synthesized from each spec: [`value`](Self::value) for
/// non-boolean specs and [`is_set`](Self::is_set) for boolean specs, unless
/// the spec forced either on or off.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
///
/// let mut commands = CommandSet::new();
/// let run = commands.add_command("run", None).unwrap();
/// commands.declare(run).unwrap()
///     .argument(ArgumentSpec::new("script").with_predicate(true)).unwrap()
///     .option(OptionSpec::new("watch").with_type(TypeTag::Boolean)).unwrap();
///
/// let params = commands
///     .resolve(run, &Invocation::new(vec!["main.rs".into()]).with_option("watch", true))
///     .unwrap();
/// assert_eq!(params.value("script").unwrap(), &Value::from("main.rs"));
/// assert!(params.is_set("script").unwrap());
/// assert!(params.is_set("watch").unwrap());
/// assert!(matches!(params.value("watch"), Err(AccessError::NoAccessor(_))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedParams {
    arguments: IndexMap<String, Value>,
    options: IndexMap<String, Value>,
    #[serde(skip)]
    accessors: IndexMap<String, Accessors>,
}

impl ResolvedParams {
    pub(crate) fn new(
        arguments: IndexMap<String, Value>,
        options: IndexMap<String, Value>,
        argument_specs: &[ArgumentSpec],
        option_specs: &OptionTable<'_>,
    ) -> Self {
        let mut accessors = IndexMap::new();
        for spec in argument_specs {
            accessors.insert(spec.name.clone(), Accessors::of(spec));
        }
        for (name, spec) in option_specs {
            accessors.insert(name.to_string(), Accessors::of(*spec));
        }
        Self {
            arguments,
            options,
            accessors,
        }
    }

    /// Resolved positional arguments, in spec order.
    pub fn arguments(&self) -> &IndexMap<String, Value> {
        &self.arguments
    }

    /// Resolved options, in effective-table order.
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    /// Generic lookup by name; options shadow same-named arguments.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name).or_else(|| self.arguments.get(name))
    }

    /// Value accessor synthesized for `name`.
    pub fn value(&self, name: &str) -> Result<&Value, AccessError> {
        let accessors = self.accessors(name)?;
        if !accessors.value {
            return Err(AccessError::NoAccessor(name.to_string()));
        }
        self.get(name)
            .ok_or_else(|| AccessError::Missing(name.to_string()))
    }

    /// Presence predicate synthesized for `name`: true for `true` and for
    /// any other value that is truthy and non-empty.
    pub fn is_set(&self, name: &str) -> Result<bool, AccessError> {
        let accessors = self.accessors(name)?;
        if !accessors.predicate {
            return Err(AccessError::NoPredicate(name.to_string()));
        }
        Ok(self.get(name).is_some_and(Value::is_present))
    }

    fn accessors(&self, name: &str) -> Result<Accessors, AccessError> {
        self.accessors
            .get(name)
            .copied()
            .ok_or_else(|| AccessError::Missing(name.to_string()))
    }

    /// JSON form: `{"arguments": {...}, "options": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "arguments": self.arguments,
            "options": self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::OptionSpec;
    use crate::types::TypeTag;

    fn params() -> ResolvedParams {
        let input = ArgumentSpec::new("input");
        let tags = ArgumentSpec::new("tags").variadic().with_predicate(true);
        let force = OptionSpec::new("force").with_type(TypeTag::Boolean);
        let name = OptionSpec::new("name").with_accessor(false);
        let mut table = OptionTable::new();
        table.insert("force", &force);
        table.insert("name", &name);

        let mut arguments = IndexMap::new();
        arguments.insert("input".to_string(), Value::from("a.png"));
        arguments.insert("tags".to_string(), Value::Array(Vec::new()));
        let mut options = IndexMap::new();
        options.insert("force".to_string(), Value::Bool(false));
        options.insert("name".to_string(), Value::from("n"));

        ResolvedParams::new(arguments, options, &[input, tags], &table)
    }

    #[test]
    fn test_value_accessor_default_for_non_boolean() {
        let params = params();
        assert_eq!(params.value("input").unwrap(), &Value::from("a.png"));
        assert_eq!(
            params.is_set("input").unwrap_err(),
            AccessError::NoPredicate("input".into())
        );
    }

    #[test]
    fn test_boolean_predicate_and_no_accessor() {
        let params = params();
        assert!(!params.is_set("force").unwrap());
        assert_eq!(
            params.value("force").unwrap_err(),
            AccessError::NoAccessor("force".into())
        );
    }

    #[test]
    fn test_forced_predicate_uses_presence() {
        let params = params();
        assert!(!params.is_set("tags").unwrap());
        assert_eq!(params.value("tags").unwrap(), &Value::Array(Vec::new()));
    }

    #[test]
    fn test_disabled_accessor_still_reachable_by_get() {
        let params = params();
        assert!(params.value("name").is_err());
        assert_eq!(params.get("name"), Some(&Value::from("n")));
    }

    #[test]
    fn test_missing_parameter() {
        let params = params();
        assert_eq!(
            params.value("nope").unwrap_err(),
            AccessError::Missing("nope".into())
        );
        assert_eq!(params.get("nope"), None);
    }

    #[test]
    fn test_to_json() {
        let json = params().to_json();
        assert_eq!(json["arguments"]["input"], "a.png");
        assert_eq!(json["options"]["force"], false);
    }
}
