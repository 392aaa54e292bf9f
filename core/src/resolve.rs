//! Resolution of raw invocations against effective schemas.
//!
//! Every spec goes through the same linear pipeline: blank values are
//! replaced by the spec's default, bare tokens are normalized to strings,
//! absent optional values short-circuit, and whatever is left is validated
//! against the type registry. The first failing spec aborts the call.
//!
//! # Examples
//!
//! ```
//! use command_params_core::*;
//!
//! let specs = vec![
//!     ArgumentSpec::new("sizes").variadic(),
//!     ArgumentSpec::new("transparency").with_type(TypeTag::Boolean),
//!     ArgumentSpec::new("background"),
//! ];
//! let raw: Vec<Value> = vec![
//!     "small".into(), "medium".into(), "large".into(), true.into(), "checkerboard".into(),
//! ];
//!
//! let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
//! assert_eq!(resolved["sizes"].to_string(), r#"["small", "medium", "large"]"#);
//! assert_eq!(resolved["transparency"], Value::Bool(true));
//! assert_eq!(resolved["background"], Value::from("checkerboard"));
//! ```

use indexmap::IndexMap;

use crate::error::{ExpectedCount, ResolveError};
use crate::schema::OptionTable;
use crate::spec::{ArgumentSpec, DefaultValue, ParameterSpec};
use crate::types::{TypeDef, TypeRegistry};
use crate::value::Value;

/// Why a single spec failed, before it is attributed to an argument or option.
enum Failure {
    Mismatch { expected: String, received: String },
    UnknownType(String),
}

impl Failure {
    fn into_argument_error(self, name: &str) -> ResolveError {
        match self {
            Failure::Mismatch { expected, received } => ResolveError::InvalidArgument {
                name: name.to_string(),
                expected,
                received,
            },
            Failure::UnknownType(tag) => ResolveError::UnknownType(tag),
        }
    }

    fn into_option_error(self, name: &str) -> ResolveError {
        match self {
            Failure::Mismatch { expected, received } => ResolveError::InvalidOption {
                name: name.to_string(),
                expected,
                received,
            },
            Failure::UnknownType(tag) => ResolveError::UnknownType(tag),
        }
    }
}

/// Resolves positional values against an ordered argument list.
///
/// Without a variadic spec, more values than specs fail with
/// [`ResolveError::ExtraArguments`] and missing trailing values are absent.
/// With a variadic spec, the specs before it are filled from the front, the
/// specs after it from the back, and the variadic spec receives the middle
/// slice; such a schema never rejects on count.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
///
/// let specs = vec![
///     ArgumentSpec::new("color").with_type(TypeTag::from_name("integer")),
///     ArgumentSpec::new("shape").with_default("circle"),
///     ArgumentSpec::new("size"),
/// ];
/// let types = TypeRegistry::default();
///
/// let resolved = resolve_arguments(&specs, &[], &types).unwrap();
/// assert_eq!(resolved["color"], Value::Nil);
/// assert_eq!(resolved["shape"], Value::from("circle"));
///
/// let raw: Vec<Value> = vec![0xff3366.into(), "triangle".into(), "medium".into(), "extra".into()];
/// let err = resolve_arguments(&specs, &raw, &types).unwrap_err();
/// assert_eq!(err.to_string(), "too many arguments: given 4, expected 0..3");
/// ```
pub fn resolve_arguments(
    specs: &[ArgumentSpec],
    raw: &[Value],
    types: &TypeRegistry,
) -> Result<IndexMap<String, Value>, ResolveError> {
    let mut resolved = IndexMap::with_capacity(specs.len());

    let Some(index) = specs.iter().position(|spec| spec.variadic) else {
        if raw.len() > specs.len() {
            return Err(ResolveError::ExtraArguments {
                given: raw.len(),
                expected: expected_count(specs),
            });
        }
        resolve_positional(specs, raw, 0, types, &mut resolved)?;
        return Ok(resolved);
    };

    let (before, rest) = specs.split_at(index);
    let variadic = &rest[0];
    let after = &rest[1..];

    let (head, remaining) = raw.split_at(before.len().min(raw.len()));
    resolve_positional(before, head, 0, types, &mut resolved)?;

    let extra = remaining.len().saturating_sub(after.len());
    let (payload, tail) = remaining.split_at(extra);

    let payload = Value::Array(payload.to_vec());
    let value = resolve_value(variadic, Some(&payload), types)
        .map_err(|failure| failure.into_argument_error(&variadic.name))?;
    resolved.insert(variadic.name.clone(), value);

    // Right-anchored: missing values are absent at the front of `after`.
    let padding = after.len() - tail.len();
    resolve_positional(after, tail, padding, types, &mut resolved)?;

    Ok(resolved)
}

/// Resolves `specs` positionally, with `values[0]` feeding `specs[offset]`.
fn resolve_positional(
    specs: &[ArgumentSpec],
    values: &[Value],
    offset: usize,
    types: &TypeRegistry,
    resolved: &mut IndexMap<String, Value>,
) -> Result<(), ResolveError> {
    for (i, spec) in specs.iter().enumerate() {
        let raw = i.checked_sub(offset).and_then(|j| values.get(j));
        let value = resolve_value(spec, raw, types)
            .map_err(|failure| failure.into_argument_error(&spec.name))?;
        resolved.insert(spec.name.clone(), value);
    }
    Ok(())
}

/// Expected count for a non-variadic schema: exact when the last spec is
/// required, otherwise `last_required..n`.
fn expected_count(specs: &[ArgumentSpec]) -> ExpectedCount {
    let n = specs.len();
    let last_required = specs
        .iter()
        .rposition(|spec| spec.required)
        .map_or(0, |i| i + 1);
    if last_required == n {
        ExpectedCount::Exact(n)
    } else {
        ExpectedCount::Range(last_required, n)
    }
}

/// Resolves a raw option map against an effective option table.
///
/// Keys absent from the table fail with [`ResolveError::UnknownOption`];
/// every spec in the table is resolved, supplied or not.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
/// use indexmap::IndexMap;
///
/// let verbose = OptionSpec::new("verbose").with_type(TypeTag::Boolean);
/// let mut table = OptionTable::new();
/// table.insert("verbose", &verbose);
///
/// let resolved = resolve_options("build", &table, &IndexMap::new(), &TypeRegistry::default()).unwrap();
/// assert_eq!(resolved["verbose"], Value::Bool(false));
///
/// let mut raw = IndexMap::new();
/// raw.insert("quiet".to_string(), Value::Bool(true));
/// let err = resolve_options("build", &table, &raw, &TypeRegistry::default()).unwrap_err();
/// assert_eq!(err.to_string(), "unknown option :quiet for build (valid options: :verbose)");
/// ```
pub fn resolve_options(
    owner: &str,
    specs: &OptionTable<'_>,
    raw: &IndexMap<String, Value>,
    types: &TypeRegistry,
) -> Result<IndexMap<String, Value>, ResolveError> {
    let unknown: Vec<String> = raw
        .keys()
        .filter(|key| !specs.contains_key(key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        let mut valid: Vec<String> = specs.keys().map(|name| name.to_string()).collect();
        valid.sort();
        return Err(ResolveError::UnknownOption {
            names: unknown,
            owner: owner.to_string(),
            valid,
        });
    }

    let mut resolved = IndexMap::with_capacity(specs.len());
    for (name, spec) in specs {
        let value = resolve_value(*spec, raw.get(*name), types)
            .map_err(|failure| failure.into_option_error(name))?;
        resolved.insert(name.to_string(), value);
    }
    Ok(resolved)
}

fn resolve_value<S: ParameterSpec + ?Sized>(
    spec: &S,
    raw: Option<&Value>,
    types: &TypeRegistry,
) -> Result<Value, Failure> {
    let mut value = raw.cloned().unwrap_or_default();
    if value.is_blank() {
        value = spec
            .default_value()
            .map(DefaultValue::produce)
            .unwrap_or_default();
    }

    let boolean = spec.type_tag().is_boolean();
    let variadic = spec.is_variadic();
    if !boolean && !variadic {
        value = value.normalize_token();
    }

    if value.is_nil() && !spec.is_required() {
        return Ok(if boolean {
            Value::Bool(false)
        } else {
            Value::Nil
        });
    }

    let def = types
        .lookup(spec.type_tag())
        .ok_or_else(|| Failure::UnknownType(spec.type_tag().to_string()))?;

    if variadic {
        return resolve_collection(spec.is_required(), value, &def);
    }

    if def.accepts(&value) {
        Ok(value)
    } else {
        Err(Failure::Mismatch {
            expected: def.description().to_string(),
            received: value.to_string(),
        })
    }
}

/// Validates every element of a variadic value with the scalar predicate.
fn resolve_collection(required: bool, value: Value, def: &TypeDef) -> Result<Value, Failure> {
    let expected = if required {
        format!("a non-empty collection of {}", def.description())
    } else {
        format!("a collection of {}", def.description())
    };

    let items = match value {
        Value::Nil => Vec::new(),
        Value::Array(items) => items,
        other => {
            return Err(Failure::Mismatch {
                expected,
                received: other.to_string(),
            });
        }
    };

    if (required && items.is_empty()) || !items.iter().all(|item| def.accepts(item)) {
        return Err(Failure::Mismatch {
            expected,
            received: Value::Array(items).to_string(),
        });
    }
    Ok(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::OptionSpec;
    use crate::types::TypeTag;

    fn integer() -> TypeTag {
        TypeTag::from_name("integer")
    }

    fn values(items: &[Value]) -> Vec<Value> {
        items.to_vec()
    }

    fn optional_shape_specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::new("color").with_type(integer()),
            ArgumentSpec::new("shape").with_default("circle"),
            ArgumentSpec::new("size"),
        ]
    }

    #[test]
    fn test_optional_arguments_default_and_absent() {
        let resolved =
            resolve_arguments(&optional_shape_specs(), &[], &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["color"], Value::Nil);
        assert_eq!(resolved["shape"], Value::from("circle"));
        assert_eq!(resolved["size"], Value::Nil);
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec!["color", "shape", "size"]
        );
    }

    #[test]
    fn test_optional_arguments_all_supplied() {
        let raw = values(&[0xff3366.into(), "triangle".into(), "medium".into()]);
        let resolved =
            resolve_arguments(&optional_shape_specs(), &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["color"], Value::Integer(0xff3366));
        assert_eq!(resolved["shape"], Value::from("triangle"));
        assert_eq!(resolved["size"], Value::from("medium"));
    }

    #[test]
    fn test_optional_arguments_too_many() {
        let raw = values(&[
            0xff3366.into(),
            "triangle".into(),
            "medium".into(),
            "extra".into(),
            "last".into(),
        ]);
        let err =
            resolve_arguments(&optional_shape_specs(), &raw, &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ExtraArguments {
                given: 5,
                expected: ExpectedCount::Range(0, 3),
            }
        );
        assert!(err.to_string().contains("given 5, expected 0..3"));
    }

    #[test]
    fn test_expected_count_exact_when_last_required() {
        let specs = vec![
            ArgumentSpec::new("src").required(),
            ArgumentSpec::new("dest").required(),
        ];
        let raw = values(&["a".into(), "b".into(), "c".into()]);
        let err = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ExtraArguments {
                given: 3,
                expected: ExpectedCount::Exact(2),
            }
        );
    }

    #[test]
    fn test_expected_count_range_from_required_prefix() {
        let specs = vec![
            ArgumentSpec::new("src").required(),
            ArgumentSpec::new("dest"),
            ArgumentSpec::new("mode"),
        ];
        let raw = values(&["a".into(), "b".into(), "c".into(), "d".into()]);
        let err = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap_err();
        assert_eq!(err.to_string(), "too many arguments: given 4, expected 1..3");
    }

    #[test]
    fn test_missing_required_argument_is_invalid() {
        let specs = vec![ArgumentSpec::new("file").required()];
        let err = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidArgument {
                name: "file".into(),
                expected: "an instance of String".into(),
                received: "nil".into(),
            }
        );
    }

    #[test]
    fn test_required_argument_satisfied_by_default() {
        let specs = vec![ArgumentSpec::new("file").required().with_default("out.png")];
        let resolved = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["file"], Value::from("out.png"));
    }

    #[test]
    fn test_empty_string_is_blank_and_defaulted() {
        let specs = vec![ArgumentSpec::new("shape").with_default("circle")];
        let resolved =
            resolve_arguments(&specs, &values(&["".into()]), &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["shape"], Value::from("circle"));
    }

    #[test]
    fn test_symbol_normalized_to_string() {
        let specs = vec![ArgumentSpec::new("shape")];
        let resolved = resolve_arguments(
            &specs,
            &values(&[Value::symbol("square")]),
            &TypeRegistry::default(),
        )
        .unwrap();
        assert_eq!(resolved["shape"], Value::from("square"));
    }

    #[test]
    fn test_symbol_not_normalized_for_boolean() {
        let specs = vec![ArgumentSpec::new("flag").with_type(TypeTag::Boolean)];
        let err = resolve_arguments(
            &specs,
            &values(&[Value::symbol("yes")]),
            &TypeRegistry::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument flag: expected true or false, received :yes"
        );
    }

    #[test]
    fn test_wrong_nominal_type_reports_value() {
        let specs = vec![ArgumentSpec::new("color").with_type(integer())];
        let err = resolve_arguments(
            &specs,
            &values(&["red".into()]),
            &TypeRegistry::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument color: expected an instance of Integer, received \"red\""
        );
    }

    #[test]
    fn test_absent_optional_boolean_is_false() {
        let specs = vec![ArgumentSpec::new("force").with_type(TypeTag::Boolean)];
        let resolved = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["force"], Value::Bool(false));
    }

    #[test]
    fn test_absent_optional_boolean_variadic_is_false() {
        let specs = vec![ArgumentSpec::new("flags").variadic().with_type(TypeTag::Boolean)];
        let resolved = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["flags"], Value::Bool(false));
    }

    #[test]
    fn test_variadic_with_trailing_specs() {
        let specs = vec![
            ArgumentSpec::new("sizes").variadic(),
            ArgumentSpec::new("transparency").with_type(TypeTag::Boolean),
            ArgumentSpec::new("background"),
        ];
        let raw = values(&[
            "small".into(),
            "medium".into(),
            "large".into(),
            true.into(),
            "checkerboard".into(),
        ]);
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(
            resolved["sizes"],
            Value::Array(values(&["small".into(), "medium".into(), "large".into()]))
        );
        assert_eq!(resolved["transparency"], Value::Bool(true));
        assert_eq!(resolved["background"], Value::from("checkerboard"));
    }

    #[test]
    fn test_variadic_between_leading_and_trailing() {
        let specs = vec![
            ArgumentSpec::new("command").required(),
            ArgumentSpec::new("args").variadic(),
            ArgumentSpec::new("target").required(),
        ];
        let raw = values(&["cp".into(), "a".into(), "b".into(), "dir".into()]);
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec!["command", "args", "target"]
        );
        assert_eq!(resolved["command"], Value::from("cp"));
        assert_eq!(resolved["args"], Value::Array(values(&["a".into(), "b".into()])));
        assert_eq!(resolved["target"], Value::from("dir"));
    }

    #[test]
    fn test_variadic_short_input_is_right_anchored() {
        let specs = vec![
            ArgumentSpec::new("sizes").variadic(),
            ArgumentSpec::new("first"),
            ArgumentSpec::new("second"),
        ];
        let raw = values(&["only".into()]);
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["sizes"], Value::Nil);
        assert_eq!(resolved["first"], Value::Nil);
        assert_eq!(resolved["second"], Value::from("only"));
    }

    #[test]
    fn test_variadic_partial_leading_specs() {
        let specs = vec![
            ArgumentSpec::new("a"),
            ArgumentSpec::new("b"),
            ArgumentSpec::new("sizes").variadic(),
            ArgumentSpec::new("c"),
        ];
        let raw = values(&["x".into()]);
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec!["a", "b", "sizes", "c"]
        );
        assert_eq!(resolved["a"], Value::from("x"));
        assert_eq!(resolved["b"], Value::Nil);
        assert_eq!(resolved["sizes"], Value::Nil);
        assert_eq!(resolved["c"], Value::Nil);
    }

    #[test]
    fn test_lazy_default_invoked_per_resolution() {
        use std::sync::atomic::{AtomicI64, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&calls);
        let specs = vec![
            ArgumentSpec::new("seq")
                .with_type(integer())
                .with_lazy_default(move || Value::from(counter.fetch_add(1, Ordering::SeqCst))),
        ];
        let types = TypeRegistry::default();

        let first = resolve_arguments(&specs, &[], &types).unwrap();
        let second = resolve_arguments(&specs, &[], &types).unwrap();
        assert_eq!(first["seq"], Value::Integer(0));
        assert_eq!(second["seq"], Value::Integer(1));

        let supplied = resolve_arguments(&specs, &values(&[7.into()]), &types).unwrap();
        assert_eq!(supplied["seq"], Value::Integer(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_variadic_never_rejects_on_count() {
        let specs = vec![ArgumentSpec::new("files").variadic()];
        let raw: Vec<Value> = (0..50).map(|i| Value::from(format!("f{i}"))).collect();
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["files"].as_array().map(<[Value]>::len), Some(50));
    }

    #[test]
    fn test_variadic_payload_keeps_symbols() {
        let specs = vec![ArgumentSpec::new("tokens").variadic().with_type(TypeTag::from_name("symbol"))];
        let raw = values(&[Value::symbol("a"), Value::symbol("b")]);
        let resolved = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(
            resolved["tokens"],
            Value::Array(vec![Value::symbol("a"), Value::symbol("b")])
        );
    }

    #[test]
    fn test_required_variadic_boolean_rejects_integers() {
        let specs = vec![
            ArgumentSpec::new("flags")
                .variadic()
                .required()
                .with_type(TypeTag::Boolean),
        ];
        let raw = values(&[0.into(), 1.into(), 2.into()]);
        let err = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument { .. }));
        assert!(
            err.to_string()
                .contains("expected a non-empty collection of true or false, received [0, 1, 2]")
        );
    }

    #[test]
    fn test_required_variadic_rejects_empty() {
        let specs = vec![ArgumentSpec::new("files").variadic().required()];
        let err = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument files: expected a non-empty collection of an instance of String, received []"
        );
    }

    #[test]
    fn test_optional_variadic_element_failure_message() {
        let specs = vec![ArgumentSpec::new("counts").variadic().with_type(integer())];
        let raw = values(&[1.into(), "two".into()]);
        let err = resolve_arguments(&specs, &raw, &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument counts: expected a collection of an instance of Integer, received [1, \"two\"]"
        );
    }

    #[test]
    fn test_variadic_default_applies_to_empty_payload() {
        let specs = vec![
            ArgumentSpec::new("files")
                .variadic()
                .with_default(vec![Value::from("-")]),
        ];
        let resolved = resolve_arguments(&specs, &[], &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["files"], Value::Array(vec![Value::from("-")]));
    }

    #[test]
    fn test_unknown_type_tag_reported() {
        let specs = vec![ArgumentSpec::new("id").with_type(TypeTag::from_name("uuid"))];
        let err = resolve_arguments(&specs, &values(&["x".into()]), &TypeRegistry::default())
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownType("uuid".into()));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let specs = optional_shape_specs();
        let raw = values(&[1.into()]);
        let types = TypeRegistry::default();
        let first = resolve_arguments(&specs, &raw, &types).unwrap();
        let second = resolve_arguments(&specs, &raw, &types).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_options_resolve_every_spec() {
        let level = OptionSpec::new("level").with_type(integer()).with_default(3);
        let name = OptionSpec::new("name");
        let mut table = OptionTable::new();
        table.insert("level", &level);
        table.insert("name", &name);

        let mut raw = IndexMap::new();
        raw.insert("name".to_string(), Value::symbol("fast"));
        let resolved = resolve_options("build", &table, &raw, &TypeRegistry::default()).unwrap();
        assert_eq!(resolved["level"], Value::from(3));
        assert_eq!(resolved["name"], Value::from("fast"));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_unknown_option_without_declared_options() {
        let table = OptionTable::new();
        let mut raw = IndexMap::new();
        raw.insert("unknown".to_string(), Value::from("value"));
        let err = resolve_options("ImageCommand", &table, &raw, &TypeRegistry::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown option :unknown for ImageCommand");
    }

    #[test]
    fn test_invalid_option_message() {
        let jobs = OptionSpec::new("jobs").with_type(integer());
        let mut table = OptionTable::new();
        table.insert("jobs", &jobs);
        let mut raw = IndexMap::new();
        raw.insert("jobs".to_string(), Value::from(2.5));
        let err = resolve_options("build", &table, &raw, &TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidOption {
                name: "jobs".into(),
                expected: "an instance of Integer".into(),
                received: "2.5".into(),
            }
        );
    }
}
