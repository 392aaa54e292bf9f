//! Parameter specs: declarative descriptions of one argument or option.
//!
//! Specs are built with chained `with_*` methods and are immutable once
//! handed to a [`CommandBuilder`](crate::CommandBuilder).

use std::fmt;
use std::sync::Arc;

use crate::types::TypeTag;
use crate::value::Value;

/// Default applied when a parameter's raw value is blank.
///
/// Lazy providers are invoked every time a default is needed; their result
/// is never cached.
///
/// # Examples
///
/// ```
/// use command_params_core::{DefaultValue, Value};
///
/// let fixed = DefaultValue::from("circle");
/// assert_eq!(fixed.produce(), Value::from("circle"));
///
/// let lazy = DefaultValue::lazy(|| Value::from(std::process::id() as i64));
/// assert!(matches!(lazy.produce(), Value::Integer(_)));
/// ```
#[derive(Clone)]
pub enum DefaultValue {
    Static(Value),
    Lazy(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn lazy(provider: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultValue::Lazy(Arc::new(provider))
    }

    /// Returns the default, invoking the provider for lazy defaults.
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Static(value) => value.clone(),
            DefaultValue::Lazy(provider) => provider(),
        }
    }
}

macro_rules! static_default_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DefaultValue {
                fn from(value: $ty) -> Self {
                    DefaultValue::Static(value.into())
                }
            }
        )*
    };
}

static_default_from!(Value, bool, i64, i32, f64, &str, String, Vec<Value>);

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultValue::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Fields shared by argument and option specs, as seen by resolution.
pub trait ParameterSpec {
    fn name(&self) -> &str;
    fn type_tag(&self) -> &TypeTag;
    fn is_required(&self) -> bool;
    fn default_value(&self) -> Option<&DefaultValue>;
    fn is_variadic(&self) -> bool {
        false
    }
    fn accessor_override(&self) -> Option<bool>;
    fn predicate_override(&self) -> Option<bool>;

    /// Whether a value accessor is synthesized: every non-boolean spec by
    /// default.
    fn has_accessor(&self) -> bool {
        self.accessor_override().unwrap_or(!self.type_tag().is_boolean())
    }

    /// Whether a presence predicate is synthesized: boolean specs by default.
    fn has_predicate(&self) -> bool {
        self.predicate_override().unwrap_or(self.type_tag().is_boolean())
    }
}

macro_rules! common_builders {
    () => {
        pub fn with_type(mut self, type_tag: TypeTag) -> Self {
            self.type_tag = type_tag;
            self
        }

        pub fn required(mut self) -> Self {
            self.required = true;
            self
        }

        pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
            self.default = Some(default.into());
            self
        }

        pub fn with_lazy_default(
            mut self,
            provider: impl Fn() -> Value + Send + Sync + 'static,
        ) -> Self {
            self.default = Some(DefaultValue::lazy(provider));
            self
        }

        pub fn with_display_hint(mut self, hint: &str) -> Self {
            self.display_hint = Some(hint.to_string());
            self
        }

        pub fn with_description(mut self, desc: &str) -> Self {
            self.description = Some(desc.to_string());
            self
        }

        /// Forces the value accessor on or off.
        pub fn with_accessor(mut self, enabled: bool) -> Self {
            self.accessor = Some(enabled);
            self
        }

        /// Forces the presence predicate on or off.
        pub fn with_predicate(mut self, enabled: bool) -> Self {
            self.predicate = Some(enabled);
            self
        }
    };
}

macro_rules! impl_parameter_spec {
    ($ty:ty, variadic: $variadic:expr) => {
        impl ParameterSpec for $ty {
            fn name(&self) -> &str {
                &self.name
            }
            fn type_tag(&self) -> &TypeTag {
                &self.type_tag
            }
            fn is_required(&self) -> bool {
                self.required
            }
            fn default_value(&self) -> Option<&DefaultValue> {
                self.default.as_ref()
            }
            fn is_variadic(&self) -> bool {
                ($variadic)(self)
            }
            fn accessor_override(&self) -> Option<bool> {
                self.accessor
            }
            fn predicate_override(&self) -> Option<bool> {
                self.predicate
            }
        }
    };
}

/// Spec for one positional argument.
///
/// # Examples
///
/// ```
/// use command_params_core::{ArgumentSpec, ParameterSpec, TypeTag};
///
/// let color = ArgumentSpec::new("color").with_type(TypeTag::from_name("integer"));
/// assert!(!color.required);
/// assert!(color.has_accessor());
///
/// let sizes = ArgumentSpec::new("sizes").variadic().required();
/// assert!(sizes.variadic && sizes.required);
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub name: String,
    pub type_tag: TypeTag,
    pub required: bool,
    pub default: Option<DefaultValue>,
    /// Label used in usage text (defaults to the upper-cased name).
    pub display_hint: Option<String>,
    pub description: Option<String>,
    /// Absorbs the variable-length middle slice of positional values.
    pub variadic: bool,
    pub accessor: Option<bool>,
    pub predicate: Option<bool>,
}

impl ArgumentSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_tag: TypeTag::default(),
            required: false,
            default: None,
            display_hint: None,
            description: None,
            variadic: false,
            accessor: None,
            predicate: None,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    common_builders!();
}

impl_parameter_spec!(ArgumentSpec, variadic: |spec: &ArgumentSpec| spec.variadic);

/// Spec for one named option.
///
/// # Examples
///
/// ```
/// use command_params_core::{OptionSpec, ParameterSpec, TypeTag};
///
/// let dry_run = OptionSpec::new("dry_run")
///     .with_type(TypeTag::Boolean)
///     .with_alias("n");
/// assert_eq!(dry_run.aliases, vec!["n"]);
/// assert!(dry_run.has_predicate());
/// assert!(!dry_run.has_accessor());
/// assert_eq!(dry_run.flag_name(), "dry-run");
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: String,
    pub type_tag: TypeTag,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub display_hint: Option<String>,
    pub description: Option<String>,
    /// Short external flag names, hyphen-cased.
    pub aliases: Vec<String>,
    pub accessor: Option<bool>,
    pub predicate: Option<bool>,
}

impl OptionSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_tag: TypeTag::default(),
            required: false,
            default: None,
            display_hint: None,
            description: None,
            aliases: Vec::new(),
            accessor: None,
            predicate: None,
        }
    }

    /// Adds an external alias, normalized with [`hyphenate`].
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(hyphenate(alias));
        self
    }

    /// External flag name of the option itself.
    pub fn flag_name(&self) -> String {
        hyphenate(&self.name)
    }

    /// Returns `true` if `key` names this option, by name, flag name or
    /// alias. Leading dashes on `key` are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_params_core::OptionSpec;
    ///
    /// let opt = OptionSpec::new("dry_run").with_alias("n");
    /// assert!(opt.matches("dry_run"));
    /// assert!(opt.matches("--dry-run"));
    /// assert!(opt.matches("-n"));
    /// assert!(!opt.matches("dry"));
    /// ```
    pub fn matches(&self, key: &str) -> bool {
        if key == self.name {
            return true;
        }
        let key = hyphenate(key);
        key == self.flag_name() || self.aliases.iter().any(|alias| *alias == key)
    }

    common_builders!();
}

impl_parameter_spec!(OptionSpec, variadic: |_: &OptionSpec| false);

/// Normalizes an external flag name: strips leading dashes and converts
/// underscores to hyphens.
pub fn hyphenate(name: &str) -> String {
    name.trim_start_matches('-').replace('_', "-")
}
