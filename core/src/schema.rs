//! Per-command-type schemas and the declaration-time builder.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::DeclarationError;
use crate::spec::{ArgumentSpec, OptionSpec, ParameterSpec};
use crate::types::TypeRegistry;

/// Effective option table: option name to spec, in merge order.
pub type OptionTable<'a> = IndexMap<&'a str, &'a OptionSpec>;

/// The parameters declared directly on one command type.
///
/// Never populated by inheritance; see
/// [`CommandSet::effective_arguments`](crate::CommandSet::effective_arguments)
/// and [`CommandSet::effective_options`](crate::CommandSet::effective_options)
/// for the inherited view.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    arguments: Vec<ArgumentSpec>,
    options: IndexMap<String, OptionSpec>,
}

impl Schema {
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn options(&self) -> &IndexMap<String, OptionSpec> {
        &self.options
    }

    pub fn variadic_argument(&self) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|arg| arg.variadic)
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.options.is_empty()
    }
}

/// Declares parameters on one concrete command type.
///
/// Obtained from [`CommandSet::declare`](crate::CommandSet::declare), which
/// refuses abstract types. Each declaration checks its type tag against the
/// set's registry.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
///
/// let mut commands = CommandSet::new();
/// let convert = commands.add_command("convert", None).unwrap();
/// commands
///     .declare(convert)
///     .unwrap()
///     .argument(ArgumentSpec::new("input").required())
///     .unwrap()
///     .variadic(ArgumentSpec::new("sizes"))
///     .unwrap()
///     .option(OptionSpec::new("verbose").with_type(TypeTag::Boolean))
///     .unwrap();
///
/// let err = commands
///     .declare(convert)
///     .unwrap()
///     .variadic(ArgumentSpec::new("more"))
///     .unwrap_err();
/// assert_eq!(err, DeclarationError::DuplicateVariadic { existing: "sizes".into() });
/// ```
#[derive(Debug)]
pub struct CommandBuilder<'a> {
    command: &'a str,
    schema: &'a mut Schema,
    types: &'a TypeRegistry,
}

impl<'a> CommandBuilder<'a> {
    pub(crate) fn new(command: &'a str, schema: &'a mut Schema, types: &'a TypeRegistry) -> Self {
        Self {
            command,
            schema,
            types,
        }
    }

    /// Appends a positional argument.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::DuplicateVariadic`] if `spec` is variadic and this
    /// type already declares a variadic argument (ancestors are not
    /// consulted), [`DeclarationError::DuplicateArgument`] for a repeated
    /// name, [`DeclarationError::UnknownType`] for an unregistered tag.
    pub fn argument(&mut self, spec: ArgumentSpec) -> Result<&mut Self, DeclarationError> {
        self.check_type(&spec)?;
        if spec.variadic {
            if let Some(existing) = self.schema.variadic_argument() {
                return Err(DeclarationError::DuplicateVariadic {
                    existing: existing.name.clone(),
                });
            }
        }
        if self.schema.arguments.iter().any(|arg| arg.name == spec.name) {
            return Err(DeclarationError::DuplicateArgument(spec.name));
        }

        debug!(command = self.command, argument = %spec.name, variadic = spec.variadic, "Declared argument");
        self.schema.arguments.push(spec);
        Ok(self)
    }

    /// Declares `spec` as the variadic argument.
    pub fn variadic(&mut self, spec: ArgumentSpec) -> Result<&mut Self, DeclarationError> {
        self.argument(spec.variadic())
    }

    /// Inserts a named option; re-declaring a name on the same type replaces
    /// the earlier spec in place.
    pub fn option(&mut self, spec: OptionSpec) -> Result<&mut Self, DeclarationError> {
        self.check_type(&spec)?;
        debug!(command = self.command, option = %spec.name, "Declared option");
        self.schema.options.insert(spec.name.clone(), spec);
        Ok(self)
    }

    fn check_type<S: ParameterSpec>(&self, spec: &S) -> Result<(), DeclarationError> {
        if self.types.lookup(spec.type_tag()).is_none() {
            return Err(DeclarationError::UnknownType {
                name: spec.name().to_string(),
                type_name: spec.type_tag().to_string(),
            });
        }
        Ok(())
    }
}
