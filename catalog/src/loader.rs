//! Building a [`CommandSet`] from a [`Catalog`].

use command_params_core::{
    ArgumentSpec, CommandSet, DeclarationError, OptionSpec, TypeDef, TypeRegistry, TypeTag,
};

use crate::config::{ArgumentDecl, Catalog, CommandDecl, OptionDecl};
use crate::error::{CatalogError, Result};

impl Catalog {
    /// Builds a command set using the default type registry.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_params_catalog::Catalog;
    /// use command_params_core::{Invocation, Value};
    ///
    /// let catalog = Catalog::from_yaml_str(r#"
    /// version: "1.0"
    /// commands:
    ///   - name: greet
    ///     arguments:
    ///       - { name: who, default: world }
    /// "#).unwrap();
    /// let commands = catalog.build().unwrap();
    /// let params = commands.resolve_named("greet", &Invocation::default()).unwrap();
    /// assert_eq!(params.value("who").unwrap(), &Value::from("world"));
    /// ```
    pub fn build(&self) -> Result<CommandSet> {
        self.build_with_types(TypeRegistry::default())
    }

    /// Builds a command set on top of a caller-supplied registry.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownParent`] when a parent is not declared earlier
    /// in the catalog, [`CatalogError::Declaration`] when the core rejects a
    /// command or parameter (duplicate variadic, abstract type with
    /// parameters, unknown type tag, ...).
    pub fn build_with_types(&self, mut types: TypeRegistry) -> Result<CommandSet> {
        for decl in &self.types {
            let def = match &decl.description {
                Some(description) => {
                    let kind = decl.kind;
                    TypeDef::new(description.clone(), move |v| v.kind() == kind)
                }
                None => TypeDef::nominal(decl.kind),
            };
            types.register(decl.name.clone(), def);
        }

        let mut commands = CommandSet::with_types(types);
        for decl in &self.commands {
            declare_command(&mut commands, decl).map_err(|source| match source {
                DeclareFailure::Parent(parent) => CatalogError::UnknownParent {
                    command: decl.name.clone(),
                    parent,
                },
                DeclareFailure::Core(source) => CatalogError::Declaration {
                    command: decl.name.clone(),
                    source,
                },
            })?;
        }
        Ok(commands)
    }
}

enum DeclareFailure {
    Parent(String),
    Core(DeclarationError),
}

impl From<DeclarationError> for DeclareFailure {
    fn from(err: DeclarationError) -> Self {
        DeclareFailure::Core(err)
    }
}

fn declare_command(
    commands: &mut CommandSet,
    decl: &CommandDecl,
) -> std::result::Result<(), DeclareFailure> {
    let parent = match &decl.parent {
        Some(name) => Some(
            commands
                .find(name)
                .ok_or_else(|| DeclareFailure::Parent(name.clone()))?,
        ),
        None => None,
    };

    let id = if decl.is_abstract {
        commands.add_abstract(&decl.name, parent)?
    } else {
        commands.add_command(&decl.name, parent)?
    };
    if let Some(description) = &decl.description {
        commands.describe(id, description)?;
    }

    if decl.arguments.is_empty() && decl.options.is_empty() {
        return Ok(());
    }

    let mut builder = commands.declare(id)?;
    for argument in &decl.arguments {
        builder.argument(argument_spec(argument))?;
    }
    for option in &decl.options {
        builder.option(option_spec(option))?;
    }
    Ok(())
}

fn argument_spec(decl: &ArgumentDecl) -> ArgumentSpec {
    let mut spec = ArgumentSpec::new(&decl.name).with_type(TypeTag::from_name(&decl.type_name));
    spec.required = decl.required;
    spec.variadic = decl.variadic;
    spec.default = decl.default.clone().map(Into::into);
    spec.display_hint = decl.display_hint.clone();
    spec.description = decl.description.clone();
    spec.accessor = decl.accessor;
    spec.predicate = decl.predicate;
    spec
}

fn option_spec(decl: &OptionDecl) -> OptionSpec {
    let mut spec = OptionSpec::new(&decl.name).with_type(TypeTag::from_name(&decl.type_name));
    for alias in &decl.aliases {
        spec = spec.with_alias(alias);
    }
    spec.required = decl.required;
    spec.default = decl.default.clone().map(Into::into);
    spec.display_hint = decl.display_hint.clone();
    spec.description = decl.description.clone();
    spec.accessor = decl.accessor;
    spec.predicate = decl.predicate;
    spec
}
