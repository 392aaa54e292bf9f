//! Command-type hierarchy and effective-schema computation.
//!
//! A [`CommandSet`] is an arena of command types rooted at a shared abstract
//! base. Each type owns a [`Schema`]; what resolution actually uses is the
//! *effective* schema, computed on demand from the ancestry:
//!
//! - **Arguments are overridden, not merged.** A type that declares any
//!   argument replaces its ancestors' argument list wholesale; otherwise it
//!   inherits the nearest ancestor's list.
//! - **Options are merged, ancestor last.** Own options of each type from
//!   the type itself up to the root are folded into one table, and a
//!   same-named option from an ancestor replaces the descendant's spec.
//!
//! Both are pure reads; nothing is cached.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DeclarationError, ResolveError};
use crate::params::{Invocation, ResolvedParams};
use crate::resolve::{resolve_arguments, resolve_options};
use crate::schema::{CommandBuilder, OptionTable, Schema};
use crate::spec::ArgumentSpec;
use crate::types::TypeRegistry;
use crate::value::Value;

/// Name of the shared abstract base every [`CommandSet`] starts with.
pub const BASE_COMMAND: &str = "Command";

/// Index of a command type inside the [`CommandSet`] that issued it.
///
/// Ids are only meaningful for their own set. Declaration and resolution
/// entry points reject ids outside the set with `UnknownCommand`; the plain
/// accessors (`get`, `ancestry`, `effective_*`) panic on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(usize);

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One declared command type.
#[derive(Debug, Clone)]
pub struct CommandType {
    pub name: String,
    pub parent: Option<CommandId>,
    /// Abstract types cannot declare parameters.
    pub is_abstract: bool,
    pub description: Option<String>,
    schema: Schema,
}

impl CommandType {
    /// The parameters declared directly on this type.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Arena of command types with their schemas and the type registry used to
/// validate them.
///
/// `CommandSet` is `Send + Sync`; once declaration is finished it can be
/// shared across threads for resolution.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
///
/// let mut commands = CommandSet::new();
/// let image = commands.add_abstract("image", None).unwrap();
/// let convert = commands.add_command("image:convert", Some(image)).unwrap();
/// commands
///     .declare(convert)
///     .unwrap()
///     .argument(ArgumentSpec::new("color").with_type(TypeTag::from_name("integer")))
///     .unwrap()
///     .argument(ArgumentSpec::new("shape").with_default("circle"))
///     .unwrap()
///     .option(OptionSpec::new("verbose").with_type(TypeTag::Boolean))
///     .unwrap();
///
/// let params = commands
///     .resolve(convert, &Invocation::new(vec![Value::from(0xff3366)]))
///     .unwrap();
/// assert_eq!(params.value("shape").unwrap(), &Value::from("circle"));
/// assert!(!params.is_set("verbose").unwrap());
///
/// assert!(commands.declare(image).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CommandSet {
    types: TypeRegistry,
    commands: Vec<CommandType>,
    by_name: HashMap<String, CommandId>,
}

impl Default for CommandSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSet {
    /// Creates a set containing only the abstract base, with the default
    /// type registry.
    pub fn new() -> Self {
        Self::with_types(TypeRegistry::default())
    }

    pub fn with_types(types: TypeRegistry) -> Self {
        let base = CommandType {
            name: BASE_COMMAND.to_string(),
            parent: None,
            is_abstract: true,
            description: None,
            schema: Schema::default(),
        };
        let mut by_name = HashMap::new();
        by_name.insert(BASE_COMMAND.to_string(), CommandId(0));
        Self {
            types,
            commands: vec![base],
            by_name,
        }
    }

    pub fn base(&self) -> CommandId {
        CommandId(0)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable registry access, for registering type tags before
    /// declaration.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Adds a concrete command type. `parent` defaults to the base.
    pub fn add_command(
        &mut self,
        name: &str,
        parent: Option<CommandId>,
    ) -> Result<CommandId, DeclarationError> {
        self.add(name, parent, false)
    }

    /// Adds an abstract command type. `parent` defaults to the base.
    pub fn add_abstract(
        &mut self,
        name: &str,
        parent: Option<CommandId>,
    ) -> Result<CommandId, DeclarationError> {
        self.add(name, parent, true)
    }

    fn add(
        &mut self,
        name: &str,
        parent: Option<CommandId>,
        is_abstract: bool,
    ) -> Result<CommandId, DeclarationError> {
        if self.by_name.contains_key(name) {
            return Err(DeclarationError::DuplicateCommand(name.to_string()));
        }
        let parent = parent.unwrap_or(self.base());
        if parent.0 >= self.commands.len() {
            return Err(DeclarationError::UnknownCommand(parent.to_string()));
        }

        let id = CommandId(self.commands.len());
        self.commands.push(CommandType {
            name: name.to_string(),
            parent: Some(parent),
            is_abstract,
            description: None,
            schema: Schema::default(),
        });
        self.by_name.insert(name.to_string(), id);
        debug!(command = name, parent = %self.commands[parent.0].name, is_abstract, "Added command type");
        Ok(id)
    }

    /// Sets a command type's description.
    pub fn describe(&mut self, id: CommandId, description: &str) -> Result<(), DeclarationError> {
        let command = self
            .commands
            .get_mut(id.0)
            .ok_or_else(|| DeclarationError::UnknownCommand(id.to_string()))?;
        command.description = Some(description.to_string());
        Ok(())
    }

    /// Opens the schema builder for `id`.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::AbstractCommand`] for abstract types, including
    /// the base; [`DeclarationError::UnknownCommand`] for an id this set did
    /// not issue.
    pub fn declare(&mut self, id: CommandId) -> Result<CommandBuilder<'_>, DeclarationError> {
        let command = self
            .commands
            .get_mut(id.0)
            .ok_or_else(|| DeclarationError::UnknownCommand(id.to_string()))?;
        if command.is_abstract {
            return Err(DeclarationError::AbstractCommand(command.name.clone()));
        }
        Ok(CommandBuilder::new(
            &command.name,
            &mut command.schema,
            &self.types,
        ))
    }

    pub fn find(&self, name: &str) -> Option<CommandId> {
        self.by_name.get(name).copied()
    }

    /// # Panics
    ///
    /// If `id` was not issued by this set. See [`try_get`](Self::try_get).
    pub fn get(&self, id: CommandId) -> &CommandType {
        &self.commands[id.0]
    }

    pub fn try_get(&self, id: CommandId) -> Option<&CommandType> {
        self.commands.get(id.0)
    }

    /// Concrete and abstract command types, excluding the base, in
    /// declaration order.
    pub fn commands(&self) -> impl Iterator<Item = (CommandId, &CommandType)> {
        self.commands
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, command)| (CommandId(i), command))
    }

    /// `id` followed by its ancestors, ending at the base.
    pub fn ancestry(&self, id: CommandId) -> Vec<CommandId> {
        let mut chain = vec![id];
        let mut current = self.commands[id.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.commands[parent.0].parent;
        }
        chain
    }

    /// Own arguments of `id` if it declares any, else the nearest ancestor's.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_params_core::*;
    ///
    /// let mut commands = CommandSet::new();
    /// let parent = commands.add_command("parent", None).unwrap();
    /// let child = commands.add_command("child", Some(parent)).unwrap();
    /// let other = commands.add_command("other", Some(parent)).unwrap();
    /// commands.declare(parent).unwrap().argument(ArgumentSpec::new("a")).unwrap();
    /// commands.declare(child).unwrap().argument(ArgumentSpec::new("b")).unwrap();
    ///
    /// let names = |id| commands.effective_arguments(id).iter().map(|a| a.name.clone()).collect::<Vec<_>>();
    /// assert_eq!(names(child), vec!["b"]);
    /// assert_eq!(names(other), vec!["a"]);
    /// ```
    pub fn effective_arguments(&self, id: CommandId) -> &[ArgumentSpec] {
        self.ancestry(id)
            .into_iter()
            .map(|ancestor| self.commands[ancestor.0].schema.arguments())
            .find(|arguments| !arguments.is_empty())
            .unwrap_or(&[])
    }

    /// Own options of `id` and all its ancestors, where an ancestor's spec
    /// replaces a same-named spec contributed by a descendant.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_params_core::*;
    ///
    /// let mut commands = CommandSet::new();
    /// let a = commands.add_command("a", None).unwrap();
    /// let b = commands.add_command("b", Some(a)).unwrap();
    /// commands.declare(a).unwrap()
    ///     .option(OptionSpec::new("x").with_description("from a")).unwrap();
    /// commands.declare(b).unwrap()
    ///     .option(OptionSpec::new("x").with_description("from b")).unwrap()
    ///     .option(OptionSpec::new("y")).unwrap();
    ///
    /// let options = commands.effective_options(b);
    /// assert_eq!(options["x"].description.as_deref(), Some("from a"));
    /// assert!(options.contains_key("y"));
    /// ```
    pub fn effective_options(&self, id: CommandId) -> OptionTable<'_> {
        let mut table = OptionTable::new();
        for ancestor in self.ancestry(id) {
            for (name, spec) in self.commands[ancestor.0].schema.options() {
                table.insert(name.as_str(), spec);
            }
        }
        table
    }

    /// Resolves positional values against the effective arguments of `id`.
    pub fn resolve_arguments(
        &self,
        id: CommandId,
        raw: &[Value],
    ) -> Result<IndexMap<String, Value>, ResolveError> {
        let command = self.checked(id)?;
        debug!(command = %command.name, given = raw.len(), "Resolving arguments");
        resolve_arguments(self.effective_arguments(id), raw, &self.types).inspect_err(|err| {
            debug!(command = %command.name, error = %err, "Argument resolution failed");
        })
    }

    /// Resolves named values against the effective options of `id`.
    pub fn resolve_options(
        &self,
        id: CommandId,
        raw: &IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>, ResolveError> {
        let command = self.checked(id)?;
        debug!(command = %command.name, given = raw.len(), "Resolving options");
        resolve_options(&command.name, &self.effective_options(id), raw, &self.types).inspect_err(
            |err| {
                debug!(command = %command.name, error = %err, "Option resolution failed");
            },
        )
    }

    /// Resolves a full invocation into a [`ResolvedParams`] with accessors
    /// synthesized from the effective specs.
    pub fn resolve(
        &self,
        id: CommandId,
        invocation: &Invocation,
    ) -> Result<ResolvedParams, ResolveError> {
        let arguments = self.resolve_arguments(id, &invocation.arguments)?;
        let options = self.resolve_options(id, &invocation.options)?;
        Ok(ResolvedParams::new(
            arguments,
            options,
            self.effective_arguments(id),
            &self.effective_options(id),
        ))
    }

    fn checked(&self, id: CommandId) -> Result<&CommandType, ResolveError> {
        self.try_get(id)
            .ok_or_else(|| ResolveError::UnknownCommand(id.to_string()))
    }

    /// Looks up `name` and resolves `invocation` against it.
    pub fn resolve_named(
        &self,
        name: &str,
        invocation: &Invocation,
    ) -> Result<ResolvedParams, ResolveError> {
        let id = self
            .find(name)
            .ok_or_else(|| ResolveError::UnknownCommand(name.to_string()))?;
        self.resolve(id, invocation)
    }
}
