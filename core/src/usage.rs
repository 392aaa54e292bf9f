//! Usage text rendered from an effective schema.

use crate::command::{CommandId, CommandSet};
use crate::spec::{ArgumentSpec, OptionSpec};

/// Label of an argument in usage text: `NAME`, `[NAME]`, `NAME...` or
/// `[NAME...]`.
///
/// # Examples
///
/// ```
/// use command_params_core::{ArgumentSpec, argument_label};
///
/// assert_eq!(argument_label(&ArgumentSpec::new("input").required()), "INPUT");
/// assert_eq!(argument_label(&ArgumentSpec::new("sizes").variadic()), "[SIZES...]");
/// assert_eq!(argument_label(&ArgumentSpec::new("c").with_display_hint("COLOR")), "[COLOR]");
/// ```
pub fn argument_label(spec: &ArgumentSpec) -> String {
    let mut label = spec
        .display_hint
        .clone()
        .unwrap_or_else(|| spec.name.to_uppercase());
    if spec.variadic {
        label.push_str("...");
    }
    if spec.required {
        label
    } else {
        format!("[{label}]")
    }
}

/// Flag column of an option: aliases then the long flag, plus a value hint
/// for non-boolean options.
///
/// # Examples
///
/// ```
/// use command_params_core::{OptionSpec, TypeTag, option_label};
///
/// let verbose = OptionSpec::new("verbose").with_type(TypeTag::Boolean).with_alias("v");
/// assert_eq!(option_label(&verbose), "-v, --verbose");
///
/// let output = OptionSpec::new("output_dir").with_display_hint("DIR");
/// assert_eq!(option_label(&output), "--output-dir DIR");
/// ```
pub fn option_label(spec: &OptionSpec) -> String {
    let mut flags: Vec<String> = spec
        .aliases
        .iter()
        .map(|alias| {
            if alias.chars().count() == 1 {
                format!("-{alias}")
            } else {
                format!("--{alias}")
            }
        })
        .collect();
    flags.push(format!("--{}", spec.flag_name()));
    let mut label = flags.join(", ");

    if !spec.type_tag.is_boolean() {
        let hint = spec
            .display_hint
            .clone()
            .unwrap_or_else(|| spec.name.to_uppercase());
        label.push(' ');
        label.push_str(&hint);
    }
    label
}

/// Renders the usage line, description and argument/option listing of a
/// command type from its effective schema.
///
/// Panics if `id` was not issued by `commands`.
///
/// # Examples
///
/// ```
/// use command_params_core::*;
///
/// let mut commands = CommandSet::new();
/// let cp = commands.add_command("cp", None).unwrap();
/// commands.declare(cp).unwrap()
///     .variadic(ArgumentSpec::new("sources").required()).unwrap()
///     .argument(ArgumentSpec::new("dest").required()).unwrap();
///
/// let text = render_usage(&commands, cp);
/// assert!(text.starts_with("Usage: cp SOURCES... DEST\n"));
/// ```
pub fn render_usage(commands: &CommandSet, id: CommandId) -> String {
    let command = commands.get(id);
    let arguments = commands.effective_arguments(id);
    let options = commands.effective_options(id);

    let mut line = format!("Usage: {}", command.name);
    if !options.is_empty() {
        line.push_str(" [OPTIONS]");
    }
    for spec in arguments {
        line.push(' ');
        line.push_str(&argument_label(spec));
    }

    let mut out = line;
    out.push('\n');

    if let Some(description) = &command.description {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }

    let argument_rows: Vec<(String, Option<&str>)> = arguments
        .iter()
        .map(|spec| (argument_label(spec), spec.description.as_deref()))
        .collect();
    let option_rows: Vec<(String, Option<&str>)> = options
        .values()
        .map(|spec| (option_label(spec), spec.description.as_deref()))
        .collect();

    let width = argument_rows
        .iter()
        .chain(option_rows.iter())
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);

    push_section(&mut out, "Arguments", &argument_rows, width);
    push_section(&mut out, "Options", &option_rows, width);
    out
}

fn push_section(out: &mut String, title: &str, rows: &[(String, Option<&str>)], width: usize) {
    if rows.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push_str(":\n");
    for (label, description) in rows {
        match description {
            Some(description) => {
                out.push_str(&format!("  {label:<width$}  {description}\n"));
            }
            None => {
                out.push_str(&format!("  {label}\n"));
            }
        }
    }
}
