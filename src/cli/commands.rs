//! Command dispatch
//!
//! Mutating commands load the task list, apply one store operation and save
//! the whole tree back.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, PrefsCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::codec::{FlatMap, FlatValue};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    Field, FieldValue, NodeId, NodePath, TaskSnapshot, TaskStore, EMPTY_PLACEHOLDER,
};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(file) = &cli.file {
        settings.tasklist_file = file.clone();
    }
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Show { all }) => cmd_show(&container, *all),
        Some(Commands::Add {
            under,
            at,
            description,
        }) => cmd_add(&container, under.as_ref(), *at, &description.join(" ")),
        Some(Commands::Set { path, field, value }) => cmd_set(&container, path, *field, value),
        Some(Commands::Done { path }) => cmd_set(&container, path, Field::Done, "true"),
        Some(Commands::Undone { path }) => cmd_set(&container, path, Field::Done, "false"),
        Some(Commands::Remove { path, count }) => cmd_remove(&container, path, *count),
        Some(Commands::Move {
            path,
            to,
            position,
            count,
        }) => cmd_move(&container, path, to, *position, *count),
        Some(Commands::Clear) => cmd_clear(&container),
        Some(Commands::Export { paths }) => cmd_export(&container, paths),
        Some(Commands::Prefs { command }) => cmd_prefs(&container, command),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { shell }) => {
            generate(*shell, &mut Cli::command(), "tasktree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

// ============================================================
// Task list plumbing
// ============================================================

/// Loads the configured task list; a missing file is an empty list.
fn open_store(container: &ServiceContainer) -> CliResult<TaskStore> {
    let mut store = TaskStore::new();
    let path = &container.settings.tasklist_file;
    match container.persistence.load_tasklist(path, &mut store) {
        Ok(()) => {}
        Err(ApplicationError::FileNotFound(_)) => {
            debug!("no task list at {}, starting empty", path.display());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(store)
}

fn save_store(container: &ServiceContainer, store: &TaskStore) -> CliResult<()> {
    let path = &container.settings.tasklist_file;
    container
        .fs
        .ensure_parent(path)
        .with_path_context("create directory for", path)?;
    container.persistence.save_tasklist(path, store)?;
    Ok(())
}

/// Splits a task path into its parent node and its position there.
fn locate(store: &TaskStore, path: &NodePath) -> CliResult<(NodeId, usize)> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(position)) => Ok((store.node_at_path(&parent)?, position)),
        _ => Err(CliError::Usage("the root cannot be addressed here".into())),
    }
}

fn describe(store: &TaskStore, node: NodeId) -> String {
    let path = store
        .path_of(node)
        .map(|p| p.to_string())
        .unwrap_or_default();
    let text = store.display_text(node).unwrap_or_default();
    format!("{path} {text}")
}

// ============================================================
// Commands
// ============================================================

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, all: bool) -> CliResult<()> {
    let store = open_store(container)?;
    if store.is_empty() {
        output::info("no tasks");
        return Ok(());
    }
    let hide_done = container.settings.hide_done && !all;
    let mut tree = Tree::new(container.settings.tasklist_file.display().to_string());
    for (position, task) in store.snapshot().iter().enumerate() {
        if let Some(branch) = render(task, NodePath::root().child(position), hide_done) {
            tree.push(branch);
        }
    }
    output::info(&tree);
    Ok(())
}

fn render(task: &TaskSnapshot, path: NodePath, hide_done: bool) -> Option<Tree<String>> {
    if hide_done && task.data.done {
        return None;
    }
    let description = if task.data.description.is_empty() {
        EMPTY_PLACEHOLDER.dimmed().to_string()
    } else if task.data.done {
        task.data.description.strikethrough().to_string()
    } else {
        task.data.description.clone()
    };
    let marker = if task.data.done {
        "[x]".green().to_string()
    } else {
        "[ ]".to_string()
    };
    let mut label = format!("{} {} {}", path.to_string().dimmed(), marker, description);

    if !task.data.expanded && !task.children.is_empty() {
        label.push_str(&format!(" (+{})", task.children.len()).dimmed().to_string());
        return Some(Tree::new(label));
    }
    let leaves = task
        .children
        .iter()
        .enumerate()
        .filter_map(|(position, child)| render(child, path.child(position), hide_done))
        .collect::<Vec<_>>();
    Some(Tree::new(label).with_leaves(leaves))
}

#[instrument(skip(container))]
fn cmd_add(
    container: &ServiceContainer,
    under: Option<&NodePath>,
    at: Option<usize>,
    description: &str,
) -> CliResult<()> {
    let mut store = open_store(container)?;
    let parent = under.map(|path| store.node_at_path(path)).transpose()?;
    let position = at.unwrap_or_else(|| store.child_count(parent));
    let created = store.insert(parent, position, 1)?;
    for &node in &created {
        store.set_description(node, description)?;
    }
    save_store(container, &store)?;
    for &node in &created {
        output::success(&format!("added {}", describe(&store, node)));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_set(container: &ServiceContainer, path: &NodePath, field: Field, raw: &str) -> CliResult<()> {
    let mut store = open_store(container)?;
    let node = store.node_at_path(path)?;
    let value = FieldValue::parse_for(field, raw)?;
    store.set(node, field, value)?;
    save_store(container, &store)?;
    output::success(&format!("{} {} = {}", path, field, raw));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_remove(container: &ServiceContainer, path: &NodePath, count: usize) -> CliResult<()> {
    let mut store = open_store(container)?;
    let (parent, position) = locate(&store, path)?;
    let destroyed = store.remove(Some(parent), position, count)?;
    save_store(container, &store)?;
    output::success(&format!("removed {destroyed} task(s) at {path}"));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_move(
    container: &ServiceContainer,
    path: &NodePath,
    to: &NodePath,
    position: usize,
    count: usize,
) -> CliResult<()> {
    let mut store = open_store(container)?;
    let (source, from) = locate(&store, path)?;
    let destination = store.node_at_path(to)?;
    let moved = store.children(Some(source))[from.min(store.child_count(Some(source)))..]
        .iter()
        .take(count)
        .copied()
        .collect::<Vec<_>>();
    store.move_nodes(Some(source), from, count, Some(destination), position)?;
    save_store(container, &store)?;
    for node in moved {
        output::success(&format!("moved to {}", describe(&store, node)));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_clear(container: &ServiceContainer) -> CliResult<()> {
    let mut store = open_store(container)?;
    let destroyed = store.clear()?;
    save_store(container, &store)?;
    output::success(&format!("removed {destroyed} task(s)"));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_export(container: &ServiceContainer, paths: &[NodePath]) -> CliResult<()> {
    let store = open_store(container)?;
    let nodes = paths
        .iter()
        .map(|path| store.node_at_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    output::info(&store.transfer_text(&nodes));
    Ok(())
}

// ============================================================
// Preferences and config
// ============================================================

fn load_prefs(container: &ServiceContainer) -> CliResult<FlatMap> {
    match container
        .persistence
        .load_flat(&container.settings.preferences_file)
    {
        Ok(values) => Ok(values),
        Err(ApplicationError::FileNotFound(_)) => Ok(FlatMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_prefs(container: &ServiceContainer, values: &FlatMap) -> CliResult<()> {
    let path = &container.settings.preferences_file;
    container
        .fs
        .ensure_parent(path)
        .with_path_context("create directory for", path)?;
    container.persistence.save_flat(path, values)?;
    Ok(())
}

fn format_flat(value: &FlatValue) -> String {
    match value {
        FlatValue::Text(text) => text.clone(),
        FlatValue::TextList(items) => format!("[{}]", items.iter().join(", ")),
        FlatValue::Bytes(bytes) => hex::encode(bytes),
        FlatValue::Integer(number) => number.to_string(),
        FlatValue::Bool(flag) => flag.to_string(),
    }
}

fn cmd_prefs(container: &ServiceContainer, command: &PrefsCommands) -> CliResult<()> {
    let mut values = load_prefs(container)?;
    match command {
        PrefsCommands::List => {
            for (key, value) in &values {
                output::info(&format!("{} = {}", key.cyan(), format_flat(value)));
            }
            Ok(())
        }
        PrefsCommands::Get { key } => {
            let value = values
                .get(key)
                .ok_or_else(|| CliError::Usage(format!("no preference named {key}")))?;
            output::info(&format_flat(value));
            Ok(())
        }
        PrefsCommands::Set { key, values: raw, bytes } => {
            let value = match (raw.as_slice(), *bytes) {
                ([single], true) => FlatValue::Bytes(
                    hex::decode(single).map_err(|e| CliError::InvalidArgs(e.to_string()))?,
                ),
                (_, true) => {
                    return Err(CliError::InvalidArgs(
                        "--bytes takes exactly one hex value".into(),
                    ))
                }
                ([single], false) => FlatValue::Text(single.clone()),
                (many, false) => FlatValue::TextList(many.to_vec()),
            };
            values.insert(key.clone(), value);
            save_prefs(container, &values)?;
            output::success(&format!("set {key}"));
            Ok(())
        }
        PrefsCommands::Unset { key } => {
            if values.remove(key).is_none() {
                output::warning(&format!("no preference named {key}"));
                return Ok(());
            }
            save_prefs(container, &values)?;
            output::success(&format!("unset {key}"));
            Ok(())
        }
    }
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config locations");
            match global_config_path() {
                Some(path) => output::detail(&format!("global:      {}", path.display())),
                None => output::detail("global:      (no config directory)"),
            }
            output::detail(&format!(
                "tasklist:    {}",
                container.settings.tasklist_file.display()
            ));
            output::detail(&format!(
                "preferences: {}",
                container.settings.preferences_file.display()
            ));
        }
    }
    Ok(())
}
