//! Command-line adapter for the `clinic-settings` binary.
//!
//! Parses subcommands with `clap` and dispatches them to the lifecycle
//! service or the access evaluator. Every command yields a JSON value for
//! stdout; failures are [`DomainError`] envelopes.

mod navigation;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::domain::ports::EntityStore;
use crate::domain::{
    DomainError, EntityDraft, EntityId, EntityLifecycleService, EntityPatch, EntityRef,
    PermissionKey, Role,
};

pub use navigation::{NavigationItemView, NavigationSectionView, render_navigation};

/// `clinic-settings` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clinic-settings",
    about = "Manage appointment statuses and inspect role navigation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `clinic-settings`.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List active statuses, or deleted ones with `--deleted`.
    List {
        #[arg(long)]
        deleted: bool,
    },
    /// Add a status.
    Add(AddArgs),
    /// Edit the display fields of a status.
    Edit(EditArgs),
    /// Soft-delete a status.
    Delete { id: EntityId },
    /// Restore a soft-deleted status.
    Restore { id: EntityId },
    /// Reorder statuses; every id must be listed exactly once.
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<EntityId>,
    },
    /// Print the navigation tree visible to a role.
    Nav(NavArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub color: String,
    /// Explicit code; generated when omitted.
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Position; appended after the last status when omitted.
    #[arg(long)]
    pub order: Option<u32>,
    /// Flag the new status as the default.
    #[arg(long = "default")]
    pub is_default: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    pub id: EntityId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub order: Option<u32>,
    #[arg(long = "default", value_name = "bool")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Args)]
pub struct NavArgs {
    #[arg(long)]
    pub role: Role,
    /// Permission granted to the session; repeatable.
    #[arg(long = "grant", value_name = "key", value_parser = parse_permission_key)]
    pub grants: Vec<PermissionKey>,
    /// Current route, used to auto-expand the section holding it.
    #[arg(long)]
    pub route: Option<String>,
}

fn parse_permission_key(raw: &str) -> Result<PermissionKey, String> {
    PermissionKey::new(raw).map_err(|error| error.to_string())
}

impl From<AddArgs> for EntityDraft {
    fn from(args: AddArgs) -> Self {
        Self {
            code: args.code,
            name: args.name,
            color: args.color,
            description: args.description,
            order: args.order,
            is_default: args.is_default,
        }
    }
}

impl From<&EditArgs> for EntityPatch {
    fn from(args: &EditArgs) -> Self {
        Self {
            code: None,
            name: args.name.clone(),
            color: args.color.clone(),
            description: args.description.clone(),
            order: args.order,
            is_default: args.is_default,
        }
    }
}

/// Run `command` and return its JSON output.
pub async fn run<S>(
    command: Command,
    service: &EntityLifecycleService<S>,
) -> Result<Value, DomainError>
where
    S: EntityStore,
{
    match command {
        Command::List { deleted } => {
            let partition = service.partition().await?;
            let listed = if deleted {
                partition.deleted
            } else {
                partition.active
            };
            to_json(&listed)
        }
        Command::Add(args) => {
            let outcome = service.create(args.into()).await?;
            to_json(&outcome.entity)
        }
        Command::Edit(args) => {
            let outcome = service
                .update(&EntityRef::from(args.id), &EntityPatch::from(&args))
                .await?;
            to_json(&outcome.entity)
        }
        Command::Delete { id } => {
            let outcome = service.soft_delete(&EntityRef::from(id)).await?;
            to_json(&outcome.entity)
        }
        Command::Restore { id } => {
            let outcome = service.restore(&EntityRef::from(id)).await?;
            to_json(&outcome.entity)
        }
        Command::Reorder { ids } => {
            let sequence: Vec<EntityRef> = ids.into_iter().map(EntityRef::from).collect();
            let collection = service.reorder(&sequence).await?;
            to_json(&collection)
        }
        Command::Nav(args) => to_json(&render_navigation(&args)?),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|err| DomainError::internal(format!("failed to serialize output: {err}")))
}

#[cfg(test)]
mod tests;
