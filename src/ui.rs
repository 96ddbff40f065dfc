// Command line layer: clap definitions and the flows that turn each
// command into SDK calls and print the result.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::style::{style, Stylize};
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde_json::{Map, Value};

use crate::client::Client;
use crate::config::{persist_token, Config};
use crate::format::{
    format_execution_tasks, format_json_for_object_property, format_list_for_column,
    format_mapping_for_column, resource_summary_line,
};
use crate::mappings::{
    load_json_option, parse_minion_pool_mappings, parse_network_map, StorageMappings, UserScripts,
};
use crate::managers::{DeploymentSpec, OptionsKind, ScheduleSpec, TransferSpec};
use crate::resource::Resource;
use crate::schedule::{ensure_in_future, parse_expiration_date, Schedule};

#[derive(Debug, Parser)]
#[command(name = "coriolis", version, about = "Command line client for the Coriolis migration service")]
pub struct Cli {
    /// Base URL of the Coriolis API (e.g. "https://coriolis:7667/v1/<project>")
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// Pre-issued auth token sent as X-Auth-Token
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// Use the /replicas and /migrations collections of older services
    #[arg(long, global = true)]
    pub legacy: bool,
    /// Increase log verbosity, may be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Command line flags take precedence over file and environment values.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if self.insecure {
            config.insecure = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Endpoint(EndpointCommand),
    #[command(subcommand)]
    Transfer(TransferCommand),
    #[command(subcommand)]
    Execution(ExecutionCommand),
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    #[command(subcommand)]
    Deployment(DeploymentCommand),
    #[command(subcommand)]
    MinionPool(MinionPoolCommand),
    #[command(subcommand)]
    Region(SimpleCommand),
    #[command(subcommand)]
    Service(SimpleCommand),
    #[command(subcommand)]
    Provider(ProviderCommand),
    /// Show diagnostics reported by every Coriolis service
    Diagnostics,
}

/// Environment passed to the endpoint's provider, inline or from a file.
#[derive(Debug, Args)]
pub struct EnvironmentArgs {
    /// Environment as a JSON object
    #[arg(long)]
    pub env: Option<String>,
    /// Path to a file holding the environment JSON
    #[arg(long, conflicts_with = "env")]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum EndpointCommand {
    List,
    Show { endpoint: String },
    Delete {
        endpoint: String,
        #[arg(long)]
        yes: bool,
    },
    /// Check the endpoint's connection info against its platform
    Validate { endpoint: String },
    /// List the instances the endpoint can export
    Instances {
        endpoint: String,
        #[command(flatten)]
        env: EnvironmentArgs,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        marker: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Networks {
        endpoint: String,
        #[command(flatten)]
        env: EnvironmentArgs,
    },
    Storage {
        endpoint: String,
        #[command(flatten)]
        env: EnvironmentArgs,
    },
    /// List the values each provider option accepts
    Options {
        endpoint: String,
        /// Source options instead of destination ones
        #[arg(long)]
        source: bool,
        /// Options of minion pools on this endpoint
        #[arg(long)]
        minion_pool: bool,
        /// Restrict the listing to this option, may be repeated
        #[arg(long = "option")]
        options: Vec<String>,
        #[command(flatten)]
        env: EnvironmentArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    List {
        #[arg(long)]
        detail: bool,
    },
    Show { transfer: String },
    Create(Box<TransferCreateArgs>),
    Delete {
        transfer: String,
        #[arg(long)]
        yes: bool,
    },
    /// Delete the transfer's disks on the destination platform
    DeleteDisks { transfer: String },
}

#[derive(Debug, Args)]
pub struct TransferCreateArgs {
    /// Origin endpoint name or ID
    #[arg(long)]
    pub origin_endpoint: String,
    /// Destination endpoint name or ID
    #[arg(long)]
    pub destination_endpoint: String,
    /// Instance to transfer, may be repeated
    #[arg(long = "instance", required = true)]
    pub instances: Vec<String>,
    /// "replica" or "live_migration"
    #[arg(long)]
    pub scenario: Option<String>,
    #[arg(long)]
    pub source_environment: Option<String>,
    #[arg(long, conflicts_with = "source_environment")]
    pub source_environment_file: Option<PathBuf>,
    #[arg(long)]
    pub destination_environment: Option<String>,
    #[arg(long, conflicts_with = "destination_environment")]
    pub destination_environment_file: Option<PathBuf>,
    /// source_network=destination_network, may be repeated
    #[arg(long = "network-map")]
    pub network_map: Vec<String>,
    #[arg(long)]
    pub default_storage_backend: Option<String>,
    /// disk_id=destination_backend, may be repeated
    #[arg(long = "disk-storage-mapping")]
    pub disk_storage_mappings: Vec<String>,
    /// source_backend=destination_backend, may be repeated
    #[arg(long = "storage-backend-mapping")]
    pub storage_backend_mappings: Vec<String>,
    #[arg(long)]
    pub origin_minion_pool: Option<String>,
    #[arg(long)]
    pub destination_minion_pool: Option<String>,
    /// instance=minion_pool_id, may be repeated
    #[arg(long = "osmorphing-minion-pool-mapping")]
    pub osmorphing_minion_pool_mappings: Vec<String>,
    #[command(flatten)]
    pub user_scripts: UserScriptArgs,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub skip_os_morphing: bool,
}

#[derive(Debug, Args)]
pub struct UserScriptArgs {
    /// os_type=path_to_script, applied to every instance of that OS
    #[arg(long = "user-script-global")]
    pub global: Vec<String>,
    /// instance_name=path_to_script
    #[arg(long = "user-script-instance")]
    pub instance: Vec<String>,
}

impl UserScriptArgs {
    fn parse(&self) -> Result<UserScripts> {
        UserScripts::from_args(&self.global, &self.instance).context("invalid user scripts")
    }
}

#[derive(Debug, Subcommand)]
pub enum ExecutionCommand {
    List { transfer: String },
    Show { transfer: String, execution: String },
    Create {
        transfer: String,
        #[arg(long)]
        shutdown_instances: bool,
        #[arg(long)]
        auto_deploy: bool,
    },
    Cancel {
        transfer: String,
        execution: String,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    List {
        transfer: String,
        #[arg(long)]
        hide_expired: bool,
    },
    Create {
        transfer: String,
        /// "minute hour dom month dow", "*" leaves a field unset
        schedule: String,
        /// Create the schedule disabled
        #[arg(long)]
        disabled: bool,
        /// ISO-8601 date after which the schedule stops firing
        #[arg(long)]
        expires: Option<String>,
        #[arg(long)]
        shutdown_instance: bool,
        #[arg(long)]
        auto_deploy: bool,
    },
    Delete {
        transfer: String,
        schedule: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeploymentCommand {
    List {
        #[arg(long)]
        detail: bool,
    },
    Show { deployment: String },
    /// Deploy the instances of an existing transfer
    Create {
        transfer: String,
        #[arg(long)]
        clone_disks: bool,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        skip_os_morphing: bool,
        #[command(flatten)]
        user_scripts: UserScriptArgs,
        /// instance=minion_pool_id, may be repeated
        #[arg(long = "osmorphing-minion-pool-mapping")]
        osmorphing_minion_pool_mappings: Vec<String>,
    },
    Cancel {
        deployment: String,
        #[arg(long)]
        force: bool,
    },
    Delete {
        deployment: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum MinionPoolCommand {
    List,
    Show { pool: String },
    Allocate { pool: String },
    Refresh { pool: String },
    Deallocate {
        pool: String,
        #[arg(long)]
        force: bool,
    },
    Delete {
        pool: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// List the provider types of every platform
    List,
    /// Show the JSON schemas a platform publishes for one provider type
    Schemas { platform: String, schema_type: u32 },
}

#[derive(Debug, Subcommand)]
pub enum SimpleCommand {
    List,
    Show { id: String },
}

const ENDPOINT_FIELDS: [&str; 4] = ["id", "name", "type", "description"];
const TRANSFER_FIELDS: [&str; 5] = [
    "id",
    "scenario",
    "origin_endpoint_id",
    "destination_endpoint_id",
    "last_execution_status",
];
const EXECUTION_FIELDS: [&str; 4] = ["id", "number", "status", "created_at"];
const SCHEDULE_FIELDS: [&str; 4] = ["id", "enabled", "expiration_date", "shutdown_instance"];
const DEPLOYMENT_FIELDS: [&str; 4] = ["id", "transfer_id", "last_execution_status", "created_at"];
const POOL_FIELDS: [&str; 5] = ["id", "name", "endpoint_id", "platform", "status"];
const REGION_FIELDS: [&str; 3] = ["id", "name", "enabled"];
const SERVICE_FIELDS: [&str; 5] = ["id", "host", "binary", "topic", "status"];
const INSTANCE_FIELDS: [&str; 4] = ["id", "name", "num_cpu", "memory_mb"];
const NETWORK_FIELDS: [&str; 2] = ["id", "name"];

/// Ask for a token when none is configured and offer to keep it.
pub fn prompt_for_token(config: &mut Config) -> Result<()> {
    if config.token.is_some() || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    let token: String = Password::new().with_prompt("Auth token").interact()?;
    let save = Confirm::new()
        .with_prompt("Save the token for future runs?")
        .default(false)
        .interact()?;
    if save {
        let path = persist_token(&token)?;
        println!("Token saved to {}", path.display());
    }
    config.token = Some(token);
    Ok(())
}

pub fn run(command: &Command, client: &Client) -> Result<()> {
    match command {
        Command::Endpoint(cmd) => endpoint(cmd, client),
        Command::Transfer(cmd) => transfer(cmd, client),
        Command::Execution(cmd) => execution(cmd, client),
        Command::Schedule(cmd) => schedule(cmd, client),
        Command::Deployment(cmd) => deployment(cmd, client),
        Command::MinionPool(cmd) => minion_pool(cmd, client),
        Command::Region(SimpleCommand::List) => {
            print_list(&client.regions().list()?, &REGION_FIELDS);
            Ok(())
        }
        Command::Region(SimpleCommand::Show { id }) => {
            print_resource(&client.regions().get(id.as_str())?);
            Ok(())
        }
        Command::Service(SimpleCommand::List) => {
            print_list(&client.services().list()?, &SERVICE_FIELDS);
            Ok(())
        }
        Command::Service(SimpleCommand::Show { id }) => {
            print_resource(&client.services().get(id.as_str())?);
            Ok(())
        }
        Command::Provider(ProviderCommand::List) => {
            let providers = client.providers().list()?;
            println!("{}", format_mapping_for_column(&providers));
            Ok(())
        }
        Command::Provider(ProviderCommand::Schemas {
            platform,
            schema_type,
        }) => {
            let schemas = client.providers().schemas(platform, *schema_type)?;
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            Ok(())
        }
        Command::Diagnostics => {
            for report in client.diagnostics().list()? {
                print_resource(&report);
                println!();
            }
            Ok(())
        }
    }
}

fn endpoint(cmd: &EndpointCommand, client: &Client) -> Result<()> {
    let endpoints = client.endpoints();
    match cmd {
        EndpointCommand::List => print_list(&endpoints.list()?, &ENDPOINT_FIELDS),
        EndpointCommand::Show { endpoint } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            print_resource(&endpoints.get(id)?);
        }
        EndpointCommand::Delete { endpoint, yes } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            if confirm(*yes, &format!("Delete endpoint {endpoint}?"))? {
                endpoints.delete(&id)?;
                info!("deleted endpoint {id}");
            }
        }
        EndpointCommand::Validate { endpoint } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            let result = with_spinner("Validating connection...", || {
                Ok(endpoints.validate_connection(&id)?)
            })?;
            println!("{}", styled_status(if result.valid { "VALID" } else { "INVALID" }));
            result.ensure_valid()?;
        }
        EndpointCommand::Instances {
            endpoint,
            env,
            name,
            marker,
            limit,
        } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            let env = load_env(env)?;
            let instances = with_spinner("Listing instances...", || {
                Ok(client.endpoint_instances().list(
                    &id,
                    env.as_ref(),
                    marker.as_deref(),
                    *limit,
                    name.as_deref(),
                )?)
            })?;
            print_list(&instances, &INSTANCE_FIELDS);
        }
        EndpointCommand::Networks { endpoint, env } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            let env = load_env(env)?;
            print_list(
                &client.endpoint_networks().list(&id, env.as_ref())?,
                &NETWORK_FIELDS,
            );
        }
        EndpointCommand::Storage { endpoint, env } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            let env = load_env(env)?;
            let storage = client.endpoint_storage().list(&id, env.as_ref())?;
            println!(
                "config_default: {}",
                format_json_for_object_property(&storage, "config_default")
            );
            let backends: Vec<String> = storage
                .attr("storage_backends")
                .and_then(Value::as_array)
                .map(|b| {
                    b.iter()
                        .filter_map(|s| s.get("name").and_then(Value::as_str))
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default();
            println!("storage_backends:\n{}", backends.join("\n"));
        }
        EndpointCommand::Options {
            endpoint,
            source,
            minion_pool,
            options,
            env,
        } => {
            let id = endpoints.get_endpoint_id_for_name(endpoint)?;
            let env = load_env(env)?;
            let kind = match (*source, *minion_pool) {
                (true, false) => OptionsKind::Source,
                (false, false) => OptionsKind::Destination,
                (true, true) => OptionsKind::SourceMinionPool,
                (false, true) => OptionsKind::DestinationMinionPool,
            };
            let names: Vec<&str> = options.iter().map(String::as_str).collect();
            for option in client.endpoint_options(kind).list(&id, env.as_ref(), &names)? {
                let values = option
                    .attr("values")
                    .and_then(Value::as_array)
                    .map(|v| format_list_for_column(v).replace('\n', ", "))
                    .unwrap_or_default();
                println!("{}: {}", option.attr_str("name").unwrap_or("-"), values);
            }
        }
    }
    Ok(())
}

fn load_env(args: &EnvironmentArgs) -> Result<Option<Value>> {
    load_json_option(args.env.as_deref(), args.env_file.as_deref()).context("invalid environment")
}

fn json_object(raw: Option<&str>, file: Option<&Path>, what: &str) -> Result<Map<String, Value>> {
    match load_json_option(raw, file).with_context(|| format!("invalid {what}"))? {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => anyhow::bail!("{what} must be a JSON object"),
    }
}

fn transfer_spec(args: &TransferCreateArgs, client: &Client) -> Result<TransferSpec> {
    let endpoints = client.endpoints();
    Ok(TransferSpec {
        origin_endpoint_id: endpoints.get_endpoint_id_for_name(&args.origin_endpoint)?,
        destination_endpoint_id: endpoints.get_endpoint_id_for_name(&args.destination_endpoint)?,
        instances: args.instances.clone(),
        scenario: args.scenario.clone(),
        source_environment: json_object(
            args.source_environment.as_deref(),
            args.source_environment_file.as_deref(),
            "source environment",
        )?,
        destination_environment: json_object(
            args.destination_environment.as_deref(),
            args.destination_environment_file.as_deref(),
            "destination environment",
        )?,
        network_map: parse_network_map(&args.network_map).context("invalid network map")?,
        storage_mappings: StorageMappings::from_args(
            args.default_storage_backend.as_deref(),
            &args.disk_storage_mappings,
            &args.storage_backend_mappings,
        )
        .context("invalid storage mappings")?,
        notes: args.notes.clone(),
        origin_minion_pool_id: args.origin_minion_pool.clone(),
        destination_minion_pool_id: args.destination_minion_pool.clone(),
        instance_osmorphing_minion_pool_mappings: parse_minion_pool_mappings(
            &args.osmorphing_minion_pool_mappings,
        )
        .context("invalid minion pool mappings")?,
        user_scripts: args.user_scripts.parse()?,
        clone_disks: None,
        skip_os_morphing: args.skip_os_morphing.then_some(true),
    })
}

fn transfer(cmd: &TransferCommand, client: &Client) -> Result<()> {
    let transfers = client.transfers();
    match cmd {
        TransferCommand::List { detail } => print_list(&transfers.list(*detail)?, &TRANSFER_FIELDS),
        TransferCommand::Show { transfer } => print_resource(&transfers.get(transfer.as_str())?),
        TransferCommand::Create(args) => {
            let spec = transfer_spec(args, client)?;
            let created = transfers.create(&spec)?;
            print_resource(&created);
        }
        TransferCommand::Delete { transfer, yes } => {
            if confirm(*yes, &format!("Delete transfer {transfer}?"))? {
                transfers.delete(transfer.as_str())?;
            }
        }
        TransferCommand::DeleteDisks { transfer } => {
            let execution = transfers.delete_disks(transfer.as_str())?;
            print_resource(&execution);
        }
    }
    Ok(())
}

fn execution(cmd: &ExecutionCommand, client: &Client) -> Result<()> {
    let executions = client.executions();
    match cmd {
        ExecutionCommand::List { transfer } => {
            print_list(&executions.list(transfer.as_str())?, &EXECUTION_FIELDS)
        }
        ExecutionCommand::Show {
            transfer,
            execution,
        } => {
            let execution = executions.get(transfer.as_str(), execution.as_str())?;
            let mut info = execution.info().clone();
            info.remove("tasks");
            if let Some(status) = execution.attr_str("status") {
                info.insert("status".into(), Value::String(styled_status(status)));
            }
            println!("{}", format_mapping_for_column(&info));
            println!("tasks:\n{}", format_execution_tasks(&execution));
        }
        ExecutionCommand::Create {
            transfer,
            shutdown_instances,
            auto_deploy,
        } => {
            let created = executions.create(transfer.as_str(), *shutdown_instances, *auto_deploy)?;
            print_resource(&created);
        }
        ExecutionCommand::Cancel {
            transfer,
            execution,
            force,
        } => executions.cancel(transfer.as_str(), execution.as_str(), *force)?,
    }
    Ok(())
}

fn schedule(cmd: &ScheduleCommand, client: &Client) -> Result<()> {
    let schedules = client.schedules();
    match cmd {
        ScheduleCommand::List {
            transfer,
            hide_expired,
        } => print_list(&schedules.list(transfer.as_str(), *hide_expired)?, &SCHEDULE_FIELDS),
        ScheduleCommand::Create {
            transfer,
            schedule,
            disabled,
            expires,
            shutdown_instance,
            auto_deploy,
        } => {
            let schedule: Schedule = schedule.parse().context("invalid schedule")?;
            let expiration_date = match expires {
                Some(raw) => {
                    let date = parse_expiration_date(raw)?;
                    ensure_in_future(&date, &chrono::Utc::now())?;
                    Some(date)
                }
                None => None,
            };
            let spec = ScheduleSpec {
                schedule,
                enabled: !*disabled,
                expiration_date,
                shutdown_instance: *shutdown_instance,
                auto_deploy: *auto_deploy,
            };
            print_resource(&schedules.create(transfer.as_str(), &spec)?);
        }
        ScheduleCommand::Delete {
            transfer,
            schedule,
            yes,
        } => {
            if confirm(*yes, &format!("Delete schedule {schedule}?"))? {
                schedules.delete(transfer.as_str(), schedule.as_str())?;
            }
        }
    }
    Ok(())
}

fn deployment(cmd: &DeploymentCommand, client: &Client) -> Result<()> {
    let deployments = client.deployments();
    match cmd {
        DeploymentCommand::List { detail } => {
            print_list(&deployments.list(*detail)?, &DEPLOYMENT_FIELDS)
        }
        DeploymentCommand::Show { deployment } => {
            print_resource(&deployments.get(deployment.as_str())?)
        }
        DeploymentCommand::Create {
            transfer,
            clone_disks,
            force,
            skip_os_morphing,
            user_scripts,
            osmorphing_minion_pool_mappings,
        } => {
            let spec = DeploymentSpec {
                transfer_id: transfer.clone(),
                clone_disks: *clone_disks,
                force: *force,
                skip_os_morphing: *skip_os_morphing,
                user_scripts: Some(user_scripts.parse()?),
                instance_osmorphing_minion_pool_mappings: Some(
                    parse_minion_pool_mappings(osmorphing_minion_pool_mappings)
                        .context("invalid minion pool mappings")?,
                ),
            };
            print_resource(&deployments.create_from_transfer(&spec)?);
        }
        DeploymentCommand::Cancel { deployment, force } => {
            deployments.cancel(deployment.as_str(), *force)?
        }
        DeploymentCommand::Delete { deployment, yes } => {
            if confirm(*yes, &format!("Delete deployment {deployment}?"))? {
                deployments.delete(deployment.as_str())?;
            }
        }
    }
    Ok(())
}

fn minion_pool(cmd: &MinionPoolCommand, client: &Client) -> Result<()> {
    let pools = client.minion_pools();
    match cmd {
        MinionPoolCommand::List => print_list(&pools.list()?, &POOL_FIELDS),
        MinionPoolCommand::Show { pool } => print_resource(&pools.get(pool.as_str())?),
        MinionPoolCommand::Allocate { pool } => {
            print_resource(&with_spinner("Allocating...", || Ok(pools.allocate(pool.as_str())?))?)
        }
        MinionPoolCommand::Refresh { pool } => print_resource(&pools.refresh(pool.as_str())?),
        MinionPoolCommand::Deallocate { pool, force } => {
            print_resource(&pools.deallocate(pool.as_str(), *force)?)
        }
        MinionPoolCommand::Delete { pool, yes } => {
            if confirm(*yes, &format!("Delete minion pool {pool}?"))? {
                pools.delete(pool.as_str())?;
            }
        }
    }
    Ok(())
}

fn confirm(yes: bool, prompt: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("refusing to delete without --yes when not attached to a terminal");
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

/// Show a spinner on stderr while `f` runs.
fn with_spinner<T>(msg: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

fn styled_status(status: &str) -> String {
    if !std::io::stdout().is_terminal() {
        return status.to_owned();
    }
    let styled = style(status);
    match status {
        "COMPLETED" | "VALID" | "ALLOCATED" => styled.green().to_string(),
        "RUNNING" | "PENDING" | "CANCELLING" | "ALLOCATING" => styled.yellow().to_string(),
        s if s.starts_with("ERROR") || s.contains("FAILED") || s == "INVALID" => {
            styled.red().to_string()
        }
        _ => status.to_owned(),
    }
}

fn print_list(resources: &[Resource], fields: &[&str]) {
    println!("{}", fields.join("\t"));
    for res in resources {
        println!("{}", resource_summary_line(res, fields));
    }
}

fn print_resource(resource: &Resource) {
    let mut keys: Vec<&String> = resource.info().keys().collect();
    keys.sort();
    for key in keys {
        match resource.attr(key) {
            Some(Value::Object(_)) => {
                println!("{key}:\n{}", format_json_for_object_property(resource, key))
            }
            Some(Value::Array(items)) if items.iter().all(|v| !v.is_object()) => {
                println!("{key}:\n{}", format_list_for_column(items))
            }
            Some(Value::Array(_)) => {
                println!("{key}:\n{}", format_json_for_object_property(resource, key))
            }
            _ => println!("{key}: {}", format_json_for_object_property(resource, key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transfer_create() {
        let cli = Cli::try_parse_from([
            "coriolis",
            "transfer",
            "create",
            "--origin-endpoint",
            "vmware",
            "--destination-endpoint",
            "openstack",
            "--instance",
            "vm1",
            "--instance",
            "vm2",
            "--network-map",
            "private=public",
            "--storage-backend-mapping",
            "lvm=ceph",
        ])
        .unwrap();
        let Command::Transfer(TransferCommand::Create(args)) = &cli.command else {
            panic!("parsed {:?}", cli.command);
        };
        assert_eq!(args.instances, ["vm1", "vm2"]);
        assert_eq!(args.network_map, ["private=public"]);
        assert_eq!(args.storage_backend_mappings, ["lvm=ceph"]);
        assert!(args.user_scripts.global.is_empty());
    }

    #[test]
    fn test_transfer_create_requires_instance() {
        let res = Cli::try_parse_from([
            "coriolis",
            "transfer",
            "create",
            "--origin-endpoint",
            "a",
            "--destination-endpoint",
            "b",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_environment_sources_conflict() {
        let res = Cli::try_parse_from([
            "coriolis", "endpoint", "networks", "e1", "--env", "{}", "--env-file", "env.json",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "coriolis",
            "region",
            "list",
            "--url",
            "https://coriolis.example/v1",
            "--insecure",
            "--timeout",
            "5",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let mut config = Config {
            token: Some("from-file".into()),
            ..Default::default()
        };
        cli.apply_to(&mut config);
        assert_eq!(config.url, "https://coriolis.example/v1");
        assert!(config.insecure);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_parse_schedule_create() {
        let cli = Cli::try_parse_from([
            "coriolis",
            "schedule",
            "create",
            "t1",
            "30 2 * * 1",
            "--expires",
            "2030-01-01",
            "--disabled",
        ])
        .unwrap();
        let Command::Schedule(ScheduleCommand::Create {
            transfer,
            schedule,
            disabled,
            expires,
            ..
        }) = cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(transfer, "t1");
        assert_eq!(schedule.parse::<Schedule>().unwrap().dow, Some(1));
        assert!(disabled);
        assert_eq!(expires.as_deref(), Some("2030-01-01"));
    }
}
