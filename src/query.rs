//! Query command dispatch
//!
//! The mechanical layer: per-resource flags in, one selection tree
//! out, response rendered as a JSON envelope. Every handler funnels
//! its `--input`/`--set`/`--set-json` flags through
//! [`document::build`] and its request through the client, optionally
//! via the self-pruning executor when `--maximal` asks for the widest
//! field visibility the caller's access allows.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde_json::{json, Map, Value};

use crate::client::{GraphClient, HttpGraphClient};
use crate::document::{self, DocumentSpec};
use crate::executor::{execute_with_pruning, report_line, PrunedFields};
use crate::selection::{Selection, SelectionNode};

/// Query command arguments consumed by `graphctl query`.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Resource to work with.
    #[clap(long, value_enum)]
    pub entity: QueryEntity,

    /// Action to execute for the resource.
    #[clap(long, value_enum)]
    pub action: QueryAction,

    /// Resource identifier (required for get/update/delete).
    #[clap(long)]
    pub id: Option<i64>,

    /// Project identifier scoping nodes and edges.
    #[clap(long)]
    pub project: Option<i64>,

    /// Base input document: inline JSON or file:PATH.
    #[clap(long)]
    pub input: Option<String>,

    /// path=value assignment with inferred value type (repeatable).
    #[clap(long = "set")]
    pub set: Vec<String>,

    /// path=value assignment always parsed as JSON (repeatable).
    #[clap(long = "set-json")]
    pub set_json: Vec<String>,

    /// Extra dotted field paths to select on top of the defaults.
    #[clap(long = "select")]
    pub select: Vec<String>,

    /// Request every known field, dropping the ones the server denies.
    #[clap(long)]
    pub maximal: bool,

    /// API endpoint to send the request to.
    #[clap(long, default_value = "http://localhost:3000/graph")]
    pub endpoint: String,

    /// Pretty-print the JSON response for humans.
    #[clap(long)]
    pub pretty: bool,
}

/// Supported resources.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QueryEntity {
    Projects,
    Graphs,
    Nodes,
    Edges,
}

impl QueryEntity {
    fn as_str(&self) -> &'static str {
        match self {
            QueryEntity::Projects => "projects",
            QueryEntity::Graphs => "graphs",
            QueryEntity::Nodes => "nodes",
            QueryEntity::Edges => "edges",
        }
    }

    /// Singular operation stem, e.g. `createProject`.
    fn stem(&self) -> &'static str {
        match self {
            QueryEntity::Projects => "Project",
            QueryEntity::Graphs => "Graph",
            QueryEntity::Nodes => "Node",
            QueryEntity::Edges => "Edge",
        }
    }

    /// Default field selection for one resource of this kind.
    fn default_paths(&self) -> &'static [&'static str] {
        match self {
            QueryEntity::Projects => &["id", "name", "createdAt"],
            QueryEntity::Graphs => &["id", "name", "projectId"],
            QueryEntity::Nodes => &["id", "label", "layer"],
            QueryEntity::Edges => &["id", "sourceId", "targetId"],
        }
    }

    /// Widest known selection, used with `--maximal`; fields the
    /// caller is not allowed to see are pruned away at run time.
    fn maximal_paths(&self) -> &'static [&'static str] {
        match self {
            QueryEntity::Projects => &[
                "id",
                "name",
                "createdAt",
                "owner.id",
                "owner.login",
                "settings.visibility",
                "settings.secretsEnabled",
            ],
            QueryEntity::Graphs => &[
                "id",
                "name",
                "projectId",
                "nodeCount",
                "edgeCount",
                "audit.createdBy",
                "audit.updatedBy",
            ],
            QueryEntity::Nodes => &["id", "label", "layer", "position.x", "position.y", "metadata"],
            QueryEntity::Edges => &["id", "sourceId", "targetId", "weight", "metadata"],
        }
    }
}

/// Supported actions.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QueryAction {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl QueryAction {
    fn as_str(&self) -> &'static str {
        match self {
            QueryAction::List => "list",
            QueryAction::Get => "get",
            QueryAction::Create => "create",
            QueryAction::Update => "update",
            QueryAction::Delete => "delete",
        }
    }
}

/// Run the `graphctl query` command.
pub async fn run_query_command(args: QueryArgs) -> Result<()> {
    let mut selection = build_operation(&args)?;
    let client = HttpGraphClient::new(&args.endpoint);
    let (result, pruned) = execute(&client, &mut selection, args.maximal).await?;

    if let Some(pruned) = pruned {
        eprintln!("{}", report_line(&pruned).yellow());
    }

    emit_response(&args, "ok", result)?;
    Ok(())
}

/// Arguments for `graphctl raw`: issue a caller-provided selection.
#[derive(Debug, Parser)]
pub struct RawArgs {
    /// Dotted field paths to select (repeatable).
    #[clap(long = "select", conflicts_with = "select_json")]
    pub select: Vec<String>,

    /// Full selection as inline JSON (reserved keys honored).
    #[clap(long = "select-json")]
    pub select_json: Option<String>,

    /// Request maximal visibility, pruning denied fields.
    #[clap(long)]
    pub maximal: bool,

    /// API endpoint to send the request to.
    #[clap(long, default_value = "http://localhost:3000/graph")]
    pub endpoint: String,

    /// Pretty-print the JSON response for humans.
    #[clap(long)]
    pub pretty: bool,
}

/// Run the `graphctl raw` command.
pub async fn run_raw_command(args: RawArgs) -> Result<()> {
    let mut selection = if let Some(text) = &args.select_json {
        let value: Value =
            serde_json::from_str(text).context("invalid JSON for --select-json")?;
        SelectionNode::from_value(&value)?
    } else if !args.select.is_empty() {
        SelectionNode::from_field_paths(&args.select)
    } else {
        bail!("raw requires --select or --select-json");
    };

    let client = HttpGraphClient::new(&args.endpoint);
    let (result, pruned) = execute(&client, &mut selection, args.maximal).await?;

    if let Some(pruned) = pruned {
        eprintln!("{}", report_line(&pruned).yellow());
    }

    print_json(&json!({"status": "ok", "result": result}), args.pretty)?;
    Ok(())
}

/// Issue a selection, through the pruning executor when `maximal`.
async fn execute<C: GraphClient>(
    client: &C,
    selection: &mut SelectionNode,
    maximal: bool,
) -> Result<(Value, Option<PrunedFields>)> {
    if maximal {
        let outcome = execute_with_pruning(client, selection).await?;
        let pruned = (!outcome.pruned.is_empty()).then_some(outcome.pruned);
        return Ok((outcome.data, pruned));
    }
    let data = client.issue(&selection.to_value()).await?;
    Ok((data, None))
}

/// Translate (entity, action) plus flags into one root selection.
fn build_operation(args: &QueryArgs) -> Result<SelectionNode> {
    let operation = operation_field(args.entity, args.action);
    let mut arguments = Map::new();

    match args.action {
        QueryAction::Get | QueryAction::Update | QueryAction::Delete => {
            let id = args.id.ok_or_else(|| {
                anyhow!("`--id` is required for {}", args.action.as_str())
            })?;
            arguments.insert("id".to_string(), json!(id));
        }
        QueryAction::List | QueryAction::Create => {}
    }

    if matches!(args.entity, QueryEntity::Nodes | QueryEntity::Edges) {
        let project = args
            .project
            .context("`--project` is required for nodes and edges")?;
        arguments.insert("projectId".to_string(), json!(project));
    }

    let input = document::build(&DocumentSpec {
        base: args.input.clone(),
        assignments: args.set.clone(),
        json_assignments: args.set_json.clone(),
    })?;
    match args.action {
        QueryAction::Create | QueryAction::Update => {
            let input = input.ok_or_else(|| {
                anyhow!(
                    "{} requires input; pass --input, --set or --set-json",
                    args.action.as_str()
                )
            })?;
            arguments.insert("input".to_string(), input);
        }
        _ if input.is_some() => {
            bail!("--input/--set/--set-json only apply to create and update")
        }
        _ => {}
    }

    let defaults = if args.maximal {
        args.entity.maximal_paths()
    } else {
        args.entity.default_paths()
    };
    let mut paths: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
    paths.extend(args.select.iter().cloned());
    let mut field = SelectionNode::from_field_paths(&paths);
    if !arguments.is_empty() {
        field = field.with_arguments(arguments);
    }

    let mut root = SelectionNode::new();
    root.fields.insert(operation, Selection::Node(field));
    Ok(root)
}

fn operation_field(entity: QueryEntity, action: QueryAction) -> String {
    match action {
        QueryAction::List => entity.as_str().to_string(),
        QueryAction::Get => entity.stem().to_lowercase(),
        QueryAction::Create => format!("create{}", entity.stem()),
        QueryAction::Update => format!("update{}", entity.stem()),
        QueryAction::Delete => format!("delete{}", entity.stem()),
    }
}

fn emit_response(args: &QueryArgs, status: &str, result: Value) -> Result<()> {
    let response = json!({
        "status": status,
        "entity": args.entity.as_str(),
        "action": args.action.as_str(),
        "result": result,
    });
    print_json(&response, args.pretty)
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}
