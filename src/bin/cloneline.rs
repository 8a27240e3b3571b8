//! cloneline CLI: clone engagements and inspect clone lineage.
//!
//! Usage:
//!   cloneline clone --source <id> --client <id> [--artifact <id>]... [--db path]
//!   cloneline lineage <engagement-id>
//!   cloneline classify <file.json> [--template <id>]

use clap::{Args, Parser, Subcommand};
use cloneline::{
    ArtifactId, ArtifactStatus, ClientId, CloneApi, CloneRequest, EngagementId, EngagementStore,
    FieldCatalog, MemoryStore, NewArtifact, NewEngagement, OpenStore, SqliteStore,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cloneline",
    version,
    about = "Clone client engagements with sanitized content and tracked lineage"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Field catalog (.yaml/.yml/.json); built-in catalog when absent
    #[arg(long, global = true, env = "CLONELINE_FIELDS")]
    fields: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone an engagement for a target client
    Clone {
        /// Source engagement id
        #[arg(long)]
        source: String,
        /// Target client id
        #[arg(long)]
        client: String,
        /// Clone only these artifacts (repeatable, in order)
        #[arg(long = "artifact")]
        artifacts: Vec<String>,
        /// Copy content without clearing client data
        #[arg(long)]
        keep_client_data: bool,
        /// Clear exactly these fields instead of classifying (repeatable)
        #[arg(long = "clear-field")]
        clear_fields: Vec<String>,
        /// Name for the new engagement
        #[arg(long)]
        name: Option<String>,
        /// Include per-artifact outcomes in the output
        #[arg(long)]
        detailed: bool,
    },
    /// Show parent, self, and children of an engagement
    Lineage {
        engagement: String,
        /// Print a flat node list instead of the parent/self/children view
        #[arg(long)]
        flat: bool,
    },
    /// Show lineage counts for an engagement
    Stats { engagement: String },
    /// Classify the keys of a JSON object file
    Classify {
        file: PathBuf,
        #[arg(long)]
        template: Option<String>,
    },
    /// Redact emails, phone numbers, and company names from text (stdin if no file)
    Scrub { file: Option<PathBuf> },
    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Manage engagements
    Engagement {
        #[command(subcommand)]
        action: EngagementAction,
    },
    /// Manage artifacts
    Artifact {
        #[command(subcommand)]
        action: ArtifactAction,
    },
}

#[derive(Subcommand)]
enum ClientAction {
    /// Create a client and print its id
    Create { name: String },
}

#[derive(Subcommand)]
enum EngagementAction {
    /// Create an engagement for a client and print its id
    Create {
        name: String,
        #[arg(long)]
        client: String,
    },
    /// List an engagement's artifacts
    Artifacts {
        engagement: String,
        /// Include archived artifacts
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ArtifactAction {
    /// Import a file as an artifact of an engagement
    Import {
        file: PathBuf,
        #[arg(long)]
        engagement: String,
        #[arg(long)]
        template: String,
        /// Title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// draft, in_review, final, or archived
        #[arg(long, default_value = "draft")]
        status: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cloneline=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloneline=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default database path (~/.local/share/cloneline/cloneline.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("cloneline").join("cloneline.db")
}

fn load_catalog(path: Option<&Path>) -> Result<FieldCatalog, String> {
    match path {
        Some(p) => FieldCatalog::load(p)
            .map_err(|e| format!("Failed to load field catalog {}: {}", p.display(), e)),
        None => Ok(FieldCatalog::builtin()),
    }
}

fn open_api(global: &GlobalArgs) -> Result<CloneApi, String> {
    let db_path = global.db.clone().unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path)
        .map_err(|e| format!("Failed to open database {}: {}", db_path.display(), e))?;
    let catalog = load_catalog(global.fields.as_deref())?;
    Ok(CloneApi::new(Arc::new(store), Arc::new(catalog)))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String, String> {
    let mut text = String::new();
    match file {
        Some(path) => {
            text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
        }
    }
    Ok(text)
}

#[allow(clippy::too_many_arguments)]
fn cmd_clone(
    api: &CloneApi,
    source: &str,
    client: &str,
    artifacts: Vec<String>,
    keep_client_data: bool,
    clear_fields: Vec<String>,
    name: Option<String>,
    detailed: bool,
) -> i32 {
    let mut request = CloneRequest::new(EngagementId::from(source), ClientId::from(client));
    if !artifacts.is_empty() {
        request = request.with_selection(artifacts.into_iter().map(ArtifactId::from).collect());
    }
    if keep_client_data {
        request = request.keep_client_data();
    }
    if !clear_fields.is_empty() {
        request = request.with_fields_to_clear(clear_fields);
    }
    if let Some(name) = name {
        request = request.with_name(name);
    }

    let outcome = if detailed {
        api.clone_detailed(&request).map(|r| print_json(&r))
    } else {
        api.clone_engagement(&request).map(|r| print_json(&r))
    };
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_lineage(api: &CloneApi, engagement: &str, flat: bool) -> i32 {
    let printed = if flat {
        api.lineage_nodes(engagement).map(|n| print_json(&n))
    } else {
        api.lineage(engagement).map(|v| print_json(&v))
    };
    printed.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn cmd_stats(api: &CloneApi, engagement: &str) -> i32 {
    match api.lineage_stats(engagement) {
        Ok(stats) => print_json(&stats),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_classify(api: &CloneApi, file: &Path, template: Option<&str>) -> i32 {
    let text = match read_input(Some(file)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(content)) => print_json(&api.classify(&content, template)),
        Ok(_) => {
            eprintln!("Error: '{}' is not a JSON object", file.display());
            1
        }
        Err(e) => {
            eprintln!("Error: invalid JSON in '{}': {}", file.display(), e);
            1
        }
    }
}

fn cmd_scrub(api: &CloneApi, file: Option<&Path>) -> i32 {
    match read_input(file) {
        Ok(text) => {
            print!("{}", api.sanitize_text(&text));
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_client_create(api: &CloneApi, name: &str) -> i32 {
    match api.store().create_client(name) {
        Ok(client) => {
            println!("{}", client.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_engagement_create(api: &CloneApi, name: &str, client: &str) -> i32 {
    match api
        .store()
        .create_engagement(NewEngagement::draft(ClientId::from(client), name))
    {
        Ok(engagement) => {
            println!("{}", engagement.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_engagement_artifacts(api: &CloneApi, engagement: &str, all: bool) -> i32 {
    let exclude: &[ArtifactStatus] = if all { &[] } else { &[ArtifactStatus::Archived] };
    let artifacts = match api
        .store()
        .list_artifacts(&EngagementId::from(engagement), exclude)
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if artifacts.is_empty() {
        println!("No artifacts.");
        return 0;
    }
    println!("{:<36}  {:<20}  {:<10}  {:>3}  TITLE", "ID", "TEMPLATE", "STATUS", "VER");
    println!("{}", "-".repeat(90));
    for a in artifacts {
        println!(
            "{:<36}  {:<20}  {:<10}  {:>3}  {}",
            a.id,
            a.template_id,
            a.status.as_str(),
            a.version,
            a.title
        );
    }
    0
}

fn cmd_artifact_import(
    api: &CloneApi,
    file: &Path,
    engagement: &str,
    template: &str,
    title: Option<String>,
    status: &str,
) -> i32 {
    let status: ArtifactStatus = match status.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let content = match read_input(Some(file)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let title = title.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string())
    });
    let fields = NewArtifact::draft(EngagementId::from(engagement), template, title, Some(content))
        .with_status(status);
    match api.store().create_artifact(fields) {
        Ok(artifact) => {
            println!("{}", artifact.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    // Text scrubbing and classification need only the catalog, not a database
    let api = match cli.command {
        Commands::Scrub { .. } | Commands::Classify { .. } => {
            load_catalog(cli.global.fields.as_deref())
                .map(|catalog| CloneApi::new(Arc::new(MemoryStore::new()), Arc::new(catalog)))
        }
        _ => open_api(&cli.global),
    };
    let api = match api {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Clone {
            source,
            client,
            artifacts,
            keep_client_data,
            clear_fields,
            name,
            detailed,
        } => cmd_clone(
            &api,
            &source,
            &client,
            artifacts,
            keep_client_data,
            clear_fields,
            name,
            detailed,
        ),
        Commands::Lineage { engagement, flat } => cmd_lineage(&api, &engagement, flat),
        Commands::Stats { engagement } => cmd_stats(&api, &engagement),
        Commands::Classify { file, template } => cmd_classify(&api, &file, template.as_deref()),
        Commands::Scrub { file } => cmd_scrub(&api, file.as_deref()),
        Commands::Client { action } => match action {
            ClientAction::Create { name } => cmd_client_create(&api, &name),
        },
        Commands::Engagement { action } => match action {
            EngagementAction::Create { name, client } => {
                cmd_engagement_create(&api, &name, &client)
            }
            EngagementAction::Artifacts { engagement, all } => {
                cmd_engagement_artifacts(&api, &engagement, all)
            }
        },
        Commands::Artifact { action } => match action {
            ArtifactAction::Import {
                file,
                engagement,
                template,
                title,
                status,
            } => cmd_artifact_import(&api, &file, &engagement, &template, title, &status),
        },
    };
    std::process::exit(code);
}
