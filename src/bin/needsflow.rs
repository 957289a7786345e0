use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use needsflow::cli::{
    catalog_from_config, offline_catalog, open_directory, parse_input, render_flow_table,
    schema_exports,
};
use needsflow::directory::{seed_defaults, JsonFileDirectory};
use needsflow::utils::LoggingConfig;
use needsflow::NeedsConfig;

#[derive(Parser)]
#[command(name = "needsflow", version, about = "YOLO Needs AI flows", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Flows {
        #[command(subcommand)]
        command: FlowsCommand,
    },
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Run one flow with JSON input.
    Run {
        flow: String,
        #[arg(long)]
        input: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Match a free-text need to directory providers.
    Search {
        need: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Write the default providers to a JSON directory file.
    Seed {
        #[arg(long, default_value = "directory.json")]
        directory: PathBuf,
    },
}

#[derive(Subcommand)]
enum FlowsCommand {
    List,
}

#[derive(Subcommand)]
enum SchemaCommand {
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = true)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Flows {
            command: FlowsCommand::List,
        } => {
            let catalog = offline_catalog()?;
            print!("{}", render_flow_table(&catalog.definitions()));
        }
        Command::Schema {
            command: SchemaCommand::Export { output, pretty },
        } => handle_schema_export(output, pretty)?,
        Command::Run {
            flow,
            input,
            config,
            directory,
        } => {
            let config = load_config(config)?;
            let store = open_directory(directory.as_deref()).await?;
            let catalog = catalog_from_config(&config, store)?;
            let output = catalog.run_json(&flow, parse_input(&input)?).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Search {
            need,
            config,
            directory,
        } => {
            let config = load_config(config)?;
            let store = open_directory(directory.as_deref()).await?;
            let catalog = catalog_from_config(&config, store)?;
            let providers = catalog.smart_search(&need).await?;
            if providers.is_empty() {
                println!("No available providers matched `{need}`.");
            } else {
                println!("{}", serde_json::to_string_pretty(&providers)?);
            }
        }
        Command::Seed { directory } => {
            let store = JsonFileDirectory::new(&directory);
            let report = seed_defaults(&store).await?;
            println!(
                "Seeded {} providers into `{}`",
                report.seeded,
                directory.display()
            );
        }
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<NeedsConfig> {
    Ok(match path {
        Some(path) => NeedsConfig::load(path)?,
        None => NeedsConfig::from_env(),
    })
}

fn handle_schema_export(output: Option<PathBuf>, pretty: bool) -> anyhow::Result<()> {
    let entries = schema_exports()?;
    let content = if pretty {
        serde_json::to_string_pretty(&entries)?
    } else {
        serde_json::to_string(&entries)?
    };

    if let Some(path) = output {
        fs::write(&path, content)?;
        println!("Schema exported to `{}`", path.display());
    } else {
        println!("{content}");
    }
    Ok(())
}
