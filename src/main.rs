use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use convert_hub::api::ApiServer;
use convert_hub::{Category, Config, ConversionService, ExecutionMode, ToolCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Convert Hub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("File conversion service with per-job status tracking")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
        )
        .arg(
            Arg::new("uploads-dir")
                .short('u')
                .long("uploads-dir")
                .value_name("DIR")
                .help("Directory holding per-job uploads, outputs and status files")
        )
        .arg(
            Arg::new("background")
                .long("background")
                .help("Return from submissions immediately and convert on background workers")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("list-tools")
                .long("list-tools")
                .help("Print the tool catalog and exit")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    if matches.get_flag("list-tools") {
        print_catalog(&ToolCatalog::builtin());
        return Ok(());
    }

    // Load configuration
    let loaded = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(&PathBuf::from(path)),
        None => Config::load(),
    };
    let (mut config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(dir) = matches.get_one::<String>("uploads-dir") {
        config.storage.uploads_dir = PathBuf::from(dir);
    }
    if matches.get_flag("background") {
        config.jobs.execution = ExecutionMode::Background;
    }

    // Initialize logging
    let level = if matches.get_flag("verbose") {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("convert_hub={level},tower_http={level},warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    config.validate()?;
    info!("🚀 Convert Hub starting...");
    info!("{}", config.summary());

    let service = ConversionService::new(config).await?;
    ApiServer::new(service).start().await
}

fn print_catalog(catalog: &ToolCatalog) {
    for category in Category::ALL {
        let tools = catalog.list_by_category(category);
        if tools.is_empty() {
            continue;
        }
        let title = catalog
            .category_info(category)
            .map(|info| info.title)
            .unwrap_or_else(|| category.key());
        println!("{} ({})", title, tools.len());
        for tool in tools {
            println!("  {:<28} {:<22} {}", tool.slug, tool.label, tool.accepted_extensions());
        }
        println!();
    }
}
