use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xsearch::core::config::Config;
use xsearch::core::logging;
use xsearch::parallel::orchestrator::Pipeline;
use xsearch::reader::corpus::collect_files;
use xsearch::server::query;

#[derive(Parser)]
#[command(name = "xsearch")]
#[command(about = "Concurrent TF-IDF indexer with a query endpoint", long_about = None)]
struct Cli {
    /// JSON config file; unset fields keep their defaults
    #[arg(long, env = "XSEARCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Number of reader/indexer lanes
    #[arg(long, global = true)]
    lanes: Option<usize>,

    /// Query endpoint address
    #[arg(long, global = true)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index files and directories, then print the run report
    Index {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Index, then answer queries over TCP
    Serve {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Send a query to a running server
    Query {
        text: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(lanes) = cli.lanes {
        config.num_lanes = lanes;
    }
    if let Some(addr) = &cli.addr {
        config.server_addr = addr.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn build_index(config: Config, paths: Vec<PathBuf>) -> Result<Pipeline> {
    // Worker threads block; keep them off the async runtime
    let pipeline = tokio::task::spawn_blocking(move || -> Result<Pipeline> {
        let files = collect_files(&paths);
        let mut pipeline = Pipeline::new(config)?;
        let report = pipeline.run(&files)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(pipeline)
    })
    .await??;
    Ok(pipeline)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Index { paths } => {
            build_index(config, paths).await?;
        }
        Commands::Serve { paths } => {
            let addr = config.server_addr.clone();
            let pipeline = Arc::new(build_index(config, paths).await?);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            query::serve(listener, pipeline).await?;
        }
        Commands::Query { text } => {
            let reply = query::send_query(&config.server_addr, &text).await?;
            println!("{}", reply.trim_end());
        }
    }

    Ok(())
}
