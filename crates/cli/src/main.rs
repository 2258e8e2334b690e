use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linebot")]
#[command(about = "LINE bot webhook server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init {
        /// Config file path (default: LINEBOT_CONFIG_PATH or ~/.linebot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook server. Channel credentials come from the config file or CHANNEL_ACCESS_TOKEN / CHANNEL_SECRET (a .env file is read first).
    Serve {
        /// Config file path (default: LINEBOT_CONFIG_PATH or ~/.linebot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Listen port (default from PORT, config, or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("linebot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(linebot::config::default_config_path);
    let dir = linebot::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = linebot::config::load_config(config_path)?;
    log::debug!("config: {}", path.display());
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting server on {}:{}", config.server.bind, config.server.port);
    linebot::gateway::run_gateway(config).await
}
