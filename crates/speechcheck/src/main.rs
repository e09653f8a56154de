use anyhow::Result;
use clap::{Parser, Subcommand};
use speechcheck_common::{logger, AppConfig};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
            return;
        }
    }

    // Fallback to default dotenv behavior
    dotenv::dotenv().ok();
}

#[derive(Parser)]
#[command(name = "speechcheck")]
#[command(about = "speechcheck - audio transcription endpoint with keyword counting", long_about = None)]
struct Cli {
    /// Log to the console only (no log file)
    #[arg(long, global = true)]
    console_log: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Directory for per-request audio files
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },
}

/// Apply command-line overrides on top of the environment configuration
fn apply_overrides(config: &mut AppConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            temp_dir,
        } => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(temp_dir) = temp_dir {
                config.temp_dir = Some(temp_dir);
                config.ensure_directories()?;
            }
        }
    }
    Ok(())
}

fn init_logging(config: &AppConfig, console_only: bool) -> Result<()> {
    if console_only {
        logger::setup_console_logging(&config.log_level)?;
    } else {
        logger::setup_logging(&config.log_dir, &config.log_level)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    if let Some(command) = cli.command {
        apply_overrides(&mut config, command)?;
    }

    init_logging(&config, cli.console_log)?;

    tracing::info!("speechcheck starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Provider: {:?} ({})", config.stt_provider, config.stt_model);

    println!("Server listening on http://{}", config.server_bind_address());

    speechcheck_server::start_server(config).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("speechcheck").chain(args.iter().copied())).unwrap()
    }

    fn serve_command(cli: Cli) -> Commands {
        cli.command.expect("serve subcommand")
    }

    #[test]
    fn test_no_subcommand() {
        let cli = parse(&["--console-log"]);
        assert!(cli.console_log);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides_host_and_port() {
        let mut config = AppConfig::default();
        let command = serve_command(parse(&["serve", "--host", "127.0.0.1", "--port", "9000"]));

        apply_overrides(&mut config, command).unwrap();

        assert_eq!(config.server_bind_address(), "127.0.0.1:9000");
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_serve_without_flags_keeps_environment() {
        let mut config = AppConfig::default();
        config.server_port = 4100;

        apply_overrides(&mut config, serve_command(parse(&["serve"]))).unwrap();

        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 4100);
    }

    #[test]
    fn test_serve_temp_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        let mut config = AppConfig::default();
        config.log_dir = root.path().join("log");

        let uploads_arg = uploads.to_str().unwrap();
        let command = serve_command(parse(&["serve", "--temp-dir", uploads_arg]));
        apply_overrides(&mut config, command).unwrap();

        assert_eq!(config.temp_dir.as_deref(), Some(uploads.as_path()));
        assert!(uploads.is_dir());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Cli::try_parse_from(["speechcheck", "serve", "--port", "99999"]);
        assert!(result.is_err());
    }
}
