use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "doc-capture")]
#[command(about = "Capture an identity document and crop it with the detection service")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/doc-capture/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve this image as the camera feed instead of the simulated camera
    #[arg(long, global = true)]
    still: Option<PathBuf>,

    /// Where the resulting image is written
    #[arg(short, long, global = true, default_value = "detected-document.jpg")]
    output: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an image file for detection
    Upload {
        /// Image to submit
        file: PathBuf,
    },

    /// Take a single frame from the camera
    Capture {
        /// Submit the frame and keep the cropped document
        #[arg(short, long)]
        submit: bool,
    },

    /// Sample camera frames until a document is detected
    Auto {
        /// Give up after this many seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective settings
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=doc_capture=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => path,
        None => doc_capture::settings::store::default_settings_path()
            .ok_or("no configuration directory; pass --config")?,
    };
    let ctx = cli::Context {
        config,
        still: cli.still,
        output: cli.output,
    };

    match cli.command {
        Commands::Upload { file } => cli::upload_file(&ctx, &file).await,
        Commands::Capture { submit } => cli::capture_frame(&ctx, submit).await,
        Commands::Auto { timeout } => cli::auto_detect(&ctx, timeout).await,
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => cli::init_config(&ctx, force),
            ConfigAction::Show => cli::show_config(&ctx),
        },
    }
}
