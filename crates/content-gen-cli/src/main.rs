//! content-gen - Interactive blog-post generator
//!
//! Usage:
//!     content-gen [OPTIONS]
//!
//! Environment Variables:
//!     CONTENT_GEN_REGION: AWS region (default: us-west-2)
//!     CONTENT_GEN_MODEL_ID: Bedrock model identifier (default: anthropic.claude-v2)
//!     CONTENT_GEN_MAX_TOKENS: Token budget per generation (default: 300)
//!     CONTENT_GEN_TEMPERATURE: Sampling temperature (default: 0.7)
//!     CONTENT_GEN_TABLE: DynamoDB table for the generation log (default: ContentGenerationLog)
//!     CONTENT_GEN_OUTPUT_DIR: Directory for local content copies (default: .)

use anyhow::{Context, Result};
use clap::Parser;
use content_gen::{
    ContentFileWriter, ContentGenerator, InteractiveSession, SessionEnd, Settings, SETTINGS,
};
use std::io;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Content Generator - blog posts from a topic, logged to DynamoDB
#[derive(Parser, Debug)]
#[command(name = "content-gen")]
#[command(version, about = "Generate blog posts with Bedrock and log them to DynamoDB")]
#[command(after_help = r#"Examples:
    # Run with defaults (us-west-2, anthropic.claude-v2, ContentGenerationLog)
    content-gen

    # Use another region and table
    content-gen --region eu-central-1 --table BlogDrafts

    # Longer posts, written to ./drafts
    content-gen --max-tokens 1200 --output-dir drafts
"#)]
struct Cli {
    /// AWS region for Bedrock and DynamoDB
    #[arg(long, env = "CONTENT_GEN_REGION")]
    region: Option<String>,

    /// Bedrock model identifier
    #[arg(long, env = "CONTENT_GEN_MODEL_ID")]
    model: Option<String>,

    /// Token budget per generation
    #[arg(long, env = "CONTENT_GEN_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(long, env = "CONTENT_GEN_TEMPERATURE")]
    temperature: Option<f32>,

    /// DynamoDB table for the generation log
    #[arg(long, env = "CONTENT_GEN_TABLE")]
    table: Option<String>,

    /// Directory receiving `<id>_content.txt` copies
    #[arg(long, env = "CONTENT_GEN_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Do not write local content files
    #[arg(long)]
    no_file: bool,

    /// Assume the table already exists
    #[arg(long)]
    skip_provision: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Overlay command-line values on the environment defaults
    fn settings(&self) -> Settings {
        let mut settings = SETTINGS.clone();
        if let Some(region) = &self.region {
            settings.region = region.clone();
        }
        if let Some(model) = &self.model {
            settings.model_id = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            settings.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            settings.temperature = temperature;
        }
        if let Some(table) = &self.table {
            settings.table_name = table.clone();
        }
        if self.skip_provision {
            settings.provision_table = false;
        }
        settings
    }

    fn file_writer(&self) -> Option<ContentFileWriter> {
        (!self.no_file).then(|| ContentFileWriter::new(&self.output_dir))
    }
}

/// Logs go to stderr so they never mix with generated content on stdout
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Print application header
fn print_header(settings: &Settings, cli: &Cli) {
    println!("{}", "=".repeat(50));
    println!("Content Generator - Bedrock + DynamoDB");
    println!("{}", "=".repeat(50));
    println!("Region: {}", settings.region);
    println!("Model: {}", settings.model_id);
    println!("Max Tokens: {}", settings.max_tokens);
    println!("Table: {}", settings.table_name);
    if cli.no_file {
        println!("Local copies: disabled");
    } else {
        println!("Local copies: {}", cli.output_dir.display());
    }
    println!("{}", "=".repeat(50));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.settings();
    print_header(&settings, &cli);

    let generator = ContentGenerator::connect(&settings)
        .await
        .context("Failed to initialise content generator")?;

    let mut session = InteractiveSession::new(generator, cli.file_writer());
    let interrupt = async {
        // If the handler cannot be installed, only quit/exit and EOF end the session.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let summary = session
        .run(BufReader::new(tokio::io::stdin()), io::stdout(), interrupt)
        .await?;

    info!(
        "Session ended ({:?}): {} generation attempt(s), {} stored",
        summary.end, summary.attempts, summary.stored
    );
    // A pending stdin read would keep the runtime from shutting down.
    if summary.end == SessionEnd::Interrupted {
        std::process::exit(0);
    }

    Ok(())
}
