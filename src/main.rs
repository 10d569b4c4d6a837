use clap::{Parser, Subcommand};
use fineprint::{Config, DocumentAnalyzer, Reporter};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fineprint")]
#[command(about = "Analyze terms-of-service and privacy-policy documents for risky clauses")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a terms-of-service document
    Analyze {
        /// File containing the document text
        #[arg(short, long)]
        file: PathBuf,

        /// Source URL of the document, used as the cache key
        #[arg(short, long)]
        url: String,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./analysis-output")]
        output: PathBuf,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.fineprint.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            url,
            config,
            output,
        } => {
            analyze_document(file, url, config, output).await?;
        }
        Commands::Config { output } => {
            generate_config(output)?;
        }
    }

    Ok(())
}

async fn analyze_document(
    file: PathBuf,
    url: String,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
) -> anyhow::Result<()> {
    println!("🚀 Starting Fineprint Analysis");
    println!("==============================");

    let start_time = Instant::now();

    let config = if let Some(config_path) = config_path {
        Config::from_file(&config_path)?
    } else {
        Config::load()?
    };

    println!("📄 Document: {}", file.display());
    println!("🔗 Source URL: {}", url);
    println!("📤 Output directory: {}", output_path.display());

    let text = std::fs::read_to_string(&file)?;

    let analyzer = DocumentAnalyzer::new(config)?;
    let verdict = analyzer.analyze(&text, &url).await?;

    let duration = start_time.elapsed();

    println!();
    verdict.print_summary();

    println!("\n📊 Generating reports...");
    let reporter = Reporter::new();
    let report = reporter.generate_report(&verdict, &url, duration.as_millis());
    let exported_files = reporter.export_report(&report, &output_path)?;

    println!("\n✅ Analysis completed in {:.2}s", duration.as_secs_f64());
    println!("📁 Reports exported to:");
    for file in exported_files {
        println!("   - {}", file.display());
    }

    Ok(())
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = output_path.unwrap_or_else(|| {
        Config::default_config_path().unwrap_or_else(|_| PathBuf::from("fineprint.toml"))
    });

    println!("📝 Generating configuration file: {}", config_path.display());

    let documented_config = Config::create_documented_config();
    std::fs::write(&config_path, documented_config)?;

    println!("✅ Configuration file created successfully!");
    println!("💡 Edit the file to customize your analysis settings.");
    println!();
    println!("🔧 Key configuration areas:");
    println!("  • LLM provider settings (OpenAI, Anthropic, Ollama)");
    println!("  • Chunk size and retry limits");
    println!("  • Cache expiration and capacity");
    println!("  • API keys (or use environment variables)");

    Ok(())
}
