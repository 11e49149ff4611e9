use anyhow::Context;
use budget_sankey::core::ConfigProvider;
use budget_sankey::utils::error::ErrorSeverity;
use budget_sankey::utils::validation::{is_remote_source, Validate};
use budget_sankey::utils::logger;
use budget_sankey::{EtlEngine, LocalStorage, SankeyPipeline, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-sankey")]
#[command(about = "Build budget Sankey graphs from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sankey.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override the revenue year column from config
    #[arg(long)]
    revenue_year: Option<String>,

    /// Override the output directory from config
    #[arg(long)]
    output_path: Option<String>,

    /// Show what would be built without fetching the dataset
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_with_level(config.log_level(), args.verbose, args.log_json);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(year) = args.revenue_year.clone() {
        tracing::info!("🔧 Revenue year overridden to: {}", year);
        config.transform.revenue_year = Some(year);
    }
    if let Some(path) = args.output_path.clone() {
        tracing::info!("🔧 Output path overridden to: {}", path);
        config.load.output_path = path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        perform_dry_run(&config)?;
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = SankeyPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Sankey diagrams built successfully!");
            println!("✅ Sankey diagrams built successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Dataset: {}", config.dataset_source());
    println!("  Revenue year: {}", config.revenue_year());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Dataset Source:");
    let source = config.dataset_source();
    if is_remote_source(source) {
        println!("  URL: {} (timeout {}s)", source, config.request_timeout_seconds());
    } else {
        let metadata = std::fs::metadata(source)
            .with_context(|| format!("dataset file '{}' is not readable", source))?;
        println!("  File: {} ({} bytes)", source, metadata.len());
    }

    println!();
    println!("📊 Diagram slots:");
    for slot in config.slots() {
        println!(
            "  {} -> {} (reads '{}')",
            slot.kind,
            slot.container,
            slot.kind.collection()
        );
    }

    println!();
    println!("💾 Output files:");
    match config.zip_filename() {
        Some(filename) if config.compression_enabled() => {
            println!("  {}/{} (ZIP bundle)", config.output_path(), filename)
        }
        _ => {
            for slot in config.slots() {
                for format in config.output_formats() {
                    println!("  {}/{}.{}", config.output_path(), slot.container, format);
                }
            }
            println!("  {}/manifest.json", config.output_path());
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
    Ok(())
}
