use anyhow::Context;
use clap::Parser;
use keyword_etl::core::ConfigProvider;
use keyword_etl::utils::error::ErrorSeverity;
use keyword_etl::utils::{logger, validation::Validate};
use keyword_etl::{EtlEngine, KeywordPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Keyword ETL with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "keyword-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the minimum search volume from config
    #[arg(long)]
    min_volume: Option<u64>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based keyword ETL");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(min_volume) = args.min_volume {
        config.filters.get_or_insert_with(Default::default).min_volume = Some(min_volume);
        tracing::info!("🔧 Minimum volume overridden to: {}", min_volume);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let storage = LocalStorage::current_dir();
    let pipeline = KeywordPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
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
    println!("  Tool: {}", config.tool());
    println!("  Inputs: {} files", config.input_files().len());
    println!("  Output: {}/{}.zip", config.output_path(), config.output_name());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    let options = config.pipeline_options();
    let report = config.report_options();

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📥 Input Files:");
    for file in config.input_files() {
        let status = if keyword_etl::adapters::tabular::is_supported(file) {
            "✅"
        } else {
            "⏭️ skipped (unsupported type)"
        };
        println!("  {} {}", file, status);
    }

    println!();
    println!("⚙️ Filters:");
    println!("  Columns: {:?}", options.columns);
    println!("  Minimum volume: {}", options.min_volume);
    println!("  Default stores: {}", options.forbidden.defaults().len());
    println!("  Custom words: {}", options.forbidden.custom().join(", "));
    println!("  Remove duplicates: {}", options.remove_duplicates);

    println!();
    println!("💾 Report:");
    println!("  Summary sheet: {}", report.include_summary);
    println!("  Questions only: {}", report.questions_only);
    if let Some(keyword) = &report.main_keyword {
        println!("  Main keyword: {}", keyword);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
