use clap::Parser;
use recipe_etl::config::toml_config::SourceKind;
use recipe_etl::domain::ports::ConfigProvider;
use recipe_etl::utils::error::ErrorSeverity;
use recipe_etl::utils::{logger, validation::Validate};
use recipe_etl::{CleanerConfig, CliArgs, EtlEngine, LocalStorage, RecipePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("Starting recipe-etl ({})", config.pipeline.name);
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if args.dry_run {
        display_plan(&config);
        return Ok(());
    }

    let source = config.build_source()?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = RecipePipeline::new(source, storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Recipes cleaned successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Cleaning failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_plan(config: &CleanerConfig) {
    println!("🔍 Dry run, nothing will be read or written");
    println!("  Pipeline: {}", config.pipeline.name);
    match config.source.r#type {
        SourceKind::File => println!(
            "  Source: file {}",
            config.source.path.as_deref().unwrap_or("")
        ),
        SourceKind::Api => println!(
            "  Source: GET {}",
            config.source.endpoint.as_deref().unwrap_or("")
        ),
    }
    println!("  Output: {}", config.output_file_path());
    println!("  On invalid records: {:?}", config.invalid_record_policy());

    let mapping = config.field_mapping();
    if !mapping.is_empty() {
        println!("  Field mapping:");
        let mut pairs: Vec<_> = mapping.iter().collect();
        pairs.sort();
        for (from, to) in pairs {
            println!("    {} -> {}", from, to);
        }
    }
}
