use clap::Parser;
use inspect_ai_common::{summarize, InspectionDocument};
use inspect_ai_rust::{analyzer, capture, cli, config, error, interactive, jwt, session};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, output } => {
            println!("📸 inspect-ai - 写真解析\n");

            println!("[1/2] 写真を読み込み中...");
            let captured =
                capture::capture_image(&image, config.max_image_size, config.jpeg_quality)?;
            println!("✔ {} ({}x{})\n", captured.file_name, captured.width, captured.height);

            let client = analyzer::AnalysisClient::from_config(&config)?;
            println!("[2/2] AI解析中... ({})", client.url());
            let doc = client.analyze_image(&captured).await?;
            println!("✔ 解析完了: {} ({}項目)\n", doc.device, doc.item_count());

            let json = serde_json::to_string_pretty(&doc)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Inspect { image, offline, output } => {
            println!("🔧 inspect-ai - 安全検査\n");
            let options = interactive::InteractiveOptions { image, offline, output };
            interactive::run_interactive(&config, options).await?;
        }

        Commands::Summary { input, measured } => {
            let content = std::fs::read_to_string(&input)?;
            let doc: InspectionDocument = serde_json::from_str(&content)?;
            let measured = measured
                || doc
                    .extensions
                    .get(session::MEASURED_FIELD)
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

            println!("📋 {} ({})\n", doc.device, doc.session_id);
            interactive::print_summary(&summarize(&doc, measured));
        }

        Commands::Jwt => {
            let client = jwt::JwtClient::new(config.jwt_settings()?, config.timeout())?;
            let token = client.fetch_jwt().await?;
            println!("{}", token);
        }

        Commands::Config { set_analysis_url, set_timeout, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_analysis_url {
                config.set_analysis_url(url)?;
                changed = true;
                println!("✔ 解析APIのURLを設定しました");
            }

            if let Some(seconds) = set_timeout {
                config.timeout_seconds = seconds;
                changed = true;
                println!("✔ タイムアウトを{}秒に設定しました", seconds);
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  解析API: {}", config.analysis_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!(
                    "  JWT API: {}",
                    config.jwt_settings().ok().and_then(|s| s.url).unwrap_or_else(|| "未設定".into())
                );
            }
        }
    }

    Ok(())
}
