use clap::Parser;
use proxify_probe::config::normalize_go_style_args;
use proxify_probe::utils::{logger, validation::Validate};
use proxify_probe::{CliConfig, LocalStorage, ProbeRunner, Settings};

#[tokio::main]
async fn main() {
    // 相容 Go 風格的單破折號旗標
    let cli = CliConfig::parse_from(normalize_go_style_args(std::env::args_os()));

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting proxify-probe");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 合併設定並驗證
    let settings = match Settings::resolve(&cli).and_then(|settings| {
        settings.validate()?;
        Ok(settings)
    }) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 依序執行各個指令路徑
    let runner = ProbeRunner::new_with_monitoring(settings, LocalStorage::current_dir(), cli.monitor);

    match runner.run().await {
        Ok(summary) => {
            if let Some(bytes) = summary.ca_bytes {
                tracing::info!(
                    "📁 CA certificate saved to {} ({} bytes)",
                    runner.settings().ca_bundle_path,
                    bytes
                );
            }
            tracing::info!("✅ Done");
        }
        Err(e) => {
            tracing::error!(
                "❌ Probe failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }
}
