use clap::Parser;
use elevator_client::app::{commands, output::notify_error};
use elevator_client::utils::error::ErrorSeverity;
use elevator_client::utils::logger;
use elevator_client::CliConfig;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli.command);

    if let Err(e) = commands::run(&cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        notify_error(&e);

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,      // 使用者取消
            ErrorSeverity::Medium => 2,   // 可重試
            ErrorSeverity::High => 1,     // 請求或輸入錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
