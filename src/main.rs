use clap::Parser;
use holiday_gate::app::report::{render_json, render_text};
use holiday_gate::utils::logger;
use holiday_gate::{check_safe, CliArgs, OutputFormat};
use tokio_util::sync::CancellationToken;

const EXIT_UNSAFE: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::debug!("CLI args: {:?}", args);

    // 驗證並正規化輸入
    let resolved = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("❌ Invalid input: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(EXIT_INVALID_INPUT);
        }
    };

    // Ctrl-C 取消所有進行中的查詢，仍會輸出已完成的結果
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupted, cancelling pending lookups");
            on_signal.cancel();
        }
    });

    let report = check_safe(&resolved.date, &resolved.countries, resolved.client, &cancel).await;

    match args.format {
        OutputFormat::Text => println!(
            "{}",
            render_text(&resolved.date, &resolved.countries, &report)
        ),
        OutputFormat::Json => println!("{}", render_json(&resolved.date, &report)?),
    }

    if !report.safe() {
        std::process::exit(EXIT_UNSAFE);
    }
    Ok(())
}
