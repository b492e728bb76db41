use clap::{CommandFactory, Parser};
use std::io::Write;
use route_rewriter::utils::logger;
use route_rewriter::{rewrite_routes, CliConfig, RouteError};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config.resolve() {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            // 缺少參數：印出用法後正常結束
            println!("{}", CliConfig::command().render_usage());
            return;
        }
        Err(e) => fail(e),
    };

    match rewrite_routes(&settings, config.dry_run) {
        Ok(rewrite) => {
            if config.dry_run {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(&rewrite.content).and_then(|_| stdout.flush()) {
                    fail(RouteError::io("<stdout>", e));
                }
            }
            if config.report {
                match serde_json::to_string_pretty(&rewrite.report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => fail(e.into()),
                }
            }
        }
        Err(e) => fail(e),
    }
}

fn fail(e: RouteError) -> ! {
    tracing::error!("{}", e);
    tracing::error!("Suggestion: {}", e.recovery_suggestion());
    eprintln!("error: {}", e);
    std::process::exit(e.exit_code());
}
