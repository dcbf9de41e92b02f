use anyhow::Result;

use crate::cli::context::CliContext;

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();

    println!("Autoprobe");
    println!("=========");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE"));
    println!("Git Commit: {}", env!("GIT_HASH"));
    println!();

    println!("Configuration:");
    match ctx.config_path() {
        Some(path) => println!("- File: {}", path.display()),
        None => println!("- File: (defaults)"),
    }
    println!("- Headless: {}", config.browser.headless);
    println!(
        "- Timeouts: action {}ms, navigation {}ms, network idle {}ms",
        config.timeouts.action_ms, config.timeouts.navigation_ms, config.timeouts.network_idle_ms
    );
    println!(
        "- Self-healing: {} (model {}, {} API key(s))",
        if config.healer.enabled { "enabled" } else { "disabled" },
        config.llm.model,
        config.llm.api_keys.len()
    );
    Ok(())
}
