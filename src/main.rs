use anyhow::Result;
use clap::Parser;
use dokumentu::cli::Args;
use dokumentu::config::config::Config;
use dokumentu::ui::app::ViewerApp;
use dokumentu::utils::logging::{init_tracing, LoggingOptions};

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize the viewer.");
    Ok(())
}

fn load_config(args: &Args) -> Config {
    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({:#}), using defaults", e);
        Config::default()
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.generate_config {
        return generate_config();
    }

    let config = load_config(&args);

    let logging = LoggingOptions {
        level: config.logging.level.clone(),
        debug: args.debug,
        log_to_file: config.logging.log_to_file,
    };
    match init_tracing(&logging) {
        Ok(Some(path)) => eprintln!("Logs will be written to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("Warning: logging unavailable: {:#}", e),
    }

    let csv_options = args.csv_options(&config)?;
    ViewerApp::new(config, csv_options, args.files).run()
}
