use clap::Parser;

use crate::annotations::MapRenderMode;

mod annotations;
mod config;
mod controller;
mod gui;
mod location;
mod position;
mod routing;
mod search;
mod services;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse capital cities on an interactive map.", long_about = None)]
struct Cli {
    /// Initial map style: standard, hybrid, satellite
    #[arg(long)]
    mode: Option<String>,

    /// Never look up the device location
    #[arg(long)]
    no_location: bool,

    /// Show capital callouts as plain dialogs instead of opening Wikipedia
    #[arg(long)]
    plain_callouts: bool,

    /// Override the place-search endpoint
    #[arg(long, value_name = "URL")]
    search_url: Option<String>,

    /// Override the routing endpoint
    #[arg(long, value_name = "URL")]
    route_url: Option<String>,
}

impl Cli {
    fn validate(&self) -> Result<(), String> {
        if let Some(mode) = &self.mode {
            if MapRenderMode::from_name(mode).is_none() {
                return Err(format!(
                    "Invalid mode '{}'. Use one of: standard, hybrid, satellite",
                    mode
                ));
            }
        }
        Ok(())
    }

    /// Folds the command line over the loaded config file.
    fn apply(&self, config: &mut config::Config) {
        if let Some(mode) = &self.mode {
            config.start_mode = Some(mode.clone());
        }
        if self.no_location {
            config.allow_location = false;
        }
        if self.plain_callouts {
            config.plain_callouts = true;
        }
        if let Some(url) = &self.search_url {
            config.services.search_url = Some(url.clone());
        }
        if let Some(url) = &self.route_url {
            config.services.route_url = Some(url.clone());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut config = config::load();
    args.apply(&mut config);

    println!("Launching map...");
    gui::run(config).map_err(|e| format!("GUI error: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let cli = Cli::parse_from(["capmap", "--mode", "flyover"]);
        assert!(cli.validate().is_err());
        let cli = Cli::parse_from(["capmap", "--mode", "Hybrid"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "capmap",
            "--mode",
            "satellite",
            "--no-location",
            "--search-url",
            "https://nominatim.example/search",
        ]);
        let mut config = config::Config::default();
        cli.apply(&mut config);
        assert_eq!(config.start_mode(), MapRenderMode::Satellite);
        assert!(!config.allow_location);
        assert_eq!(config.search_url(), "https://nominatim.example/search");
        assert!(!config.plain_callouts);
    }

    #[test]
    fn test_cli_without_mode_keeps_configured_start_mode() {
        let cli = Cli::parse_from(["capmap"]);
        let mut config = config::Config::default();
        config.start_mode = Some("hybrid".to_string());
        cli.apply(&mut config);
        assert_eq!(config.start_mode(), MapRenderMode::Hybrid);
    }
}
