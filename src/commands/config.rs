use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;
use crate::personality::Trait;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "npctalk Configuration".bold());
            println!();

            println!("{}:", "backend".cyan());
            println!("  base_url: {}", config.backend.base_url);
            println!("  model: {}", config.backend.model);
            println!("  api_key_env: {}", config.backend.api_key_env);
            println!("  max_tokens: {}", config.backend.max_tokens);
            println!("  temperature: {}", config.backend.temperature);
            println!("  timeout_secs: {}", config.backend.timeout_secs);
            println!();

            println!("{}:", "extraction".cyan());
            println!("  on_missing: {:?}", config.extraction.on_missing);
            println!("  profile_attempts: {}", config.extraction.profile_attempts);
            println!("  defaults:");
            for t in Trait::ALL {
                println!("    {}: {}", t.key(), config.extraction.defaults.get(t));
            }
            println!();

            println!("{}:", "history".cyan());
            println!("  max_chars: {}", config.history.max_chars);
            println!();

            println!("{}:", "npcs".cyan());
            for name in config.npcs.keys() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "backend.base_url" => Some(config.backend.base_url.clone()),
        "backend.model" => Some(config.backend.model.clone()),
        "backend.api_key_env" => Some(config.backend.api_key_env.clone()),
        "backend.max_tokens" => Some(config.backend.max_tokens.to_string()),
        "backend.temperature" => Some(config.backend.temperature.to_string()),
        "backend.timeout_secs" => Some(config.backend.timeout_secs.to_string()),
        "extraction.on_missing" => Some(format!("{:?}", config.extraction.on_missing).to_lowercase()),
        "extraction.profile_attempts" => Some(config.extraction.profile_attempts.to_string()),
        "history.max_chars" => Some(config.history.max_chars.to_string()),
        "manual_entry" | "manual-entry" => Some(format!("{:?}", config.manual_entry).to_lowercase()),
        "world.description" => Some(config.world.description.clone()),
        "world.role" => Some(config.world.role.clone()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => {
            let name: Trait = key.strip_prefix("extraction.defaults.")?.parse().ok()?;
            Some(config.extraction.defaults.get(name).to_string())
        }
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}
