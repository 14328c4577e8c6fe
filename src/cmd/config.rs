//! Configuration view and validation commands: `copysmith config`.

use anyhow::Result;
use std::path::Path;

use copysmith::config::global_config_path;
use copysmith::copy_config::{CONFIG_FILE_NAME, ConfigToml};
use copysmith::provider::ProviderKind;

use super::super::ConfigCommands;
use super::load_config;

fn key_status(env_var: &str) -> &'static str {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => "set",
        _ => "missing",
    }
}

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let config = load_config(project_dir, false)?;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Copysmith Configuration");
            println!("=======================");
            println!();

            if config.config_file.exists() {
                println!("Config file: {}", config.config_file.display());
            } else if let Some(global) = global_config_path().filter(|p| p.exists()) {
                println!("Config file: {} (global)", global.display());
            } else {
                println!("No {} found. Using defaults.", CONFIG_FILE_NAME);
            }
            println!();

            let toml = &config.toml;
            println!("[user]");
            match config.user() {
                Some(user) => {
                    println!("  id = \"{}\"", user.id);
                    println!("  email = \"{}\"", user.email);
                }
                None => println!("  (not signed in)"),
            }
            println!();

            println!("[defaults]");
            println!("  model = \"{}\"", toml.defaults.model);
            if let Some(language) = &toml.defaults.language {
                println!("  language = \"{}\"", language);
            }
            if let Some(tone) = &toml.defaults.tone {
                println!("  tone = \"{}\"", tone);
            }
            println!("  generate_scores = {}", toml.defaults.generate_scores);
            println!("  generate_geo_score = {}", toml.defaults.generate_geo_score);
            println!();

            println!("Providers (effective):");
            for kind in ProviderKind::ALL {
                let p = toml.provider(kind);
                println!(
                    "  {:<8} model = \"{}\", base_url = \"{}\", max_tokens = {}{}, key ${} ({})",
                    kind.to_string(),
                    p.model,
                    p.base_url,
                    p.max_tokens,
                    p.temperature
                        .map(|t| format!(", temperature = {}", t))
                        .unwrap_or_default(),
                    p.api_key_env,
                    key_status(&p.api_key_env)
                );
            }
            println!();

            println!("[access]");
            if toml.access.allowed_emails.is_empty() {
                println!("  allowed_emails = [] (everyone)");
            } else {
                println!("  allowed_emails = {:?}", toml.access.allowed_emails);
            }
            println!();

            if !config.config_file.exists() {
                println!("Run 'copysmith config init' to create a {} file.", CONFIG_FILE_NAME);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config.config_file.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE_NAME);
                return Ok(());
            }

            let toml = ConfigToml::load(&config.config_file)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config.config_file.exists() {
                println!(
                    "{} already exists at {}",
                    CONFIG_FILE_NAME,
                    config.config_file.display()
                );
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(&config.copysmith_dir)?;
            ConfigToml::default().save(&config.config_file)?;

            println!(
                "Created {} at {}",
                CONFIG_FILE_NAME,
                config.config_file.display()
            );
            println!();
            println!("You can now customize:");
            println!("  - [user] id, email");
            println!("  - [defaults] model, language, tone");
            println!("  - [providers.<name>] model, base_url, max_tokens, temperature, api_key_env");
            println!("  - [access] allowed_emails, denied_message");
            println!();
        }
    }

    Ok(())
}
