//! Request template commands: `copysmith templates`.

use anyhow::{Context, Result};
use std::path::Path;

use copysmith::errors::StoreError;
use copysmith::store::TemplateStore;

use super::super::TemplatesCommands;
use super::load_config;

pub fn cmd_templates(project_dir: &Path, command: Option<TemplatesCommands>) -> Result<()> {
    use dialoguer::Confirm;

    let config = load_config(project_dir, false)?;
    let store = TemplateStore::new(&config.templates_dir);

    match command {
        None | Some(TemplatesCommands::List) => {
            let names = store.list()?;
            println!();
            if names.is_empty() {
                println!("No templates found in {}", config.templates_dir.display());
                println!();
                println!("Save one with:");
                println!("  copysmith generate --request <file> --save-template <name>");
                println!();
            } else {
                for name in &names {
                    println!("  - {}", name);
                }
                println!();
                println!("{} template(s) available", names.len());
                println!();
            }
        }
        Some(TemplatesCommands::Show { name }) => {
            let request = store.load(&name)?;
            let yaml =
                serde_yaml::to_string(&request).context("Failed to render template as YAML")?;
            println!();
            println!("Template: {}", name);
            println!();
            println!("{}", yaml.trim_end());
            println!();
        }
        Some(TemplatesCommands::Delete { name, force }) => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt(format!("Delete template '{}'?", name))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            match store.delete(&name) {
                Ok(()) => println!("Deleted template '{}'", name),
                Err(StoreError::TemplateNotFound { .. }) => {
                    println!("Template '{}' not found.", name)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
