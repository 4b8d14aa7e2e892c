use anyhow::Result;
use clap::Args;
use colored::Colorize;
use reshaper_workspace::{EditorConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Quiet period in milliseconds before edits are written
    #[arg(long, default_value_t = 100)]
    pub save_debounce_ms: u64,

    /// Attribute edited as an element's class list
    #[arg(long, default_value = reshaper_editor::DEFAULT_CLASS_ATTRIBUTE)]
    pub class_attribute: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = EditorConfig {
        save_debounce_ms: args.save_debounce_ms,
        class_attribute: args.class_attribute,
        ..EditorConfig::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Run: reshaper outline src/App.jsx");
    println!("  2. Run: reshaper watch src");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            save_debounce_ms: 250,
            class_attribute: "class".to_string(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.save_debounce_ms, 250);
        assert_eq!(config.class_attribute, "class");
        assert_eq!(config.undo_max_levels, 100);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        let args = InitArgs {
            save_debounce_ms: 5,
            class_attribute: "class".to_string(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_NAME)).unwrap();
        assert_eq!(content, "{}");
    }
}
