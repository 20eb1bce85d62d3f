use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "menufy")]
#[command(about = "Browse and export a restaurant's published catalog")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override backend.base_url from the configuration
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every published menu
    Menus,
    /// List all products, optionally filtered
    Products {
        #[arg(long)]
        dish_type: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Aggregate a menu into its category and product tree
    Menu { menu_id: Option<String> },
    /// Preview a catalog export, then write it with --yes
    Export {
        menu_id: Option<String>,
        /// Export a single category instead of the whole menu
        #[arg(long)]
        category: Option<String>,
        /// Confirm the export after the preview
        #[arg(long)]
        yes: bool,
        /// Override export.output_path
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the public link the menu's QR code points at
    Link { menu_id: Option<String> },
}

impl CliConfig {
    /// File configuration (or defaults) with command line overrides applied, validated.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Command::Export {
            output: Some(output),
            ..
        } = &self.command
        {
            config.export.output_path = output.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let cli = CliConfig::parse_from([
            "menufy",
            "--base-url",
            "http://10.0.0.2:5000",
            "export",
            "m1",
            "--category",
            "c1",
            "--yes",
            "--output",
            "/tmp/menus",
        ]);

        let config = cli.load().unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.export.output_path, "/tmp/menus");
        match cli.command {
            Command::Export {
                menu_id,
                category,
                yes,
                ..
            } => {
                assert_eq!(menu_id.as_deref(), Some("m1"));
                assert_eq!(category.as_deref(), Some("c1"));
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_menu_id_is_optional_at_parse_time() {
        let cli = CliConfig::parse_from(["menufy", "menu"]);
        assert!(matches!(cli.command, Command::Menu { menu_id: None }));
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let cli = CliConfig::parse_from(["menufy", "--base-url", "nope", "menus"]);
        assert!(cli.load().is_err());
    }
}
