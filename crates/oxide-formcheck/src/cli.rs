//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oxide_actions::body::FORM_URLENCODED;

/// Check form schemas, submissions and session configuration.
#[derive(Debug, Parser)]
#[command(name = "formcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a recorded request body and print the action result.
    Validate {
        /// Schema JSON file.
        #[arg(short, long)]
        schema: PathBuf,

        /// Request body file.
        #[arg(short, long)]
        body: PathBuf,

        /// Content type of the body.
        #[arg(short = 't', long, default_value = FORM_URLENCODED)]
        content_type: String,
    },

    /// Print the effective session configuration.
    Config {
        /// Project-wide options JSON file.
        #[arg(short, long)]
        defaults: Option<PathBuf>,

        /// Per-form options JSON file.
        #[arg(short, long)]
        options: Option<PathBuf>,
    },

    /// Render the fallback HTML form.
    Render {
        /// Schema JSON file.
        #[arg(short, long)]
        schema: PathBuf,

        /// Request body file to re-render with its values and errors.
        #[arg(short, long)]
        body: Option<PathBuf>,

        /// Content type of the body.
        #[arg(short = 't', long, default_value = FORM_URLENCODED)]
        content_type: String,

        /// Form action URL.
        #[arg(short, long, default_value = "")]
        action: String,

        /// Class added to the wrapper of invalid fields.
        #[arg(long, env = "FORMCHECK_ERROR_CLASS")]
        error_class: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "formcheck", "validate", "-s", "schema.json", "-b", "body.txt",
        ])
        .unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Validate {
                schema,
                body,
                content_type,
            } => {
                assert_eq!(schema, PathBuf::from("schema.json"));
                assert_eq!(body, PathBuf::from("body.txt"));
                assert_eq!(content_type, FORM_URLENCODED);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_with_verbose() {
        let cli = Cli::try_parse_from(["formcheck", "config", "-v", "--options", "form.json"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Config { defaults: None, options: Some(_) }
        ));
    }

    #[test]
    fn test_validate_requires_schema() {
        assert!(Cli::try_parse_from(["formcheck", "validate", "-b", "body.txt"]).is_err());
    }
}
