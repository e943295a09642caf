//! formcheck CLI
//!
//! Validates recorded submissions against a schema, prints the effective
//! session configuration and renders the fallback form.

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_forms::RenderOptions;
use oxide_formcheck::cli::{Cli, Commands};
use oxide_formcheck::commands::{effective_config, load_schema, read_file, render_form, validate_body};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Validate {
            schema,
            body,
            content_type,
        } => {
            let schema = load_schema(&schema).await?;
            let body = read_file(&body).await?;
            let result = validate_body(&schema, body, &content_type).await;
            info!(kind = ?result.kind(), status = result.status(), "validated submission");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Config { defaults, options } => {
            let defaults = match defaults {
                Some(path) => Some(String::from_utf8(read_file(&path).await?)?),
                None => None,
            };
            let options = match options {
                Some(path) => Some(String::from_utf8(read_file(&path).await?)?),
                None => None,
            };
            let config = effective_config(defaults.as_deref(), options.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Render {
            schema,
            body,
            content_type,
            action,
            error_class,
        } => {
            let schema = load_schema(&schema).await?;
            let body = match body {
                Some(path) => Some(read_file(&path).await?),
                None => None,
            };

            let mut options = RenderOptions::new(action);
            if let Some(class) = error_class {
                options = options.error_class(class);
            }
            let html = render_form(
                &schema,
                body.map(|body| (body, content_type.as_str())),
                &options,
            )
            .await;
            println!("{html}");
        }
    }

    Ok(())
}
