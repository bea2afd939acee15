use anyhow::Context;
use colored::Colorize;
use dqv_store::{KeyKind, ResourceIdentifier, Store, StoreKey, JSON_TAG, NONE_TAG};
use dqv_types::{BatchKwargs, TypedBatchKwargs};
use serde_json::{json, Value};

use crate::cli::*;
use crate::config::ProjectConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ProjectConfig::load(&cli.config)?;
    match cli.command {
        Command::Fingerprint(args) => cmd_fingerprint(&config, args, &cli.format),
        Command::CheckKwargs(args) => cmd_check_kwargs(args, &cli.format),
        Command::Store(args) => cmd_store(&config, args, &cli.format),
    }
}

fn cmd_fingerprint(
    config: &ProjectConfig,
    args: FingerprintArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let value: Value =
        serde_json::from_str(&args.kwargs).context("batch kwargs must be valid JSON")?;
    let Some(fingerprint) = config.fingerprinter().build_fingerprint(value) else {
        match format {
            OutputFormat::Json => println!("{}", json!({"fingerprint": null})),
            OutputFormat::Text => {
                println!("{} batch kwargs are not fingerprintable", "!".yellow().bold())
            }
        }
        return Ok(());
    };
    match format {
        OutputFormat::Json => println!("{}", json!({"fingerprint": fingerprint})),
        OutputFormat::Text => {
            println!("Partition: {}", fingerprint.partition_id().yellow());
            println!("Content:   {}", fingerprint.content_hash().cyan());
        }
    }
    Ok(())
}

fn cmd_check_kwargs(args: CheckKwargsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let kwargs = BatchKwargs::from_json_str(&args.kwargs)?;
    let typed = match args.family {
        Some(family) => TypedBatchKwargs::for_family(args.kind, family, kwargs)?,
        None => TypedBatchKwargs::new(args.kind, kwargs)?,
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({"kind": typed.kind(), "family": typed.family(), "valid": true})
        ),
        OutputFormat::Text => {
            let family = typed.family().map(|f| format!(" for {f}")).unwrap_or_default();
            println!(
                "{} valid {} batch kwargs{}",
                "✓".green().bold(),
                typed.kind().to_string().bold(),
                family
            );
        }
    }
    Ok(())
}

fn cmd_store(
    config: &ProjectConfig,
    args: StoreArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let store = config.store(&args.name)?;
    match args.action {
        StoreAction::Get { key, serialization } => {
            let value = store.get(parse_key(&store, &key)?, serialization.as_deref())?;
            match (format, &value) {
                (OutputFormat::Text, Value::String(s)) => println!("{s}"),
                _ => println!("{}", serde_json::to_string_pretty(&value)?),
            }
        }
        StoreAction::Set { key, value, serialization } => {
            let tag = serialization.as_deref().or(store.serialization_type()).unwrap_or(NONE_TAG);
            let value = if tag == JSON_TAG {
                serde_json::from_str(&value).context("value must be valid JSON for a json store")?
            } else {
                Value::String(value)
            };
            store.set(parse_key(&store, &key)?, &value, serialization.as_deref())?;
            println!("{} stored {}", "✓".green().bold(), key.bold());
        }
        StoreAction::List => {
            let keys = store.list_keys()?;
            match format {
                OutputFormat::Json => {
                    let keys: Vec<String> = keys.iter().map(StoreKey::to_key_string).collect();
                    println!("{}", json!(keys));
                }
                OutputFormat::Text if keys.is_empty() => println!("No keys stored."),
                OutputFormat::Text => {
                    for key in keys {
                        println!("  {}", key.to_key_string());
                    }
                }
            }
        }
        StoreAction::Has { key } => {
            let present = store.has_key(parse_key(&store, &key)?)?;
            match format {
                OutputFormat::Json => println!("{}", json!({"key": key, "present": present})),
                OutputFormat::Text if present => println!("{} {}", "✓".green(), key),
                OutputFormat::Text => println!("{} {}", "✗".red(), key),
            }
        }
    }
    Ok(())
}

/// Interpret a command-line key as a key of the store's kind.
fn parse_key(store: &Store, raw: &str) -> anyhow::Result<StoreKey> {
    Ok(match store.key_kind() {
        KeyKind::Text => StoreKey::from(raw),
        KeyKind::Identifier => ResourceIdentifier::from_key_string(raw)?.into(),
    })
}
