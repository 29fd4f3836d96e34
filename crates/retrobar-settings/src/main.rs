//! `retrobar-settings` host tool.
//!
//! Inspects and changes the RetroBar settings file through the same facade
//! the taskbar uses, so every change goes through validation and is saved
//! exactly as the running application would save it.
//!
//! ```text
//! retrobar-settings list
//! retrobar-settings get TaskbarScale
//! retrobar-settings set Edge Top
//! retrobar-settings set QuickLaunchOrder '["b.lnk","a.lnk"]'
//! retrobar-settings --file ./portable/settings.json path
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use retrobar_settings::{
    install, instance, FieldError, JsonFileRepository, SetOutcome, Settings, SettingsError,
    SettingsSnapshot,
};

#[derive(Debug, Parser)]
#[command(name = "retrobar-settings", version, about = "Inspect and change RetroBar settings")]
struct Cli {
    /// Settings file to use instead of the per-user default.
    #[arg(long, env = "RETROBAR_SETTINGS_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every setting with its type and current value.
    List,
    /// Print one setting's value as JSON.
    Get { name: String },
    /// Change one setting.  VALUE is parsed as JSON, falling back to a plain string.
    Set { name: String, value: String },
    /// Print where settings are stored.
    Path,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match cli.file {
        Some(path) => install(Settings::open(JsonFileRepository::new(path)))?,
        None => instance(),
    };

    match cli.command {
        Command::List => {
            for (name, value) in settings.snapshot().entries() {
                let ty = SettingsSnapshot::type_name(name).unwrap_or("?");
                println!("{name} ({ty}) = {value}");
            }
        }
        Command::Get { name } => {
            let value = settings
                .get_value(&name)
                .with_context(|| format!("cannot read `{name}`"))?;
            println!("{value}");
        }
        Command::Set { name, value } => {
            let outcome = set_from_cli(settings, &name, &value)?;
            println!("{outcome}");
            if outcome == SetOutcome::Changed && settings.persist_failures() > 0 {
                anyhow::bail!("`{name}` changed but could not be saved to {}", settings.location());
            }
        }
        Command::Path => println!("{}", settings.location()),
    }

    Ok(())
}

fn parse_candidate(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Applies `raw` to the named setting.  Text that happens to parse as JSON
/// (`95`, `true`) is retried as a plain string when the setting holds text.
fn set_from_cli(settings: &Settings, name: &str, raw: &str) -> anyhow::Result<SetOutcome> {
    let candidate = parse_candidate(raw);
    let result = match settings.set_value(name, &candidate) {
        Err(SettingsError::Field(FieldError::TypeMismatch { .. })) if !candidate.is_string() => {
            settings.set_value(name, &Value::String(raw.to_string()))
        }
        other => other,
    };
    result.with_context(|| format!("cannot set `{name}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrobar_settings::InMemoryRepository;

    #[test]
    fn test_parse_candidate_prefers_json() {
        assert_eq!(parse_candidate("true"), Value::Bool(true));
        assert_eq!(parse_candidate("[\"a\"]"), serde_json::json!(["a"]));
        assert_eq!(parse_candidate("Windows 95-98"), Value::String("Windows 95-98".into()));
    }

    #[test]
    fn test_set_from_cli_retries_numeric_text_as_string() {
        // Arrange
        let settings = Settings::open(InMemoryRepository::new());

        // Act
        let outcome = set_from_cli(&settings, "Theme", "95").unwrap();

        // Assert
        assert_eq!(outcome, SetOutcome::Changed);
        assert_eq!(settings.theme(), "95");
    }

    #[test]
    fn test_set_from_cli_accepts_enum_names() {
        let settings = Settings::open(InMemoryRepository::new());
        let outcome = set_from_cli(&settings, "Edge", "Top").unwrap();
        assert_eq!(outcome, SetOutcome::Changed);
        assert_eq!(settings.edge(), retrobar_settings::AppBarEdge::Top);
    }

    #[test]
    fn test_set_from_cli_type_mismatch_is_error() {
        let settings = Settings::open(InMemoryRepository::new());
        assert!(set_from_cli(&settings, "AutoHide", "sometimes").is_err());
    }
}
