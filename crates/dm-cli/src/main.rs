//! CLI entry point for dotmeta.
//!
//! Reads one .NET artifact (assembly, `AssemblyInfo.cs`, nuspec, nupkg,
//! project, or solution) and prints its metadata as JSON.
//!
//! # Usage
//!
//! ```bash
//! dotmeta [OPTIONS] <PATH>
//!
//! # Classify by extension
//! dotmeta src/Widgets.sln
//!
//! # Only try the named kinds, in order
//! dotmeta -d Nuspec,Nupkg packages/Widgets.1.0.0.nupkg
//! ```
//!
//! Standard output carries exactly one JSON document: the metadata on
//! success (exit code 0), or `{"error": ...}` on failure (exit code 1).
//! Logs go to standard error.

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use dm_core::{Config, MetadataError, canonicalize};
use dm_providers::Classifier;
use serde_json::{Value, json};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Print metadata of a .NET assembly, package, project, or solution as JSON.
#[derive(Parser)]
#[command(name = "dotmeta", version, about, long_about = None)]
struct Cli {
    /// Artifact kinds to try, in order (comma-separated).
    ///
    /// Accepts `AssemblyBinary`, `AssemblyInfoSource`, `PackageManifest`,
    /// `PackageArchive`, `ProjectFile`, `SolutionFile` or their short forms
    /// `AssemblyDll`, `AssemblyInfo`, `Nuspec`, `Nupkg`, `Project`,
    /// `Solution`, case-insensitively.
    #[arg(short, long, value_delimiter = ',', value_name = "KINDS")]
    descriptors: Option<Vec<String>>,

    /// Path to the artifact to read.
    path: String,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber, writing to stderr.
///
/// Respects `RUST_LOG` if set, otherwise logs warnings and errors only.
/// `NO_COLOR` disables ANSI colors.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let use_ansi = std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

/// Installs the color-eyre report hook and a panic hook that emits the
/// structured error envelope.
fn install_hooks() -> color_eyre::Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    panic::set_hook(Box::new(move |info| {
        let _ = writeln!(std::io::stderr().lock(), "{}", panic_hook.panic_report(info));
        emit(&panic_envelope(info));
    }));
    Ok(())
}

// =============================================================================
// COMMAND
// =============================================================================

/// Classifies, loads, and renders the artifact named on the command line.
fn run(cli: &Cli) -> Result<String, MetadataError> {
    let classifier = match &cli.descriptors {
        Some(names) => Classifier::with_kinds(names)?,
        None => Classifier::new(),
    }
    .with_config(Config::default());

    let path = canonicalize(&cli.path)?;
    let mut provider = classifier
        .classify(&path)
        .ok_or_else(|| MetadataError::NoMatchingDescriptor(path.clone()))?;
    info!(path = %path, kind = %provider.kind(), "Reading artifact");

    provider.load(&path)?;
    provider.to_json()
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Writes one JSON document to stdout.
fn emit(value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    write_stdout(&text);
}

fn write_stdout(text: &str) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{text}");
    let _ = handle.flush();
}

/// `{"error": "<message>"}`
fn error_envelope(message: &str) -> Value {
    json!({ "error": message })
}

/// `{"error": {"message": ..., "location": ...}}`
fn panic_envelope(info: &PanicHookInfo<'_>) -> Value {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned());
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));

    json!({ "error": { "message": message, "location": location } })
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            emit(&error_envelope(e.render().to_string().trim()));
            return ExitCode::FAILURE;
        }
    };

    init_tracing();
    if let Err(e) = install_hooks() {
        emit(&error_envelope(&e.to_string()));
        return ExitCode::FAILURE;
    }

    match panic::catch_unwind(|| run(&cli)) {
        Ok(Ok(json)) => {
            write_stdout(&json);
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(kind = e.kind(), path = ?e.path(), "{e}");
            emit(&error_envelope(&e.to_string()));
            ExitCode::FAILURE
        }
        // The panic hook has already written the envelope.
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_descriptor_list() {
        let cli = Cli::try_parse_from(["dotmeta", "-d", "Nuspec,Nupkg", "Widgets.nupkg"]).unwrap();
        assert_eq!(cli.descriptors.unwrap(), vec!["Nuspec", "Nupkg"]);
        assert_eq!(cli.path, "Widgets.nupkg");
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["dotmeta"]).is_err());
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = error_envelope("no metadata provider found for file /tmp/x");
        assert_eq!(value["error"], "no metadata provider found for file /tmp/x");
    }

    #[test]
    fn test_run_unknown_descriptor() {
        let cli = Cli {
            descriptors: Some(vec!["Gemfile".to_owned()]),
            path: "/tmp/Widgets.nuspec".to_owned(),
        };
        assert_eq!(run(&cli).unwrap_err().kind(), "UnknownDescriptor");
    }

    #[test]
    fn test_run_no_matching_descriptor() {
        let cli = Cli {
            descriptors: None,
            path: "/tmp/README.md".to_owned(),
        };
        assert_eq!(run(&cli).unwrap_err().kind(), "NoMatchingDescriptor");
    }

    #[test]
    fn test_run_empty_path() {
        let cli = Cli {
            descriptors: None,
            path: String::new(),
        };
        assert_eq!(run(&cli).unwrap_err().kind(), "InvalidPath");
    }
}
