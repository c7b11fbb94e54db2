//! Clinmark - render clinical note markup to HTML or PDF.
//!
//! # Usage
//!
//! ```bash
//! clinmark note.txt                      # HTML fragment on stdout
//! clinmark --pdf note.txt -o note.pdf    # standalone PDF
//! clinmark --export visit.json --kind prescription -o rx.pdf
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use printpdf::Mm;
use tracing::debug;

use clinmark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use clinmark::export::{export_consultation, export_invoice, export_prescription};
use clinmark::records::RecordBundle;
use clinmark::render::html::render_html_str;
use clinmark::render::pdf::{PageCursor, PageStyle, render_markup_str};

/// Which document an `--export` bundle produces.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Prescription,
    Invoice,
    Consultation,
}

/// Render clinical note markup to HTML or PDF
#[derive(Parser, Debug)]
#[command(name = "clinmark", version, about, long_about = None)]
struct Cli {
    /// Markup text file to render
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Render to PDF instead of HTML
    #[arg(long)]
    pdf: bool,

    /// Output path (defaults to stdout for HTML, FILE.pdf for PDF)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Export a clinical document from a JSON record bundle
    #[arg(long, value_name = "BUNDLE")]
    export: Option<PathBuf>,

    /// Document kind to export from the bundle
    #[arg(long, value_enum)]
    kind: Option<ExportKind>,

    /// Page margin in millimetres
    #[arg(long, value_name = "MM")]
    margin: Option<f32>,

    /// Line height in millimetres
    #[arg(long, value_name = "MM")]
    line_height: Option<f32>,

    /// Save current flags as defaults in .clinmarkrc
    #[arg(long)]
    save: bool,

    /// Clear saved defaults in .clinmarkrc
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cli_flags = ConfigFlags {
        pdf: cli.pdf,
        margin: cli.margin,
        line_height: cli.line_height,
    };

    if cli.clear {
        clear_config_flags(&global_config_path())?;
        clear_config_flags(&local_override_path())?;
        println!("Cleared saved defaults");
        return Ok(());
    }
    if cli.save {
        save_config_flags(&global_config_path(), &cli_flags)?;
        println!("Saved defaults to {}", global_config_path().display());
        return Ok(());
    }

    let flags = effective_flags(&cli_flags)?;
    let style = page_style(&flags);
    debug!(?flags, "effective flags");

    if let Some(bundle_path) = &cli.export {
        let Some(kind) = cli.kind else {
            bail!("--export requires --kind");
        };
        let Some(output) = &cli.output else {
            bail!("--export requires --output");
        };
        let bundle: RecordBundle = serde_json::from_str(
            &fs::read_to_string(bundle_path)
                .with_context(|| format!("Failed to read bundle {}", bundle_path.display()))?,
        )
        .context("Failed to parse record bundle")?;

        let bytes = run_export(&bundle, kind)?;
        fs::write(output, bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Wrote {}", output.display());
        return Ok(());
    }

    let Some(file) = &cli.file else {
        bail!("expected a markup FILE or --export BUNDLE");
    };
    let markup =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

    if flags.pdf {
        let (mut cursor, fonts) = PageCursor::new("Clinical Note", style)?;
        render_markup_str(
            &mut cursor,
            &fonts,
            &markup,
            style.margin,
            style.content_width(),
            11.0,
        )?;
        let bytes = cursor.into_bytes()?;
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| file.with_extension("pdf"));
        fs::write(&output, bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Wrote {}", output.display());
    } else {
        let html = render_html_str(&markup);
        match &cli.output {
            Some(output) => fs::write(output, html)
                .with_context(|| format!("Failed to write {}", output.display()))?,
            None => println!("{html}"),
        }
    }

    Ok(())
}

/// Saved defaults (global, then local override) merged under CLI flags.
fn effective_flags(cli_flags: &ConfigFlags) -> Result<ConfigFlags> {
    let global = load_config_flags(&global_config_path())?;
    let local = load_config_flags(&local_override_path())?;
    Ok(global.union(&local).union(cli_flags))
}

fn page_style(flags: &ConfigFlags) -> PageStyle {
    let mut style = PageStyle::default();
    if let Some(margin) = flags.margin {
        style.margin = Mm(margin);
    }
    if let Some(line_height) = flags.line_height {
        style.line_height = Mm(line_height);
    }
    style
}

fn run_export(bundle: &RecordBundle, kind: ExportKind) -> Result<Vec<u8>> {
    let bytes = match kind {
        ExportKind::Prescription => {
            let Some(prescription) = &bundle.prescription else {
                bail!("bundle has no prescription record");
            };
            export_prescription(prescription, &bundle.patient, &bundle.practitioner)?
        }
        ExportKind::Invoice => {
            let Some(invoice) = &bundle.invoice else {
                bail!("bundle has no invoice record");
            };
            export_invoice(invoice, &bundle.patient, &bundle.practitioner)?
        }
        ExportKind::Consultation => {
            let Some(note) = &bundle.consultation else {
                bail!("bundle has no consultation record");
            };
            export_consultation(note, &bundle.patient, &bundle.practitioner)?
        }
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render_invocation() {
        let cli = Cli::parse_from(["clinmark", "note.txt", "--pdf", "--margin", "15"]);
        assert_eq!(cli.file, Some(PathBuf::from("note.txt")));
        assert!(cli.pdf);
        assert_eq!(cli.margin, Some(15.0));
    }

    #[test]
    fn test_cli_parses_export_invocation() {
        let cli = Cli::parse_from([
            "clinmark",
            "--export",
            "visit.json",
            "--kind",
            "invoice",
            "-o",
            "out.pdf",
        ]);
        assert_eq!(cli.export, Some(PathBuf::from("visit.json")));
        assert_eq!(cli.kind, Some(ExportKind::Invoice));
    }

    #[test]
    fn test_flag_tokens_round_trip_through_config() {
        let tokens = vec!["--pdf".to_string(), "--margin=12".to_string()];
        let flags = clinmark::config::parse_flag_tokens(&tokens);
        assert!(flags.pdf);
        assert_eq!(flags.margin, Some(12.0));
    }

    #[test]
    fn test_page_style_applies_overrides() {
        let flags = ConfigFlags {
            pdf: true,
            margin: Some(15.0),
            line_height: Some(5.0),
        };
        let style = page_style(&flags);
        assert_eq!(style.margin.0, 15.0);
        assert_eq!(style.line_height.0, 5.0);
        assert_eq!(style.width.0, 210.0);
    }
}
