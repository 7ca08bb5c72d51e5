//! # Lesionscope CLI Application
//!
//! Submits one image to the ensemble classifier and prints the diagnosis.
//!
//! ```text
//! diag_cli <IMAGE> [--server URL] [--json] [--save-explanation PATH] [--config-dir DIR]
//! ```
//!
//! Exit status is 0 on a diagnosis, 1 on any error (including a failed
//! `--save-explanation` write), 2 on bad usage.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use diag_core::config;
use diag_core::file::read_selected_file;
use diag_core::render::{to_plain_text, ExplanationImage};
use diag_core::state::{Controller, UploadState};
use diag_core::transport::HttpTransport;
use diag_core::view::ResultsRegion;

const USAGE: &str = "\
Usage: diag_cli <IMAGE> [OPTIONS]

Options:
  --server URL              Classifier base URL (overrides settings.toml)
  --json                    Print the prediction as JSON
  --save-explanation PATH   Write the explanation overlay PNG to PATH
  --config-dir DIR          Read settings.toml from DIR
  -h, --help                Show this help";

struct Args {
    image: PathBuf,
    server: Option<String>,
    json: bool,
    save_explanation: Option<PathBuf>,
    config_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let json = args.contains("--json");
    let server = args.opt_value_from_str("--server")?;
    let save_explanation = args.opt_value_from_str("--save-explanation")?;
    let config_dir = args.opt_value_from_str("--config-dir")?;
    let image = args.free_from_str()?;

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {:?}", rest),
        });
    }

    Ok(Some(Args {
        image,
        server,
        json,
        save_explanation,
        config_dir,
    }))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let (mut settings, warning) = config::load_with_override(args.config_dir.clone());
    diag_core::logging::init(&settings.logging.filter);
    if let Some(warning) = warning {
        tracing::warn!(%warning, "using default settings");
    }
    if let Some(server) = args.server.clone() {
        settings.server.base_url = server;
    }

    let transport = match HttpTransport::new(&settings.server.base_url) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut controller = Controller::new();
    if let Err(e) = controller.select_file(read_selected_file(&args.image)) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(preview) = &controller.view().preview {
        println!("Image:    {} ({}x{})", preview.file_name, preview.width, preview.height);
    }
    println!("Endpoint: {}", transport.url());
    println!();
    println!("Analyzing...");
    println!();

    let state = controller.submit(&transport).await;
    let saved = print_outcome(&controller, &args);

    if state == UploadState::Success && saved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print the results region. Returns false if a requested file could not be written.
fn print_outcome(controller: &Controller, args: &Args) -> bool {
    let mut saved = true;
    match &controller.view().results {
        ResultsRegion::Prediction(view) => {
            println!("═══════════════════════════════════════");
            print!("{}", to_plain_text(view));
            println!("═══════════════════════════════════════");
            println!();

            match (&view.explanation, &args.save_explanation) {
                (Some(explanation), Some(path)) => saved = save_explanation(explanation, path),
                (Some(_), None) => println!("Explanation overlay available (use --save-explanation)"),
                (None, _) => println!("No explanation overlay returned"),
            }

            if args.json {
                if let Some(json) = controller
                    .prediction()
                    .and_then(|p| serde_json::to_string_pretty(p).ok())
                {
                    println!();
                    println!("JSON Output:");
                    println!("{}", json);
                }
            }
        }
        ResultsRegion::Failure(failure) => match failure.heading() {
            Some(heading) => eprintln!("{}: {}", heading, failure.message),
            None => eprintln!("Error: {}", failure.message),
        },
        ResultsRegion::Empty => {}
    }
    saved
}

/// Write the overlay PNG, reporting the outcome on the terminal
fn save_explanation(explanation: &ExplanationImage, path: &Path) -> bool {
    match std::fs::write(path, &explanation.png_bytes) {
        Ok(()) => {
            println!("Explanation overlay written to {}", path.display());
            true
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "explanation write failed");
            eprintln!("Error: could not write explanation to {}: {}", path.display(), e);
            false
        }
    }
}
