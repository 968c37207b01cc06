use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, Context, Result};
use composition::Composition;
use renderer::{RenderPolicy, Renderer, RendererConfig, WindowRuntime};
use tracing_subscriber::EnvFilter;

use crate::cli::{parse_surface_size, ExportArgs, RunArgs};

/// How often the preview loop checks the document for edits.
const RELOAD_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let composition = load_composition(args.composition.as_deref())?;

    let requested_size = args
        .size
        .as_ref()
        .map(|value| parse_surface_size(value))
        .transpose()
        .map_err(|err| anyhow!(err))?;
    let surface_size = requested_size.unwrap_or((1280, 720));

    let policy = if args.still {
        RenderPolicy::Still {
            time: args.still_time,
        }
    } else {
        RenderPolicy::Animate {
            target_fps: match args.fps {
                Some(v) if v > 0.0 => Some(v),
                _ => None,
            },
        }
    };

    tracing::info!(
        ?policy,
        width = surface_size.0,
        height = surface_size.1,
        document = ?args.composition,
        "starting preview"
    );

    let config = RendererConfig {
        surface_size,
        parameters: composition.params.clone(),
        antialiasing: args.antialias,
        policy,
    };

    match args.composition.as_deref() {
        Some(path) => {
            let runtime = WindowRuntime::spawn(config)?;
            watch_document(&runtime, path)?;
            runtime.shutdown()
        }
        None => Renderer::new(config).run(),
    }
}

pub fn export(args: ExportArgs) -> Result<()> {
    let composition = load_composition(args.composition.as_deref())?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(exporter::DEFAULT_EXPORT_FILENAME));
    let written = exporter::write_artifact(&composition, &output)?;
    println!("Exported composition to {}", written.display());
    Ok(())
}

fn load_composition(path: Option<&Path>) -> Result<Composition> {
    match path {
        Some(path) => Composition::load(path)
            .with_context(|| format!("failed to load composition {}", path.display())),
        None => Ok(Composition::default()),
    }
}

/// Blocks until the preview closes, reloading the document whenever its
/// modification time changes and pushing the fresh parameters into the
/// render loop. Unparsable edits are skipped so a half-saved file never
/// kills a running preview.
fn watch_document(runtime: &WindowRuntime, path: &Path) -> Result<()> {
    let mut last_modified = modified_at(path);
    loop {
        if runtime.poll_closed(RELOAD_POLL_INTERVAL) {
            return Ok(());
        }
        let current = modified_at(path);
        if current.is_some() && current != last_modified {
            last_modified = current;
            match Composition::load(path) {
                Ok(document) => {
                    tracing::info!(path = %path.display(), "composition reloaded");
                    runtime.update_params(document.params)?;
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "ignoring unparsable composition edit"
                    );
                }
            }
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}
