use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::Antialiasing;

#[derive(Parser, Debug)]
#[command(
    name = "shaderforge",
    author,
    version,
    about = "Animated backdrop composer and exporter",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Composition document (TOML); the built-in composition when omitted.
    /// Edits to the file are picked up while the preview is open.
    #[arg(value_name = "COMPOSITION")]
    pub composition: Option<PathBuf>,

    /// Override the preview resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap for the preview loop (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Render a single still frame instead of animating continuously.
    #[arg(long)]
    pub still: bool,

    /// Timestamp (seconds) to evaluate for still mode.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_antialias,
        default_value = "auto"
    )]
    pub antialias: Antialiasing,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the composition as a standalone HTML page.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Composition document (TOML); the built-in composition when omitted.
    #[arg(value_name = "COMPOSITION")]
    pub composition: Option<PathBuf>,

    /// Output path for the artifact.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 0 || samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in surface size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in surface size".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_variants() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("off").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size("1920X1080").unwrap(), (1920, 1080));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn cli_accepts_preview_and_export_forms() {
        let cli = Cli::parse_from(["shaderforge", "scene.toml", "--fps", "30", "--still"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.fps, Some(30.0));
        assert!(cli.run.still);

        let cli = Cli::parse_from(["shaderforge", "export", "scene.toml", "-o", "out.html"]);
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out.html")));
            }
            other => panic!("expected export subcommand, got {other:?}"),
        }
    }
}
