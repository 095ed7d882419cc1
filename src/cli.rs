use crate::config::load_config;
use crate::dates::parse_birth_date;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_family;
use crate::render::{SvgBackend, write_output_png, write_output_svg};
use crate::{RenderOptions, layout_family, render_with_backend};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree layout and rendering")]
pub struct Args {
    /// Input file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, label, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Add an age line under each birth date
    #[arg(long = "show-age")]
    pub show_age: bool,

    /// Reference date (YYYY-MM-DD) for ages and birthday highlights
    #[arg(long = "today", value_parser = parse_today)]
    pub today: Option<NaiveDate>,

    /// Ignore the clock: no ages and no birthday highlights
    #[arg(long = "no-clock", conflicts_with = "today")]
    pub no_clock: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Positioned graph as JSON
    Json,
}

fn parse_today(raw: &str) -> Result<NaiveDate, String> {
    parse_birth_date(raw).ok_or_else(|| format!("{raw:?} is not a date; use YYYY-MM-DD"))
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let options = resolve_options(&args)?;

    let input = read_input(args.input.as_deref())?;
    let snapshot = parse_family(&input)?;
    tracing::info!(people = snapshot.len(), "family data loaded");

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg_output(&snapshot, &options)?;
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg_output(&snapshot, &options)?;
            write_output_png(&svg, &output, &options.render, &options.theme)?;
        }
        OutputFormat::Json => {
            let layout = layout_family(&snapshot, &options)?;
            write_layout_dump(args.output.as_deref(), &layout)?;
        }
    }
    Ok(())
}

fn render_svg_output(snapshot: &crate::FamilySnapshot, options: &RenderOptions) -> Result<String> {
    let mut backend = SvgBackend::new(&options.theme, &options.layout, &options.render);
    Ok(render_with_backend(snapshot, options, &mut backend)?)
}

fn resolve_options(args: &Args) -> Result<RenderOptions> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.show_age {
        config.label.show_age = true;
    }
    let today = if args.no_clock {
        None
    } else {
        Some(args.today.unwrap_or_else(|| chrono::Local::now().date_naive()))
    };
    Ok(RenderOptions::from_config(config, today))
}

/// Logs go to stderr so SVG and JSON on stdout stay clean. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let args = Args::try_parse_from([
            "famtree", "-i", "family.json", "-e", "json", "-w", "900", "--today", "2024-03-01",
        ])
        .expect("args");
        assert_eq!(args.input.as_deref(), Some(Path::new("family.json")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.width, Some(900.0));
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn rejects_malformed_today() {
        assert!(Args::try_parse_from(["famtree", "--today", "yesterday"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "famtree", "--show-age", "-H", "640", "--today", "2020-01-01",
        ])
        .expect("args");
        let options = resolve_options(&args).expect("options");
        assert!(options.label.show_age);
        assert_eq!(options.render.height, 640.0);
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn no_clock_disables_today() {
        let args = Args::try_parse_from(["famtree", "--no-clock"]).expect("args");
        assert_eq!(resolve_options(&args).expect("options").today, None);
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
    }
}
