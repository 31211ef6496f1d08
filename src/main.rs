//! Pocketmd - render markdown for a 320x240 display, headlessly.
//!
//! # Usage
//!
//! ```bash
//! pocketmd README.md --toc --stats
//! pocketmd README.md --search install --png frame.png
//! pocketmd README.md --ratio 0.5 --dump
//! ```

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use pocketmd::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use pocketmd::document::{Document, image_markdown, is_image_file, prepare_content};
use pocketmd::perf;
use pocketmd::source::{FsSource, TextSource};
use pocketmd::surface::{RasterSurface, RecordingSurface, Surface};
use pocketmd::theme::{Palette, ThemeMode};

/// Render a markdown file as it would appear on a 320x240 display
#[derive(Parser, Debug)]
#[command(name = "pocketmd", version, about, long_about = None)]
struct Cli {
    /// Markdown (or source/image) file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Scroll offset in pixels
    #[arg(long, value_name = "PX", conflicts_with_all = ["ratio", "line"])]
    scroll: Option<i32>,

    /// Scroll to a fraction of the document (0.0 top, 1.0 bottom)
    #[arg(long, value_name = "R", conflicts_with = "line")]
    ratio: Option<f64>,

    /// Scroll so this zero-based source line is at the top
    #[arg(long, value_name = "N")]
    line: Option<usize>,

    /// Highlight a search term and jump to its first match
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Match the search term case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Color palette
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Print the table of contents
    #[arg(long)]
    toc: bool,

    /// Print line, word and reading-time counts
    #[arg(long)]
    stats: bool,

    /// Print the final frame's draw commands as JSON lines
    #[arg(long)]
    dump: bool,

    /// Write the final frame as an image
    #[arg(long, value_name = "PATH")]
    png: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,

    /// Print timing for the render passes
    #[arg(long)]
    perf: bool,

    /// Write layout events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,
}

/// Reads files from disk and adapts non-markdown files for display.
struct PreparedSource(FsSource);

impl TextSource for PreparedSource {
    fn load_raw_text(&self, name: &str) -> io::Result<String> {
        let path = Path::new(name);
        if is_image_file(path) {
            return Ok(image_markdown(path));
        }
        let text = self.0.load_raw_text(name)?;
        Ok(prepare_content(path, text))
    }
}

/// Load the file and apply the requested view into `surface`.
fn show<S: Surface>(surface: S, cli: &Cli, flags: &ConfigFlags) -> Document<S> {
    let theme = flags.theme.unwrap_or_default();
    let mut doc = Document::new(surface).with_palette(Palette::for_mode(theme));

    let name = cli.file.to_string_lossy();
    if let Err(err) = doc.load_from(&PreparedSource(FsSource::default()), &name) {
        eprintln!("[warn] {err}");
    }

    if let Some(term) = cli.search.as_deref() {
        if !doc.search(term, flags.case_sensitive) {
            eprintln!("no matches for {term:?}");
        }
    }
    if let Some(offset) = cli.scroll {
        doc.render();
        doc.set_scroll_position(offset);
    } else if let Some(ratio) = cli.ratio {
        doc.scroll_to_ratio(ratio);
    } else if let Some(line) = cli.line {
        doc.scroll_to_line(line);
    }
    doc.render();
    doc
}

fn report(doc: &Document<RecordingSurface>, cli: &Cli) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    if cli.toc {
        for heading in doc.headers() {
            let indent = "  ".repeat(heading.level.saturating_sub(1));
            writeln!(out, "{indent}{} (line {})", heading.title, heading.line)?;
        }
    }
    if cli.stats {
        let stats = doc.stats();
        writeln!(
            out,
            "{} lines, {} words, {} min read",
            stats.lines, stats.words, stats.read_minutes
        )?;
    }
    if cli.dump {
        for command in doc.surface().commands() {
            serde_json::to_writer(&mut out, command)?;
            writeln!(out)?;
        }
    }
    writeln!(
        out,
        "scroll {} of {} ({}%)",
        doc.scroll_position(),
        doc.content_height(),
        doc.progress_percent()
    )?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("POCKETMD_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = ?render_debug_log_path,
            error = %err,
            "failed to initialize render debug log"
        );
    }

    let doc = show(RecordingSurface::new(), &cli, &effective);
    report(&doc, &cli)?;

    if let Some(png) = &cli.png {
        let base_dir = cli
            .file
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        let raster = show(RasterSurface::new(base_dir), &cli, &effective).into_surface();
        raster
            .save(png)
            .with_context(|| format!("Failed to write {}", png.display()))?;
    }
    Ok(())
}
