//! tagpad - preview the highlighter on a file
//!
//! Loads a file into an in-memory buffer, scrolls to the requested line,
//! runs one viewport-scoped highlight pass and prints the visible lines
//! with terminal colors.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthChar;

use tagpad::error::{HighlightError, Result};
use tagpad::syntax::{Color, Style};
use tagpad::{Config, Highlighter, MemoryBuffer, PassOutcome, Position};

const LINE_HEIGHT_PX: u32 = 16;

struct Options {
    file: PathBuf,
    config: Option<PathBuf>,
    top: usize,
    rows: Option<u32>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TAGPAD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => {}
        Err(HighlightError::Usage(message)) => {
            eprintln!("tagpad: {message}");
            eprintln!("Try 'tagpad --help' for more information.");
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default(),
    };

    let (term_cols, term_rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let rows = options.rows.unwrap_or(u32::from(term_rows).saturating_sub(1).max(1));

    let text = fs::read_to_string(&options.file)?;
    let mut buffer = MemoryBuffer::from_text(&text);
    buffer.set_viewport(rows * LINE_HEIGHT_PX, LINE_HEIGHT_PX);
    buffer.scroll_to(options.top);

    let mut highlighter = Highlighter::attach(buffer, &config)?;
    match highlighter.on_text_changed() {
        PassOutcome::Applied(stats) => tracing::info!(
            first = stats.span.first,
            last = stats.span.last,
            tokens = stats.tokens,
            "highlighted"
        ),
        PassOutcome::Skipped(err) => tracing::info!(error = %err, "showing plain text"),
        PassOutcome::Disabled => {}
    }

    render(&highlighter, usize::from(term_cols))
}

/// Parse command line arguments; `None` means nothing left to do
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut file = None;
    let mut config = None;
    let mut top = 1;
    let mut rows = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                println!("tagpad {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--config" | "-c" => config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--top" | "-t" => top = parse_number(value(&mut iter, arg)?, arg)?,
            "--rows" | "-r" => rows = Some(parse_number(value(&mut iter, arg)?, arg)?),
            flag if flag.starts_with('-') => {
                return Err(usage_error(format!("unknown option: {flag}")));
            }
            path => file = Some(PathBuf::from(path)),
        }
    }

    let Some(file) = file else {
        return Err(usage_error("no file given".to_string()));
    };
    Ok(Some(Options {
        file,
        config,
        top,
        rows,
    }))
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| usage_error(format!("{flag} needs a value")))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| usage_error(format!("{flag}: not a number: {value}")))
}

fn usage_error(message: String) -> HighlightError {
    HighlightError::Usage(message)
}

fn print_usage() {
    println!("tagpad {} - Python syntax highlighting preview", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: tagpad [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -c, --config FILE  Read settings from FILE instead of ~/.tagpad.toml");
    println!("  -t, --top LINE     First visible line (default 1)");
    println!("  -r, --rows N       Visible rows (default: terminal height)");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Set TAGPAD_LOG=debug to trace highlight passes.");
}

/// Print the visible lines, clipped to `max_cols` display columns
fn render(highlighter: &Highlighter<MemoryBuffer>, max_cols: usize) -> Result<()> {
    let buffer = highlighter.buffer();
    let span = buffer.visible_lines();
    let mut out = io::stdout().lock();

    for line_no in span.first..=span.last {
        let Some(line) = buffer.line(line_no) else {
            break;
        };

        let mut width = 0;
        let mut run = String::new();
        let mut run_style = Style::default();
        for (col, ch) in line.text().chars().enumerate() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
            if width + ch_width > max_cols {
                break;
            }
            width += ch_width;

            let style = style_at(highlighter, Position::new(line_no, col));
            if style != run_style && !run.is_empty() {
                write_run(&mut out, &run, &run_style)?;
                run.clear();
            }
            run_style = style;
            run.push(ch);
        }
        if !run.is_empty() {
            write_run(&mut out, &run, &run_style)?;
        }
        queue!(out, Print("\n"))?;
    }

    out.flush()?;
    Ok(())
}

/// Merge the styles of every category tagged at `pos`; later categories win
fn style_at(highlighter: &Highlighter<MemoryBuffer>, pos: Position) -> Style {
    let mut style = Style::default();
    for category in highlighter.buffer().tags_at(pos) {
        let tag = highlighter.style_of(category);
        if tag.fg != Color::Default {
            style.fg = tag.fg;
        }
        if tag.bg.is_some() {
            style.bg = tag.bg;
        }
        style.bold |= tag.bold;
        style.italic |= tag.italic;
        style.underline |= tag.underline;
    }
    style
}

fn write_run(out: &mut impl Write, text: &str, style: &Style) -> Result<()> {
    if style.is_default() {
        queue!(out, Print(text))?;
        return Ok(());
    }

    queue!(out, SetForegroundColor(term_color(style.fg)))?;
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(term_color(bg)))?;
    }
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if style.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}
