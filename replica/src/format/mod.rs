use clap::ValueEnum;
use libreplica::JobState;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;

/// Colors are off when NO_COLOR is set or neither stream is a terminal.
pub fn should_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && (std::io::stdout().is_terminal() || std::io::stderr().is_terminal())
}

/// Leading glyph for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Absent,
    Retry,
    Failed,
}

impl Mark {
    fn glyph(self) -> &'static str {
        match self {
            Mark::Done => "✓",
            Mark::Absent => "-",
            Mark::Retry => "↻",
            Mark::Failed => "✗",
        }
    }

    /// The glyph, painted when `color` is set.
    pub fn paint(self, color: bool) -> String {
        let glyph = self.glyph();
        if !color {
            return glyph.to_string();
        }
        match self {
            Mark::Done => glyph.green().to_string(),
            Mark::Absent => glyph.dimmed().to_string(),
            Mark::Retry => glyph.yellow().bold().to_string(),
            Mark::Failed => glyph.red().bold().to_string(),
        }
    }
}

impl From<JobState> for Mark {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Finished => Mark::Done,
            JobState::Retrying => Mark::Retry,
            JobState::Running => Mark::Absent,
        }
    }
}

/// `<glyph> <message>`, without color.
pub fn status_line(mark: Mark, message: &str) -> String {
    format!("{} {}", mark.paint(false), message)
}

fn print_status(mark: Mark, message: &str, to_stderr: bool) {
    let line = format!("{} {}", mark.paint(should_color()), message);
    if to_stderr {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn success(message: &str) {
    print_status(Mark::Done, message, false);
}

pub fn warning(message: &str) {
    print_status(Mark::Retry, message, true);
}

pub fn error(message: &str) {
    print_status(Mark::Failed, message, true);
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    Json,
    #[value(alias = "yml")]
    Yaml,
}

/// Command results that can be printed in every [`OutputFormat`].
pub trait Formattable: Serialize {
    fn format_pretty(&self) -> String;
}

/// Renders `item` in the requested format.
pub fn render<T: Formattable>(item: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(item.format_pretty()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(item).map_err(|e| format!("JSON output failed: {}", e))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(item).map_err(|e| format!("YAML output failed: {}", e))
        }
    }
}

/// Prints `item` to stdout; a serialization failure exits with status 1.
pub fn emit<T: Formattable>(item: &T, format: OutputFormat) {
    match render(item, format) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            error(&e);
            std::process::exit(1);
        }
    }
}
