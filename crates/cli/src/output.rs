//! Console rendering for bitpub.
//!
//! Progress and results go to stdout, warnings and errors to stderr. In JSON
//! mode commands print a single document through [`print_json`] and nothing
//! else.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kinds of one-line status message.
#[derive(Debug, Clone, Copy)]
enum Status {
  Success,
  Info,
  Warning,
  Error,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Info => "•",
      Status::Warning => "⚠",
      Status::Error => "✗",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Success => AnsiColors::Green,
      Status::Info => AnsiColors::Blue,
      Status::Warning => AnsiColors::Yellow,
      Status::Error => AnsiColors::Red,
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Success | Status::Info => Stream::Stdout,
      Status::Warning | Status::Error => Stream::Stderr,
    }
  }

  /// Problems are coloured in full, progress only by its symbol.
  fn colors_message(self) -> bool {
    matches!(self, Status::Warning | Status::Error)
  }
}

fn print_status(status: Status, message: &str) {
  let stream = status.stream();
  let color = status.color();
  let symbol = status.symbol();
  let symbol = symbol.if_supports_color(stream, |s| s.color(color));

  let line = if status.colors_message() {
    format!("{} {}", symbol, message.if_supports_color(stream, |s| s.color(color)))
  } else {
    format!("{} {}", symbol, message)
  };

  match stream {
    Stream::Stderr => eprintln!("{}", line),
    _ => println!("{}", line),
  }
}

pub fn print_success(message: &str) {
  print_status(Status::Success, message);
}

pub fn print_info(message: &str) {
  print_status(Status::Info, message);
}

pub fn print_warning(message: &str) {
  print_status(Status::Warning, message);
}

pub fn print_error(message: &str) {
  print_status(Status::Error, message);
}

/// A plan line: `→ [stage] what happens`.
pub fn print_step(label: &str, message: &str) {
  println!(
    "  {} {} {}",
    "→".if_supports_color(Stream::Stdout, |s| s.cyan()),
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    message
  );
}

/// A path that cleanup deleted.
pub fn print_removed(path: &str) {
  println!("  {} {}", "-".if_supports_color(Stream::Stdout, |s| s.red()), path);
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Archive sizes in binary units with one decimal.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  if bytes < 1024 {
    return format!("{} B", bytes);
  }

  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit + 1 < UNITS.len() {
    value /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_duration(duration: Duration) -> String {
  match duration.as_secs() {
    0 => format!("{}ms", duration.subsec_millis()),
    secs @ 1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    secs => format!("{}m {}s", secs / 60, secs % 60),
  }
}
