//! Terminal output helpers shared by the commands.
//!
//! Success and info lines go to stdout, warnings and errors to stderr. Colour
//! is applied only when the target stream supports it.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

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

#[derive(Debug, Clone, Copy)]
enum Tone {
  Success,
  Info,
  Warning,
  Error,
}

impl Tone {
  fn symbol(self) -> &'static str {
    match self {
      Tone::Success => "✓",
      Tone::Info => "•",
      Tone::Warning => "⚠",
      Tone::Error => "✗",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Tone::Success | Tone::Info => Stream::Stdout,
      Tone::Warning | Tone::Error => Stream::Stderr,
    }
  }

  fn paint(self, text: &str) -> String {
    let stream = self.stream();
    match self {
      Tone::Success => text.if_supports_color(stream, |s| s.green()).to_string(),
      Tone::Info => text.if_supports_color(stream, |s| s.blue()).to_string(),
      Tone::Warning => text.if_supports_color(stream, |s| s.yellow()).to_string(),
      Tone::Error => text.if_supports_color(stream, |s| s.red()).to_string(),
    }
  }
}

fn emit(tone: Tone, message: &str) {
  let symbol = tone.paint(tone.symbol());
  match tone.stream() {
    Stream::Stdout => println!("{} {}", symbol, message),
    _ => eprintln!("{} {}", symbol, tone.paint(message)),
  }
}

pub fn print_success(message: &str) {
  emit(Tone::Success, message);
}

pub fn print_info(message: &str) {
  emit(Tone::Info, message);
}

pub fn print_warning(message: &str) {
  emit(Tone::Warning, message);
}

pub fn print_error(message: &str) {
  emit(Tone::Error, message);
}

/// Indented `label: value` line under a status message.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
  println!("{}", json);
  Ok(())
}

/// `+` for a present entry, `-` for a missing one.
pub fn entry_marker(present: bool) -> String {
  if present {
    "+".if_supports_color(Stream::Stdout, |s| s.green()).to_string()
  } else {
    "-".if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  }
}

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
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..=59 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}
