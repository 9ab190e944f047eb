//! Destinations for streamed command output.

/// Receives output lines as a command produces them.
pub trait LineSink {
  fn line(&mut self, line: &str);
}

/// Writes every line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LineSink for ConsoleSink {
  fn line(&mut self, line: &str) {
    println!("{}", line);
  }
}

/// Collects lines in memory.
impl LineSink for Vec<String> {
  fn line(&mut self, line: &str) {
    self.push(line.to_string());
  }
}

/// Discards everything.
impl LineSink for () {
  fn line(&mut self, _line: &str) {}
}
