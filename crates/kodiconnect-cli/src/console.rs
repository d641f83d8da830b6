//! Console implementations of the host services.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
use kodiconnect_core::{Dialog, Host};
use tracing::{debug, warn};

type Input = Box<dyn BufRead + Send>;
type Output = Box<dyn Write + Send>;

/// Reads a line without echoing it. Receives the output stream and the
/// prompt to show first.
pub type SecretReader = Box<dyn Fn(&mut dyn Write, &str) -> io::Result<String> + Send + Sync>;

/// Dialogs rendered as prompts on a terminal.
///
/// Hidden input goes through the secret reader when one is set, and through
/// the plain input stream otherwise.
pub struct ConsoleDialog {
    io: Mutex<(Input, Output)>,
    secret: Option<SecretReader>,
}

impl ConsoleDialog {
    /// Prompt on stdin / stdout. Hidden input is read in raw mode when stdin
    /// is a terminal.
    pub fn stdio() -> Self {
        let dialog = Self::new(Box::new(io::BufReader::new(io::stdin())), Box::new(io::stdout()));
        if io::stdin().is_terminal() {
            dialog.with_secret_reader(Box::new(read_masked))
        } else {
            dialog
        }
    }

    /// Prompt on arbitrary streams.
    pub fn new(input: Input, output: Output) -> Self {
        Self {
            io: Mutex::new((input, output)),
            secret: None,
        }
    }

    /// Read hidden input with `reader` instead of the input stream.
    #[must_use]
    pub fn with_secret_reader(mut self, reader: SecretReader) -> Self {
        self.secret = Some(reader);
        self
    }

    /// Print `prompt` and read one line without its line ending. End of
    /// input reads as an empty line.
    fn ask(&self, prompt: &str) -> String {
        let Ok(mut io) = self.io.lock() else {
            return String::new();
        };
        let (input, output) = &mut *io;
        if let Err(e) = write!(output, "{prompt}").and_then(|()| output.flush()) {
            warn!("Failed to write console prompt: {}", e);
            return String::new();
        }
        let mut line = String::new();
        if let Err(e) = input.read_line(&mut line) {
            warn!("Failed to read console input: {}", e);
            return String::new();
        }
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Like [`Self::ask`], but through the secret reader if there is one.
    fn ask_hidden(&self, prompt: &str) -> String {
        let Some(reader) = &self.secret else {
            return self.ask(prompt);
        };
        let Ok(mut io) = self.io.lock() else {
            return String::new();
        };
        match reader(&mut io.1, prompt) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read hidden console input: {}", e);
                String::new()
            }
        }
    }

    fn say(&self, text: &str) {
        if let Ok(mut io) = self.io.lock()
            && let Err(e) = writeln!(io.1, "{text}")
        {
            warn!("Failed to write console output: {}", e);
        }
    }
}

/// Leaves raw mode on drop unless it was already on.
struct RawModeGuard {
    was_enabled: bool,
}

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        let was_enabled = is_raw_mode_enabled().unwrap_or(false);
        if !was_enabled {
            enable_raw_mode()?;
        }
        Ok(Self { was_enabled })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_enabled
            && let Err(e) = disable_raw_mode()
        {
            warn!("Failed to leave raw mode: {}", e);
        }
    }
}

/// Read a line from the terminal in raw mode so that nothing is echoed.
/// Escape and Ctrl-C cancel with an empty line.
fn read_masked(output: &mut dyn Write, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let line = {
        let _raw = RawModeGuard::new()?;
        read_keys()?
    };
    writeln!(output)?;
    Ok(line)
}

fn read_keys() -> io::Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };
        match code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Esc => return Ok(String::new()),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(String::new());
            }
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}

impl std::fmt::Debug for ConsoleDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleDialog").finish_non_exhaustive()
    }
}

impl Dialog for ConsoleDialog {
    fn yes_no(&self, heading: &str, line: &str) -> bool {
        let answer = self.ask(&format!("[{heading}] {line} [y/N] "));
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn ok(&self, heading: &str, line: &str) {
        self.say(&format!("[{heading}] {line}"));
    }

    fn select(&self, heading: &str, options: &[String]) -> Option<usize> {
        self.say(&format!("[{heading}]"));
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, option));
        }
        self.ask("Choice (empty to cancel): ")
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| n - 1)
    }

    fn input(&self, heading: &str, default: &str, hidden: bool) -> String {
        let prompt = if default.is_empty() {
            format!("{heading}: ")
        } else {
            format!("{heading} [{default}]: ")
        };
        let answer = if hidden {
            self.ask_hidden(&prompt)
        } else {
            self.ask(&prompt)
        };
        if answer.is_empty() {
            default.to_string()
        } else {
            answer
        }
    }

    fn notification(&self, heading: &str, message: &str, _icon: &str, _time_ms: u32, _sound: bool) {
        self.say(&format!("[{heading}] {message}"));
    }
}

/// Host control for a process running outside the host application.
#[derive(Debug, Clone)]
pub struct ConsoleHost {
    build_version: String,
}

impl ConsoleHost {
    /// Report `build_version` as the host version.
    pub fn new(build_version: impl Into<String>) -> Self {
        Self {
            build_version: build_version.into(),
        }
    }
}

impl Host for ConsoleHost {
    fn build_version(&self) -> String {
        self.build_version.clone()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn restart_app(&self) {
        warn!("Restart Kodi to apply the changes");
    }

    fn probe_path(&self, url: &str) -> bool {
        if url.contains("://") {
            debug!("Cannot probe network path outside the host");
            return false;
        }
        Path::new(url).exists()
    }
}
