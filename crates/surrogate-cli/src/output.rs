//! Colored terminal output for CLI commands.
//!
//! Uses `termcolor`; `NO_COLOR` and `--color` decide whether styles apply.

use std::io::Write;

use surrogate_engine::Value;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer over stdout.
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Cyan), false);
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    // ── Layout helpers ───────────────────────────────────────────────

    /// `  label  value` with the label padded to `width`.
    pub fn field(&mut self, label: &str, value: &str, width: usize) {
        self.plain("  ");
        self.info(&format!("{:<width$}", label, width = width));
        self.plain(" ");
        self.plain(value);
        self.newline();
    }

    /// Section heading followed by a newline.
    pub fn heading(&mut self, text: &str) {
        self.bold(text);
        self.newline();
    }
}

/// Short rendering of a runtime value for demo output.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => format!("{:?}", s.as_ref()),
        Value::Object(o) => format!("<{}>", o.class()),
        Value::Type(t) => format!("typeof({})", t),
        Value::Deferred(d) => match d.try_result() {
            Some(v) => format!("deferred(completed: {})", describe_value(&v)),
            None => "deferred(pending)".to_string(),
        },
        Value::Sequence(_) => "sequence".to_string(),
    }
}
