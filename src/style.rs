use std::io::IsTerminal;

use anstyle::{AnsiColor, Color, Effects, Style as AnsiStyle};

const BOLD: AnsiStyle = AnsiStyle::new().effects(Effects::BOLD);
const DIM: AnsiStyle = AnsiStyle::new().effects(Effects::DIMMED);
const GREEN: AnsiStyle = AnsiStyle::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const RED: AnsiStyle = AnsiStyle::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
const YELLOW: AnsiStyle = AnsiStyle::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Color helpers that only emit escape codes when the target stream is a terminal
pub(crate) struct Style {
    color: bool,
}

impl Style {
    pub(crate) fn stderr() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }

    pub(crate) fn stdout() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    fn paint(&self, style: AnsiStyle, s: &str) -> String {
        if self.color {
            format!("{}{s}{}", style.render(), style.render_reset())
        } else {
            s.to_string()
        }
    }

    pub(crate) fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    pub(crate) fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub(crate) fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub(crate) fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub(crate) fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }
}

pub(crate) fn format_duration(d: std::time::Duration) -> String {
    let total_secs = d.as_secs();
    let tenths = d.subsec_millis() / 100;
    if total_secs < 60 {
        format!("{total_secs}.{tenths}s")
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{mins}m {secs}.{tenths}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_plain_when_not_a_terminal() {
        let sty = Style { color: false };
        assert_eq!(sty.red("FAIL"), "FAIL");
    }

    #[test]
    fn test_painted_when_color_enabled() {
        let sty = Style { color: true };
        let painted = sty.green("PASS");
        assert!(painted.starts_with("\x1b["), "got: {painted:?}");
        assert!(painted.contains("PASS"));
        assert!(painted.ends_with("\x1b[0m"), "got: {painted:?}");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1250)), "1.2s");
        assert_eq!(format_duration(Duration::from_millis(83_400)), "1m 23.4s");
    }
}
