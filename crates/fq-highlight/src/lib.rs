//! Syntax highlighting and terminal colors for fq.
//!
//! This crate colors queries by their lexical structure, highlights TOML configuration
//! for terminal output, and provides styled helpers for status messages.

#![warn(missing_docs)]

use fq_query::{LexemeKind, scan};
use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// A syntax highlighter for configuration files.
pub struct Highlighter {
    /// The syntax set containing language definitions (including TOML).
    syntax_set: SyntaxSet,
    /// The theme set containing color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// The theme to use.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a new highlighter with the default theme (Dracula).
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML content for terminal output.
    ///
    /// Falls back to plain text if the TOML syntax is unavailable.
    pub fn highlight_toml(&self, content: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension("toml")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI color codes for terminal output.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (for field codes).
    pub const CYAN: &str = "\x1b[36m";
    /// Green text (for success).
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow text (for warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Magenta text (for operators).
    pub const MAGENTA: &str = "\x1b[35m";
    /// Red text (for errors).
    pub const RED: &str = "\x1b[31m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Colors a query by its lexical structure.
///
/// Field codes are cyan, operators bold magenta, brackets dim, and text that is not part
/// of any condition red. Whitespace between lexemes is kept as written.
pub fn highlight_query(query: &str) -> String {
    let mut output = String::with_capacity(query.len() * 2);
    let mut cursor = 0;

    for lexeme in scan(query) {
        let span = lexeme.span.clone();
        output.push_str(&query[cursor..span.start]);
        let text = &query[span.clone()];
        match lexeme.kind {
            LexemeKind::Open | LexemeKind::Close => output.push_str(&dim(text)),
            LexemeKind::Operator(_) => {
                output.push_str(&format!(
                    "{}{}{}{}",
                    colors::BOLD,
                    colors::MAGENTA,
                    text,
                    colors::RESET
                ));
            }
            LexemeKind::Condition { .. } => {
                let (field, rest) = text.split_at(2);
                output.push_str(colors::CYAN);
                output.push_str(field);
                output.push_str(colors::RESET);
                output.push_str(rest);
            }
            LexemeKind::Text(_) => output.push_str(&error(text)),
        }
        cursor = span.end;
    }

    output.push_str(&query[cursor..]);
    output
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{}{}{}", colors::BOLD, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a success message (green).
pub fn success(text: &str) -> String {
    format!("{}{}{}", colors::GREEN, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Formats text as an error (red).
pub fn error(text: &str) -> String {
    format!("{}{}{}", colors::RED, text, colors::RESET)
}

/// Removes ANSI escape sequences from `text`.
pub fn strip_ansi(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // CSI sequences end at the first byte in '@'..='~'
            for next in chars.by_ref() {
                if ('@'..='~').contains(&next) && next != '[' {
                    break;
                }
            }
        } else {
            output.push(c);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlighter_toml() {
        let hl = Highlighter::new();
        let toml = "[search]\nlimit = 5\n";
        let output = hl.highlight_toml(toml);
        assert!(output.contains("\x1b["));
        assert!(output.ends_with(colors::RESET));
        assert_eq!(strip_ansi(&output), toml);
    }

    #[test]
    fn test_toml_syntax_available() {
        let ss = extra_syntaxes();
        assert!(
            ss.find_syntax_by_extension("toml").is_some(),
            "TOML syntax should be available"
        );
    }

    #[test]
    fn test_highlight_query_preserves_text() {
        for query in [
            "ti=network and (au=smith or au=jones) not ts=2020",
            "  TI = x  ",
            "foo ti=a",
            "ti=rock and roll",
            "",
        ] {
            assert_eq!(strip_ansi(&highlight_query(query)), query);
        }
    }

    #[test]
    fn test_highlight_query_colors() {
        let output = highlight_query("(ti=a) and au=b");
        assert!(output.contains(&format!("{}ti{}", colors::CYAN, colors::RESET)));
        assert!(output.contains(&format!(
            "{}{}and{}",
            colors::BOLD,
            colors::MAGENTA,
            colors::RESET
        )));
        assert!(output.contains(&dim("(")));
    }

    #[test]
    fn test_highlight_query_marks_stray_text() {
        let output = highlight_query("foo ti=a");
        assert!(output.starts_with(&error("foo")));
    }

    #[test]
    fn test_subheader_formatting() {
        let h = subheader("Test");
        assert!(h.contains(colors::BOLD));
        assert!(h.contains(colors::RESET));
        assert!(h.contains("Test"));
    }

    #[test]
    fn test_dim_formatting() {
        let d = dim("faint");
        assert!(d.contains(colors::DIM));
        assert!(d.contains(colors::RESET));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi(&success("ok")), "ok");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
