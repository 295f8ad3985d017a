//! Rendered output of a single transition.

/// One line of output and the stream it belongs on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// Prompts and results
    Out(String),
    /// Rejections of bad input
    Err(String),
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Line::Out(s) | Line::Err(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Line::Err(_))
    }
}

/// Whether the driver should keep feeding lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Control {
    #[default]
    Continue,
    Exit,
}

/// Lines produced by one input event, in order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub lines: Vec<Line>,
    pub control: Control,
}

impl Output {
    pub(crate) fn say(&mut self, line: impl Into<String>) {
        self.lines.push(Line::Out(line.into()));
    }

    pub(crate) fn reject(&mut self, line: impl Into<String>) {
        self.lines.push(Line::Err(line.into()));
    }

    pub fn is_exit(&self) -> bool {
        self.control == Control::Exit
    }

    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(Line::is_error)
    }

    /// Standard-output lines joined with newlines
    pub fn stdout_text(&self) -> String {
        self.lines
            .iter()
            .filter(|l| !l.is_error())
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Error lines joined with newlines
    pub fn stderr_text(&self) -> String {
        self.lines
            .iter()
            .filter(|l| l.is_error())
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
