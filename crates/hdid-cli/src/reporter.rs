//! Per-invocation outcome reporting.
//!
//! A command starts [`Pending`] and ends exactly once, in either
//! [`Outcome::Success`] or [`Outcome::Failure`]. Results go to the output
//! sink; progress and failures go to the diagnostic sink.

use std::io::{self, Write};

/// Presentation of a success headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Warning,
    Plain,
}

/// What a successful command has to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub headline: String,
    pub tone: Tone,
    pub fields: Vec<(String, String)>,
}

impl Summary {
    pub fn positive(headline: impl Into<String>) -> Self {
        Self::with_tone(headline, Tone::Positive)
    }

    pub fn warning(headline: impl Into<String>) -> Self {
        Self::with_tone(headline, Tone::Warning)
    }

    pub fn plain(headline: impl Into<String>) -> Self {
        Self::with_tone(headline, Tone::Plain)
    }

    fn with_tone(headline: impl Into<String>, tone: Tone) -> Self {
        Self {
            headline: headline.into(),
            tone,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((label.into(), value.to_string()));
        self
    }

    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Terminal state of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

pub struct Reporter<O: Write, D: Write> {
    out: O,
    diag: D,
}

impl Reporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, D: Write> Reporter<O, D> {
    pub fn new(out: O, diag: D) -> Self {
        Self { out, diag }
    }

    /// Enter the pending state, announcing `progress` on the diagnostic sink.
    pub fn start(&mut self, progress: &str) -> Pending<'_, O, D> {
        let _ = writeln!(self.diag, "{}...", progress);
        Pending { reporter: self }
    }

    #[cfg(test)]
    pub fn into_sinks(self) -> (O, D) {
        (self.out, self.diag)
    }
}

/// A command in flight. Consumed by [`Pending::succeed`] or [`Pending::fail`].
#[must_use = "a pending command must end in succeed() or fail()"]
pub struct Pending<'a, O: Write, D: Write> {
    reporter: &'a mut Reporter<O, D>,
}

impl<'a, O: Write, D: Write> Pending<'a, O, D> {
    pub fn succeed(mut self, summary: Summary) -> Outcome {
        let out = &mut self.reporter.out;
        let _ = match summary.tone {
            Tone::Positive => writeln!(out, "✓ {}", summary.headline),
            Tone::Warning => writeln!(out, "✗ {}", summary.headline),
            Tone::Plain => writeln!(out, "{}", summary.headline),
        };
        for (label, value) in &summary.fields {
            let _ = writeln!(out, "  {}: {}", label, value);
        }
        let _ = out.flush();
        Outcome::Success
    }

    pub fn fail(mut self, headline: &str, error: &anyhow::Error) -> Outcome {
        let diag = &mut self.reporter.diag;
        let _ = writeln!(diag, "✗ {}", headline);
        let _ = writeln!(diag, "Error: {:#}", error);
        let _ = diag.flush();
        Outcome::Failure
    }
}
