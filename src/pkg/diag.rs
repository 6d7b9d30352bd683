// Purpose: Route advisory (title, message) diagnostics produced during manifest and package parsing.
// Inputs/Outputs: Reporter forwards messages to a sink unless silenced; sinks log or collect them.
// Invariants: Diagnostics never change a lookup result; they only describe why something was skipped.
// Gotchas: MemorySink is shared across threads in tests, so it locks instead of using RefCell.

use std::sync::Mutex;

pub const DEFAULT_LOG_TITLE: &str = "jspm-resolve";

pub trait DiagnosticSink {
    fn emit(&self, title: &str, message: &str);
}

/// Default sink: one `tracing` warning per diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, title: &str, message: &str) {
        tracing::warn!(title = %title, "{}", message);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    items: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<Diagnostic> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.items().into_iter().map(|d| d.message).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().map(|v| v.is_empty()).unwrap_or(true)
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, title: &str, message: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.push(Diagnostic {
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }
}

pub struct Reporter<'a> {
    sink: &'a dyn DiagnosticSink,
    title: String,
    silent: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink, title: impl Into<String>, silent: bool) -> Self {
        Self {
            sink,
            title: title.into(),
            silent,
        }
    }

    pub fn silent(sink: &'a dyn DiagnosticSink) -> Self {
        Self::new(sink, DEFAULT_LOG_TITLE, true)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        if !self.silent {
            self.sink.emit(&self.title, message.as_ref());
        }
    }
}

impl Default for Reporter<'static> {
    fn default() -> Self {
        static SINK: TracingSink = TracingSink;
        Reporter::new(&SINK, DEFAULT_LOG_TITLE, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_forwards_title_and_message() {
        let sink = MemorySink::new();
        let rep = Reporter::new(&sink, "my-app", false);
        rep.warn("first");
        rep.warn(String::from("second"));
        assert_eq!(
            sink.items(),
            vec![
                Diagnostic {
                    title: "my-app".into(),
                    message: "first".into()
                },
                Diagnostic {
                    title: "my-app".into(),
                    message: "second".into()
                },
            ]
        );
    }

    #[test]
    fn silent_reporter_drops_everything() {
        let sink = MemorySink::new();
        let rep = Reporter::silent(&sink);
        rep.warn("hidden");
        assert!(sink.is_empty());
        assert!(rep.is_silent());
    }
}
