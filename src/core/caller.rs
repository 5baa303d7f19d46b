//! Call-site capture and stack introspection
//!
//! `Caller` is recorded for every emitted record through `#[track_caller]`.
//! `CallStack` is only captured by the caller-annotating handlers, since
//! walking the stack is far more expensive than reading a `Location`.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

/// Source location of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl Caller {
    /// Location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn capture() -> Self {
        Self::from(Location::caller())
    }

    pub fn file_name(&self) -> &'static str {
        base_name(self.file)
    }

    /// `path:line` with the full path as compiled.
    pub fn long(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)
    }
}

/// How each frame of a rendered stack is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallFormat {
    /// `file.rs:12`
    #[default]
    Short,
    /// `src/dir/file.rs:12`
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    fn is_runtime(&self) -> bool {
        let in_std_source = self
            .file
            .as_deref()
            .is_some_and(|f| f.contains("/rustc/") || f.starts_with("library/"));
        in_std_source
            || self.function.starts_with("std::")
            || self.function.starts_with("core::")
            || self.function.starts_with("alloc::")
            || self.function.starts_with("test::")
            || self.function.contains("__rust_begin_short_backtrace")
    }

    fn matches(&self, caller: &Caller) -> bool {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => line == caller.line && paths_match(file, caller.file),
            _ => false,
        }
    }

    pub fn render(&self, format: CallFormat) -> Option<String> {
        let (file, line) = (self.file.as_deref()?, self.line?);
        Some(match format {
            CallFormat::Short => format!("{}:{}", base_name(file), line),
            CallFormat::Long => format!("{}:{}", file, line),
        })
    }
}

/// Frames of the current thread's stack, innermost first
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn capture() -> Self {
        let backtrace = Backtrace::force_capture();
        Self::parse(&backtrace.to_string())
    }

    /// Parse the textual backtrace rendering produced by the standard library.
    ///
    /// Symbol lines look like `  3: crate::module::function` and are followed
    /// by an optional `at path/to/file.rs:12:5` line.
    pub fn parse(text: &str) -> Self {
        let mut frames: Vec<Frame> = Vec::new();
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(location) = line.strip_prefix("at ") {
                if let Some(frame) = frames.last_mut() {
                    if frame.file.is_none() {
                        let (file, line_no) = parse_location(location);
                        frame.file = file;
                        frame.line = line_no;
                    }
                }
                continue;
            }
            let function = match line.split_once(": ") {
                Some((index, name)) if index.chars().all(|c| c.is_ascii_digit()) => name,
                _ => line,
            };
            frames.push(Frame {
                function: strip_hash(function).to_string(),
                file: None,
                line: None,
            });
        }
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame that corresponds to `caller`, if symbols were available.
    pub fn find(&self, caller: &Caller) -> Option<&Frame> {
        self.frames.iter().find(|f| f.matches(caller))
    }

    /// Drop every frame above `caller` so the stack starts at the call site.
    pub fn trim_above(self, caller: &Caller) -> Self {
        match self.frames.iter().position(|f| f.matches(caller)) {
            Some(idx) => Self {
                frames: self.frames.into_iter().skip(idx).collect(),
            },
            None => Self::default(),
        }
    }

    pub fn trim_runtime(self) -> Self {
        Self {
            frames: self
                .frames
                .into_iter()
                .filter(|f| f.file.is_some() && !f.is_runtime())
                .collect(),
        }
    }

    /// `[a.rs:1 b.rs:2]`
    pub fn render(&self, format: CallFormat) -> String {
        let parts: Vec<String> = self.frames.iter().filter_map(|f| f.render(format)).collect();
        format!("[{}]", parts.join(" "))
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn paths_match(frame_file: &str, caller_file: &str) -> bool {
    let frame_file = frame_file.trim_start_matches("./");
    let caller_file = caller_file.trim_start_matches("./");
    frame_file == caller_file
        || frame_file.ends_with(&format!("/{}", caller_file))
        || caller_file.ends_with(&format!("/{}", frame_file))
}

fn parse_location(location: &str) -> (Option<String>, Option<u32>) {
    // path:line:column, where the path itself may contain ':' on Windows
    let mut parts = location.rsplitn(3, ':');
    let column = parts.next();
    let line = parts.next();
    let path = parts.next();
    match (path, line, column) {
        (Some(path), Some(line), Some(_)) => (
            Some(path.trim_start_matches("./").to_string()),
            line.parse().ok(),
        ),
        _ => (Some(location.to_string()), None),
    }
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:13
   1: kvlog::core::caller::CallStack::capture
             at ./src/core/caller.rs:98:25
   2: app::handlers::serve::h0123456789abcdef
             at ./src/handlers.rs:40:9
   3: app::main
             at ./src/main.rs:12:5
   4: core::ops::function::FnOnce::call_once
             at /rustc/abc/library/core/src/ops/function.rs:250:5
   5: <unknown>
";

    #[test]
    fn test_caller_display_uses_base_name() {
        let caller = Caller {
            file: "src/server/http.rs",
            line: 42,
            column: 9,
        };
        assert_eq!(caller.to_string(), "http.rs:42");
        assert_eq!(caller.long(), "src/server/http.rs:42");
    }

    #[test]
    fn test_capture_records_this_line() {
        let caller = Caller::capture();
        assert_eq!(caller.line, line!() - 1);
        assert_eq!(caller.file_name(), "caller.rs");
    }

    #[test]
    fn test_parse_frames() {
        let stack = CallStack::parse(SAMPLE);
        assert_eq!(stack.frames().len(), 6);
        assert_eq!(stack.frames()[2].function, "app::handlers::serve");
        assert_eq!(stack.frames()[2].file.as_deref(), Some("src/handlers.rs"));
        assert_eq!(stack.frames()[2].line, Some(40));
        assert_eq!(stack.frames()[5].file, None);
    }

    #[test]
    fn test_trim_and_render() {
        let caller = Caller {
            file: "src/handlers.rs",
            line: 40,
            column: 9,
        };
        let stack = CallStack::parse(SAMPLE).trim_above(&caller).trim_runtime();
        assert_eq!(stack.render(CallFormat::Short), "[handlers.rs:40 main.rs:12]");
        assert_eq!(
            stack.render(CallFormat::Long),
            "[src/handlers.rs:40 src/main.rs:12]"
        );
    }

    #[test]
    fn test_trim_above_unknown_caller_is_empty() {
        let caller = Caller {
            file: "src/elsewhere.rs",
            line: 1,
            column: 1,
        };
        assert!(CallStack::parse(SAMPLE).trim_above(&caller).is_empty());
    }
}
