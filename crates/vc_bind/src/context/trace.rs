use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::{Context, Key, Location};
use crate::info::TypeDesc;

/// One node of a [`ContextTrace`].
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub key: Key,
    pub datatype: TypeDesc,
    pub location: Location,
}

/// An owned snapshot of a context and its ancestors, root first.
///
/// Rendered one node per line: `$` for the root, `.name` for object keys,
/// `[index]` for list items and `^` for nodes converting their parent's
/// value as another type. A filename header is emitted whenever it changes.
///
/// ```text
/// In "config.json"
///   $: Config
///   .servers: list[Server]
///   [1]: Server (at 4:7)
///   .port: int
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextTrace {
    pub frames: Vec<TraceFrame>,
}

impl ContextTrace {
    /// Capture the trace of `ctx`.
    pub fn capture(ctx: &Context<'_>) -> Self {
        let mut frames: Vec<TraceFrame> = ctx
            .iter_hierarchy_up()
            .map(|c| TraceFrame {
                key: c.key.clone(),
                datatype: c.datatype.clone(),
                location: c.location.clone(),
            })
            .collect();
        frames.reverse();
        Self { frames }
    }

    /// Render the trace, indenting each line with `indent`.
    pub fn render(&self, indent: &str) -> String {
        use fmt::Write;

        let mut out = String::new();
        let mut prev_filename: Option<&Arc<str>> = None;
        for frame in &self.frames {
            if let Some(filename) = &frame.location.filename
                && prev_filename != Some(filename)
            {
                let _ = writeln!(out, "{indent}In \"{filename}\"");
                prev_filename = Some(filename);
            }

            let _ = write!(out, "{indent}  {}: {}", frame.key, frame.datatype);
            if frame.location.line.is_some() || frame.location.column.is_some() {
                let line = frame.location.line.unwrap_or(0);
                let column = frame.location.column.unwrap_or(0);
                let _ = write!(out, " (at {line}:{column})");
            }
            out.push('\n');
        }
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

impl fmt::Display for ContextTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}
