use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::TypeUuid;

/// Severity of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One issue recorded by an [`ErrorHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    /// The node path at the time of the report, empty unless paths are recorded.
    pub path: String,
}

#[derive(Debug, Clone)]
struct Frame {
    name: Cow<'static, str>,
    type_name: &'static str,
    type_uuid: TypeUuid,
}

/// Collects the errors and warnings of one traversal.
///
/// Issues never abort a traversal, the caller decides what to do with the
/// counts once it returns. Every issue is also forwarded to the `log` crate.
///
/// In debug builds with the `debug` feature, each issue records the path of
/// the node it was raised on, for example `Scene.entities.element(Player)`.
#[derive(Debug, Default, Clone)]
pub struct ErrorHandler {
    errors: u32,
    warnings: u32,
    stack: Vec<Frame>,
    issues: Vec<Issue>,
}

impl ErrorHandler {
    #[inline]
    pub const fn new() -> Self {
        Self {
            errors: 0,
            warnings: 0,
            stack: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Enters a node of the traversal.
    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, type_name: &'static str, type_uuid: TypeUuid) {
        self.stack.push(Frame {
            name: name.into(),
            type_name,
            type_uuid,
        });
    }

    /// Leaves the current node.
    #[inline]
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn report_error(&mut self, message: impl fmt::Display) {
        self.errors += 1;
        self.record(Severity::Error, message);
    }

    pub fn report_warning(&mut self, message: impl fmt::Display) {
        self.warnings += 1;
        self.record(Severity::Warning, message);
    }

    fn record(&mut self, severity: Severity, message: impl fmt::Display) {
        let message = alloc::format!("{message}");
        let path = self.path();
        match (severity, path.is_empty()) {
            (Severity::Error, true) => log::error!("{message}"),
            (Severity::Error, false) => log::error!("{message} (at {path})"),
            (Severity::Warning, true) => log::warn!("{message}"),
            (Severity::Warning, false) => log::warn!("{message} (at {path})"),
        }
        self.issues.push(Issue {
            severity,
            message,
            path,
        });
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    fn path(&self) -> String {
        self.stack_description()
    }

    #[cfg(not(all(debug_assertions, feature = "debug")))]
    fn path(&self) -> String {
        String::new()
    }

    /// Describes the current node path.
    pub fn stack_description(&self) -> String {
        let mut out = String::new();
        for (depth, frame) in self.stack.iter().enumerate() {
            if depth > 0 {
                out.push('.');
            }
            if frame.name == frame.type_name {
                out.push_str(&frame.name);
            } else {
                let _ = write!(out, "{}({})", frame.name, frame.type_name);
            }
        }
        if let Some(last) = self.stack.last() {
            let _ = write!(out, " {}", last.type_uuid);
        }
        out
    }

    #[inline]
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    #[inline]
    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[inline]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Forgets every issue and the node path.
    pub fn reset(&mut self) {
        self.errors = 0;
        self.warnings = 0;
        self.stack.clear();
        self.issues.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorHandler, Severity};
    use crate::{TypeUuid, Typed};

    #[test]
    fn counts_and_path() {
        let mut errors = ErrorHandler::new();
        errors.push("Scene", "Scene", TypeUuid::from_u128(1));
        errors.push("speed", "f32", f32::type_uuid());
        errors.report_warning("odd value");
        errors.pop();
        errors.report_error(format_args!("bad {}", 3));
        errors.pop();

        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.warning_count(), 1);
        assert_eq!(errors.depth(), 0);
        assert_eq!(errors.issues()[0].severity, Severity::Warning);
        assert_eq!(errors.issues()[1].message, "bad 3");

        errors.push("Scene", "Scene", TypeUuid::from_u128(1));
        errors.push("speed", "f32", f32::type_uuid());
        assert!(errors.stack_description().starts_with("Scene.speed(f32) "));

        errors.reset();
        assert!(!errors.has_errors());
        assert!(errors.issues().is_empty());
    }
}
