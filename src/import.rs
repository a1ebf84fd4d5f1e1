//! Source statements back to a widget tree.
//!
//! Each widget occupies the statements between its `@begin`/`@end` tags.
//! Nested tags recurse with a fresh [`ImportState`], so level-relative
//! bookkeeping never leaks between parent and child.

use crate::binding::Bindable;
use crate::cpp::{self, Stmt, StmtKind};
use crate::flags::{FlagFamily, FlagSet};
use crate::session::{DiagnosticKind, Session};
use crate::widget::{Widget, WidgetKind};
use anyhow::{Context, Result};

/// Single-pass cursor over the statement sequence.
pub struct StmtStream<I: Iterator<Item = Stmt>> {
    inner: I,
    consumed: usize,
}

impl<I: Iterator<Item = Stmt>> StmtStream<I> {
    pub fn new(inner: I) -> Self {
        Self { inner, consumed: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<I: Iterator<Item = Stmt>> Iterator for StmtStream<I> {
    type Item = Stmt;

    fn next(&mut self) -> Option<Stmt> {
        let s = self.inner.next()?;
        self.consumed += 1;
        Some(s)
    }
}

/// Values a child recognizes on behalf of its parent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParentHints {
    pub active_tab: Option<Bindable<i32>>,
    pub regular_width: bool,
    /// Owning window needs its menu bar flag
    pub window_menu_bar: bool,
}

/// Recognizer state of the widget being imported.
#[derive(Debug, Default)]
pub struct ImportState {
    /// Level of the widget's `@begin` tag
    pub base_level: usize,
    /// Level of the statement that opened the widget's main block
    pub import_level: Option<usize>,
    /// Separator markers seen so far
    pub markers: usize,
    /// Level of a pending `if (...)` whose body is an event call
    pub guard_level: Option<usize>,
    pub hints: ParentHints,
}

impl ImportState {
    fn new(base_level: usize) -> Self {
        Self {
            base_level,
            ..Default::default()
        }
    }

    /// Depth of `stmt` below the opening block, if one was seen.
    pub fn depth(&self, stmt: &Stmt) -> Option<usize> {
        stmt.level.checked_sub(self.import_level?)
    }

    /// `stmt` sits next to the widget's tag, before its opening block.
    pub fn before_block(&self, stmt: &Stmt) -> bool {
        self.import_level.is_none() && stmt.level == self.base_level
    }

    /// `stmt` is `depth` levels into the opening block and precedes the
    /// first child region.
    pub fn in_setup(&self, stmt: &Stmt, depth: usize) -> bool {
        self.markers == 0 && self.depth(stmt) == Some(depth)
    }
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub widgets: Vec<Widget>,
    /// A menu bar was found, the enclosing window must enable it
    pub window_menu_bar: bool,
}

/// Tokenizes `src` and rebuilds every tagged top-level widget.
pub fn import_source(src: &str, session: &mut Session) -> Result<ImportOutcome> {
    let stmts = cpp::parse_stmts(src).context("failed to tokenize source")?;
    let mut stream = StmtStream::new(stmts.into_iter());
    let mut outcome = ImportOutcome::default();

    while let Some(stmt) = stream.next() {
        match stmt.tag("begin") {
            Some(name) => {
                let name = name.to_string();
                if let Some((w, hints)) = import_widget(&name, &stmt, &mut stream, session) {
                    outcome.window_menu_bar |= hints.window_menu_bar;
                    outcome.widgets.push(w);
                }
            }
            None => log::debug!("line {}: outside any widget: {}", stmt.line_no, stmt.line),
        }
    }
    log::debug!(
        "imported {} widgets from {} statements",
        outcome.widgets.len(),
        stream.consumed()
    );
    Ok(outcome)
}

fn import_widget<I: Iterator<Item = Stmt>>(
    name: &str,
    begin: &Stmt,
    stream: &mut StmtStream<I>,
    session: &mut Session,
) -> Option<(Widget, ParentHints)> {
    let Some(kind) = WidgetKind::named(name) else {
        session.push_diagnostic(
            DiagnosticKind::Recognition,
            "Widget",
            format!("line {}: unknown widget type \"{}\"", begin.line_no, name),
        );
        skip_tagged(stream);
        return None;
    };
    log::trace!("line {}: importing {}", begin.line_no, name);

    let mut w = Widget::from_kind(kind);
    let type_name = w.type_name();
    let mut st = ImportState::new(begin.level);
    let marker = session.settings.separator_marker.trim().to_string();

    loop {
        let Some(stmt) = stream.next() else {
            session.push_diagnostic(
                DiagnosticKind::Structure,
                type_name,
                format!("missing \"@end {}\"", name),
            );
            break;
        };

        if let Some(end) = stmt.tag("end") {
            if end != name {
                session.push_diagnostic(
                    DiagnosticKind::Structure,
                    type_name,
                    format!("line {}: expected \"@end {}\", found \"@end {}\"", stmt.line_no, name, end),
                );
            }
            break;
        }
        if let Some(child) = stmt.tag("begin") {
            let child = child.to_string();
            if let Some((c, hints)) = import_widget(&child, &stmt, stream, session) {
                w.kind.as_node_mut().adopt(&hints);
                st.hints.window_menu_bar |= hints.window_menu_bar;
                w.children.push(c);
            }
            continue;
        }
        if stmt.kind == StmtKind::Comment {
            if stmt.line.trim() == marker {
                st.markers += 1;
            }
            continue;
        }

        if stmt.level == st.base_level && import_shared(&mut w, &stmt, session) {
            continue;
        }
        if !w.kind.as_node_mut().import(&stmt, &mut st, session) {
            log::debug!("{} line {}: not recognized: {}", type_name, stmt.line_no, stmt.line);
        }
    }
    Some((w, st.hints))
}

/// Skips to the `@end` closing an unknown widget.
fn skip_tagged<I: Iterator<Item = Stmt>>(stream: &mut StmtStream<I>) {
    let mut depth = 0usize;
    for stmt in stream.by_ref() {
        if stmt.tag("begin").is_some() {
            depth += 1;
        } else if stmt.tag("end").is_some() {
            if depth == 0 {
                return;
            }
            depth -= 1;
        }
    }
}

/// Statements every widget kind may carry around its own block.
fn import_shared(w: &mut Widget, stmt: &Stmt, session: &mut Session) -> bool {
    let type_name = w.type_name();
    let accepted = if stmt.is_call("ImGui::SameLine") {
        w.same_line = true;
        true
    } else if stmt.is_call("ImGui::SetCursorPos") {
        w.pos.set_from_arg(stmt.param(0).unwrap_or_default())
    } else if stmt.is_call("ImGui::BeginDisabled") {
        w.disabled.set_from_arg(stmt.param(0).unwrap_or("true"))
    } else if stmt.is_call("ImGui::EndDisabled") {
        true
    } else if stmt.kind == StmtKind::IfCallThenCall
        && stmt.callee == "ImGui::IsItemHovered"
        && stmt.callee2 == "ImGui::SetTooltip"
    {
        match stmt.params2.get(1) {
            Some(arg) => w.tooltip.set_from_arg(arg),
            None => w.tooltip.set_from_arg(stmt.params2.first().map_or("", String::as_str)),
        }
    } else {
        return false;
    };
    if !accepted {
        session.push_diagnostic(
            DiagnosticKind::Recognition,
            type_name,
            format!("line {}: malformed value in \"{}\"", stmt.line_no, stmt.line),
        );
    }
    true
}

/// Reports a recognized statement whose value was rejected.
pub(crate) fn recognition_error(
    session: &mut Session,
    widget: &'static str,
    stmt: &Stmt,
    what: &str,
) {
    session.push_diagnostic(
        DiagnosticKind::Recognition,
        widget,
        format!("line {}: {} in \"{}\"", stmt.line_no, what, stmt.line),
    );
}

/// Sets a property from an argument and reports rejection.
pub(crate) fn set_arg(
    value: &mut dyn crate::binding::PropertyValue,
    arg: Option<&str>,
    session: &mut Session,
    widget: &'static str,
    stmt: &Stmt,
) {
    if let Some(arg) = arg {
        if !value.set_from_arg(arg) {
            recognition_error(session, widget, stmt, "malformed value");
        }
    }
}

/// Reads a flag expression; unknown terms and illegal combinations are
/// reported, recognized terms are kept.
pub(crate) fn set_flags<F: FlagFamily>(
    flags: &mut FlagSet<F>,
    arg: Option<&str>,
    session: &mut Session,
    widget: &'static str,
    stmt: &Stmt,
) {
    let Some(arg) = arg else { return };
    if !flags.set_from_arg(arg) {
        for term in flags.unknown_terms(arg) {
            recognition_error(session, widget, stmt, &format!("unrecognized flag {}", term));
        }
    }
    if let Err(e) = flags.validate() {
        recognition_error(session, widget, stmt, &e.to_string());
    }
}
