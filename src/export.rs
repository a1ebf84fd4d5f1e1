//! Widget tree to source statements.

use crate::config::{CodeGenSettings, Unit};
use crate::session::Session;
use crate::widget::{Widget, WidgetKind};

/// Append-only text sink with the current indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
    indent: usize,
}

impl CodeWriter {
    pub fn new(indent: usize) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            indent,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.buf.extend(std::iter::repeat_n(' ', self.depth * self.indent));
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Writes `header` followed by an opening brace on its own line.
    pub fn open_block(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.line("{");
        self.indent();
    }

    pub fn close_block(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// One statement as the unbraced body of the preceding header.
    pub fn body_line(&mut self, text: impl AsRef<str>) {
        self.indent();
        self.line(text);
        self.dedent();
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pushed {
    Var,
    Color,
    Font,
    Custom(&'static str),
}

/// Records which optional pushes were emitted so the pops come out in
/// reverse order.
#[derive(Debug, Default)]
pub struct StyleStack {
    pushed: Vec<Pushed>,
}

impl StyleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_var(&mut self, out: &mut CodeWriter, var: &str, arg: &str) {
        out.line(format!("ImGui::PushStyleVar({}, {});", var, arg));
        self.pushed.push(Pushed::Var);
    }

    pub fn push_color(&mut self, out: &mut CodeWriter, col: &str, arg: &str) {
        out.line(format!("ImGui::PushStyleColor({}, {});", col, arg));
        self.pushed.push(Pushed::Color);
    }

    pub fn push_font(&mut self, out: &mut CodeWriter, font: &str, size: &str) {
        out.line(format!("ImGui::PushFont({}, {});", font, size));
        self.pushed.push(Pushed::Font);
    }

    /// A paired statement, e.g. `ImRad::PushInvisibleScrollbar();` with `pop`.
    pub fn push_custom(&mut self, out: &mut CodeWriter, push: &str, pop: &'static str) {
        out.line(push);
        self.pushed.push(Pushed::Custom(pop));
    }

    pub fn pop_all(&mut self, out: &mut CodeWriter) {
        while let Some(p) = self.pushed.pop() {
            match p {
                Pushed::Var => out.line("ImGui::PopStyleVar();"),
                Pushed::Color => out.line("ImGui::PopStyleColor();"),
                Pushed::Font => out.line("ImGui::PopFont();"),
                Pushed::Custom(pop) => out.line(pop),
            }
        }
    }
}

/// Where a widget sits in its parent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportParent<'a> {
    pub kind: Option<&'a WidgetKind>,
    /// Position among the parent's children
    pub index: usize,
}

pub struct Exporter<'s> {
    pub out: CodeWriter,
    pub session: &'s mut Session,
}

impl<'s> Exporter<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            out: CodeWriter::new(session.settings.indent),
            session,
        }
    }

    pub fn unit(&self) -> Unit {
        self.session.settings.unit
    }

    pub fn settings(&self) -> &CodeGenSettings {
        &self.session.settings
    }

    pub fn next_id(&mut self) -> usize {
        self.session.next_var_id()
    }

    pub fn error(&mut self, widget: &'static str, message: impl Into<String>) {
        self.session.push_error(widget, message);
    }

    /// Writes the marker bracketing a child region.
    pub fn separator(&mut self) {
        let marker = self.session.settings.separator_marker.clone();
        self.out.line(marker);
    }

    /// Exports `children` between a pair of separator markers.
    pub fn child_region<'w>(
        &mut self,
        parent: &'w WidgetKind,
        children: impl IntoIterator<Item = (usize, &'w Widget)>,
    ) {
        self.separator();
        self.out.blank();
        for (index, child) in children {
            let ctx = ExportParent {
                kind: Some(parent),
                index,
            };
            self.widget(child, ctx);
        }
        self.separator();
    }

    /// One widget with its shared wrapping: type tags, same-line, overlay
    /// position, disabled scope and tooltip.
    pub fn widget(&mut self, w: &Widget, parent: ExportParent<'_>) {
        let name = w.type_name();
        let unit = self.unit();
        self.out.line(format!("/// @begin {}", name));
        if w.same_line {
            self.out.line("ImGui::SameLine();");
        }
        if !w.pos.is_empty() {
            self.out.line(format!("ImGui::SetCursorPos({});", w.pos.to_arg(unit)));
        }
        if !w.disabled.is_empty() {
            self.out.line(format!("ImGui::BeginDisabled({});", w.disabled.to_arg(unit)));
        }

        w.kind.as_node().export(w, parent, self);

        if !w.tooltip.is_empty() {
            self.out.line("if (ImGui::IsItemHovered())");
            self.out
                .body_line(format!("ImGui::SetTooltip(\"%s\", {});", w.tooltip.to_arg(unit)));
        }
        if !w.disabled.is_empty() {
            self.out.line("ImGui::EndDisabled();");
        }
        self.out.line(format!("/// @end {}", name));
        self.out.blank();
    }

    pub fn finish(self) -> String {
        self.out.finish()
    }
}

/// Exports top-level widgets in order.
pub fn export_source(widgets: &[Widget], session: &mut Session) -> String {
    let mut ex = Exporter::new(session);
    for (index, w) in widgets.iter().enumerate() {
        ex.widget(w, ExportParent { kind: None, index });
    }
    ex.finish()
}
