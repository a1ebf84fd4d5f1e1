//! Table with column setup, optional row repetition and overlay children.

use super::{Event, Node, Widget, open_loop, overlay_region, property_table, regular_children, set_size, size_arg};
use crate::binding::{Bindable, Color, Dim2, Dimension, Literal, fmt_num, parse_num};
use crate::config::Unit;
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::flags::{FlagRule, FlagSet, TableColumnFlags, TableFlags, symbol};
use crate::import::{ImportState, recognition_error, set_arg, set_flags};
use crate::iteration::IterationDescriptor;
use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const NAME: &str = "Table";

static VISIBLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(.+?)\s*\?\s*0\s*:\s*ImGuiTableColumnFlags_Disabled\s*\)").unwrap()
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SizingPolicy {
    #[default]
    Unspecified,
    Fixed,
    Stretch,
}

impl SizingPolicy {
    fn symbol(self) -> Option<String> {
        match self {
            SizingPolicy::Unspecified => None,
            SizingPolicy::Fixed => Some(symbol(TableColumnFlags::WIDTH_FIXED)),
            SizingPolicy::Stretch => Some(symbol(TableColumnFlags::WIDTH_STRETCH)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnData {
    pub label: Bindable<String>,
    pub sizing: SizingPolicy,
    pub width: f32,
    pub flags: FlagSet<TableColumnFlags>,
    pub visible: Bindable<bool>,
}

impl Default for ColumnData {
    fn default() -> Self {
        Self {
            label: Bindable::Empty,
            sizing: SizingPolicy::Unspecified,
            width: 0.0,
            flags: FlagSet::new(TableColumnFlags::empty())
                .add(TableColumnFlags::ANGLED_HEADER)
                .add(TableColumnFlags::DEFAULT_HIDE)
                .add(TableColumnFlags::DEFAULT_SORT)
                .add(TableColumnFlags::NO_CLIP)
                .add(TableColumnFlags::NO_HEADER_LABEL)
                .add(TableColumnFlags::NO_HEADER_WIDTH)
                .add(TableColumnFlags::NO_HIDE)
                .add(TableColumnFlags::NO_RESIZE)
                .add(TableColumnFlags::NO_SORT)
                .add(TableColumnFlags::NO_SORT_ASCENDING)
                .add(TableColumnFlags::NO_SORT_DESCENDING),
            visible: Bindable::Empty,
        }
    }
}

impl ColumnData {
    pub fn new(label: &str, sizing: SizingPolicy, width: f32) -> Self {
        Self {
            label: Bindable::literal(label.to_string()),
            sizing,
            width,
            ..Default::default()
        }
    }

    fn flags_arg(&self) -> String {
        let mut terms = Vec::new();
        if let Some(s) = self.sizing.symbol() {
            terms.push(s);
        }
        if !self.flags.is_empty() {
            terms.push(self.flags.to_arg());
        }
        if !self.visible.is_empty() {
            terms.push(format!(
                "({} ? 0 : {})",
                self.visible.to_arg(Unit::Px),
                symbol(TableColumnFlags::DISABLED)
            ));
        }
        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" | ")
        }
    }

    /// Reads the column flags argument, returning terms it could not place.
    fn set_flags_arg(&mut self, arg: &str) -> Vec<String> {
        let mut problems = Vec::new();
        let mut rest = arg.to_string();
        if let Some(caps) = VISIBLE_RE.captures(arg) {
            if !self.visible.set_from_arg(&caps[1]) {
                problems.push(caps[1].to_string());
            }
            rest = rest.replace(&caps[0], "");
        }
        let fixed = symbol(TableColumnFlags::WIDTH_FIXED);
        let stretch = symbol(TableColumnFlags::WIDTH_STRETCH);
        let mut others = Vec::new();
        for term in rest.split('|').map(str::trim).filter(|t| !t.is_empty()) {
            if term == fixed {
                self.sizing = SizingPolicy::Fixed;
            } else if term == stretch {
                self.sizing = SizingPolicy::Stretch;
            } else {
                others.push(term);
            }
        }
        let joined = others.join(" | ");
        problems.extend(self.flags.unknown_terms(&joined));
        self.flags.set_from_arg(&joined);
        problems
    }

    fn width_arg(&self, ex: &Exporter<'_>) -> String {
        match self.sizing {
            SizingPolicy::Fixed => Dimension(self.width).literal_arg(ex.unit()),
            _ => fmt_num(self.width),
        }
    }

    fn set_width_arg(&mut self, arg: &str) -> bool {
        let width = match self.sizing {
            SizingPolicy::Fixed => Dimension::parse_literal(arg).map(|d| d.0),
            _ => parse_num(arg),
        };
        match width {
            Some(w) => {
                self.width = w;
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub flags: FlagSet<TableFlags>,
    pub columns: Vec<ColumnData>,
    pub header: bool,
    pub item_count: IterationDescriptor,
    pub row_filter: Bindable<bool>,
    pub row_height: Bindable<Dimension>,
    pub scroll_freeze_x: i32,
    pub scroll_freeze_y: i32,
    pub scroll_when_dragging: bool,
    pub size_x: Bindable<Dimension>,
    pub size_y: Bindable<Dimension>,
    pub cell_padding: Bindable<Dim2>,
    pub header_bg: Bindable<Color>,
    pub row_bg: Bindable<Color>,
    pub row_bg_alt: Bindable<Color>,
    pub child_bg: Bindable<Color>,
    pub header_font: Bindable<String>,
    pub header_font_size: Bindable<f32>,
    pub on_setup: Event,
    pub on_begin_row: Event,
    pub on_end_row: Event,
}

impl Default for Table {
    fn default() -> Self {
        let sizing = TableFlags::SIZING_FIXED_FIT
            | TableFlags::SIZING_FIXED_SAME
            | TableFlags::SIZING_STRETCH_SAME;
        Self {
            flags: FlagSet::new(
                TableFlags::ROW_BG
                    | TableFlags::BORDERS_INNER_H
                    | TableFlags::BORDERS_INNER_V
                    | TableFlags::BORDERS_OUTER_H
                    | TableFlags::BORDERS_OUTER_V,
            )
            .add(TableFlags::RESIZABLE)
            .add(TableFlags::REORDERABLE)
            .add(TableFlags::HIDEABLE)
            .add(TableFlags::SORTABLE)
            .add(TableFlags::CONTEXT_MENU_IN_BODY)
            .separator()
            .add(TableFlags::ROW_BG)
            .add(TableFlags::BORDERS_INNER_H)
            .add(TableFlags::BORDERS_INNER_V)
            .add(TableFlags::BORDERS_OUTER_H)
            .add(TableFlags::BORDERS_OUTER_V)
            .separator()
            .add(TableFlags::SIZING_FIXED_FIT)
            .add(TableFlags::SIZING_FIXED_SAME)
            .add(TableFlags::SIZING_STRETCH_SAME)
            .separator()
            .add(TableFlags::PAD_OUTER_X)
            .add(TableFlags::NO_PAD_OUTER_X)
            .add(TableFlags::NO_PAD_INNER_X)
            .add(TableFlags::SCROLL_X)
            .add(TableFlags::SCROLL_Y)
            .add(TableFlags::HIGHLIGHT_HOVERED_COLUMN)
            .rule(FlagRule::Exclusive(sizing))
            .rule(FlagRule::Exclusive(TableFlags::PAD_OUTER_X | TableFlags::NO_PAD_OUTER_X)),
            columns: ["A", "B", "C"]
                .into_iter()
                .map(|l| ColumnData::new(l, SizingPolicy::Unspecified, 0.0))
                .collect(),
            header: true,
            item_count: IterationDescriptor::default(),
            row_filter: Bindable::Empty,
            row_height: Bindable::Empty,
            scroll_freeze_x: 0,
            scroll_freeze_y: 0,
            scroll_when_dragging: false,
            size_x: Bindable::literal(Dimension(-1.0)),
            size_y: Bindable::literal(Dimension(0.0)),
            cell_padding: Bindable::Empty,
            header_bg: Bindable::Empty,
            row_bg: Bindable::Empty,
            row_bg_alt: Bindable::Empty,
            child_bg: Bindable::Empty,
            header_font: Bindable::Empty,
            header_font_size: Bindable::Empty,
            on_setup: Event::default(),
            on_begin_row: Event::default(),
            on_end_row: Event::default(),
        }
    }
}

impl Table {
    fn export_columns(&self, ex: &mut Exporter<'_>) {
        let mut no_policy = 0;
        for cd in &self.columns {
            if cd.sizing == SizingPolicy::Unspecified {
                no_policy += 1;
            }
            let line = format!(
                "ImGui::TableSetupColumn({}, {}, {});",
                cd.label.to_arg(ex.unit()),
                cd.flags_arg(),
                cd.width_arg(ex)
            );
            ex.out.line(line);
        }
        if no_policy != 0 && no_policy != self.columns.len() {
            ex.error(NAME, "either specify sizingPolicy for all columns or none");
        }
    }

    fn export_header(&self, ex: &mut Exporter<'_>) {
        let mut font = StyleStack::new();
        if !self.header_font.is_empty() || !self.header_font_size.is_empty() {
            let name = match &self.header_font {
                Bindable::Empty => "nullptr".to_string(),
                f => f.to_arg(ex.unit()),
            };
            let size = match &self.header_font_size {
                Bindable::Empty => "0".to_string(),
                s => s.to_arg(ex.unit()),
            };
            font.push_font(&mut ex.out, &name, &size);
        }
        ex.out.line("ImGui::TableHeadersRow();");
        font.pop_all(&mut ex.out);
    }

    fn import_column(&mut self, stmt: &Stmt, session: &mut Session) {
        let mut cd = ColumnData::default();
        set_arg(&mut cd.label, stmt.param(0), session, NAME, stmt);
        if let Some(arg) = stmt.param(1) {
            for term in cd.set_flags_arg(arg) {
                recognition_error(session, NAME, stmt, &format!("unrecognized column flag {}", term));
            }
        }
        if let Some(arg) = stmt.param(2) {
            if !cd.set_width_arg(arg) {
                recognition_error(session, NAME, stmt, "malformed column width");
            }
        }
        self.columns.push(cd);
    }
}

impl Node for Table {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        let id = ex.next_id();
        let mut style = StyleStack::new();
        if !self.cell_padding.is_empty() {
            style.push_var(&mut ex.out, "ImGuiStyleVar_CellPadding", &self.cell_padding.to_arg(unit));
        }
        for (col, value) in [
            ("ImGuiCol_TableHeaderBg", &self.header_bg),
            ("ImGuiCol_TableRowBg", &self.row_bg),
            ("ImGuiCol_TableRowBgAlt", &self.row_bg_alt),
            ("ImGuiCol_ChildBg", &self.child_bg),
        ] {
            if !value.is_empty() {
                style.push_color(&mut ex.out, col, &value.to_arg(unit));
            }
        }
        if self.scroll_when_dragging {
            style.push_custom(
                &mut ex.out,
                "ImRad::PushInvisibleScrollbar();",
                "ImRad::PopInvisibleScrollbar();",
            );
        }

        ex.out.open_block(format!(
            "if (ImGui::BeginTable(\"table{}\", {}, {}, {}))",
            id,
            self.columns.len(),
            self.flags.to_arg(),
            size_arg(&self.size_x, &self.size_y, unit)
        ));
        if self.scroll_when_dragging {
            ex.out.line("ImRad::ScrollWhenDragging(true);");
        }
        self.export_columns(ex);
        ex.out.line(format!(
            "ImGui::TableSetupScrollFreeze({}, {});",
            self.scroll_freeze_x, self.scroll_freeze_y
        ));
        if let Some(call) = self.on_setup.call() {
            ex.out.line(call);
        }
        if self.header {
            self.export_header(ex);
        }

        let rows = !self.item_count.is_empty();
        if rows {
            ex.out.blank();
            let idx = open_loop(ex, &self.item_count);
            if !self.row_filter.is_empty() {
                ex.out.line(format!("if (!({}))", self.row_filter.to_arg(unit)));
                ex.out.body_line("continue;");
            }
            ex.out.line(format!("ImGui::PushID({});", idx));
        }
        let height = match &self.row_height {
            Bindable::Empty => "0".to_string(),
            h => h.to_arg(unit),
        };
        ex.out.line(format!("ImGui::TableNextRow(0, {});", height));
        ex.out.line("ImGui::TableSetColumnIndex(0);");
        if let Some(call) = self.on_begin_row.call().filter(|_| rows) {
            ex.out.line(call);
        }

        ex.child_region(&w.kind, regular_children(&w.children));

        if let Some(call) = self.on_end_row.call().filter(|_| rows) {
            ex.out.line(call);
        }
        if rows {
            ex.out.line("ImGui::PopID();");
            ex.out.close_block();
        }

        overlay_region(ex, &w.kind, &w.children, id, true);

        ex.out.line("ImGui::EndTable();");
        ex.out.close_block();
        style.pop_all(&mut ex.out);
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        let rows = !self.item_count.is_empty();
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::PushStyleVar")
                if st.before_block(stmt) && stmt.param(0) == Some("ImGuiStyleVar_CellPadding") =>
            {
                set_arg(&mut self.cell_padding, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushStyleColor") if st.before_block(stmt) => {
                let target = match stmt.param(0) {
                    Some("ImGuiCol_TableHeaderBg") => &mut self.header_bg,
                    Some("ImGuiCol_TableRowBg") => &mut self.row_bg,
                    Some("ImGuiCol_TableRowBgAlt") => &mut self.row_bg_alt,
                    Some("ImGuiCol_ChildBg") => &mut self.child_bg,
                    _ => return false,
                };
                set_arg(target, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImRad::PushInvisibleScrollbar") if st.before_block(stmt) => {
                self.scroll_when_dragging = true;
            }
            (StmtKind::Call, "ImRad::ScrollWhenDragging") if st.in_setup(stmt, 1) => {
                self.scroll_when_dragging = true;
            }
            (StmtKind::IfCall, "ImGui::BeginTable") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                self.header = false;
                self.columns.clear();
                set_flags(&mut self.flags, stmt.param(2), session, NAME, stmt);
                if let Some(arg) = stmt.param(3) {
                    if !set_size(&mut self.size_x, &mut self.size_y, arg) {
                        recognition_error(session, NAME, stmt, "malformed size");
                    }
                }
            }
            (StmtKind::Call, "ImGui::TableSetupColumn") if st.in_setup(stmt, 1) => {
                self.import_column(stmt, session)
            }
            (StmtKind::Call, "ImGui::TableSetupScrollFreeze") if st.in_setup(stmt, 1) => {
                set_arg(&mut self.scroll_freeze_x, stmt.param(0), session, NAME, stmt);
                set_arg(&mut self.scroll_freeze_y, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushFont") if st.in_setup(stmt, 1) => {
                match stmt.param(0) {
                    Some("nullptr" | "0") | None => self.header_font = Bindable::Empty,
                    font => set_arg(&mut self.header_font, font, session, NAME, stmt),
                }
                match stmt.param(1) {
                    Some("0") | None => self.header_font_size = Bindable::Empty,
                    size => set_arg(&mut self.header_font_size, size, session, NAME, stmt),
                }
            }
            (StmtKind::Call, "ImGui::TableHeadersRow") if st.in_setup(stmt, 1) => self.header = true,
            (StmtKind::Call, "ImGui::TableNextRow")
                if st.in_setup(stmt, if rows { 2 } else { 1 }) =>
            {
                match stmt.param(1) {
                    Some("0") | None => self.row_height = Bindable::Empty,
                    h => set_arg(&mut self.row_height, h, session, NAME, stmt),
                }
            }
            (StmtKind::ForBlock, _) if st.in_setup(stmt, 1) => {
                if !self.item_count.set_from_arg(&stmt.line) {
                    recognition_error(session, NAME, stmt, "unsupported loop header");
                }
            }
            (StmtKind::IfBlock, _) if rows && st.in_setup(stmt, 2) => {
                let Some(inner) = stmt.cond.strip_prefix("!(").and_then(|c| c.strip_suffix(')'))
                else {
                    return false;
                };
                set_arg(&mut self.row_filter, Some(inner), session, NAME, stmt);
            }
            (StmtKind::Call, callee) if stmt.is_user_call() && st.in_setup(stmt, 1) => {
                self.on_setup = Event::new(callee);
            }
            // Row hooks live in the row loop, around its child region
            (StmtKind::Call, callee)
                if stmt.is_user_call() && rows && st.in_setup(stmt, 2) =>
            {
                self.on_begin_row = Event::new(callee);
            }
            (StmtKind::Call, callee)
                if stmt.is_user_call() && rows && st.markers >= 2 && st.depth(stmt) == Some(2) =>
            {
                self.on_end_row = Event::new(callee);
            }
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.headerBg" => header_bg,
        "appearance.rowBg" => row_bg,
        "appearance.rowBgAlt" => row_bg_alt,
        "appearance.childBg" => child_bg,
        "appearance.cellPadding" => cell_padding,
        "appearance.header" => header,
        "appearance.headerFont" => header_font,
        "appearance.headerFontSize" => header_font_size,
        "behavior.flags" => flags,
        "behavior.rowCount" => item_count.limit,
        "behavior.rowFilter" => row_filter,
        "behavior.rowHeight" => row_height,
        "behavior.scrollFreezeX" => scroll_freeze_x,
        "behavior.scrollFreezeY" => scroll_freeze_y,
        "behavior.scrollWhenDragging" => scroll_when_dragging,
        "layout.size_x" => size_x,
        "layout.size_y" => size_y,
    });

    property_table!(events, events_mut {
        "table.setup" => on_setup,
        "table.beginRow" => on_begin_row,
        "table.endRow" => on_end_row,
    });

    fn size(&self) -> Option<(&Bindable<Dimension>, &Bindable<Dimension>)> {
        Some((&self.size_x, &self.size_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_source;
    use crate::import::import_source;
    use crate::widget::WidgetKind;

    fn table(t: Table) -> Widget {
        Widget::from_kind(WidgetKind::Table(t))
    }

    #[test]
    fn test_column_flags_arg() {
        let mut cd = ColumnData::new("Name", SizingPolicy::Fixed, 40.0);
        cd.flags.set(TableColumnFlags::NO_SORT, true).unwrap();
        cd.visible = Bindable::field("show");
        assert_eq!(
            cd.flags_arg(),
            "ImGuiTableColumnFlags_WidthFixed | ImGuiTableColumnFlags_NoSort | (show ? 0 : ImGuiTableColumnFlags_Disabled)"
        );

        let mut back = ColumnData::default();
        assert!(back.set_flags_arg(&cd.flags_arg()).is_empty());
        assert_eq!(back.sizing, SizingPolicy::Fixed);
        assert_eq!(back.flags, cd.flags);
        assert_eq!(back.visible, cd.visible);
    }

    #[test]
    fn test_column_unknown_flag() {
        let mut cd = ColumnData::default();
        let problems = cd.set_flags_arg("ImGuiTableColumnFlags_NoClip | ImGuiTableColumnFlags_Bogus");
        assert_eq!(problems, vec!["ImGuiTableColumnFlags_Bogus"]);
        assert!(cd.flags.contains(TableColumnFlags::NO_CLIP));
    }

    #[test]
    fn test_fixed_width_uses_unit() {
        let mut t = Table::default();
        t.columns = vec![ColumnData::new("A", SizingPolicy::Fixed, 50.0)];
        let mut s = Session::default();
        s.settings.unit = Unit::Dp;
        let src = export_source(&[table(t.clone())], &mut s);
        assert!(src.contains("ImGui::TableSetupColumn(\"A\", ImGuiTableColumnFlags_WidthFixed, 50*dp);"));
        assert!(src.contains("{ -1, 0 }"));

        let out = import_source(&src, &mut s).unwrap();
        let WidgetKind::Table(back) = &out.widgets[0].kind else {
            panic!("expected a table");
        };
        assert_eq!(back.columns, t.columns);
    }

    #[test]
    fn test_row_hooks_and_setup() {
        let mut t = Table::default();
        t.item_count.limit = Bindable::literal(5);
        t.on_setup = Event::new("OnSetup");
        t.on_begin_row = Event::new("OnBeginRow");
        t.on_end_row = Event::new("OnEndRow");
        let w = table(t);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("for (int i = 0; i < 5; ++i)"));
        assert!(!src.contains("auto& item"));

        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_end_row_alone_is_not_begin_row() {
        let mut t = Table::default();
        t.item_count.limit = Bindable::field("rowCount");
        t.on_end_row = Event::new("OnEndRow");
        let w = table(t);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        let out = import_source(&src, &mut Session::default()).unwrap();
        let WidgetKind::Table(back) = &out.widgets[0].kind else {
            panic!("expected a table");
        };
        assert!(back.on_begin_row.is_empty());
        assert_eq!(back.on_end_row.name(), Some("OnEndRow"));
    }

    #[test]
    fn test_hooks_ignored_without_rows() {
        let mut t = Table::default();
        t.on_begin_row = Event::new("OnBeginRow");
        let src = export_source(&[table(t)], &mut Session::default());
        assert!(!src.contains("OnBeginRow"));
    }

    /// Exported table with `code` written by hand at the top of its child region.
    fn with_user_code(t: Table, code: &str) -> String {
        let mut w = table(t);
        w.children.push(Widget::from_kind(WidgetKind::named("Text").unwrap()));
        let src = export_source(&[w], &mut Session::default());
        src.replacen("/// @separator\n", &format!("/// @separator\n{}", code), 1)
    }

    fn import_table(src: &str, s: &mut Session) -> Table {
        let out = import_source(src, s).unwrap();
        let WidgetKind::Table(t) = &out.widgets[0].kind else {
            panic!("expected a table");
        };
        assert_eq!(out.widgets[0].children.len(), 1);
        t.clone()
    }

    #[test]
    fn test_user_code_in_region_is_not_a_property() {
        let code = "for (int k = 0; k < n; ++k)\n{\n    Bar(k);\n}\nImGui::PushStyleColor(ImGuiCol_TableRowBg, 0xff000000);\nImGui::PopStyleColor();\nImGui::TableHeadersRow();\n";
        let mut t = Table::default();
        t.header = false;
        let src = with_user_code(t, code);
        let mut s = Session::default();
        let back = import_table(&src, &mut s);
        assert!(s.diagnostics().is_empty());
        assert!(back.item_count.is_empty());
        assert!(back.row_bg.is_empty());
        assert!(!back.header);
        assert!(back.on_setup.is_empty());
    }

    #[test]
    fn test_hook_calls_need_row_loop_on_import() {
        let src = with_user_code(Table::default(), "if (x)\n{\n    Foo();\n}\nBaz();\n");
        let back = import_table(&src, &mut Session::default());
        assert!(back.on_begin_row.is_empty());
        assert!(back.on_end_row.is_empty());
        assert!(back.on_setup.is_empty());

        // Inside the row loop, between the markers, calls stay user code too
        let mut t = Table::default();
        t.item_count.limit = Bindable::literal(3);
        let src = with_user_code(t, "Baz();\n");
        let back = import_table(&src, &mut Session::default());
        assert!(back.on_begin_row.is_empty());
        assert!(back.on_end_row.is_empty());
    }

    #[test]
    fn test_setup_hook_without_columns() {
        let mut t = Table::default();
        t.columns.clear();
        t.on_setup = Event::new("OnSetup");
        let w = table(t);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("ImGui::BeginTable(\"table0\", 0, "));
        assert!(src.contains("OnSetup();"));
        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_styles_pop_in_reverse() {
        let mut t = Table::default();
        t.cell_padding = Bindable::literal(Dim2::new(4.0, 2.0));
        t.row_bg = Bindable::literal(Color(0xff202020));
        t.scroll_when_dragging = true;
        t.header_font_size = Bindable::literal(18.0);
        let w = table(t);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        let tail: Vec<&str> = src
            .lines()
            .skip_while(|l| !l.contains("ImGui::EndTable"))
            .skip(2)
            .take(3)
            .collect();
        assert_eq!(
            tail,
            vec!["ImRad::PopInvisibleScrollbar();", "ImGui::PopStyleColor();", "ImGui::PopStyleVar();"]
        );
        assert!(src.contains("ImGui::PushFont(nullptr, 18);"));

        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_row_height_zero_stays_empty() {
        let src = "/// @begin Table\nif (ImGui::BeginTable(\"t\", 0, ImGuiTableFlags_None, { 0, 0 }))\n{\n    ImGui::TableNextRow(0, 0);\n    ImGui::EndTable();\n}\n/// @end Table\n";
        let out = import_source(src, &mut Session::default()).unwrap();
        let WidgetKind::Table(t) = &out.widgets[0].kind else {
            panic!("expected a table");
        };
        assert!(t.row_height.is_empty());
        assert!(t.columns.is_empty());
        assert!(!t.header);
        assert!(t.flags.is_empty());
    }

    #[test]
    fn test_overlay_region_after_rows() {
        let mut w = table(Table::default());
        let mut overlay = Widget::from_kind(WidgetKind::named("Button").unwrap());
        overlay.pos = Bindable::literal(Dim2::new(0.0, 0.0));
        w.children.push(Widget::from_kind(WidgetKind::named("Text").unwrap()));
        w.children.push(overlay);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("auto cpos0 = ImRad::GetCursorData();"));
        assert!(src.contains("ImGui::GetCurrentWindow()->SkipItems = false;"));
        assert_eq!(src.matches("/// @separator").count(), 4);

        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }
}
