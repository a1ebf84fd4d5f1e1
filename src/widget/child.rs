use super::{Node, Widget, open_loop, overlay_region, property_table, regular_children, set_size, size_arg};
use crate::binding::{Bindable, Color, Dim2, Dimension, PropertyValue};
use crate::config::Unit;
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::flags::{ChildFlags, FlagRule, FlagSet, WindowFlags};
use crate::import::{ImportState, recognition_error, set_arg, set_flags};
use crate::iteration::IterationDescriptor;
use crate::session::Session;
use serde::Serialize;

const NAME: &str = "Child";

/// Legacy column count; clearing it falls back to a single column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnCount(pub Bindable<i32>);

impl Default for ColumnCount {
    fn default() -> Self {
        ColumnCount(Bindable::literal(1))
    }
}

impl ColumnCount {
    /// A literal count of 2 or more, or any bound count.
    fn is_split(&self) -> bool {
        match &self.0 {
            Bindable::Empty => false,
            Bindable::Literal(n) => *n >= 2,
            _ => true,
        }
    }
}

impl PropertyValue for ColumnCount {
    fn to_arg(&self, unit: Unit) -> String {
        self.0.to_arg(unit)
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        if arg.trim().is_empty() {
            *self = ColumnCount::default();
            return true;
        }
        self.0.set_from_arg(arg)
    }
}

/// Scrollable sub-region, optionally split into legacy columns and
/// repeated per item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Child {
    pub flags: FlagSet<ChildFlags>,
    pub wflags: FlagSet<WindowFlags>,
    pub bg: Bindable<Color>,
    pub padding: Bindable<Dim2>,
    pub spacing: Bindable<Dim2>,
    pub rounding: Bindable<Dimension>,
    pub border_size: Bindable<f32>,
    /// When false the child ignores the parent's window padding
    pub outer_padding: bool,
    pub column_count: ColumnCount,
    pub column_border: bool,
    pub item_count: IterationDescriptor,
    pub scroll_when_dragging: bool,
    pub size_x: Bindable<Dimension>,
    pub size_y: Bindable<Dimension>,
}

impl Default for Child {
    fn default() -> Self {
        Self {
            flags: FlagSet::new(ChildFlags::BORDERS)
                .add(ChildFlags::BORDERS)
                .add(ChildFlags::ALWAYS_USE_WINDOW_PADDING)
                .add(ChildFlags::ALWAYS_AUTO_RESIZE)
                .add(ChildFlags::AUTO_RESIZE_X)
                .add(ChildFlags::AUTO_RESIZE_Y)
                .add(ChildFlags::FRAME_STYLE)
                .add(ChildFlags::NAV_FLATTENED)
                .separator()
                .add(ChildFlags::RESIZE_X)
                .add(ChildFlags::RESIZE_Y)
                .rule(FlagRule::Requires {
                    flag: ChildFlags::ALWAYS_AUTO_RESIZE,
                    any_of: ChildFlags::AUTO_RESIZE_X | ChildFlags::AUTO_RESIZE_Y,
                })
                .rule(FlagRule::Exclusive(ChildFlags::RESIZE_X | ChildFlags::AUTO_RESIZE_X))
                .rule(FlagRule::Exclusive(ChildFlags::RESIZE_Y | ChildFlags::AUTO_RESIZE_Y)),
            wflags: FlagSet::new(WindowFlags::empty())
                .add(WindowFlags::ALWAYS_HORIZONTAL_SCROLLBAR)
                .add(WindowFlags::ALWAYS_VERTICAL_SCROLLBAR)
                .add(WindowFlags::NO_BACKGROUND)
                .add(WindowFlags::NO_NAV_FOCUS)
                .add(WindowFlags::NO_NAV_INPUTS)
                .add(WindowFlags::NO_SAVED_SETTINGS)
                .add(WindowFlags::NO_SCROLLBAR),
            bg: Bindable::Empty,
            padding: Bindable::Empty,
            spacing: Bindable::Empty,
            rounding: Bindable::Empty,
            border_size: Bindable::Empty,
            outer_padding: true,
            column_count: ColumnCount::default(),
            column_border: true,
            item_count: IterationDescriptor::default(),
            scroll_when_dragging: false,
            size_x: Bindable::literal(Dimension(20.0)),
            size_y: Bindable::literal(Dimension(20.0)),
        }
    }
}

impl Node for Child {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        let id = ex.next_id();
        let mut size = size_arg(&self.size_x, &self.size_y, unit);
        if !self.outer_padding {
            ex.out.line(format!("ImVec2 _sz{}{};", id, size));
            ex.out.line(format!("ImRad::IgnoreWindowPaddingData _data{};", id));
            ex.out
                .line(format!("ImRad::PushIgnoreWindowPadding(&_sz{0}, &_data{0});", id));
            size = format!("_sz{}", id);
        }

        let mut style = StyleStack::new();
        let vars: [(&str, &dyn PropertyValue); 3] = [
            ("ImGuiStyleVar_WindowPadding", &self.padding),
            ("ImGuiStyleVar_ChildRounding", &self.rounding),
            ("ImGuiStyleVar_ChildBorderSize", &self.border_size),
        ];
        for (var, value) in vars {
            let arg = value.to_arg(unit);
            if !arg.is_empty() {
                style.push_var(&mut ex.out, var, &arg);
            }
        }
        if !self.bg.is_empty() {
            style.push_color(&mut ex.out, "ImGuiCol_ChildBg", &self.bg.to_arg(unit));
        }

        ex.out.open_block(format!(
            "ImGui::BeginChild(\"child{}\", {}, {}, {});",
            id,
            size,
            self.flags.to_arg(),
            self.wflags.to_arg()
        ));
        if self.scroll_when_dragging {
            ex.out.line("ImRad::ScrollWhenDragging(false);");
        }
        let mut inner = StyleStack::new();
        if !self.spacing.is_empty() {
            inner.push_var(&mut ex.out, "ImGuiStyleVar_ItemSpacing", &self.spacing.to_arg(unit));
        }
        let columns = self.column_count.is_split();
        if columns {
            ex.out.line(format!(
                "ImGui::Columns({}, \"\", {});",
                self.column_count.to_arg(unit),
                self.column_border
            ));
        }

        let rows = !self.item_count.is_empty();
        if rows {
            let idx = open_loop(ex, &self.item_count);
            ex.out.line(format!("ImGui::PushID({});", idx));
        }
        ex.child_region(&w.kind, regular_children(&w.children));
        if rows {
            ex.out.line("ImGui::PopID();");
            if columns {
                ex.out.line("ImGui::NextColumn();");
            }
            ex.out.close_block();
        }
        inner.pop_all(&mut ex.out);

        overlay_region(ex, &w.kind, &w.children, id, false);

        ex.out.line("ImGui::EndChild();");
        ex.out.close_block();
        style.pop_all(&mut ex.out);
        if !self.outer_padding {
            ex.out.line(format!("ImRad::PopIgnoreWindowPadding(_data{});", id));
        }
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        let before = st.before_block(stmt);
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Other, _) if before && stmt.line.starts_with("ImVec2 _sz") => {
                self.outer_padding = false;
                let parsed = stmt
                    .line
                    .find('{')
                    .is_some_and(|i| set_size(&mut self.size_x, &mut self.size_y, &stmt.line[i..]));
                if !parsed {
                    recognition_error(session, NAME, stmt, "malformed size");
                }
            }
            (StmtKind::Other, _) if before && stmt.line.starts_with("ImRad::IgnoreWindowPaddingData") => {}
            (StmtKind::Call, "ImRad::PushIgnoreWindowPadding") if before => {}
            (StmtKind::Call, "ImRad::PopIgnoreWindowPadding") if stmt.level == st.base_level => {}
            (StmtKind::Call, "ImGui::PushStyleColor")
                if before && stmt.param(0) == Some("ImGuiCol_ChildBg") =>
            {
                set_arg(&mut self.bg, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushStyleVar") if before => {
                let target: &mut dyn PropertyValue = match stmt.param(0) {
                    Some("ImGuiStyleVar_WindowPadding") => &mut self.padding,
                    Some("ImGuiStyleVar_ChildRounding") => &mut self.rounding,
                    Some("ImGuiStyleVar_ChildBorderSize") => &mut self.border_size,
                    _ => return false,
                };
                set_arg(target, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushStyleVar")
                if st.in_setup(stmt, 1) && stmt.param(0) == Some("ImGuiStyleVar_ItemSpacing") =>
            {
                set_arg(&mut self.spacing, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::BeginChild") if before => {
                st.import_level = Some(stmt.level);
                // `_szN` carries the size when outer padding is off
                if let Some(arg) = stmt.param(1).filter(|a| a.starts_with('{')) {
                    if !set_size(&mut self.size_x, &mut self.size_y, arg) {
                        recognition_error(session, NAME, stmt, "malformed size");
                    }
                }
                set_flags(&mut self.flags, stmt.param(2), session, NAME, stmt);
                set_flags(&mut self.wflags, stmt.param(3), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::Columns") if st.in_setup(stmt, 1) => {
                set_arg(&mut self.column_count, stmt.param(0), session, NAME, stmt);
                set_arg(&mut self.column_border, stmt.param(2), session, NAME, stmt);
            }
            (StmtKind::Call, "ImRad::ScrollWhenDragging") if st.in_setup(stmt, 1) => {
                self.scroll_when_dragging = true;
            }
            (StmtKind::ForBlock, _) if st.in_setup(stmt, 1) => {
                if !self.item_count.set_from_arg(&stmt.line) {
                    recognition_error(session, NAME, stmt, "unsupported loop header");
                }
            }
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.color" => bg,
        "appearance.padding" => padding,
        "appearance.spacing" => spacing,
        "appearance.rounding" => rounding,
        "appearance.borderSize" => border_size,
        "appearance.outerPadding" => outer_padding,
        "appearance.columnBorder" => column_border,
        "behavior.flags" => flags,
        "behavior.wflags" => wflags,
        "behavior.columnCount" => column_count,
        "behavior.itemCount" => item_count.limit,
        "behavior.scrollWhenDragging" => scroll_when_dragging,
        "layout.size_x" => size_x,
        "layout.size_y" => size_y,
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

    fn child(c: Child) -> Widget {
        Widget::from_kind(WidgetKind::Child(c))
    }

    #[test]
    fn test_default_export() {
        let src = export_source(&[child(Child::default())], &mut Session::default());
        assert!(src.contains(
            "ImGui::BeginChild(\"child0\", { 20, 20 }, ImGuiChildFlags_Borders, ImGuiWindowFlags_None);\n{\n"
        ));
        assert!(!src.contains("ImGui::Columns"));
        assert!(src.contains("    ImGui::EndChild();\n}\n"));
    }

    #[test]
    fn test_outer_padding_roundtrip() {
        let mut c = Child::default();
        c.outer_padding = false;
        c.size_x = Bindable::literal(Dimension(-1.0));
        c.bg = Bindable::literal(Color(0xff101010));
        let w = child(c);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("ImVec2 _sz0{ -1, 20 };"));
        assert!(src.contains("ImGui::BeginChild(\"child0\", _sz0, "));
        assert!(src.ends_with("ImRad::PopIgnoreWindowPadding(_data0);\n/// @end Child\n\n"));

        let mut s = Session::default();
        let out = import_source(&src, &mut s).unwrap();
        assert!(s.diagnostics().is_empty());
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_columns_with_items() {
        let mut c = Child::default();
        c.column_count = ColumnCount(Bindable::literal(3));
        c.column_border = false;
        c.spacing = Bindable::literal(Dim2::new(2.0, 2.0));
        assert!(c.item_count.limit.set_from_arg("files.size()"));
        let mut w = child(c);
        w.children.push(Widget::from_kind(WidgetKind::named("Text").unwrap()));
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("ImGui::Columns(3, \"\", false);"));
        assert!(src.contains("auto& item = files[i];"));
        let next = src.find("ImGui::NextColumn();").unwrap();
        assert!(src.find("ImGui::PopID();").unwrap() < next);
        // Spacing is popped inside the child
        assert!(src.find("ImGui::PopStyleVar();").unwrap() < src.find("ImGui::EndChild();").unwrap());

        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_cleared_column_count_roundtrip() {
        let mut w = child(Child::default());
        assert!(w.set_property("behavior.columnCount", ""));
        assert_eq!(w, child(Child::default()));
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(!src.contains("ImGui::Columns"));
        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);

        assert!(w.set_property("behavior.columnCount", "nCols"));
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("ImGui::Columns(nCols, \"\", true);"));
    }

    #[test]
    fn test_user_code_in_region_is_not_a_property() {
        let mut w = child(Child::default());
        w.children.push(Widget::from_kind(WidgetKind::named("Text").unwrap()));
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        let code = "for (int k = 0; k < n; ++k)\n{\n    Bar(k);\n}\nImGui::PushStyleVar(ImGuiStyleVar_ItemSpacing, { 1, 1 });\nImGui::PopStyleVar();\nImGui::Columns(2, \"\", false);\nImGui::Columns(1);\n";
        let src = src.replacen("/// @separator\n", &format!("/// @separator\n{}", code), 1);
        let mut s = Session::default();
        let out = import_source(&src, &mut s).unwrap();
        assert!(s.diagnostics().is_empty());
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_flag_prerequisite_reported() {
        let src = "/// @begin Child\nImGui::BeginChild(\"c\", { 0, 0 }, ImGuiChildFlags_AlwaysAutoResize, 0);\n{\n    ImGui::EndChild();\n}\n/// @end Child\n";
        let mut s = Session::default();
        let out = import_source(src, &mut s).unwrap();
        assert_eq!(s.diagnostics().len(), 1);
        assert!(s.diagnostics()[0].message.contains("ImGuiChildFlags_AlwaysAutoResize"));
        let WidgetKind::Child(c) = &out.widgets[0].kind else {
            panic!("expected a child");
        };
        assert!(c.flags.contains(ChildFlags::ALWAYS_AUTO_RESIZE));
        assert!(c.wflags.is_empty());
    }
}
