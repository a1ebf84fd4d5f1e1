use super::{Node, Widget, property_table, set_size, size_arg};
use crate::binding::{Bindable, Color, Dimension, Literal};
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::import::{ImportState, recognition_error, set_arg};
use crate::session::Session;
use crate::vars::VarStorage;
use serde::Serialize;

const NAME: &str = "Splitter";

/// Gap used when the children have not been laid out yet.
const DEFAULT_THICKNESS: f32 = 8.0;

/// Two panes separated by a draggable sash.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Splitter {
    /// Sash position, must be backed by a variable
    pub position: Bindable<f32>,
    pub min_size1: Dimension,
    pub min_size2: Dimension,
    pub bg: Bindable<Color>,
    pub active: Bindable<Color>,
    pub size_x: Bindable<Dimension>,
    pub size_y: Bindable<Dimension>,
}

impl Default for Splitter {
    fn default() -> Self {
        Self {
            position: Bindable::Empty,
            min_size1: Dimension(10.0),
            min_size2: Dimension(10.0),
            bg: Bindable::Empty,
            active: Bindable::Empty,
            size_x: Bindable::literal(Dimension(-1.0)),
            size_y: Bindable::literal(Dimension(-1.0)),
        }
    }
}

impl Splitter {
    fn create_position(&mut self, session: &mut Session) {
        let name = session
            .vars
            .create_var("float", "100", VarStorage::Impl, "sashPos");
        self.position = Bindable::field(name);
    }

    fn check(&self, children: &[Widget], ex: &mut Exporter<'_>) {
        if children.len() != 2 {
            ex.error(NAME, "need exactly 2 children");
        }
        if self.position.is_empty() {
            ex.error(NAME, "position is unassigned");
            return;
        }
        let pos = self.position.to_arg(ex.unit());
        if let Some(first) = children.first() {
            if !first.size_variables().contains(&pos) {
                ex.error(
                    NAME,
                    format!("first child doesn't reference \"{}\" in its size", pos),
                );
            }
        }
    }
}

/// Split axis (true for side by side panes) and the gap between the panes
/// as last laid out.
pub(crate) fn sash_geometry(children: &[Widget]) -> (bool, f32) {
    let [first, second] = children else {
        return (true, DEFAULT_THICKNESS);
    };
    let axis_x = second.same_line;
    let th = match (first.cached_rect, second.cached_rect) {
        (Some(a), Some(b)) if axis_x => b.min.x - a.max.x,
        (Some(a), Some(b)) => b.min.y - a.max.y,
        _ => DEFAULT_THICKNESS,
    };
    (axis_x, th.max(0.0))
}

impl Node for Splitter {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        self.check(&w.children, ex);
        let unit = ex.unit();
        let id = ex.next_id();

        let mut style = StyleStack::new();
        if !self.bg.is_empty() {
            style.push_color(&mut ex.out, "ImGuiCol_ChildBg", &self.bg.to_arg(unit));
        }
        ex.out.open_block(format!(
            "ImGui::BeginChild(\"splitter{}\", {});",
            id,
            size_arg(&self.size_x, &self.size_y, unit)
        ));

        let mut sash = StyleStack::new();
        sash.push_color(&mut ex.out, "ImGuiCol_Separator", "0x00000000");
        sash.push_color(&mut ex.out, "ImGuiCol_SeparatorHovered", "0x00000000");
        if !self.active.is_empty() {
            sash.push_color(&mut ex.out, "ImGuiCol_SeparatorActive", &self.active.to_arg(unit));
        }
        let (axis_x, th) = sash_geometry(&w.children);
        ex.out.line(format!(
            "ImRad::Splitter({}, {}, &{}, {}, {});",
            axis_x,
            Dimension(th).literal_arg(unit),
            self.position.to_arg(unit),
            self.min_size1.literal_arg(unit),
            self.min_size2.literal_arg(unit)
        ));
        sash.pop_all(&mut ex.out);

        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.line("ImGui::EndChild();");
        ex.out.close_block();
        style.pop_all(&mut ex.out);
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::BeginChild") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                if let Some(arg) = stmt.param(1) {
                    if !set_size(&mut self.size_x, &mut self.size_y, arg) {
                        recognition_error(session, NAME, stmt, "malformed size");
                    }
                }
            }
            (StmtKind::Call, "ImRad::Splitter") if st.in_setup(stmt, 1) => {
                match stmt.param(2).and_then(|p| p.strip_prefix('&')) {
                    Some(pos) => set_arg(&mut self.position, Some(pos), session, NAME, stmt),
                    None => recognition_error(session, NAME, stmt, "position is not passed by address"),
                }
                set_arg(&mut self.min_size1, stmt.param(3), session, NAME, stmt);
                set_arg(&mut self.min_size2, stmt.param(4), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushStyleColor")
                if st.before_block(stmt) && stmt.param(0) == Some("ImGuiCol_ChildBg") =>
            {
                set_arg(&mut self.bg, stmt.param(1), session, NAME, stmt)
            }
            (StmtKind::Call, "ImGui::PushStyleColor") if st.in_setup(stmt, 1) => match stmt.param(0) {
                Some("ImGuiCol_SeparatorActive") => {
                    set_arg(&mut self.active, stmt.param(1), session, NAME, stmt)
                }
                Some("ImGuiCol_Separator" | "ImGuiCol_SeparatorHovered") => {}
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.bg" => bg,
        "appearance.active" => active,
        "behavior.min1" => min_size1,
        "behavior.min2" => min_size2,
        "bindings.sashPos" => position,
        "layout.size_x" => size_x,
        "layout.size_y" => size_y,
    });

    fn init(&mut self, _children: &mut Vec<Widget>, session: &mut Session) {
        self.create_position(session);
    }

    fn rebind_vars(&mut self, session: &mut Session) {
        if !self.position.is_empty() {
            self.create_position(session);
        }
    }

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
    use egui::{Rect, pos2};

    fn splitter_with_panes(s: &mut Session) -> Widget {
        let mut sp = Widget::new(WidgetKind::named("Splitter").unwrap(), s);
        let mut left = Widget::from_kind(WidgetKind::named("Child").unwrap());
        assert!(left.set_property("layout.size_x", "sashPos1"));
        assert!(left.set_property("layout.size_y", "-1"));
        let mut right = Widget::from_kind(WidgetKind::named("Child").unwrap());
        right.same_line = true;
        sp.children.push(left);
        sp.children.push(right);
        sp
    }

    fn messages(s: &Session) -> Vec<String> {
        s.diagnostics().iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn test_export_valid() {
        let mut s = Session::default();
        s.create_vars = true;
        let sp = splitter_with_panes(&mut s);
        let src = export_source(std::slice::from_ref(&sp), &mut s);
        assert!(messages(&s).is_empty());
        assert!(src.contains("ImGui::BeginChild(\"splitter0\", { -1, -1 });"));
        assert!(src.contains("ImRad::Splitter(true, 8, &sashPos1, 10, 10);"));
        assert_eq!(src.matches("ImGui::PopStyleColor();").count(), 2);

        let mut s2 = Session::default();
        let out = import_source(&src, &mut s2).unwrap();
        assert!(messages(&s2).is_empty());
        assert_eq!(out.widgets[0], sp);
    }

    #[test]
    fn test_errors() {
        let mut s = Session::default();
        let sp = Widget::from_kind(WidgetKind::named("Splitter").unwrap());
        export_source(&[sp], &mut s);
        assert_eq!(messages(&s), vec!["need exactly 2 children", "position is unassigned"]);

        let mut s = Session::default();
        s.create_vars = true;
        let mut sp = splitter_with_panes(&mut s);
        assert!(sp.children[0].set_property("layout.size_x", "200"));
        s.clear_diagnostics();
        export_source(&[sp], &mut s);
        assert_eq!(
            messages(&s),
            vec!["first child doesn't reference \"sashPos1\" in its size"]
        );
    }

    #[test]
    fn test_thickness_from_layout() {
        let mut s = Session::default();
        s.create_vars = true;
        let mut sp = splitter_with_panes(&mut s);
        sp.children[1].same_line = false;
        sp.children[0].cached_rect = Some(Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 40.0)));
        sp.children[1].cached_rect = Some(Rect::from_min_max(pos2(0.0, 46.0), pos2(100.0, 90.0)));
        assert_eq!(sash_geometry(&sp.children), (false, 6.0));
        let src = export_source(&[sp], &mut s);
        assert!(src.contains("ImRad::Splitter(false, 6, &sashPos1, 10, 10);"));
    }

    #[test]
    fn test_active_color_roundtrip() {
        let mut s = Session::default();
        s.create_vars = true;
        let mut sp = splitter_with_panes(&mut s);
        let WidgetKind::Splitter(inner) = &mut sp.kind else {
            unreachable!()
        };
        inner.active = Bindable::literal(Color(0xff0000ff));
        inner.min_size2 = Dimension(40.0);
        let src = export_source(std::slice::from_ref(&sp), &mut s);
        assert_eq!(src.matches("ImGui::PopStyleColor();").count(), 3);
        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], sp);
    }
}
