use super::{Node, Widget, property_table};
use crate::binding::{Bindable, Color};
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::flags::{FlagRule, FlagSet, TreeNodeFlags};
use crate::import::{ImportState, set_arg, set_flags};
use crate::session::Session;
use serde::Serialize;

/// Flag options of headers and tree nodes; only tree nodes may be leaves.
fn tree_flags(node: bool) -> FlagSet<TreeNodeFlags> {
    let mut set = FlagSet::new(TreeNodeFlags::empty())
        .add(TreeNodeFlags::BULLET)
        .add(TreeNodeFlags::DEFAULT_OPEN)
        .add(TreeNodeFlags::FRAME_PADDING);
    if node {
        set = set
            .add(TreeNodeFlags::LEAF)
            .add(TreeNodeFlags::NO_TREE_PUSH_ON_OPEN);
    }
    set.add(TreeNodeFlags::OPEN_ON_ARROW)
        .add(TreeNodeFlags::OPEN_ON_DOUBLE_CLICK)
        .separator()
        .add(TreeNodeFlags::SPAN_ALL_COLUMNS)
        .add(TreeNodeFlags::SPAN_AVAIL_WIDTH)
        .add(TreeNodeFlags::SPAN_FULL_WIDTH)
        .add(TreeNodeFlags::SPAN_TEXT_WIDTH)
        .rule(FlagRule::Exclusive(
            TreeNodeFlags::SPAN_AVAIL_WIDTH
                | TreeNodeFlags::SPAN_FULL_WIDTH
                | TreeNodeFlags::SPAN_TEXT_WIDTH,
        ))
}

fn export_open(open: &Bindable<bool>, ex: &mut Exporter<'_>) {
    if !open.is_empty() {
        let arg = open.to_arg(ex.unit());
        ex.out.line(format!("ImGui::SetNextItemOpen({});", arg));
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollapsingHeader {
    pub label: Bindable<String>,
    pub flags: FlagSet<TreeNodeFlags>,
    /// Forces the open state every frame when set
    pub open: Bindable<bool>,
    pub header: Bindable<Color>,
    pub hovered: Bindable<Color>,
    pub active: Bindable<Color>,
}

impl Default for CollapsingHeader {
    fn default() -> Self {
        Self {
            label: Bindable::literal("Header".to_string()),
            flags: tree_flags(false),
            open: Bindable::Empty,
            header: Bindable::Empty,
            hovered: Bindable::Empty,
            active: Bindable::Empty,
        }
    }
}

impl Node for CollapsingHeader {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        let mut style = StyleStack::new();
        for (col, value) in [
            ("ImGuiCol_Header", &self.header),
            ("ImGuiCol_HeaderHovered", &self.hovered),
            ("ImGuiCol_HeaderActive", &self.active),
        ] {
            if !value.is_empty() {
                style.push_color(&mut ex.out, col, &value.to_arg(unit));
            }
        }
        export_open(&self.open, ex);
        ex.out.open_block(format!(
            "if (ImGui::CollapsingHeader({}, {}))",
            self.label.to_arg(unit),
            self.flags.to_arg()
        ));
        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.close_block();
        style.pop_all(&mut ex.out);
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "CollapsingHeader";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::PushStyleColor") if st.before_block(stmt) => {
                let target = match stmt.param(0) {
                    Some("ImGuiCol_Header") => &mut self.header,
                    Some("ImGuiCol_HeaderHovered") => &mut self.hovered,
                    Some("ImGuiCol_HeaderActive") => &mut self.active,
                    _ => return false,
                };
                set_arg(target, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::SetNextItemOpen") if st.before_block(stmt) => {
                set_arg(&mut self.open, stmt.param(0), session, NAME, stmt);
            }
            (StmtKind::IfCall, "ImGui::CollapsingHeader") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
                set_flags(&mut self.flags, stmt.param(1), session, NAME, stmt);
            }
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.header" => header,
        "appearance.hovered" => hovered,
        "appearance.active" => active,
        "behavior.flags" => flags,
        "behavior.label" => label,
        "behavior.open" => open,
    });
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    pub label: Bindable<String>,
    pub flags: FlagSet<TreeNodeFlags>,
    pub open: Bindable<bool>,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self {
            label: Bindable::literal("Node".to_string()),
            flags: tree_flags(true),
            open: Bindable::Empty,
        }
    }
}

impl Node for TreeNode {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        export_open(&self.open, ex);
        ex.out.open_block(format!(
            "if (ImGui::TreeNodeEx({}, {}))",
            self.label.to_arg(ex.unit()),
            self.flags.to_arg()
        ));
        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.line("ImGui::TreePop();");
        ex.out.close_block();
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "TreeNode";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::SetNextItemOpen") if st.before_block(stmt) => {
                set_arg(&mut self.open, stmt.param(0), session, NAME, stmt);
            }
            (StmtKind::IfCall, "ImGui::TreeNodeEx") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
                set_flags(&mut self.flags, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::TreePop") if st.depth(stmt) == Some(1) => {}
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "behavior.flags" => flags,
        "behavior.label" => label,
        "behavior.open" => open,
    });
}
