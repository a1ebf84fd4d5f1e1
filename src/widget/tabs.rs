//! Tab bars and their tabs.
//!
//! A tab knows nothing about selection on its own: the selected-tab binding
//! and the equal-width layout live on the bar and are written into each
//! tab's statements. On import the tab hands what it found back to the bar
//! through [`ParentHints`].

use super::{Event, Node, Widget, WidgetKind, open_loop, property_table};
use crate::binding::{Bindable, Color};
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::flags::{FlagRule, FlagSet, TabBarFlags};
use crate::import::{ImportState, ParentHints, recognition_error, set_arg, set_flags};
use crate::iteration::IterationDescriptor;
use crate::session::Session;
use crate::vars::VarStorage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SELECTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*==\s*(.+?)\s*\?\s*ImGuiTabItemFlags_SetSelected\s*:\s*0$").unwrap()
});

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TabBar {
    pub flags: FlagSet<TabBarFlags>,
    pub tab: Bindable<Color>,
    pub hovered: Bindable<Color>,
    pub selected: Bindable<Color>,
    pub overline: Bindable<Color>,
    /// All tabs share the available width equally
    pub regular_width: bool,
    pub item_count: IterationDescriptor,
    /// Index of the selected tab
    pub active_tab: Bindable<i32>,
}

impl Default for TabBar {
    fn default() -> Self {
        let fitting = TabBarFlags::FITTING_POLICY_RESIZE_DOWN | TabBarFlags::FITTING_POLICY_SCROLL;
        Self {
            flags: FlagSet::new(TabBarFlags::empty())
                .add(TabBarFlags::DRAW_SELECTED_OVERLINE)
                .add(TabBarFlags::FITTING_POLICY_RESIZE_DOWN)
                .add(TabBarFlags::FITTING_POLICY_SCROLL)
                .add(TabBarFlags::NO_TAB_LIST_SCROLLING_BUTTONS)
                .add(TabBarFlags::REORDERABLE)
                .add(TabBarFlags::TAB_LIST_POPUP_BUTTON)
                .rule(FlagRule::Exclusive(fitting)),
            tab: Bindable::Empty,
            hovered: Bindable::Empty,
            selected: Bindable::Empty,
            overline: Bindable::Empty,
            regular_width: false,
            item_count: IterationDescriptor::default(),
            active_tab: Bindable::Empty,
        }
    }
}

impl Node for TabBar {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        let mut style = StyleStack::new();
        for (col, value) in [
            ("ImGuiCol_Tab", &self.tab),
            ("ImGuiCol_TabHovered", &self.hovered),
            ("ImGuiCol_TabSelected", &self.selected),
            ("ImGuiCol_TabSelectedOverline", &self.overline),
        ] {
            if !value.is_empty() {
                style.push_color(&mut ex.out, col, &value.to_arg(unit));
            }
        }

        let id = ex.next_id();
        ex.out.open_block(format!(
            "if (ImGui::BeginTabBar(\"tabBar{}\", {}))",
            id,
            self.flags.to_arg()
        ));
        if self.regular_width {
            ex.out
                .line("int _nTabs = std::max(1, ImGui::GetCurrentTabBar()->ActiveTabs);");
            ex.out.line(
                "float _tabWidth = (ImGui::GetContentRegionAvail().x - (_nTabs - 1) * ImGui::GetStyle().ItemInnerSpacing.x) / _nTabs - 1;",
            );
        }
        // The tab bar pushes an id per tab itself
        let tabs = !self.item_count.is_empty();
        if tabs {
            open_loop(ex, &self.item_count);
        }
        ex.child_region(&w.kind, w.children.iter().enumerate());
        if tabs {
            ex.out.close_block();
        }
        ex.out.line("ImGui::EndTabBar();");
        ex.out.close_block();
        style.pop_all(&mut ex.out);
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "TabBar";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::PushStyleColor") if st.before_block(stmt) => {
                let target = match stmt.param(0) {
                    Some("ImGuiCol_Tab") => &mut self.tab,
                    Some("ImGuiCol_TabHovered") => &mut self.hovered,
                    Some("ImGuiCol_TabSelected") => &mut self.selected,
                    Some("ImGuiCol_TabSelectedOverline") => &mut self.overline,
                    _ => return false,
                };
                set_arg(target, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::IfCall, "ImGui::BeginTabBar") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                set_flags(&mut self.flags, stmt.param(1), session, NAME, stmt);
            }
            (StmtKind::Other, _)
                if st.in_setup(stmt, 1)
                    && (stmt.line.starts_with("int _nTabs") || stmt.line.starts_with("float _tabWidth")) =>
            {
                self.regular_width = true;
            }
            (StmtKind::ForBlock, _) if st.in_setup(stmt, 1) => {
                if !self.item_count.set_from_arg(&stmt.line) {
                    recognition_error(session, NAME, stmt, "unsupported loop header");
                }
            }
            (StmtKind::Call, "ImGui::EndTabBar") => {}
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.tab" => tab,
        "appearance.hovered" => hovered,
        "appearance.selected" => selected,
        "appearance.overline" => overline,
        "appearance.regularWidth" => regular_width,
        "behavior.flags" => flags,
        "behavior.tabCount" => item_count.limit,
        "bindings.activeTab" => active_tab,
    });

    fn init(&mut self, children: &mut Vec<Widget>, session: &mut Session) {
        children.push(Widget::new(WidgetKind::TabItem(TabItem::default()), session));
    }

    fn rebind_vars(&mut self, session: &mut Session) {
        if !self.active_tab.is_empty() {
            let name = session
                .vars
                .create_var("int", "", VarStorage::Interface, "activeTab");
            self.active_tab = Bindable::field(name);
        }
    }

    fn adopt(&mut self, hints: &ParentHints) {
        if let Some(active) = &hints.active_tab {
            self.active_tab = active.clone();
        }
        self.regular_width |= hints.regular_width;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TabItem {
    pub label: Bindable<String>,
    pub close_button: bool,
    pub on_close: Event,
}

impl Default for TabItem {
    fn default() -> Self {
        Self {
            label: Bindable::literal("Tab".to_string()),
            close_button: false,
            on_close: Event::default(),
        }
    }
}

impl TabItem {
    fn selection_arg(bar: Option<&TabBar>, index: usize, ex: &Exporter<'_>) -> String {
        match bar {
            Some(tb) if !tb.active_tab.is_empty() => {
                let idx = if tb.item_count.is_empty() {
                    index.to_string()
                } else {
                    tb.item_count.index_name_or(&ex.settings().for_var_name)
                };
                format!(
                    "{} == {} ? ImGuiTabItemFlags_SetSelected : 0",
                    tb.active_tab.to_arg(ex.unit()),
                    idx
                )
            }
            _ => "ImGuiTabItemFlags_None".to_string(),
        }
    }
}

impl Node for TabItem {
    fn export(&self, w: &Widget, parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let bar = match parent.kind {
            Some(WidgetKind::TabBar(tb)) => Some(tb),
            _ => {
                ex.error("TabItem", "must be placed inside a TabBar");
                None
            }
        };
        if bar.is_some_and(|tb| tb.regular_width) {
            ex.out.line("ImGui::SetNextItemWidth(_tabWidth);");
        }
        let open_var = self.close_button.then(|| {
            let var = format!("_open{}", ex.next_id());
            ex.out.line(format!("bool {} = true;", var));
            var
        });
        let selection = Self::selection_arg(bar, parent.index, ex);
        ex.out.open_block(format!(
            "if (ImGui::BeginTabItem({}, {}, {}))",
            self.label.to_arg(ex.unit()),
            open_var.as_ref().map_or("nullptr".to_string(), |v| format!("&{}", v)),
            selection
        ));
        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.line("ImGui::EndTabItem();");
        ex.out.close_block();

        if let (Some(var), Some(call)) = (open_var, self.on_close.call()) {
            ex.out.line(format!("if (!{})", var));
            ex.out.body_line(call);
        }
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "TabItem";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call, "ImGui::SetNextItemWidth") => st.hints.regular_width = true,
            (StmtKind::Other, _) if stmt.line.starts_with("bool _open") => self.close_button = true,
            (StmtKind::IfCall, "ImGui::BeginTabItem") => {
                st.import_level = Some(stmt.level);
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
                self.close_button = stmt.param(1).is_some_and(|p| p.starts_with('&'));
                if let Some(caps) = stmt.param(2).and_then(|p| SELECTED_RE.captures(p)) {
                    let mut active = Bindable::default();
                    if active.set_from_arg(&caps[1]) {
                        st.hints.active_tab = Some(active);
                    } else {
                        recognition_error(session, NAME, stmt, "malformed selected tab");
                    }
                }
            }
            (StmtKind::Call, "ImGui::EndTabItem") => {}
            (StmtKind::IfBlock, _) if stmt.level == st.base_level && stmt.cond.starts_with("!_open") => {
                st.guard_level = Some(stmt.level);
            }
            (StmtKind::Call, callee)
                if stmt.is_user_call() && st.guard_level.is_some_and(|l| stmt.level == l + 1) =>
            {
                self.on_close = Event::new(callee);
                st.guard_level = None;
            }
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "behavior.label" => label,
        "behavior.closeButton" => close_button,
    });

    property_table!(events, events_mut {
        "tabItem.close" => on_close,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_source;
    use crate::import::import_source;

    fn bar_with_tabs(tb: TabBar, tabs: Vec<TabItem>) -> Widget {
        let mut w = Widget::from_kind(WidgetKind::TabBar(tb));
        for t in tabs {
            w.children.push(Widget::from_kind(WidgetKind::TabItem(t)));
        }
        w
    }

    #[test]
    fn test_close_button_event() {
        let mut t = TabItem::default();
        t.close_button = true;
        t.on_close = Event::new("OnCloseTab");
        let w = bar_with_tabs(TabBar::default(), vec![TabItem::default(), t]);
        let mut s = Session::default();
        let src = export_source(std::slice::from_ref(&w), &mut s);
        assert!(src.contains("if (ImGui::BeginTabItem(\"Tab\", nullptr, ImGuiTabItemFlags_None))"));
        assert!(src.contains("bool _open1 = true;"));
        assert!(src.contains("if (ImGui::BeginTabItem(\"Tab\", &_open1, ImGuiTabItemFlags_None))"));
        assert!(src.contains("if (!_open1)\n"));
        assert!(src.contains("OnCloseTab();"));

        let mut s2 = Session::default();
        let out = import_source(&src, &mut s2).unwrap();
        assert!(s2.diagnostics().is_empty());
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_regular_width_recognized_from_tab() {
        let mut tb = TabBar::default();
        tb.regular_width = true;
        let w = bar_with_tabs(tb, vec![TabItem::default()]);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("ImGui::SetNextItemWidth(_tabWidth);"));
        // Only the tab's statement is left to tell
        let stripped: String = src
            .lines()
            .filter(|l| !l.contains("_nTabs"))
            .map(|l| format!("{}\n", l))
            .collect();
        let out = import_source(&stripped, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_repeated_tabs_select_by_index() {
        let mut tb = TabBar::default();
        assert!(tb.item_count.limit.set_from_arg("docs.size()"));
        tb.active_tab = Bindable::field("curDoc");
        let w = bar_with_tabs(tb, vec![TabItem::default()]);
        let src = export_source(std::slice::from_ref(&w), &mut Session::default());
        assert!(src.contains("auto& item = docs[i];"));
        assert!(src.contains("curDoc == i ? ImGuiTabItemFlags_SetSelected : 0"));
        let out = import_source(&src, &mut Session::default()).unwrap();
        assert_eq!(out.widgets[0], w);
    }

    #[test]
    fn test_tab_outside_bar_reported() {
        let w = Widget::from_kind(WidgetKind::TabItem(TabItem::default()));
        let mut s = Session::default();
        export_source(&[w], &mut s);
        assert_eq!(s.diagnostics().len(), 1);
    }
}
