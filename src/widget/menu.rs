use super::{Event, Node, Prop, PropMut, Widget, WidgetKind, property_table};
use crate::binding::{Bindable, Dim2, Dimension, escape, unescape};
use crate::cpp::{self, Stmt, StmtKind};
use crate::export::{ExportParent, Exporter, StyleStack};
use crate::import::{ImportState, set_arg};
use crate::session::Session;
use crate::vars::VarStorage;
use serde::Serialize;

const POPUP_FLAGS: &str =
    "ImGuiWindowFlags_AlwaysAutoResize | ImGuiWindowFlags_NoTitleBar | ImGuiWindowFlags_NoSavedSettings";

/// Key chord argument for `ImGui::Shortcut`, e.g. `Ctrl+S` becomes
/// `ImGuiMod_Ctrl | ImGuiKey_S`. Returns `None` for an unknown key name.
pub fn shortcut_chord(text: &str) -> Option<String> {
    let parts: Vec<&str> = text.split('+').map(str::trim).collect();
    let (key, mods) = parts.split_last()?;
    let mut terms = Vec::new();
    for m in mods {
        let m = match m.to_ascii_lowercase().as_str() {
            "ctrl" => "Ctrl",
            "shift" => "Shift",
            "alt" => "Alt",
            "super" | "cmd" => "Super",
            _ => return None,
        };
        terms.push(format!("ImGuiMod_{}", m));
    }
    terms.push(format!("ImGuiKey_{}", key_name(key)?));
    Some(terms.join(" | "))
}

fn key_name(key: &str) -> Option<String> {
    let mut chars = key.chars();
    let first = chars.next()?;
    if chars.as_str().is_empty() && first.is_ascii_alphanumeric() {
        return Some(first.to_ascii_uppercase().to_string());
    }
    if let Some(n) = key.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u32>().ok()) {
        return (1..=24).contains(&n).then(|| format!("F{}", n));
    }
    let name = match key.to_ascii_lowercase().as_str() {
        "left" => "LeftArrow",
        "right" => "RightArrow",
        "up" => "UpArrow",
        "down" => "DownArrow",
        "del" | "delete" => "Delete",
        "ins" | "insert" => "Insert",
        "enter" => "Enter",
        "esc" | "escape" => "Escape",
        "tab" => "Tab",
        "space" => "Space",
        "backspace" => "Backspace",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        _ => return None,
    };
    Some(name.to_string())
}

/// Writes the global shortcut handlers of every menu item below `children`.
/// Shortcuts of closed menus are not processed by the library, so they get
/// their own pass ahead of the menu statements.
fn export_shortcuts(children: &[Widget], ex: &mut Exporter<'_>) {
    for child in children {
        let WidgetKind::MenuIt(it) = &child.kind else {
            continue;
        };
        if !it.shortcut.is_empty() && !it.owner_draw {
            match shortcut_chord(&it.shortcut) {
                Some(chord) => {
                    let guard = match &child.disabled {
                        Bindable::Empty | Bindable::Literal(false) => String::new(),
                        d => format!("!({}) && ", d.to_arg(ex.unit())),
                    };
                    ex.out.line(format!(
                        "if ({}ImGui::Shortcut({}, ImGuiInputFlags_RouteGlobal))",
                        guard, chord
                    ));
                    ex.out
                        .body_line(it.on_change.call().unwrap_or_else(|| ";".to_string()));
                }
                None => ex.error("MenuIt", format!("invalid shortcut \"{}\"", it.shortcut)),
            }
        }
        export_shortcuts(&child.children, ex);
    }
}

/// Menu bar of the enclosing window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MenuBar;

impl Node for MenuBar {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        ex.out.open_block("if (ImGui::BeginMenuBar())");
        export_shortcuts(&w.children, ex);
        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.line("ImGui::EndMenuBar();");
        ex.out.close_block();
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, _session: &mut Session) -> bool {
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::IfCall, "ImGui::BeginMenuBar") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                st.hints.window_menu_bar = true;
            }
            (StmtKind::Call, "ImGui::EndMenuBar") => {}
            _ => return false,
        }
        true
    }

    fn properties(&self) -> Vec<Prop<'_>> {
        Vec::new()
    }

    fn properties_mut(&mut self) -> Vec<PropMut<'_>> {
        Vec::new()
    }

    fn init(&mut self, children: &mut Vec<Widget>, session: &mut Session) {
        children.push(Widget::new(WidgetKind::MenuIt(MenuIt::default()), session));
    }
}

/// Popup menu opened by id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextMenu {
    pub label: Bindable<String>,
    pub padding: Bindable<Dim2>,
    pub spacing: Bindable<Dim2>,
    pub rounding: Bindable<Dimension>,
}

impl Default for ContextMenu {
    fn default() -> Self {
        Self {
            label: Bindable::literal("ContextMenu".to_string()),
            padding: Bindable::Empty,
            spacing: Bindable::Empty,
            rounding: Bindable::Empty,
        }
    }
}

impl Node for ContextMenu {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        export_shortcuts(&w.children, ex);

        let mut style = StyleStack::new();
        if !self.padding.is_empty() {
            style.push_var(&mut ex.out, "ImGuiStyleVar_WindowPadding", &self.padding.to_arg(unit));
        }
        if !self.rounding.is_empty() {
            style.push_var(&mut ex.out, "ImGuiStyleVar_PopupRounding", &self.rounding.to_arg(unit));
        }
        if !self.spacing.is_empty() {
            style.push_var(&mut ex.out, "ImGuiStyleVar_ItemSpacing", &self.spacing.to_arg(unit));
        }
        ex.out.open_block(format!(
            "if (ImGui::BeginPopup({}, {}))",
            self.label.to_arg(unit),
            POPUP_FLAGS
        ));
        ex.child_region(&w.kind, w.children.iter().enumerate());
        ex.out.line("ImGui::EndPopup();");
        ex.out.close_block();
        style.pop_all(&mut ex.out);
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "ContextMenu";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::IfCall, "ImGui::BeginPopup") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::PushStyleVar") if st.before_block(stmt) => {
                match stmt.param(0) {
                    Some("ImGuiStyleVar_WindowPadding") => {
                        set_arg(&mut self.padding, stmt.param(1), session, NAME, stmt)
                    }
                    Some("ImGuiStyleVar_ItemSpacing") => {
                        set_arg(&mut self.spacing, stmt.param(1), session, NAME, stmt)
                    }
                    Some("ImGuiStyleVar_PopupRounding") => {
                        set_arg(&mut self.rounding, stmt.param(1), session, NAME, stmt)
                    }
                    _ => return false,
                }
            }
            (StmtKind::Call, "ImGui::EndPopup") => {}
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.padding" => padding,
        "appearance.spacing" => spacing,
        "appearance.rounding" => rounding,
        "behavior.label" => label,
    });
}

/// Menu entry; with children it becomes a submenu.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuIt {
    pub label: Bindable<String>,
    /// Display text such as `Ctrl+S`
    pub shortcut: String,
    /// Separator line above the item
    pub separator: bool,
    /// The change event draws the item instead of a plain `MenuItem`
    pub owner_draw: bool,
    pub checked: Bindable<bool>,
    pub on_change: Event,
}

impl Default for MenuIt {
    fn default() -> Self {
        Self {
            label: Bindable::literal("Item".to_string()),
            shortcut: String::new(),
            separator: false,
            owner_draw: false,
            checked: Bindable::Empty,
            on_change: Event::default(),
        }
    }
}

impl MenuIt {
    fn checked_arg(&self, ex: &Exporter<'_>) -> String {
        match &self.checked {
            Bindable::Empty => "false".to_string(),
            c if c.is_reference() => format!("&{}", c.to_arg(ex.unit())),
            c => c.to_arg(ex.unit()),
        }
    }
}

impl Node for MenuIt {
    fn export(&self, w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        if self.separator {
            ex.out.line("ImGui::Separator();");
        }
        let label = self.label.to_arg(ex.unit());
        if !w.children.is_empty() {
            ex.out.open_block(format!("if (ImGui::BeginMenu({}))", label));
            ex.child_region(&w.kind, w.children.iter().enumerate());
            ex.out.line("ImGui::EndMenu();");
            ex.out.close_block();
        } else if self.owner_draw {
            match self.on_change.call() {
                Some(call) => ex.out.line(call),
                None => ex.error("MenuIt", "ownerDraw is set but Draw event is not assigned"),
            }
        } else {
            let item = format!(
                "ImGui::MenuItem({}, \"{}\", {})",
                label,
                escape(&self.shortcut),
                self.checked_arg(ex)
            );
            match self.on_change.call() {
                Some(call) => {
                    ex.out.line(format!("if ({})", item));
                    ex.out.body_line(call);
                }
                None => ex.out.line(format!("{};", item)),
            }
        }
    }

    fn import(&mut self, stmt: &Stmt, st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "MenuIt";
        match (stmt.kind, stmt.callee.as_str()) {
            (StmtKind::Call | StmtKind::IfCallThenCall, "ImGui::MenuItem") if st.before_block(stmt) => {
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
                if let Some(sc) = stmt.param(1).filter(|p| cpp::is_cstr(p)) {
                    self.shortcut = unescape(&sc[1..sc.len() - 1]).unwrap_or_default();
                }
                if let Some(arg) = stmt.param(2) {
                    set_arg(&mut self.checked, Some(arg.trim_start_matches('&')), session, NAME, stmt);
                    if self.checked == Bindable::Literal(false) {
                        self.checked = Bindable::Empty;
                    }
                }
                if stmt.kind == StmtKind::IfCallThenCall {
                    self.on_change = Event::new(stmt.callee2.as_str());
                }
            }
            (StmtKind::IfCall, "ImGui::BeginMenu") if st.before_block(stmt) => {
                st.import_level = Some(stmt.level);
                set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
            }
            (StmtKind::Call, "ImGui::EndMenu") => {}
            (StmtKind::Call, "ImGui::Separator") if st.before_block(stmt) => self.separator = true,
            (StmtKind::Call, callee) if stmt.is_user_call() && st.before_block(stmt) => {
                self.owner_draw = true;
                self.on_change = Event::new(callee);
            }
            _ => return false,
        }
        true
    }

    property_table!(properties, properties_mut {
        "appearance.ownerDraw" => owner_draw,
        "behavior.label" => label,
        "behavior.shortcut" => shortcut,
        "behavior.separator" => separator,
        "bindings.checked" => checked,
    });

    property_table!(events, events_mut {
        "menuIt.change" => on_change,
    });

    fn rebind_vars(&mut self, session: &mut Session) {
        if self.checked.is_reference() {
            let name = session
                .vars
                .create_var("bool", "false", VarStorage::Interface, "checked");
            self.checked = Bindable::field(name);
        }
    }
}
