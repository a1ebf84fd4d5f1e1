use super::{Event, Node, Widget, property_table, set_size, size_arg};
use crate::binding::{Bindable, Dimension};
use crate::cpp::{Stmt, StmtKind};
use crate::export::{ExportParent, Exporter};
use crate::import::{ImportState, recognition_error, set_arg};
use crate::session::Session;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Text {
    pub text: Bindable<String>,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            text: Bindable::literal("Text".to_string()),
        }
    }
}

impl Node for Text {
    fn export(&self, _w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let arg = self.text.to_arg(ex.unit());
        ex.out.line(format!("ImGui::TextUnformatted({});", arg));
    }

    fn import(&mut self, stmt: &Stmt, _st: &mut ImportState, session: &mut Session) -> bool {
        if !stmt.is_call("ImGui::TextUnformatted") {
            return false;
        }
        set_arg(&mut self.text, stmt.param(0), session, "Text", stmt);
        true
    }

    property_table!(properties, properties_mut {
        "behavior.text" => text,
    });
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Button {
    pub label: Bindable<String>,
    pub size_x: Bindable<Dimension>,
    pub size_y: Bindable<Dimension>,
    pub on_click: Event,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            label: Bindable::literal("Button".to_string()),
            size_x: Bindable::literal(Dimension(0.0)),
            size_y: Bindable::literal(Dimension(0.0)),
            on_click: Event::default(),
        }
    }
}

impl Node for Button {
    fn export(&self, _w: &Widget, _parent: ExportParent<'_>, ex: &mut Exporter<'_>) {
        let unit = ex.unit();
        let call = format!(
            "ImGui::Button({}, {})",
            self.label.to_arg(unit),
            size_arg(&self.size_x, &self.size_y, unit)
        );
        match self.on_click.call() {
            Some(handler) => {
                ex.out.line(format!("if ({})", call));
                ex.out.body_line(handler);
            }
            None => ex.out.line(format!("{};", call)),
        }
    }

    fn import(&mut self, stmt: &Stmt, _st: &mut ImportState, session: &mut Session) -> bool {
        const NAME: &str = "Button";
        if stmt.callee != "ImGui::Button"
            || !matches!(stmt.kind, StmtKind::Call | StmtKind::IfCallThenCall)
        {
            return false;
        }
        set_arg(&mut self.label, stmt.param(0), session, NAME, stmt);
        if let Some(arg) = stmt.param(1) {
            if !set_size(&mut self.size_x, &mut self.size_y, arg) {
                recognition_error(session, NAME, stmt, "malformed size");
            }
        }
        if stmt.kind == StmtKind::IfCallThenCall {
            self.on_click = Event::new(stmt.callee2.as_str());
        }
        true
    }

    property_table!(properties, properties_mut {
        "behavior.label" => label,
        "layout.size_x" => size_x,
        "layout.size_y" => size_y,
    });

    property_table!(events, events_mut {
        "button.click" => on_click,
    });

    fn size(&self) -> Option<(&Bindable<Dimension>, &Bindable<Dimension>)> {
        Some((&self.size_x, &self.size_y))
    }
}
