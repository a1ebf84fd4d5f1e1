//! Layout pass filling every widget's cached rectangle.
//!
//! Real rendering is done by a [`RenderBackend`]; the pass only places items
//! in ImGui's flow order (`SameLine` continues the previous line, overlay
//! children sit at their own position) and records where they ended up.

use crate::binding::{Bindable, Dimension};
use crate::widget::Widget;
use egui::{Pos2, Rect, Vec2, pos2, vec2};

/// Rendering collaborator measuring widgets.
pub trait RenderBackend {
    /// Size `w` takes when `avail` space is left in its parent.
    fn item_size(&mut self, w: &Widget, avail: Vec2) -> Vec2;

    /// Horizontal gap between items of one line, vertical gap between lines.
    fn item_spacing(&self) -> Vec2 {
        vec2(8.0, 4.0)
    }
}

/// Measures widgets from their literal size properties, falling back to the
/// kind's default size.
#[derive(Clone, Debug)]
pub struct LiteralSizes {
    pub spacing: Vec2,
}

impl Default for LiteralSizes {
    fn default() -> Self {
        Self {
            spacing: vec2(8.0, 4.0),
        }
    }
}

/// ImGui sizing: positive is fixed, negative is relative to the right or
/// bottom edge, zero or a bound value takes the default.
fn axis_size(value: &Bindable<Dimension>, avail: f32, default: f32) -> f32 {
    match value.value() {
        Some(Dimension(v)) if *v > 0.0 => *v,
        Some(Dimension(v)) if *v < 0.0 => (avail + v).max(0.0),
        _ => default,
    }
}

impl RenderBackend for LiteralSizes {
    fn item_size(&mut self, w: &Widget, avail: Vec2) -> Vec2 {
        let default = w.kind.default_size();
        match w.kind.as_node().size() {
            Some((x, y)) => vec2(
                axis_size(x, avail.x, default.x),
                axis_size(y, avail.y, default.y),
            ),
            None => default,
        }
    }

    fn item_spacing(&self) -> Vec2 {
        self.spacing
    }
}

/// Lays out `widgets` inside `area` and caches each rectangle, recursing into
/// children with the parent's rectangle as their area.
pub fn draw(widgets: &mut [Widget], area: Rect, backend: &mut dyn RenderBackend) {
    let spacing = backend.item_spacing();
    let mut line: Option<Rect> = None;
    let mut next_y = area.min.y;

    for w in widgets.iter_mut() {
        let overlay_pos = w.pos.value().map(|p| area.min + vec2(p.0.0, p.1.0));
        let min = match (overlay_pos, line) {
            (Some(pos), _) => pos,
            (None, Some(prev)) if w.same_line => pos2(prev.max.x + spacing.x, prev.min.y),
            (None, _) => pos2(area.min.x, next_y),
        };
        let avail = (area.max - min).max(Vec2::ZERO);
        let rect = Rect::from_min_size(min, backend.item_size(w, avail));
        log::trace!("{} at {:?}", w.type_name(), rect);
        w.cached_rect = Some(rect);

        if overlay_pos.is_none() {
            let line_rect = match line {
                Some(prev) if w.same_line => prev.union(rect),
                _ => rect,
            };
            next_y = line_rect.max.y + spacing.y;
            line = Some(line_rect);
        }
        draw(&mut w.children, rect, backend);
    }
}

/// Lays out a top-level tree starting at `origin` with `avail` space.
pub fn draw_at(widgets: &mut [Widget], origin: Pos2, avail: Vec2, backend: &mut dyn RenderBackend) {
    draw(widgets, Rect::from_min_size(origin, avail), backend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::widget::splitter::sash_geometry;
    use crate::widget::WidgetKind;

    fn widget(name: &str) -> Widget {
        Widget::from_kind(WidgetKind::named(name).unwrap())
    }

    #[test]
    fn test_flow_and_same_line() {
        let mut items = vec![widget("Text"), widget("Button"), widget("Button")];
        items[2].same_line = true;
        draw_at(&mut items, Pos2::ZERO, vec2(800.0, 600.0), &mut LiteralSizes::default());
        assert_eq!(items[0].cached_rect, Some(Rect::from_min_size(pos2(0.0, 0.0), vec2(140.0, 20.0))));
        assert_eq!(items[1].cached_rect, Some(Rect::from_min_size(pos2(0.0, 24.0), vec2(100.0, 24.0))));
        assert_eq!(items[2].cached_rect, Some(Rect::from_min_size(pos2(108.0, 24.0), vec2(100.0, 24.0))));
    }

    #[test]
    fn test_relative_sizes_and_overlay() {
        let mut child = widget("Child");
        assert!(child.set_property("layout.size_x", "-10"));
        assert!(child.set_property("layout.size_y", "0"));
        let mut overlay = widget("Text");
        assert!(overlay.set_property("layout.pos", "{ 5, 7 }"));
        child.children.push(overlay);
        child.children.push(widget("Text"));
        let mut items = vec![child];
        draw_at(&mut items, pos2(10.0, 10.0), vec2(400.0, 300.0), &mut LiteralSizes::default());

        let outer = items[0].cached_rect.unwrap();
        assert_eq!(outer, Rect::from_min_size(pos2(10.0, 10.0), vec2(390.0, 150.0)));
        // Overlay does not move the flow cursor
        assert_eq!(items[0].children[0].cached_rect.unwrap().min, pos2(15.0, 17.0));
        assert_eq!(items[0].children[1].cached_rect.unwrap().min, pos2(10.0, 10.0));
    }

    #[test]
    fn test_splitter_thickness_follows_layout() {
        let mut s = Session::default();
        s.create_vars = true;
        let mut sp = Widget::new(WidgetKind::named("Splitter").unwrap(), &mut s);
        let mut left = widget("Child");
        assert!(left.set_property("layout.size_x", "sashPos1"));
        let mut right = widget("Child");
        right.same_line = true;
        sp.children.push(left);
        sp.children.push(right);

        let mut items = vec![sp];
        let mut backend = LiteralSizes {
            spacing: vec2(6.0, 4.0),
        };
        draw_at(&mut items, Pos2::ZERO, vec2(800.0, 600.0), &mut backend);
        assert_eq!(sash_geometry(&items[0].children), (true, 6.0));
    }
}
