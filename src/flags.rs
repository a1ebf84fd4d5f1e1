//! Flag sets: a bitmask value plus the ordered options one widget instance
//! allows, written to source as `Prefix_A | Prefix_B`.

use crate::binding::PropertyValue;
use crate::config::Unit;
use bitflags::Flags;
use serde::{Serialize, Serializer};
use std::fmt;

/// A bitflags type whose options map onto `<PREFIX><CamelName>` symbols.
pub trait FlagFamily: Flags<Bits = u32> + Copy + PartialEq + fmt::Debug + 'static {
    const PREFIX: &'static str;
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableFlags: u32 {
        const RESIZABLE = 1 << 0;
        const REORDERABLE = 1 << 1;
        const HIDEABLE = 1 << 2;
        const SORTABLE = 1 << 3;
        const CONTEXT_MENU_IN_BODY = 1 << 4;
        const ROW_BG = 1 << 5;
        const BORDERS_INNER_H = 1 << 6;
        const BORDERS_INNER_V = 1 << 7;
        const BORDERS_OUTER_H = 1 << 8;
        const BORDERS_OUTER_V = 1 << 9;
        const SIZING_FIXED_FIT = 1 << 10;
        const SIZING_FIXED_SAME = 1 << 11;
        const SIZING_STRETCH_SAME = 1 << 12;
        const PAD_OUTER_X = 1 << 13;
        const NO_PAD_OUTER_X = 1 << 14;
        const NO_PAD_INNER_X = 1 << 15;
        const SCROLL_X = 1 << 16;
        const SCROLL_Y = 1 << 17;
        const HIGHLIGHT_HOVERED_COLUMN = 1 << 18;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableColumnFlags: u32 {
        const WIDTH_FIXED = 1 << 0;
        const WIDTH_STRETCH = 1 << 1;
        const ANGLED_HEADER = 1 << 2;
        const DEFAULT_HIDE = 1 << 3;
        const DEFAULT_SORT = 1 << 4;
        const NO_CLIP = 1 << 5;
        const NO_HEADER_LABEL = 1 << 6;
        const NO_HEADER_WIDTH = 1 << 7;
        const NO_HIDE = 1 << 8;
        const NO_RESIZE = 1 << 9;
        const NO_SORT = 1 << 10;
        const NO_SORT_ASCENDING = 1 << 11;
        const NO_SORT_DESCENDING = 1 << 12;
        const DISABLED = 1 << 13;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChildFlags: u32 {
        const BORDERS = 1 << 0;
        const ALWAYS_USE_WINDOW_PADDING = 1 << 1;
        const RESIZE_X = 1 << 2;
        const RESIZE_Y = 1 << 3;
        const AUTO_RESIZE_X = 1 << 4;
        const AUTO_RESIZE_Y = 1 << 5;
        const ALWAYS_AUTO_RESIZE = 1 << 6;
        const FRAME_STYLE = 1 << 7;
        const NAV_FLATTENED = 1 << 8;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        const NO_TITLE_BAR = 1 << 0;
        const NO_SCROLLBAR = 1 << 1;
        const ALWAYS_AUTO_RESIZE = 1 << 2;
        const NO_BACKGROUND = 1 << 3;
        const NO_SAVED_SETTINGS = 1 << 4;
        const MENU_BAR = 1 << 5;
        const ALWAYS_HORIZONTAL_SCROLLBAR = 1 << 6;
        const ALWAYS_VERTICAL_SCROLLBAR = 1 << 7;
        const NO_NAV_INPUTS = 1 << 8;
        const NO_NAV_FOCUS = 1 << 9;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TreeNodeFlags: u32 {
        const DEFAULT_OPEN = 1 << 0;
        const OPEN_ON_DOUBLE_CLICK = 1 << 1;
        const OPEN_ON_ARROW = 1 << 2;
        const LEAF = 1 << 3;
        const BULLET = 1 << 4;
        const FRAME_PADDING = 1 << 5;
        const NO_TREE_PUSH_ON_OPEN = 1 << 6;
        const SPAN_AVAIL_WIDTH = 1 << 7;
        const SPAN_FULL_WIDTH = 1 << 8;
        const SPAN_TEXT_WIDTH = 1 << 9;
        const SPAN_ALL_COLUMNS = 1 << 10;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TabBarFlags: u32 {
        const REORDERABLE = 1 << 0;
        const TAB_LIST_POPUP_BUTTON = 1 << 1;
        const NO_TAB_LIST_SCROLLING_BUTTONS = 1 << 2;
        const DRAW_SELECTED_OVERLINE = 1 << 3;
        const FITTING_POLICY_RESIZE_DOWN = 1 << 4;
        const FITTING_POLICY_SCROLL = 1 << 5;
    }
}

impl FlagFamily for TableFlags {
    const PREFIX: &'static str = "ImGuiTableFlags_";
}
impl FlagFamily for TableColumnFlags {
    const PREFIX: &'static str = "ImGuiTableColumnFlags_";
}
impl FlagFamily for ChildFlags {
    const PREFIX: &'static str = "ImGuiChildFlags_";
}
impl FlagFamily for WindowFlags {
    const PREFIX: &'static str = "ImGuiWindowFlags_";
}
impl FlagFamily for TreeNodeFlags {
    const PREFIX: &'static str = "ImGuiTreeNodeFlags_";
}
impl FlagFamily for TabBarFlags {
    const PREFIX: &'static str = "ImGuiTabBarFlags_";
}

/// `SIZING_FIXED_FIT` -> `SizingFixedFit`
fn camel(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Source symbol of a single registered flag.
pub fn symbol<F: FlagFamily>(flag: F) -> String {
    let name = F::FLAGS
        .iter()
        .find(|f| f.value().bits() == flag.bits())
        .map(|f| f.name())
        .unwrap_or("None");
    format!("{}{}", F::PREFIX, camel(name))
}

/// Legal-combination rule checked on every mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlagRule<F> {
    /// At most one of the flags in the mask
    Exclusive(F),
    /// `flag` is only legal together with at least one of `any_of`
    Requires { flag: F, any_of: F },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlagOption<F> {
    pub flag: F,
    pub symbol: String,
    /// Starts a new group in editor listings
    pub group_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// Option is not registered for this instance
    Unregistered(String),
    /// Two options of an exclusive group are set
    Conflict(String, String),
    /// Option is set without any of its prerequisites
    MissingPrerequisite(String),
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagError::Unregistered(s) => write!(f, "flag {} is not available here", s),
            FlagError::Conflict(a, b) => write!(f, "flags {} and {} are mutually exclusive", a, b),
            FlagError::MissingPrerequisite(s) => write!(f, "flag {} has no effect on its own", s),
        }
    }
}

impl std::error::Error for FlagError {}

#[derive(Clone, Debug, PartialEq)]
pub struct FlagSet<F: FlagFamily> {
    value: F,
    default: F,
    options: Vec<FlagOption<F>>,
    rules: Vec<FlagRule<F>>,
    next_group: bool,
}

impl<F: FlagFamily> FlagSet<F> {
    pub fn new(default: F) -> Self {
        Self {
            value: default,
            default,
            options: Vec::new(),
            rules: Vec::new(),
            next_group: false,
        }
    }

    /// Registers an option.
    pub fn add(mut self, flag: F) -> Self {
        self.options.push(FlagOption {
            flag,
            symbol: symbol(flag),
            group_start: std::mem::take(&mut self.next_group),
        });
        self
    }

    /// Starts a new visual group with the next option.
    pub fn separator(mut self) -> Self {
        self.next_group = !self.options.is_empty();
        self
    }

    pub fn rule(mut self, rule: FlagRule<F>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn options(&self) -> &[FlagOption<F>] {
        &self.options
    }

    pub fn value(&self) -> F {
        self.value
    }

    pub fn default_value(&self) -> F {
        self.default
    }

    pub fn contains(&self, flag: F) -> bool {
        self.value.contains(flag)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Differs from the type's default, which need not be zero.
    pub fn is_modified(&self) -> bool {
        self.value != self.default
    }

    fn is_registered(&self, flag: F) -> bool {
        self.options.iter().any(|o| o.flag == flag)
    }

    /// Turns one registered option on or off, then applies the rules so the
    /// value stays a legal combination.
    pub fn set(&mut self, flag: F, on: bool) -> Result<(), FlagError> {
        if !self.is_registered(flag) {
            return Err(FlagError::Unregistered(symbol(flag)));
        }
        if !on {
            self.value.remove(flag);
            for rule in &self.rules {
                if let FlagRule::Requires { flag: dep, any_of } = *rule {
                    if !self.value.intersects(any_of) {
                        self.value.remove(dep);
                    }
                }
            }
            return Ok(());
        }
        for rule in &self.rules {
            match *rule {
                FlagRule::Exclusive(mask) if mask.contains(flag) => {
                    self.value.remove(mask);
                }
                FlagRule::Requires { flag: dep, any_of } if dep == flag => {
                    if !self.value.intersects(any_of) {
                        self.value.insert(any_of);
                    }
                }
                _ => {}
            }
        }
        self.value.insert(flag);
        Ok(())
    }

    /// Checks the current value against the rules.
    pub fn validate(&self) -> Result<(), FlagError> {
        for rule in &self.rules {
            match *rule {
                FlagRule::Exclusive(mask) => {
                    let mut set = self
                        .options
                        .iter()
                        .filter(|o| mask.contains(o.flag) && self.value.contains(o.flag));
                    if let (Some(a), Some(b)) = (set.next(), set.next()) {
                        return Err(FlagError::Conflict(a.symbol.clone(), b.symbol.clone()));
                    }
                }
                FlagRule::Requires { flag, any_of } => {
                    if self.value.contains(flag) && !self.value.intersects(any_of) {
                        return Err(FlagError::MissingPrerequisite(symbol(flag)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Registered options joined with `|`, or `<Prefix>None`.
    pub fn to_arg(&self) -> String {
        let terms: Vec<&str> = self
            .options
            .iter()
            .filter(|o| self.value.contains(o.flag))
            .map(|o| o.symbol.as_str())
            .collect();
        if terms.is_empty() {
            format!("{}None", F::PREFIX)
        } else {
            terms.join(" | ")
        }
    }

    /// Parses a `|`-joined expression against the registered symbols.
    /// Matched terms are applied; returns false if any term was unknown.
    pub fn set_from_arg(&mut self, arg: &str) -> bool {
        let (value, unknown) = self.parse_terms(arg);
        self.value = value;
        unknown.is_empty()
    }

    /// Terms of `arg` that match no registered symbol.
    pub fn unknown_terms(&self, arg: &str) -> Vec<String> {
        self.parse_terms(arg).1
    }

    fn parse_terms(&self, arg: &str) -> (F, Vec<String>) {
        let mut value = F::empty();
        let mut unknown = Vec::new();
        let none = format!("{}None", F::PREFIX);
        for term in arg.split('|').map(str::trim) {
            if term.is_empty() || term == "0" || term == none {
                continue;
            }
            match self.options.iter().find(|o| o.symbol == term) {
                Some(o) => value.insert(o.flag),
                None => unknown.push(term.to_string()),
            }
        }
        (value, unknown)
    }
}

impl<F: FlagFamily> PropertyValue for FlagSet<F> {
    fn to_arg(&self, _unit: Unit) -> String {
        FlagSet::to_arg(self)
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        FlagSet::set_from_arg(self, arg)
    }
}

impl<F: FlagFamily> Serialize for FlagSet<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_like() -> FlagSet<TableFlags> {
        FlagSet::new(TableFlags::ROW_BG | TableFlags::BORDERS_OUTER_H)
            .add(TableFlags::RESIZABLE)
            .separator()
            .add(TableFlags::ROW_BG)
            .add(TableFlags::BORDERS_OUTER_H)
            .separator()
            .add(TableFlags::SIZING_FIXED_FIT)
            .add(TableFlags::SIZING_STRETCH_SAME)
            .rule(FlagRule::Exclusive(
                TableFlags::SIZING_FIXED_FIT | TableFlags::SIZING_STRETCH_SAME,
            ))
    }

    #[test]
    fn test_symbol_names() {
        assert_eq!(symbol(TableFlags::SIZING_FIXED_FIT), "ImGuiTableFlags_SizingFixedFit");
        assert_eq!(symbol(TableFlags::BORDERS_INNER_H), "ImGuiTableFlags_BordersInnerH");
        assert_eq!(symbol(ChildFlags::AUTO_RESIZE_Y), "ImGuiChildFlags_AutoResizeY");
        assert_eq!(
            symbol(TabBarFlags::NO_TAB_LIST_SCROLLING_BUTTONS),
            "ImGuiTabBarFlags_NoTabListScrollingButtons"
        );
    }

    #[test]
    fn test_to_arg_order_and_none() {
        let mut f = table_like();
        assert_eq!(f.to_arg(), "ImGuiTableFlags_RowBg | ImGuiTableFlags_BordersOuterH");
        f.set_from_arg("0");
        assert!(f.is_empty());
        assert_eq!(f.to_arg(), "ImGuiTableFlags_None");
    }

    #[test]
    fn test_default_invariance() {
        let f = table_like();
        let mut g = table_like();
        g.set_from_arg("ImGuiTableFlags_None");
        assert!(g.set_from_arg(&f.to_arg()));
        assert_eq!(g.value(), f.default_value());
        assert!(!g.is_modified());
    }

    #[test]
    fn test_unknown_terms_reported() {
        let mut f = table_like();
        assert!(!f.set_from_arg("ImGuiTableFlags_Resizable | ImGuiTableFlags_Bogus"));
        // Known terms are kept
        assert!(f.contains(TableFlags::RESIZABLE));
        assert_eq!(f.unknown_terms("ImGuiTableFlags_Bogus | 0"), vec!["ImGuiTableFlags_Bogus"]);
        // Unregistered option of a known family is unknown too
        assert_eq!(f.unknown_terms("ImGuiTableFlags_ScrollX").len(), 1);
    }

    #[test]
    fn test_modified_against_default() {
        let mut f = table_like();
        assert!(!f.is_modified());
        f.set(TableFlags::ROW_BG, false).unwrap();
        assert!(f.is_modified());
        f.set(TableFlags::ROW_BG, true).unwrap();
        assert!(!f.is_modified());
    }

    #[test]
    fn test_exclusive_rule() {
        let mut f = table_like();
        f.set(TableFlags::SIZING_FIXED_FIT, true).unwrap();
        f.set(TableFlags::SIZING_STRETCH_SAME, true).unwrap();
        assert!(!f.contains(TableFlags::SIZING_FIXED_FIT));
        assert!(f.validate().is_ok());

        f.set_from_arg("ImGuiTableFlags_SizingFixedFit | ImGuiTableFlags_SizingStretchSame");
        assert!(matches!(f.validate(), Err(FlagError::Conflict(_, _))));
    }

    #[test]
    fn test_requires_rule() {
        let mut f = FlagSet::new(ChildFlags::empty())
            .add(ChildFlags::AUTO_RESIZE_X)
            .add(ChildFlags::AUTO_RESIZE_Y)
            .add(ChildFlags::ALWAYS_AUTO_RESIZE)
            .rule(FlagRule::Requires {
                flag: ChildFlags::ALWAYS_AUTO_RESIZE,
                any_of: ChildFlags::AUTO_RESIZE_X | ChildFlags::AUTO_RESIZE_Y,
            });
        f.set(ChildFlags::ALWAYS_AUTO_RESIZE, true).unwrap();
        assert!(f.contains(ChildFlags::AUTO_RESIZE_X | ChildFlags::AUTO_RESIZE_Y));

        f.set(ChildFlags::AUTO_RESIZE_X, false).unwrap();
        assert!(f.contains(ChildFlags::ALWAYS_AUTO_RESIZE));
        f.set(ChildFlags::AUTO_RESIZE_Y, false).unwrap();
        assert!(!f.contains(ChildFlags::ALWAYS_AUTO_RESIZE));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_unregistered_set_rejected() {
        let mut f = table_like();
        let err = f.set(TableFlags::SCROLL_Y, true).unwrap_err();
        assert_eq!(err, FlagError::Unregistered("ImGuiTableFlags_ScrollY".into()));
        assert!(!f.contains(TableFlags::SCROLL_Y));
    }

    #[test]
    fn test_group_starts() {
        let f = table_like();
        let groups: Vec<bool> = f.options().iter().map(|o| o.group_start).collect();
        assert_eq!(groups, vec![false, true, false, true, false]);
    }
}
