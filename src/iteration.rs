//! Repetition of a block over rows, tabs or items.

use crate::binding::{Bindable, FieldRef};
use crate::config::Unit;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

static FOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^for\s*\(\s*(?:(int|size_t)\s+)?([A-Za-z_][\w.\[\]]*)\s*=\s*0\s*;\s*([A-Za-z_][\w.\[\]]*)\s*<\s*(.+?)\s*;\s*\+\+\s*([A-Za-z_][\w.\[\]]*)\s*\)$",
    )
    .unwrap()
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IterationDescriptor {
    /// Number of passes; empty or zero means a single pass without a loop
    pub limit: Bindable<i32>,
    /// Loop variable bound to a user field instead of a local
    pub index: Option<FieldRef>,
}

impl IterationDescriptor {
    pub fn is_empty(&self) -> bool {
        match &self.limit {
            Bindable::Empty => true,
            Bindable::Literal(n) => *n == 0,
            _ => false,
        }
    }

    /// Name of the loop variable, `default` unless bound to a field.
    pub fn index_name_or(&self, default: &str) -> String {
        match &self.index {
            Some(f) => f.to_string(),
            None => default.to_string(),
        }
    }

    /// Container whose `.size()` is the limit, e.g. `items` for `items.size()`.
    pub fn container_expr(&self) -> Option<&str> {
        match &self.limit {
            Bindable::Expr(e) => e
                .strip_suffix(".size()")
                .map(str::trim_end)
                .filter(|c| !c.is_empty()),
            _ => None,
        }
    }

    /// Loop header, empty for a single pass.
    pub fn to_arg(&self, for_var: &str) -> String {
        if self.is_empty() {
            return String::new();
        }
        let limit = self.limit.to_arg(Unit::Px);
        match &self.index {
            Some(f) => format!("for ({f} = 0; {f} < {}; ++{f})", limit),
            None => format!("for (int {v} = 0; {v} < {}; ++{v})", limit, v = for_var),
        }
    }

    /// Parses a loop header written by [`to_arg`](Self::to_arg).
    pub fn set_from_arg(&mut self, line: &str) -> bool {
        let Some(caps) = FOR_RE.captures(line.trim()) else {
            return false;
        };
        let var = &caps[2];
        if &caps[3] != var || &caps[5] != var {
            return false;
        }
        let mut limit = Bindable::default();
        if !limit.set_from_arg(&caps[4]) {
            return false;
        }
        self.index = if caps.get(1).is_some() {
            None
        } else {
            FieldRef::parse(var)
        };
        self.limit = limit;
        true
    }

    /// Indices of the passes; `resolve` evaluates a non-literal limit.
    pub fn iterations(&self, resolve: impl Fn(&str) -> Option<usize>) -> Range<usize> {
        if self.is_empty() {
            return 0..1;
        }
        let n = match &self.limit {
            Bindable::Literal(n) => usize::try_from(*n).unwrap_or(0),
            other => resolve(&other.to_arg(Unit::Px)).unwrap_or(0),
        };
        0..n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_loop() {
        let it = IterationDescriptor::default();
        assert!(it.is_empty());
        assert_eq!(it.to_arg("i"), "");
        assert_eq!(it.container_expr(), None);
        assert_eq!(it.iterations(|_| Some(5)), 0..1);

        let zero = IterationDescriptor {
            limit: Bindable::literal(0),
            index: None,
        };
        assert!(zero.is_empty());
    }

    #[test]
    fn test_container_bound() {
        let mut it = IterationDescriptor::default();
        assert!(it.limit.set_from_arg("items.size()"));
        assert!(!it.is_empty());
        assert_eq!(it.container_expr(), Some("items"));
        assert_eq!(it.to_arg("i"), "for (int i = 0; i < items.size(); ++i)");
        assert_eq!(it.iterations(|e| (e == "items.size()").then_some(3)), 0..3);
    }

    #[test]
    fn test_literal_limit() {
        let it = IterationDescriptor {
            limit: Bindable::literal(4),
            index: None,
        };
        assert_eq!(it.container_expr(), None);
        assert_eq!(it.iterations(|_| None), 0..4);
    }

    #[test]
    fn test_parse_header() {
        let mut it = IterationDescriptor::default();
        assert!(it.set_from_arg("for (int i = 0; i < items.size(); ++i)"));
        assert_eq!(it.limit, Bindable::expr("items.size()"));
        assert_eq!(it.index, None);

        assert!(it.set_from_arg("for (row = 0; row < rowCount; ++row)"));
        assert_eq!(it.limit, Bindable::field("rowCount"));
        assert_eq!(it.index, Some(FieldRef::new("row")));
        assert_eq!(it.to_arg("i"), "for (row = 0; row < rowCount; ++row)");
        assert_eq!(it.index_name_or("i"), "row");

        // Mismatched loop variables
        assert!(!it.set_from_arg("for (int i = 0; j < n; ++i)"));
        assert!(!it.set_from_arg("for (auto& x : items)"));
        // Failed parse leaves the descriptor untouched
        assert_eq!(it.index, Some(FieldRef::new("row")));
    }

    #[test]
    fn test_roundtrip_with_index_type_name() {
        let mut it = IterationDescriptor::default();
        assert!(it.set_from_arg("for (intCount = 0; intCount < 3; ++intCount)"));
        assert_eq!(it.index, Some(FieldRef::new("intCount")));
        assert_eq!(it.limit, Bindable::literal(3));
    }
}
