//! Bindable values: a property is empty, a literal, a reference to a backing
//! variable or a free-form expression.

use crate::config::Unit;
use crate::cpp;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\[(.+)\])?$").unwrap());
static NUMBER_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\.?[0-9][A-Za-z0-9_.]*$").unwrap());
static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

const KEYWORDS: &[&str] = &["true", "false", "nullptr", "this", "sizeof", "int", "float", "auto"];

/// Uniform text access used by property lists: every property can be
/// rendered to and parsed from its source argument form.
pub trait PropertyValue {
    fn to_arg(&self, unit: Unit) -> String;
    /// Returns false when the text could not be accepted; the value is left untouched.
    fn set_from_arg(&mut self, arg: &str) -> bool;
}

/// A value type that has a literal spelling in generated source.
pub trait Literal: Clone + PartialEq + fmt::Debug {
    fn parse_literal(arg: &str) -> Option<Self>;
    fn literal_arg(&self, unit: Unit) -> String;
}

/// Length in design units, converted at the export boundary.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct Dimension(pub f32);

/// Two dimensions written as `{ x, y }`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct Dim2(pub Dimension, pub Dimension);

/// Packed 32-bit color written as a hex literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct Color(pub u32);

impl Dim2 {
    pub fn new(x: f32, y: f32) -> Self {
        Dim2(Dimension(x), Dimension(y))
    }
}

pub(crate) fn fmt_num(v: f32) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

pub(crate) fn parse_num(arg: &str) -> Option<f32> {
    let s = arg.trim();
    let s = match s.strip_suffix('f') {
        Some(rest) if rest.ends_with(|c: char| c.is_ascii_digit() || c == '.') => rest,
        _ => s,
    };
    s.parse::<f32>().ok()
}

/// Escapes text for a C string literal.
pub fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Reverses [`escape`] on the inside of a C string literal. Returns `None`
/// when an unescaped quote terminates the literal early.
pub fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            },
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

/// Single-token text that starts like a number, or an unterminated string.
fn looks_like_literal(s: &str) -> bool {
    if s.starts_with('"') {
        let mut quotes = 0;
        let mut escaped = false;
        for c in s.chars() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => quotes += 1,
                _ => escaped = false,
            }
        }
        return quotes % 2 == 1;
    }
    NUMBER_TOKEN_RE.is_match(s)
}

impl Literal for bool {
    fn parse_literal(arg: &str) -> Option<Self> {
        match arg {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn literal_arg(&self, _unit: Unit) -> String {
        self.to_string()
    }
}

impl Literal for i32 {
    fn parse_literal(arg: &str) -> Option<Self> {
        arg.parse().ok()
    }

    fn literal_arg(&self, _unit: Unit) -> String {
        self.to_string()
    }
}

impl Literal for f32 {
    fn parse_literal(arg: &str) -> Option<Self> {
        parse_num(arg)
    }

    fn literal_arg(&self, _unit: Unit) -> String {
        fmt_num(*self)
    }
}

impl Literal for String {
    fn parse_literal(arg: &str) -> Option<Self> {
        if !cpp::is_cstr(arg) {
            return None;
        }
        unescape(&arg[1..arg.len() - 1])
    }

    fn literal_arg(&self, _unit: Unit) -> String {
        format!("\"{}\"", escape(self))
    }
}

impl Literal for Dimension {
    fn parse_literal(arg: &str) -> Option<Self> {
        match arg.split_once('*') {
            Some((lhs, rhs)) => {
                let factor = rhs.trim();
                if factor != Unit::Dp.factor() && factor != Unit::Fs.factor() {
                    return None;
                }
                parse_num(lhs).map(Dimension)
            }
            None => parse_num(arg).map(Dimension),
        }
    }

    fn literal_arg(&self, unit: Unit) -> String {
        let v = self.0;
        if unit == Unit::Px || v == 0.0 || v == -1.0 {
            fmt_num(v)
        } else {
            format!("{}*{}", fmt_num(v), unit.factor())
        }
    }
}

impl Literal for Dim2 {
    fn parse_literal(arg: &str) -> Option<Self> {
        let (x, y) = cpp::parse_size(arg)?;
        Some(Dim2(
            Dimension::parse_literal(&x)?,
            Dimension::parse_literal(&y)?,
        ))
    }

    fn literal_arg(&self, unit: Unit) -> String {
        format!("{{ {}, {} }}", self.0.literal_arg(unit), self.1.literal_arg(unit))
    }
}

impl Literal for Color {
    fn parse_literal(arg: &str) -> Option<Self> {
        let hex = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X"))?;
        if hex.is_empty() || hex.len() > 8 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }

    fn literal_arg(&self, _unit: Unit) -> String {
        format!("0x{:08x}", self.0)
    }
}

/// Named backing variable, optionally indexed (`rows[i]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub name: String,
    pub index: Option<String>,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn parse(arg: &str) -> Option<Self> {
        let caps = FIELD_RE.captures(arg.trim())?;
        let name = caps.get(1)?.as_str();
        if KEYWORDS.contains(&name) {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            index: caps.get(2).map(|m| m.as_str().trim().to_string()),
        })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(idx) => write!(f, "{}[{}]", self.name, idx),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "t", content = "c")]
pub enum Bindable<T> {
    Empty,
    Literal(T),
    Field(FieldRef),
    Expr(String),
}

impl<T> Default for Bindable<T> {
    fn default() -> Self {
        Bindable::Empty
    }
}

impl<T: Literal> Bindable<T> {
    pub fn literal(value: T) -> Self {
        Bindable::Literal(value)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Bindable::Field(FieldRef::new(name))
    }

    pub fn expr(text: impl Into<String>) -> Self {
        Bindable::Expr(text.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Bindable::Empty)
    }

    pub fn has_value(&self) -> bool {
        matches!(self, Bindable::Literal(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Bindable::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Bindable::Field(_))
    }

    pub fn field_ref(&self) -> Option<&FieldRef> {
        match self {
            Bindable::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn to_arg(&self, unit: Unit) -> String {
        match self {
            Bindable::Empty => String::new(),
            Bindable::Literal(v) => v.literal_arg(unit),
            Bindable::Field(f) => f.to_string(),
            Bindable::Expr(e) => e.clone(),
        }
    }

    /// Classifies `arg` as literal, field reference or expression. Text that
    /// starts like a literal but does not parse as one is rejected.
    pub fn set_from_arg(&mut self, arg: &str) -> bool {
        let s = arg.trim();
        if s.is_empty() {
            *self = Bindable::Empty;
        } else if let Some(v) = T::parse_literal(s) {
            *self = Bindable::Literal(v);
        } else if looks_like_literal(s) {
            return false;
        } else if let Some(f) = FieldRef::parse(s) {
            *self = Bindable::Field(f);
        } else {
            *self = Bindable::Expr(s.to_string());
        }
        true
    }

    /// Variables the value depends on.
    pub fn used_variables(&self) -> Vec<String> {
        match self {
            Bindable::Field(f) => vec![f.name.clone()],
            Bindable::Expr(e) => expr_variables(e),
            _ => Vec::new(),
        }
    }
}

fn expr_variables(expr: &str) -> Vec<String> {
    let bytes = expr.as_bytes();
    let mut vars: Vec<String> = Vec::new();
    for m in IDENT_RE.find_iter(expr) {
        let before = expr[..m.start()].trim_end().chars().last();
        let after = expr[m.end()..].trim_start();
        if matches!(before, Some('.') | Some('>') | Some(':')) {
            continue;
        }
        if m.start() > 0 && bytes[m.start() - 1].is_ascii_digit() {
            continue;
        }
        if after.starts_with("::") || after.starts_with('(') {
            continue;
        }
        let name = m.as_str();
        if KEYWORDS.contains(&name) || vars.iter().any(|v| v == name) {
            continue;
        }
        vars.push(name.to_string());
    }
    vars
}

impl<T: Literal> PropertyValue for Bindable<T> {
    fn to_arg(&self, unit: Unit) -> String {
        Bindable::to_arg(self, unit)
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        Bindable::set_from_arg(self, arg)
    }
}

impl PropertyValue for bool {
    fn to_arg(&self, _unit: Unit) -> String {
        self.to_string()
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        match bool::parse_literal(arg.trim()) {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }
}

impl PropertyValue for i32 {
    fn to_arg(&self, _unit: Unit) -> String {
        self.to_string()
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        match arg.trim().parse() {
            Ok(v) => {
                *self = v;
                true
            }
            Err(_) => false,
        }
    }
}

impl PropertyValue for Dimension {
    fn to_arg(&self, unit: Unit) -> String {
        self.literal_arg(unit)
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        match Dimension::parse_literal(arg.trim()) {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }
}

impl PropertyValue for f32 {
    fn to_arg(&self, _unit: Unit) -> String {
        fmt_num(*self)
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        match parse_num(arg) {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }
}

impl PropertyValue for String {
    fn to_arg(&self, _unit: Unit) -> String {
        self.clone()
    }

    fn set_from_arg(&mut self, arg: &str) -> bool {
        *self = arg.trim().to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let mut b: Bindable<String> = Bindable::default();
        assert!(b.is_empty());

        assert!(b.set_from_arg("\"Name\""));
        assert_eq!(b, Bindable::Literal("Name".to_string()));

        assert!(b.set_from_arg("title"));
        assert_eq!(b, Bindable::field("title"));

        assert!(b.set_from_arg("names[i]"));
        assert_eq!(
            b.field_ref(),
            Some(&FieldRef {
                name: "names".into(),
                index: Some("i".into())
            })
        );

        assert!(b.set_from_arg("item.name.c_str()"));
        assert_eq!(b, Bindable::expr("item.name.c_str()"));

        assert!(b.set_from_arg(""));
        assert!(b.is_empty());
    }

    #[test]
    fn test_empty_is_not_false() {
        let mut b: Bindable<bool> = Bindable::default();
        assert!(b.set_from_arg("false"));
        assert!(!b.is_empty());
        assert_eq!(b.value(), Some(&false));
    }

    #[test]
    fn test_malformed_literal_rejected() {
        let mut b: Bindable<Color> = Bindable::literal(Color(0xff00ff00));
        assert!(!b.set_from_arg("0xZZ"));
        // Left untouched
        assert_eq!(b, Bindable::literal(Color(0xff00ff00)));

        let mut d: Bindable<Dimension> = Bindable::default();
        assert!(!d.set_from_arg("1.2.3"));
        assert!(d.is_empty());
    }

    #[test]
    fn test_dimension_units() {
        let d = Dimension(20.0);
        assert_eq!(d.literal_arg(Unit::Px), "20");
        assert_eq!(d.literal_arg(Unit::Dp), "20*dp");
        assert_eq!(Dimension(-1.0).literal_arg(Unit::Dp), "-1");
        assert_eq!(Dimension(2.5).literal_arg(Unit::Fs), "2.5*fs");

        assert_eq!(Dimension::parse_literal("20*dp"), Some(Dimension(20.0)));
        assert_eq!(Dimension::parse_literal("2.5f * fs"), Some(Dimension(2.5)));
        assert_eq!(Dimension::parse_literal("-1"), Some(Dimension(-1.0)));
        assert_eq!(Dimension::parse_literal("20*scale"), None);
    }

    #[test]
    fn test_dim2_literal() {
        let v = Dim2::new(4.0, 2.0);
        assert_eq!(v.literal_arg(Unit::Px), "{ 4, 2 }");
        assert_eq!(Dim2::parse_literal("{ 4, 2 }"), Some(v));

        let mut b: Bindable<Dim2> = Bindable::default();
        assert!(b.set_from_arg("{ 4*dp, 2*dp }"));
        assert_eq!(b.value(), Some(&v));
    }

    #[test]
    fn test_color_literal() {
        let c = Color(0xff336699);
        assert_eq!(c.literal_arg(Unit::Px), "0xff336699");
        assert_eq!(Color::parse_literal("0xff336699"), Some(c));
        assert_eq!(Color::parse_literal("0x"), None);
    }

    #[test]
    fn test_string_escape_roundtrip() {
        let s = "say \"hi\"\\now".to_string();
        let arg = s.literal_arg(Unit::Px);
        assert_eq!(arg, "\"say \\\"hi\\\"\\\\now\"");
        assert_eq!(String::parse_literal(&arg), Some(s));
        // Two adjacent literals are not a single literal
        assert_eq!(String::parse_literal("\"a\" \"b\""), None);
    }

    #[test]
    fn test_used_variables() {
        let b: Bindable<Dimension> = Bindable::field("sashPos");
        assert_eq!(b.used_variables(), vec!["sashPos".to_string()]);

        let e: Bindable<Dimension> = Bindable::expr("sashPos - 20*dp");
        assert_eq!(e.used_variables(), vec!["sashPos".to_string(), "dp".to_string()]);

        let e: Bindable<i32> = Bindable::expr("items.size()");
        assert_eq!(e.used_variables(), vec!["items".to_string()]);

        let e: Bindable<Dimension> = Bindable::expr("ImGui::GetFrameHeight() + pad");
        assert_eq!(e.used_variables(), vec!["pad".to_string()]);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-1.0), "-1");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(parse_num("1.5f"), Some(1.5));
        assert_eq!(parse_num("0"), Some(0.0));
    }
}
