//! Statement stream over generated (and hand edited) source.
//!
//! The lexer only understands the statement shapes the exporter writes:
//! calls, `if`/`for` headers with braced or single-statement bodies,
//! declarations, line comments and the function or type definitions that
//! enclose them. Preprocessor lines are skipped. Nesting levels come from
//! braces, never from indentation.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

static CALLEE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// `callee(params);`
    Call,
    /// `if (callee(params))` opening a block
    IfCall,
    /// `if (callee(params)) callee2(params2);`
    IfCallThenCall,
    /// `for (...)`, header text in `line`
    ForBlock,
    /// `if (cond)` with any other condition
    IfBlock,
    /// `// ...` line comment, full text in `line`
    Comment,
    /// Declarations, assignments, `continue;` and anything else
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub level: usize,
    pub callee: String,
    pub params: Vec<String>,
    pub callee2: String,
    pub params2: Vec<String>,
    pub cond: String,
    pub line: String,
    /// 1-based source line where the statement starts
    pub line_no: usize,
}

impl Stmt {
    fn new(kind: StmtKind, level: usize, line: String, line_no: usize) -> Self {
        Self {
            kind,
            level,
            callee: String::new(),
            params: Vec::new(),
            callee2: String::new(),
            params2: Vec::new(),
            cond: String::new(),
            line,
            line_no,
        }
    }

    pub fn is_call(&self, callee: &str) -> bool {
        self.kind == StmtKind::Call && self.callee == callee
    }

    pub fn is_if_call(&self, callee: &str) -> bool {
        self.kind == StmtKind::IfCall && self.callee == callee
    }

    /// Call of user code rather than the GUI library or its helpers.
    pub fn is_user_call(&self) -> bool {
        self.kind == StmtKind::Call
            && !self.callee.starts_with("ImGui::")
            && !self.callee.starts_with("ImRad::")
    }

    pub fn param(&self, i: usize) -> Option<&str> {
        self.params.get(i).map(String::as_str)
    }

    /// Text of a `/// @<tag> ...` comment after the tag, e.g. `Table` for `/// @begin Table`.
    pub fn tag(&self, tag: &str) -> Option<&str> {
        if self.kind != StmtKind::Comment {
            return None;
        }
        let rest = self.line.strip_prefix("///")?.trim_start();
        let rest = rest.strip_prefix('@')?.strip_prefix(tag)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        Some(rest.trim())
    }
}

/// Text read up to a statement boundary.
enum Piece {
    /// Terminated by `;`
    Statement(String),
    /// Definition header followed by its `{` body
    BlockHeader(String),
}

enum Frame {
    Brace,
    /// Unbraced body of an `if`/`for`; closes after one statement.
    Single { merge_into: Option<usize> },
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line_no: usize,
    frames: Vec<Frame>,
    stmts: Vec<Stmt>,
}

/// Splits source text into the flat statement stream consumed by import.
pub fn parse_stmts(src: &str) -> Result<Vec<Stmt>> {
    let mut lx = Lexer {
        chars: src.chars().collect(),
        pos: 0,
        line_no: 1,
        frames: Vec::new(),
        stmts: Vec::new(),
    };
    lx.run()?;
    Ok(lx.stmts)
}

impl Lexer {
    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line_no += 1;
        }
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn run(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            let Some(c) = self.peek() else { break };
            let line_no = self.line_no;

            if self.starts_with("//") {
                let mut text = String::new();
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                let level = self.depth();
                self.stmts
                    .push(Stmt::new(StmtKind::Comment, level, text.trim_end().to_string(), line_no));
            } else if self.starts_with("/*") {
                self.pos += 2;
                while !self.starts_with("*/") {
                    if self.bump().is_none() {
                        bail!("line {}: unterminated block comment", line_no);
                    }
                }
                self.pos += 2;
            } else if c == '{' {
                self.bump();
                self.frames.push(Frame::Brace);
            } else if c == '}' {
                self.bump();
                match self.frames.pop() {
                    Some(Frame::Brace) => self.complete(),
                    _ => bail!("line {}: unbalanced '}}'", line_no),
                }
            } else if c == '#' {
                self.skip_directive();
            } else if let Some(keyword) = self.header_keyword() {
                self.header(keyword, line_no)?;
            } else {
                match self.read_statement(line_no)? {
                    Piece::Statement(text) => self.statement(text, line_no),
                    Piece::BlockHeader(text) => {
                        let level = self.depth();
                        self.stmts.push(Stmt::new(StmtKind::Other, level, text, line_no));
                    }
                }
            }
        }

        if let Some(frame) = self.frames.last() {
            match frame {
                Frame::Brace => bail!("unexpected end of input: missing '}}'"),
                Frame::Single { .. } => bail!("unexpected end of input: missing statement"),
            }
        }
        Ok(())
    }

    fn header_keyword(&self) -> Option<&'static str> {
        for kw in ["if", "for", "while", "else"] {
            if !self.starts_with(kw) {
                continue;
            }
            let next = self.chars.get(self.pos + kw.len()).copied();
            if next.is_none_or(|c| !(c.is_alphanumeric() || c == '_')) {
                return Some(kw);
            }
        }
        None
    }

    fn header(&mut self, keyword: &'static str, line_no: usize) -> Result<()> {
        self.pos += keyword.len();
        self.skip_ws();
        let level = self.depth();

        let mut stmt = if keyword == "else" {
            Stmt::new(StmtKind::Other, level, "else".into(), line_no)
        } else {
            if self.peek() != Some('(') {
                bail!("line {}: expected '(' after '{}'", line_no, keyword);
            }
            let inner = self.read_group(line_no)?;
            let cond = inner.trim().to_string();
            let line = format!("{} ({})", keyword, cond);
            let mut stmt = if keyword == "for" {
                Stmt::new(StmtKind::ForBlock, level, line, line_no)
            } else if let Some((callee, params)) = parse_call(&cond).filter(|_| keyword == "if") {
                let mut s = Stmt::new(StmtKind::IfCall, level, line, line_no);
                s.callee = callee;
                s.params = params;
                s
            } else {
                Stmt::new(StmtKind::IfBlock, level, line, line_no)
            };
            stmt.cond = cond;
            stmt
        };

        self.skip_ws();
        let braced = self.peek() == Some('{');
        let merge_into = (stmt.kind == StmtKind::IfCall && !braced).then_some(self.stmts.len());
        if keyword == "while" {
            stmt.kind = StmtKind::Other;
        }
        self.stmts.push(stmt);
        if braced {
            self.bump();
            self.frames.push(Frame::Brace);
        } else {
            self.frames.push(Frame::Single { merge_into });
        }
        Ok(())
    }

    /// Reads a parenthesized group starting at '(' and returns its inside.
    fn read_group(&mut self, line_no: usize) -> Result<String> {
        let mut depth = 0usize;
        let mut text = String::new();
        while let Some(c) = self.bump() {
            match c {
                '"' | '\'' => {
                    text.push(c);
                    self.read_quoted(c, &mut text, line_no)?;
                    continue;
                }
                '(' => {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                _ => {}
            }
            text.push(c);
        }
        bail!("line {}: unterminated '('", line_no)
    }

    fn read_quoted(&mut self, quote: char, text: &mut String, line_no: usize) -> Result<()> {
        while let Some(c) = self.bump() {
            text.push(c);
            if c == '\\' {
                if let Some(n) = self.bump() {
                    text.push(n);
                }
            } else if c == quote {
                return Ok(());
            } else if c == '\n' {
                break;
            }
        }
        bail!("line {}: unterminated literal", line_no)
    }

    /// Skips a preprocessor line including backslash continuations.
    fn skip_directive(&mut self) {
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if c == '\n' && !escaped {
                break;
            }
            if !c.is_whitespace() {
                escaped = c == '\\';
            }
            self.bump();
        }
    }

    /// Reads up to the terminating ';' at bracket depth zero, or up to the
    /// `{` opening a definition body.
    fn read_statement(&mut self, line_no: usize) -> Result<Piece> {
        let mut depth = 0i32;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            match c {
                '"' | '\'' => {
                    self.bump();
                    text.push(c);
                    self.read_quoted(c, &mut text, line_no)?;
                    continue;
                }
                '{' if depth == 0 && opens_block(&text) => {
                    return Ok(Piece::BlockHeader(text.trim().to_string()));
                }
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    if depth == 0 {
                        bail!("line {}: missing ';' before '{}'", line_no, c);
                    }
                    depth -= 1;
                }
                ';' if depth == 0 => {
                    self.bump();
                    return Ok(Piece::Statement(text.trim().to_string()));
                }
                _ => {}
            }
            self.bump();
            text.push(c);
        }
        bail!("line {}: missing ';'", line_no)
    }

    fn statement(&mut self, text: String, line_no: usize) {
        let level = self.depth();
        let call = parse_call(&text);

        if let (Some((callee, params)), Some(Frame::Single { merge_into: Some(idx) })) =
            (&call, self.frames.last())
        {
            let idx = *idx;
            let head = &mut self.stmts[idx];
            head.kind = StmtKind::IfCallThenCall;
            head.callee2 = callee.clone();
            head.params2 = params.clone();
            head.line = format!("{} {};", head.line, text);
            self.complete();
            return;
        }

        let stmt = match call {
            Some((callee, params)) => {
                let mut s = Stmt::new(StmtKind::Call, level, format!("{};", text), line_no);
                s.callee = callee;
                s.params = params;
                s
            }
            None => Stmt::new(StmtKind::Other, level, text, line_no),
        };
        self.stmts.push(stmt);
        self.complete();
    }

    /// A statement or block finished: close the unbraced bodies it completes.
    fn complete(&mut self) {
        while let Some(Frame::Single { .. }) = self.frames.last() {
            self.frames.pop();
        }
    }
}

/// True when `head` starts a braced body rather than a brace initializer:
/// a function signature (`void W::Draw() const`) or a type/namespace header.
fn opens_block(head: &str) -> bool {
    const KEYWORDS: [&str; 7] = ["namespace", "class", "struct", "union", "enum", "do", "try"];
    let head = head.trim();
    if head
        .split_whitespace()
        .next()
        .is_some_and(|first| KEYWORDS.contains(&first))
    {
        return true;
    }
    let mut rest = head;
    while let Some(q) = ["const", "override", "final", "noexcept", "&"]
        .iter()
        .find(|q| rest.ends_with(**q))
    {
        rest = rest[..rest.len() - q.len()].trim_end();
    }
    rest.ends_with(')')
}

/// Parses `callee(a, b, c)` spanning the whole text.
pub fn parse_call(text: &str) -> Option<(String, Vec<String>)> {
    let text = text.trim();
    let open = text.find('(')?;
    let callee = text[..open].trim();
    if !CALLEE_RE.is_match(callee) || !text.ends_with(')') {
        return None;
    }
    let inner = &text[open + 1..text.len() - 1];
    // The first '(' must close exactly at the end
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in inner.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some((callee.to_string(), split_args(inner)))
}

/// Splits on top-level commas, respecting brackets and literals.
pub fn split_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut cur = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        if let Some(q) = quote {
            cur.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                args.push(cur.trim().to_string());
                cur.clear();
                continue;
            }
            _ => {}
        }
        cur.push(c);
    }
    if !cur.trim().is_empty() || !args.is_empty() {
        args.push(cur.trim().to_string());
    }
    args
}

/// Splits `{ x, y }` (or `ImVec2(x, y)`) into its two components.
pub fn parse_size(text: &str) -> Option<(String, String)> {
    let t = text.trim();
    let inner = if let Some(rest) = t.strip_prefix('{') {
        rest.strip_suffix('}')?
    } else {
        t.strip_prefix("ImVec2")?.trim_start().strip_prefix('(')?.strip_suffix(')')?
    };
    let parts = split_args(inner);
    match parts.as_slice() {
        [x, y] => Some((x.clone(), y.clone())),
        _ => None,
    }
}

pub fn is_cstr(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}
