//! Build constraints.
//!
//! Decides which files of a directory take part in the build for one
//! target, the way `go/build` does: names starting with `_` or `.` are
//! ignored, `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` name suffixes must match,
//! and a `//go:build` line (or, without one, legacy `// +build` lines) in
//! the file header must evaluate to true.

use crate::errors::{Error, Result};
use std::collections::BTreeSet;
use std::env;
use std::path::Path;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target a package is loaded for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    pub cgo: bool,
    /// Extra satisfied tags, as given to `go build -tags`.
    pub tags: BTreeSet<String>,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            cgo: false,
            tags: BTreeSet::new(),
        }
    }

    /// The host target, overridden by `GOOS`, `GOARCH` and `CGO_ENABLED`
    /// like the go command.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());
        let goos = var("GOOS").unwrap_or_else(|| host_os().to_string());
        let goarch = var("GOARCH").unwrap_or_else(|| host_arch().to_string());
        let cgo = var("CGO_ENABLED").map_or(true, |v| v == "1");
        Self {
            goos,
            goarch,
            cgo,
            tags: BTreeSet::new(),
        }
    }

    /// Whether `tag` is satisfied for this target.
    pub fn match_tag(&self, tag: &str) -> bool {
        match tag {
            "ignore" => false,
            "gc" => true,
            "cgo" => self.cgo,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ if tag == self.goos || tag == self.goarch => true,
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ if is_release_tag(tag) => true,
            _ => self.tags.contains(tag),
        }
    }

    /// File-name rules: hidden and `_`-prefixed names, and platform suffixes.
    pub fn match_file_name(&self, name: &str) -> bool {
        if name.starts_with('_') || name.starts_with('.') {
            return false;
        }
        let stem = name.split('.').next().unwrap_or(name);
        let Some(start) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[start..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        match parts.as_slice() {
            [.., os, arch] if KNOWN_OS.contains(os) && KNOWN_ARCH.contains(arch) => {
                self.match_tag(os) && self.match_tag(arch)
            }
            [.., last] if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.match_tag(last)
            }
            _ => true,
        }
    }

    /// Evaluates the constraint lines in the header of `content`.
    pub fn match_header(&self, path: &Path, content: &str) -> Result<bool> {
        let mut plus_lines = Vec::new();
        for line in header_comments(content) {
            if let Some(expr) = line.strip_prefix("//go:build") {
                if !expr.is_empty() && !expr.starts_with([' ', '\t']) {
                    continue;
                }
                return parse_expr(expr)
                    .map(|expr| expr.eval(self))
                    .map_err(|e| Error::load_in(path, format!("parsing //go:build line: {}", e)));
            }
            if let Some(rest) = line.strip_prefix("//") {
                if let Some(terms) = rest.trim_start().strip_prefix("+build") {
                    if terms.is_empty() || terms.starts_with([' ', '\t']) {
                        plus_lines.push(terms.to_string());
                    }
                }
            }
        }
        Ok(plus_lines.iter().all(|line| self.match_plus_line(line)))
    }

    /// `// +build a,b !c` is `(a && b) || !c`; separate lines are and-ed.
    fn match_plus_line(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !tag.is_empty() && !self.match_tag(tag),
                None => !term.is_empty() && self.match_tag(term),
            })
        })
    }
}

/// `go1.N` release tags are all satisfied.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn host_os() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}

fn host_arch() -> &'static str {
    let little = cfg!(target_endian = "little");
    match env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        "wasm32" => "wasm",
        arch => arch,
    }
}

/// Line comments before the package clause. Block comments end the header
/// scan unless they close on the same line.
fn header_comments(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .take_while(|line| {
            line.is_empty()
                || line.starts_with("//")
                || (line.starts_with("/*") && line.ends_with("*/"))
        })
        .filter(|line| line.starts_with("//"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, ctx: &BuildContext) -> bool {
        match self {
            Expr::Tag(tag) => ctx.match_tag(tag),
            Expr::Not(inner) => !inner.eval(ctx),
            Expr::And(lhs, rhs) => lhs.eval(ctx) && rhs.eval(ctx),
            Expr::Or(lhs, rhs) => lhs.eval(ctx) || rhs.eval(ctx),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '!' => tokens.push(Token::Not),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '&' | '|' => {
                if chars.next_if(|&(_, next)| next == c).is_none() {
                    return Err(format!("unexpected {} at offset {}", c, i));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = c.to_string();
                while let Some((_, next)) =
                    chars.next_if(|&(_, n)| n.is_alphanumeric() || n == '_' || n == '.')
                {
                    tag.push(next);
                }
                tokens.push(Token::Tag(tag));
            }
            other => return Err(format!("invalid character {:?}", other)),
        }
    }
    Ok(tokens)
}

fn parse_expr(text: &str) -> std::result::Result<Expr, String> {
    let tokens = tokenize(text)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.or()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected {:?}", token)),
    }
}

/// Precedence climbing: `||` below `&&` below `!`.
struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> std::result::Result<Expr, String> {
        let mut expr = self.and()?;
        while self.eat(&Token::Or) {
            expr = Expr::Or(Box::new(expr), Box::new(self.and()?));
        }
        Ok(expr)
    }

    fn and(&mut self) -> std::result::Result<Expr, String> {
        let mut expr = self.not()?;
        while self.eat(&Token::And) {
            expr = Expr::And(Box::new(expr), Box::new(self.not()?));
        }
        Ok(expr)
    }

    fn not(&mut self) -> std::result::Result<Expr, String> {
        match self.next() {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.not()?))),
            Some(Token::Open) => {
                let expr = self.or()?;
                if self.eat(&Token::Close) {
                    Ok(expr)
                } else {
                    Err("missing )".to_string())
                }
            }
            Some(Token::Tag(tag)) => Ok(Expr::Tag(tag)),
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
