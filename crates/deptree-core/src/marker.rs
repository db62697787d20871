//! Environment markers: the `; python_version >= "3.8"` suffix of a
//! requirement deciding whether it applies to the inspected installation.

use std::collections::BTreeMap;
use std::fmt;

use deptree_util::errors::DeptreeError;

use crate::key::ProjectKey;
use crate::version::{Operator, SpecifierSet};

/// Marker variables compared as versions rather than strings.
const VERSION_VARIABLES: [&str; 3] = ["python_version", "python_full_version", "implementation_version"];

/// Values of the marker variables for the installation being inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerEnvironment {
    values: BTreeMap<String, String>,
}

impl MarkerEnvironment {
    /// An environment describing the host platform. Interpreter variables
    /// (`python_version`, ...) are left unset until an installation is found.
    pub fn host() -> Self {
        let (sys_platform, platform_system) = match std::env::consts::OS {
            "linux" => ("linux", "Linux"),
            "macos" => ("darwin", "Darwin"),
            "windows" => ("win32", "Windows"),
            other => (other, other),
        };
        let platform_machine = match (std::env::consts::OS, std::env::consts::ARCH) {
            ("macos", "aarch64") => "arm64",
            ("windows", "x86_64") => "AMD64",
            (_, arch) => arch,
        };
        let os_name = if cfg!(windows) { "nt" } else { "posix" };

        let mut env = Self::default();
        env.set("os_name", os_name);
        env.set("sys_platform", sys_platform);
        env.set("platform_system", platform_system);
        env.set("platform_machine", platform_machine);
        env.set("platform_python_implementation", "CPython");
        env.set("implementation_name", "cpython");
        env
    }

    pub fn set(&mut self, variable: &str, value: &str) {
        self.values.insert(variable.to_string(), value.to_string());
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    /// Apply overrides on top of this environment, later values winning.
    pub fn merge(&mut self, overrides: &BTreeMap<String, String>) {
        for (variable, value) in overrides {
            self.set(variable, value);
        }
    }
}

/// A value on either side of a marker comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerValue {
    Variable(String),
    Literal(String),
}

impl fmt::Display for MarkerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_str(name),
            Self::Literal(text) => write!(f, "\"{text}\""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOp {
    Compare(Operator),
    In,
    NotIn,
}

impl fmt::Display for MarkerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(op) => f.write_str(op.as_str()),
            Self::In => f.write_str("in"),
            Self::NotIn => f.write_str("not in"),
        }
    }
}

/// A parsed marker expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Compare {
        left: MarkerValue,
        op: MarkerOp,
        right: MarkerValue,
    },
    And(Box<Marker>, Box<Marker>),
    Or(Box<Marker>, Box<Marker>),
}

impl Marker {
    pub fn parse(text: &str) -> Result<Self, DeptreeError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            text,
        };
        let marker = parser.or_expr()?;
        if parser.pos != tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(marker)
    }

    /// `extra == "<name>"`, used for `requires.txt` section headers.
    pub fn extra(name: &str) -> Self {
        Self::Compare {
            left: MarkerValue::Variable("extra".to_string()),
            op: MarkerOp::Compare(Operator::Equal),
            right: MarkerValue::Literal(name.to_string()),
        }
    }

    pub fn and(self, other: Marker) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Evaluate against `env`, with the `extra` variable bound to `extra`
    /// (empty when evaluating the base requirements).
    pub fn evaluate(&self, env: &MarkerEnvironment, extra: &str) -> bool {
        match self {
            Self::And(a, b) => a.evaluate(env, extra) && b.evaluate(env, extra),
            Self::Or(a, b) => a.evaluate(env, extra) || b.evaluate(env, extra),
            Self::Compare { left, op, right } => compare(left, *op, right, env, extra),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Or(a, b) => write!(f, "{a} or {b}"),
            Self::And(a, b) => {
                for (i, side) in [a, b].into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    if matches!(**side, Self::Or(..)) {
                        write!(f, "({side})")?;
                    } else {
                        write!(f, "{side}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn compare(left: &MarkerValue, op: MarkerOp, right: &MarkerValue, env: &MarkerEnvironment, extra: &str) -> bool {
    // An unknown interpreter version matches every comparison.
    let unknown_interpreter = [left, right].into_iter().find_map(|v| match v {
        MarkerValue::Variable(name)
            if VERSION_VARIABLES.contains(&name.as_str()) && env.get(name).map_or(true, str::is_empty) =>
        {
            Some(name)
        }
        _ => None,
    });
    if let Some(name) = unknown_interpreter {
        tracing::trace!("{name} is unknown, treating the marker comparison as true");
        return true;
    }

    let involves_extra = [left, right]
        .iter()
        .any(|v| matches!(v, MarkerValue::Variable(name) if name == "extra"));
    let resolve = |value: &MarkerValue| -> String {
        let raw = match value {
            MarkerValue::Variable(name) if name == "extra" => extra.to_string(),
            MarkerValue::Variable(name) => env.get(name).unwrap_or_default().to_string(),
            MarkerValue::Literal(text) => text.clone(),
        };
        if involves_extra && !raw.is_empty() {
            ProjectKey::new(&raw).to_string()
        } else {
            raw
        }
    };
    let (lhs, rhs) = (resolve(left), resolve(right));

    match op {
        MarkerOp::In => rhs.contains(&lhs),
        MarkerOp::NotIn => !rhs.contains(&lhs),
        MarkerOp::Compare(operator) => {
            let is_version_variable = [left, right]
                .iter()
                .any(|v| matches!(v, MarkerValue::Variable(name) if VERSION_VARIABLES.contains(&name.as_str())));
            if is_version_variable {
                if let Ok(spec) = SpecifierSet::parse(&format!("{}{rhs}", operator.as_str())) {
                    return spec.matches(&lhs);
                }
            }
            match operator {
                Operator::Equal | Operator::Arbitrary => lhs == rhs,
                Operator::NotEqual => lhs != rhs,
                _ => {
                    tracing::trace!("cannot order-compare marker strings '{lhs}' {} '{rhs}'", operator.as_str());
                    false
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Word(String),
    Str(String),
    Op(Operator),
}

fn tokenize(text: &str) -> Result<Vec<Token>, DeptreeError> {
    let invalid = |why: String| DeptreeError::Requirement {
        message: format!("invalid marker '{}': {why}", text.trim()),
    };
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();
    while let Some(ch) = rest.chars().next() {
        match ch {
            '(' => {
                tokens.push(Token::LParen);
                rest = &rest[1..];
            }
            ')' => {
                tokens.push(Token::RParen);
                rest = &rest[1..];
            }
            '"' | '\'' => {
                let body = &rest[1..];
                let end = body
                    .find(ch)
                    .ok_or_else(|| invalid("unterminated string".to_string()))?;
                tokens.push(Token::Str(body[..end].to_string()));
                rest = &body[end + 1..];
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                tokens.push(Token::Word(rest[..end].to_string()));
                rest = &rest[end..];
            }
            _ => {
                let (op, tail) = Operator::strip(rest).ok_or_else(|| invalid(format!("unexpected '{ch}'")))?;
                tokens.push(Token::Op(op));
                rest = tail;
            }
        }
        rest = rest.trim_start();
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    text: &'a str,
}

impl Parser<'_> {
    fn error(&self, why: &str) -> DeptreeError {
        DeptreeError::Requirement {
            message: format!("invalid marker '{}': {why}", self.text.trim()),
        }
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token::Word(w)) if w == word)
    }

    fn or_expr(&mut self) -> Result<Marker, DeptreeError> {
        let mut marker = self.and_expr()?;
        while self.peek_word("or") {
            self.pos += 1;
            let rhs = self.and_expr()?;
            marker = Marker::Or(Box::new(marker), Box::new(rhs));
        }
        Ok(marker)
    }

    fn and_expr(&mut self) -> Result<Marker, DeptreeError> {
        let mut marker = self.atom()?;
        while self.peek_word("and") {
            self.pos += 1;
            let rhs = self.atom()?;
            marker = Marker::And(Box::new(marker), Box::new(rhs));
        }
        Ok(marker)
    }

    fn atom(&mut self) -> Result<Marker, DeptreeError> {
        if self.tokens.get(self.pos) == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or_expr()?;
            if self.tokens.get(self.pos) != Some(&Token::RParen) {
                return Err(self.error("missing ')'"));
            }
            self.pos += 1;
            return Ok(inner);
        }
        let left = self.value()?;
        let op = self.op()?;
        let right = self.value()?;
        Ok(Marker::Compare { left, op, right })
    }

    fn value(&mut self) -> Result<MarkerValue, DeptreeError> {
        let value = match self.tokens.get(self.pos) {
            Some(Token::Str(text)) => MarkerValue::Literal(text.clone()),
            Some(Token::Word(name)) if !matches!(name.as_str(), "and" | "or" | "in" | "not") => {
                MarkerValue::Variable(name.clone())
            }
            _ => return Err(self.error("expected a variable or a quoted string")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn op(&mut self) -> Result<MarkerOp, DeptreeError> {
        let op = match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => MarkerOp::Compare(*op),
            Some(Token::Word(w)) if w == "in" => MarkerOp::In,
            Some(Token::Word(w)) if w == "not" => {
                if !matches!(self.tokens.get(self.pos + 1), Some(Token::Word(w)) if w == "in") {
                    return Err(self.error("expected 'in' after 'not'"));
                }
                self.pos += 1;
                MarkerOp::NotIn
            }
            _ => return Err(self.error("expected a comparison operator")),
        };
        self.pos += 1;
        Ok(op)
    }
}
