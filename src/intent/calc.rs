//! Calculator intent.
//!
//! Expressions are tokenized and parsed into a fixed AST, then evaluated.
//! Only numbers, the operators `+ - * / ^ % × ÷`, the constants `pi`/`tau`
//! and the functions in [`Func`] exist; any other identifier rejects the
//! whole input.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := postfix ('^' unary)?
//! postfix := primary ('%' ('of' power)?)?
//! primary := number | constant | func '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! A `%` right after an operand is a percentage unless an operand follows it,
//! in which case it is the remainder operator.
//!
//! Input is bounded twice: at most [`MAX_TOKENS`] tokens, and at most
//! [`MAX_DEPTH`] nested unary/power levels while parsing. Both keep the
//! recursive parser and evaluator well inside the stack.

use super::IntentMatcher;
use crate::action::Action;
use lazy_static::lazy_static;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::f64::consts::{PI, TAU};

lazy_static! {
    static ref RE_EQ: Regex = Regex::new(r"^=\s*(.+)").unwrap();
    static ref RE_CALC: Regex = Regex::new(r"(?i)^calc(?:ulate)?\s+(.+)").unwrap();
    static ref RE_BARE_START: Regex = Regex::new(r"^[\d(]").unwrap();
    static ref RE_OPERATOR: Regex = Regex::new(r"[+\-*/^%×÷]").unwrap();
    static ref RE_DIGIT: Regex = Regex::new(r"\d").unwrap();
    static ref RE_ONLY_DIGITS: Regex = Regex::new(r"^\d+$").unwrap();
    static ref RE_SEPARATORS: Regex = Regex::new(r"[\s,]").unwrap();
    static ref RE_FUNC_CALL: Regex = Regex::new(r"(?i)^([a-z][a-z0-9]*)\s*\(").unwrap();
}

/// Longest token stream the evaluator accepts.
pub const MAX_TOKENS: usize = 512;

/// Deepest nesting of parentheses, signs and exponents the parser descends.
pub const MAX_DEPTH: usize = 128;

pub struct Calculation;

impl IntentMatcher for Calculation {
    fn name(&self) -> &'static str {
        "calculation"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let q = query.trim();
        let expr = extract_expression(q)?;
        let value = evaluate(expr)?;

        let formatted = format_display(value);
        let raw = format_raw(value);

        Some(vec![Action::smart_copy(
            "smart-calc",
            format!("= {}", formatted),
            format!("{} = {}", expr.trim(), raw),
            "Calculator",
            raw,
        )])
    }
}

fn extract_expression(q: &str) -> Option<&str> {
    let mut expr = None;

    if let Some(c) = RE_EQ.captures(q) {
        expr = c.get(1).map(|m| m.as_str());
    }
    if let Some(c) = RE_CALC.captures(q) {
        expr = c.get(1).map(|m| m.as_str());
    }
    if expr.is_some() {
        return expr;
    }

    let arithmetic = RE_BARE_START.is_match(q)
        && RE_OPERATOR.is_match(q)
        && RE_DIGIT.is_match(q)
        && !RE_ONLY_DIGITS.is_match(&RE_SEPARATORS.replace_all(q, ""));
    let function_call = RE_FUNC_CALL
        .captures(q)
        .and_then(|c| c.get(1))
        .is_some_and(|m| Func::from_name(m.as_str()).is_some());

    (arithmetic || function_call).then_some(q)
}

/// Parse and evaluate an expression. `None` for anything outside the grammar
/// or a non-finite result.
pub fn evaluate(expr: &str) -> Option<f64> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() || tokens.len() > MAX_TOKENS {
        return None;
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let ast = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    let value = ast.eval()?;
    value.is_finite().then_some(value)
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(text.parse().ok()?));
            }
            'a'..='z' | 'A'..='Z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(text.to_ascii_lowercase()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            _ => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' | '×' => Token::Star,
                    '/' | '÷' => Token::Slash,
                    '^' => Token::Caret,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => return None,
                });
                i += 1;
            }
        }
    }

    Some(tokens)
}

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sqrt,
    Cbrt,
    Sin,
    Cos,
    Tan,
    Abs,
    Ceil,
    Floor,
    Round,
    Log2,
    Log10,
    Exp,
    Min,
    Max,
    Pow,
    Asin,
    Acos,
    Atan,
    Sign,
    Trunc,
    Hypot,
    Ln,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        let f = match name.to_ascii_lowercase().as_str() {
            "sqrt" => Func::Sqrt,
            "cbrt" => Func::Cbrt,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "abs" => Func::Abs,
            "ceil" => Func::Ceil,
            "floor" => Func::Floor,
            "round" => Func::Round,
            "log2" => Func::Log2,
            "log10" | "log" => Func::Log10,
            "exp" => Func::Exp,
            "min" => Func::Min,
            "max" => Func::Max,
            "pow" => Func::Pow,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "sign" => Func::Sign,
            "trunc" => Func::Trunc,
            "hypot" => Func::Hypot,
            "ln" => Func::Ln,
            _ => return None,
        };
        Some(f)
    }

    fn apply(self, args: &[f64]) -> Option<f64> {
        let unary = |f: fn(f64) -> f64| match args {
            [x] => Some(f(*x)),
            _ => None,
        };
        match self {
            Func::Sqrt => unary(f64::sqrt),
            Func::Cbrt => unary(f64::cbrt),
            Func::Sin => unary(f64::sin),
            Func::Cos => unary(f64::cos),
            Func::Tan => unary(f64::tan),
            Func::Abs => unary(f64::abs),
            Func::Ceil => unary(f64::ceil),
            Func::Floor => unary(f64::floor),
            // halves round toward positive infinity
            Func::Round => unary(|x| (x + 0.5).floor()),
            Func::Log2 => unary(f64::log2),
            Func::Log10 => unary(f64::log10),
            Func::Exp => unary(f64::exp),
            Func::Asin => unary(f64::asin),
            Func::Acos => unary(f64::acos),
            Func::Atan => unary(f64::atan),
            Func::Sign => unary(|x| if x == 0.0 { 0.0 } else { x.signum() }),
            Func::Trunc => unary(f64::trunc),
            Func::Ln => unary(f64::ln),
            Func::Pow => match args {
                [base, exp] => Some(base.powf(*exp)),
                _ => None,
            },
            Func::Min => (!args.is_empty()).then(|| args.iter().copied().fold(f64::INFINITY, f64::min)),
            Func::Max => (!args.is_empty()).then(|| args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Func::Hypot => Some(args.iter().map(|x| x * x).sum::<f64>().sqrt()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    Percent(Box<Expr>),
    /// `N% of M`, evaluated as `N * M / 100`
    PercentOf(Box<Expr>, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    fn eval(&self) -> Option<f64> {
        let value = match self {
            Expr::Num(n) => *n,
            Expr::Neg(inner) => -inner.eval()?,
            Expr::Percent(inner) => inner.eval()? / 100.0,
            Expr::PercentOf(part, whole) => part.eval()? * whole.eval()? / 100.0,
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval()?, rhs.eval()?);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => a % b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call(func, args) => {
                let values = args.iter().map(Expr::eval).collect::<Option<Vec<f64>>>()?;
                func.apply(&values)?
            }
        };
        Some(value)
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Option<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Some(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Option<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Some(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    /// Run one recursive step, failing once the nesting limit is reached.
    fn nested(&mut self, step: fn(&mut Self) -> Option<Expr>) -> Option<Expr> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let expr = step(self);
        self.depth -= 1;
        expr
    }

    fn unary(&mut self) -> Option<Expr> {
        self.nested(Self::signed)
    }

    fn signed(&mut self) -> Option<Expr> {
        if self.eat(&Token::Minus) {
            return Some(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Option<Expr> {
        self.nested(Self::exponent)
    }

    fn exponent(&mut self) -> Option<Expr> {
        let base = self.postfix()?;
        if self.eat(&Token::Caret) {
            let exp = self.unary()?;
            return Some(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Some(base)
    }

    fn postfix(&mut self) -> Option<Expr> {
        let operand = self.primary()?;
        if self.peek() != Some(&Token::Percent) || starts_operand(self.peek_at(1)) {
            return Some(operand);
        }
        self.pos += 1;

        if self.peek() == Some(&Token::Ident("of".to_string())) {
            self.pos += 1;
            let whole = self.power()?;
            return Some(Expr::PercentOf(Box::new(operand), Box::new(whole)));
        }
        Some(Expr::Percent(Box::new(operand)))
    }

    fn primary(&mut self) -> Option<Expr> {
        let token = self.peek()?.clone();
        self.pos += 1;
        match token {
            Token::Num(n) => Some(Expr::Num(n)),
            Token::LParen => {
                let inner = self.expr()?;
                self.eat(&Token::RParen).then_some(inner)
            }
            Token::Ident(name) => match name.as_str() {
                "pi" => Some(Expr::Num(PI)),
                "tau" => Some(Expr::Num(TAU)),
                _ => {
                    let func = Func::from_name(&name)?;
                    if !self.eat(&Token::LParen) {
                        return None;
                    }
                    let mut args = vec![self.expr()?];
                    while self.eat(&Token::Comma) {
                        args.push(self.expr()?);
                    }
                    self.eat(&Token::RParen).then_some(Expr::Call(func, args))
                }
            },
            _ => None,
        }
    }
}

/// Whether a token can begin an operand (decides `%` as remainder).
fn starts_operand(token: Option<&Token>) -> bool {
    match token {
        Some(Token::Num(_)) | Some(Token::LParen) => true,
        Some(Token::Ident(name)) => name != "of",
        _ => false,
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Human display: grouped integers, up to 10 grouped decimals, or exponential
/// notation for very small or very large values.
pub fn format_display(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return (n as i64).to_formatted_string(&Locale::en);
    }

    let clean: f64 = to_precision(n, 15).parse().unwrap_or(n);
    if clean.abs() < 1e15 && clean.abs() > 1e-10 {
        return group_decimal(clean, 10);
    }
    to_exponential(n, 6)
}

/// Literal value copied to the clipboard.
pub fn format_raw(n: f64) -> String {
    // normalize -0
    let n = if n == 0.0 { 0.0 } else { n };
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{}", n);
    }
    to_precision(n, 15)
}

/// `digits` significant digits, trailing zeros removed. Exponential form for
/// exponents below -6 or at/above `digits`.
fn to_precision(n: f64, digits: usize) -> String {
    let sci = format!("{:.*e}", digits.saturating_sub(1), n);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let d: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if exp < -6 || exp >= digits as i32 {
        let body = trim_fraction(&format!("{}.{}", &d[..1], &d[1..]));
        let exp_sign = if exp >= 0 { "+" } else { "-" };
        return format!("{}{}e{}{}", sign, body, exp_sign, exp.abs());
    }

    let body = if exp >= 0 {
        let int_len = exp as usize + 1;
        format!("{}.{}", &d[..int_len], &d[int_len..])
    } else {
        format!("0.{}{}", "0".repeat((-exp - 1) as usize), d)
    };
    format!("{}{}", sign, trim_fraction(&body))
}

fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_decimal(n: f64, max_fraction: usize) -> String {
    let fixed = trim_fraction(&format!("{:.*}", max_fraction, n.abs()));
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = int_part
        .parse::<u64>()
        .map(|v| v.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if n < 0.0 && fixed != "0" { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn to_exponential(n: f64, fraction_digits: usize) -> String {
    let sci = format!("{:.*e}", fraction_digits, n);
    match sci.split_once('e') {
        Some((m, e)) if !e.starts_with('-') => format!("{}e+{}", m, e),
        _ => sci,
    }
}
