//! Expression interpreter
//!
//! Walks the tree produced by the parser. Evaluation is pure: the only
//! state is the set of `var`/`let`/`const` declarations made by the code
//! being evaluated, and it is dropped when the interpreter is.

use super::parser::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use super::scope::Scope;
use super::value::Value;
use super::{EvalError, EvalResult};
use crate::util::dtoa;
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Longest string `repeat`/`padStart`/`padEnd` may produce, in bytes
const MAX_STRING_LEN: usize = 1 << 28;

/// Interpreter state
pub struct Interpreter<'s> {
    scope: &'s Scope,
    locals: HashMap<String, Value>,
}

impl<'s> Interpreter<'s> {
    /// Create an interpreter that resolves free names against `scope`
    pub fn new(scope: &'s Scope) -> Self {
        Interpreter {
            scope,
            locals: HashMap::new(),
        }
    }

    /// Run a program and return the value of its last expression statement
    pub fn run(&mut self, program: &[Stmt]) -> EvalResult<Value> {
        let mut completion = Value::Undefined;
        for stmt in program {
            match stmt {
                Stmt::Declare { name, init } => {
                    let value = match init {
                        Some(expr) => self.eval(expr)?,
                        None => Value::Undefined,
                    };
                    self.locals.insert(name.clone(), value);
                }
                Stmt::Expr(expr) => completion = self.eval(expr)?,
            }
        }
        Ok(completion)
    }

    /// Resolve a name: declarations first, then bindings, then globals
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.locals.get(name) {
            return Some(value.clone());
        }
        if let Some(value) = self.scope.get(name) {
            return Some(Value::string(value));
        }
        match name {
            "NaN" => Some(Value::Number(f64::NAN)),
            "Infinity" => Some(Value::Number(f64::INFINITY)),
            _ => None,
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.locals.contains_key(name) || self.scope.get(name).is_some()
    }

    /// Evaluate an expression
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::string(s.as_str())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Ident(name) => self
                .lookup(name)
                .ok_or_else(|| EvalError::Reference(name.clone())),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { op, left, right } => {
                let a = self.eval(left)?;
                let b = self.eval(right)?;
                Ok(binary_op(*op, &a, &b))
            }
            Expr::Logical { op, left, right } => {
                let a = self.eval(left)?;
                match (op, a.to_bool()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(a),
                    _ => self.eval(right),
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.to_bool() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
            Expr::Member { object, property } => self.eval_member(object, property),
            Expr::Index { object, index } => {
                let target = self.eval(object)?;
                let index = self.eval(index)?;
                index_op(&target, &index)
            }
            Expr::Call { callee, args } => self.eval_call(callee, args),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        // `typeof` tolerates names that are not defined
        if op == UnaryOp::TypeOf {
            if let Expr::Ident(name) = operand {
                if self.lookup(name).is_none() {
                    return Ok(Value::string("undefined"));
                }
            }
        }

        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!value.to_bool()),
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::TypeOf => Value::string(value.type_of()),
        })
    }

    fn eval_member(&mut self, object: &Expr, property: &str) -> EvalResult<Value> {
        if let Expr::Ident(name) = object {
            if name == "Math" && !self.is_bound(name) {
                return match property {
                    "PI" => Ok(Value::Number(std::f64::consts::PI)),
                    "E" => Ok(Value::Number(std::f64::consts::E)),
                    _ => Ok(Value::Undefined),
                };
            }
        }

        let target = self.eval(object)?;
        match &target {
            Value::Undefined | Value::Null => Err(EvalError::Type(format!(
                "Cannot read properties of {} (reading '{}')",
                target, property
            ))),
            Value::String(s) if property == "length" => {
                Ok(Value::Number(s.chars().count() as f64))
            }
            _ => Ok(Value::Undefined),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> EvalResult<Value> {
        match callee {
            Expr::Ident(name) if !self.is_bound(name) => {
                let args = self.eval_args(args)?;
                call_global(name, &args)
            }
            Expr::Member { object, property } => {
                if let Expr::Ident(namespace) = object.as_ref() {
                    if matches!(namespace.as_str(), "Math" | "JSON") && !self.is_bound(namespace)
                    {
                        let args = self.eval_args(args)?;
                        return call_namespace(namespace, property, &args);
                    }
                }

                let target = self.eval(object)?;
                let args = self.eval_args(args)?;
                match &target {
                    Value::String(s) => call_string_method(s, property, &args),
                    Value::Undefined | Value::Null => Err(EvalError::Type(format!(
                        "Cannot read properties of {} (reading '{}')",
                        target, property
                    ))),
                    _ => Err(EvalError::Type(format!(
                        "{}.{} is not a function",
                        target.type_of(),
                        property
                    ))),
                }
            }
            Expr::Ident(name) => Err(EvalError::Type(format!("{} is not a function", name))),
            _ => Err(EvalError::Type("expression is not a function".to_string())),
        }
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Undefined)
}

/// `ToIntegerOrInfinity`
fn to_integer(value: &Value) -> f64 {
    let n = value.to_number();
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// Resolve a relative `slice` index against a length
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if value.is_undefined() {
        return default;
    }
    let rel = to_integer(value);
    let len_f = len as f64;
    if rel < 0.0 {
        (len_f + rel).max(0.0) as usize
    } else {
        rel.min(len_f) as usize
    }
}

/// Clamp a `substring` index into `[0, len]`
fn clamped_index(value: &Value, len: usize, default: usize) -> usize {
    if value.is_undefined() {
        return default;
    }
    to_integer(value).clamp(0.0, len as f64) as usize
}

fn binary_op(op: BinaryOp, a: &Value, b: &Value) -> Value {
    match op {
        BinaryOp::Add => match (a, b) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", a.to_js_string(), b.to_js_string()))
            }
            _ => Value::Number(a.to_number() + b.to_number()),
        },
        BinaryOp::Sub => Value::Number(a.to_number() - b.to_number()),
        BinaryOp::Mul => Value::Number(a.to_number() * b.to_number()),
        BinaryOp::Div => Value::Number(a.to_number() / b.to_number()),
        BinaryOp::Rem => Value::Number(a.to_number() % b.to_number()),
        BinaryOp::Eq => Value::Bool(a.loose_equals(b)),
        BinaryOp::NotEq => Value::Bool(!a.loose_equals(b)),
        BinaryOp::StrictEq => Value::Bool(a.strict_equals(b)),
        BinaryOp::StrictNotEq => Value::Bool(!a.strict_equals(b)),
        BinaryOp::Lt => Value::Bool(compare(a, b) == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(
            compare(a, b),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(a, b) == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(
            compare(a, b),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

/// Relational comparison; `None` when either side is NaN
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => a.to_number().partial_cmp(&b.to_number()),
    }
}

fn index_op(target: &Value, index: &Value) -> EvalResult<Value> {
    match target {
        Value::Undefined | Value::Null => Err(EvalError::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            target,
            index.to_js_string()
        ))),
        Value::String(s) => {
            if index.as_str() == Some("length") {
                return Ok(Value::Number(s.chars().count() as f64));
            }
            let n = index.to_number();
            if n.fract() != 0.0 || n < 0.0 {
                return Ok(Value::Undefined);
            }
            Ok(s.chars()
                .nth(n as usize)
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Undefined))
        }
        _ => Ok(Value::Undefined),
    }
}

fn call_global(name: &str, args: &[Value]) -> EvalResult<Value> {
    match name {
        "String" => Ok(Value::String(match args.first() {
            Some(v) => v.to_js_string(),
            None => String::new(),
        })),
        "Number" => Ok(Value::Number(args.first().map_or(0.0, Value::to_number))),
        "parseInt" => Ok(Value::Number(dtoa::parse_int_prefix(
            &arg(args, 0).to_js_string(),
        ))),
        "parseFloat" => Ok(Value::Number(dtoa::parse_float_prefix(
            &arg(args, 0).to_js_string(),
        ))),
        "isNaN" => Ok(Value::Bool(arg(args, 0).to_number().is_nan())),
        "encodeURIComponent" => Ok(Value::String(encode_uri_component(
            &arg(args, 0).to_js_string(),
        ))),
        "Math" | "JSON" => Err(EvalError::Type(format!("{} is not a function", name))),
        _ => Err(EvalError::Reference(name.to_string())),
    }
}

fn call_namespace(namespace: &str, method: &str, args: &[Value]) -> EvalResult<Value> {
    let unary = |f: fn(f64) -> f64| -> EvalResult<Value> {
        Ok(Value::Number(f(arg(args, 0).to_number())))
    };

    match (namespace, method) {
        ("Math", "floor") => unary(f64::floor),
        ("Math", "ceil") => unary(f64::ceil),
        ("Math", "abs") => unary(f64::abs),
        // Halves round towards +Infinity
        ("Math", "round") => unary(|n| {
            if n - n.floor() == 0.5 { n.ceil() } else { n.round() }
        }),
        ("Math", "min") => Ok(Value::Number(args.iter().map(Value::to_number).fold(
            f64::INFINITY,
            |acc, n| if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.min(n) },
        ))),
        ("Math", "max") => Ok(Value::Number(args.iter().map(Value::to_number).fold(
            f64::NEG_INFINITY,
            |acc, n| if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(n) },
        ))),
        ("JSON", "stringify") => Ok(json_stringify(&arg(args, 0))),
        _ => Err(EvalError::Type(format!(
            "{}.{} is not a function",
            namespace, method
        ))),
    }
}

fn json_stringify(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Undefined,
        Value::Null => Value::string("null"),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) if n.is_finite() => Value::String(dtoa::number_to_string(*n)),
        Value::Number(_) => Value::string("null"),
        Value::String(s) => Value::String(Json::String(s.clone()).to_string()),
    }
}

fn call_string_method(s: &str, method: &str, args: &[Value]) -> EvalResult<Value> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let slice = |from: usize, to: usize| -> Value {
        if from >= to {
            Value::String(String::new())
        } else {
            Value::String(chars[from..to].iter().collect())
        }
    };

    let value = match method {
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::string(s.trim()),
        "trimStart" => Value::string(s.trim_start()),
        "trimEnd" => Value::string(s.trim_end()),
        "charAt" => {
            let i = to_integer(&arg(args, 0));
            if i < 0.0 || i >= len as f64 {
                Value::String(String::new())
            } else {
                Value::String(chars[i as usize].to_string())
            }
        }
        "indexOf" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let from = clamped_index(&arg(args, 1), len, 0);
            Value::Number(find_chars(&chars, &needle, from).map_or(-1.0, |i| i as f64))
        }
        "includes" => Value::Bool(s.contains(arg(args, 0).to_js_string().as_str())),
        "startsWith" => Value::Bool(s.starts_with(arg(args, 0).to_js_string().as_str())),
        "endsWith" => Value::Bool(s.ends_with(arg(args, 0).to_js_string().as_str())),
        "slice" => {
            let from = relative_index(&arg(args, 0), len, 0);
            let to = relative_index(&arg(args, 1), len, len);
            slice(from, to)
        }
        "substring" => {
            let a = clamped_index(&arg(args, 0), len, 0);
            let b = clamped_index(&arg(args, 1), len, len);
            slice(a.min(b), a.max(b))
        }
        "repeat" => {
            let count = to_integer(&arg(args, 0));
            if count < 0.0 || count.is_infinite() {
                return Err(EvalError::Range(format!("Invalid count value: {}", count)));
            }
            let count = count as usize;
            if s.len().saturating_mul(count) > MAX_STRING_LEN {
                return Err(EvalError::Range("Invalid string length".to_string()));
            }
            Value::String(s.repeat(count))
        }
        "padStart" | "padEnd" => {
            let target = to_integer(&arg(args, 0));
            let fill = match arg(args, 1) {
                Value::Undefined => " ".to_string(),
                other => other.to_js_string(),
            };
            if target <= len as f64 || fill.is_empty() {
                return Ok(Value::string(s));
            }
            let widest = fill.chars().map(char::len_utf8).max().unwrap_or(1);
            if s.len() as f64 + (target - len as f64) * widest as f64 > MAX_STRING_LEN as f64 {
                return Err(EvalError::Range("Invalid string length".to_string()));
            }
            let padding: String = fill.chars().cycle().take(target as usize - len).collect();
            if method == "padStart" {
                Value::String(padding + s)
            } else {
                Value::String(format!("{}{}", s, padding))
            }
        }
        "replace" => {
            let pattern = arg(args, 0).to_js_string();
            let replacement = arg(args, 1).to_js_string();
            Value::String(s.replacen(pattern.as_str(), &replacement, 1))
        }
        "replaceAll" => {
            let pattern = arg(args, 0).to_js_string();
            let replacement = arg(args, 1).to_js_string();
            Value::String(s.replace(pattern.as_str(), &replacement))
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_js_string());
            }
            Value::String(out)
        }
        _ => {
            return Err(EvalError::Type(format!(
                "string.{} is not a function",
                method
            )));
        }
    };

    Ok(value)
}

/// Character-index search, mirroring `String.prototype.indexOf`
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Percent-encode everything except the characters `encodeURIComponent` keeps
fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
