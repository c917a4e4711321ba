//! JSON-lines pair source and the key order used for JSON keys.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use keymerge_core::PairSource;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct Record {
    key: Value,
    #[serde(default)]
    value: Value,
}

/// Where a [`JsonlPairs`] parks the error that ended it early.
///
/// A pair source can only say "no more pairs", so the reason is handed back
/// out of band; callers check the slot while and after consuming.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Rc<RefCell<Option<CliError>>>);

impl ErrorSlot {
    pub fn take(&self) -> Option<CliError> {
        self.0.borrow_mut().take()
    }

    fn set(&self, err: CliError) {
        let mut slot = self.0.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
    }
}

/// Lazily reads `{"key": …, "value": …}` records, one per line.
/// Blank lines are skipped; a missing `value` reads as `null`.
pub struct JsonlPairs<R> {
    path: PathBuf,
    lines: Lines<R>,
    line_no: usize,
    done: bool,
    errors: ErrorSlot,
}

impl JsonlPairs<BufReader<File>> {
    pub fn open(path: &Path) -> Result<(Self, ErrorSlot), CliError> {
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "opened input");
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlPairs<R> {
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> (Self, ErrorSlot) {
        let errors = ErrorSlot::default();
        let pairs = Self {
            path: path.into(),
            lines: reader.lines(),
            line_no: 0,
            done: false,
            errors: errors.clone(),
        };
        (pairs, errors)
    }

    fn fail(&mut self, err: CliError) -> bool {
        self.done = true;
        self.errors.set(err);
        false
    }
}

impl<R: BufRead> PairSource for JsonlPairs<R> {
    type Key = Value;
    type Value = Value;

    fn try_advance(&mut self, visit: &mut dyn FnMut(Value, Value)) -> bool {
        while !self.done {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break;
            };
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return self.fail(CliError::Io(e)),
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(record) => {
                    visit(record.key, record.value);
                    return true;
                }
                Err(source) => {
                    let err = CliError::Parse {
                        path: self.path.clone(),
                        line: self.line_no,
                        source,
                    };
                    return self.fail(err);
                }
            }
        }
        false
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn of(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            Num::Int(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Num::Int(i128::from(u))
        } else {
            Num::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// Exact comparison of an integer with a float; no rounding of `int` to `f64`.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    // 2^127: every integer-valued float below this fits in an i128.
    const LIMIT: f64 = i128::MAX as f64;
    if float.is_nan() {
        return Ordering::Equal;
    }
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// Total order over JSON keys: null < bool < number < string < array < object.
/// Numbers compare by exact numeric value (integers against floats included),
/// strings lexicographically and containers by
/// their serialized text.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (Num::of(x), Num::of(y)) {
            (Num::Int(x), Num::Int(y)) => x.cmp(&y),
            (Num::Int(x), Num::Float(y)) => compare_int_float(x, y),
            (Num::Float(x), Num::Int(y)) => compare_int_float(y, x).reverse(),
            (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

pub fn same_key(a: &Value, b: &Value) -> bool {
    compare_keys(a, b) == Ordering::Equal
}
