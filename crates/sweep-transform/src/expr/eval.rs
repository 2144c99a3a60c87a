//! Row-wise evaluation of an expression tree.

use std::cmp::Ordering;

use super::{ArithOp, CompareOp, Node, Value};
use crate::error::ExpressionError;

pub(crate) fn evaluate(node: &Node, row: &[Value]) -> Result<Value, ExpressionError> {
    match node {
        Node::Literal(value) => Ok(value.clone()),
        Node::Column(slot) => Ok(row.get(*slot).cloned().unwrap_or(Value::Null)),
        Node::Neg(inner) => negate(evaluate(inner, row)?),
        Node::Not(inner) => match evaluate(inner, row)? {
            Value::Null => Ok(Value::Null),
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(mismatch("not", &[&other])),
        },
        Node::Arith { op, left, right } => {
            arithmetic(*op, evaluate(left, row)?, evaluate(right, row)?)
        }
        Node::Compare { op, left, right } => {
            compare(*op, &evaluate(left, row)?, &evaluate(right, row)?)
        }
        Node::And(left, right) => {
            let left = truth(evaluate(left, row)?, "and")?;
            if left == Some(false) {
                return Ok(Value::Bool(false));
            }
            let right = truth(evaluate(right, row)?, "and")?;
            Ok(match (left, right) {
                (_, Some(false)) => Value::Bool(false),
                (Some(true), Some(true)) => Value::Bool(true),
                _ => Value::Null,
            })
        }
        Node::Or(left, right) => {
            let left = truth(evaluate(left, row)?, "or")?;
            if left == Some(true) {
                return Ok(Value::Bool(true));
            }
            let right = truth(evaluate(right, row)?, "or")?;
            Ok(match (left, right) {
                (_, Some(true)) => Value::Bool(true),
                (Some(false), Some(false)) => Value::Bool(false),
                _ => Value::Null,
            })
        }
    }
}

fn mismatch(op: &'static str, operands: &[&Value]) -> ExpressionError {
    let operands = operands
        .iter()
        .map(|value| value.type_name())
        .collect::<Vec<_>>()
        .join(" and ");
    ExpressionError::TypeMismatch { op, operands }
}

/// Three-valued truth: `None` is unknown.
fn truth(value: Value, op: &'static str) -> Result<Option<bool>, ExpressionError> {
    match value {
        Value::Bool(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(mismatch(op, &[&other])),
    }
}

fn negate(value: Value) -> Result<Value, ExpressionError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(v) => Ok(v
            .checked_neg()
            .map_or(Value::Float(-(v as f64)), Value::Int)),
        Value::Float(v) => Ok(Value::Float(-v)),
        other => Err(mismatch("-", &[&other])),
    }
}

fn arithmetic(op: ArithOp, left: Value, right: Value) -> Result<Value, ExpressionError> {
    match (&left, &right) {
        (Value::Null, Value::Null | Value::Int(_) | Value::Float(_) | Value::Text(_))
        | (Value::Int(_) | Value::Float(_) | Value::Text(_), Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => Ok(int_arithmetic(op, *a, *b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(float_arithmetic(op, as_float(&left), as_float(&right)))
        }
        (Value::Text(a), Value::Text(b)) if op == ArithOp::Add => {
            Ok(Value::Text(format!("{a}{b}")))
        }
        _ => Err(mismatch(op.symbol(), &[&left, &right])),
    }
}

fn as_float(value: &Value) -> f64 {
    match value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        _ => f64::NAN,
    }
}

/// Integer arithmetic; overflow falls back to floating point and `/`
/// always gives a float.
fn int_arithmetic(op: ArithOp, a: i64, b: i64) -> Value {
    let exact = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div => return float_arithmetic(op, a as f64, b as f64),
        ArithOp::Rem if b == 0 => return Value::Null,
        ArithOp::Rem => a.checked_rem(b).map(|r| {
            if r != 0 && (r < 0) != (b < 0) {
                r + b
            } else {
                r
            }
        }),
    };
    exact.map_or_else(|| float_arithmetic(op, a as f64, b as f64), Value::Int)
}

fn float_arithmetic(op: ArithOp, a: f64, b: f64) -> Value {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div | ArithOp::Rem if b == 0.0 => return Value::Null,
        ArithOp::Div => a / b,
        // Sign follows the divisor.
        ArithOp::Rem => a - b * (a / b).floor(),
    };
    if result.is_nan() {
        Value::Null
    } else {
        Value::Float(result)
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value, ExpressionError> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            as_float(left).partial_cmp(&as_float(right))
        }
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => return Err(mismatch(op.symbol(), &[left, right])),
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Null);
    };
    let result = match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(int_arithmetic(ArithOp::Add, 2, 3), Value::Int(5));
        assert_eq!(int_arithmetic(ArithOp::Div, 7, 2), Value::Float(3.5));
        assert_eq!(int_arithmetic(ArithOp::Rem, -7, 3), Value::Int(2));
        assert_eq!(int_arithmetic(ArithOp::Rem, 7, 0), Value::Null);
        assert_eq!(
            int_arithmetic(ArithOp::Mul, i64::MAX, 2),
            Value::Float(i64::MAX as f64 * 2.0)
        );
    }

    #[test]
    fn kleene_logic() {
        let t = Node::Literal(Value::Bool(true));
        let f = Node::Literal(Value::Bool(false));
        let n = Node::Literal(Value::Null);
        let and = |a: &Node, b: &Node| {
            evaluate(&Node::And(Box::new(a.clone()), Box::new(b.clone())), &[]).unwrap()
        };
        let or = |a: &Node, b: &Node| {
            evaluate(&Node::Or(Box::new(a.clone()), Box::new(b.clone())), &[]).unwrap()
        };
        assert_eq!(and(&n, &f), Value::Bool(false));
        assert_eq!(and(&n, &t), Value::Null);
        assert_eq!(or(&n, &t), Value::Bool(true));
        assert_eq!(or(&n, &f), Value::Null);
    }

    #[test]
    fn comparisons_with_missing_are_missing() {
        assert_eq!(
            compare(CompareOp::Eq, &Value::Null, &Value::Int(1)).unwrap(),
            Value::Null
        );
        assert_eq!(
            compare(CompareOp::Le, &Value::Int(1), &Value::Float(1.0)).unwrap(),
            Value::Bool(true)
        );
        assert!(compare(CompareOp::Lt, &Value::Text("a".into()), &Value::Int(1)).is_err());
    }
}
