//! Restricted expression language for derived columns and row filters.
//!
//! Expressions are parsed into a small tree and evaluated row by row. The
//! grammar has column references, literals, arithmetic, comparisons and
//! boolean logic; there are no function calls, attribute access or
//! indexing, so nothing outside the table can be reached.
//!
//! ```text
//! price * quantity
//! `unit price` > 10 and not (region == 'north' or region == 'east')
//! ```
//!
//! Column references are checked against the table when the expression is
//! compiled. Missing values propagate: any arithmetic or comparison with a
//! missing operand is missing, and boolean logic is three-valued.

mod eval;
mod lexer;
mod parser;

use std::fmt;

use polars::prelude::{AnyValue, Column, DataFrame, NamedFrom, Series};
use sweep_model::{any_to_string, is_missing};

use crate::error::ExpressionError;

/// Longest accepted expression source, in bytes.
pub const MAX_SOURCE_LEN: usize = 4096;

/// Deepest accepted nesting of parentheses and unary operators.
pub const MAX_DEPTH: usize = 64;

/// A single cell value during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Reads a table cell. Nulls and `NaN` become [`Value::Null`];
    /// datetimes are read as `YYYY-MM-DD HH:MM:SS` text.
    pub fn from_any(value: AnyValue<'_>) -> Self {
        if is_missing(&value) {
            return Value::Null;
        }
        match value {
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::Int8(v) => Value::Int(i64::from(v)),
            AnyValue::Int16(v) => Value::Int(i64::from(v)),
            AnyValue::Int32(v) => Value::Int(i64::from(v)),
            AnyValue::Int64(v) => Value::Int(v),
            AnyValue::UInt8(v) => Value::Int(i64::from(v)),
            AnyValue::UInt16(v) => Value::Int(i64::from(v)),
            AnyValue::UInt32(v) => Value::Int(i64::from(v)),
            AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
            AnyValue::Float32(v) => Value::Float(f64::from(v)),
            AnyValue::Float64(v) => Value::Float(v),
            other => Value::Text(any_to_string(other)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&sweep_model::format_numeric(*v)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Parsed expression tree. Columns are referenced by slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Column(usize),
    Neg(Box<Node>),
    Not(Box<Node>),
    Arith {
        op: ArithOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Compare {
        op: CompareOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

/// A parsed expression, bound to the column names it references.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
    columns: Vec<String>,
}

impl Expression {
    /// Parses an expression without checking column names.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(ExpressionError::TooComplex(format!(
                "longer than {MAX_SOURCE_LEN} bytes"
            )));
        }
        let tokens = lexer::tokenize(source)?;
        let mut parser = parser::Parser::new(tokens, source.len());
        let root = parser.parse()?;
        Ok(Self {
            source: source.to_string(),
            root,
            columns: parser.columns,
        })
    }

    /// Parses an expression and checks every column it names exists in `df`.
    pub fn compile(source: &str, df: &DataFrame) -> Result<Self, ExpressionError> {
        let expression = Self::parse(source)?;
        expression.check_columns(df)?;
        Ok(expression)
    }

    fn check_columns(&self, df: &DataFrame) -> Result<(), ExpressionError> {
        match self
            .columns
            .iter()
            .find(|name| df.column(name.as_str()).is_err())
        {
            Some(name) => Err(ExpressionError::UnknownColumn(name.clone())),
            None => Ok(()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Column names referenced by the expression, in first-use order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Evaluates the expression for every row.
    pub fn evaluate(&self, df: &DataFrame) -> Result<Vec<Value>, ExpressionError> {
        let columns = self
            .columns
            .iter()
            .map(|name| {
                df.column(name.as_str())
                    .map_err(|_| ExpressionError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<&Column>, _>>()?;

        let mut row = Vec::with_capacity(columns.len());
        (0..df.height())
            .map(|idx| {
                row.clear();
                row.extend(
                    columns
                        .iter()
                        .map(|column| Value::from_any(column.get(idx).unwrap_or(AnyValue::Null))),
                );
                eval::evaluate(&self.root, &row)
            })
            .collect()
    }

    /// Evaluates the expression as a row filter. Missing counts as false;
    /// any other non-boolean result is an error.
    pub fn evaluate_mask(&self, df: &DataFrame) -> Result<Vec<bool>, ExpressionError> {
        self.evaluate(df)?
            .into_iter()
            .map(|value| match value {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(ExpressionError::NotBoolean(other.type_name())),
            })
            .collect()
    }

    /// Evaluates the expression into a column named `name`.
    pub fn evaluate_column(&self, df: &DataFrame, name: &str) -> Result<Column, ExpressionError> {
        Ok(values_to_column(name, self.evaluate(df)?))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Builds a column from evaluated values with the narrowest fitting dtype.
///
/// All integers give `Int64`, numbers give `Float64`, booleans give
/// `Boolean`; anything else (including mixes) becomes text. An all-missing
/// result is a `Float64` column of nulls.
pub fn values_to_column(name: &str, values: Vec<Value>) -> Column {
    let present = || values.iter().filter(|v| !v.is_null());
    let all_ints = present().all(|v| matches!(v, Value::Int(_)));
    let all_numbers = present().all(|v| matches!(v, Value::Int(_) | Value::Float(_)));
    let all_bools = present().all(|v| matches!(v, Value::Bool(_)));
    let any_present = present().next().is_some();

    if any_present && all_ints {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                Value::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), ints).into();
    }
    if !any_present || all_numbers {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                Value::Int(i) => Some(*i as f64),
                Value::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), floats).into();
    }
    if all_bools {
        let bools: Vec<Option<bool>> = values
            .iter()
            .map(|v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), bools).into();
    }
    let texts: Vec<Option<String>> = values
        .into_iter()
        .map(|v| (!v.is_null()).then(|| v.to_string()))
        .collect();
    Series::new(name.into(), texts).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("price".into(), vec![Some(10.0), None, Some(30.0)]).into(),
            Series::new("qty".into(), vec![Some(2i64), Some(3), Some(0)]).into(),
            Series::new("region".into(), vec![Some("north"), Some("south"), None]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn compile_rejects_unknown_columns() {
        let err = Expression::compile("price + tax", &frame()).unwrap_err();
        assert_eq!(err, ExpressionError::UnknownColumn("tax".to_string()));
    }

    #[test]
    fn arithmetic_propagates_missing() {
        let expr = Expression::compile("price * qty", &frame()).unwrap();
        assert_eq!(
            expr.evaluate(&frame()).unwrap(),
            vec![Value::Float(20.0), Value::Null, Value::Float(0.0)]
        );
    }

    #[test]
    fn division_by_zero_is_missing() {
        let expr = Expression::compile("price / qty", &frame()).unwrap();
        let values = expr.evaluate(&frame()).unwrap();
        assert_eq!(values[0], Value::Float(5.0));
        assert_eq!(values[2], Value::Null);
    }

    #[test]
    fn mask_treats_missing_as_false() {
        let expr = Expression::compile("price > 5 and region != 'south'", &frame()).unwrap();
        assert_eq!(expr.evaluate_mask(&frame()).unwrap(), vec![true, false, false]);
    }

    #[test]
    fn non_boolean_filter_is_rejected() {
        let expr = Expression::compile("qty + 1", &frame()).unwrap();
        assert_eq!(
            expr.evaluate_mask(&frame()),
            Err(ExpressionError::NotBoolean("integer"))
        );
    }

    #[test]
    fn text_concatenation_and_mismatch() {
        let df = frame();
        let concat = Expression::compile("region + '-x'", &df).unwrap();
        assert_eq!(
            concat.evaluate(&df).unwrap()[0],
            Value::Text("north-x".to_string())
        );
        let mixed = Expression::compile("region + qty", &df).unwrap();
        assert!(matches!(
            mixed.evaluate(&df),
            Err(ExpressionError::TypeMismatch { op: "+", .. })
        ));
    }

    #[test]
    fn limits_are_enforced() {
        let long = "1 + ".repeat(MAX_SOURCE_LEN) + "1";
        assert!(matches!(
            Expression::parse(&long),
            Err(ExpressionError::TooComplex(_))
        ));
        let deep = "(".repeat(MAX_DEPTH + 1) + "1" + &")".repeat(MAX_DEPTH + 1);
        assert!(matches!(
            Expression::parse(&deep),
            Err(ExpressionError::TooComplex(_))
        ));
        let ok = "(".repeat(10) + "1" + &")".repeat(10);
        assert!(Expression::parse(&ok).is_ok());
    }

    #[test]
    fn syntax_errors_report_offsets() {
        assert!(matches!(
            Expression::parse("price >"),
            Err(ExpressionError::Syntax { offset: 7, .. })
        ));
        assert!(matches!(
            Expression::parse("(price"),
            Err(ExpressionError::Syntax { .. })
        ));
        assert_eq!(Expression::parse("   "), Err(ExpressionError::Empty));
    }

    #[test]
    fn values_to_column_picks_dtype() {
        use polars::prelude::DataType;
        let ints = values_to_column("a", vec![Value::Int(1), Value::Null]);
        assert_eq!(ints.dtype(), &DataType::Int64);
        let floats = values_to_column("b", vec![Value::Int(1), Value::Float(0.5)]);
        assert_eq!(floats.dtype(), &DataType::Float64);
        let bools = values_to_column("c", vec![Value::Bool(true), Value::Null]);
        assert_eq!(bools.dtype(), &DataType::Boolean);
        let texts = values_to_column("d", vec![Value::Text("x".into()), Value::Int(1)]);
        assert_eq!(texts.dtype(), &DataType::String);
    }
}
