use nudge_core::error::Error;
use nudge_core::ops::{BinOpKind, LogicalOpKind, UnOpKind};
use nudge_core::value::{format_number, Value};
use nudge_core::Result;

use super::Evaluator;

impl Evaluator<'_> {
    pub(super) fn evaluate_binop(&self, op: BinOpKind, lhs: Value, rhs: Value) -> Result<Value> {
        match op {
            BinOpKind::Add => self.binop_add(lhs, rhs),
            BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => {
                self.binop_arithmetic(op, lhs, rhs)
            }
            BinOpKind::Eq | BinOpKind::Ne => self.binop_equality(op, lhs, rhs),
            BinOpKind::Lt | BinOpKind::Gt | BinOpKind::Le | BinOpKind::Ge => {
                self.binop_ordering(op, lhs, rhs)
            }
        }
    }

    /// `&&` stops at a falsy left operand, `||` at a truthy one; either way the
    /// deciding operand is the result.
    pub(super) fn logical_short_circuits(&self, op: LogicalOpKind, lhs: &Value) -> bool {
        match op {
            LogicalOpKind::And => !lhs.is_truthy(),
            LogicalOpKind::Or => lhs.is_truthy(),
        }
    }

    pub(super) fn evaluate_unop(&self, op: UnOpKind, operand: Value) -> Result<Value> {
        match (op, operand) {
            (UnOpKind::Not, value) => Ok(Value::bool(!value.is_truthy())),
            (UnOpKind::Neg, Value::Number(n)) => Ok(Value::number(-n)),
            (UnOpKind::Neg, other) => Err(Error::type_mismatch(
                "operator '-'",
                format!("cannot negate a {}", other.type_name()),
            )),
        }
    }

    fn binop_add(&self, lhs: Value, rhs: Value) -> Result<Value> {
        match (lhs, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::number(l + r)),
            (Value::String(l), Value::String(r)) => Ok(Value::string(l + &r)),
            (Value::String(l), Value::Number(r)) => Ok(Value::string(l + &format_number(r))),
            (Value::Number(l), Value::String(r)) => Ok(Value::string(format_number(l) + &r)),
            (l, r) => Err(unsupported(BinOpKind::Add, &l, &r)),
        }
    }

    fn binop_arithmetic(&self, op: BinOpKind, lhs: Value, rhs: Value) -> Result<Value> {
        let (Value::Number(l), Value::Number(r)) = (&lhs, &rhs) else {
            return Err(unsupported(op, &lhs, &rhs));
        };
        let (l, r) = (*l, *r);
        let result = match op {
            BinOpKind::Sub => l - r,
            BinOpKind::Mul => l * r,
            BinOpKind::Div | BinOpKind::Mod if r == 0.0 => {
                return Err(Error::Arithmetic {
                    op: op.to_string(),
                    message: "division by zero".to_string(),
                })
            }
            BinOpKind::Div => l / r,
            BinOpKind::Mod => l % r,
            _ => return Err(unsupported(op, &lhs, &rhs)),
        };
        Ok(Value::number(result))
    }

    fn binop_equality(&self, op: BinOpKind, lhs: Value, rhs: Value) -> Result<Value> {
        let equal = lhs == rhs;
        Ok(Value::bool(if op == BinOpKind::Eq { equal } else { !equal }))
    }

    fn binop_ordering(&self, op: BinOpKind, lhs: Value, rhs: Value) -> Result<Value> {
        let ordering = match (&lhs, &rhs) {
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => return Err(unsupported(op, &lhs, &rhs)),
        };
        // NaN compares false both ways
        let Some(ordering) = ordering else {
            return Ok(Value::bool(false));
        };
        let result = match op {
            BinOpKind::Lt => ordering.is_lt(),
            BinOpKind::Gt => ordering.is_gt(),
            BinOpKind::Le => ordering.is_le(),
            BinOpKind::Ge => ordering.is_ge(),
            _ => return Err(unsupported(op, &lhs, &rhs)),
        };
        Ok(Value::bool(result))
    }
}

fn unsupported(op: BinOpKind, lhs: &Value, rhs: &Value) -> Error {
    Error::type_mismatch(
        format!("operator '{}'", op),
        format!(
            "unsupported operands: {} and {}",
            lhs.type_name(),
            rhs.type_name()
        ),
    )
}
