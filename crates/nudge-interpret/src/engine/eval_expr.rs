use nudge_core::ast::{Expr, MemberProperty, Template, TemplatePart};
use nudge_core::error::Error;
use nudge_core::value::{PathKey, Value, ValueObject};
use nudge_core::Result;

use super::env::Environment;
use super::InterpreterOptions;
use crate::interp_bail;

/// Pure expression evaluation. Nothing here touches the provider, so evaluation
/// (hook calls included) is synchronous.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    pub(super) options: &'a InterpreterOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(options: &'a InterpreterOptions) -> Self {
        Self { options }
    }

    pub fn evaluate(&self, expr: &Expr, env: &Environment) -> Result<Value> {
        self.eval_expr(expr, env, 0)
    }

    /// `depth` counts the hook calls currently on the stack.
    pub(super) fn eval_expr(&self, expr: &Expr, env: &Environment, depth: usize) -> Result<Value> {
        match expr {
            Expr::Identifier(name) => self.resolve_identifier(name, env),
            Expr::String(s) => Ok(Value::string(s.clone())),
            Expr::Number(n) => Ok(Value::number(*n)),
            Expr::Boolean(b) => Ok(Value::bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Array(array) => {
                let mut values = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    values.push(self.eval_expr(element, env, depth)?);
                }
                Ok(Value::Array(values))
            }
            Expr::Object(object) => {
                let mut values = ValueObject::new();
                for property in &object.properties {
                    let value = self.eval_expr(&property.value, env, depth)?;
                    values.insert(property.key.clone(), value);
                }
                Ok(Value::Object(values))
            }
            Expr::Binary(binary) => {
                let lhs = self.eval_expr(&binary.lhs, env, depth)?;
                let rhs = self.eval_expr(&binary.rhs, env, depth)?;
                self.evaluate_binop(binary.op, lhs, rhs)
            }
            Expr::Logical(logical) => {
                let lhs = self.eval_expr(&logical.lhs, env, depth)?;
                if self.logical_short_circuits(logical.op, &lhs) {
                    return Ok(lhs);
                }
                self.eval_expr(&logical.rhs, env, depth)
            }
            Expr::Unary(unary) => {
                let operand = self.eval_expr(&unary.operand, env, depth)?;
                self.evaluate_unop(unary.op, operand)
            }
            Expr::Member(member) => {
                let object = self.eval_expr(&member.object, env, depth)?;
                match &member.property {
                    MemberProperty::Named(name) => Ok(object.get_member(name)),
                    MemberProperty::Computed(key) => {
                        let key = self.eval_expr(key, env, depth)?;
                        Ok(object.get_index(&key))
                    }
                }
            }
            Expr::Call(call) => {
                let callee = self.eval_expr(&call.callee, env, depth)?;
                let function = match callee {
                    Value::Function(function) => function,
                    other => {
                        let name = call.callee.root_ident().unwrap_or("expression");
                        return Err(Error::NotCallable(format!(
                            "{} is a {}",
                            name,
                            other.type_name()
                        )));
                    }
                };
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(arg, env, depth)?);
                }
                self.call_function(&function, args, depth + 1)
            }
        }
    }

    fn resolve_identifier(&self, name: &str, env: &Environment) -> Result<Value> {
        match env.resolve(name, &self.options.resolution_order) {
            Some(value) => Ok(value),
            None if self.options.strict_identifiers => {
                Err(Error::UnresolvedIdentifier(name.to_string()))
            }
            None => Ok(Value::Null),
        }
    }

    pub fn render_template(&self, template: &Template, env: &Environment) -> Result<String> {
        let mut out = String::new();
        for part in &template.parts {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Interpolation(expr) => {
                    out.push_str(&self.eval_expr(expr, env, 0)?.to_text())
                }
            }
        }
        Ok(out)
    }

    /// Writes `value` to an identifier or member-chain target.
    pub(super) fn assign_target(
        &self,
        target: &Expr,
        value: Value,
        env: &mut Environment,
        depth: usize,
    ) -> Result<()> {
        let mut path = Vec::new();
        let mut cursor = target;
        let root = loop {
            match cursor {
                Expr::Identifier(name) => break name,
                Expr::Member(member) => {
                    let key = match &member.property {
                        MemberProperty::Named(name) => PathKey::Key(name.clone()),
                        MemberProperty::Computed(key) => {
                            self.path_key(self.eval_expr(key, env, depth)?)?
                        }
                    };
                    path.push(key);
                    cursor = &member.object;
                }
                _ => interp_bail!("invalid assignment target: {:?}", target),
            }
        };
        if path.is_empty() {
            env.assign(root, value);
            return Ok(());
        }
        path.reverse();
        let mut updated = env.current(root).cloned().unwrap_or_default();
        if updated.is_null() {
            updated = Value::empty_object();
        }
        updated.set_path(&path, value)?;
        env.assign(root, updated);
        Ok(())
    }

    fn path_key(&self, key: Value) -> Result<PathKey> {
        match key {
            Value::String(name) => Ok(PathKey::Key(name)),
            Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => Ok(PathKey::Index(n as usize)),
            other => Err(Error::type_mismatch(
                "assignment",
                format!("cannot index with a {}", other.type_name()),
            )),
        }
    }
}
