use nudge_core::ast::{Block, Stmt};
use nudge_core::error::Error;
use nudge_core::value::{Value, ValueFunction};
use nudge_core::Result;

use super::env::Environment;
use super::Evaluator;
use crate::{interp_bail, interp_ensure};

/// How a hook block finished.
enum Flow {
    Continue,
    Return(Value),
}

impl Evaluator<'_> {
    /// Runs a hook over a fresh environment holding only its parameter. A hook
    /// that finishes without `return` yields Null.
    pub fn call_function(
        &self,
        function: &ValueFunction,
        args: Vec<Value>,
        depth: usize,
    ) -> Result<Value> {
        let hook = &function.hook;
        if depth > self.options.max_hook_depth {
            return Err(Error::depth_exceeded(
                format!("hook '{}' call depth", hook.name),
                self.options.max_hook_depth,
            ));
        }
        interp_ensure!(
            args.len() <= 1,
            "hook '{}' takes one argument, got {}",
            hook.name,
            args.len()
        );
        tracing::debug!(target: "nudge-interpret", "calling hook '{}' at depth {}", hook.name, depth);
        let argument = args.into_iter().next().unwrap_or_default();
        let mut env = Environment::new().extend(&hook.param, argument);
        match self.exec_hook_block(&hook.name, &hook.body, &mut env, depth)? {
            Flow::Return(value) => Ok(value),
            Flow::Continue => Ok(Value::Null),
        }
    }

    fn exec_hook_block(
        &self,
        hook: &str,
        block: &Block,
        env: &mut Environment,
        depth: usize,
    ) -> Result<Flow> {
        for stmt in block {
            if let Flow::Return(value) = self.exec_hook_stmt(hook, stmt, env, depth)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    fn exec_hook_stmt(
        &self,
        hook: &str,
        stmt: &Stmt,
        env: &mut Environment,
        depth: usize,
    ) -> Result<Flow> {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value, env, depth)?;
                self.assign_target(&assign.target, value, env, depth)?;
                Ok(Flow::Continue)
            }
            Stmt::Return(ret) => Ok(Flow::Return(self.eval_expr(&ret.value, env, depth)?)),
            Stmt::Expr(expr) => {
                self.eval_expr(expr, env, depth)?;
                Ok(Flow::Continue)
            }
            Stmt::If(stmt_if) => {
                if self.eval_expr(&stmt_if.cond, env, depth)?.is_truthy() {
                    self.exec_hook_block(hook, &stmt_if.then, env, depth)
                } else if let Some(elze) = &stmt_if.elze {
                    self.exec_hook_block(hook, elze, env, depth)
                } else {
                    Ok(Flow::Continue)
                }
            }
            Stmt::For(stmt_for) => {
                let items = match self.eval_expr(&stmt_for.iterable, env, depth)? {
                    Value::Array(items) => items,
                    other => {
                        return Err(Error::type_mismatch(
                            format!("for loop over '{}'", stmt_for.binding),
                            format!("expected array, found {}", other.type_name()),
                        ))
                    }
                };
                for item in items {
                    let mut scope = env.extend(&stmt_for.binding, item);
                    let flow = self.exec_hook_block(hook, &stmt_for.body, &mut scope, depth)?;
                    *env = scope.into_parent();
                    if let Flow::Return(value) = flow {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Continue)
            }
            Stmt::Text(_) | Stmt::Code(_) | Stmt::Image(_) | Stmt::Use(_) => {
                interp_bail!("{} is not allowed inside hook '{}'", stmt.describe(), hook)
            }
        }
    }
}
