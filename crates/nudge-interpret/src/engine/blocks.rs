use futures::future::{BoxFuture, FutureExt};
use nudge_core::ast::{Stmt, StmtFor, StmtUse};
use nudge_core::error::Error;
use nudge_core::value::{Value, ValueObject};
use nudge_core::Result;

use super::env::Environment;
use super::{CallScope, PromptInterpreter};
use crate::interp_bail;

impl PromptInterpreter {
    /// Executes body-level statements and returns the text they produce.
    pub(crate) fn execute_block<'a>(
        &'a self,
        block: &'a [Stmt],
        env: &'a mut Environment,
        scope: CallScope<'a>,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            let mut out = String::new();
            for stmt in block {
                let text = self.execute_stmt(stmt, env, scope).await?;
                out.push_str(&text);
            }
            Ok(out)
        }
        .boxed()
    }

    async fn execute_stmt(
        &self,
        stmt: &Stmt,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<String> {
        let evaluator = self.evaluator();
        match stmt {
            Stmt::Text(text) => evaluator.render_template(&text.template, env),
            Stmt::Code(code) => {
                let content = evaluator.render_template(&code.content, env)?;
                Ok(format!("```{}\n{}\n```\n", code.language, content))
            }
            Stmt::Image(image) => {
                let src = evaluator.evaluate(&image.src, env)?.to_text();
                let alt = evaluator.evaluate(&image.alt, env)?.to_text();
                Ok(format!("![{}]({})", alt, src))
            }
            Stmt::If(stmt_if) => {
                if evaluator.evaluate(&stmt_if.cond, env)?.is_truthy() {
                    self.execute_block(&stmt_if.then, env, scope).await
                } else if let Some(elze) = &stmt_if.elze {
                    self.execute_block(elze, env, scope).await
                } else {
                    Ok(String::new())
                }
            }
            Stmt::For(stmt_for) => self.execute_for(stmt_for, env, scope).await,
            Stmt::Use(stmt_use) => self.execute_use(stmt_use, env, scope).await,
            Stmt::Assign(assign) => {
                let value = evaluator.evaluate(&assign.value, env)?;
                evaluator.assign_target(&assign.target, value, env, 0)?;
                Ok(String::new())
            }
            Stmt::Expr(expr) => {
                evaluator.evaluate(expr, env)?;
                Ok(String::new())
            }
            Stmt::Return(_) => interp_bail!("return statement is only allowed inside hooks"),
        }
    }

    /// Each element runs in a child environment; the loop variable and anything
    /// first bound inside the body are gone once the iteration ends.
    async fn execute_for(
        &self,
        stmt_for: &StmtFor,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<String> {
        let items = match self.evaluator().evaluate(&stmt_for.iterable, env)? {
            Value::Array(items) => items,
            other => {
                return Err(Error::type_mismatch(
                    format!("for loop over '{}'", stmt_for.binding),
                    format!("expected array, found {}", other.type_name()),
                ))
            }
        };
        let mut out = String::new();
        for item in items {
            let mut iteration = env.extend(&stmt_for.binding, item);
            let text = self
                .execute_block(&stmt_for.body, &mut iteration, scope)
                .await?;
            out.push_str(&text);
            *env = iteration.into_parent();
        }
        Ok(out)
    }

    async fn execute_use(
        &self,
        stmt_use: &StmtUse,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<String> {
        if scope.depth >= self.options.max_use_depth {
            return Err(Error::depth_exceeded(
                format!("use of prompt '{}'", stmt_use.prompt),
                self.options.max_use_depth,
            ));
        }
        let prompt = self.lookup_prompt(&stmt_use.prompt, scope)?;

        let evaluator = self.evaluator();
        let mut params = ValueObject::new();
        for arg in &stmt_use.args {
            params.insert(arg.name.clone(), evaluator.evaluate(&arg.value, env)?);
        }
        tracing::debug!(
            target: "nudge-interpret",
            "use '{}' at depth {}",
            stmt_use.prompt,
            scope.depth + 1
        );
        let outcome = self.run_prompt(&prompt, params, scope.nested()).await?;
        Ok(outcome.output.to_text())
    }
}
