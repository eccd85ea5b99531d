#![allow(dead_code)]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nudge_core::value::{Value, ValueObject};
use nudge_core::PromptRegistry;
use nudge_interpret::{Constraints, PromptInterpreter, Provider};

type Responder = Box<dyn Fn(&str) -> eyre::Result<String> + Send + Sync>;

/// Provider double that records every call and answers through a closure.
pub struct TestProvider {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    constraints: Mutex<Vec<Constraints>>,
}

impl TestProvider {
    pub fn new(responder: impl Fn(&str) -> eyre::Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            constraints: Mutex::new(Vec::new()),
        })
    }

    pub fn echo() -> Arc<Self> {
        Self::new(|prompt| Ok(prompt.to_string()))
    }

    pub fn replying(reply: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(reply.to_string()))
    }

    /// Hands out `replies` in call order, then echoes.
    pub fn scripted(replies: &[&str]) -> Arc<Self> {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(replies.iter().map(|reply| reply.to_string()).collect());
        Self::new(move |prompt| {
            let next = queue.lock().expect("reply queue").pop_front();
            Ok(next.unwrap_or_else(|| prompt.to_string()))
        })
    }

    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(eyre::eyre!(message)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts").clone()
    }

    pub fn last_constraints(&self) -> Option<Constraints> {
        self.constraints.lock().expect("constraints").last().cloned()
    }
}

#[async_trait]
impl Provider for TestProvider {
    async fn generate_response(
        &self,
        prompt: &str,
        constraints: &Constraints,
    ) -> eyre::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().expect("prompts").push(prompt.to_string());
        self.constraints
            .lock()
            .expect("constraints")
            .push(constraints.clone());
        (self.responder)(prompt)
    }

    fn name(&self) -> &str {
        "test"
    }
}

type IndexedResponder = Box<dyn Fn(usize, &str) -> String + Send + Sync>;

/// Provider double whose later calls finish first: call `i` of the first `batch`
/// sleeps `(batch - i) * step`, so a batch completes in reverse submission order.
pub struct StaggeredProvider {
    responder: IndexedResponder,
    batch: usize,
    step: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: Mutex<Vec<usize>>,
}

impl StaggeredProvider {
    pub fn new(
        batch: usize,
        responder: impl Fn(usize, &str) -> String + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            batch,
            step: Duration::from_millis(10),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        })
    }

    pub fn echo(batch: usize) -> Arc<Self> {
        Self::new(batch, |_, prompt| prompt.to_string())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Call indices in the order their responses were produced.
    pub fn completion_order(&self) -> Vec<usize> {
        self.completed.lock().expect("completed").clone()
    }
}

#[async_trait]
impl Provider for StaggeredProvider {
    async fn generate_response(
        &self,
        prompt: &str,
        _constraints: &Constraints,
    ) -> eyre::Result<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let wait = self.batch.saturating_sub(index) as u32;
        tokio::time::sleep(self.step * wait).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().expect("completed").push(index);
        Ok((self.responder)(index, prompt))
    }

    fn name(&self) -> &str {
        "staggered"
    }
}

pub fn staggered_interpreter(provider: &Arc<StaggeredProvider>) -> PromptInterpreter {
    init_tracing();
    PromptInterpreter::new(provider.clone(), PromptRegistry::shared())
}

pub fn interpreter(provider: &Arc<TestProvider>) -> PromptInterpreter {
    init_tracing();
    PromptInterpreter::new(provider.clone(), PromptRegistry::shared())
}

pub fn params(json: serde_json::Value) -> ValueObject {
    match Value::from(json) {
        Value::Object(object) => object,
        other => panic!("params must be an object, got {}", other),
    }
}

pub fn no_params() -> ValueObject {
    ValueObject::new()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
