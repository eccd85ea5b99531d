use nudge_core::value::{ToJson, Value, ValueObject};

/// Well-known slot names shared by sections, techniques and composition.
pub mod slots {
    pub const PARAMS: &str = "params";
    pub const META: &str = "meta";
    pub const CONTEXT: &str = "context";
    pub const CONSTRAINTS: &str = "constraints";
    pub const OUTPUT: &str = "output";
    pub const HOOKS: &str = "hooks";
    pub const TECHNIQUES: &str = "techniques";
    pub const EXAMPLES: &str = "examples";
    pub const INSTRUCTION: &str = "instruction";
    pub const CHAIN_OF_THOUGHT: &str = "chainOfThought";

    /// Slots owned by the engine; user-named buffers may not take these names.
    pub const RESERVED: [&str; 10] = [
        PARAMS,
        META,
        CONTEXT,
        CONSTRAINTS,
        OUTPUT,
        HOOKS,
        TECHNIQUES,
        EXAMPLES,
        INSTRUCTION,
        CHAIN_OF_THOUGHT,
    ];

    pub fn is_reserved(name: &str) -> bool {
        RESERVED.contains(&name)
    }
}

/// Places a bare identifier is looked up in, tried in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Loop variables, hook parameters and technique bindings.
    Locals,
    /// Top-level slots such as `params`, `context` or a reflection buffer.
    Slots,
    Params,
    Context,
    Meta,
}

impl ScopeKind {
    pub fn default_order() -> Vec<ScopeKind> {
        vec![
            ScopeKind::Locals,
            ScopeKind::Params,
            ScopeKind::Slots,
            ScopeKind::Context,
            ScopeKind::Meta,
        ]
    }
}

/// Execution state of one prompt: named slots plus a stack of local frames.
///
/// A child environment is a copy with a fresh innermost frame, so writes made
/// inside it never reach the parent unless they are copied back explicitly
/// with [`Environment::into_parent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    slots: ValueObject,
    frames: Vec<ValueObject>,
}

impl Environment {
    pub fn new() -> Self {
        let mut env = Self::default();
        for slot in [
            slots::PARAMS,
            slots::META,
            slots::CONTEXT,
            slots::CONSTRAINTS,
            slots::OUTPUT,
            slots::HOOKS,
        ] {
            env.slots.insert(slot.to_string(), Value::empty_object());
        }
        env.slots
            .insert(slots::TECHNIQUES.to_string(), Value::Array(Vec::new()));
        env
    }

    pub fn with_params(params: ValueObject) -> Self {
        let mut env = Self::new();
        env.set_slot(slots::PARAMS, Value::Object(params));
        env
    }

    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    pub fn slot_object(&self, name: &str) -> Option<&ValueObject> {
        self.slot(name).and_then(Value::as_object)
    }

    /// Member of an object slot, e.g. `params.topic`.
    pub fn slot_member(&self, slot: &str, name: &str) -> Option<Value> {
        self.slot_object(slot).and_then(|object| object.get(name).cloned())
    }

    pub fn set_slot(&mut self, name: &str, value: Value) {
        self.slots.insert(name.to_string(), value);
    }

    pub fn set_slot_field(&mut self, slot: &str, field: &str, value: Value) {
        let entry = self
            .slots
            .entry(slot.to_string())
            .or_insert_with(Value::empty_object);
        if entry.as_object().is_none() {
            *entry = Value::empty_object();
        }
        if let Some(object) = entry.as_object_mut() {
            object.insert(field.to_string(), value);
        }
    }

    pub fn push_slot_item(&mut self, slot: &str, value: Value) {
        let entry = self
            .slots
            .entry(slot.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(values) => values.push(value),
            other => *other = Value::Array(vec![value]),
        }
    }

    pub fn params(&self) -> ValueObject {
        self.slot_object(slots::PARAMS).cloned().unwrap_or_default()
    }

    pub fn child(&self) -> Self {
        let mut child = self.clone();
        child.frames.push(ValueObject::new());
        child
    }

    pub fn extend(&self, name: &str, value: Value) -> Self {
        let mut child = self.child();
        child.bind(name, value);
        child
    }

    /// Drops the innermost frame, keeping every write made to outer frames and slots.
    pub fn into_parent(mut self) -> Self {
        self.frames.pop();
        self
    }

    /// Binds in the innermost frame, shadowing outer bindings.
    pub fn bind(&mut self, name: &str, value: Value) {
        if self.frames.is_empty() {
            self.frames.push(ValueObject::new());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Assignment to a bare name: updates the nearest local binding, then a slot of
    /// that name, and otherwise creates a binding in the innermost frame.
    pub fn assign(&mut self, name: &str, value: Value) {
        if let Some(frame) = self
            .frames
            .iter_mut()
            .rev()
            .find(|frame| frame.contains_key(name))
        {
            frame.insert(name.to_string(), value);
            return;
        }
        if self.slots.contains_key(name) {
            self.set_slot(name, value);
            return;
        }
        self.bind(name, value);
    }

    /// Current value of an assignment root, local bindings first.
    pub fn current(&self, name: &str) -> Option<&Value> {
        self.lookup_local(name).or_else(|| self.slot(name))
    }

    pub fn resolve(&self, name: &str, order: &[ScopeKind]) -> Option<Value> {
        order.iter().find_map(|kind| match kind {
            ScopeKind::Locals => self.lookup_local(name).cloned(),
            ScopeKind::Slots => self.slot(name).cloned(),
            ScopeKind::Params => self.slot_member(slots::PARAMS, name),
            ScopeKind::Context => self.slot_member(slots::CONTEXT, name),
            ScopeKind::Meta => self.slot_member(slots::META, name),
        })
    }

    /// Serialized view handed to model calls: every slot, with local bindings
    /// flattened on top (inner frames win).
    pub fn to_json(&self) -> serde_json::Value {
        let mut merged = self.slots.clone();
        for frame in &self.frames {
            for (name, value) in frame {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged.to_json()
    }
}
