use crate::ast::{HookDef, Ident, Section};

common_struct! {
    pub struct Prompt {
        pub name: Ident,
        pub sections: Vec<Section>,
    }
}

impl Prompt {
    pub fn new(name: impl Into<Ident>, sections: Vec<Section>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    pub fn hooks(&self) -> impl Iterator<Item = &HookDef> {
        self.sections.iter().flat_map(|section| match section {
            Section::Hooks(hooks) => hooks.as_slice(),
            _ => &[][..],
        })
    }

    /// The last definition wins when a hook name is declared twice.
    pub fn hook(&self, name: &str) -> Option<&HookDef> {
        self.hooks().filter(|hook| hook.name == name).last()
    }
}

common_struct! {
    pub struct Program {
        pub prompts: Vec<Prompt>,
    }
}

impl Program {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    pub fn entry(&self) -> Option<&Prompt> {
        self.prompts.first()
    }

    pub fn prompt(&self, name: &str) -> Option<&Prompt> {
        self.prompts.iter().rev().find(|prompt| prompt.name == name)
    }
}

impl From<Prompt> for Program {
    fn from(prompt: Prompt) -> Self {
        Self::new(vec![prompt])
    }
}
