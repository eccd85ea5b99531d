use std::fmt::{Display, Formatter};

use crate::ast::{Block, Expr, Ident, Technique};

common_struct! {
    pub struct Field {
        pub name: Ident,
        pub value: Expr,
    }
}
impl Field {
    pub fn new(name: impl Into<Ident>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum ParamBase {
        String,
        Number,
        Boolean,
        Array,
        Object,
    }
}

common_struct! {
    /// `string`, `number[]`, `object?`, `string[]?`
    pub struct ParamType {
        pub base: ParamBase,
        pub array: bool,
        pub optional: bool,
    }
}
impl ParamType {
    pub fn new(base: ParamBase) -> Self {
        Self {
            base,
            array: false,
            optional: false,
        }
    }
    pub fn array_of(mut self) -> Self {
        self.array = true;
        self
    }
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}
impl Display for ParamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let base = match self.base {
            ParamBase::String => "string",
            ParamBase::Number => "number",
            ParamBase::Boolean => "boolean",
            ParamBase::Array => "array",
            ParamBase::Object => "object",
        };
        write!(f, "{}", base)?;
        if self.array {
            write!(f, "[]")?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

common_struct! {
    pub struct ParamDeclaration {
        pub name: Ident,
        pub ty: ParamType,
        pub default: Option<Expr>,
    }
}
impl ParamDeclaration {
    pub fn required(name: impl Into<Ident>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }
    pub fn with_default(name: impl Into<Ident>, ty: ParamType, default: Expr) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }
}

common_struct! {
    /// A named pre/post-processing block with a single formal parameter.
    pub struct HookDef {
        pub name: Ident,
        pub param: Ident,
        pub body: Block,
    }
}
impl HookDef {
    pub fn new(name: impl Into<Ident>, param: impl Into<Ident>, body: Block) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
            body,
        }
    }
}

common_enum! {
    pub enum Section {
        Meta(Vec<Field>),
        Context(Vec<Field>),
        Params(Vec<ParamDeclaration>),
        Body(Block),
        Constraints(Vec<Field>),
        Output(Vec<Field>),
        Hooks(Vec<HookDef>),
        Technique(Vec<Technique>),
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash, PartialOrd, Ord)]
    /// Declared in canonical execution order.
    pub enum SectionKind {
        Meta,
        Context,
        Params,
        Body,
        Constraints,
        Output,
        Hooks,
        Technique,
    }
}
impl Display for SectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SectionKind::Meta => "meta",
            SectionKind::Context => "context",
            SectionKind::Params => "params",
            SectionKind::Body => "body",
            SectionKind::Constraints => "constraints",
            SectionKind::Output => "output",
            SectionKind::Hooks => "hooks",
            SectionKind::Technique => "technique",
        };
        f.write_str(name)
    }
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Meta(_) => SectionKind::Meta,
            Section::Context(_) => SectionKind::Context,
            Section::Params(_) => SectionKind::Params,
            Section::Body(_) => SectionKind::Body,
            Section::Constraints(_) => SectionKind::Constraints,
            Section::Output(_) => SectionKind::Output,
            Section::Hooks(_) => SectionKind::Hooks,
            Section::Technique(_) => SectionKind::Technique,
        }
    }
}
