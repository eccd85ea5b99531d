use crate::ast::{Expr, Ident};

common_enum! {
    pub enum TemplatePart {
        Text(String),
        /// `${expr}`
        Interpolation(Expr),
    }
}

common_struct! {
    /// Backtick string: literal text interleaved with interpolations.
    pub struct Template {
        pub parts: Vec<TemplatePart>,
    }
}
impl Template {
    pub fn new(parts: Vec<TemplatePart>) -> Self {
        Self { parts }
    }
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![TemplatePart::Text(text.into())],
        }
    }
    pub fn push_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(TemplatePart::Text(text.into()));
        self
    }
    pub fn push_expr(mut self, expr: Expr) -> Self {
        self.parts.push(TemplatePart::Interpolation(expr));
        self
    }
}

common_enum! {
    /// Statements shared by body content, technique blocks and hook bodies.
    pub enum Stmt {
        Text(StmtText),
        Code(StmtCode),
        Image(StmtImage),
        If(StmtIf),
        For(StmtFor),
        Use(StmtUse),
        Assign(StmtAssign),
        Return(StmtReturn),
        Expr(Expr),
    }
}

pub type Block = Vec<Stmt>;

common_struct! {
    pub struct StmtText {
        pub template: Template,
    }
}

common_struct! {
    pub struct StmtCode {
        pub language: String,
        pub content: Template,
    }
}

common_struct! {
    pub struct StmtImage {
        pub src: Expr,
        pub alt: Expr,
    }
}

common_struct! {
    pub struct StmtIf {
        pub cond: Expr,
        pub then: Block,
        pub elze: Option<Block>,
    }
}

common_struct! {
    pub struct StmtFor {
        pub binding: Ident,
        pub iterable: Expr,
        pub body: Block,
    }
}

common_struct! {
    pub struct ParamAssignment {
        pub name: Ident,
        pub value: Expr,
    }
}

common_struct! {
    /// `use Other with { name: expr, ... };`
    pub struct StmtUse {
        pub prompt: Ident,
        pub args: Vec<ParamAssignment>,
    }
}

common_struct! {
    /// `target = value;` where target is an identifier or a member chain.
    pub struct StmtAssign {
        pub target: Expr,
        pub value: Expr,
    }
}

common_struct! {
    pub struct StmtReturn {
        pub value: Expr,
    }
}

impl Stmt {
    pub fn text(template: Template) -> Self {
        Stmt::Text(StmtText { template })
    }
    pub fn code(language: impl Into<String>, content: Template) -> Self {
        Stmt::Code(StmtCode {
            language: language.into(),
            content,
        })
    }
    pub fn image(src: Expr, alt: Expr) -> Self {
        Stmt::Image(StmtImage { src, alt })
    }
    pub fn if_else(cond: Expr, then: Block, elze: Option<Block>) -> Self {
        Stmt::If(StmtIf { cond, then, elze })
    }
    pub fn for_each(binding: impl Into<Ident>, iterable: Expr, body: Block) -> Self {
        Stmt::For(StmtFor {
            binding: binding.into(),
            iterable,
            body,
        })
    }
    pub fn use_prompt<K: Into<Ident>>(
        prompt: impl Into<Ident>,
        args: impl IntoIterator<Item = (K, Expr)>,
    ) -> Self {
        Stmt::Use(StmtUse {
            prompt: prompt.into(),
            args: args
                .into_iter()
                .map(|(name, value)| ParamAssignment {
                    name: name.into(),
                    value,
                })
                .collect(),
        })
    }
    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign(StmtAssign { target, value })
    }
    pub fn ret(value: Expr) -> Self {
        Stmt::Return(StmtReturn { value })
    }

    /// Statements that only make sense while assembling body text.
    pub fn is_body_only(&self) -> bool {
        matches!(
            self,
            Stmt::Text(_) | Stmt::Code(_) | Stmt::Image(_) | Stmt::Use(_)
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Stmt::Text(_) => "text block",
            Stmt::Code(_) => "code block",
            Stmt::Image(_) => "image block",
            Stmt::If(_) => "if statement",
            Stmt::For(_) => "for loop",
            Stmt::Use(_) => "use statement",
            Stmt::Assign(_) => "assignment",
            Stmt::Return(_) => "return statement",
            Stmt::Expr(_) => "expression statement",
        }
    }
}
