use crate::ast::Ident;
use crate::ops::{BinOpKind, LogicalOpKind, UnOpKind};

pub type BExpr = Box<Expr>;

common_enum! {
    /// Closed expression grammar; there is no way to express mutation or host code.
    pub enum Expr {
        Identifier(Ident),
        String(String),
        Number(f64),
        Boolean(bool),
        Null,
        Array(ExprArray),
        Object(ExprObject),
        Binary(ExprBinary),
        Logical(ExprLogical),
        Unary(ExprUnary),
        Member(ExprMember),
        Call(ExprCall),
    }
}

common_struct! {
    pub struct ExprArray {
        pub elements: Vec<Expr>,
    }
}

common_struct! {
    pub struct ObjectProperty {
        pub key: String,
        pub value: Expr,
    }
}

common_struct! {
    /// Properties in document order; a repeated key keeps the last value.
    pub struct ExprObject {
        pub properties: Vec<ObjectProperty>,
    }
}

common_struct! {
    pub struct ExprBinary {
        pub op: BinOpKind,
        pub lhs: BExpr,
        pub rhs: BExpr,
    }
}

common_struct! {
    pub struct ExprLogical {
        pub op: LogicalOpKind,
        pub lhs: BExpr,
        pub rhs: BExpr,
    }
}

common_struct! {
    pub struct ExprUnary {
        pub op: UnOpKind,
        pub operand: BExpr,
    }
}

common_enum! {
    pub enum MemberProperty {
        /// `object.name`
        Named(Ident),
        /// `object[expr]`
        Computed(BExpr),
    }
}

common_struct! {
    pub struct ExprMember {
        pub object: BExpr,
        pub property: MemberProperty,
    }
}
impl ExprMember {
    pub fn computed(&self) -> bool {
        matches!(self.property, MemberProperty::Computed(_))
    }
}

common_struct! {
    pub struct ExprCall {
        pub callee: BExpr,
        pub args: Vec<Expr>,
    }
}

impl Expr {
    pub fn ident(name: impl Into<Ident>) -> Expr {
        Expr::Identifier(name.into())
    }
    pub fn string(s: impl Into<String>) -> Expr {
        Expr::String(s.into())
    }
    pub fn number(n: f64) -> Expr {
        Expr::Number(n)
    }
    pub fn bool(b: bool) -> Expr {
        Expr::Boolean(b)
    }
    pub fn array(elements: Vec<Expr>) -> Expr {
        Expr::Array(ExprArray { elements })
    }
    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, Expr)>) -> Expr {
        Expr::Object(ExprObject {
            properties: properties
                .into_iter()
                .map(|(key, value)| ObjectProperty {
                    key: key.into(),
                    value,
                })
                .collect(),
        })
    }
    pub fn binary(op: BinOpKind, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(ExprBinary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }
    pub fn logical(op: LogicalOpKind, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Logical(ExprLogical {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }
    pub fn unary(op: UnOpKind, operand: Expr) -> Expr {
        Expr::Unary(ExprUnary {
            op,
            operand: Box::new(operand),
        })
    }
    pub fn member(object: Expr, name: impl Into<Ident>) -> Expr {
        Expr::Member(ExprMember {
            object: Box::new(object),
            property: MemberProperty::Named(name.into()),
        })
    }
    pub fn index(object: Expr, property: Expr) -> Expr {
        Expr::Member(ExprMember {
            object: Box::new(object),
            property: MemberProperty::Computed(Box::new(property)),
        })
    }
    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(ExprCall {
            callee: Box::new(callee),
            args,
        })
    }
    /// `a.b.c` as an identifier followed by named member accesses.
    pub fn path(dotted: &str) -> Expr {
        let mut segments = dotted.split('.');
        let root = Expr::ident(segments.next().unwrap_or_default());
        segments.fold(root, |object, name| Expr::member(object, name))
    }

    /// Name of the root identifier of an identifier/member chain.
    pub fn root_ident(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name.as_str()),
            Expr::Member(member) => member.object.root_ident(),
            _ => None,
        }
    }
}
