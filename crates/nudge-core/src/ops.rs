use std::fmt::{Display, Formatter};

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum BinOpKind {
        Add,
        Sub,
        Mul,
        Div,
        Mod,
        Eq,
        Ne,
        Lt,
        Gt,
        Le,
        Ge,
    }
}
impl BinOpKind {
    pub fn is_ret_bool(&self) -> bool {
        matches!(
            self,
            BinOpKind::Gt
                | BinOpKind::Lt
                | BinOpKind::Ge
                | BinOpKind::Le
                | BinOpKind::Eq
                | BinOpKind::Ne
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod
        )
    }
}
impl Display for BinOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOpKind::Add => write!(f, "+"),
            BinOpKind::Sub => write!(f, "-"),
            BinOpKind::Mul => write!(f, "*"),
            BinOpKind::Div => write!(f, "/"),
            BinOpKind::Mod => write!(f, "%"),
            BinOpKind::Eq => write!(f, "=="),
            BinOpKind::Ne => write!(f, "!="),
            BinOpKind::Lt => write!(f, "<"),
            BinOpKind::Gt => write!(f, ">"),
            BinOpKind::Le => write!(f, "<="),
            BinOpKind::Ge => write!(f, ">="),
        }
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum LogicalOpKind {
        And,
        Or,
    }
}
impl Display for LogicalOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOpKind::And => write!(f, "&&"),
            LogicalOpKind::Or => write!(f, "||"),
        }
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum UnOpKind {
        Not,
        Neg,
    }
}
impl Display for UnOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOpKind::Not => write!(f, "!"),
            UnOpKind::Neg => write!(f, "-"),
        }
    }
}
