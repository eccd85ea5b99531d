use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::ast::{Block, Expr, Field, Ident};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum TechniqueKind {
    #[strum(serialize = "chainOfThought")]
    ChainOfThought,
    #[strum(serialize = "fewShot")]
    FewShot,
    #[strum(serialize = "zeroShot")]
    ZeroShot,
    #[strum(serialize = "selfConsistency")]
    SelfConsistency,
    #[strum(serialize = "treeOfThoughts")]
    TreeOfThoughts,
    #[strum(serialize = "activePrompting")]
    ActivePrompting,
    #[strum(serialize = "reWOO")]
    ReWOO,
    #[strum(serialize = "reAct")]
    ReAct,
    #[strum(serialize = "reflection")]
    Reflection,
    #[strum(serialize = "expertPrompting")]
    ExpertPrompting,
    #[strum(serialize = "ape")]
    APE,
    #[strum(serialize = "autoCot")]
    AutoCoT,
    #[strum(serialize = "art")]
    ART,
}

common_struct! {
    pub struct CotStep {
        pub name: String,
        pub block: Block,
    }
}

common_struct! {
    pub struct FewShotExample {
        pub input: Block,
        pub output: Block,
    }
}

common_struct! {
    pub struct ReWooBlocks {
        pub planner: Block,
        pub worker: Block,
        pub solver: Block,
    }
}

common_struct! {
    pub struct ReActBlocks {
        pub observation: Block,
        pub thought: Block,
        pub action: Block,
    }
}

common_struct! {
    /// `name: expr;` settings of a field-driven technique.
    pub struct TechniqueFields {
        pub fields: Vec<Field>,
    }
}
impl TechniqueFields {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }
    /// Last declaration wins, mirroring object literal semantics.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.fields
            .iter()
            .rev()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.fields.iter().map(|field| &field.name)
    }
}
impl<K: Into<Ident>> FromIterator<(K, Expr)> for TechniqueFields {
    fn from_iter<T: IntoIterator<Item = (K, Expr)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| Field::new(name, value))
                .collect(),
        )
    }
}

common_enum! {
    pub enum Technique {
        ChainOfThought(Vec<CotStep>),
        FewShot(Vec<FewShotExample>),
        ZeroShot(TechniqueFields),
        SelfConsistency(TechniqueFields),
        TreeOfThoughts(TechniqueFields),
        ActivePrompting(TechniqueFields),
        ReWOO(ReWooBlocks),
        ReAct(ReActBlocks),
        Reflection(TechniqueFields),
        ExpertPrompting(TechniqueFields),
        APE(TechniqueFields),
        AutoCoT(TechniqueFields),
        ART(TechniqueFields),
    }
}

impl Technique {
    pub fn kind(&self) -> TechniqueKind {
        match self {
            Technique::ChainOfThought(_) => TechniqueKind::ChainOfThought,
            Technique::FewShot(_) => TechniqueKind::FewShot,
            Technique::ZeroShot(_) => TechniqueKind::ZeroShot,
            Technique::SelfConsistency(_) => TechniqueKind::SelfConsistency,
            Technique::TreeOfThoughts(_) => TechniqueKind::TreeOfThoughts,
            Technique::ActivePrompting(_) => TechniqueKind::ActivePrompting,
            Technique::ReWOO(_) => TechniqueKind::ReWOO,
            Technique::ReAct(_) => TechniqueKind::ReAct,
            Technique::Reflection(_) => TechniqueKind::Reflection,
            Technique::ExpertPrompting(_) => TechniqueKind::ExpertPrompting,
            Technique::APE(_) => TechniqueKind::APE,
            Technique::AutoCoT(_) => TechniqueKind::AutoCoT,
            Technique::ART(_) => TechniqueKind::ART,
        }
    }

    /// Builds a field-driven technique from its kind name, as front-ends emit it.
    pub fn from_fields(kind: &str, fields: TechniqueFields) -> crate::Result<Self> {
        let kind: TechniqueKind = kind.parse()?;
        let technique = match kind {
            TechniqueKind::ZeroShot => Technique::ZeroShot(fields),
            TechniqueKind::SelfConsistency => Technique::SelfConsistency(fields),
            TechniqueKind::TreeOfThoughts => Technique::TreeOfThoughts(fields),
            TechniqueKind::ActivePrompting => Technique::ActivePrompting(fields),
            TechniqueKind::Reflection => Technique::Reflection(fields),
            TechniqueKind::ExpertPrompting => Technique::ExpertPrompting(fields),
            TechniqueKind::APE => Technique::APE(fields),
            TechniqueKind::AutoCoT => Technique::AutoCoT(fields),
            TechniqueKind::ART => Technique::ART(fields),
            TechniqueKind::ChainOfThought
            | TechniqueKind::FewShot
            | TechniqueKind::ReWOO
            | TechniqueKind::ReAct => {
                crate::bail!("technique '{}' is block-structured and takes no fields", kind)
            }
        };
        Ok(technique)
    }
}
