use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A value travelling through a stage.
///
/// Elements are type-erased so that a single process-wide registry can serve
/// every pipeline regardless of what it carries.
pub type Element = serde_json::Value;

// ---------------------------------------------------------------------------
// Stage classification
// ---------------------------------------------------------------------------

/// How many values a stage may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Zero or one value.
    Single,
    /// Zero to many values.
    Multi,
}

impl Arity {
    /// Token prepended to structural type tags.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Multi => "Multi",
        }
    }
}

/// Closed classification computed once when a stage is created.
///
/// Decoration selection is a total match over this tag; nothing inspects a
/// stage at runtime to discover what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageKind {
    pub arity: Arity,
    /// Supports the synchronous/conditional fast-path delivery optimisation.
    pub fusable: bool,
    /// Hot stage shared by many independent observers. Never decorated.
    pub shared: bool,
}

impl StageKind {
    pub const fn single() -> Self {
        Self { arity: Arity::Single, fusable: false, shared: false }
    }

    pub const fn multi() -> Self {
        Self { arity: Arity::Multi, fusable: false, shared: false }
    }

    pub const fn fused(self) -> Self {
        Self { fusable: true, ..self }
    }

    pub const fn hot(self) -> Self {
        Self { shared: true, ..self }
    }

    pub fn is_multi(&self) -> bool {
        self.arity == Arity::Multi
    }

    pub fn shape(&self) -> DecoratorShape {
        match (self.arity, self.fusable) {
            (Arity::Single, false) => DecoratorShape::SinglePeek,
            (Arity::Single, true) => DecoratorShape::SinglePeekFusable,
            (Arity::Multi, false) => DecoratorShape::MultiPeek,
            (Arity::Multi, true) => DecoratorShape::MultiPeekFusable,
        }
    }
}

/// The four decorator shapes, arity × fusability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorShape {
    SinglePeek,
    SinglePeekFusable,
    MultiPeek,
    MultiPeekFusable,
}

impl DecoratorShape {
    /// Type tag of an observation layer of this shape.
    pub fn peek_tag(self) -> &'static str {
        match self {
            Self::SinglePeek => "SinglePeek",
            Self::SinglePeekFusable => "SinglePeekFusable",
            Self::MultiPeek => "MultiPeek",
            Self::MultiPeekFusable => "MultiPeekFusable",
        }
    }

    /// Type tag of an assembly-capture layer of this shape.
    pub fn assembly_tag(self) -> &'static str {
        match self {
            Self::SinglePeek => "SingleOnAssembly",
            Self::SinglePeekFusable => "SingleOnAssemblyFusable",
            Self::MultiPeek => "MultiOnAssembly",
            Self::MultiPeekFusable => "MultiOnAssemblyFusable",
        }
    }
}

// ---------------------------------------------------------------------------
// Faults
// ---------------------------------------------------------------------------

/// A fault raised inside a pipeline.
///
/// Cheap to clone: the underlying error is shared. Secondary diagnostics
/// (assembly origins, the element being processed, ...) are kept as
/// suppressed notes rather than replacing the root cause.
#[derive(Clone)]
pub struct Fault {
    error: Arc<anyhow::Error>,
    suppressed: Vec<String>,
}

impl Fault {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self { error: Arc::new(error.into()), suppressed: Vec::new() }
    }

    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::new(anyhow::Error::msg(message))
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn suppressed(&self) -> &[String] {
        &self.suppressed
    }

    pub fn with_suppressed(mut self, note: impl Into<String>) -> Self {
        self.suppressed.push(note.into());
        self
    }

    /// True when both faults share the same root error.
    pub fn same_cause(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.error, &other.error)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        for note in &self.suppressed {
            write!(f, "\n\tSuppressed: {note}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("error", &self.error)
            .field("suppressed", &self.suppressed)
            .finish()
    }
}

/// What a stage was handling when a fault was raised.
#[derive(Debug, Clone)]
pub enum FaultContext {
    Value(Element),
    Fault(Fault),
}

impl FaultContext {
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => format!("while processing value {value}"),
            Self::Fault(fault) => format!("while handling fault {}", fault.error()),
        }
    }
}
