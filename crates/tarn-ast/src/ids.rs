//! Stable handles into the [`Ast`](crate::Ast) arena.
//!
//! Handles are plain indices. They stay valid across every splice, move and
//! copy; only destroying a node invalidates its handle.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// An ordered statement list plus its variables.
    BlockId,
    "block"
);
arena_id!(
    /// A statement linked into exactly one block.
    StatementId,
    "stmt"
);
arena_id!(
    /// An expression node; owned by a statement, a variable or another expression.
    ExpressionId,
    "expr"
);
arena_id!(
    /// A parameter or local declared in a block.
    VariableId,
    "var"
);
arena_id!(
    /// A generic function template.
    FunctionId,
    "fn"
);
arena_id!(
    /// A type-specialized instance of a function.
    SignatureId,
    "sig"
);
