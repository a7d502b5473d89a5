//! Function templates and their type-specialized signatures.

use serde::{Deserialize, Serialize};

use crate::{Ast, BlockId, BlockOwner, FunctionId, SignatureId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    Plain,
    /// Spliced into each `foreach` that calls it instead of being called.
    Iterator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub kind: FunctionKind,
    pub span: Span,
    pub signatures: Vec<SignatureId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub function: FunctionId,
    /// The specialized body; parameters are the first variables of this block.
    pub body: BlockId,
    /// Part of the concretely compiled program.
    pub instantiated: bool,
    pub span: Span,
}

impl Ast {
    pub fn add_function(&mut self, name: impl Into<String>, kind: FunctionKind, span: Span) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Function {
            name: name.into(),
            kind,
            span,
            signatures: Vec::new(),
        });
        id
    }

    /// Add a signature of `function` with a fresh, empty body block.
    pub fn add_signature(&mut self, function: FunctionId, instantiated: bool, span: Span) -> SignatureId {
        let id = SignatureId(self.signatures.len() as u32);
        let body = self.create_block(span);
        self.block_mut(body).owner = BlockOwner::Signature(id);
        self.signatures.push(Signature {
            function,
            body,
            instantiated,
            span,
        });
        self.functions[function.index()].signatures.push(id);
        id
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        self.functions
            .get(id.index())
            .unwrap_or_else(|| panic!("use of unknown {id}"))
    }

    pub fn signature(&self, id: SignatureId) -> &Signature {
        self.signatures
            .get(id.index())
            .unwrap_or_else(|| panic!("use of unknown {id}"))
    }

    pub fn set_signature_instantiated(&mut self, id: SignatureId, instantiated: bool) {
        if let Some(signature) = self.signatures.get_mut(id.index()) {
            signature.instantiated = instantiated;
        }
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> {
        (0..self.functions.len() as u32).map(FunctionId)
    }

    pub fn signature_ids(&self) -> impl Iterator<Item = SignatureId> {
        (0..self.signatures.len() as u32).map(SignatureId)
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.function_ids().find(|&f| self.function(f).name == name)
    }

    /// The signature whose body is `block`, if `block` is a signature body.
    pub fn block_signature(&self, block: BlockId) -> Option<SignatureId> {
        match self.block(block).owner {
            BlockOwner::Signature(signature) => Some(signature),
            _ => None,
        }
    }
}
