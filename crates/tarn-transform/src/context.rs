//! State threaded through one run of the inliner.

use tarn_ast::SignatureId;

/// Which signature is being transformed, and whether we are in the middle of
/// splicing an iterator. Passed to the binder on every rebind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineContext {
    pub signature: Option<SignatureId>,
    pub in_iterator: bool,
}

impl InlineContext {
    pub fn for_signature(signature: SignatureId) -> Self {
        Self {
            signature: Some(signature),
            in_iterator: false,
        }
    }
}
