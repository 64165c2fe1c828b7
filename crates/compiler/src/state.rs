//! Snapshotable parser state
//!
//! Everything a sentence-level error may need to roll back lives here. The
//! stacks are shallow (bounded by block nesting), so snapshots are plain
//! value copies.

use crate::blocks::{CodeBlockDef, CodeBlockId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    /// Base label counter shared by all jump-producing blocks of the
    /// current subroutine
    pub global_base_label: i16,
    /// Open code blocks, innermost last; bottom is always `Init`
    pub block_stack: Vec<CodeBlockDef>,
    /// Ids of blocks closed since the last `clear_closed_blocks`
    pub closed_blocks: Vec<CodeBlockId>,
    /// Deferred ids published when the matching end sentence arrives
    /// (carries a `switch` id to its `:switch`)
    pub del_stack: Vec<CodeBlockId>,
    /// Known type identifiers, set by the semantic layer
    pub type_list: Vec<String>,
}

impl ParserState {
    pub fn reset(&mut self) {
        *self = ParserState::default();
    }

    /// Printable form of the open block stack, outermost first.
    pub fn print_blocks(&self) -> String {
        self.block_stack
            .iter()
            .map(CodeBlockDef::describe)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
