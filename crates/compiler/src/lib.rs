//! Dungeon compiler front-end
//!
//! Lexical and structural parsing for Dungeon source: raw text in,
//! classified [`Sentence`] values out. Each sentence carries its tokens,
//! the modifiers and kind, the enclosing-block identity and the code labels
//! later compilation stages jump to.
//!
//! ```rust
//! use dunc::{Parser, ParserConfig, SentenceKind};
//!
//! let source = ".implem\nmain:\nvar int x\n:main\n";
//! let mut parser = Parser::from_source("demo.dun", source, ParserConfig::default());
//! parser.set_type_ids("int");
//!
//! let mut kinds = Vec::new();
//! while let Some(sentence) = parser.next_sentence().unwrap() {
//!     kinds.push(sentence.kind);
//! }
//! assert_eq!(
//!     kinds,
//!     vec![
//!         SentenceKind::Implem,
//!         SentenceKind::Main,
//!         SentenceKind::VarDecl,
//!         SentenceKind::EndMain
//!     ]
//! );
//! ```

pub mod blocks;
pub mod config;
pub mod diag;
mod lexer;
pub mod parser;
pub mod reader;
pub mod sentence;
pub mod state;
pub mod token;

pub use blocks::{
    block_def, block_id, block_id_name, CodeBlock, CodeBlockDef, CodeBlockId, LabelKind,
};
pub use config::ParserConfig;
pub use diag::Diag;
pub use parser::Parser;
pub use reader::Origin;
pub use sentence::{Sentence, SentenceKind};
pub use state::ParserState;
pub use token::{Keyword, Operator, Punctuator, Token, TokenClass, TokenKind};
