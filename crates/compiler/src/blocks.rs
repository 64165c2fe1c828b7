//! Code blocks, the block grammar table and code-label formatting
//!
//! Each [`CodeBlock`] value sits on its own bit so that the set of blocks a
//! sentence may appear in is a single `u32` mask and the legality check is
//! one AND. The [`SENTENCE_DEFS`] table drives the whole structural pass:
//! for every sentence kind it gives the stack action, the block the action
//! introduces, the jump mode for label assignment, the deferred-deletion
//! flags used by `switch`/`:switch`, and the allowance mask.

use crate::sentence::SentenceKind;

/// Lexical scope kinds. Bit values form a mask space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CodeBlock {
    Init = 0x0000_0001,
    Libs = 0x0000_0002,
    Public = 0x0000_0004,
    Private = 0x0000_0008,
    Implem = 0x0000_0010,
    Local = 0x0000_0020,
    Class = 0x0000_0040,
    Publ = 0x0000_0080,
    Priv = 0x0000_0100,
    Enum = 0x0000_0200,
    Switch = 0x0000_0400,
    FirstWhen = 0x0000_0800,
    NextWhen = 0x0000_1000,
    Default = 0x0000_2000,
    DoLoop = 0x0000_4000,
    While = 0x0000_8000,
    If = 0x0001_0000,
    ElseIf = 0x0002_0000,
    Else = 0x0004_0000,
    For = 0x0008_0000,
    Walk = 0x0010_0000,
}

impl CodeBlock {
    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub(crate) fn from_bits(bits: u32) -> Option<CodeBlock> {
        use CodeBlock::*;
        Some(match bits {
            0x0000_0001 => Init,
            0x0000_0002 => Libs,
            0x0000_0004 => Public,
            0x0000_0008 => Private,
            0x0000_0010 => Implem,
            0x0000_0020 => Local,
            0x0000_0040 => Class,
            0x0000_0080 => Publ,
            0x0000_0100 => Priv,
            0x0000_0200 => Enum,
            0x0000_0400 => Switch,
            0x0000_0800 => FirstWhen,
            0x0000_1000 => NextWhen,
            0x0000_2000 => Default,
            0x0000_4000 => DoLoop,
            0x0000_8000 => While,
            0x0001_0000 => If,
            0x0002_0000 => ElseIf,
            0x0004_0000 => Else,
            0x0008_0000 => For,
            0x0010_0000 => Walk,
            _ => return None,
        })
    }

    /// Three-letter id used inside textual code labels. Empty for blocks
    /// that never produce jumps.
    pub fn jump_id(self) -> &'static str {
        use CodeBlock::*;
        match self {
            Switch | FirstWhen | NextWhen | Default => "swi",
            DoLoop => "dlp",
            While => "whi",
            If | ElseIf | Else => "ifs",
            For => "for",
            Walk => "wlk",
            Init | Libs | Public | Private | Implem | Local | Class | Publ | Priv | Enum => "",
        }
    }

    pub fn name(self) -> &'static str {
        use CodeBlock::*;
        match self {
            Init => "Init",
            Libs => "Libs",
            Public => "ModPublic",
            Private => "ModPrivate",
            Implem => "Implementation",
            Local => "Local",
            Class => "Class",
            Publ => "ClassPublic",
            Priv => "ClassPrivate",
            Enum => "Enum",
            Switch => "Switch",
            FirstWhen => "FirstCase",
            NextWhen => "NextCase",
            Default => "Default",
            DoLoop => "DoLoop",
            While => "WhileLoop",
            If => "If",
            ElseIf => "ElseIf",
            Else => "Else",
            For => "For",
            Walk => "Walk",
        }
    }

    /// Blocks `break`/`continue` can target.
    pub fn is_loop(self) -> bool {
        matches!(
            self,
            CodeBlock::DoLoop | CodeBlock::While | CodeBlock::For | CodeBlock::Walk
        )
    }
}

/// A block on the parse stack together with its label counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockDef {
    pub block: CodeBlock,
    pub base_label: i16,
    pub sub_label: i16,
}

impl CodeBlockDef {
    pub fn new(block: CodeBlock) -> Self {
        CodeBlockDef {
            block,
            base_label: 0,
            sub_label: 0,
        }
    }

    pub fn describe(&self) -> String {
        format!("{{{}:{}:{}}}", self.block.name(), self.base_label, self.sub_label)
    }
}

/// Packed `(block << 32) | (base << 16) | sub` identity. Stable key stored
/// in sentences and the closed-block list.
pub type CodeBlockId = i64;

pub fn block_id(def: CodeBlockDef) -> CodeBlockId {
    ((def.block.bit() as i64) << 32) | ((def.base_label as i64) << 16) | def.sub_label as i64
}

pub fn block_def(id: CodeBlockId) -> CodeBlockDef {
    CodeBlockDef {
        block: CodeBlock::from_bits(((id >> 32) & 0xFFFF_FFFF) as u32)
            .expect("block id with unknown block bits"),
        base_label: ((id >> 16) & 0xFFFF) as i16,
        sub_label: (id & 0xFFFF) as i16,
    }
}

pub fn block_id_name(id: CodeBlockId) -> &'static str {
    block_def(id).block.name()
}

/// Stack mutation a sentence performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    Push,
    Pop,
    Keep,
    Replace,
}

/// How a sentence transforms the label counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpMode {
    /// No transition, labels of the current block apply
    None,
    /// Subroutine body opens (main, func, fmem, oper)
    BlockBeg,
    /// Subroutine body closes
    BlockEnd,
    /// do/while/for/walk opens
    LoopBeg,
    /// Matching loop end
    LoopEnd,
    /// if, first switch case
    FirstCase,
    /// elif, next switch case
    NextCase,
    /// else, default
    LastCase,
    /// :if, :switch
    EndCase,
}

/// Textual label families emitted for branch/jump code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    NextBlock,
    LoopBeg,
    LoopEnd,
    LoopExit,
    LoopNext,
    CurrCond,
    PrevCond,
    NextCond,
    Exit,
}

/// Width of the zero-padded counter inside code labels; counters whose
/// decimal form exceeds it abort the parse.
pub const CODE_LABEL_LEN: usize = 5;

/// Render a code label from the label fields of a sentence.
pub fn format_label(
    kind: LabelKind,
    base_label: i32,
    sub_label: i32,
    block_id: &str,
    loop_label: i32,
    loop_id: &str,
) -> String {
    let pad = |n: i32| format!("{n:0width$}", width = CODE_LABEL_LEN);
    match kind {
        LabelKind::NextBlock => format!("{}{block_id}-next", pad(base_label)),
        LabelKind::LoopBeg => format!("{}{block_id}-beg", pad(base_label)),
        LabelKind::LoopEnd => format!("{}{block_id}-end", pad(base_label)),
        LabelKind::LoopExit => format!("{}{loop_id}-exit", pad(loop_label)),
        LabelKind::LoopNext => format!("{}{loop_id}-end", pad(loop_label)),
        LabelKind::CurrCond => format!("{}{block_id}-cond{sub_label}", pad(base_label)),
        LabelKind::PrevCond => format!("{}{block_id}-cond{}", pad(base_label), sub_label - 1),
        LabelKind::NextCond => format!("{}{block_id}-cond{}", pad(base_label), sub_label + 1),
        LabelKind::Exit => format!("{}{block_id}-exit", pad(base_label)),
    }
}

/// One row of the block grammar.
#[derive(Debug, Clone, Copy)]
pub struct SentenceDef {
    pub kind: SentenceKind,
    pub action: BlockAction,
    pub new_block: Option<CodeBlock>,
    pub jump: JumpMode,
    /// Push the introduced block id on the deferred-deletion stack
    pub push_del: bool,
    /// Pop the deferred-deletion stack and publish that id too
    pub pop_del: bool,
    /// Enclosing blocks in which the sentence is legal
    pub allowed: u32,
}

/// Blocks that behave as statement scope inside a subroutine body.
pub const LOCAL_SCOPE: u32 = CodeBlock::Local.bit()
    | CodeBlock::FirstWhen.bit()
    | CodeBlock::NextWhen.bit()
    | CodeBlock::Default.bit()
    | CodeBlock::DoLoop.bit()
    | CodeBlock::While.bit()
    | CodeBlock::If.bit()
    | CodeBlock::ElseIf.bit()
    | CodeBlock::Else.bit()
    | CodeBlock::For.bit()
    | CodeBlock::Walk.bit();

const fn def(
    kind: SentenceKind,
    action: BlockAction,
    new_block: Option<CodeBlock>,
    jump: JumpMode,
    push_del: bool,
    pop_del: bool,
    allowed: u32,
) -> SentenceDef {
    SentenceDef {
        kind,
        action,
        new_block,
        jump,
        push_del,
        pop_del,
        allowed,
    }
}

/// The block grammar. Scanned in order; the first row whose kind matches and
/// whose allowance mask contains the current block applies. `When` has two
/// rows so the first case of a `switch` is distinguished from later ones.
#[rustfmt::skip]
pub const SENTENCE_DEFS: [SentenceDef; 54] = [
    def(SentenceKind::Libs,        BlockAction::Replace, Some(CodeBlock::Libs),      JumpMode::None,      false, false, CodeBlock::Init.bit()),
    def(SentenceKind::Public,      BlockAction::Replace, Some(CodeBlock::Public),    JumpMode::None,      false, false, CodeBlock::Init.bit() | CodeBlock::Libs.bit()),
    def(SentenceKind::Private,     BlockAction::Replace, Some(CodeBlock::Private),   JumpMode::None,      false, false, CodeBlock::Init.bit() | CodeBlock::Libs.bit() | CodeBlock::Public.bit()),
    def(SentenceKind::Implem,      BlockAction::Replace, Some(CodeBlock::Implem),    JumpMode::None,      false, false, CodeBlock::Init.bit() | CodeBlock::Libs.bit() | CodeBlock::Public.bit() | CodeBlock::Private.bit()),
    def(SentenceKind::Set,         BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Init.bit()),
    def(SentenceKind::Import,      BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Libs.bit()),
    def(SentenceKind::Include,     BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Libs.bit()),
    def(SentenceKind::DefType,     BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Local.bit() | CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::DefClass,    BlockAction::Push,    Some(CodeBlock::Class),     JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Local.bit() | CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::Publ,        BlockAction::Replace, Some(CodeBlock::Publ),      JumpMode::None,      false, false, CodeBlock::Class.bit()),
    def(SentenceKind::Priv,        BlockAction::Replace, Some(CodeBlock::Priv),      JumpMode::None,      false, false, CodeBlock::Class.bit() | CodeBlock::Publ.bit()),
    def(SentenceKind::EndClass,    BlockAction::Pop,     None,                       JumpMode::None,      false, false, CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::Allow,       BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Priv.bit()),
    def(SentenceKind::DefEnum,     BlockAction::Push,    Some(CodeBlock::Enum),      JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Local.bit() | CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::EnumField,   BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Enum.bit()),
    def(SentenceKind::EndEnum,     BlockAction::Pop,     None,                       JumpMode::None,      false, false, CodeBlock::Enum.bit()),
    def(SentenceKind::Const,       BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Local.bit()),
    def(SentenceKind::VarDecl,     BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | LOCAL_SCOPE | CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::FunDecl,     BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Class.bit() | CodeBlock::Publ.bit() | CodeBlock::Priv.bit()),
    def(SentenceKind::SystemCall,  BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit()),
    def(SentenceKind::SystemFunc,  BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit()),
    def(SentenceKind::DlFunction,  BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit()),
    def(SentenceKind::DlType,      BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit()),
    def(SentenceKind::XlvSet,      BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Public.bit() | CodeBlock::Private.bit() | CodeBlock::Local.bit()),
    def(SentenceKind::InitVar,     BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::Local.bit()),
    def(SentenceKind::Main,        BlockAction::Push,    Some(CodeBlock::Local),     JumpMode::BlockBeg,  false, false, CodeBlock::Implem.bit()),
    def(SentenceKind::EndMain,     BlockAction::Pop,     None,                       JumpMode::BlockEnd,  false, false, CodeBlock::Local.bit()),
    def(SentenceKind::Function,    BlockAction::Push,    Some(CodeBlock::Local),     JumpMode::BlockBeg,  false, false, CodeBlock::Implem.bit() | CodeBlock::Local.bit()),
    def(SentenceKind::EndFunction, BlockAction::Pop,     None,                       JumpMode::BlockEnd,  false, false, CodeBlock::Local.bit()),
    def(SentenceKind::Operator,    BlockAction::Push,    Some(CodeBlock::Local),     JumpMode::BlockBeg,  false, false, CodeBlock::Implem.bit() | CodeBlock::Local.bit()),
    def(SentenceKind::EndOperator, BlockAction::Pop,     None,                       JumpMode::BlockEnd,  false, false, CodeBlock::Local.bit()),
    def(SentenceKind::Member,      BlockAction::Push,    Some(CodeBlock::Local),     JumpMode::BlockBeg,  false, false, CodeBlock::Implem.bit() | CodeBlock::Local.bit()),
    def(SentenceKind::EndMember,   BlockAction::Pop,     None,                       JumpMode::BlockEnd,  false, false, CodeBlock::Local.bit()),
    def(SentenceKind::Return,      BlockAction::Keep,    None,                       JumpMode::None,      false, false, LOCAL_SCOPE),
    def(SentenceKind::If,          BlockAction::Push,    Some(CodeBlock::If),        JumpMode::FirstCase, false, false, LOCAL_SCOPE),
    def(SentenceKind::ElseIf,      BlockAction::Replace, Some(CodeBlock::ElseIf),    JumpMode::NextCase,  false, false, CodeBlock::If.bit() | CodeBlock::ElseIf.bit()),
    def(SentenceKind::Else,        BlockAction::Replace, Some(CodeBlock::Else),      JumpMode::LastCase,  false, false, CodeBlock::If.bit() | CodeBlock::ElseIf.bit()),
    def(SentenceKind::EndIf,       BlockAction::Pop,     None,                       JumpMode::EndCase,   false, false, CodeBlock::If.bit() | CodeBlock::ElseIf.bit() | CodeBlock::Else.bit()),
    def(SentenceKind::While,       BlockAction::Push,    Some(CodeBlock::While),     JumpMode::LoopBeg,   false, false, LOCAL_SCOPE),
    def(SentenceKind::EndWhile,    BlockAction::Pop,     None,                       JumpMode::LoopEnd,   false, false, CodeBlock::While.bit()),
    def(SentenceKind::Do,          BlockAction::Push,    Some(CodeBlock::DoLoop),    JumpMode::LoopBeg,   false, false, LOCAL_SCOPE),
    def(SentenceKind::Loop,        BlockAction::Pop,     None,                       JumpMode::LoopEnd,   false, false, CodeBlock::DoLoop.bit()),
    def(SentenceKind::For,         BlockAction::Push,    Some(CodeBlock::For),       JumpMode::LoopBeg,   false, false, LOCAL_SCOPE),
    def(SentenceKind::EndFor,      BlockAction::Pop,     None,                       JumpMode::LoopEnd,   false, false, CodeBlock::For.bit()),
    def(SentenceKind::Walk,        BlockAction::Push,    Some(CodeBlock::Walk),      JumpMode::LoopBeg,   false, false, LOCAL_SCOPE),
    def(SentenceKind::EndWalk,     BlockAction::Pop,     None,                       JumpMode::LoopEnd,   false, false, CodeBlock::Walk.bit()),
    def(SentenceKind::Switch,      BlockAction::Push,    Some(CodeBlock::Switch),    JumpMode::None,      true,  false, LOCAL_SCOPE),
    def(SentenceKind::When,        BlockAction::Replace, Some(CodeBlock::FirstWhen), JumpMode::FirstCase, false, false, CodeBlock::Switch.bit()),
    def(SentenceKind::When,        BlockAction::Replace, Some(CodeBlock::NextWhen),  JumpMode::NextCase,  false, false, CodeBlock::FirstWhen.bit() | CodeBlock::NextWhen.bit()),
    def(SentenceKind::Default,     BlockAction::Replace, Some(CodeBlock::Default),   JumpMode::LastCase,  false, false, CodeBlock::FirstWhen.bit() | CodeBlock::NextWhen.bit()),
    def(SentenceKind::EndSwitch,   BlockAction::Pop,     None,                       JumpMode::EndCase,   false, true,  CodeBlock::FirstWhen.bit() | CodeBlock::NextWhen.bit() | CodeBlock::Default.bit()),
    def(SentenceKind::Break,       BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::If.bit() | CodeBlock::ElseIf.bit() | CodeBlock::Else.bit() | CodeBlock::FirstWhen.bit() | CodeBlock::NextWhen.bit() | CodeBlock::Default.bit() | CodeBlock::DoLoop.bit() | CodeBlock::While.bit() | CodeBlock::For.bit() | CodeBlock::Walk.bit()),
    def(SentenceKind::Continue,    BlockAction::Keep,    None,                       JumpMode::None,      false, false, CodeBlock::If.bit() | CodeBlock::ElseIf.bit() | CodeBlock::Else.bit() | CodeBlock::FirstWhen.bit() | CodeBlock::NextWhen.bit() | CodeBlock::Default.bit() | CodeBlock::DoLoop.bit() | CodeBlock::While.bit() | CodeBlock::For.bit() | CodeBlock::Walk.bit()),
    def(SentenceKind::Expression,  BlockAction::Keep,    None,                       JumpMode::None,      false, false, LOCAL_SCOPE),
];

/// Find the applicable grammar row for a sentence kind inside a block.
pub fn find_def(kind: SentenceKind, block: CodeBlock) -> Option<&'static SentenceDef> {
    SENTENCE_DEFS
        .iter()
        .find(|d| d.kind == kind && d.allowed & block.bit() != 0)
}
