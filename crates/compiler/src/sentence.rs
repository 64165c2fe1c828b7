//! Sentences: one classified logical statement
//!
//! [`Sentence::parse`] consumes all tokens of one assembled line, detects
//! the leading modifiers (`static`/`let`/`init`) and infers the sentence
//! kind from the head token. The rest of the type is the cursor API that
//! downstream compilation walks a sentence with: predicates that peek,
//! consumers and readers that advance, expression readers that scan to a
//! level-zero stop token, and helpers that build synthetic sentences.
//!
//! Cursor helpers use a sticky error: the first failure records a
//! diagnostic and every later call on the same sentence is a no-op until
//! `clear_error`. Callers test `ok()` once at the end of a parse path.

use crate::blocks::{format_label, CodeBlock, CodeBlockId, LabelKind};
use crate::config::ParserConfig;
use crate::diag::Diag;
use crate::lexer::Lexer;
use crate::reader::Origin;
use crate::token::{Keyword, Operator, Punctuator, Token, TokenClass, TokenKind};

/// Sentence classification, 54 kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    Libs,
    Public,
    Private,
    Implem,
    Set,
    Import,
    Include,
    Const,
    VarDecl,
    DefType,
    DefClass,
    Publ,
    Priv,
    EndClass,
    Allow,
    DefEnum,
    EnumField,
    EndEnum,
    FunDecl,
    Main,
    EndMain,
    Function,
    EndFunction,
    Member,
    EndMember,
    Operator,
    EndOperator,
    Return,
    If,
    ElseIf,
    Else,
    EndIf,
    While,
    EndWhile,
    Do,
    Loop,
    For,
    EndFor,
    Walk,
    EndWalk,
    Switch,
    When,
    Default,
    EndSwitch,
    Break,
    Continue,
    Expression,
    SystemCall,
    SystemFunc,
    DlFunction,
    DlType,
    XlvSet,
    InitVar,
    Empty,
}

impl SentenceKind {
    pub fn name(self) -> &'static str {
        use SentenceKind::*;
        match self {
            Libs => "Libs",
            Public => "Public",
            Private => "Private",
            Implem => "Implem",
            Set => "Set",
            Import => "Import",
            Include => "Include",
            Const => "Const",
            VarDecl => "VarDecl",
            DefType => "DefType",
            DefClass => "DefClass",
            Publ => "Publ",
            Priv => "Priv",
            EndClass => "EndClass",
            Allow => "Allow",
            DefEnum => "DefEnum",
            EnumField => "EnumField",
            EndEnum => "EndEnum",
            FunDecl => "FunDecl",
            Main => "Main",
            EndMain => "EndMain",
            Function => "Function",
            EndFunction => "EndFunction",
            Member => "Member",
            EndMember => "EndMember",
            Operator => "Operator",
            EndOperator => "EndOperator",
            Return => "Return",
            If => "If",
            ElseIf => "ElseIf",
            Else => "Else",
            EndIf => "EndIf",
            While => "While",
            EndWhile => "EndWhile",
            Do => "Do",
            Loop => "Loop",
            For => "For",
            EndFor => "EndFor",
            Walk => "Walk",
            EndWalk => "EndWalk",
            Switch => "Switch",
            When => "When",
            Default => "Default",
            EndSwitch => "EndSwitch",
            Break => "Break",
            Continue => "Continue",
            Expression => "Expression",
            SystemCall => "SystemCall",
            SystemFunc => "SystemFunc",
            DlFunction => "DlFunction",
            DlType => "DlType",
            XlvSet => "XlvSet",
            InitVar => "InitVar",
            Empty => "Empty",
        }
    }
}

/// One parsed sentence with its tokens, modifiers, labels and cursor.
#[derive(Debug, Clone)]
pub struct Sentence {
    /// `static` modifier seen before the sentence head
    pub is_static: bool,
    /// `let` modifier
    pub is_let: bool,
    /// `init` modifier
    pub is_init: bool,
    pub kind: SentenceKind,
    pub tokens: Vec<Token>,
    file: String,
    line: usize,
    origin: Origin,
    /// Processing cursor for the token API
    pos: usize,
    /// Sticky error set by cursor helpers
    error: Option<Diag>,
    base_label: i32,
    sub_label: i32,
    block_id: &'static str,
    loop_label: i32,
    loop_id: &'static str,
    code_block_id: CodeBlockId,
}

impl Sentence {
    /// Parse one assembled line into a sentence. `line_nr` is 1-based;
    /// `cumul_len` recovers absolute columns for split fragments; `block`
    /// is the enclosing block (identifier heads classify as `EnumField`
    /// inside an `Enum`).
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        file: &str,
        line_nr: usize,
        line: &str,
        cumul_len: usize,
        type_list: &[String],
        block: CodeBlock,
        origin: Origin,
        sys_namespace: bool,
        config: &ParserConfig,
    ) -> Result<Sentence, Diag> {
        let mut sentence = Sentence {
            is_static: false,
            is_let: false,
            is_init: false,
            kind: SentenceKind::Empty,
            tokens: Vec::new(),
            file: file.to_string(),
            line: line_nr,
            origin,
            pos: 0,
            error: None,
            base_label: 0,
            sub_label: 0,
            block_id: "",
            loop_label: 0,
            loop_id: "",
            code_block_id: 0,
        };

        // Splitter-only fragments count as empty sentences
        if line.bytes().all(|b| b == b' ' || b == b';') {
            return Ok(sentence);
        }

        let lexer = Lexer {
            file,
            line_nr,
            base_col: cumul_len.saturating_sub(line.len()),
            origin,
            sys_namespace,
            type_list,
            config,
        };

        // Leading sentence modifiers; the first non-modifier token stops the
        // scan and is lexed again by the token loop below
        let mut static_tok: Option<Token> = None;
        let mut let_tok: Option<Token> = None;
        let mut init_tok: Option<Token> = None;
        let mut pos = 0;
        while let Some((token, end)) = lexer.next_token(line, pos)? {
            match token.kind {
                TokenKind::Keyword(Keyword::Static) => static_tok = Some(token),
                TokenKind::Keyword(Keyword::Let) => let_tok = Some(token),
                TokenKind::Keyword(Keyword::Init) => init_tok = Some(token),
                _ => break,
            }
            pos = end;
        }
        sentence.is_static = static_tok.is_some();
        sentence.is_let = let_tok.is_some();
        sentence.is_init = init_tok.is_some();

        while pos < line.len() {
            match lexer.next_token(line, pos)? {
                Some((token, end)) => {
                    sentence.tokens.push(token);
                    pos = end;
                }
                None => break,
            }
        }

        if sentence.tokens.is_empty() {
            let (token, what) = if let Some(t) = &static_tok {
                (t, "static")
            } else if let Some(t) = &let_tok {
                (t, "let")
            } else {
                (init_tok.as_ref().expect("modifier scan left no token"), "init")
            };
            return Err(token_err(
                token,
                format!("The {what} modifier is not followed by any sentence"),
            ));
        }

        sentence.kind = sentence.infer_kind(block)?;

        if sentence.is_static && sentence.kind != SentenceKind::VarDecl {
            return Err(token_err(
                static_tok.as_ref().expect("static token recorded"),
                "The static modifier only applies to variable declarations",
            ));
        }
        if sentence.is_let
            && (!matches!(sentence.kind, SentenceKind::Function | SentenceKind::Operator)
                || block != CodeBlock::Local)
        {
            return Err(token_err(
                let_tok.as_ref().expect("let token recorded"),
                "The let modifier only applies to function or operator definitions in local scope",
            ));
        }
        if sentence.is_init && sentence.kind != SentenceKind::FunDecl {
            return Err(token_err(
                init_tok.as_ref().expect("init token recorded"),
                "The init modifier only applies to function declarations",
            ));
        }

        // A trailing splitter was kept during lexing so columns line up; it
        // means nothing past this point
        if sentence
            .tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Punctuator(Punctuator::Splitter))
        {
            sentence.tokens.pop();
        }

        Ok(sentence)
    }

    /// Sentence kind from the head token.
    fn infer_kind(&self, block: CodeBlock) -> Result<SentenceKind, Diag> {
        let head = &self.tokens[0];
        match &head.kind {
            TokenKind::Keyword(kw) => {
                let kind = match kw {
                    Keyword::Libs => SentenceKind::Libs,
                    Keyword::Public => SentenceKind::Public,
                    Keyword::Private => SentenceKind::Private,
                    Keyword::Implem => SentenceKind::Implem,
                    Keyword::Set => SentenceKind::Set,
                    Keyword::Import => SentenceKind::Import,
                    Keyword::Include => SentenceKind::Include,
                    Keyword::Var => SentenceKind::VarDecl,
                    Keyword::Const => SentenceKind::Const,
                    Keyword::DefType => SentenceKind::DefType,
                    Keyword::DefClass => SentenceKind::DefClass,
                    Keyword::Publ => SentenceKind::Publ,
                    Keyword::Priv => SentenceKind::Priv,
                    Keyword::EndClass => SentenceKind::EndClass,
                    Keyword::Allow => SentenceKind::Allow,
                    Keyword::DefEnum => SentenceKind::DefEnum,
                    Keyword::EndEnum => SentenceKind::EndEnum,
                    Keyword::SystemCall => SentenceKind::SystemCall,
                    Keyword::SystemFunc => SentenceKind::SystemFunc,
                    Keyword::DlFunction => SentenceKind::DlFunction,
                    Keyword::DlType => SentenceKind::DlType,
                    Keyword::Main => SentenceKind::Main,
                    Keyword::EndMain => SentenceKind::EndMain,
                    Keyword::Function => SentenceKind::Function,
                    Keyword::EndFunction => SentenceKind::EndFunction,
                    Keyword::Member => SentenceKind::Member,
                    Keyword::EndMember => SentenceKind::EndMember,
                    Keyword::Operator => SentenceKind::Operator,
                    Keyword::EndOperator => SentenceKind::EndOperator,
                    Keyword::Return => SentenceKind::Return,
                    Keyword::If => SentenceKind::If,
                    Keyword::ElseIf => SentenceKind::ElseIf,
                    Keyword::Else => SentenceKind::Else,
                    Keyword::EndIf => SentenceKind::EndIf,
                    Keyword::While => SentenceKind::While,
                    Keyword::EndWhile => SentenceKind::EndWhile,
                    Keyword::Do => SentenceKind::Do,
                    Keyword::Loop => SentenceKind::Loop,
                    Keyword::For => SentenceKind::For,
                    Keyword::EndFor => SentenceKind::EndFor,
                    Keyword::Switch => SentenceKind::Switch,
                    Keyword::When => SentenceKind::When,
                    Keyword::Default => SentenceKind::Default,
                    Keyword::EndSwitch => SentenceKind::EndSwitch,
                    Keyword::Break => SentenceKind::Break,
                    Keyword::Continue => SentenceKind::Continue,
                    Keyword::Walk => SentenceKind::Walk,
                    Keyword::EndWalk => SentenceKind::EndWalk,
                    Keyword::Void => SentenceKind::FunDecl,
                    Keyword::XlvSet => SentenceKind::XlvSet,
                    Keyword::InitVar => SentenceKind::InitVar,
                    Keyword::As
                    | Keyword::Version
                    | Keyword::Static
                    | Keyword::Let
                    | Keyword::Init
                    | Keyword::Ref
                    | Keyword::On
                    | Keyword::To
                    | Keyword::From
                    | Keyword::Array
                    | Keyword::Index => {
                        return Err(token_err(
                            head,
                            format!("Keyword \"{}\" is not expected here", kw.text()),
                        ));
                    }
                };
                Ok(kind)
            }

            // A type name heads either a function declaration (parenthesis
            // right after the type, after an array specifier, or after the
            // function name) or a variable declaration
            TokenKind::TypeName(_) => {
                let paren_at = |i: usize| {
                    self.tokens
                        .get(i)
                        .is_some_and(|t| t.kind == TokenKind::Punctuator(Punctuator::BegParen))
                };
                if paren_at(1) {
                    return Ok(SentenceKind::FunDecl);
                }
                let next = if self
                    .tokens
                    .get(1)
                    .is_some_and(|t| t.kind == TokenKind::Punctuator(Punctuator::BegBracket))
                {
                    match self.zero_find_from(Punctuator::EndBracket, 2) {
                        Some(i) => i + 1,
                        None => {
                            return Err(token_err(
                                &self.tokens[1],
                                "Cannot find matching \"]\" in declaration",
                            ));
                        }
                    }
                } else {
                    1
                };
                if paren_at(next) || paren_at(next + 1) {
                    Ok(SentenceKind::FunDecl)
                } else {
                    Ok(SentenceKind::VarDecl)
                }
            }

            TokenKind::Identifier(_) => {
                if block == CodeBlock::Enum {
                    Ok(SentenceKind::EnumField)
                } else {
                    Ok(SentenceKind::Expression)
                }
            }

            _ => Ok(SentenceKind::Expression),
        }
    }

    // ----- cursor state -----

    /// False once any cursor helper failed on this sentence.
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The sticky diagnostic, if a helper failed.
    pub fn last_error(&self) -> Option<&Diag> {
        self.error.as_ref()
    }

    pub fn tokens_left(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    pub fn proc_index(&self) -> usize {
        self.pos
    }

    pub fn set_proc_index(&mut self, index: usize) {
        self.pos = index;
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn current_line_nr(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(self.line, |t| t.line)
    }

    pub fn current_col_nr(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(0, |t| t.col)
    }

    pub fn last_line_nr(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].line
        }
    }

    pub fn last_col_nr(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].col
        }
    }

    // ----- predicates -----

    /// Token class at the cursor.
    pub fn is(&self, class: TokenClass) -> bool {
        self.is_at(class, 0)
    }

    /// Token class at cursor + offset.
    pub fn is_at(&self, class: TokenClass, offset: isize) -> bool {
        self.peek(offset).is_some_and(|t| t.class() == class)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.is_keyword_at(kw, 0)
    }

    pub fn is_keyword_at(&self, kw: Keyword, offset: isize) -> bool {
        self.peek(offset)
            .is_some_and(|t| t.kind == TokenKind::Keyword(kw))
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.is_operator_at(op, 0)
    }

    pub fn is_operator_at(&self, op: Operator, offset: isize) -> bool {
        self.peek(offset)
            .is_some_and(|t| t.kind == TokenKind::Operator(op))
    }

    pub fn is_punctuator(&self, pn: Punctuator) -> bool {
        self.is_punctuator_at(pn, 0)
    }

    pub fn is_punctuator_at(&self, pn: Punctuator, offset: isize) -> bool {
        self.peek(offset)
            .is_some_and(|t| t.kind == TokenKind::Punctuator(pn))
    }

    fn peek(&self, offset: isize) -> Option<&Token> {
        let index = self.pos as isize + offset;
        if index < 0 {
            return None;
        }
        self.tokens.get(index as usize)
    }

    // ----- consumers -----

    /// Advance over the given keyword; sticky error if the cursor is not on
    /// it.
    pub fn get_keyword(&mut self, kw: Keyword) -> &mut Self {
        self.get_fixed(
            TokenKind::Keyword(kw),
            &format!("keyword \"{}\"", kw.text()),
        )
    }

    pub fn get_operator(&mut self, op: Operator) -> &mut Self {
        self.get_fixed(
            TokenKind::Operator(op),
            &format!("operator \"{}\"", op.text()),
        )
    }

    pub fn get_punctuator(&mut self, pn: Punctuator) -> &mut Self {
        self.get_fixed(
            TokenKind::Punctuator(pn),
            &format!("punctuator \"{}\"", pn.text()),
        )
    }

    fn get_fixed(&mut self, expected: TokenKind, desc: &str) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.tokens.get(self.pos) {
            None => self.end_err(desc),
            Some(t) if t.kind == expected => self.pos += 1,
            Some(t) => {
                self.error = Some(Diag::at(
                    &t.file,
                    t.line,
                    t.col,
                    format!("Expected {desc} but found {}", t.describe()),
                ));
            }
        }
        self
    }

    /// Consecutive occurrences of a punctuator starting at the cursor.
    pub fn count(&mut self, pn: Punctuator) -> usize {
        if self.error.is_some() {
            return 0;
        }
        let mut nr = 0;
        while self.is_punctuator(pn) {
            self.get_punctuator(pn);
            nr += 1;
        }
        nr
    }

    // ----- readers -----

    pub fn read_keyword(&mut self) -> Option<Keyword> {
        match self.read_class(TokenClass::Keyword)? {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn read_operator(&mut self) -> Option<Operator> {
        match self.read_class(TokenClass::Operator)? {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn read_punctuator(&mut self) -> Option<Punctuator> {
        match self.read_class(TokenClass::Punctuator)? {
            TokenKind::Punctuator(pn) => Some(pn),
            _ => None,
        }
    }

    pub fn read_type_name(&mut self) -> Option<String> {
        match self.read_class(TokenClass::TypeName)? {
            TokenKind::TypeName(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn read_identifier(&mut self) -> Option<String> {
        match self.read_class(TokenClass::Identifier)? {
            TokenKind::Identifier(idn) => Some(idn),
            _ => None,
        }
    }

    pub fn read_bool(&mut self) -> Option<bool> {
        match self.read_class(TokenClass::Boolean)? {
            TokenKind::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn read_char(&mut self) -> Option<u8> {
        match self.read_class(TokenClass::Char)? {
            TokenKind::Char(c) => Some(c),
            _ => None,
        }
    }

    pub fn read_short(&mut self) -> Option<i16> {
        match self.read_class(TokenClass::Short)? {
            TokenKind::Short(n) => Some(n),
            _ => None,
        }
    }

    pub fn read_int(&mut self) -> Option<i32> {
        match self.read_class(TokenClass::Integer)? {
            TokenKind::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn read_long(&mut self) -> Option<i64> {
        match self.read_class(TokenClass::Long)? {
            TokenKind::Long(n) => Some(n),
            _ => None,
        }
    }

    pub fn read_float(&mut self) -> Option<f64> {
        match self.read_class(TokenClass::Float)? {
            TokenKind::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn read_string(&mut self) -> Option<String> {
        match self.read_class(TokenClass::Str)? {
            TokenKind::Str(s) => Some(s),
            _ => None,
        }
    }

    fn read_class(&mut self, class: TokenClass) -> Option<TokenKind> {
        if self.error.is_some() {
            return None;
        }
        match self.tokens.get(self.pos) {
            None => {
                self.end_err(class.describe());
                None
            }
            Some(t) if t.class() == class => {
                let kind = t.kind.clone();
                self.pos += 1;
                Some(kind)
            }
            Some(t) => {
                self.error = Some(Diag::at(
                    &t.file,
                    t.line,
                    t.col,
                    format!("Expected {} but found {}", class.describe(), t.describe()),
                ));
                None
            }
        }
    }

    // ----- expression readers -----

    /// Tokens up to a level-zero occurrence of the keyword. Returns the
    /// inclusive index range of the expression and leaves the cursor on the
    /// stop token.
    pub fn read_expr_until_keyword(&mut self, kw: Keyword) -> Option<(usize, usize)> {
        self.read_expr_until(
            |k| *k == TokenKind::Keyword(kw),
            &format!("keyword \"{}\"", kw.text()),
        )
    }

    pub fn read_expr_until_operator(&mut self, op: Operator) -> Option<(usize, usize)> {
        self.read_expr_until(
            |k| *k == TokenKind::Operator(op),
            &format!("operator \"{}\"", op.text()),
        )
    }

    pub fn read_expr_until_punctuator(&mut self, pn: Punctuator) -> Option<(usize, usize)> {
        self.read_expr_until(
            |k| *k == TokenKind::Punctuator(pn),
            &format!("punctuator \"{}\"", pn.text()),
        )
    }

    fn read_expr_until(
        &mut self,
        stop: impl Fn(&TokenKind) -> bool,
        desc: &str,
    ) -> Option<(usize, usize)> {
        if self.error.is_some() {
            return None;
        }
        let mut par = 0i32;
        let mut bra = 0i32;
        let mut cly = 0i32;
        let mut index = None;
        for i in self.pos..self.tokens.len() {
            let kind = &self.tokens[i].kind;
            match kind {
                TokenKind::Punctuator(Punctuator::BegParen) => par += 1,
                TokenKind::Punctuator(Punctuator::BegBracket) => bra += 1,
                TokenKind::Punctuator(Punctuator::BegCurly) => cly += 1,
                k if stop(k) && par == 0 && bra == 0 && cly == 0 => {
                    index = Some(i);
                    break;
                }
                TokenKind::Punctuator(Punctuator::EndParen) => par -= 1,
                TokenKind::Punctuator(Punctuator::EndBracket) => bra -= 1,
                TokenKind::Punctuator(Punctuator::EndCurly) => cly -= 1,
                _ => {}
            }
        }
        match index {
            None => {
                let t = self.tokens.last()?;
                self.error = Some(Diag::at(
                    &t.file,
                    t.line,
                    t.col,
                    format!("Cannot find {desc} after expression"),
                ));
                None
            }
            Some(i) if i == self.pos => {
                let t = &self.tokens[i];
                self.error = Some(Diag::at(
                    &t.file,
                    t.line,
                    t.col,
                    format!("Empty expression before {desc}"),
                ));
                None
            }
            Some(i) => {
                let range = (self.pos, i - 1);
                self.pos = i;
                Some(range)
            }
        }
    }

    /// Remaining tokens as one expression.
    pub fn read_expr(&mut self) -> Option<(usize, usize)> {
        if self.error.is_some() {
            return None;
        }
        if self.pos >= self.tokens.len() {
            let t = self.tokens.last()?;
            self.error = Some(Diag::at(&t.file, t.line, t.col, "Expression expected"));
            return None;
        }
        let range = (self.pos, self.tokens.len() - 1);
        self.pos = self.tokens.len();
        Some(range)
    }

    /// First index of a punctuator outside any nested pair, from `from`.
    pub fn zero_find_from(&self, pn: Punctuator, from: usize) -> Option<usize> {
        let mut par = 0i32;
        let mut bra = 0i32;
        let mut cly = 0i32;
        for i in from..self.tokens.len() {
            if let TokenKind::Punctuator(p) = self.tokens[i].kind {
                if p == Punctuator::BegParen {
                    par += 1;
                }
                if p == Punctuator::BegBracket {
                    bra += 1;
                }
                if p == Punctuator::BegCurly {
                    cly += 1;
                }
                if p == pn && par == 0 && bra == 0 && cly == 0 {
                    return Some(i);
                }
                if p == Punctuator::EndParen {
                    par -= 1;
                }
                if p == Punctuator::EndBracket {
                    bra -= 1;
                }
                if p == Punctuator::EndCurly {
                    cly -= 1;
                }
            }
        }
        None
    }

    /// Level-zero find from the cursor.
    pub fn zero_find(&self, pn: Punctuator) -> Option<usize> {
        self.zero_find_from(pn, self.pos)
    }

    // ----- sentence manipulation -----

    /// Copy of the inclusive token window with a reset cursor. Indexes out
    /// of range panic, as any out-of-bounds random access does.
    pub fn sub_sentence(&self, start: usize, end: usize) -> Sentence {
        let mut sub = self.clone();
        sub.tokens = self.tokens[start..=end].to_vec();
        sub.pos = 0;
        sub
    }

    /// New sentence with the tokens of `other` appended.
    pub fn concat(&self, other: &Sentence) -> Sentence {
        let mut joined = self.clone();
        joined.tokens.extend(other.tokens.iter().cloned());
        joined.pos = 0;
        joined
    }

    pub fn add_operator(&mut self, op: Operator) -> &mut Self {
        self.push_synth(TokenKind::Operator(op));
        self
    }

    pub fn add_punctuator(&mut self, pn: Punctuator) -> &mut Self {
        self.push_synth(TokenKind::Punctuator(pn));
        self
    }

    pub fn add_char(&mut self, value: u8) -> &mut Self {
        self.push_synth(TokenKind::Char(value));
        self
    }

    pub fn add_int(&mut self, value: i32) -> &mut Self {
        self.push_synth(TokenKind::Integer(value));
        self
    }

    pub fn add_identifier(&mut self, idn: &str) -> &mut Self {
        self.push_synth(TokenKind::Identifier(idn.to_string()));
        self
    }

    pub fn ins_keyword(&mut self, kw: Keyword, position: usize) -> &mut Self {
        self.insert_synth(TokenKind::Keyword(kw), position);
        self
    }

    pub fn ins_operator(&mut self, op: Operator, position: usize) -> &mut Self {
        self.insert_synth(TokenKind::Operator(op), position);
        self
    }

    pub fn ins_punctuator(&mut self, pn: Punctuator, position: usize) -> &mut Self {
        self.insert_synth(TokenKind::Punctuator(pn), position);
        self
    }

    pub fn ins_identifier(&mut self, idn: &str, position: usize) -> &mut Self {
        self.insert_synth(TokenKind::Identifier(idn.to_string()), position);
        self
    }

    pub fn ins_type_name(&mut self, ty: &str, position: usize) -> &mut Self {
        self.insert_synth(TokenKind::TypeName(ty.to_string()), position);
        self
    }

    /// Synthetic tokens inherit file/line from the last real token; column
    /// 0 marks them as injected for diagnostics.
    fn synth_token(&self, kind: TokenKind) -> Token {
        let last = self.tokens.last().expect("sentence has no tokens to inherit from");
        Token {
            kind,
            file: last.file.clone(),
            line: last.line,
            col: 0,
        }
    }

    fn push_synth(&mut self, kind: TokenKind) {
        let token = self.synth_token(kind);
        self.tokens.push(token);
    }

    fn insert_synth(&mut self, kind: TokenKind, position: usize) {
        let token = self.synth_token(kind);
        self.tokens.insert(position, token);
    }

    // ----- labels and identity -----

    pub(crate) fn set_labels(
        &mut self,
        base_label: i32,
        sub_label: i32,
        block_id: &'static str,
        loop_label: i32,
        loop_id: &'static str,
    ) {
        self.base_label = base_label;
        self.sub_label = sub_label;
        self.block_id = block_id;
        self.loop_label = loop_label;
        self.loop_id = loop_id;
    }

    /// Textual code label of the given family for this sentence.
    pub fn label(&self, kind: LabelKind) -> String {
        format_label(
            kind,
            self.base_label,
            self.sub_label,
            self.block_id,
            self.loop_label,
            self.loop_id,
        )
    }

    pub fn base_label(&self) -> i32 {
        self.base_label
    }

    pub fn sub_label(&self) -> i32 {
        self.sub_label
    }

    pub fn loop_label(&self) -> i32 {
        self.loop_label
    }

    /// Whether an enclosing loop exists for `break`/`continue` to target.
    pub fn inside_loop(&self) -> bool {
        self.loop_label != -1
    }

    pub(crate) fn set_code_block_id(&mut self, id: CodeBlockId) {
        self.code_block_id = id;
    }

    pub fn code_block_id(&self) -> CodeBlockId {
        self.code_block_id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn file_name(&self) -> &str {
        &self.file
    }

    pub fn line_nr(&self) -> usize {
        self.line
    }

    // ----- printing -----

    /// Source-equivalent text of the whole sentence.
    pub fn text(&self) -> String {
        if self.tokens.is_empty() {
            return String::new();
        }
        self.text_range(0, self.tokens.len() - 1)
    }

    /// Source-equivalent text of an inclusive token range. Word-like tokens
    /// get a separating space so the result re-tokenizes identically.
    pub fn text_range(&self, beg: usize, end: usize) -> String {
        let wordy = |class: TokenClass| {
            matches!(
                class,
                TokenClass::Keyword | TokenClass::TypeName | TokenClass::Identifier | TokenClass::Boolean
            )
        };
        let mut out = String::new();
        let mut prev: Option<TokenClass> = None;
        for token in &self.tokens[beg..=end] {
            if let Some(p) = prev {
                if wordy(p) && wordy(token.class()) {
                    out.push(' ');
                }
            }
            out.push_str(&token.text());
            prev = Some(token.class());
        }
        out
    }

    /// Annotated dump: kind, modifiers and tagged tokens.
    pub fn print(&self) -> String {
        let tokens = self
            .tokens
            .iter()
            .map(Token::print)
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "[{}]{}{}{} {}",
            self.kind.name(),
            if self.is_static { "[static]" } else { "" },
            if self.is_let { "[let]" } else { "" },
            if self.is_init { "[init]" } else { "" },
            tokens
        )
    }

    fn end_err(&mut self, expected: &str) {
        let (line, col) = self
            .tokens
            .last()
            .map_or((self.line, 0), |t| (t.line, t.col));
        self.error = Some(Diag::at(
            &self.file,
            line,
            col,
            format!("Sentence runs out of tokens while looking for {expected}"),
        ));
    }
}

fn token_err(token: &Token, message: impl Into<String>) -> Diag {
    Diag::at(&token.file, token.line, token.col, message)
}
