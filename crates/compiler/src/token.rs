//! Token definitions for the Dungeon language
//!
//! Spelling tables live here as `const` arrays whose order is significant:
//! keywords are probed in declaration order with a word-boundary check, and
//! operators are declared longest-first so that `<<=` wins over `<<` and `<`.

/// Reserved identifier prefix for compiler-generated names. Tokens using it
/// are only recognized in lines coming from the insertion/addition buffers.
pub const SYS_NAMESPACE: &str = "$";

/// Bytes allowed inside identifiers (the system namespace marker is handled
/// separately).
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Language keywords, 62 spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Keyword {
    Libs = 0,
    Public,
    Private,
    Implem,
    Set,
    Import,
    Include,
    As,
    Version,
    Static,
    Var,
    Const,
    DefType,
    DefClass,
    Publ,
    Priv,
    EndClass,
    Allow,
    To,
    From,
    DefEnum,
    EndEnum,
    Void,
    Main,
    EndMain,
    Function,
    EndFunction,
    Member,
    EndMember,
    Operator,
    EndOperator,
    Let,
    Init,
    Return,
    Ref,
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
    On,
    Switch,
    When,
    Default,
    EndSwitch,
    Break,
    Continue,
    Array,
    Index,
    SystemCall,
    SystemFunc,
    DlFunction,
    DlType,
    XlvSet,
    InitVar,
}

/// Keyword spellings, indexed by discriminant. Probe order for the lexer.
pub(crate) const KEYWORDS: [(Keyword, &str); 62] = [
    (Keyword::Libs, ".libs"),
    (Keyword::Public, ".public"),
    (Keyword::Private, ".private"),
    (Keyword::Implem, ".implem"),
    (Keyword::Set, "set"),
    (Keyword::Import, "import"),
    (Keyword::Include, "include"),
    (Keyword::As, "as"),
    (Keyword::Version, "version"),
    (Keyword::Static, "static"),
    (Keyword::Var, "var"),
    (Keyword::Const, "const"),
    (Keyword::DefType, "type"),
    (Keyword::DefClass, "class"),
    (Keyword::Publ, ".publ"),
    (Keyword::Priv, ".priv"),
    (Keyword::EndClass, ":class"),
    (Keyword::Allow, "allow"),
    (Keyword::To, "to"),
    (Keyword::From, "from"),
    (Keyword::DefEnum, "enum"),
    (Keyword::EndEnum, ":enum"),
    (Keyword::Void, "void"),
    (Keyword::Main, "main:"),
    (Keyword::EndMain, ":main"),
    (Keyword::Function, "func"),
    (Keyword::EndFunction, ":func"),
    (Keyword::Member, "fmem"),
    (Keyword::EndMember, ":fmem"),
    (Keyword::Operator, "oper"),
    (Keyword::EndOperator, ":oper"),
    (Keyword::Let, "let"),
    (Keyword::Init, "init"),
    (Keyword::Return, "return"),
    (Keyword::Ref, "ref"),
    (Keyword::If, "if"),
    (Keyword::ElseIf, "elif"),
    (Keyword::Else, "else"),
    (Keyword::EndIf, ":if"),
    (Keyword::While, "while"),
    (Keyword::EndWhile, ":while"),
    (Keyword::Do, "do"),
    (Keyword::Loop, ":loop"),
    (Keyword::For, "for"),
    (Keyword::EndFor, ":for"),
    (Keyword::Walk, "walk"),
    (Keyword::EndWalk, ":walk"),
    (Keyword::On, "on"),
    (Keyword::Switch, "switch"),
    (Keyword::When, "when"),
    (Keyword::Default, "default:"),
    (Keyword::EndSwitch, ":switch"),
    (Keyword::Break, "break"),
    (Keyword::Continue, "continue"),
    (Keyword::Array, "array"),
    (Keyword::Index, "index"),
    (Keyword::SystemCall, "syscall"),
    (Keyword::SystemFunc, "sysfunc"),
    (Keyword::DlFunction, "dlfunc"),
    (Keyword::DlType, "dltype"),
    (Keyword::XlvSet, "$xlvset"),
    (Keyword::InitVar, "$initvar"),
];

impl Keyword {
    pub fn text(self) -> &'static str {
        KEYWORDS[self as usize].1
    }

    /// Keywords whose spelling is reserved for compiler-generated lines.
    pub fn is_system(self) -> bool {
        self.text().starts_with(SYS_NAMESPACE)
    }
}

/// Operators, 40 spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Operator {
    PrefixIncrement = 0,
    PrefixDecrement,
    Plus,
    Minus,
    ShlAssign,
    ShrAssign,
    PostfixIncrement,
    PostfixDecrement,
    ShiftLeft,
    ShiftRight,
    LessEqual,
    GreaterEqual,
    Equal,
    Distinct,
    LogicalAnd,
    LogicalOr,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    SeqOper,
    TernaryIf,
    Member,
    LogicalNot,
    BitwiseNot,
    Asterisk,
    Division,
    Modulus,
    Add,
    Sub,
    Less,
    Greater,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    Assign,
}

/// Operator spellings in probe order. Longer spellings come first so the
/// lexer never matches a prefix of a longer operator.
pub(crate) const OPERATORS: [(Operator, &str); 40] = [
    (Operator::PrefixIncrement, "(++)"),
    (Operator::PrefixDecrement, "(--)"),
    (Operator::Plus, "(+)"),
    (Operator::Minus, "(-)"),
    (Operator::ShlAssign, "<<="),
    (Operator::ShrAssign, ">>="),
    (Operator::PostfixIncrement, "++"),
    (Operator::PostfixDecrement, "--"),
    (Operator::ShiftLeft, "<<"),
    (Operator::ShiftRight, ">>"),
    (Operator::LessEqual, "<="),
    (Operator::GreaterEqual, ">="),
    (Operator::Equal, "=="),
    (Operator::Distinct, "!="),
    (Operator::LogicalAnd, "&&"),
    (Operator::LogicalOr, "||"),
    (Operator::AddAssign, "+="),
    (Operator::SubAssign, "-="),
    (Operator::MulAssign, "*="),
    (Operator::DivAssign, "/="),
    (Operator::ModAssign, "%="),
    (Operator::AndAssign, "&="),
    (Operator::XorAssign, "^="),
    (Operator::OrAssign, "|="),
    (Operator::SeqOper, "->"),
    (Operator::TernaryIf, "?"),
    (Operator::Member, "."),
    (Operator::LogicalNot, "!"),
    (Operator::BitwiseNot, "~"),
    (Operator::Asterisk, "*"),
    (Operator::Division, "/"),
    (Operator::Modulus, "%"),
    (Operator::Add, "+"),
    (Operator::Sub, "-"),
    (Operator::Less, "<"),
    (Operator::Greater, ">"),
    (Operator::BitwiseAnd, "&"),
    (Operator::BitwiseXor, "^"),
    (Operator::BitwiseOr, "|"),
    (Operator::Assign, "="),
];

impl Operator {
    pub fn text(self) -> &'static str {
        OPERATORS[self as usize].1
    }
}

/// Punctuators, 9 spellings. `;` is the statement splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Punctuator {
    BegParen = 0,
    EndParen,
    BegBracket,
    EndBracket,
    BegCurly,
    EndCurly,
    Comma,
    Colon,
    Splitter,
}

pub(crate) const PUNCTUATORS: [(Punctuator, &str); 9] = [
    (Punctuator::BegParen, "("),
    (Punctuator::EndParen, ")"),
    (Punctuator::BegBracket, "["),
    (Punctuator::EndBracket, "]"),
    (Punctuator::BegCurly, "{"),
    (Punctuator::EndCurly, "}"),
    (Punctuator::Comma, ","),
    (Punctuator::Colon, ":"),
    (Punctuator::Splitter, ";"),
];

impl Punctuator {
    pub fn text(self) -> &'static str {
        PUNCTUATORS[self as usize].1
    }
}

/// Discriminant-only view of a token, used for "expected X found Y"
/// diagnostics and class predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Operator,
    Punctuator,
    TypeName,
    Identifier,
    Boolean,
    Char,
    Short,
    Integer,
    Long,
    Float,
    Str,
}

impl TokenClass {
    pub fn describe(self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::Operator => "operator",
            TokenClass::Punctuator => "punctuator",
            TokenClass::TypeName => "type name",
            TokenClass::Identifier => "identifier",
            TokenClass::Boolean => "boolean literal",
            TokenClass::Char => "char literal",
            TokenClass::Short => "short integer literal",
            TokenClass::Integer => "integer literal",
            TokenClass::Long => "long integer literal",
            TokenClass::Float => "floating point literal",
            TokenClass::Str => "string literal",
        }
    }
}

/// A classified token value.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Operator(Operator),
    Punctuator(Punctuator),
    TypeName(String),
    Identifier(String),
    Boolean(bool),
    Char(u8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f64),
    Str(String),
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Keyword(_) => TokenClass::Keyword,
            TokenKind::Operator(_) => TokenClass::Operator,
            TokenKind::Punctuator(_) => TokenClass::Punctuator,
            TokenKind::TypeName(_) => TokenClass::TypeName,
            TokenKind::Identifier(_) => TokenClass::Identifier,
            TokenKind::Boolean(_) => TokenClass::Boolean,
            TokenKind::Char(_) => TokenClass::Char,
            TokenKind::Short(_) => TokenClass::Short,
            TokenKind::Integer(_) => TokenClass::Integer,
            TokenKind::Long(_) => TokenClass::Long,
            TokenKind::Float(_) => TokenClass::Float,
            TokenKind::Str(_) => TokenClass::Str,
        }
    }
}

/// A token plus the source coordinates of its first byte. Line numbers are
/// 1-based; columns are 0-based byte offsets in the original source line.
/// Column 0 marks tokens synthesized by `Sentence::add_*`/`ins_*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, file: &str, line: usize, col: usize) -> Self {
        Token {
            kind,
            file: file.to_string(),
            line,
            col,
        }
    }

    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }

    /// Token rendered as it would appear in source. Re-tokenizing the result
    /// yields an equivalent token (modulo numeric-width suffixes).
    pub fn text(&self) -> String {
        match &self.kind {
            TokenKind::Keyword(kw) => kw.text().to_string(),
            TokenKind::Operator(op) => op.text().to_string(),
            TokenKind::Punctuator(pn) => pn.text().to_string(),
            TokenKind::TypeName(ty) => ty.clone(),
            TokenKind::Identifier(id) => id.clone(),
            TokenKind::Boolean(b) => (if *b { "true" } else { "false" }).to_string(),
            TokenKind::Char(c) => {
                if (32..=126).contains(c) {
                    format!("'{}'", escape_text(&[*c]))
                } else {
                    format!("{c}R")
                }
            }
            TokenKind::Short(n) => format!("{n}S"),
            TokenKind::Integer(n) => format!("{n}"),
            TokenKind::Long(n) => format!("{n}L"),
            TokenKind::Float(f) => format!("{f:?}"),
            TokenKind::Str(s) => format!("\"{}\"", escape_text(s.as_bytes())),
        }
    }

    /// Description for diagnostics: named spelling for fixed tokens, the
    /// token class for valued ones.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Keyword(kw) => format!("keyword \"{}\"", kw.text()),
            TokenKind::Operator(op) => format!("operator \"{}\"", op.text()),
            TokenKind::Punctuator(pn) => format!("punctuator \"{}\"", pn.text()),
            other => other.class().describe().to_string(),
        }
    }

    /// Tagged printout used by sentence dumps.
    pub fn print(&self) -> String {
        let tag = match self.kind.class() {
            TokenClass::Keyword => "kw",
            TokenClass::Operator => "op",
            TokenClass::Punctuator => "pu",
            TokenClass::TypeName => "ty",
            TokenClass::Identifier => "id",
            TokenClass::Boolean => "bo",
            TokenClass::Char => "ch",
            TokenClass::Short => "sh",
            TokenClass::Integer => "in",
            TokenClass::Long => "lo",
            TokenClass::Float => "fl",
            TokenClass::Str => "st",
        };
        format!("{}({})", tag, self.text())
    }
}

/// Escape a byte sequence for printing inside a quoted literal: the text
/// qualifier doubles, quotes and backslashes get a backslash, bytes outside
/// the printable range become `\xHH`.
pub(crate) fn escape_text(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        match b {
            b'"' => out.push_str("\"\""),
            b'\'' => out.push_str("\\'"),
            b'\\' => out.push_str("\\\\"),
            32..=126 => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_tables_align_with_discriminants() {
        for (i, (kw, _)) in KEYWORDS.iter().enumerate() {
            assert_eq!(*kw as usize, i);
        }
        for (i, (op, _)) in OPERATORS.iter().enumerate() {
            assert_eq!(*op as usize, i);
        }
        for (i, (pn, _)) in PUNCTUATORS.iter().enumerate() {
            assert_eq!(*pn as usize, i);
        }
    }

    #[test]
    fn test_operator_probe_order_is_longest_first() {
        // No operator spelling may be hidden behind an earlier prefix.
        for (i, (_, text)) in OPERATORS.iter().enumerate() {
            for (_, earlier) in &OPERATORS[..i] {
                assert!(
                    !text.starts_with(earlier) || earlier.len() >= text.len(),
                    "operator {text:?} is shadowed by {earlier:?}"
                );
            }
        }
    }

    #[test]
    fn test_system_keywords() {
        assert!(Keyword::XlvSet.is_system());
        assert!(Keyword::InitVar.is_system());
        assert!(!Keyword::Var.is_system());
        assert_eq!(Keyword::XlvSet.text(), "$xlvset");
    }

    #[test]
    fn test_token_text_round_trip_forms() {
        let t = Token::new(TokenKind::Char(65), "f", 1, 0);
        assert_eq!(t.text(), "'A'");
        let t = Token::new(TokenKind::Char(7), "f", 1, 0);
        assert_eq!(t.text(), "7R");
        let t = Token::new(TokenKind::Short(255), "f", 1, 0);
        assert_eq!(t.text(), "255S");
        let t = Token::new(TokenKind::Str("a\"b".into()), "f", 1, 0);
        assert_eq!(t.text(), "\"a\"\"b\"");
    }

    #[test]
    fn test_describe_names_fixed_spellings() {
        let t = Token::new(TokenKind::Keyword(Keyword::Var), "f", 1, 0);
        assert_eq!(t.describe(), "keyword \"var\"");
        let t = Token::new(TokenKind::Identifier("x".into()), "f", 1, 0);
        assert_eq!(t.describe(), "identifier");
    }
}
