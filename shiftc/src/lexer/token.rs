use std::fmt::Display;

/// One-based source location. Lines count `\n` or `\r\n` endings, the column
/// resets at every line start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Illegal,

    Ident,
    Int,
    Float,
    Str,

    Func,
    Return,
    Import,
    If,

    Comma,
    Colon,
    Semicolon,

    Lparen,
    Rparen,
    Lcurly,
    Rcurly,

    Plus,
    Minus,
    Asterisk,
    Assign,
    InitAssign,
    Bang,
    NotEq,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        match self {
            Eof => write!(f, "EOF"),
            Illegal => write!(f, "ILLEGAL"),

            Ident => write!(f, "IDENT"),
            Int => write!(f, "INT"),
            Float => write!(f, "FLOAT"),
            Str => write!(f, "STRING"),

            Func => write!(f, "fn"),
            Return => write!(f, "return"),
            Import => write!(f, "import"),
            If => write!(f, "if"),

            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),

            Lparen => write!(f, "("),
            Rparen => write!(f, ")"),
            Lcurly => write!(f, "{}", '{'),
            Rcurly => write!(f, "{}", '}'),

            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Asterisk => write!(f, "*"),
            Assign => write!(f, "="),
            InitAssign => write!(f, ":="),
            Bang => write!(f, "!"),
            NotEq => write!(f, "!="),
        }
    }
}

/// A classified lexeme. `pos` is the position of the first byte of the
/// literal (for strings, of the opening quote).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub pos: Position,
}

/// Remaps a finished identifier to its keyword kind.
pub fn lookup_ident(ident: &str) -> TokenKind {
    match ident {
        "fn" => TokenKind::Func,
        "return" => TokenKind::Return,
        "import" => TokenKind::Import,
        "if" => TokenKind::If,
        _ => TokenKind::Ident,
    }
}
