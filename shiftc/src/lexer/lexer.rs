use super::token::{lookup_ident, Position, Token, TokenKind};

/// Byte-stream scanner with one-byte pushback.
///
/// Positions are tracked as the column of the *next* read; a finished token
/// starts at `column - literal length`. Reads past the end keep returning 0
/// and keep advancing the column, so EOF is sticky and later EOF tokens sit
/// one column further right.
#[derive(Clone, Debug)]
pub struct Lexer {
    input: Vec<u8>,
    read_position: usize,
    lexeme: String,
    pos: Position,
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_uppercase()
}

impl Lexer {
    pub fn new(input: String) -> Lexer {
        Lexer {
            input: input.into_bytes(),
            read_position: 0,
            lexeme: String::new(),
            pos: Position::new(1, 1),
        }
    }

    pub fn next_token(&mut self) -> Token {
        let mut ch = self.read();
        loop {
            match ch {
                b'\r' => {
                    if self.peek() == b'\n' {
                        self.read();
                    }
                    self.pos.line += 1;
                    self.pos.column = 1;
                    ch = self.read();
                }
                b'\n' => {
                    self.pos.line += 1;
                    self.pos.column = 1;
                    ch = self.read();
                }
                b' ' | b'\t' => ch = self.read(),
                _ => break,
            }
        }

        if is_letter(ch) {
            self.unread();
            return self.read_identifier();
        }
        if ch.is_ascii_digit() {
            self.unread();
            return self.read_number();
        }

        match ch {
            b',' => self.token(TokenKind::Comma, ","),
            b';' => self.token(TokenKind::Semicolon, ";"),
            b'(' => self.token(TokenKind::Lparen, "("),
            b')' => self.token(TokenKind::Rparen, ")"),
            b'{' => self.token(TokenKind::Lcurly, "{"),
            b'}' => self.token(TokenKind::Rcurly, "}"),
            b'+' => self.token(TokenKind::Plus, "+"),
            b'-' => self.token(TokenKind::Minus, "-"),
            b'*' => self.token(TokenKind::Asterisk, "*"),
            b'=' => self.token(TokenKind::Assign, "="),
            b':' => {
                if self.peek() == b'=' {
                    self.read();
                    self.token(TokenKind::InitAssign, ":=")
                } else {
                    self.token(TokenKind::Colon, ":")
                }
            }
            b'!' => {
                if self.peek() == b'=' {
                    self.read();
                    self.token(TokenKind::NotEq, "!=")
                } else {
                    self.token(TokenKind::Bang, "!")
                }
            }
            b'"' => self.read_string(),
            0 => self.eof_token(),
            other => self.token(TokenKind::Illegal, &(other as char).to_string()),
        }
    }

    fn token(&self, kind: TokenKind, literal: &str) -> Token {
        Token {
            kind,
            literal: literal.to_string(),
            pos: Position::new(self.pos.line, self.pos.column - literal.len() as u32),
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            literal: String::new(),
            pos: Position::new(self.pos.line, self.pos.column - 1),
        }
    }

    fn read_identifier(&mut self) -> Token {
        self.lexeme.clear();
        loop {
            let ch = self.read();
            if !is_letter(ch) && !ch.is_ascii_digit() {
                self.unread();
                break;
            }
            self.lexeme.push(ch as char);
        }

        let kind = lookup_ident(&self.lexeme);
        let literal = self.lexeme.clone();
        self.token(kind, &literal)
    }

    fn read_number(&mut self) -> Token {
        self.lexeme.clear();
        let mut kind = TokenKind::Int;
        loop {
            let ch = self.read();
            if ch.is_ascii_digit() {
                self.lexeme.push(ch as char);
            } else if ch == b'.' && kind == TokenKind::Int {
                kind = TokenKind::Float;
                self.lexeme.push('.');
            } else {
                self.unread();
                break;
            }
        }

        let literal = self.lexeme.clone();
        self.token(kind, &literal)
    }

    fn read_string(&mut self) -> Token {
        let line = self.pos.line;
        let quote_column = self.pos.column - 1;

        self.lexeme.clear();
        loop {
            let ch = self.read();
            if ch == b'"' {
                break;
            }
            if ch == 0 {
                // Unterminated string: surface EOF, the parser reports it.
                return self.eof_token();
            }
            self.lexeme.push(ch as char);
        }

        Token {
            kind: TokenKind::Str,
            literal: self.lexeme.clone(),
            pos: Position::new(line, quote_column),
        }
    }

    fn peek(&self) -> u8 {
        if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        }
    }

    fn read(&mut self) -> u8 {
        let ch = if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        };

        self.read_position += 1;
        self.pos.column += 1;
        ch
    }

    fn unread(&mut self) {
        self.read_position -= 1;
        self.pos.column -= 1;
    }
}

#[cfg(test)]
mod test {
    use super::{Lexer, Position, Token, TokenKind};

    fn tokens_of(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input.to_string());
        let mut tokens = vec![];
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn next_token() {
        let input = "
fn Add(a i32, b i32) : i32 {
	return a + b;
}~
2 - 1;
s := \"hi\"
x = 0.5
if a != b {}
";

        let expected = vec![
            (TokenKind::Func, "fn"),
            (TokenKind::Ident, "Add"),
            (TokenKind::Lparen, "("),
            (TokenKind::Ident, "a"),
            (TokenKind::Ident, "i32"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "b"),
            (TokenKind::Ident, "i32"),
            (TokenKind::Rparen, ")"),
            (TokenKind::Colon, ":"),
            (TokenKind::Ident, "i32"),
            (TokenKind::Lcurly, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::Ident, "a"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "b"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Rcurly, "}"),
            (TokenKind::Illegal, "~"),
            (TokenKind::Int, "2"),
            (TokenKind::Minus, "-"),
            (TokenKind::Int, "1"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Ident, "s"),
            (TokenKind::InitAssign, ":="),
            (TokenKind::Str, "hi"),
            (TokenKind::Ident, "x"),
            (TokenKind::Assign, "="),
            (TokenKind::Float, "0.5"),
            (TokenKind::If, "if"),
            (TokenKind::Ident, "a"),
            (TokenKind::NotEq, "!="),
            (TokenKind::Ident, "b"),
            (TokenKind::Lcurly, "{"),
            (TokenKind::Rcurly, "}"),
            (TokenKind::Eof, ""),
        ];

        let mut lexer = Lexer::new(input.to_string());
        for (i, (kind, literal)) in expected.into_iter().enumerate() {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, kind, "tests[{}] - wrong kind", i);
            assert_eq!(tok.literal, literal, "tests[{}] - wrong literal", i);
        }
    }

    #[test]
    fn token_positions() {
        let input = "
fn Sub(a i32, b i32) : i32 {
	return a - b;
}
";

        let expected = vec![
            (TokenKind::Func, "fn", 2, 1),
            (TokenKind::Ident, "Sub", 2, 4),
            (TokenKind::Lparen, "(", 2, 7),
            (TokenKind::Ident, "a", 2, 8),
            (TokenKind::Ident, "i32", 2, 10),
            (TokenKind::Comma, ",", 2, 13),
            (TokenKind::Ident, "b", 2, 15),
            (TokenKind::Ident, "i32", 2, 17),
            (TokenKind::Rparen, ")", 2, 20),
            (TokenKind::Colon, ":", 2, 22),
            (TokenKind::Ident, "i32", 2, 24),
            (TokenKind::Lcurly, "{", 2, 28),
            (TokenKind::Return, "return", 3, 2),
            (TokenKind::Ident, "a", 3, 9),
            (TokenKind::Minus, "-", 3, 11),
            (TokenKind::Ident, "b", 3, 13),
            (TokenKind::Semicolon, ";", 3, 14),
            (TokenKind::Rcurly, "}", 4, 1),
            (TokenKind::Eof, "", 5, 1),
        ];

        let mut lexer = Lexer::new(input.to_string());
        for (i, (kind, literal, line, column)) in expected.into_iter().enumerate() {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, kind, "tests[{}] {:?} - wrong kind", i, literal);
            assert_eq!(tok.literal, literal, "tests[{}] - wrong literal", i);
            assert_eq!(tok.pos.line, line, "tests[{}] {:?} - wrong line", i, literal);
            assert_eq!(
                tok.pos.column, column,
                "tests[{}] {:?} - wrong column",
                i, literal
            );
        }
    }

    #[test]
    fn literal_matches_source_slice() {
        let input = "fn Calc(a i32) : i32 {\n\tc := a * 21\n\treturn c\n}\n";
        let lines: Vec<&str> = input.split('\n').collect();

        for tok in tokens_of(input) {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            let line = lines[(tok.pos.line - 1) as usize];
            let start = (tok.pos.column - 1) as usize;
            assert_eq!(
                &line[start..start + tok.literal.len()],
                tok.literal,
                "{:?} not at {:?}",
                tok.literal,
                tok.pos
            );
        }
    }

    #[test]
    fn init_assign_is_one_token() {
        let tokens = tokens_of("a := b");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::InitAssign,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[1].pos, Position::new(1, 3));
    }

    #[test]
    fn split_colon_equal_stays_two_tokens() {
        let kinds: Vec<TokenKind> = tokens_of("a : = b").iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Assign,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn carriage_return_newline_is_one_line_break() {
        let mut lexer = Lexer::new("a\r\nb\rc".to_string());

        let a = lexer.next_token();
        assert_eq!((a.pos.line, a.pos.column), (1, 1));

        let b = lexer.next_token();
        assert_eq!((b.pos.line, b.pos.column), (2, 1));

        let c = lexer.next_token();
        assert_eq!((c.pos.line, c.pos.column), (3, 1));
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x".to_string());
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn unterminated_string_yields_eof() {
        let mut lexer = Lexer::new("\"abc".to_string());
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn string_literal_drops_quotes() {
        let tokens = tokens_of("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].literal, "hello world");
        assert_eq!(tokens[0].pos, Position::new(1, 1));
    }

    #[test]
    fn number_promotes_to_float_on_dot() {
        let tokens = tokens_of("12 0.625 7");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].literal, "12");
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].literal, "0.625");
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[2].literal, "7");
    }
}
