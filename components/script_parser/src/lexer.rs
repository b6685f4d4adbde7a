//! Lexer - tokenizes script source into tokens.

use script_core::ScriptError;

/// Reserved words of the script language.
///
/// `For`, `Function`, and friends are recognized so that unsupported
/// constructs fail with a clear syntax error instead of a confusing
/// parse failure on a bare identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    /// and operator
    And,
    /// or operator
    Or,
    /// not operator
    Not,
    /// nil literal
    Nil,
    /// true literal
    True,
    /// false literal
    False,
    /// if keyword
    If,
    /// then keyword
    Then,
    /// elseif keyword
    Elseif,
    /// else keyword
    Else,
    /// end keyword
    End,
    /// while keyword
    While,
    /// do keyword
    Do,
    /// return keyword
    Return,
    /// local keyword
    Local,
    /// for keyword (reserved, unsupported)
    For,
    /// in keyword (reserved, unsupported)
    In,
    /// function keyword (reserved, unsupported)
    Function,
    /// repeat keyword (reserved, unsupported)
    Repeat,
    /// until keyword (reserved, unsupported)
    Until,
    /// break keyword (reserved, unsupported)
    Break,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Keyword> {
        Some(match ident {
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "nil" => Keyword::Nil,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "elseif" => Keyword::Elseif,
            "else" => Keyword::Else,
            "end" => Keyword::End,
            "while" => Keyword::While,
            "do" => Keyword::Do,
            "return" => Keyword::Return,
            "local" => Keyword::Local,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "function" => Keyword::Function,
            "repeat" => Keyword::Repeat,
            "until" => Keyword::Until,
            "break" => Keyword::Break,
            _ => return None,
        })
    }
}

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier
    Ident(String),
    /// Integer literal
    Int(i64),
    /// Float literal
    Number(f64),
    /// String literal (unescaped)
    Str(String),
    /// Reserved word
    Keyword(Keyword),
    /// `=`
    Assign,
    /// `==`
    Eq,
    /// `~=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `..`
    Concat,
    /// `.`
    Dot,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// End of input
    Eof,
}

/// A token with the source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed
    pub kind: TokenKind,
    /// 1-based source line
    pub line: u32,
}

/// Tokenize a source string.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>, ScriptError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let line = self.line;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                });
                return Ok(tokens);
            };
            let kind = match c {
                '0'..='9' => self.number()?,
                '\'' | '"' => self.string(c)?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                _ => self.punct()?,
            };
            tokens.push(Token { kind, line });
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn number(&mut self) -> Result<TokenKind, ScriptError> {
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.bump().unwrap_or_default());
        }
        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            text.push(self.bump().unwrap_or_default());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.bump().unwrap_or_default());
            }
        }
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Number)
                .map_err(|_| ScriptError::syntax(self.line, format!("malformed number '{text}'")))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| ScriptError::syntax(self.line, format!("malformed number '{text}'")))
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, ScriptError> {
        let start_line = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ScriptError::syntax(start_line, "unterminated string"));
                }
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| ScriptError::syntax(start_line, "unterminated string"))?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        other => {
                            return Err(ScriptError::syntax(
                                self.line,
                                format!("unknown escape '\\{other}'"),
                            ));
                        }
                    });
                }
                Some(c) if c == quote => return Ok(TokenKind::Str(text)),
                Some(c) => text.push(c),
            }
        }
    }

    fn ident(&mut self) -> TokenKind {
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            text.push(self.bump().unwrap_or_default());
        }
        match Keyword::from_ident(&text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(text),
        }
    }

    fn punct(&mut self) -> Result<TokenKind, ScriptError> {
        let c = self
            .bump()
            .ok_or_else(|| ScriptError::syntax(self.line, "unexpected end of input"))?;
        Ok(match c {
            '=' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '~' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    return Err(ScriptError::syntax(self.line, "unexpected character '~'"));
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '.' => {
                if self.peek() == Some('.') {
                    self.bump();
                    TokenKind::Concat
                } else {
                    TokenKind::Dot
                }
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            other => {
                return Err(ScriptError::syntax(
                    self.line,
                    format!("unexpected character '{other}'"),
                ));
            }
        })
    }
}
