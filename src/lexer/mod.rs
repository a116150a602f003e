mod error;
mod token;

pub use error::LexError;
pub use token::{Token, TokenKind, TokenValue};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::ast::Position;

/// End-of-text sentinel. The source is padded with a single one of these so
/// that lookahead never needs to special-case running off the end.
const ETX: char = '\x03';

pub const MAX_IDENTIFIER_LEN: usize = 128;
pub const MAX_STRING_LEN: usize = 3000;
pub const MAX_COMMENT_LEN: usize = 3000;
pub const MAX_PRECISION: usize = 15;

static RESERVED: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("if", If),
        ("elif", Elif),
        ("else", Else),
        ("while", While),
        ("return", Return),
        ("break", Break),
        ("continue", Continue),
        ("to", To),
        ("void", Void),
        ("int", Int),
        ("float", Float),
        ("string", String),
        ("bool", Bool),
        ("exception", Exception),
        ("throw", Throw),
        ("try", Try),
        ("catch", Catch),
        ("or", Or),
        ("and", And),
        ("not", Not),
        ("true", BoolLiteral),
        ("false", BoolLiteral),
    ])
});

static DOUBLE_OPS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("<=", Le),
        (">=", Ge),
        ("==", Eq),
        ("!=", Ne),
    ])
});

static SINGLE_OPS: Lazy<HashMap<char, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ('(', LParen),
        (')', RParen),
        ('[', LBracket),
        (']', RBracket),
        ('{', LBrace),
        ('}', RBrace),
        ('.', Dot),
        (',', Comma),
        (':', Colon),
        (';', Semicolon),
        ('+', Plus),
        ('-', Minus),
        ('*', Star),
        ('/', Slash),
        ('%', Percent),
        ('<', Lt),
        ('>', Gt),
        ('=', Assign),
        ('!', Bang),
    ])
});

/// A thin cursor over the source text that tracks line/column position and
/// exposes a single character of lookahead, padded with an [`ETX`] sentinel.
struct Source<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
    done: bool,
}

impl<'a> Source<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            position: Position::start(),
            done: false,
        }
    }

    fn peek(&mut self) -> char {
        match self.chars.peek() {
            Some(c) => *c,
            None => ETX,
        }
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.clone().nth(offset).unwrap_or(ETX)
    }

    /// Consume and return the current character, advancing position.
    fn advance(&mut self) -> char {
        match self.chars.next() {
            Some(c) => {
                if c == '\n' {
                    self.position.advance_line();
                } else {
                    self.position.advance_column();
                }
                c
            }
            None => {
                self.done = true;
                ETX
            }
        }
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Converts raw source text into a flat token stream.
///
/// The lexer has no notion of statements or expressions; it only recognizes
/// the token grammar in isolation, deferring everything structural to the
/// parser. Every error it can raise aborts scanning immediately.
pub struct Lexer<'a> {
    source: Source<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            source: Source::new(text),
        }
    }

    /// Lex the entire input into a vector of tokens, including a trailing
    /// [`TokenKind::Etx`]. Stops at the first error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_etx = tok.kind == TokenKind::Etx;
            tokens.push(tok);
            if is_etx {
                break;
            }
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.source.peek(), ' ' | '\t' | '\r' | '\n') {
            self.source.advance();
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let pos = self.source.position();
        let c = self.source.peek();

        if c == ETX {
            return Ok(Token::new(TokenKind::Etx, pos, None));
        }
        if c == '#' {
            return self.lex_line_comment();
        }
        if c == '$' {
            return self.lex_block_comment();
        }
        if c.is_ascii_digit() {
            return self.lex_number();
        }
        if c == '"' {
            return self.lex_string();
        }
        if c.is_alphabetic() || c == '_' {
            return self.lex_identifier_or_keyword();
        }
        self.lex_operator()
    }

    fn lex_line_comment(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();
        self.source.advance(); // '#'
        let mut text = std::string::String::new();
        while !matches!(self.source.peek(), '\n' | '\x03') {
            if text.len() >= MAX_COMMENT_LEN {
                return Err(LexError::CommentTooLong(pos));
            }
            text.push(self.source.advance());
        }
        Ok(Token::new(
            TokenKind::Comment,
            pos,
            Some(TokenValue::Str(text)),
        ))
    }

    fn lex_block_comment(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();
        self.source.advance(); // opening '$'
        let mut text = std::string::String::new();
        loop {
            match self.source.peek() {
                '\x03' => return Err(LexError::UnterminatedComment(pos)),
                '$' => {
                    self.source.advance();
                    break;
                }
                _ => {
                    if text.len() >= MAX_COMMENT_LEN {
                        return Err(LexError::CommentTooLong(pos));
                    }
                    text.push(self.source.advance());
                }
            }
        }
        Ok(Token::new(
            TokenKind::Comment,
            pos,
            Some(TokenValue::Str(text)),
        ))
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();

        // A leading `0` not followed by `.` stands alone: `0123` lexes as
        // `0`, `0`, `123`, not as a three-digit integer.
        if self.source.peek() == '0' && self.source.peek_at(1) != '.' {
            self.source.advance();
            return Ok(Token::new(
                TokenKind::IntLiteral,
                pos,
                Some(TokenValue::Int(0)),
            ));
        }

        let mut value: i64 = 0;
        let mut any_digit = false;
        while self.source.peek().is_ascii_digit() {
            any_digit = true;
            let d = self.source.advance().to_digit(10).unwrap() as i64;
            if (i64::MAX - d) / 10 < value {
                return Err(LexError::NumberOverflow(pos));
            }
            value = value * 10 + d;
        }
        debug_assert!(any_digit);

        if self.source.peek() == '.' && self.source.peek_at(1).is_ascii_digit() {
            self.source.advance(); // '.'
            let mut frac = std::string::String::new();
            while self.source.peek().is_ascii_digit() {
                if frac.len() >= MAX_PRECISION {
                    return Err(LexError::PrecisionTooHigh(pos));
                }
                frac.push(self.source.advance());
            }
            let text = format!("{}.{}", value, frac);
            let f: f64 = text.parse().map_err(|_| LexError::NumberOverflow(pos))?;
            return Ok(Token::new(
                TokenKind::FloatLiteral,
                pos,
                Some(TokenValue::Float(f)),
            ));
        }

        Ok(Token::new(
            TokenKind::IntLiteral,
            pos,
            Some(TokenValue::Int(value)),
        ))
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();
        self.source.advance(); // opening quote
        let mut text = std::string::String::new();
        loop {
            match self.source.peek() {
                '"' => {
                    self.source.advance();
                    break;
                }
                '\n' | '\x03' => return Err(LexError::UnterminatedString(pos)),
                '\\' => {
                    let esc_pos = self.source.position();
                    self.source.advance();
                    let escaped = self.escaped_char(esc_pos)?;
                    if text.len() >= MAX_STRING_LEN {
                        return Err(LexError::StringTooLong(pos));
                    }
                    text.push(escaped);
                }
                _ => {
                    if text.len() >= MAX_STRING_LEN {
                        return Err(LexError::StringTooLong(pos));
                    }
                    text.push(self.source.advance());
                }
            }
        }
        Ok(Token::new(
            TokenKind::StringLiteral,
            pos,
            Some(TokenValue::Str(text)),
        ))
    }

    fn escaped_char(&mut self, esc_pos: Position) -> Result<char, LexError> {
        let c = self.source.peek();
        let resolved = match c {
            '\\' => '\\',
            '"' => '"',
            't' => '\t',
            'n' => '\n',
            _ => return Err(LexError::BadEscape(esc_pos, c)),
        };
        self.source.advance();
        Ok(resolved)
    }

    fn lex_identifier_or_keyword(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();
        let mut text = std::string::String::new();
        while self.source.peek().is_alphanumeric() || self.source.peek() == '_' {
            if text.len() >= MAX_IDENTIFIER_LEN {
                return Err(LexError::IdentifierTooLong(pos));
            }
            text.push(self.source.advance());
        }

        if let Some(kind) = RESERVED.get(text.as_str()) {
            let value = match kind {
                TokenKind::BoolLiteral => Some(TokenValue::Bool(text == "true")),
                _ => None,
            };
            return Ok(Token::new(*kind, pos, value));
        }

        Ok(Token::new(
            TokenKind::Identifier,
            pos,
            Some(TokenValue::Str(text)),
        ))
    }

    fn lex_operator(&mut self) -> Result<Token, LexError> {
        let pos = self.source.position();
        let c = self.source.peek();
        let next = self.source.peek_at(1);
        let two: std::string::String = [c, next].iter().collect();

        if let Some(kind) = DOUBLE_OPS.get(two.as_str()) {
            self.source.advance();
            self.source.advance();
            return Ok(Token::new(*kind, pos, None));
        }

        if let Some(kind) = SINGLE_OPS.get(&c) {
            self.source.advance();
            return Ok(Token::new(*kind, pos, None));
        }

        self.source.advance();
        Err(LexError::UnknownToken(pos, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Lexer::new(text)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_simple_arithmetic() {
        let ks = kinds("1 + 2 * 3");
        assert_eq!(
            ks,
            vec![
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Star,
                TokenKind::IntLiteral,
                TokenKind::Etx,
            ]
        );
    }

    #[test]
    fn lexes_keywords_vs_identifiers() {
        let ks = kinds("if whiley");
        assert_eq!(ks, vec![TokenKind::If, TokenKind::Identifier, TokenKind::Etx]);
    }

    #[test]
    fn lexes_two_char_operators_greedily() {
        let ks = kinds("<= < !=");
        assert_eq!(
            ks,
            vec![
                TokenKind::Le,
                TokenKind::Lt,
                TokenKind::Ne,
                TokenKind::Etx,
            ]
        );
    }

    #[test]
    fn lexes_float_literal() {
        let tokens = Lexer::new("3.14").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[0].value, Some(TokenValue::Float(3.14)));
    }

    #[test]
    fn rejects_number_overflow() {
        let huge = format!("{}0", i64::MAX);
        let err = Lexer::new(&huge).tokenize().unwrap_err();
        assert!(matches!(err, LexError::NumberOverflow(_)));
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString(_)));
    }

    #[test]
    fn rejects_bad_escape() {
        let err = Lexer::new("\"a\\qb\"").tokenize().unwrap_err();
        assert!(matches!(err, LexError::BadEscape(_, 'q')));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let ks = kinds("# a line comment\n1 $ a block $ 2");
        assert_eq!(
            ks,
            vec![
                TokenKind::Comment,
                TokenKind::IntLiteral,
                TokenKind::Comment,
                TokenKind::IntLiteral,
                TokenKind::Etx,
            ]
        );
    }

    #[test]
    fn leading_zero_rule_splits_into_separate_tokens() {
        let tokens = Lexer::new("00143").tokenize().unwrap();
        let values: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::IntLiteral)
            .map(|t| t.value.clone())
            .collect();
        assert_eq!(
            values,
            vec![
                Some(TokenValue::Int(0)),
                Some(TokenValue::Int(0)),
                Some(TokenValue::Int(143)),
            ]
        );
    }

    #[test]
    fn string_escapes_resolve() {
        let tokens = Lexer::new("\"a\\tb\\nc\"").tokenize().unwrap();
        assert_eq!(
            tokens[0].value,
            Some(TokenValue::Str("a\tb\nc".to_string()))
        );
    }
}
