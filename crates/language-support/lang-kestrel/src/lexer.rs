//! Tokenizer for Kestrel source text
//!
//! Trivia (whitespace and `//` line comments) attaches as leading text of
//! the following token; whatever trails the final token becomes that
//! token's trailing trivia. Nothing is dropped, so the token stream
//! carries the source byte for byte.

use ks_syntax::TokenKind;

/// One lexed token with its attached trivia
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexedToken {
    pub(crate) kind: TokenKind,
    pub(crate) leading: String,
    pub(crate) text: String,
    pub(crate) trailing: String,
}

/// Splits `source` into tokens; an all-trivia source yields none
pub(crate) fn lex(source: &str) -> Vec<LexedToken> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut tokens: Vec<LexedToken> = Vec::new();
    loop {
        let leading = lexer.trivia().to_string();
        match lexer.next_token() {
            Some((kind, text)) => tokens.push(LexedToken {
                kind,
                leading,
                text: text.to_string(),
                trailing: String::new(),
            }),
            None => {
                if !leading.is_empty() {
                    if let Some(last) = tokens.last_mut() {
                        last.trailing = leading;
                    }
                }
                break;
            }
        }
    }
    tokens
}

struct Lexer<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    /// Consumes whitespace and line comments, returning what was skipped
    fn trivia(&mut self) -> &'src str {
        let start = self.pos;
        loop {
            let rest = &self.source[self.pos..];
            if rest.starts_with("//") {
                // up to the newline; the newline itself is whitespace
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if let Some(ch) = rest.chars().next() {
                if ch.is_whitespace() {
                    self.pos += ch.len_utf8();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        &self.source[start..self.pos]
    }

    fn next_token(&mut self) -> Option<(TokenKind, &'src str)> {
        let start = self.pos;
        let first = self.source[self.pos..].chars().next()?;

        let kind = if first == '_' || first.is_alphabetic() {
            self.word()
        } else if first.is_ascii_digit() {
            self.number()
        } else if first == '"' {
            self.string()
        } else {
            self.pos += first.len_utf8();
            TokenKind::Punct
        };
        Some((kind, &self.source[start..self.pos]))
    }

    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.source[self.pos..].chars().next() {
            if ch == '_' || ch.is_alphanumeric() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        if &self.source[start..self.pos] == "let" {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        }
    }

    fn number(&mut self) -> TokenKind {
        self.digits();
        // a decimal point counts only when digits follow; `1.x` stays a
        // member access on the integer
        let rest = &self.source[self.pos..];
        if rest.starts_with('.') && rest[1..].starts_with(|ch: char| ch.is_ascii_digit()) {
            self.pos += 1;
            self.digits();
        }
        TokenKind::Literal
    }

    fn digits(&mut self) {
        while self.source[self.pos..].starts_with(|ch: char| ch.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn string(&mut self) -> TokenKind {
        // opening quote
        self.pos += 1;
        loop {
            let Some(ch) = self.source[self.pos..].chars().next() else {
                // unterminated string runs to the end of the source
                break;
            };
            self.pos += ch.len_utf8();
            match ch {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.source[self.pos..].chars().next() {
                        self.pos += escaped.len_utf8();
                    }
                }
                _ => {}
            }
        }
        TokenKind::Literal
    }
}
