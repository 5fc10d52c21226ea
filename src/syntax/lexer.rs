use syntax::Loc;

use combine::*;
use combine::parser::char::*;
use num::BigUint;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Whitespace,
    Newline,
    Placeholder,
    Symbol,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Loc,
}
impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S, loc: Loc) -> Self {
        Token{kind, text: text.into(), loc}
    }

    pub fn placeholder(at: usize) -> Self {
        Token{kind: TokenKind::Placeholder, text: String::new(), loc: Loc{start: at, end: at}}
    }

    pub fn is_blank(&self) -> bool {
        self.kind == TokenKind::Whitespace || self.kind == TokenKind::Newline
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind == TokenKind::Placeholder && self.text.is_empty()
    }

    pub fn to_nat(&self) -> Option<BigUint> {
        if self.kind == TokenKind::Number { BigUint::parse_bytes(self.text.as_bytes(), 10) }
        else { None }
    }
}
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_synthetic() { write!(f, "_") }
        else { write!(f, "{}", self.text) }
    }
}

const DELIMITERS: &str = "()[]{},;";

pub(super) fn top_level<I>() -> impl Parser<Input = I, Output = Vec<(TokenKind, String)>>
    where I: Stream<Item = char>,
          I::Error: ParseError<I::Item, I::Range, I::Position>,
{
    many(lex()).skip(eof())
}

fn lex<I>() -> impl Parser<Input = I, Output = (TokenKind, String)>
    where I: Stream<Item = char>,
          I::Error: ParseError<I::Item, I::Range, I::Position>,
{
    let blank = many1::<String, _>(satisfy(|c: char| c != '\n' && c.is_whitespace()))
        .map(|s| (TokenKind::Whitespace, s));

    let line = token('\n').map(|c: char| (TokenKind::Newline, c.to_string()));

    let word = (
            satisfy(|c: char| c.is_alphabetic() || c == '_'),
            many::<String, _>(satisfy(|c: char| c.is_alphanumeric() || c == '_')),
        ).map( |(head, tail): (char, String)| {
            let mut s = head.to_string();
            s.push_str(&tail);
            if s == "_" { (TokenKind::Placeholder, s) }
            else { (TokenKind::Ident, s) }
        } );

    let number = many1::<String, _>(digit()).map(|s| (TokenKind::Number, s));

    let escaped = token('\\').and(any()).map(|(e, c): (char, char)| format!("{}{}", e, c));
    let plain = satisfy(|c: char| c != '"' && c != '\\').map(|c: char| c.to_string());
    let string = (token('"'), many::<String, _>(escaped.or(plain)), token('"'))
        .map(|(_, body, _): (char, String, char)| (TokenKind::Str, format!("\"{}\"", body)));

    let delimiter = satisfy(|c: char| DELIMITERS.contains(c)).map(|c: char| (TokenKind::Symbol, c.to_string()));

    let operator = many1::<String, _>(satisfy(is_operator_char)).map(|s| (TokenKind::Symbol, s));

    let stray = any().map(|c: char| (TokenKind::Symbol, c.to_string()));

    choice((blank, line, word, number, string, delimiter, operator, stray))
}

fn is_operator_char(c: char) -> bool {
    use unicode_categories::UnicodeCategories;

    !DELIMITERS.contains(c) && c != '"' && c != '_' && (c.is_punctuation() || c.is_symbol())
}

pub(super) fn located(raw: Vec<(TokenKind, String)>) -> Vec<Token> {
    let mut offset = 0;
    raw.into_iter()
        .map( |(kind, text)| {
            let start = offset;
            offset += text.len();
            Token{kind, text, loc: Loc{start, end: offset}}
        } )
        .collect()
}
