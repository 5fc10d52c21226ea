pub mod ast;
pub mod lexer;
mod errors;
mod matcher;
mod flatten;
mod pratt;

pub use self::ast::{Operand, OperatorInstance, SeparatorInstance, SyntaxTree};
pub use self::errors::{ParseErr, ParsingResult};
pub use self::flatten::flatten;
pub use self::lexer::{Token, TokenKind};
pub use self::matcher::match_operator;
pub use self::pratt::{resolve, resolve_all};

use grammar::Scope;

use combine::*;
use combine::stream::{state::{SourcePosition, State}, easy};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Loc {
    pub start: usize,
    pub end: usize,
}

pub fn loc_range(a: Loc, b: Loc) -> Loc {
    Loc{start: a.start, end: b.end}
}

pub fn lex(src: &str) -> Result<Vec<Token>, easy::Errors<char, &str, SourcePosition>> {
    lexer::top_level().easy_parse(State::new(src)).map(|(raw, _)| lexer::located(raw))
}

pub fn parse(tokens: &[Token], scope: &Scope) -> ParsingResult<Vec<SyntaxTree>> {
    debug!("parsing {} tokens against {} operators", tokens.len(), scope.len());

    let flat = flatten(tokens, 0, scope);
    let trees = resolve_all(&flat.value);

    let mut errors = flat.errors;
    errors.extend(trees.errors);
    debug!("parsed {} trees with {} errors", trees.value.len(), errors.len());

    ParsingResult::new(flat.next, trees.value, errors)
}
