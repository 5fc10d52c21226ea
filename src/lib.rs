#![recursion_limit = "2048"]
#![type_length_limit="2097152"]

pub mod grammar;
pub mod syntax;

extern crate combine;
extern crate num;
extern crate unicode_categories;
extern crate itertools;

extern crate serde;
#[macro_use] extern crate serde_derive;
extern crate rmp_serde;

#[macro_use] extern crate log;
#[cfg(test)] extern crate env_logger;

#[cfg(test)] #[macro_use] extern crate proptest;

use combine::stream::easy;
use combine::stream::state::SourcePosition;

use grammar::Scope;
use syntax::{ParsingResult, SyntaxTree};

pub fn parse_source<'a>(src: &'a str, scope: &Scope)
    -> Result<ParsingResult<Vec<SyntaxTree>>, easy::Errors<char, &'a str, SourcePosition>>
{
    let tokens = syntax::lex(src)?;
    debug!("lexed {} tokens", tokens.len());
    Ok( syntax::parse(&tokens, scope) )
}
