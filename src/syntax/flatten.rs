use grammar::Scope;
use syntax::ast::Operand;
use syntax::errors::ParsingResult;
use syntax::lexer::Token;
use syntax::matcher::{first_match, Memo};

pub fn flatten(tokens: &[Token], index: usize, scope: &Scope) -> ParsingResult<Vec<Operand>> {
    let mut items = Vec::new();
    let mut errors = Vec::new();
    let mut cursor = index;
    let mut memo = Memo::new();

    while cursor < tokens.len() {
        match first_match(tokens, cursor, scope, &mut memo) {
            Ok((next, inst)) => {
                debug!("flattened `{}` over tokens {}..{}", inst.op, cursor, next);
                items.push(Operand::Operator(inst));
                cursor = next;
            },
            Err(failures) => {
                errors.extend(failures.into_iter().filter(|e| !e.is_mismatch()));
                items.push(Operand::Token(tokens[cursor].clone()));
                cursor += 1;
            },
        }
    }

    ParsingResult::new(cursor, items, errors)
}
