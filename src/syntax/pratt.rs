use grammar::Fixity;
use syntax::ast::{Operand, SyntaxTree};
use syntax::errors::{ParseErr, ParsingResult};
use syntax::lexer::TokenKind;

/*
<expr(min)> ::= <head> <tail(min)>*
<head> ::= <leaf> | <closed> | <prefix> <expr(right(prefix))>
<tail(min)> ::= <postfix> | <infix> <expr(right(infix))>     -- while left(op) > min
*/

/// Resolves one expression from `items[index..]`. The expression is extended
/// only by operators whose left binding power is strictly above `min`; once a
/// newline-keeping operator is applied, a newline ends the expression.
pub fn resolve(items: &[Operand], index: usize, min: u32, keep_newline: bool) -> ParsingResult<SyntaxTree> {
    let mut errors = Vec::new();
    let mut cursor = skip_blank(items, index, false);
    let mut stop_at_newline = keep_newline;

    let head = match items.get(cursor) {
        Some(head) => head,
        None => {
            errors.push(ParseErr::ValueExpected{index: cursor});
            return ParsingResult::new(cursor, SyntaxTree::missing(offset_at(items, cursor)), errors);
        },
    };
    cursor += 1;

    let mut lhs = match head {
        Operand::Token(_) => SyntaxTree::leaf(head.clone()),
        Operand::Operator(inst) => {
            let fixity = inst.def.fixity();
            match fixity {
                Fixity::Postfix(_) | Fixity::Infix(..) => {
                    debug!("`{}` at {} has no left operand", inst.op, cursor - 1);
                    errors.push(ParseErr::InvalidLeadingOperator{index: cursor - 1, op: inst.op.clone()});
                },
                _ => {},
            }

            match fixity {
                Fixity::Closed => SyntaxTree::leaf(head.clone()),
                Fixity::Postfix(_) => SyntaxTree::postfix(head.clone(), SyntaxTree::missing(head.loc().start)),
                Fixity::Prefix(right) | Fixity::Infix(_, right) => {
                    stop_at_newline = keep_newline || inst.def.keeps_newline();
                    let rhs = resolve(items, cursor, right, stop_at_newline);
                    cursor = rhs.next;
                    errors.extend(rhs.errors);
                    match fixity {
                        Fixity::Prefix(_) => SyntaxTree::prefix(head.clone(), rhs.value),
                        _ => SyntaxTree::infix(head.clone(), SyntaxTree::missing(head.loc().start), rhs.value),
                    }
                },
            }
        },
    };

    loop {
        let peek = skip_blank(items, cursor, stop_at_newline);
        let inst = match items.get(peek) {
            Some(Operand::Operator(inst)) => inst,
            _ => break,
        };
        let (left, right) = match inst.def.fixity() {
            Fixity::Postfix(left) => (left, None),
            Fixity::Infix(left, right) => (left, Some(right)),
            Fixity::Prefix(_) | Fixity::Closed => break,
        };
        // equal power does not continue: that is left associativity
        if left <= min { break; }
        cursor = peek + 1;

        lhs = match right {
            None => SyntaxTree::postfix(items[peek].clone(), lhs),
            Some(right) => {
                stop_at_newline = stop_at_newline || inst.def.keeps_newline();
                let rhs = resolve(items, cursor, right, stop_at_newline);
                cursor = rhs.next;
                errors.extend(rhs.errors);
                SyntaxTree::infix(items[peek].clone(), lhs, rhs.value)
            },
        };
    }

    ParsingResult::new(cursor, lhs, errors)
}

pub fn resolve_all(items: &[Operand]) -> ParsingResult<Vec<SyntaxTree>> {
    let mut trees = Vec::new();
    let mut errors = Vec::new();
    let mut cursor = 0;

    loop {
        cursor = skip_blank(items, cursor, false);
        if cursor >= items.len() { break; }

        let tree = resolve(items, cursor, 0, false);
        cursor = tree.next;
        errors.extend(tree.errors);
        trees.push(tree.value);
    }

    ParsingResult::new(cursor, trees, errors)
}

fn skip_blank(items: &[Operand], mut index: usize, keep_newline: bool) -> usize {
    while let Some(Operand::Token(t)) = items.get(index) {
        match t.kind {
            TokenKind::Whitespace => index += 1,
            TokenKind::Newline if !keep_newline => index += 1,
            _ => break,
        }
    }
    index
}

fn offset_at(items: &[Operand], index: usize) -> usize {
    match items.get(index) {
        Some(item) => item.loc().start,
        None => items.last().map_or(0, |item| item.loc().end),
    }
}
