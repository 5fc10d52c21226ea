use grammar::{OpId, OperatorDefinition, Scope};
use syntax::ast::{Operand, OperatorInstance, SeparatorInstance};
use syntax::errors::ParseErr;
use syntax::lexer::Token;

use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

// Failed attempts keyed by (token index, interned scope, operator). An attempt
// depends only on those three, so a failure never needs to be recomputed.
#[derive(Default)]
pub(super) struct Memo {
    scopes: Vec<Scope>,
    failed: HashMap<(usize, usize, OpId), ParseErr>,
}
impl Memo {
    pub(super) fn new() -> Self { Memo::default() }

    // Interned scopes stay alive here, so definition identity is stable.
    fn intern(&mut self, scope: &Scope) -> usize {
        match self.scopes.iter().position(|s| s.shares(scope)) {
            Some(i) => i,
            None => {
                self.scopes.push(scope.clone());
                self.scopes.len() - 1
            },
        }
    }
}

/// Tries to read one `op` instance starting at `tokens[index]`.
///
/// The leading separator is matched once. After that the operands are read
/// into a buffer until a token closes one of the separators that may legally
/// come next; anything else is first tried as a nested operator from the
/// active scope and otherwise kept as a raw token. Nested failures are silent.
pub fn match_operator(tokens: &[Token], index: usize, op: &str, def: &Rc<OperatorDefinition>, scope: &Scope)
    -> Result<(usize, OperatorInstance), ParseErr>
{
    match_in(tokens, index, op, def, scope, &mut Memo::new())
}

fn match_in(tokens: &[Token], index: usize, op: &str, def: &Rc<OperatorDefinition>, scope: &Scope, memo: &mut Memo)
    -> Result<(usize, OperatorInstance), ParseErr>
{
    let leading = match tokens.get(index) {
        Some(t) if def.leading().accepts(&t.text) => t.clone(),
        _ => return Err(ParseErr::LeadingMismatch{index, op: op.into()}),
    };
    trace!("`{}` opens at {}", op, index);

    let separators = def.separators();
    let mut children = vec![ SeparatorInstance{index: 0, token: leading.clone(), operands: Vec::new()} ];
    let mut remaining: Vec<usize> = (1..separators.len()).collect();
    // repetitions of `remaining[0]` so far
    let mut count = 0;
    let mut cursor = index + 1;
    let mut buffer: Vec<Operand> = Vec::new();
    let mut buffer_start = cursor;
    let mut region: Option<(usize, Scope)> = None;

    while !remaining.is_empty() {
        let token = match tokens.get(cursor) {
            Some(token) => token,
            None => match first_required(def, &remaining, count) {
                None => {
                    // operands after the last separator belong to no separator; hand them back
                    cursor = buffer_start;
                    break;
                },
                Some(separator) => {
                    debug!("`{}` from {} ran out of input, separator {} still required", op, index, separator);
                    return Err(ParseErr::UnexpectedEnd{index: cursor, op: op.into(), separator});
                },
            },
        };

        let window = leading_window(def, &remaining, count);
        let closed = remaining[..window].iter().position(|&s| separators[s].accepts(&token.text));
        if let Some(k) = closed {
            let sep = remaining[k];
            trace!("`{}` closes separator {} at {}", op, sep, cursor);
            children.push(SeparatorInstance {
                index: sep,
                token: token.clone(),
                operands: mem::replace(&mut buffer, Vec::new()),
            });
            cursor += 1;
            buffer_start = cursor;

            count = if k == 0 { count + 1 } else { 1 };
            remaining.drain(..k);
            if separators[sep].repeats().exhausted_by(count) {
                remaining.remove(0);
                count = 0;
            }
            continue;
        }

        let open = remaining[0];
        if region.as_ref().map_or(true, |(sep, _)| *sep != open) {
            let derived = match separators[open].scope() {
                Some(gen) => gen.apply(scope),
                None => scope.clone(),
            };
            region = Some((open, derived));
        }
        let nested = match region {
            Some((_, ref inner)) => first_match(tokens, cursor, inner, memo).ok(),
            None => None,
        };
        match nested {
            Some((next, inst)) => {
                if next <= cursor {
                    return Err(ParseErr::NoProgress{index: cursor, op: inst.op});
                }
                buffer.push(Operand::Operator(inst));
                cursor = next;
            },
            None => {
                buffer.push(Operand::Token(token.clone()));
                cursor += 1;
            },
        }
    }

    debug!("`{}` matched tokens {}..{}", op, index, cursor);
    Ok( (cursor, OperatorInstance{op: op.into(), def: def.clone(), leading, children}) )
}

pub(super) fn first_match(tokens: &[Token], index: usize, scope: &Scope, memo: &mut Memo)
    -> Result<(usize, OperatorInstance), Vec<ParseErr>>
{
    let id = memo.intern(scope);
    let mut failures = Vec::new();
    for (op, def) in scope.iter() {
        let key = (index, id, op.to_string());
        if let Some(seen) = memo.failed.get(&key) {
            failures.push(seen.clone());
            continue;
        }
        match match_in(tokens, index, op, def, scope, memo) {
            Ok(matched) => return Ok(matched),
            Err(e) => {
                memo.failed.insert(key, e.clone());
                failures.push(e);
            },
        }
    }
    Err(failures)
}

fn still_required(def: &OperatorDefinition, remaining: &[usize], count: usize, i: usize) -> bool {
    let done = if i == 0 { count } else { 0 };
    def.separators()[remaining[i]].repeats().min() > done
}

/// Separators whose closing tokens are legal now: everything up to and
/// including the first one that is still required.
fn leading_window(def: &OperatorDefinition, remaining: &[usize], count: usize) -> usize {
    (0..remaining.len())
        .find(|&i| still_required(def, remaining, count, i))
        .map_or(remaining.len(), |i| i + 1)
}

fn first_required(def: &OperatorDefinition, remaining: &[usize], count: usize) -> Option<usize> {
    (0..remaining.len())
        .find(|&i| still_required(def, remaining, count, i))
        .map(|i| remaining[i])
}
