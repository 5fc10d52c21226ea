use grammar::{Bound, GrammarErr, OperatorDefinition, Precedence, Repeats, Scope, ScopeGen, SeparatorDefinition};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

// Every named scope of one `build`, shared by the generators that refer to it.
type Built = Rc<RefCell<HashMap<String, Scope>>>;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GrammarTable {
    pub top: String,
    pub scopes: Vec<ScopeTable>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ScopeTable {
    pub name: String,
    pub operators: Vec<OperatorEntry>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct OperatorEntry {
    pub id: String,
    pub separators: Vec<SeparatorEntry>,
    pub left: Option<u32>,
    pub right: Option<u32>,
    #[serde(default)]
    pub keep_newline: bool,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SeparatorEntry {
    pub tokens: Vec<String>,
    pub min: usize,
    pub max: Option<usize>,
    #[serde(default)]
    pub scope: Option<ScopeRef>,
}

/// `inherit` merges the named scope into the enclosing one instead of
/// replacing it.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ScopeRef {
    pub name: String,
    #[serde(default)]
    pub inherit: bool,
}

impl GrammarTable {
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, GrammarErr> {
        ::rmp_serde::from_slice(bytes).map_err(|e| GrammarErr::Msgpack(e.to_string()))
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, GrammarErr> {
        ::rmp_serde::to_vec(self).map_err(|e| GrammarErr::Msgpack(e.to_string()))
    }

    pub fn build(&self) -> Result<Scope, GrammarErr> {
        self.check_names()?;

        let built: Built = Rc::default();
        for scope in &self.scopes {
            let named = build_scope(self, &built, &scope.name)?;
            debug!("scope `{}` built with {} operators", scope.name, named.len());
            built.borrow_mut().insert(scope.name.clone(), named);
        }

        let top = built.borrow().get(&self.top).cloned();
        top.ok_or_else(|| GrammarErr::UndefinedScope{name: self.top.clone()})
    }

    fn scope(&self, name: &str) -> Option<&ScopeTable> {
        self.scopes.iter().find(|s| s.name == name)
    }

    fn check_names(&self) -> Result<(), GrammarErr> {
        let mut names = HashSet::new();
        for scope in &self.scopes {
            if !names.insert(scope.name.as_str()) {
                return Err(GrammarErr::DuplicatedScope{name: scope.name.clone()});
            }
        }

        for scope in &self.scopes {
            let mut ids = HashSet::new();
            for entry in &scope.operators {
                if !ids.insert(entry.id.as_str()) {
                    return Err(GrammarErr::DuplicatedOperator{scope: scope.name.clone(), op: entry.id.clone()});
                }
                let refs = entry.separators.iter().filter_map(|s| s.scope.as_ref());
                for r in refs {
                    if !names.contains(r.name.as_str()) {
                        return Err(GrammarErr::UndefinedScope{name: r.name.clone()});
                    }
                }
            }
        }
        Ok(())
    }
}

fn build_scope(table: &GrammarTable, built: &Built, name: &str) -> Result<Scope, GrammarErr> {
    let entries = table.scope(name).ok_or_else(|| GrammarErr::UndefinedScope{name: name.into()})?;

    let mut scope = Scope::new();
    for entry in &entries.operators {
        let def = build_operator(built, entry)
            .map_err(|err| GrammarErr::InOperator{op: entry.id.clone(), err: Box::new(err)})?;
        scope.insert(entry.id.as_str(), def);
    }
    Ok(scope)
}

fn build_operator(built: &Built, entry: &OperatorEntry) -> Result<OperatorDefinition, GrammarErr> {
    let mut separators = Vec::with_capacity(entry.separators.len());
    for sep in &entry.separators {
        let repeats = Repeats::new(sep.min, Bound::from(sep.max))?;
        let mut def = SeparatorDefinition::new(sep.tokens.iter().cloned(), repeats)?;
        if let Some(ref r) = sep.scope {
            def = def.scoped(named_scope(built.clone(), r));
        }
        separators.push(def);
    }

    let def = OperatorDefinition::from_separators(separators, Precedence::new(entry.left, entry.right))?;
    Ok( if entry.keep_newline { def.keep_newline() } else { def } )
}

// A generator only escapes a successful `build`, which has filled in every name.
fn named_scope(built: Built, r: &ScopeRef) -> ScopeGen {
    let name = r.name.clone();
    let inherit = r.inherit;
    ScopeGen::new(move |enclosing| {
        let named = match built.borrow().get(&name) {
            Some(named) => named.clone(),
            None => {
                error!("scope `{}` was never built", name);
                return enclosing.clone();
            },
        };
        if inherit { enclosing.merged(&named) } else { named }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syntax::{lex, parse};

    fn sep(tokens: &[&str], min: usize, max: Option<usize>) -> SeparatorEntry {
        SeparatorEntry{tokens: tokens.iter().map(|t| t.to_string()).collect(), min, max, scope: None}
    }

    fn op(id: &str, separators: Vec<SeparatorEntry>, left: Option<u32>, right: Option<u32>) -> OperatorEntry {
        OperatorEntry{id: id.into(), separators, left, right, keep_newline: false}
    }

    fn blocks() -> GrammarTable {
        let mut close = sep(&["}"], 1, Some(1));
        close.scope = Some(ScopeRef{name: "stmt".into(), inherit: false});
        let block = op("block", vec![sep(&["{"], 1, Some(1)), close], None, None);

        GrammarTable {
            top: "expr".into(),
            scopes: vec![
                ScopeTable{name: "expr".into(), operators: vec![
                    block.clone(),
                    op("plus", vec![sep(&["+"], 1, Some(1))], Some(10), Some(11)),
                ]},
                ScopeTable{name: "stmt".into(), operators: vec![
                    block,
                    op("seq", vec![sep(&[";"], 1, Some(1))], Some(1), Some(2)),
                ]},
            ],
        }
    }

    #[test]
    pub fn builds_the_top_scope_in_order() {
        let scope = blocks().build().unwrap();
        assert_eq!(scope.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec!["block", "plus"]);
        assert_eq!(scope.get("plus").unwrap().precedence(), Precedence::new(Some(10), Some(11)));
    }

    #[test]
    pub fn named_scopes_recurse() {
        let _ = ::env_logger::try_init();
        let scope = blocks().build().unwrap();
        let tokens = lex("{ a ; { b ; c } } ; d").unwrap();
        let result = parse(&tokens, &scope);
        assert!(result.is_ok());

        let trees: Vec<_> = result.value.iter().map(|t| t.to_string()).collect();
        assert_eq!(trees, vec!["[{ a ; [{ b ; c }] }]", ";", "d"]);

        match result.value[0].item {
            ::syntax::Operand::Operator(ref block) => {
                let body = block.separator(1).next().unwrap().resolve_operands();
                assert!(body.is_ok());
                assert_eq!(body.value.iter().map(|t| t.to_string()).collect::<Vec<_>>(), vec!["(; a [{ b ; c }])"]);
            },
            ref other => panic!("expected a block, got {}", other),
        }
    }

    #[test]
    pub fn named_scopes_are_built_once() {
        let scope = blocks().build().unwrap();
        let block = scope.get("block").unwrap();
        let region = block.separators()[1].scope().unwrap();

        let first = region.apply(&scope);
        let second = region.apply(&Scope::new());
        assert!(first.shares(&second));
        assert_eq!(first.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec!["block", "seq"]);

        // the inner block refers to the very scope it lives in
        let inner = first.get("block").unwrap().separators()[1].scope().unwrap();
        assert!(inner.apply(&first).shares(&first));
    }

    #[test]
    pub fn inherited_scope_keeps_enclosing_operators() {
        let mut table = blocks();
        if let Some(ref mut r) = table.scopes[0].operators[0].separators[1].scope {
            r.inherit = true;
        }
        let scope = table.build().unwrap();
        let tokens = lex("{ a + b ; c }").unwrap();
        let result = parse(&tokens, &scope);
        match result.value[0].item {
            ::syntax::Operand::Operator(ref block) => {
                let body = block.separator(1).next().unwrap().resolve_operands();
                assert_eq!(body.value.iter().map(|t| t.to_string()).collect::<Vec<_>>(), vec!["(; (+ a b) c)"]);
            },
            ref other => panic!("expected a block, got {}", other),
        }
    }

    #[test]
    pub fn rejects_bad_references_and_duplicates() {
        let mut table = blocks();
        table.scopes[1].name = "statements".into();
        assert_eq!(table.build(), Err(GrammarErr::UndefinedScope{name: "stmt".into()}));

        let mut table = blocks();
        table.top = "program".into();
        assert_eq!(table.build(), Err(GrammarErr::UndefinedScope{name: "program".into()}));

        let mut table = blocks();
        let again = table.scopes[0].operators[1].clone();
        table.scopes[0].operators.push(again);
        assert_eq!(table.build(), Err(GrammarErr::DuplicatedOperator{scope: "expr".into(), op: "plus".into()}));

        let mut table = blocks();
        let again = table.scopes[1].clone();
        table.scopes.push(again);
        assert_eq!(table.build(), Err(GrammarErr::DuplicatedScope{name: "stmt".into()}));
    }

    #[test]
    pub fn operator_errors_name_the_operator() {
        let mut table = blocks();
        table.scopes[1].operators[1].separators.push(sep(&[":"], 3, Some(2)));
        assert_eq!(table.build(), Err(GrammarErr::InOperator{
            op: "seq".into(),
            err: Box::new(GrammarErr::InvertedRepeats{min: 3, max: 2}),
        }));

        let mut table = blocks();
        table.scopes[0].operators[1].separators[0].max = None;
        assert_eq!(table.build(), Err(GrammarErr::InOperator{
            op: "plus".into(),
            err: Box::new(GrammarErr::LeadingNotOnce),
        }));
    }

    #[test]
    pub fn msgpack_encoding() {
        let mut table = blocks();
        table.scopes[1].operators[1].keep_newline = true;
        let bytes = table.to_msgpack().unwrap();
        assert_eq!(GrammarTable::from_msgpack(&bytes).unwrap(), table);

        match GrammarTable::from_msgpack(&[0xc1]) {
            Err(GrammarErr::Msgpack(_)) => {},
            other => panic!("expected a decode error, got {:?}", other),
        }
    }
}
