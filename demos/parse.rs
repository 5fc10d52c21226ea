extern crate mixfix;
extern crate env_logger;
extern crate num;

use mixfix::grammar::*;
use mixfix::syntax::{self, Operand, SyntaxTree};
use num::BigUint;
use std::env;
use std::fs::File;
use std::io::prelude::*;

fn scope() -> Scope {
    let group = OperatorDefinition::closed("(", vec![
        SeparatorDefinition::new(vec![","], Repeats::many()).unwrap(),
        SeparatorDefinition::new(vec![")"], Repeats::once()).unwrap(),
    ]).unwrap();
    let cond = OperatorDefinition::new(
        vec!["if"],
        vec![
            SeparatorDefinition::new(vec!["then"], Repeats::once()).unwrap(),
            SeparatorDefinition::new(vec!["else"], Repeats::optional()).unwrap(),
        ],
        Precedence::new(None, Some(1)),
    ).unwrap();

    let block = OperatorDefinition::closed("do", vec![
        SeparatorDefinition::new(vec![";"], Repeats::many1()).unwrap(),
        SeparatorDefinition::new(vec!["end"], Repeats::once()).unwrap(),
    ]).unwrap();

    Scope::new()
        .with("group", group)
        .with("block", block)
        .with("if", cond)
        .with("let", OperatorDefinition::infix("=", 2, 1).unwrap().keep_newline())
        .with("plus", OperatorDefinition::infix("+", 10, 11).unwrap())
        .with("minus", OperatorDefinition::infix("-", 10, 11).unwrap())
        .with("times", OperatorDefinition::infix("*", 20, 21).unwrap())
        .with("neg", OperatorDefinition::prefix("~", 30).unwrap())
        .with("fact", OperatorDefinition::postfix("!", 40).unwrap())
}

// Natural-number arithmetic over the sample grammar.
fn eval(tree: &SyntaxTree) -> Option<BigUint> {
    match tree.item {
        Operand::Token(ref t) => t.to_nat(),
        Operand::Operator(ref inst) => match (inst.op.as_str(), &tree.lhs, &tree.rhs) {
            ("plus", Some(l), Some(r)) => Some(eval(l)? + eval(r)?),
            ("times", Some(l), Some(r)) => Some(eval(l)? * eval(r)?),
            ("group", None, None) => {
                let inner = inst.separator(2).next()?.resolve_operands();
                if inner.value.len() == 1 && inst.count(1) == 0 { eval(&inner.value[0]) }
                else { None }
            },
            _ => None,
        },
    }
}

fn main(){
    env_logger::init();

    let path = env::args().nth(1).unwrap_or("test.mx".into());
    let mut source = String::new();
    File::open(&path).unwrap().read_to_string(&mut source).unwrap();
    let source = source;

    let scope = scope();
    print!("{}", scope);

    match syntax::lex(&source) {
        Ok(lexed) => {
            for (i, token) in lexed.iter().enumerate().filter(|(_, t)| !t.is_blank()) {
                println!("{}: {:?} {:?}", i, token.kind, token.text);
            }

            let result = syntax::parse(&lexed, &scope);
            for tree in &result.value {
                match eval(tree) {
                    Some(n) => println!("{} = {}", tree, n),
                    None => println!("{}", tree),
                }
            }
            for e in &result.errors {
                println!("error: {}", e);
            }
        },
        Err(e) => println!("{}", e),
    }
}
