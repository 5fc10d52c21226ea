use grammar::{OpId, OperatorDefinition, Precedence};
use syntax::{Loc, loc_range};
use syntax::errors::ParsingResult;
use syntax::lexer::Token;
use syntax::pratt;

use itertools::Itertools;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    Token(Token),
    Operator(OperatorInstance),
}
impl Operand {
    pub fn is_blank(&self) -> bool {
        match self {
            Operand::Token(t) => t.is_blank(),
            Operand::Operator(_) => false,
        }
    }

    pub fn loc(&self) -> Loc {
        match self {
            Operand::Token(t) => t.loc,
            Operand::Operator(inst) => inst.loc(),
        }
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Operand::Token(t) => out.push(t),
            Operand::Operator(inst) => inst.collect_tokens(out),
        }
    }
}
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Token(t) => write!(f, "{}", t),
            Operand::Operator(inst) => write!(f, "{}", inst),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SeparatorInstance {
    pub index: usize,
    pub token: Token,
    pub operands: Vec<Operand>,
}
impl SeparatorInstance {
    pub fn resolve_operands(&self) -> ParsingResult<Vec<SyntaxTree>> {
        pratt::resolve_all(&self.operands)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct OperatorInstance {
    pub op: OpId,
    pub def: Rc<OperatorDefinition>,
    pub leading: Token,
    pub children: Vec<SeparatorInstance>,
}
impl OperatorInstance {
    pub fn precedence(&self) -> Precedence { self.def.precedence() }

    pub fn count(&self, index: usize) -> usize {
        self.children.iter().filter(|c| c.index == index).count()
    }

    pub fn separator<'a>(&'a self, index: usize) -> impl Iterator<Item = &'a SeparatorInstance> + 'a {
        self.children.iter().filter(move |c| c.index == index)
    }

    pub fn loc(&self) -> Loc {
        match self.children.last() {
            Some(last) => loc_range(self.leading.loc, last.token.loc),
            None => self.leading.loc,
        }
    }

    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for child in &self.children {
            for operand in &child.operands { operand.collect_tokens(out); }
            out.push(&child.token);
        }
    }

    fn is_bare(&self) -> bool {
        self.children.len() == 1 && self.children[0].operands.is_empty()
    }
}
impl fmt::Display for OperatorInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_bare() {
            return write!(f, "{}", self.leading);
        }
        let parts = self.children.iter()
            .flat_map( |child| child.operands.iter()
                .filter(|o| !o.is_blank())
                .map(|o| o.to_string())
                .chain(Some(child.token.to_string())) );
        write!(f, "[{}]", parts.format(" "))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SyntaxTree {
    pub item: Operand,
    pub lhs: Option<Box<SyntaxTree>>,
    pub rhs: Option<Box<SyntaxTree>>,
}
impl SyntaxTree {
    pub fn leaf(item: Operand) -> Self {
        SyntaxTree{item, lhs: None, rhs: None}
    }

    pub fn missing(at: usize) -> Self {
        SyntaxTree::leaf(Operand::Token(Token::placeholder(at)))
    }

    pub fn prefix(item: Operand, rhs: SyntaxTree) -> Self {
        SyntaxTree{item, lhs: None, rhs: Some(Box::new(rhs))}
    }

    pub fn postfix(item: Operand, lhs: SyntaxTree) -> Self {
        SyntaxTree{item, lhs: Some(Box::new(lhs)), rhs: None}
    }

    pub fn infix(item: Operand, lhs: SyntaxTree, rhs: SyntaxTree) -> Self {
        SyntaxTree{item, lhs: Some(Box::new(lhs)), rhs: Some(Box::new(rhs))}
    }

    pub fn is_leaf(&self) -> bool { self.lhs.is_none() && self.rhs.is_none() }

    pub fn has_placeholder(&self) -> bool {
        let here = match self.item {
            Operand::Token(ref t) => t.is_synthetic(),
            Operand::Operator(_) => false,
        };
        here
            || self.lhs.as_ref().map_or(false, |t| t.has_placeholder())
            || self.rhs.as_ref().map_or(false, |t| t.has_placeholder())
    }

    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        if let Some(ref lhs) = self.lhs { lhs.collect_tokens(out); }
        self.item.collect_tokens(out);
        if let Some(ref rhs) = self.rhs { rhs.collect_tokens(out); }
    }
}
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.lhs, &self.rhs) {
            (None, None) => write!(f, "{}", self.item),
            (None, Some(rhs)) => write!(f, "({} {})", self.item, rhs),
            (Some(lhs), None) => write!(f, "({} {})", self.item, lhs),
            (Some(lhs), Some(rhs)) => write!(f, "({} {} {})", self.item, lhs, rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::*;
    use syntax::lexer::TokenKind;

    fn tok(kind: TokenKind, text: &str, start: usize) -> Token {
        Token::new(kind, text, Loc{start, end: start + text.len()})
    }

    fn call() -> OperatorInstance {
        let def = OperatorDefinition::closed("(", vec![
            SeparatorDefinition::new(vec![","], Repeats::many()).unwrap(),
            SeparatorDefinition::new(vec![")"], Repeats::once()).unwrap(),
        ]).unwrap();
        let open = tok(TokenKind::Symbol, "(", 0);
        OperatorInstance {
            op: "call".into(),
            def: Rc::new(def),
            leading: open.clone(),
            children: vec![
                SeparatorInstance{index: 0, token: open, operands: vec![]},
                SeparatorInstance{index: 1, token: tok(TokenKind::Symbol, ",", 2), operands: vec![
                    Operand::Token(tok(TokenKind::Ident, "a", 1)),
                ]},
                SeparatorInstance{index: 2, token: tok(TokenKind::Symbol, ")", 4), operands: vec![
                    Operand::Token(tok(TokenKind::Whitespace, " ", 3)),
                ]},
            ],
        }
    }

    #[test]
    pub fn instance_tokens_in_source_order() {
        let inst = call();
        let texts: Vec<_> = inst.tokens().into_iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["(", "a", ",", " ", ")"]);
        assert_eq!(inst.loc(), Loc{start: 0, end: 5});
        assert_eq!(inst.count(1), 1);
        assert_eq!(inst.separator(2).count(), 1);
        assert_eq!(inst.to_string(), "[( a , )]");
    }

    #[test]
    pub fn tree_shapes_render_as_sexprs() {
        let one = SyntaxTree::leaf(Operand::Token(tok(TokenKind::Number, "1", 0)));
        let neg = SyntaxTree::prefix(Operand::Token(tok(TokenKind::Symbol, "-", 0)), one.clone());
        assert_eq!(neg.to_string(), "(- 1)");
        assert!(!neg.is_leaf());

        let sum = SyntaxTree::infix(Operand::Token(tok(TokenKind::Symbol, "+", 0)), neg, SyntaxTree::missing(3));
        assert_eq!(sum.to_string(), "(+ (- 1) _)");
        assert!(sum.has_placeholder());

        let texts: Vec<_> = sum.tokens().into_iter().map(|t| t.to_string()).collect();
        assert_eq!(texts, vec!["-", "1", "+", "_"]);
    }
}
