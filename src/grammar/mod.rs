mod errors;
pub mod table;

pub use self::errors::GrammarErr;

use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

pub type OpId = String;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Bound {
    Finite(usize),
    Unbounded,
}
impl Bound {
    pub fn admits(&self, n: usize) -> bool { *self >= Bound::Finite(n) }
}
impl From<Option<usize>> for Bound {
    fn from(max: Option<usize>) -> Self {
        match max {
            Some(n) => Bound::Finite(n),
            None => Bound::Unbounded,
        }
    }
}
impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bound::Finite(n) => write!(f, "{}", n),
            Bound::Unbounded => write!(f, "∞"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Repeats {
    min: usize,
    max: Bound,
}
impl Repeats {
    pub fn new(min: usize, max: Bound) -> Result<Self, GrammarErr> {
        match max {
            Bound::Finite(0) => Err(GrammarErr::ZeroMaximum),
            Bound::Finite(m) if min > m => Err(GrammarErr::InvertedRepeats{min, max: m}),
            _ => Ok( Repeats{min, max} ),
        }
    }

    pub fn once() -> Self { Repeats{min: 1, max: Bound::Finite(1)} }
    pub fn optional() -> Self { Repeats{min: 0, max: Bound::Finite(1)} }
    pub fn many() -> Self { Repeats{min: 0, max: Bound::Unbounded} }
    pub fn many1() -> Self { Repeats{min: 1, max: Bound::Unbounded} }

    pub fn min(&self) -> usize { self.min }
    pub fn max(&self) -> Bound { self.max }

    pub fn contains(&self, n: usize) -> bool { n >= self.min && self.max.admits(n) }
    pub fn exhausted_by(&self, n: usize) -> bool { !self.max.admits(n + 1) }
}
impl fmt::Display for Repeats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

#[derive(Clone)]
pub struct ScopeGen(Rc<dyn Fn(&Scope) -> Scope>);
impl ScopeGen {
    pub fn new<F>(f: F) -> Self
        where F: Fn(&Scope) -> Scope + 'static
    {
        ScopeGen(Rc::new(f))
    }

    pub fn replace(scope: Scope) -> Self {
        ScopeGen::new(move |_| scope.clone())
    }

    pub fn extend(additions: Scope) -> Self {
        ScopeGen::new(move |enclosing| enclosing.merged(&additions))
    }

    pub fn without<I, S>(ids: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<OpId>
    {
        let ids: Vec<OpId> = ids.into_iter().map(|id| id.into()).collect();
        ScopeGen::new(move |enclosing| {
            let mut scope = enclosing.clone();
            for id in &ids { scope.remove(id); }
            scope
        })
    }

    pub fn apply(&self, enclosing: &Scope) -> Scope { (self.0)(enclosing) }
}
impl PartialEq for ScopeGen {
    fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}
impl fmt::Debug for ScopeGen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ScopeGen(..)")
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SeparatorDefinition {
    tokens: BTreeSet<String>,
    repeats: Repeats,
    scope: Option<ScopeGen>,
}
impl SeparatorDefinition {
    pub fn new<I, S>(tokens: I, repeats: Repeats) -> Result<Self, GrammarErr>
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let tokens: BTreeSet<String> = tokens.into_iter().map(|t| t.into()).collect();
        if tokens.is_empty() { Err(GrammarErr::EmptyTokenSet) }
        else if tokens.iter().any(|t| t.is_empty()) { Err(GrammarErr::EmptyToken) }
        else { Ok( SeparatorDefinition{tokens, repeats, scope: None} ) }
    }

    pub fn scoped(mut self, gen: ScopeGen) -> Self {
        self.scope = Some(gen);
        self
    }

    pub fn tokens(&self) -> &BTreeSet<String> { &self.tokens }
    pub fn accepts(&self, text: &str) -> bool { self.tokens.contains(text) }
    pub fn repeats(&self) -> Repeats { self.repeats }
    pub fn scope(&self) -> Option<&ScopeGen> { self.scope.as_ref() }
}
impl fmt::Display for SeparatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}; {})", self.tokens.iter().join("|"), self.repeats)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Precedence {
    pub left: Option<u32>,
    pub right: Option<u32>,
}
impl Precedence {
    pub fn new(left: Option<u32>, right: Option<u32>) -> Self { Precedence{left, right} }

    pub fn fixity(&self) -> Fixity {
        match (self.left, self.right) {
            (None, Some(right)) => Fixity::Prefix(right),
            (Some(left), None) => Fixity::Postfix(left),
            (Some(left), Some(right)) => Fixity::Infix(left, right),
            (None, None) => Fixity::Closed,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Fixity {
    Prefix(u32),
    Postfix(u32),
    Infix(u32, u32),
    Closed,
}

#[derive(Clone, PartialEq, Debug)]
pub struct OperatorDefinition {
    separators: Vec<SeparatorDefinition>,
    precedence: Precedence,
    keep_newline: bool,
}
impl OperatorDefinition {
    pub fn new<I, S>(leading: I, rest: Vec<SeparatorDefinition>, precedence: Precedence)
        -> Result<Self, GrammarErr>
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let mut separators = vec![ SeparatorDefinition::new(leading, Repeats::once())? ];
        separators.extend(rest);
        OperatorDefinition::from_separators(separators, precedence)
    }

    pub fn from_separators(separators: Vec<SeparatorDefinition>, precedence: Precedence)
        -> Result<Self, GrammarErr>
    {
        match separators.first() {
            None => Err(GrammarErr::NoSeparators),
            Some(lead) if lead.repeats != Repeats::once() => Err(GrammarErr::LeadingNotOnce),
            Some(lead) if lead.scope.is_some() => Err(GrammarErr::LeadingScoped),
            Some(_) => Ok( OperatorDefinition{separators, precedence, keep_newline: false} ),
        }
    }

    pub fn prefix(token: &str, right: u32) -> Result<Self, GrammarErr> {
        OperatorDefinition::new(Some(token), vec![], Precedence::new(None, Some(right)))
    }

    pub fn postfix(token: &str, left: u32) -> Result<Self, GrammarErr> {
        OperatorDefinition::new(Some(token), vec![], Precedence::new(Some(left), None))
    }

    pub fn infix(token: &str, left: u32, right: u32) -> Result<Self, GrammarErr> {
        OperatorDefinition::new(Some(token), vec![], Precedence::new(Some(left), Some(right)))
    }

    pub fn closed(open: &str, rest: Vec<SeparatorDefinition>) -> Result<Self, GrammarErr> {
        OperatorDefinition::new(Some(open), rest, Precedence::default())
    }

    pub fn keep_newline(mut self) -> Self {
        self.keep_newline = true;
        self
    }

    pub fn separators(&self) -> &[SeparatorDefinition] { &self.separators }
    pub fn leading(&self) -> &SeparatorDefinition { &self.separators[0] }
    pub fn precedence(&self) -> Precedence { self.precedence }
    pub fn fixity(&self) -> Fixity { self.precedence.fixity() }
    pub fn keeps_newline(&self) -> bool { self.keep_newline }
}
impl fmt::Display for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |p: Option<u32>| p.map(|p| p.to_string()).unwrap_or("-".into());
        write!(f, "{} <{}, {}>",
            self.separators.iter().join(" "), show(self.precedence.left), show(self.precedence.right))
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Scope {
    ops: Vec<(OpId, Rc<OperatorDefinition>)>,
}
impl Scope {
    pub fn new() -> Self { Scope{ops: Vec::new()} }

    pub fn insert<S: Into<OpId>>(&mut self, id: S, def: OperatorDefinition) -> Option<Rc<OperatorDefinition>> {
        self.insert_shared(id.into(), Rc::new(def))
    }

    pub fn with<S: Into<OpId>>(mut self, id: S, def: OperatorDefinition) -> Self {
        self.insert(id, def);
        self
    }

    fn insert_shared(&mut self, id: OpId, def: Rc<OperatorDefinition>) -> Option<Rc<OperatorDefinition>> {
        match self.ops.iter().position(|(k, _)| *k == id) {
            Some(i) => Some( ::std::mem::replace(&mut self.ops[i].1, def) ),
            None => {
                self.ops.push((id, def));
                None
            },
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rc<OperatorDefinition>> {
        self.ops.iter().find(|(k, _)| k == id).map(|(_, def)| def)
    }

    pub fn remove(&mut self, id: &str) -> Option<Rc<OperatorDefinition>> {
        let i = self.ops.iter().position(|(k, _)| k == id)?;
        Some( self.ops.remove(i).1 )
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a Rc<OperatorDefinition>)> + 'a {
        self.ops.iter().map(|(id, def)| (id.as_str(), def))
    }

    /// Same ids in the same order, bound to the very same definitions.
    pub fn shares(&self, other: &Scope) -> bool {
        self.ops.len() == other.ops.len()
            && self.ops.iter().zip(&other.ops).all(|((a, x), (b, y))| a == b && Rc::ptr_eq(x, y))
    }

    pub fn len(&self) -> usize { self.ops.len() }
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Definitions of `other` win; ids new to `self` are appended in `other`'s order.
    pub fn merged(&self, other: &Scope) -> Scope {
        let mut scope = self.clone();
        for (id, def) in &other.ops {
            scope.insert_shared(id.clone(), def.clone());
        }
        scope
    }
}
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, def) in &self.ops {
            writeln!(f, "{} = {}", id, def)?;
        }
        Ok(())
    }
}
