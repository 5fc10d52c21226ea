use std::error;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GrammarErr {
    NoSeparators,
    EmptyTokenSet,
    EmptyToken,
    ZeroMaximum,
    InvertedRepeats{min: usize, max: usize},
    LeadingNotOnce,
    LeadingScoped,
    InOperator{op: String, err: Box<GrammarErr>},
    DuplicatedOperator{scope: String, op: String},
    DuplicatedScope{name: String},
    UndefinedScope{name: String},
    Msgpack(String),
}
impl GrammarErr {
    pub fn message(&self) -> String {
        match self {
            GrammarErr::NoSeparators => format!("operator has no separators"),
            GrammarErr::EmptyTokenSet => format!("separator accepts no tokens"),
            GrammarErr::EmptyToken => format!("separator token must not be empty"),
            GrammarErr::ZeroMaximum => format!("separator can never repeat"),
            GrammarErr::InvertedRepeats{min, max} =>
                format!("repetition minimum {} exceeds maximum {}", min, max),
            GrammarErr::LeadingNotOnce => format!("leading separator must match exactly once"),
            GrammarErr::LeadingScoped => format!("leading separator cannot carry a scope"),
            GrammarErr::InOperator{op, err} => format!("in operator `{}`: {}", op, err.message()),
            GrammarErr::DuplicatedOperator{scope, op} =>
                format!("operator `{}` defined twice in scope `{}`", op, scope),
            GrammarErr::DuplicatedScope{name} => format!("scope `{}` defined twice", name),
            GrammarErr::UndefinedScope{name} => format!("undefined scope `{}`", name),
            GrammarErr::Msgpack(e) => format!("malformed grammar table: {}", e),
        }
    }
}
impl fmt::Display for GrammarErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
impl error::Error for GrammarErr {}
