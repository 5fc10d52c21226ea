use grammar::OpId;

use std::error;
use std::fmt;

/// Structural errors. `index` is a position in the sequence the failing stage
/// was reading: tokens for the matcher, flattened items for the resolver.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseErr {
    LeadingMismatch{index: usize, op: OpId},
    UnexpectedEnd{index: usize, op: OpId, separator: usize},
    NoProgress{index: usize, op: OpId},
    ValueExpected{index: usize},
    InvalidLeadingOperator{index: usize, op: OpId},
}
impl ParseErr {
    pub fn message(&self) -> String {
        match self {
            ParseErr::LeadingMismatch{op, ..} => format!("`{}` does not start here", op),
            ParseErr::UnexpectedEnd{op, separator, ..} =>
                format!("unexpected end of input while separator {} of `{}` was still required", separator, op),
            ParseErr::NoProgress{op, ..} => format!("`{}` matched without consuming input", op),
            ParseErr::ValueExpected{..} => format!("end of stream, value expected"),
            ParseErr::InvalidLeadingOperator{op, ..} => format!("`{}` needs a left operand", op),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ParseErr::LeadingMismatch{index, ..} |
            ParseErr::UnexpectedEnd{index, ..} |
            ParseErr::NoProgress{index, ..} |
            ParseErr::ValueExpected{index} |
            ParseErr::InvalidLeadingOperator{index, ..} => *index,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        match self {
            ParseErr::LeadingMismatch{..} => true,
            _ => false,
        }
    }
}
impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (at {})", self.message(), self.index())
    }
}
impl error::Error for ParseErr {}

#[derive(Clone, PartialEq, Debug)]
pub struct ParsingResult<T> {
    pub next: usize,
    pub value: T,
    pub errors: Vec<ParseErr>,
}
impl<T> ParsingResult<T> {
    pub fn new(next: usize, value: T, errors: Vec<ParseErr>) -> Self {
        ParsingResult{next, value, errors}
    }

    pub fn is_ok(&self) -> bool { self.errors.is_empty() }
}
