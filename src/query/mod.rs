//! Query Module
//!
//! Filter strings over a single table:
//!
//! ```text
//! SELECT <col>[, <col>]* | *  [WHERE <col> <cmp> <val> [(, | AND) <col> <cmp> <val>]*]
//! ```
//!
//! `<cmp>` is one of `=  !=  <  <=  >  >=`. Keywords are case-insensitive,
//! values may be single-quoted to keep spaces. Clauses are conjoined.
//!
//! ## Responsibilities
//! - `parser`: filter string → [`Filter`]
//! - `executor`: [`Filter`] × table → [`Cursor`]
//! - `cursor`: sequential, read-only view over the result rows

mod cursor;
mod executor;
mod parser;

pub use cursor::Cursor;
pub use executor::execute;
pub use parser::parse_filter;

use std::fmt;

/// Comparison operator of a WHERE clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub fn parse(text: &str) -> Option<Self> {
        let cmp = match text {
            "=" => Comparator::Eq,
            "!=" => Comparator::Ne,
            "<" => Comparator::Lt,
            "<=" => Comparator::Le,
            ">" => Comparator::Gt,
            ">=" => Comparator::Ge,
            _ => return None,
        };
        Some(cmp)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        };
        f.write_str(text)
    }
}

/// One `<column> <comparator> <literal>` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub comparator: Comparator,
    pub literal: String,
}

/// Parsed filter: projection plus conjoined predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Selected columns in order; empty means every catalog column
    pub selection: Vec<String>,
    pub predicates: Vec<Predicate>,
}

impl Filter {
    /// `SELECT *` with no predicates
    pub fn all() -> Self {
        Self::default()
    }
}
