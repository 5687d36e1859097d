//! Filter parser
//!
//! A character-level state machine. Every transition lives in
//! [`Machine::step`]; each input character is classified once and fed in,
//! followed by a final `End`.
//!
//! ```text
//! ExpectKeyword ──select──▶ InSelectList ──where──▶ InWhereColumn
//!                                                     │  ▲
//!                                           col + cmp │  │ value done
//!                                                     ▼  │
//!                                         InWhereComparator ──▶ InWhereValue
//!                                                     │              │
//!                                                     └──── ' ──▶ InQuotedValue
//! ```

use crate::error::{HeapError, Result};

use super::{Comparator, Filter, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectKeyword,
    InSelectList,
    InWhereColumn,
    InWhereComparator,
    InWhereValue,
    InQuotedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Space(char),
    Comma,
    Quote,
    /// One of `= < > !`
    Cmp(char),
    Char(char),
    End,
}

impl Input {
    fn classify(c: char) -> Self {
        match c {
            c if c.is_whitespace() => Input::Space(c),
            ',' => Input::Comma,
            '\'' => Input::Quote,
            '=' | '<' | '>' | '!' => Input::Cmp(c),
            c => Input::Char(c),
        }
    }

    /// The raw character, for states that accumulate verbatim
    fn raw(self) -> Option<char> {
        match self {
            Input::Comma => Some(','),
            Input::Quote => Some('\''),
            Input::Space(c) | Input::Cmp(c) | Input::Char(c) => Some(c),
            Input::End => None,
        }
    }
}

struct Machine {
    state: State,
    word: String,
    selection: Vec<String>,
    predicates: Vec<Predicate>,
    column: Option<String>,
    comparator: Option<Comparator>,
    saw_where: bool,
}

/// Parse a filter string into a [`Filter`]
pub fn parse_filter(text: &str) -> Result<Filter> {
    let mut machine = Machine {
        state: State::ExpectKeyword,
        word: String::new(),
        selection: Vec::new(),
        predicates: Vec::new(),
        column: None,
        comparator: None,
        saw_where: false,
    };

    for c in text.chars() {
        machine.step(Input::classify(c))?;
    }
    machine.step(Input::End)?;
    machine.finish()
}

fn syntax(msg: impl Into<String>) -> HeapError {
    HeapError::Query(msg.into())
}

impl Machine {
    fn step(&mut self, input: Input) -> Result<()> {
        use Input::*;
        use State::*;

        match (self.state, input) {
            // -----------------------------------------------------------------
            // SELECT keyword
            // -----------------------------------------------------------------
            (ExpectKeyword, Char(c)) => self.word.push(c),
            (ExpectKeyword, Space(_)) if self.word.is_empty() => {}
            (ExpectKeyword, Space(_) | End) => {
                let word = self.take_word();
                if !word.eq_ignore_ascii_case("select") {
                    return Err(syntax(format!("expected SELECT, found '{}'", word)));
                }
                self.state = InSelectList;
            }
            (ExpectKeyword, _) => return Err(syntax("expected SELECT")),

            // -----------------------------------------------------------------
            // Selection list
            // -----------------------------------------------------------------
            (InSelectList, Char(c)) => self.word.push(c),
            (InSelectList, Space(_) | Comma | End) => {
                let word = self.take_word();
                if word.eq_ignore_ascii_case("where") {
                    self.saw_where = true;
                    self.state = InWhereColumn;
                } else if !word.is_empty() {
                    self.selection.push(word);
                }
            }
            (InSelectList, _) => return Err(syntax("unexpected character in select list")),

            // -----------------------------------------------------------------
            // WHERE column
            // -----------------------------------------------------------------
            (InWhereColumn, Char(c)) => self.word.push(c),
            (InWhereColumn, Space(_) | Comma) if self.word.is_empty() => {}
            (InWhereColumn, Space(_)) if self.word.eq_ignore_ascii_case("and") => self.word.clear(),
            (InWhereColumn, Space(_)) => {
                self.column = Some(self.take_word());
                self.state = InWhereComparator;
            }
            (InWhereColumn, Cmp(c)) if !self.word.is_empty() => {
                self.column = Some(self.take_word());
                self.word.push(c);
                self.state = InWhereComparator;
            }
            (InWhereColumn, End) if self.word.is_empty() => {}
            (InWhereColumn, End) => {
                return Err(syntax(format!("incomplete clause after '{}'", self.word)))
            }
            (InWhereColumn, _) => return Err(syntax("expected a column name in WHERE")),

            // -----------------------------------------------------------------
            // Comparator
            // -----------------------------------------------------------------
            (InWhereComparator, Cmp(c)) => self.word.push(c),
            (InWhereComparator, Space(_)) if self.word.is_empty() => {}
            (InWhereComparator, Space(_)) => {
                self.take_comparator()?;
                self.state = InWhereValue;
            }
            (InWhereComparator, Char(c)) => {
                self.take_comparator()?;
                self.word.push(c);
                self.state = InWhereValue;
            }
            (InWhereComparator, Quote) => {
                self.take_comparator()?;
                self.state = InQuotedValue;
            }
            (InWhereComparator, _) => {
                return Err(syntax(format!(
                    "missing comparator or value for column '{}'",
                    self.column.as_deref().unwrap_or_default()
                )))
            }

            // -----------------------------------------------------------------
            // Unquoted value
            // -----------------------------------------------------------------
            (InWhereValue, Char(c) | Cmp(c)) => self.word.push(c),
            (InWhereValue, Quote) if self.word.is_empty() => self.state = InQuotedValue,
            (InWhereValue, Space(_)) if self.word.is_empty() => {}
            (InWhereValue, Space(_) | Comma | End) if !self.word.is_empty() => {
                let literal = self.take_word();
                self.finish_clause(literal)?;
                self.state = InWhereColumn;
            }
            (InWhereValue, _) => return Err(syntax("expected a value")),

            // -----------------------------------------------------------------
            // Quoted value
            // -----------------------------------------------------------------
            (InQuotedValue, Quote) => {
                let literal = self.take_word();
                self.finish_clause(literal)?;
                self.state = InWhereColumn;
            }
            (InQuotedValue, End) => return Err(syntax("unterminated quoted value")),
            (InQuotedValue, other) => {
                if let Some(c) = other.raw() {
                    self.word.push(c);
                }
            }
        }
        Ok(())
    }

    fn take_word(&mut self) -> String {
        std::mem::take(&mut self.word)
    }

    fn take_comparator(&mut self) -> Result<()> {
        let text = self.take_word();
        let comparator = Comparator::parse(&text)
            .ok_or_else(|| syntax(format!("unknown comparator '{}'", text)))?;
        self.comparator = Some(comparator);
        Ok(())
    }

    fn finish_clause(&mut self, literal: String) -> Result<()> {
        match (self.column.take(), self.comparator.take()) {
            (Some(column), Some(comparator)) => {
                self.predicates.push(Predicate {
                    column,
                    comparator,
                    literal,
                });
                Ok(())
            }
            _ => Err(syntax("incomplete WHERE clause")),
        }
    }

    fn finish(self) -> Result<Filter> {
        if self.selection.is_empty() {
            return Err(syntax("SELECT needs a column list or *"));
        }
        if self.saw_where && self.predicates.is_empty() {
            return Err(syntax("WHERE needs at least one clause"));
        }

        let star = self.selection.iter().any(|s| s == "*");
        let selection = match (star, self.selection.len()) {
            (true, 1) => Vec::new(),
            (true, _) => return Err(syntax("'*' cannot be combined with other columns")),
            (false, _) => self.selection,
        };

        Ok(Filter {
            selection,
            predicates: self.predicates,
        })
    }
}
