//! Result cursor

use crate::catalog::Catalog;

/// Sequential, read-only view over a materialized row set
#[derive(Debug)]
pub struct Cursor {
    catalog: Catalog,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl Cursor {
    pub fn new(catalog: Catalog, rows: Vec<Vec<String>>) -> Self {
        Self {
            catalog,
            rows: rows.into_iter(),
        }
    }

    /// Columns of every row this cursor yields
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rows not yet consumed
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }
}

impl Iterator for Cursor {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}
