//! Core domain types for the library catalog.
//!
//! This module defines the records kept in the catalog file:
//! - Books and their loan history
//! - Aggregate statistics
//! - The catalog itself (books, known genres, statistics)
//!
//! Field names on the wire are the Italian keys of the catalog file format
//! (`libri`, `titolo`, `prestiti`, ...); the Rust names are English.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

// ============================================================================
// Identifiers and bounds
// ============================================================================

/// Numeric book identifier, written as a decimal string in the catalog file
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl BookId {
    /// The identifier handed out when the catalog is empty
    pub const FIRST: BookId = BookId(1);

    /// The identifier after this one, or `IdsExhausted` at `u64::MAX`
    pub fn next(self) -> crate::Result<BookId> {
        self.0
            .checked_add(1)
            .map(BookId)
            .ok_or(crate::Error::IdsExhausted)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(BookId)
            .map_err(|_| crate::Error::BookNotFound(s.trim().to_string()))
    }
}

/// Inclusive range of accepted publication years
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearBounds {
    pub min: u16,
    pub max: u16,
}

impl Default for YearBounds {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 2025,
        }
    }
}

impl YearBounds {
    pub fn contains(&self, year: u16) -> bool {
        self.range().contains(&year)
    }

    pub fn range(&self) -> RangeInclusive<u16> {
        self.min..=self.max
    }

    /// Parse operator text into a year inside the bounds
    pub fn parse(&self, input: &str) -> crate::Result<u16> {
        let out_of_range = || {
            crate::Error::InvalidInput(format!(
                "year must be between {} and {}",
                self.min, self.max
            ))
        };
        let year = input.trim().parse::<u16>().map_err(|_| out_of_range())?;
        if self.contains(year) {
            Ok(year)
        } else {
            Err(out_of_range())
        }
    }
}

// ============================================================================
// Books and loans
// ============================================================================

/// A single borrowing occurrence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoanEvent {
    #[serde(rename = "nome")]
    pub borrower: String,
    #[serde(rename = "data_prestito")]
    pub date: NaiveDate,
}

/// A book record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    #[serde(rename = "titolo")]
    pub title: String,
    #[serde(rename = "autore")]
    pub author: String,
    #[serde(rename = "anno", with = "year_as_string")]
    pub year: u16,
    #[serde(rename = "genere")]
    pub genre: String,
    #[serde(rename = "disponibile")]
    pub available: bool,
    #[serde(rename = "prestiti", default)]
    pub loans: Vec<LoanEvent>,
}

impl Book {
    pub fn status(&self) -> Availability {
        if self.available {
            Availability::Available
        } else {
            Availability::OnLoan
        }
    }

    /// Most recent loan event, if the book was ever lent
    pub fn last_loan(&self) -> Option<&LoanEvent> {
        self.loans.last()
    }
}

/// Per-book loan state. `Available` is the initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    OnLoan,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => f.write_str("Available"),
            Availability::OnLoan => f.write_str("On loan"),
        }
    }
}

/// Fields supplied by the operator when adding a book
#[derive(Clone, Debug)]
pub struct NewBook {
    pub genre: String,
    pub title: String,
    pub author: String,
    pub year: u16,
}

// ============================================================================
// Catalog
// ============================================================================

/// Denormalized counters kept alongside the books
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    #[serde(rename = "totale_libri")]
    pub total: usize,
    #[serde(rename = "libri_disponibili")]
    pub available: usize,
}

impl Statistics {
    pub fn on_loan(&self) -> usize {
        self.total.saturating_sub(self.available)
    }
}

/// The whole catalog: books keyed by ID, known genres, and statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(rename = "libri", default)]
    pub(crate) books: BTreeMap<BookId, Book>,
    #[serde(rename = "generi", default)]
    pub(crate) genres: Vec<String>,
    #[serde(rename = "statistiche", default)]
    pub(crate) stats: Statistics,
}

/// A book paired with its ID, as returned by listings and searches
#[derive(Clone, Copy, Debug)]
pub struct BookEntry<'a> {
    pub id: BookId,
    pub book: &'a Book,
}

impl BookEntry<'_> {
    pub fn status(&self) -> Availability {
        self.book.status()
    }
}

impl fmt::Display for BookEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID {}: {} ({}) - {}",
            self.id,
            self.book.title,
            self.book.year,
            self.status()
        )
    }
}

/// Publication years are stored as digit strings (`"1965"`)
mod year_as_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(year: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(year)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<u16>()
            .map_err(|_| de::Error::custom(format!("invalid year '{}'", raw)))
    }
}
