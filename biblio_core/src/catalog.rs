//! Catalog store operations.
//!
//! Every mutation keeps the denormalized statistics in step with the book
//! records, so that `available + on_loan == total` holds after each call.

use crate::types::*;
use crate::{Error, Result};
use chrono::{Local, NaiveDate};

/// Result of asking to lend a book
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoanOutcome {
    /// The book was available and is now on loan
    Recorded(LoanEvent),
    /// The book was already on loan; nothing changed
    AlreadyOnLoan,
}

/// Result of asking to return a book
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// The book was on loan and is available again
    Returned,
    /// The book was already available; nothing changed
    AlreadyAvailable,
}

fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Known genres, in the order they were first seen
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        let genre = genre.trim().to_lowercase();
        self.genres.iter().any(|g| g.to_lowercase() == genre)
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    /// Look up operator-supplied ID text
    pub fn find(&self, id: &str) -> Result<BookEntry<'_>> {
        let id = self.resolve(id)?;
        Ok(BookEntry {
            id,
            book: &self.books[&id],
        })
    }

    fn resolve(&self, id: &str) -> Result<BookId> {
        let parsed: BookId = id.parse()?;
        if self.books.contains_key(&parsed) {
            Ok(parsed)
        } else {
            Err(Error::BookNotFound(id.trim().to_string()))
        }
    }

    /// ID the next added book will receive: highest existing ID plus one
    pub fn next_id(&self) -> Result<BookId> {
        match self.books.keys().next_back() {
            Some(last) => last.next(),
            None => Ok(BookId::FIRST),
        }
    }

    /// All books in ascending ID order
    pub fn books(&self) -> Vec<BookEntry<'_>> {
        self.books
            .iter()
            .map(|(id, book)| BookEntry { id: *id, book })
            .collect()
    }

    /// Books currently on the shelf
    pub fn available_books(&self) -> Vec<BookEntry<'_>> {
        self.books
            .iter()
            .filter(|(_, book)| book.available)
            .map(|(id, book)| BookEntry { id: *id, book })
            .collect()
    }

    /// Books whose author contains `query`, ignoring case
    pub fn search_by_author(&self, query: &str) -> Vec<BookEntry<'_>> {
        let needle = query.trim().to_lowercase();
        self.books
            .iter()
            .filter(|(_, book)| book.author.to_lowercase().contains(&needle))
            .map(|(id, book)| BookEntry { id: *id, book })
            .collect()
    }

    /// True if a book with this title exists in this genre, ignoring case
    pub fn contains_title(&self, title: &str, genre: &str) -> bool {
        let title = title.trim().to_lowercase();
        let genre = genre.trim().to_lowercase();
        self.books
            .values()
            .any(|book| book.title.to_lowercase() == title && book.genre.to_lowercase() == genre)
    }

    /// Add a new book and return its ID
    ///
    /// Fails with `DuplicateBook` when a book with the same title and genre
    /// (ignoring case) is already catalogued; the catalog is left untouched.
    pub fn add_book(&mut self, new: NewBook, years: &YearBounds) -> Result<BookId> {
        let genre = require_text("genre", &new.genre)?;
        let title = require_text("title", &new.title)?;
        let author = require_text("author", &new.author)?;
        if !years.contains(new.year) {
            return Err(Error::InvalidInput(format!(
                "year must be between {} and {}",
                years.min, years.max
            )));
        }

        if self.contains_title(&title, &genre) {
            return Err(Error::DuplicateBook { title, genre });
        }

        let id = self.next_id()?;

        if !self.has_genre(&genre) {
            tracing::debug!("New genre '{}'", genre);
            self.genres.push(genre.clone());
        }

        self.books.insert(
            id,
            Book {
                title,
                author,
                year: new.year,
                genre,
                available: true,
                loans: Vec::new(),
            },
        );
        self.stats.total += 1;
        self.stats.available += 1;

        tracing::debug!("Added book {}", id);
        Ok(id)
    }

    /// Remove a book, returning its record
    ///
    /// Callers are expected to have confirmed the deletion with the operator.
    pub fn remove_book(&mut self, id: &str) -> Result<Book> {
        let id = self.resolve(id)?;
        let book = self
            .books
            .remove(&id)
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

        if book.available {
            self.stats.available = self.stats.available.saturating_sub(1);
        }
        self.stats.total = self.stats.total.saturating_sub(1);

        tracing::debug!("Removed book {}", id);
        Ok(book)
    }

    /// Lend a book to `borrower`, dated today
    pub fn lend(&mut self, id: &str, borrower: &str) -> Result<LoanOutcome> {
        self.lend_on(id, borrower, Local::now().date_naive())
    }

    /// Lend a book to `borrower` on a given date
    pub fn lend_on(&mut self, id: &str, borrower: &str, date: NaiveDate) -> Result<LoanOutcome> {
        let id = self.resolve(id)?;
        let book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

        if !book.available {
            tracing::debug!("Book {} already on loan", id);
            return Ok(LoanOutcome::AlreadyOnLoan);
        }

        let event = LoanEvent {
            borrower: require_text("borrower", borrower)?,
            date,
        };
        book.available = false;
        book.loans.push(event.clone());
        self.stats.available = self.stats.available.saturating_sub(1);

        tracing::debug!("Book {} lent to {} on {}", id, event.borrower, event.date);
        Ok(LoanOutcome::Recorded(event))
    }

    /// Mark a lent book as back on the shelf
    pub fn return_book(&mut self, id: &str) -> Result<ReturnOutcome> {
        let id = self.resolve(id)?;
        let book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

        if book.available {
            tracing::debug!("Book {} already available", id);
            return Ok(ReturnOutcome::AlreadyAvailable);
        }

        book.available = true;
        self.stats.available += 1;

        tracing::debug!("Book {} returned", id);
        Ok(ReturnOutcome::Returned)
    }

    /// Loan events of one book, oldest first
    pub fn loan_history(&self, id: &str) -> Result<&[LoanEvent]> {
        let id = self.resolve(id)?;
        Ok(&self.books[&id].loans)
    }

    /// Check the catalog for consistency
    ///
    /// Returns a list of problems, or empty Vec if consistent.
    pub fn validate(&self, years: &YearBounds) -> Vec<String> {
        let mut errors = Vec::new();

        let available = self.books.values().filter(|b| b.available).count();
        if self.stats.total != self.books.len() {
            errors.push(format!(
                "Statistics report {} books but catalog holds {}",
                self.stats.total,
                self.books.len()
            ));
        }
        if self.stats.available != available {
            errors.push(format!(
                "Statistics report {} available books but {} are available",
                self.stats.available, available
            ));
        }

        let mut seen = std::collections::HashMap::new();
        for (id, book) in &self.books {
            if book.title.trim().is_empty() {
                errors.push(format!("Book {} has an empty title", id));
            }
            if book.author.trim().is_empty() {
                errors.push(format!("Book {} has an empty author", id));
            }
            if !years.contains(book.year) {
                errors.push(format!(
                    "Book {} has year {} outside {}-{}",
                    id, book.year, years.min, years.max
                ));
            }
            if !self.has_genre(&book.genre) {
                errors.push(format!(
                    "Book {} has genre '{}' missing from the genre list",
                    id, book.genre
                ));
            }
            let key = (book.title.to_lowercase(), book.genre.to_lowercase());
            if let Some(other) = seen.insert(key, *id) {
                errors.push(format!(
                    "Books {} and {} share title '{}' in genre '{}'",
                    other, id, book.title, book.genre
                ));
            }
        }

        errors
    }
}
