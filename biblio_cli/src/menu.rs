//! Interactive menu session.
//!
//! The session owns the catalog for its whole lifetime. Changes stay in
//! memory until the operator picks "Save".

use biblio_core::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const SEPARATOR: &str = "====================";

/// Ask for text until the operator types something non-empty
///
/// End of input is reported as `UnexpectedEof` so the caller can end the
/// session.
pub fn prompt_non_empty<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<String> {
    loop {
        write!(output, "{}", message)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }

        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        writeln!(output, "This field cannot be empty!")?;
    }
}

/// Ask a yes/no question; anything but yes counts as no
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<bool> {
    let answer = prompt_non_empty(input, output, message)?;
    Ok(matches!(
        answer.to_lowercase().as_str(),
        "y" | "yes" | "si" | "sì"
    ))
}

fn is_end_of_input(err: &Error) -> bool {
    matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

enum Flow {
    Continue,
    Exit,
}

pub struct Session<R, W> {
    catalog: Catalog,
    path: PathBuf,
    years: YearBounds,
    input: R,
    output: W,
    unsaved: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(catalog: Catalog, path: PathBuf, years: YearBounds, input: R, output: W) -> Self {
        Self {
            catalog,
            path,
            years,
            input,
            output,
            unsaved: false,
        }
    }

    #[cfg(test)]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run the menu until the operator exits or input ends
    ///
    /// Failures of individual actions are reported and the loop carries on;
    /// only failing to write to the terminal ends the session with an error.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{}", SEPARATOR)?;
        writeln!(self.output, "Library catalog: {}", self.path.display())?;

        loop {
            self.print_menu()?;
            let choice = match prompt_non_empty(&mut self.input, &mut self.output, "Choice: ") {
                Ok(choice) => choice,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            };

            match self.dispatch(&choice) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => {
                    tracing::debug!("Menu action {} failed: {:?}", choice, e);
                    writeln!(self.output, "Error: {}", e)?;
                    if e.is_storage() {
                        writeln!(self.output, "Changes are still in memory; try saving again.")?;
                    }
                }
            }
        }

        self.warn_unsaved()?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "{}", SEPARATOR)?;
        writeln!(self.output, "MENU")?;
        writeln!(
            self.output,
            "1. List all books, 2. Add book, 3. Delete book, 4. Search by author"
        )?;
        writeln!(
            self.output,
            "5. List available books, 6. Record loan, 7. Record return, 8. Save, 9. Exit"
        )?;
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        if !matches!(choice, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9") {
            writeln!(self.output, "Invalid choice! Enter a number from 1 to 9")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.output, "{}", SEPARATOR)?;
        match choice {
            "1" => self.list_all()?,
            "2" => self.add_book()?,
            "3" => self.delete_book()?,
            "4" => self.search_by_author()?,
            "5" => self.list_available()?,
            "6" => self.record_loan()?,
            "7" => self.record_return()?,
            "8" => self.save()?,
            _ => {
                self.warn_unsaved()?;
                writeln!(self.output, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn warn_unsaved(&mut self) -> Result<()> {
        if self.unsaved {
            writeln!(self.output, "Unsaved changes were discarded.")?;
        }
        Ok(())
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        prompt_non_empty(&mut self.input, &mut self.output, message)
    }

    fn list_all(&mut self) -> Result<()> {
        let stats = self.catalog.stats().clone();
        writeln!(
            self.output,
            "{} books, {} available, {} on loan",
            stats.total,
            stats.available,
            stats.on_loan()
        )?;
        let entries = self.catalog.books();
        if entries.is_empty() {
            writeln!(self.output, "The catalog is empty.")?;
        }
        for entry in entries {
            writeln!(
                self.output,
                "  {} - {} [{}]",
                entry, entry.book.author, entry.book.genre
            )?;
        }
        Ok(())
    }

    fn add_book(&mut self) -> Result<()> {
        if !self.catalog.genres().is_empty() {
            let known = self.catalog.genres().join(", ");
            writeln!(self.output, "Known genres: {}", known)?;
        }
        let genre = self.prompt("Genre: ")?;
        let title = self.prompt("Title: ")?;
        if self.catalog.contains_title(&title, &genre) {
            return Err(Error::DuplicateBook { title, genre });
        }
        let author = self.prompt("Author: ")?;
        let year = loop {
            let raw = self.prompt("Publication year: ")?;
            match self.years.parse(&raw) {
                Ok(year) => break year,
                Err(_) => writeln!(
                    self.output,
                    "Invalid year, it must be between {} and {}",
                    self.years.min, self.years.max
                )?,
            }
        };

        let id = self.catalog.add_book(
            NewBook {
                genre,
                title,
                author,
                year,
            },
            &self.years,
        )?;
        self.unsaved = true;

        if let Some(book) = self.catalog.get(id) {
            writeln!(
                self.output,
                "Book added: '{}' by {} (ID {})",
                book.title, book.author, id
            )?;
        }
        Ok(())
    }

    fn delete_book(&mut self) -> Result<()> {
        let id = self.prompt("Book ID: ")?;
        let title = self.catalog.find(&id)?.book.title.clone();

        let question = format!("Delete '{}'? (yes/no): ", title);
        if confirm(&mut self.input, &mut self.output, &question)? {
            self.catalog.remove_book(&id)?;
            self.unsaved = true;
            writeln!(self.output, "Book deleted from the catalog")?;
        } else {
            writeln!(self.output, "Deletion cancelled")?;
        }
        Ok(())
    }

    fn search_by_author(&mut self) -> Result<()> {
        let author = self.prompt("Author: ")?;
        let found = self.catalog.search_by_author(&author);
        if found.is_empty() {
            writeln!(self.output, "No books found for: {}", author)?;
            return Ok(());
        }
        writeln!(self.output, "Books by {}:", author)?;
        for entry in found {
            writeln!(self.output, "  {}", entry)?;
        }
        Ok(())
    }

    fn list_available(&mut self) -> Result<()> {
        let available = self.catalog.available_books();
        if available.is_empty() {
            writeln!(self.output, "No books are available.")?;
            return Ok(());
        }
        writeln!(self.output, "Available books:")?;
        for entry in available {
            writeln!(self.output, "  {}", entry)?;
        }
        Ok(())
    }

    fn record_loan(&mut self) -> Result<()> {
        let id = self.prompt("Book ID: ")?;
        if !self.catalog.find(&id)?.book.available {
            writeln!(self.output, "The book is not available")?;
            return Ok(());
        }

        let borrower = self.prompt("Borrower name: ")?;
        match self.catalog.lend(&id, &borrower)? {
            LoanOutcome::Recorded(event) => {
                self.unsaved = true;
                writeln!(self.output, "Loan recorded! ({})", event.date)?;
            }
            LoanOutcome::AlreadyOnLoan => writeln!(self.output, "The book is not available")?,
        }
        Ok(())
    }

    fn record_return(&mut self) -> Result<()> {
        let id = self.prompt("Book ID: ")?;
        match self.catalog.return_book(&id)? {
            ReturnOutcome::Returned => {
                self.unsaved = true;
                writeln!(self.output, "Return recorded!")?;
            }
            ReturnOutcome::AlreadyAvailable => {
                writeln!(self.output, "The book is already available")?
            }
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.catalog.save(&self.path)?;
        self.unsaved = false;
        writeln!(self.output, "Data saved to {}", self.path.display())?;
        Ok(())
    }
}
