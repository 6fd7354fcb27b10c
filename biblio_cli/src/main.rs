mod menu;

use biblio_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "biblio")]
#[command(about = "Library catalog manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override catalog file
    #[arg(long, short, global = true)]
    file: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Create an empty catalog file
    Init {
        /// Replace an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// List every book
    List,

    /// Add a book
    Add {
        #[arg(long)]
        genre: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// Publication year
        #[arg(long)]
        year: String,
    },

    /// Delete a book
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Search books by author (case-insensitive substring)
    Search { author: String },

    /// List books that are not on loan
    Available,

    /// Record a loan
    Lend { id: String, borrower: String },

    /// Record a return
    Return { id: String },

    /// Show the loan history of a book
    History { id: String },

    /// List known genres
    Genres,

    /// Show catalog statistics
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    biblio_core::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Exiting on error: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let path = cli
        .file
        .unwrap_or_else(|| config.storage.catalog_file.clone());
    let years = config.books.year_bounds();

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&path, force),
        Some(Commands::Menu) | None => cmd_menu(path, years),
        Some(Commands::List) => cmd_list(&path, &years),
        Some(Commands::Add {
            genre,
            title,
            author,
            year,
        }) => cmd_add(
            &path,
            &years,
            NewBook {
                genre,
                title,
                author,
                year: years.parse(&year)?,
            },
        ),
        Some(Commands::Delete { id, yes }) => cmd_delete(&path, &years, &id, yes),
        Some(Commands::Search { author }) => cmd_search(&path, &years, &author),
        Some(Commands::Available) => cmd_available(&path, &years),
        Some(Commands::Lend { id, borrower }) => cmd_lend(&path, &years, &id, &borrower),
        Some(Commands::Return { id }) => cmd_return(&path, &years, &id),
        Some(Commands::History { id }) => cmd_history(&path, &years, &id),
        Some(Commands::Genres) => cmd_genres(&path, &years),
        Some(Commands::Stats) => cmd_stats(&path, &years),
    }
}

/// Load the catalog, warning about inconsistencies
///
/// A missing or corrupt catalog is fatal for every command but `init`.
fn load_catalog(path: &Path, years: &YearBounds) -> Result<Catalog> {
    let catalog = Catalog::load(path)?;
    for issue in catalog.validate(years) {
        tracing::warn!("Catalog {:?}: {}", path, issue);
    }
    Ok(catalog)
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    Catalog::init(path, force)?;
    println!("Created empty catalog at {}", path.display());
    Ok(())
}

fn cmd_menu(path: PathBuf, years: YearBounds) -> Result<()> {
    let catalog = load_catalog(&path, &years)?;
    let stdin = io::stdin();
    let mut session = menu::Session::new(catalog, path, years, stdin.lock(), io::stdout());
    session.run()
}

fn cmd_list(path: &Path, years: &YearBounds) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    let stats = catalog.stats();
    println!(
        "{} books, {} available, {} on loan",
        stats.total,
        stats.available,
        stats.on_loan()
    );
    for entry in catalog.books() {
        println!("  {} - {} [{}]", entry, entry.book.author, entry.book.genre);
    }
    Ok(())
}

fn cmd_add(path: &Path, years: &YearBounds, book: NewBook) -> Result<()> {
    let mut catalog = load_catalog(path, years)?;
    let id = catalog.add_book(book, years)?;
    catalog.save(path)?;
    println!("Book added with ID {}", id);
    Ok(())
}

fn cmd_delete(path: &Path, years: &YearBounds, id: &str, yes: bool) -> Result<()> {
    let mut catalog = load_catalog(path, years)?;
    let title = catalog.find(id)?.book.title.clone();

    let confirmed = yes || {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        let question = format!("Delete '{}'? (yes/no): ", title);
        let answer = menu::confirm(&mut input, &mut output, &question)?;
        output.flush()?;
        answer
    };
    if !confirmed {
        println!("Deletion cancelled");
        return Ok(());
    }

    catalog.remove_book(id)?;
    catalog.save(path)?;
    println!("Deleted '{}'", title);
    Ok(())
}

fn cmd_search(path: &Path, years: &YearBounds, author: &str) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    let found = catalog.search_by_author(author);
    if found.is_empty() {
        println!("No books found for: {}", author);
    }
    for entry in found {
        println!("  {}", entry);
    }
    Ok(())
}

fn cmd_available(path: &Path, years: &YearBounds) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    let available = catalog.available_books();
    if available.is_empty() {
        println!("No books are available.");
    }
    for entry in available {
        println!("  {}", entry);
    }
    Ok(())
}

fn cmd_lend(path: &Path, years: &YearBounds, id: &str, borrower: &str) -> Result<()> {
    let mut catalog = load_catalog(path, years)?;
    match catalog.lend(id, borrower)? {
        LoanOutcome::Recorded(event) => {
            catalog.save(path)?;
            println!("Loan recorded: {} on {}", event.borrower, event.date);
        }
        LoanOutcome::AlreadyOnLoan => println!("The book is not available"),
    }
    Ok(())
}

fn cmd_return(path: &Path, years: &YearBounds, id: &str) -> Result<()> {
    let mut catalog = load_catalog(path, years)?;
    match catalog.return_book(id)? {
        ReturnOutcome::Returned => {
            catalog.save(path)?;
            println!("Return recorded");
        }
        ReturnOutcome::AlreadyAvailable => println!("The book is already available"),
    }
    Ok(())
}

fn cmd_history(path: &Path, years: &YearBounds, id: &str) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    let entry = catalog.find(id)?;
    println!("{}", entry);

    match entry.book.last_loan() {
        None => println!("  Never lent"),
        Some(last) if !entry.book.available => {
            println!("  With {} since {}", last.borrower, last.date)
        }
        Some(_) => {}
    }
    for event in catalog.loan_history(id)? {
        println!("  {} {}", event.date, event.borrower);
    }
    Ok(())
}

fn cmd_genres(path: &Path, years: &YearBounds) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    for genre in catalog.genres() {
        println!("{}", genre);
    }
    Ok(())
}

fn cmd_stats(path: &Path, years: &YearBounds) -> Result<()> {
    let catalog = load_catalog(path, years)?;
    let stats = catalog.stats();
    println!("Total: {}", stats.total);
    println!("Available: {}", stats.available);
    println!("On loan: {}", stats.on_loan());
    Ok(())
}
