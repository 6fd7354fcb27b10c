//! Catalog file persistence with file locking.
//!
//! The catalog is read wholesale at startup and written back on demand.
//! Unlike most state files, a missing or corrupt catalog is an error: the
//! caller decides whether that is fatal.

use crate::{Catalog, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Default catalog file name, resolved against the working directory
pub const DEFAULT_CATALOG_FILE: &str = "biblioteca.json";

impl Catalog {
    /// Load the catalog from a file with shared locking
    ///
    /// Fails with `CatalogNotFound` if the file doesn't exist and with
    /// `Json` if it isn't a valid catalog document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::CatalogNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let catalog: Catalog = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} books from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Save the catalog to a file, replacing its previous content
    ///
    /// Atomically writes the catalog by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;

        // Exclusive lock while writing
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            // Two-space indented, non-ASCII left unescaped
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved {} books to {:?}", self.len(), path);
        Ok(())
    }

    /// Create an empty catalog file
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn init(path: &Path, overwrite: bool) -> Result<Self> {
        if path.exists() && !overwrite {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }
        let catalog = Catalog::new();
        catalog.save(path)?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BookId, NewBook, YearBounds};
    use chrono::NaiveDate;

    fn populated() -> Catalog {
        let years = YearBounds::default();
        let mut catalog = Catalog::new();
        for (genre, title, author, year) in [
            ("Romanzo", "I promessi sposi", "Alessandro Manzoni", 1827),
            ("Fantascienza", "Dune", "Frank Herbert", 1965),
            ("Poesia", "L'infinito e altre poesie", "Giacomo Leopardi", 1826),
        ] {
            catalog
                .add_book(
                    NewBook {
                        genre: genre.into(),
                        title: title.into(),
                        author: author.into(),
                        year,
                    },
                    &years,
                )
                .unwrap();
        }
        catalog
            .lend_on("2", "Chiara", NaiveDate::from_ymd_opt(2025, 2, 14).unwrap())
            .unwrap();
        catalog
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");

        let catalog = populated();
        catalog.save(&path).unwrap();
        let loaded = Catalog::load(&path).unwrap();

        assert_eq!(loaded, catalog);
        let ids: Vec<BookId> = loaded.books().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![BookId(1), BookId(2), BookId(3)]);
    }

    #[test]
    fn test_saved_file_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");

        populated().save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        // Pretty-printed with two-space indent, accents written verbatim
        assert!(text.starts_with("{\n  \"libri\""));
        assert!(text.contains("L'infinito"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["libri"]["2"]["disponibile"], false);
        assert_eq!(json["libri"]["2"]["prestiti"][0]["data_prestito"], "2025-02-14");
        assert_eq!(json["statistiche"]["totale_libri"], 3);
        assert_eq!(json["statistiche"]["libri_disponibili"], 2);
    }

    #[test]
    fn test_save_overwrites_existing_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");

        let mut catalog = populated();
        catalog.save(&path).unwrap();
        catalog.remove_book("1").unwrap();
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get(BookId(1)).is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, Error::CatalogNotFound(_)));
        assert!(err.is_storage());
    }

    #[test]
    fn test_load_corrupted_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("corrupted.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_storage());
    }

    #[test]
    fn test_load_rejects_non_numeric_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");
        std::fs::write(
            &path,
            r#"{"libri":{"abc":{"titolo":"X","autore":"Y","anno":"1990","genere":"Z","disponibile":true,"prestiti":[]}},"generi":["Z"],"statistiche":{"totale_libri":1,"libri_disponibili":1}}"#,
        )
        .unwrap();

        assert!(matches!(Catalog::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_accepts_ids_beyond_u32() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");
        std::fs::write(
            &path,
            r#"{"libri":{"4294967296":{"titolo":"X","autore":"Y","anno":"1990","genere":"Z","disponibile":true,"prestiti":[]}},"generi":["Z"],"statistiche":{"totale_libri":1,"libri_disponibili":1}}"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert!(catalog.get(BookId(4_294_967_296)).is_some());
        assert_eq!(catalog.next_id().unwrap(), BookId(4_294_967_297));
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("biblioteca.json");

        populated().save(&path).unwrap();

        // Verify catalog file exists and no stray temp files remain
        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "biblioteca.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only biblioteca.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_init_creates_empty_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("biblioteca.json");

        Catalog::init(&path, false).unwrap();
        let loaded = Catalog::load(&path).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.next_id().unwrap(), BookId(1));

        // Second init without overwrite refuses
        assert!(Catalog::init(&path, false).is_err());
        assert!(Catalog::init(&path, true).is_ok());
    }
}
