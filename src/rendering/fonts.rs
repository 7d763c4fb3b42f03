//! Font lookup for watermark text.
//!
//! Availability of a requested family is not validated: lookups fall back
//! to the generic sans-serif face, then to any loaded face, and finally the
//! rasterizer draws block glyphs when the book is empty.

use crate::error::Result;
use fontdb::{Database, Family, Query, ID};
use std::fmt;
use std::path::Path;

/// A set of loaded font faces.
pub struct FontBook {
    db: Database,
}

impl FontBook {
    /// A book with no faces. Text renders with block glyphs.
    pub fn empty() -> Self {
        Self { db: Database::new() }
    }

    /// A book populated from the fonts installed on this system.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} system font faces", db.len());
        Self { db }
    }

    /// Add faces from in-memory font data (TTF/OTF/TTC).
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        let before = self.db.len();
        self.db.load_font_data(data);
        log::debug!("Loaded {} face(s) from font data", self.db.len() - before);
    }

    /// Add faces from a font file.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.db.load_font_file(path.as_ref())?;
        Ok(())
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// True when no faces are loaded.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Find the face to use for `family`.
    pub fn resolve(&self, family: &str) -> Option<ID> {
        if self.db.is_empty() {
            return None;
        }

        let families = [Family::Name(family), Family::SansSerif];
        let query = Query {
            families: &families,
            ..Query::default()
        };

        self.db.query(&query).or_else(|| {
            log::warn!("No face matches '{}', using first loaded face", family);
            self.db.faces().next().map(|face| face.id)
        })
    }

    /// Run `f` with the raw data and collection index of a face.
    pub(crate) fn with_face_data<T>(&self, id: ID, f: impl FnOnce(&[u8], u32) -> T) -> Option<T> {
        self.db.with_face_data(id, f)
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook").field("faces", &self.db.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_resolves_nothing() {
        let book = FontBook::empty();
        assert!(book.is_empty());
        assert_eq!(book.len(), 0);
        assert!(book.resolve("Arial").is_none());
    }

    #[test]
    fn test_garbage_font_data_adds_no_faces() {
        let mut book = FontBook::empty();
        book.load_font_data(b"not a font".to_vec());
        assert!(book.is_empty());
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let mut book = FontBook::empty();
        let err = book.load_font_file("/nonexistent/font.ttf").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_debug_shows_face_count() {
        assert_eq!(format!("{:?}", FontBook::empty()), "FontBook { faces: 0 }");
    }
}
