// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open and inspect existing PDF documents using the `lopdf`
// crate. Counts pages before any page is rasterised, so a corrupt file fails
// as a load error instead of a render error.

use std::path::Path;

use lopdf::Document;
use printbridge_core::error::{PrintBridgeError, Result};
use tracing::{debug, info, instrument};

/// Parsed PDF structure.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PrintBridgeError::LoadError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{Document, Object, dictionary};

    /// Serialise a minimal, structurally valid PDF with `pages` blank A4 pages.
    pub(crate) fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::with_capacity(pages);
        for _ in 0..pages {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise test PDF");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::blank_pdf;
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        for pages in [1, 3] {
            let path = write(&dir, &format!("doc-{pages}.pdf"), &blank_pdf(pages));
            assert_eq!(PdfReader::open(&path).unwrap().page_count(), pages);
        }
    }

    #[test]
    fn garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.pdf", b"%PDF-nope");
        let err = PdfReader::open(&path).err().unwrap();
        assert!(matches!(err, PrintBridgeError::LoadError(_)));
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfReader::open(dir.path().join("absent.pdf")).err().unwrap();
        assert!(matches!(err, PrintBridgeError::LoadError(_)));
    }
}
