//! EPUB extraction backed by the `epub` crate

use super::{
    file_stem, BookMetadata, Chapter, Document, ExtractedBook, Extractor, Resource, SourceFormat,
};
use crate::error::CliError;
use anyhow::{Context, Result};
use epub::doc::EpubDoc;
use regex::Regex;
use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::OnceLock;
use tomesplit_core::count_words;

static TITLE_ELEMENT: OnceLock<Regex> = OnceLock::new();

fn title_element() -> &'static Regex {
    TITLE_ELEMENT.get_or_init(|| {
        Regex::new(r"(?is)<(?:h[1-3]|title)\b[^>]*>(.*?)</(?:h[1-3]|title)\s*>")
            .expect("title pattern is a valid regex")
    })
}

/// Reads EPUB spine documents as chapters
#[derive(Debug, Clone)]
pub struct EpubExtractor {
    text_width: usize,
}

impl EpubExtractor {
    /// Create an extractor rendering plain text at `text_width` columns
    pub fn new(text_width: usize) -> Self {
        Self {
            text_width: text_width.max(1),
        }
    }

    fn read_book<R: Read + Seek>(&self, doc: &mut EpubDoc<R>, path: &Path) -> Result<ExtractedBook> {
        let stem = file_stem(path);
        let metadata = BookMetadata {
            title: metadata_value(doc, "title").unwrap_or_else(|| stem.clone()),
            creator: metadata_value(doc, "creator"),
            language: metadata_value(doc, "language"),
            identifier: metadata_value(doc, "identifier"),
            modified: metadata_value(doc, "dcterms:modified")
                .or_else(|| metadata_value(doc, "modified")),
        };

        let spine: Vec<String> = doc.spine.iter().map(|item| item.idref.clone()).collect();
        let mut chapters = Vec::new();
        let mut documents = HashSet::new();

        for idref in spine {
            let Some((item_path, media_type, navigation)) = doc.resources.get(&idref).map(|item| {
                (
                    archive_path(&item.path),
                    item.mime.clone(),
                    is_navigation(&item.mime, item.properties.as_deref()),
                )
            }) else {
                log::warn!("Spine item {idref} is missing from the manifest");
                continue;
            };

            if navigation || !is_document(&media_type) {
                log::debug!("Skipping non-chapter spine item {idref} ({media_type})");
                continue;
            }

            let Some((data, _mime)) = doc.get_resource(&idref) else {
                log::warn!("Spine item {idref} could not be read from the archive");
                continue;
            };

            let html = String::from_utf8_lossy(&data);
            let title = self
                .find_title(&html)
                .unwrap_or_else(|| format!("Chapter {}", chapters.len() + 1));
            let text = self.to_plain_text(&data, &idref);
            let word_count = count_words(&text);

            log::debug!("  - {title} ({word_count} words)");
            documents.insert(idref.clone());
            chapters.push(Chapter {
                identifier: idref,
                title,
                text,
                word_count,
                is_boundary: true,
                page_number: None,
                document: Some(Document {
                    path: item_path,
                    media_type,
                    data,
                }),
            });
        }

        if chapters.is_empty() {
            return Err(CliError::EmptyDocument(path.display().to_string()).into());
        }

        let mut resource_ids: Vec<(String, String, String)> = doc
            .resources
            .iter()
            .filter(|(id, item)| {
                !documents.contains(*id)
                    && !is_navigation(&item.mime, item.properties.as_deref())
            })
            .map(|(id, item)| (id.clone(), archive_path(&item.path), item.mime.clone()))
            .collect();
        resource_ids.sort_by(|a, b| a.1.cmp(&b.1));

        let mut resources = Vec::with_capacity(resource_ids.len());
        for (id, item_path, media_type) in resource_ids {
            match doc.get_resource(&id) {
                Some((data, _mime)) => resources.push(Resource {
                    id,
                    path: item_path,
                    media_type,
                    data,
                }),
                None => log::warn!("Resource {item_path} could not be read from the archive"),
            }
        }

        let package_dir = archive_path(&doc.root_base);
        let package_dir = if package_dir.is_empty() || package_dir.ends_with('/') {
            package_dir
        } else {
            format!("{package_dir}/")
        };

        Ok(ExtractedBook {
            format: SourceFormat::Epub,
            stem,
            metadata,
            chapters,
            resources,
            package_dir,
        })
    }

    /// First non-empty `h1`-`h3` or `title` element, in document order
    pub fn find_title(&self, html: &str) -> Option<String> {
        title_element()
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|inner| collapse_whitespace(&self.fragment_text(inner.as_str())))
            .find(|title| !title.is_empty())
    }

    fn fragment_text(&self, fragment: &str) -> String {
        html2text::from_read(fragment.as_bytes(), self.text_width)
            .unwrap_or_else(|_| fragment.to_string())
    }

    fn to_plain_text(&self, data: &[u8], idref: &str) -> String {
        match html2text::from_read(data, self.text_width) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("html2text failed for {idref}: {err}; using raw markup");
                String::from_utf8_lossy(data).into_owned()
            }
        }
    }
}

impl Default for EpubExtractor {
    fn default() -> Self {
        Self::new(crate::config::defaults::TEXT_WIDTH)
    }
}

impl Extractor for EpubExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Epub
    }

    fn extract(&self, path: &Path) -> Result<ExtractedBook> {
        log::info!("Processing '{}'", path.display());

        let mut doc = EpubDoc::new(path)
            .with_context(|| format!("Failed to open EPUB at {}", path.display()))?;
        let book = self.read_book(&mut doc, path)?;

        log::info!(
            "Found {} chapters with a total of {} words",
            book.chapters.len(),
            book.total_words()
        );
        Ok(book)
    }
}

fn metadata_value<R: Read + Seek>(doc: &EpubDoc<R>, property: &str) -> Option<String> {
    doc.metadata
        .iter()
        .find(|item| item.property == property)
        .map(|item| item.value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_document(media_type: &str) -> bool {
    matches!(media_type, "application/xhtml+xml" | "text/html")
}

fn is_navigation(media_type: &str, properties: Option<&str>) -> bool {
    media_type == "application/x-dtbncx+xml"
        || properties.is_some_and(|p| p.split_whitespace().any(|prop| prop == "nav"))
}

/// Archive path with forward slashes
fn archive_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_title_prefers_document_order() {
        let extractor = EpubExtractor::default();
        let html = "<html><head><title>Loomings</title></head><body><h1>Chapter 1</h1></body></html>";
        assert_eq!(extractor.find_title(html), Some("Loomings".to_string()));
    }

    #[test]
    fn test_find_title_skips_empty_elements() {
        let extractor = EpubExtractor::default();
        let html = "<title> </title><h2 class=\"ch\">The <span>Carpet</span>\n Bag</h2>";
        assert_eq!(extractor.find_title(html), Some("The Carpet Bag".to_string()));
    }

    #[test]
    fn test_find_title_absent() {
        let extractor = EpubExtractor::default();
        assert_eq!(extractor.find_title("<p>No headings here.</p>"), None);
    }

    #[test]
    fn test_document_media_types() {
        assert!(is_document("application/xhtml+xml"));
        assert!(is_document("text/html"));
        assert!(!is_document("image/png"));
    }

    #[test]
    fn test_navigation_items() {
        assert!(is_navigation("application/x-dtbncx+xml", None));
        assert!(is_navigation("application/xhtml+xml", Some("nav scripted")));
        assert!(!is_navigation("application/xhtml+xml", Some("svg")));
        assert!(!is_navigation("text/css", None));
    }

    #[test]
    fn test_extract_missing_file() {
        let result = EpubExtractor::default().extract(Path::new("/nonexistent/book.epub"));
        assert!(result.unwrap_err().to_string().contains("Failed to open EPUB"));
    }
}
