//! EPUB part writer
//!
//! Each part becomes a self-contained EPUB 3 package. Whole chapters are
//! copied byte for byte at their original archive paths so relative links to
//! stylesheets and images keep working. Chapters that were split are rewritten
//! as plain XHTML paragraphs of the slice text. The package document,
//! navigation document and NCX are generated under names that cannot clash
//! with the source's own files.

use super::{entries, Entry, PartWriter};
use crate::input::{ExtractedBook, Resource};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::sync::OnceLock;
use tomesplit_core::Part;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MIMETYPE: &str = "application/epub+zip";
const PACKAGE_FILE: &str = "tomesplit.opf";
const NAV_FILE: &str = "tomesplit-nav.xhtml";
const NCX_FILE: &str = "tomesplit.ncx";

/// `dcterms:modified` written when the source has no usable timestamp
const FALLBACK_MODIFIED: &str = "2000-01-01T00:00:00Z";

static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
static MODIFIED_FORMAT: OnceLock<Regex> = OnceLock::new();

/// EPUB writer - one package per part
#[derive(Debug, Default, Clone, Copy)]
pub struct EpubWriter;

impl PartWriter for EpubWriter {
    fn extension(&self) -> &'static str {
        "epub"
    }

    fn render(&self, book: &ExtractedBook, part: &Part) -> Result<Vec<u8>> {
        let entries = entries(book, part)?;
        let package = Package::plan(book, part, &entries)?;
        package.write()
    }
}

/// A document placed in the output package
struct PackageDocument {
    id: String,
    path: String,
    media_type: String,
    title: String,
    data: Vec<u8>,
}

struct Package<'a> {
    book: &'a ExtractedBook,
    sequence_number: usize,
    documents: Vec<PackageDocument>,
    resources: Vec<&'a Resource>,
}

impl<'a> Package<'a> {
    fn plan(book: &'a ExtractedBook, part: &Part, entries: &[Entry<'_>]) -> Result<Self> {
        let language = book.metadata.language.as_deref().unwrap_or("en");

        let mut documents = Vec::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let source = entry.chapter.document.as_ref().ok_or_else(|| {
                anyhow!(
                    "Chapter {} has no source document to copy",
                    entry.chapter.identifier
                )
            })?;

            let document = match entry.slice {
                None => PackageDocument {
                    id: format!("doc{}", position + 1),
                    path: source.path.clone(),
                    media_type: source.media_type.clone(),
                    title: entry.heading(),
                    data: source.data.clone(),
                },
                Some(slice) => PackageDocument {
                    id: format!("doc{}", position + 1),
                    path: slice_path(&source.path, entry.index, slice.ordinal),
                    media_type: "application/xhtml+xml".to_string(),
                    title: entry.heading(),
                    data: slice_xhtml(&entry.heading(), entry.text, language).into_bytes(),
                },
            };
            documents.push(document);
        }

        let resources = book
            .resources
            .iter()
            .filter(|resource| {
                is_always_included(&resource.media_type)
                    || documents
                        .iter()
                        .any(|doc| references(&doc.data, &resource.path))
            })
            .collect();

        Ok(Self {
            book,
            sequence_number: part.sequence_number,
            documents,
            resources,
        })
    }

    fn identifier(&self) -> String {
        let base = self
            .book
            .metadata
            .identifier
            .clone()
            .unwrap_or_else(|| format!("urn:tomesplit:{}", self.book.stem));
        format!("{base}_part{}", self.sequence_number)
    }

    fn title(&self) -> String {
        format!("{} - Part {}", self.book.metadata.title, self.sequence_number)
    }

    fn href(&self, path: &str) -> String {
        relative_href(&self.book.package_dir, path)
    }

    fn write(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)
            .context("Failed to start mimetype entry")?;
        zip.write_all(MIMETYPE.as_bytes())?;

        let package_path = format!("{}{PACKAGE_FILE}", self.book.package_dir);
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(container_xml(&package_path).as_bytes())?;

        zip.start_file(package_path.as_str(), deflated)?;
        zip.write_all(self.package_opf()?.as_bytes())?;

        zip.start_file(format!("{}{NAV_FILE}", self.book.package_dir), deflated)?;
        zip.write_all(self.nav_xhtml()?.as_bytes())?;

        zip.start_file(format!("{}{NCX_FILE}", self.book.package_dir), deflated)?;
        zip.write_all(self.toc_ncx()?.as_bytes())?;

        for document in &self.documents {
            zip.start_file(document.path.as_str(), deflated)
                .with_context(|| format!("Failed to add {} to package", document.path))?;
            zip.write_all(&document.data)?;
        }

        for resource in &self.resources {
            zip.start_file(resource.path.as_str(), deflated)
                .with_context(|| format!("Failed to add {} to package", resource.path))?;
            zip.write_all(&resource.data)?;
        }

        let cursor = zip.finish().context("Failed to finish EPUB archive")?;
        Ok(cursor.into_inner())
    }

    fn package_opf(&self) -> Result<String> {
        let metadata = &self.book.metadata;
        let mut opf = String::new();

        writeln!(opf, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            opf,
            r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="bookid">"#
        )?;
        writeln!(opf, r#"  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">"#)?;
        writeln!(
            opf,
            r#"    <dc:identifier id="bookid">{}</dc:identifier>"#,
            escape_xml(&self.identifier())
        )?;
        writeln!(opf, "    <dc:title>{}</dc:title>", escape_xml(&self.title()))?;
        writeln!(
            opf,
            "    <dc:language>{}</dc:language>",
            escape_xml(metadata.language.as_deref().unwrap_or("en"))
        )?;
        if let Some(creator) = &metadata.creator {
            writeln!(opf, "    <dc:creator>{}</dc:creator>", escape_xml(creator))?;
        }
        writeln!(
            opf,
            r#"    <meta property="dcterms:modified">{}</meta>"#,
            modified_timestamp(metadata.modified.as_deref())
        )?;
        writeln!(opf, "  </metadata>")?;

        writeln!(opf, "  <manifest>")?;
        writeln!(
            opf,
            r#"    <item id="tomesplit-nav" href="{NAV_FILE}" media-type="application/xhtml+xml" properties="nav"/>"#
        )?;
        writeln!(
            opf,
            r#"    <item id="tomesplit-ncx" href="{NCX_FILE}" media-type="application/x-dtbncx+xml"/>"#
        )?;
        for document in &self.documents {
            writeln!(
                opf,
                r#"    <item id="{}" href="{}" media-type="{}"/>"#,
                document.id,
                escape_xml(&self.href(&document.path)),
                escape_xml(&document.media_type)
            )?;
        }
        for (position, resource) in self.resources.iter().enumerate() {
            writeln!(
                opf,
                r#"    <item id="res{}" href="{}" media-type="{}"/>"#,
                position + 1,
                escape_xml(&self.href(&resource.path)),
                escape_xml(&resource.media_type)
            )?;
        }
        writeln!(opf, "  </manifest>")?;

        writeln!(opf, r#"  <spine toc="tomesplit-ncx">"#)?;
        for document in &self.documents {
            writeln!(opf, r#"    <itemref idref="{}"/>"#, document.id)?;
        }
        writeln!(opf, "  </spine>")?;
        writeln!(opf, "</package>")?;

        Ok(opf)
    }

    fn nav_xhtml(&self) -> Result<String> {
        let title = escape_xml(&self.title());
        let mut nav = String::new();

        writeln!(nav, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(nav, "<!DOCTYPE html>")?;
        writeln!(
            nav,
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">"#
        )?;
        writeln!(nav, "<head><title>{title}</title></head>")?;
        writeln!(nav, "<body>")?;
        writeln!(nav, r#"<nav epub:type="toc" id="toc">"#)?;
        writeln!(nav, "<h1>{title}</h1>")?;
        writeln!(nav, "<ol>")?;
        for document in &self.documents {
            writeln!(
                nav,
                r#"<li><a href="{}">{}</a></li>"#,
                escape_xml(&self.href(&document.path)),
                escape_xml(&document.title)
            )?;
        }
        writeln!(nav, "</ol>")?;
        writeln!(nav, "</nav>")?;
        writeln!(nav, "</body>")?;
        writeln!(nav, "</html>")?;

        Ok(nav)
    }

    fn toc_ncx(&self) -> Result<String> {
        let mut ncx = String::new();

        writeln!(ncx, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            ncx,
            r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">"#
        )?;
        writeln!(
            ncx,
            r#"  <head><meta name="dtb:uid" content="{}"/></head>"#,
            escape_xml(&self.identifier())
        )?;
        writeln!(
            ncx,
            "  <docTitle><text>{}</text></docTitle>",
            escape_xml(&self.title())
        )?;
        writeln!(ncx, "  <navMap>")?;
        for (position, document) in self.documents.iter().enumerate() {
            writeln!(
                ncx,
                r#"    <navPoint id="navpoint-{0}" playOrder="{0}"><navLabel><text>{1}</text></navLabel><content src="{2}"/></navPoint>"#,
                position + 1,
                escape_xml(&document.title),
                escape_xml(&self.href(&document.path))
            )?;
        }
        writeln!(ncx, "  </navMap>")?;
        writeln!(ncx, "</ncx>")?;

        Ok(ncx)
    }
}

fn container_xml(package_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
        escape_xml(package_path)
    )
}

/// Source timestamp when it has the `CCYY-MM-DDThh:mm:ssZ` form, else a fixed one
fn modified_timestamp(source: Option<&str>) -> &str {
    let format = MODIFIED_FORMAT.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$")
            .expect("timestamp pattern is a valid regex")
    });
    source
        .filter(|value| format.is_match(value))
        .unwrap_or(FALLBACK_MODIFIED)
}

/// XHTML document holding one slice of a split chapter
fn slice_xhtml(heading: &str, text: &str, language: &str) -> String {
    let breaks = PARAGRAPH_BREAK
        .get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is a valid regex"));
    let heading = escape_xml(heading);
    let language = escape_xml(language);

    let mut body = String::new();
    for paragraph in breaks.split(text) {
        let paragraph = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        if !paragraph.is_empty() {
            body.push_str(&format!("<p>{}</p>\n", escape_xml(&paragraph)));
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{language}" lang="{language}">
<head><title>{heading}</title></head>
<body>
<h2>{heading}</h2>
{body}</body>
</html>
"#
    )
}

/// Archive path of slice `ordinal` of chapter `index`, stored at `path`
///
/// The chapter position keeps names distinct for documents that differ
/// only by extension.
fn slice_path(path: &str, index: usize, ordinal: usize) -> String {
    let (dir, file) = match path.rfind('/') {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    format!("{dir}{stem}_u{}_slice{}.xhtml", index + 1, ordinal + 1)
}

/// Path of `path` relative to the package directory `package_dir`
fn relative_href(package_dir: &str, path: &str) -> String {
    if let Some(rest) = path.strip_prefix(package_dir) {
        return rest.to_string();
    }
    let depth = package_dir.split('/').filter(|s| !s.is_empty()).count();
    format!("{}{path}", "../".repeat(depth))
}

fn is_always_included(media_type: &str) -> bool {
    media_type == "text/css" || media_type.contains("font") || media_type.contains("opentype")
}

/// Whether a document mentions the file name of `resource_path`
fn references(document: &[u8], resource_path: &str) -> bool {
    let name = resource_path.rsplit('/').next().unwrap_or(resource_path);
    !name.is_empty() && String::from_utf8_lossy(document).contains(name)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
