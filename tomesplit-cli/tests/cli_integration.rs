//! Integration tests for the tomesplit CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CHAPTERS: [(&str, &str); 3] = [
    (
        "Loomings",
        "Call me Ishmael. Some years ago, never mind how long precisely, having little \
         or no money in my purse, and nothing particular to interest me on shore, I \
         thought I would sail about a little.",
    ),
    (
        "The Carpet-Bag",
        "I stuffed a shirt or two into my old carpet-bag, tucked it under my arm, and \
         started for Cape Horn and the Pacific. Quitting the good city of old Manhatto, \
         I arrived in New Bedford.",
    ),
    (
        "The Spouter-Inn",
        "Entering that gable-ended Spouter-Inn, you found yourself in a wide, low, \
         straggling entry with old-fashioned wainscots, reminding one of the bulwarks \
         of some condemned old craft.",
    ),
];

/// Write a small EPUB 2 package with one spine document per chapter
fn write_epub(dir: &Path) -> PathBuf {
    let path = dir.join("book.epub");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
    )
    .unwrap();

    let mut manifest = String::new();
    let mut spine = String::new();
    let mut nav_points = String::new();
    for (position, _) in CHAPTERS.iter().enumerate() {
        let n = position + 1;
        manifest.push_str(&format!(
            "    <item id=\"ch{n}\" href=\"ch{n}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
        ));
        spine.push_str(&format!("    <itemref idref=\"ch{n}\"/>\n"));
        nav_points.push_str(&format!(
            "    <navPoint id=\"np{n}\" playOrder=\"{n}\"><navLabel><text>Chapter {n}</text></navLabel><content src=\"ch{n}.xhtml\"/></navPoint>\n"
        ));
    }

    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Moby Dick</dc:title>
    <dc:creator>Herman Melville</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="bookid">urn:isbn:9780142437247</dc:identifier>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#
    )
    .unwrap();

    zip.start_file("OEBPS/toc.ncx", deflated).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:isbn:9780142437247"/></head>
  <docTitle><text>Moby Dick</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>
"#
    )
    .unwrap();

    for (position, (title, body)) in CHAPTERS.iter().enumerate() {
        zip.start_file(format!("OEBPS/ch{}.xhtml", position + 1), deflated)
            .unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head></head>
<body>
  <h1>{title}</h1>
  <p>{body}</p>
</body>
</html>
"#
        )
        .unwrap();
    }

    zip.finish().unwrap();
    path
}

fn tomesplit() -> Command {
    Command::cargo_bin("tomesplit").unwrap()
}

#[test]
fn test_split_epub_to_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("out");

    tomesplit()
        .arg("split")
        .arg("-i")
        .arg(&book)
        .arg("-o")
        .arg(&out)
        .arg("--max-words")
        .arg("40")
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing complete. Created 3 files:"));

    for n in 1..=3 {
        let part = fs::read_to_string(out.join(format!("book_part{n}.md"))).unwrap();
        assert!(part.starts_with(&format!("# Moby Dick - Part {n}")));
        assert!(part.contains("*Words: "));
        assert!(part.contains("## Table of Contents"));
    }

    let first = fs::read_to_string(out.join("book_part1.md")).unwrap();
    assert!(first.contains("## Loomings"));
    assert!(first.contains("Call me Ishmael."));
    assert!(!first.contains("Carpet-Bag"));
    assert!(!out.join("book_part4.md").exists());
}

#[test]
fn test_large_budget_gives_single_part() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("out");

    tomesplit()
        .args(["split", "-q", "-i"])
        .arg(&book)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 1 files:"));

    let part = fs::read_to_string(out.join("book_part1.md")).unwrap();
    assert!(part.contains("## Loomings"));
    assert!(part.contains("## The Carpet-Bag"));
    assert!(part.contains("## The Spouter-Inn"));
}

#[test]
fn test_split_epub_to_epub() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("out");

    tomesplit()
        .args(["split", "-q", "-f", "epub", "-w", "40", "-i"])
        .arg(&book)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let file = File::open(out.join("book_part2.epub")).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

    let mut opf = String::new();
    archive
        .by_name("OEBPS/tomesplit.opf")
        .unwrap()
        .read_to_string(&mut opf)
        .unwrap();
    assert!(opf.contains("Moby Dick - Part 2"));
    assert!(opf.contains("ch2.xhtml"));
    assert!(!opf.contains("ch1.xhtml"));

    assert!(archive.by_name("OEBPS/ch2.xhtml").is_ok());
    assert!(archive.by_name("OEBPS/ch1.xhtml").is_err());
}

#[test]
fn test_dry_run_prints_plan_only() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("out");

    tomesplit()
        .args(["split", "--dry-run", "-w", "40", "-i"])
        .arg(&book)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Part 1: chapters 1-1"))
        .stdout(predicate::str::contains("Part 3: chapters 3-3"))
        .stdout(predicate::str::contains("Processing complete").not());

    assert!(!out.exists());
}

#[test]
fn test_manifest_written() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("out");

    tomesplit()
        .args(["split", "-q", "--manifest", "-w", "40", "-i"])
        .arg(&book)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("book_manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["title"], "Moby Dick");
    assert_eq!(manifest["max_words"], 40);
    let parts = manifest["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["file"], "book_part1.md");
    assert_eq!(parts[2]["identifiers"][0], "ch3");
}

#[test]
fn test_config_file_drives_split() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());
    let out = temp_dir.path().join("from-config");
    let config = temp_dir.path().join("tomesplit.toml");
    fs::write(
        &config,
        format!(
            "[segmentation]\nmax_words = 40\n\n[output]\ndirectory = \"{}\"\n",
            out.display()
        ),
    )
    .unwrap();

    tomesplit()
        .args(["split", "-q", "-i"])
        .arg(&book)
        .arg("-c")
        .arg(&config)
        .assert()
        .success();

    assert!(out.join("book_part3.md").exists());
}

#[test]
fn test_unsupported_conversion() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());

    tomesplit()
        .args(["split", "-q", "-f", "pdf", "-i"])
        .arg(&book)
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported conversion"));
}

#[test]
fn test_unsupported_input_format() {
    let temp_dir = TempDir::new().unwrap();
    let notes = temp_dir.path().join("notes.txt");
    fs::write(&notes, "plain text").unwrap();

    tomesplit()
        .args(["split", "-q", "-i"])
        .arg(&notes)
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported input format"));
}

#[test]
fn test_inputs_sharing_a_stem_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let first_dir = temp_dir.path().join("first");
    let second_dir = temp_dir.path().join("second");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();
    let first = write_epub(&first_dir);
    let second = write_epub(&second_dir);
    let out = temp_dir.path().join("out");

    tomesplit()
        .args(["split", "-q", "-i"])
        .arg(&first)
        .arg("-i")
        .arg(&second)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("share the file stem 'book'"));

    assert!(!out.join("book_part1.md").exists());
}

#[test]
fn test_nonexistent_file() {
    tomesplit()
        .args(["split", "-i", "nonexistent.epub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_zero_budget_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());

    tomesplit()
        .args(["split", "-w", "0", "-i"])
        .arg(&book)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_words must be greater than 0"));
}

#[test]
fn test_inspect_reports_units() {
    let temp_dir = TempDir::new().unwrap();
    let book = write_epub(temp_dir.path());

    tomesplit()
        .args(["inspect", "-w", "40", "-i"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:  Moby Dick"))
        .stdout(predicate::str::contains("Author: Herman Melville"))
        .stdout(predicate::str::contains("Units:  3"))
        .stdout(predicate::str::contains("The Spouter-Inn"))
        .stdout(predicate::str::contains("Plan (max 40 words):"));
}

#[test]
fn test_list_formats() {
    tomesplit()
        .args(["list", "formats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Input formats:"))
        .stdout(predicate::str::contains("pdf"))
        .stdout(predicate::str::contains("markdown"));
}

#[test]
fn test_generate_then_validate_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("tomesplit.toml");

    tomesplit()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("generated successfully"));

    tomesplit()
        .arg("validate-config")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Max words: 80000"));
}

#[test]
fn test_help_output() {
    tomesplit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("inspect"));
}
