//! Folder ingestion: text files in, [`RawDocument`]s out.
//!
//! The pipeline core never touches PDF bytes; it consumes page texts
//! produced upstream by an OCR/text-extraction step. This module walks a
//! case folder for `.txt` files (form feeds separate pages within a
//! file), flags important documents by filename prefix or an
//! `importantes/` parent folder, and skips unreadable files with a
//! warning.

use crate::error::{CliError, Result};
use sintese_extract::RawDocument;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Filename prefixes that mark a document as important.
const IMPORTANT_PREFIXES: &[&str] = &["IMPORTANTE_", "PRINCIPAL_", "DESTAQUE_"];
/// Folder name that marks everything inside it as important.
const IMPORTANT_FOLDER: &str = "importantes";

fn is_important(path: &Path) -> bool {
    let by_prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| IMPORTANT_PREFIXES.iter().any(|p| name.starts_with(p)));
    let by_folder = path
        .parent()
        .map(|parent| parent.to_string_lossy().to_lowercase().contains(IMPORTANT_FOLDER))
        .unwrap_or(false);
    by_prefix || by_folder
}

/// Collect the case folder's documents, recursing into subfolders.
///
/// Files that cannot be read are skipped with a warning; an empty or
/// missing folder is an error.
pub fn collect_documents(folder: &Path) -> Result<Vec<RawDocument>> {
    if !folder.is_dir() {
        return Err(CliError::FolderNotFound(folder.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !entry.file_type().is_file() || !is_txt {
            continue;
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("skipping unreadable file {}: {e}", path.display());
                continue;
            }
        };

        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        documents.push(RawDocument {
            important: is_important(path),
            // Form feed is the conventional page separator in OCR output
            pages: contents.split('\u{000C}').map(str::to_string).collect(),
            source_name,
        });
    }

    if documents.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "no .txt documents found in {}",
            folder.display()
        )));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_pages_and_importance() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("peticao.txt"), "página um\u{000C}página dois").unwrap();
        fs::write(dir.path().join("IMPORTANTE_sentenca.txt"), "dispositivo").unwrap();
        fs::create_dir(dir.path().join("importantes")).unwrap();
        fs::write(dir.path().join("importantes").join("laudo.txt"), "laudo pericial").unwrap();
        fs::write(dir.path().join("planilha.csv"), "ignorado").unwrap();

        let docs = collect_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 3);

        let peticao = docs.iter().find(|d| d.source_name == "peticao.txt").unwrap();
        assert_eq!(peticao.pages.len(), 2);
        assert!(!peticao.important);

        assert!(docs
            .iter()
            .find(|d| d.source_name == "IMPORTANTE_sentenca.txt")
            .unwrap()
            .important);
        assert!(docs.iter().find(|d| d.source_name == "laudo.txt").unwrap().important);
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let result = collect_documents(Path::new("/nonexistent/case/folder"));
        assert!(matches!(result, Err(CliError::FolderNotFound(_))));
    }

    #[test]
    fn test_folder_without_documents_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_documents(dir.path()),
            Err(CliError::InvalidInput(_))
        ));
    }
}
