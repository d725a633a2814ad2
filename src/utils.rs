//! Utility functions for ragchat
//!
//! This module provides common utility functions used throughout the project.

use crate::error::{RagError, Result};
use std::path::Path;

/// Get file extension from path
pub fn get_file_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file is a supported document format
pub fn is_supported_document<P: AsRef<Path>>(path: P) -> bool {
    match get_file_extension(path) {
        Some(ext) => matches!(ext.as_str(), "pdf" | "docx" | "txt" | "md" | "markdown"),
        None => false,
    }
}

/// Format file size in human readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Create directory if it doesn't exist
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        std::fs::create_dir_all(path).map_err(RagError::Io)?;
    }

    Ok(())
}

/// Whether a directory exists and contains at least one supported document
pub fn has_supported_documents<P: AsRef<Path>>(dir: P) -> bool {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return false;
    }

    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .any(|entry| entry.path().is_file() && is_supported_document(entry.path())),
        Err(_) => false,
    }
}
