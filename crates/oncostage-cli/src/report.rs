//! Rendering of extraction results.

use std::fmt::Write;

use oncostage_extract::NoteExtraction;

/// Trimmed, non-blank lines; each is one note.
pub fn split_notes(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Note text followed by one field per line and a blank separator.
pub fn render_text(extractions: &[NoteExtraction]) -> String {
    let mut out = String::new();
    for e in extractions {
        // writing into a String cannot fail
        let _ = writeln!(out, "{}", e.note);
        let _ = writeln!(out, "Histologic Type: {}", e.histology);
        let _ = writeln!(out, "Stage: {}", e.stage);
        let _ = writeln!(out, "T: {}", e.tnm.t);
        let _ = writeln!(out, "N: {}", e.tnm.n);
        let _ = writeln!(out, "M: {}", e.tnm.m);
        out.push('\n');
    }
    out
}

/// One JSON object per line.
pub fn render_json(extractions: &[NoteExtraction]) -> serde_json::Result<String> {
    let mut out = String::new();
    for e in extractions {
        out.push_str(&serde_json::to_string(e)?);
        out.push('\n');
    }
    Ok(out)
}
