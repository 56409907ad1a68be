//! Reading and writing SIE files, the Swedish interchange format for accounting data.
//!
//! [`read_file`] and [`write_file`] handle the file and its code page. The document model, the
//! reader and the writer are re-exported for finer control.

use std::fs;
use std::path::Path;

use thiserror::Error;

pub use sie_core as model;
pub use sie_core::{Document, FileType};
pub use sie_parser::{parse, Diagnostic, Diagnostics, Parsed, ReaderOptions, SieReader};
pub use sie_render::{render, render_to_string, RenderError, WriterOptions};

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not access file")]
    Io(#[from] std::io::Error),
    #[error("could not write document")]
    Render(#[from] RenderError),
}

/// Reads a SIE file. The file name tells type 4 export files from import files.
pub fn read_file<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Parsed, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mut reader = SieReader::with_options(options);
    let document = reader.read_bytes(&bytes, &path.to_string_lossy());
    Ok(Parsed {
        document,
        diagnostics: reader.take_diagnostics(),
    })
}

/// Writes `document` to a new file at `path`, replacing any existing file.
pub fn write_file<P: AsRef<Path>>(
    path: P,
    document: &Document,
    options: WriterOptions,
) -> Result<(), Error> {
    let mut bytes = Vec::new();
    sie_render::render_with(&mut bytes, document, sie_core::Cp437, options)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sie_core::date::parse_date;

    #[test]
    fn file_round_trip() -> anyhow::Result<()> {
        let start = parse_date("20210101").unwrap();
        let mut sie = Document::new(
            FileType::TransactionExport,
            "Bokföring",
            "1.0",
            "Övningsbolaget AB",
            start,
            None,
        );
        sie.notes.push("Årsbokslut".into());

        let path = std::env::temp_dir().join(format!("sie-round-trip-{}.SE", std::process::id()));
        write_file(&path, &sie, WriterOptions::default())?;
        let parsed = read_file(&path, ReaderOptions::default());
        fs::remove_file(&path)?;

        let parsed = parsed?;
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.document, sie);
        Ok(())
    }

    #[test]
    fn missing_file() {
        let result = read_file("/nonexistent/sie/file.se", ReaderOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
