//! Output: write `(text, topic)` rows as CSV.
//!
//! The table is written to a temporary file next to the target and then
//! persisted over it, so a failed run never leaves a half-written CSV
//! behind. The target directory must already exist.

use crate::error::PdfTopicsError;
use crate::output::ChunkResult;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// One row of the output table.
#[derive(Debug, Serialize)]
struct TopicRow<'a> {
    text: &'a str,
    topic: &'a str,
}

/// Write the header and one row per chunk to `writer`.
pub fn write_rows<W: Write>(writer: W, chunks: &[ChunkResult]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if chunks.is_empty() {
        // serde-driven headers are only emitted with the first record.
        wtr.write_record(["text", "topic"])?;
    }
    for chunk in chunks {
        wtr.serialize(TopicRow {
            text: &chunk.text,
            topic: chunk.topic(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the table to `path`, replacing any existing file.
///
/// Returns the number of data rows written.
pub fn write_csv(path: &Path, chunks: &[ChunkResult]) -> Result<usize, PdfTopicsError> {
    let persistence = |source: io::Error| PdfTopicsError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".pdf-topics-")
        .suffix(".csv.tmp")
        .tempfile_in(dir)
        .map_err(persistence)?;

    write_rows(tmp.as_file_mut(), chunks).map_err(|e| persistence(io::Error::other(e)))?;
    tmp.as_file().sync_all().map_err(persistence)?;
    tmp.persist(path).map_err(|e| persistence(e.error))?;

    info!("Wrote {} rows to {}", chunks.len(), path.display());
    Ok(chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassificationFailure;

    fn chunk(n: usize, text: &str, outcome: Result<&str, ClassificationFailure>) -> ChunkResult {
        ChunkResult {
            chunk: n,
            text: text.to_string(),
            outcome: outcome.map(str::to_string),
            duration_ms: 0,
        }
    }

    #[test]
    fn header_and_rows_in_order() {
        let chunks = vec![
            chunk(1, "Election results", Ok("Politics")),
            chunk(2, "Cup final", Err(ClassificationFailure::EmptyResponse { chunk: 2 })),
        ];
        let mut buf = Vec::new();
        write_rows(&mut buf, &chunks).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "text,topic\nElection results,Politics\nCup final,Error\n"
        );
    }

    #[test]
    fn fields_with_commas_quotes_and_newlines_are_quoted() {
        let chunks = vec![chunk(1, "He said \"yes\",\nthen left", Ok("Politics"))];
        let mut buf = Vec::new();
        write_rows(&mut buf, &chunks).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "text,topic\n\"He said \"\"yes\"\",\nthen left\",Politics\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "text,topic\n");
    }

    #[test]
    fn write_csv_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        let rows = write_csv(&path, &[chunk(1, "Rates rise", Ok("Economics"))]).unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "text,topic\nRates rise,Economics\n"
        );
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_csv(&path, &[]).unwrap_err();
        match err {
            PdfTopicsError::Persistence { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }
}
