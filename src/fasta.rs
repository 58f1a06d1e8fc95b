use std::io;
use std::path::{Path, PathBuf};

use needletail::errors::{ParseError, ParseErrorKind};
use needletail::{parse_fastx_file, parse_fastx_reader, FastxReader};

use crate::error::{Read2ArrayError, Result};
use crate::types::Read;

/// Lazy FASTA reader. Records come out in file order, which fixes each
/// read's ordinal index.
///
/// Parsing is done by needletail, which detects gzip input from the stream
/// and joins multi-line sequences. Sequence bytes are passed through
/// untouched. Headers that are not valid UTF-8 are decoded lossily.
pub struct FastaReader<'a> {
    path: PathBuf,
    // `None` once the input is exhausted or has failed.
    inner: Option<Box<dyn FastxReader + 'a>>,
}

/// Opens a FASTA file, plain or gzipped.
pub fn open_fasta<P: AsRef<Path>>(path: P) -> Result<FastaReader<'static>> {
    let path = path.as_ref();
    match parse_fastx_file(path) {
        Ok(inner) => Ok(FastaReader::with_inner(path, Some(inner))),
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => {
            Ok(FastaReader::with_inner(path, None))
        }
        Err(e) => Err(convert_error(path, e)),
    }
}

/// Reads every record of a FASTA file into memory.
pub fn read_fasta_records<P: AsRef<Path>>(path: P) -> Result<Vec<Read>> {
    open_fasta(path)?.collect()
}

impl<'a> FastaReader<'a> {
    /// Reads FASTA from any byte stream. `path` only labels errors.
    pub fn from_reader<R>(reader: R, path: impl AsRef<Path>) -> Result<Self>
    where
        R: io::Read + Send + 'a,
    {
        let path = path.as_ref();
        match parse_fastx_reader(reader) {
            Ok(inner) => Ok(Self::with_inner(path, Some(inner))),
            Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => Ok(Self::with_inner(path, None)),
            Err(e) => Err(convert_error(path, e)),
        }
    }

    fn with_inner(path: &Path, inner: Option<Box<dyn FastxReader + 'a>>) -> Self {
        Self {
            path: path.to_path_buf(),
            inner,
        }
    }
}

impl Iterator for FastaReader<'_> {
    type Item = Result<Read>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        let item = match inner.next()? {
            Ok(record) => {
                let header_line = String::from_utf8_lossy(record.id()).into_owned();
                let id = header_line
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                Ok(Read {
                    id,
                    header_line,
                    seq: record.seq().into_owned(),
                })
            }
            Err(e) => Err(convert_error(&self.path, e)),
        };
        if item.is_err() {
            // Stop after the first malformed record.
            self.inner = None;
        }
        Some(item)
    }
}

fn convert_error(path: &Path, e: ParseError) -> Read2ArrayError {
    match e.kind {
        ParseErrorKind::Io => Read2ArrayError::io(path, io::Error::other(e.msg)),
        _ => Read2ArrayError::parse(path, e.position.line as usize, e.msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};
    use tempfile::Builder;

    fn parse(text: &str) -> Result<Vec<Read>> {
        FastaReader::from_reader(Cursor::new(text.as_bytes().to_vec()), "test.fa")?.collect()
    }

    #[test]
    fn test_parse_preserves_order() {
        let reads = parse(">r1 first read\nACGT\n>r2\nTTTT\n>r3\nGGCC\n").unwrap();
        let seqs: Vec<&[u8]> = reads.iter().map(|r| r.seq.as_slice()).collect();
        assert_eq!(seqs, [&b"ACGT"[..], &b"TTTT"[..], &b"GGCC"[..]]);
        assert_eq!(reads[0].id, "r1");
        assert_eq!(reads[0].header_line, "r1 first read");
    }

    #[test]
    fn test_parse_multiline() {
        let reads = parse(">r1\nACGT\nACGT\n>r2\nNNAC\n").unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].seq, b"ACGTACGT");
        assert_eq!(reads[1].seq, b"NNAC");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_non_ascii_sequence_bytes_pass_through() {
        let reads = parse(">r1\nACGTÄCGTAC\n").unwrap();
        assert_eq!(reads[0].seq, "ACGTÄCGTAC".as_bytes());
        assert_eq!(reads[0].len(), 11);
    }

    #[test]
    fn test_sequence_before_header_is_parse_error() {
        let err = parse("ACGT\n>r1\nACGT\n").unwrap_err();
        match err {
            Read2ArrayError::Parse { path, .. } => assert_eq!(path, PathBuf::from("test.fa")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reader_is_lazy() {
        let mut reader =
            FastaReader::from_reader(Cursor::new(b">r1\nAC\n>r2\nGT\n".to_vec()), "x.fa").unwrap();
        assert_eq!(reader.next().unwrap().unwrap().seq, b"AC");
        assert_eq!(reader.next().unwrap().unwrap().seq, b"GT");
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_plain_and_gz() -> std::io::Result<()> {
        let mut plain = Builder::new().suffix(".fa").tempfile()?;
        writeln!(plain, ">a\nACGTAC")?;
        plain.flush()?;
        let reads = read_fasta_records(plain.path()).unwrap();
        assert_eq!(reads[0].seq, b"ACGTAC");

        let gz = Builder::new().suffix(".fa.gz").tempfile()?;
        let mut enc = GzEncoder::new(gz.reopen()?, Compression::default());
        enc.write_all(b">a\nACGTAC\n>b\nGG\n")?;
        enc.finish()?;
        let reads = read_fasta_records(gz.path()).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[1].seq, b"GG");
        Ok(())
    }

    #[test]
    fn test_empty_file_yields_no_reads() -> std::io::Result<()> {
        let empty = Builder::new().suffix(".fa").tempfile()?;
        assert!(read_fasta_records(empty.path()).unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = open_fasta("/definitely/not/here.fa").err().unwrap();
        assert!(matches!(err, Read2ArrayError::Io { .. }));
    }
}
