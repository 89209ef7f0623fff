//! Decoding of feature files written by [`RecordWriter`](super::RecordWriter).

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::{Result, VectorizerError};
use crate::export::writer::OutputEncoding;
use crate::labels::LabelCode;
use crate::window::FeatureRecord;

/// Iterator over the records of a feature file.
///
/// Every record must hold exactly `feature_dim` values. Binary files are
/// framed with that width; a partial trailing record is reported as
/// [`VectorizerError::TruncatedRecord`].
pub struct RecordReader<R> {
    inner: R,
    encoding: OutputEncoding,
    feature_dim: usize,
    source: PathBuf,
    records_read: usize,
    line: String,
    buffer: Vec<u8>,
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a feature file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        encoding: OutputEncoding,
        feature_dim: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| VectorizerError::io(path, e))?;
        Ok(Self::new(BufReader::new(file), path, encoding, feature_dim))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(
        inner: R,
        source: impl Into<PathBuf>,
        encoding: OutputEncoding,
        feature_dim: usize,
    ) -> Self {
        Self {
            inner,
            encoding,
            feature_dim,
            source: source.into(),
            records_read: 0,
            line: String::new(),
            buffer: Vec::new(),
            finished: false,
        }
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn next_text(&mut self) -> Result<Option<FeatureRecord>> {
        loop {
            self.line.clear();
            let n = self
                .inner
                .read_line(&mut self.line)
                .map_err(|e| VectorizerError::io(&self.source, e))?;
            if n == 0 {
                return Ok(None);
            }
            if !self.line.trim().is_empty() {
                break;
            }
        }

        let line_no = self.records_read + 1;
        let malformed = |reason: String| VectorizerError::MalformedRecord {
            path: self.source.clone(),
            line: line_no,
            reason,
        };

        let mut fields = self.line.split_whitespace();
        let label_field = fields
            .next()
            .ok_or_else(|| malformed("empty record".to_string()))?;
        let label = label_field
            .parse::<LabelCode>()
            .map_err(|_| malformed(format!("invalid label code '{label_field}'")))?;

        let mut features = Vec::with_capacity(self.feature_dim);
        for field in fields {
            let value = field
                .parse::<f64>()
                .map_err(|_| malformed(format!("invalid value '{field}'")))?;
            features.push(value);
        }

        if features.len() != self.feature_dim {
            return Err(malformed(format!(
                "expected {} values, found {}",
                self.feature_dim,
                features.len()
            )));
        }

        Ok(Some(FeatureRecord { label, features }))
    }

    fn next_binary(&mut self) -> Result<Option<FeatureRecord>> {
        let record_size = 4 + 4 * self.feature_dim;
        self.buffer.resize(record_size, 0);

        let filled = read_full(&mut self.inner, &mut self.buffer)
            .map_err(|e| VectorizerError::io(&self.source, e))?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < record_size {
            return Err(VectorizerError::TruncatedRecord {
                path: self.source.clone(),
                record: self.records_read + 1,
            });
        }

        let mut chunks = self.buffer.chunks_exact(4).map(|chunk| {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(chunk);
            bytes
        });
        let label = chunks.next().map(u32::from_le_bytes).unwrap_or_default();
        let features = chunks.map(|bytes| f32::from_le_bytes(bytes) as f64).collect();

        Ok(Some(FeatureRecord { label, features }))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<FeatureRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.encoding {
            OutputEncoding::Text => self.next_text(),
            OutputEncoding::Binary => self.next_binary(),
        };

        match result {
            Ok(Some(record)) => {
                self.records_read += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Read until `buf` is full or EOF; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read every record of a feature file.
pub fn read_records<P: AsRef<Path>>(
    path: P,
    encoding: OutputEncoding,
    feature_dim: usize,
) -> Result<Vec<FeatureRecord>> {
    RecordReader::open(path, encoding, feature_dim)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::RecordWriter;
    use std::io::Cursor;

    fn encode(encoding: OutputEncoding, records: &[FeatureRecord]) -> Vec<u8> {
        let mut writer = RecordWriter::new(Vec::new(), "<memory>", encoding);
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.into_inner().unwrap().unwrap()
    }

    fn decode(encoding: OutputEncoding, bytes: Vec<u8>, dim: usize) -> Result<Vec<FeatureRecord>> {
        RecordReader::new(Cursor::new(bytes), "<memory>", encoding, dim).collect()
    }

    #[test]
    fn test_text_and_binary_decode_to_same_records() {
        let records = vec![
            FeatureRecord::new(0, vec![0.0, 0.5, 1.0, -1.0]),
            FeatureRecord::new(4, vec![0.25, 0.125, 8.0, 3.5]),
        ];

        let text = decode(OutputEncoding::Text, encode(OutputEncoding::Text, &records), 4).unwrap();
        let binary =
            decode(OutputEncoding::Binary, encode(OutputEncoding::Binary, &records), 4).unwrap();

        assert_eq!(text, records);
        assert_eq!(binary, records);
    }

    #[test]
    fn test_binary_values_lose_only_f32_precision() {
        let records = vec![FeatureRecord::new(1, vec![0.418, -0.41242, 1e-7])];
        let decoded =
            decode(OutputEncoding::Binary, encode(OutputEncoding::Binary, &records), 3).unwrap();
        for (got, want) in decoded[0].features.iter().zip(&records[0].features) {
            assert!((got - want).abs() <= want.abs() * 1e-6);
        }
    }

    #[test]
    fn test_truncated_binary_record() {
        let mut bytes = encode(
            OutputEncoding::Binary,
            &[FeatureRecord::new(0, vec![1.0, 2.0]), FeatureRecord::new(1, vec![3.0, 4.0])],
        );
        bytes.truncate(bytes.len() - 3);

        let mut reader = RecordReader::new(Cursor::new(bytes), "<memory>", OutputEncoding::Binary, 2);
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next().unwrap(),
            Err(VectorizerError::TruncatedRecord { record: 2, .. })
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_text_width_mismatch() {
        let err = decode(OutputEncoding::Text, b"0 1 2 3\n".to_vec(), 2).unwrap_err();
        assert!(matches!(err, VectorizerError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_text_bad_label() {
        let err = decode(OutputEncoding::Text, b"x 1 2\n".to_vec(), 2).unwrap_err();
        assert!(err.to_string().contains("invalid label code"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(decode(OutputEncoding::Text, Vec::new(), 5).unwrap().is_empty());
        assert!(decode(OutputEncoding::Binary, Vec::new(), 5).unwrap().is_empty());
    }
}
