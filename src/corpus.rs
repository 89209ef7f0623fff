//! CoNLL-style corpus reading.
//!
//! One token per line, whitespace-separated columns:
//!
//! ```text
//! -DOCSTART- -X- O O
//!
//! EU NNP I-NP I-ORG
//! rejects VBZ I-VP O
//! German JJ I-NP I-MISC
//! ```
//!
//! Column 0 is the surface token and column 3 the entity label by default;
//! other columns are ignored. Blank lines are skipped. They do not start a
//! new window: the windower sees one continuous token stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Result, VectorizerError};

/// Column layout of a corpus line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column holding the surface token.
    pub token_column: usize,

    /// Column holding the label.
    pub label_column: usize,
}

impl ColumnLayout {
    pub fn new(token_column: usize, label_column: usize) -> Self {
        Self {
            token_column,
            label_column,
        }
    }

    /// Fields a line needs to provide both columns.
    #[inline]
    pub fn required_fields(&self) -> usize {
        self.token_column.max(self.label_column) + 1
    }
}

impl Default for ColumnLayout {
    /// CoNLL-2003: token, POS, chunk, NER.
    fn default() -> Self {
        Self::new(0, 3)
    }
}

/// A token line of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusToken {
    /// 1-based line number in the source.
    pub line: usize,

    /// Surface form, as written in the corpus.
    pub token: String,

    /// Label string.
    pub label: String,
}

/// Iterator over the token lines of a corpus.
///
/// Yields an error for an unreadable or malformed line and should not be
/// polled again afterwards.
pub struct CorpusReader<R> {
    lines: std::io::Lines<R>,
    source: PathBuf,
    layout: ColumnLayout,
    line_no: usize,
    blank_lines: usize,
}

impl CorpusReader<BufReader<File>> {
    /// Open a corpus file.
    pub fn open<P: AsRef<Path>>(path: P, layout: ColumnLayout) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| VectorizerError::io(path, e))?;
        Ok(Self::new(BufReader::new(file), path, layout))
    }
}

impl<R: BufRead> CorpusReader<R> {
    /// Wrap a buffered reader; `source` names the input in error messages.
    pub fn new(reader: R, source: impl Into<PathBuf>, layout: ColumnLayout) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            layout,
            line_no: 0,
            blank_lines: 0,
        }
    }

    /// Blank lines skipped so far.
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    /// Lines read so far, blank or not.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn parse(&self, line: &str) -> Result<CorpusToken> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let required = self.layout.required_fields();
        if fields.len() < required {
            return Err(VectorizerError::MalformedCorpusLine {
                path: self.source.clone(),
                line: self.line_no,
                required,
                found: fields.len(),
            });
        }

        Ok(CorpusToken {
            line: self.line_no,
            token: fields[self.layout.token_column].to_string(),
            label: fields[self.layout.label_column].to_string(),
        })
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<CorpusToken>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(VectorizerError::io(&self.source, e))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                self.blank_lines += 1;
                continue;
            }

            return Some(self.parse(&line));
        }
    }
}
