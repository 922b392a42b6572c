//! Streaming reader for header-led tab-separated files

use std::io::BufRead;

use crate::decoder::{RowDecoder, TypedRecord};
use crate::error::{IngestError, Result};
use crate::schema::Schema;

/// Yields `(line_number, record)` for every data line of one file
///
/// Line numbers are 1-based physical lines, so the first data line is 2.
/// Errors carry the failing line number.
pub struct RecordReader<R> {
    input: R,
    decoder: RowDecoder,
    line: u64,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Read the header line and build the decoder for the rest of the file
    ///
    /// # Errors
    /// [`IngestError::MissingHeader`] for an empty input, or
    /// [`IngestError::UnknownColumn`] (at line 1) for an undeclared header name.
    pub fn new(mut input: R, schema: &Schema) -> Result<Self> {
        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            return Err(IngestError::MissingHeader);
        }
        let decoder = RowDecoder::from_header_line(&buf, schema).map_err(|e| e.at_line(1))?;

        Ok(Self {
            input,
            decoder,
            line: 1,
            buf,
        })
    }

    pub fn decoder(&self) -> &RowDecoder {
        &self.decoder
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<(u64, TypedRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        let line = self.line + 1;
        match self.input.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line = line;
                Some(
                    self.decoder
                        .decode(&self.buf)
                        .map(|record| (line, record))
                        .map_err(|e| e.at_line(line)),
                )
            }
            Err(e) => Some(Err(IngestError::from(e).at_line(line))),
        }
    }
}
