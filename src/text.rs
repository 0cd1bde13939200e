//! Line-oriented reading for the text vocabulary formats.

use crate::error::{Error, Result};
use std::io::BufRead;
use std::str::FromStr;

/// One non-blank input line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    /// 1-based line number in the source.
    pub number: usize,
    /// Line content without surrounding whitespace.
    pub text: String,
}

impl Line {
    pub fn tokens(&self) -> std::str::SplitWhitespace<'_> {
        self.text.split_whitespace()
    }
}

/// Reader over non-blank lines with single-line lookahead.
///
/// `peek` leaves the line in place, so a caller that does not like what it
/// sees can stop without consuming it.
pub(crate) struct LineReader<R> {
    inner: R,
    line_no: usize,
    pending: Option<Line>,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            pending: None,
            buf: String::new(),
        }
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Line>> {
        if self.pending.is_none() {
            self.pending = self.read_raw()?;
        }
        Ok(self.pending.as_ref())
    }

    /// Consume the next line.
    pub fn next_line(&mut self) -> Result<Option<Line>> {
        match self.pending.take() {
            Some(line) => Ok(Some(line)),
            None => self.read_raw(),
        }
    }

    /// Consume the next line, failing if the input has ended.
    pub fn expect_line(&mut self, what: &str) -> Result<Line> {
        let last = self.line_no;
        self.next_line()?
            .ok_or_else(|| Error::parse(last + 1, format!("unexpected end of input, expected {what}")))
    }

    /// Line number of the last line read from the source.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn read_raw(&mut self) -> Result<Option<Line>> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let text = self.buf.trim();
            if !text.is_empty() {
                return Ok(Some(Line {
                    number: self.line_no,
                    text: text.to_string(),
                }));
            }
        }
    }
}

/// Parse a single token, reporting `line` on failure.
pub(crate) fn parse_token<T: FromStr>(line: usize, token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid {what} '{token}'")))
}

/// Parse every remaining token as a real number.
pub(crate) fn parse_values<'a, I>(line: usize, tokens: I) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|t| parse_token(line, t, "number"))
        .collect()
}

/// Render a vector as whitespace-separated values.
///
/// `f64`'s `Display` is the shortest string that parses back to the same
/// value, so writing then reading is lossless.
pub(crate) fn join_values<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
