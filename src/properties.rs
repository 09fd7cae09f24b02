//! Comment-line filtering for `pom.properties` style files.
//!
//! Maven writes a `#Generated by Maven` / `#<date>` header into these files.
//! Only whole lines can be comments there, so a line filter is enough.

use std::io::{BufWriter, Read, Write};

use crate::charset::Charset;
use crate::error::{Result, StripError};
use crate::stripper::{StripOutcome, Stripper, read_all};

/// What to do when writing a retained line fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Stop at the first failure and return it.
    #[default]
    Abort,
    /// Count the failure and keep writing the remaining lines.
    BestEffort,
}

/// Drops every line whose first character is `marker`.
///
/// Input is always UTF-8. Retained lines are written with a `\n` terminator
/// whatever terminator they had on input.
#[derive(Debug, Clone, Copy)]
pub struct CommentLineFilter {
    marker: char,
    policy: WritePolicy,
}

impl CommentLineFilter {
    pub const CHARSET: Charset = Charset::Utf8;

    pub fn new(marker: char, policy: WritePolicy) -> Self {
        Self { marker, policy }
    }

    pub fn with_policy(policy: WritePolicy) -> Self {
        Self::new('#', policy)
    }
}

impl Default for CommentLineFilter {
    fn default() -> Self {
        Self::with_policy(WritePolicy::Abort)
    }
}

impl Stripper for CommentLineFilter {
    fn name(&self) -> &'static str {
        "pom-properties"
    }

    fn strip(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<StripOutcome> {
        let text = Self::CHARSET.decode(&read_all(input)?)?;

        let mut writer = BufWriter::new(output);
        let mut dropped_lines = 0;
        let mut failed_writes = 0;

        for line in lines(&text) {
            if line.starts_with(self.marker) {
                dropped_lines += 1;
                continue;
            }

            if let Err(err) = writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
            {
                match self.policy {
                    WritePolicy::Abort => return Err(StripError::Stream(err)),
                    WritePolicy::BestEffort => failed_writes += 1,
                }
            }
        }

        writer.flush()?;
        Ok(StripOutcome::Filtered {
            dropped_lines,
            failed_writes,
        })
    }
}

/// Split on `\n`, `\r\n` or a lone `\r`. A final terminator does not start
/// an extra empty line.
fn lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

#[derive(Debug)]
struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find(['\n', '\r']) {
            Some(end) => {
                let line = &self.rest[..end];
                let term = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[end + term..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn filter(f: &CommentLineFilter, input: &str) -> (StripOutcome, String) {
        let mut out = Vec::new();
        let outcome = f.strip(&mut input.as_bytes(), &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn drops_marker_lines_in_order() {
        let input = "#generated 2021\nkey=value\n#another\nk2=v2\n";
        let (outcome, out) = filter(&CommentLineFilter::default(), input);
        assert_eq!(out, "key=value\nk2=v2\n");
        assert_eq!(
            outcome,
            StripOutcome::Filtered {
                dropped_lines: 2,
                failed_writes: 0
            }
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let (_, out) = filter(&CommentLineFilter::default(), "");
        assert_eq!(out, "");
    }

    #[test]
    fn terminators_are_normalized() {
        let (_, out) = filter(&CommentLineFilter::default(), "#c\r\na=1\r\nb=2\rc=3");
        assert_eq!(out, "a=1\nb=2\nc=3\n");
    }

    #[test]
    fn only_first_character_counts() {
        let input = " #indented\nurl=http://x/#frag\n\n#\n";
        let (_, out) = filter(&CommentLineFilter::default(), input);
        assert_eq!(out, " #indented\nurl=http://x/#frag\n\n");
    }

    #[test]
    fn custom_marker() {
        let (_, out) = filter(&CommentLineFilter::new('!', WritePolicy::Abort), "!x\n#y\n");
        assert_eq!(out, "#y\n");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut out = Vec::new();
        let err = CommentLineFilter::default()
            .strip(&mut &b"a=\xff\n"[..], &mut out)
            .unwrap_err();
        assert!(matches!(err, StripError::Encoding(_)));
    }

    /// Accepts up to `budget` bytes, then fails further writes.
    struct FailAfter {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.budget {
                return Err(io::Error::other("sink full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn abort_policy_propagates_write_failure() {
        // An oversized line bypasses the BufWriter buffer and hits the sink directly.
        let long = "v".repeat(16 * 1024);
        let input = format!("a={long}\nb=2\n");
        let mut sink = FailAfter {
            budget: 0,
            written: Vec::new(),
        };
        let err = CommentLineFilter::default()
            .strip(&mut input.as_bytes(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, StripError::Stream(_)));
    }

    #[test]
    fn best_effort_policy_counts_failures_and_continues() {
        let long = "v".repeat(16 * 1024);
        let input = format!("#c\na={long}\nb=2\n");
        let mut sink = FailAfter {
            budget: 64,
            written: Vec::new(),
        };
        let outcome = CommentLineFilter::with_policy(WritePolicy::BestEffort)
            .strip(&mut input.as_bytes(), &mut sink)
            .unwrap();
        assert_eq!(
            outcome,
            StripOutcome::Filtered {
                dropped_lines: 1,
                failed_writes: 1
            }
        );
        // The failed line loses its terminator too; later lines still land.
        assert_eq!(sink.written, b"b=2\n");
    }
}
