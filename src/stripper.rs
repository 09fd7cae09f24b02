use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, StripError};

/// What a stripper did with one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StripOutcome {
    /// Input was not recognised; its bytes were copied unchanged.
    PassedThrough,
    /// Comment spans were removed.
    Stripped,
    /// Marker lines were dropped.
    Filtered {
        dropped_lines: usize,
        failed_writes: usize,
    },
}

/// One normalization stage: read an input, write its canonical form.
///
/// The output is fully replaced, never appended to.
pub trait Stripper {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    fn strip(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<StripOutcome>;

    /// Strip `input` into `output`. Both may be the same path.
    fn strip_file(&self, input: &Path, output: &Path) -> Result<StripOutcome> {
        let stripped = strip_in_memory(self, input)?;
        fs::write(output, &stripped.output).map_err(|e| StripError::io(output, e))?;
        Ok(stripped.outcome)
    }
}

/// A file's bytes before and after one stripper ran over them.
#[derive(Debug)]
pub(crate) struct Stripped {
    pub original: Vec<u8>,
    pub output: Vec<u8>,
    pub outcome: StripOutcome,
}

impl Stripped {
    pub fn changed(&self) -> bool {
        self.output != self.original
    }
}

/// Read `path` fully and strip it into a buffer. Errors carry `path`.
pub(crate) fn strip_in_memory<S: Stripper + ?Sized>(stripper: &S, path: &Path) -> Result<Stripped> {
    let original = fs::read(path).map_err(|e| StripError::io(path, e))?;

    let mut output = Vec::with_capacity(original.len());
    let outcome = stripper
        .strip(&mut original.as_slice(), &mut output)
        .map_err(|e| e.at(path))?;

    Ok(Stripped {
        original,
        output,
        outcome,
    })
}

pub(crate) fn read_all(input: &mut dyn Read) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(bytes)
}
