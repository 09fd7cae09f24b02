use std::io::{Read, Write};

use crate::charset::Charset;
use crate::comments::remove_comments;
use crate::detect::SignatureDetector;
use crate::error::Result;
use crate::stripper::{StripOutcome, Stripper, read_all};

/// Removes timestamp comments from Java sources generated by xjc.
///
/// Files without the xjc banner are copied byte for byte, even when they are
/// not valid in `charset`. Recognised files are decoded strictly with
/// `charset`, stripped, and re-encoded with the same charset.
#[derive(Debug, Clone, Copy)]
pub struct XjcSourceStripper {
    charset: Charset,
    detector: SignatureDetector,
}

impl XjcSourceStripper {
    pub fn new(charset: Charset) -> Self {
        Self::with_detector(charset, SignatureDetector::xjc())
    }

    pub fn with_detector(charset: Charset, detector: SignatureDetector) -> Self {
        Self { charset, detector }
    }
}

impl Stripper for XjcSourceStripper {
    fn name(&self) -> &'static str {
        "xjc"
    }

    fn strip(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<StripOutcome> {
        let bytes = read_all(input)?;

        // Files we do not rewrite are never rejected for their encoding.
        if !self.detector.is_target(&self.charset.decode_lossy(&bytes)) {
            output.write_all(&bytes)?;
            output.flush()?;
            return Ok(StripOutcome::PassedThrough);
        }

        let text = self.charset.decode(&bytes)?;
        let stripped = remove_comments(&text);
        output.write_all(&self.charset.encode(&stripped)?)?;
        output.flush()?;
        Ok(StripOutcome::Stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StripError;

    const GENERATED: &str = "//\n// This file was generated by the JavaTM Architecture for XML Binding(JAXB) Reference Implementation\n// Generated on: 2024.01.02 at 03:04:05 PM UTC\n//\n\npackage a;\n\n/** Doc. */\npublic class B { /* t */ }\n";

    fn run(stripper: &XjcSourceStripper, input: &[u8]) -> Result<(StripOutcome, Vec<u8>)> {
        let mut out = Vec::new();
        let outcome = stripper.strip(&mut &input[..], &mut out)?;
        Ok((outcome, out))
    }

    #[test]
    fn generated_file_is_stripped() {
        let (outcome, out) = run(&XjcSourceStripper::new(Charset::Utf8), GENERATED.as_bytes()).unwrap();
        assert_eq!(outcome, StripOutcome::Stripped);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\npackage a;\n\n/** Doc. */\npublic class B {  }\n"
        );
    }

    #[test]
    fn foreign_file_is_copied_byte_for_byte() {
        // Latin-1 bytes that would change under a lossy round trip.
        let input = b"// Generated on 2024\nclass Caf\xe9 {}\n".to_vec();
        let (outcome, out) = run(&XjcSourceStripper::new(Charset::Latin1), &input).unwrap();
        assert_eq!(outcome, StripOutcome::PassedThrough);
        assert_eq!(out, input);
    }

    #[test]
    fn utf16_file_is_re_encoded_in_utf16() {
        let cs = Charset::Utf16Be;
        let input = cs.encode(GENERATED).unwrap();
        let (outcome, out) = run(&XjcSourceStripper::new(cs), &input).unwrap();
        assert_eq!(outcome, StripOutcome::Stripped);
        assert_eq!(
            cs.decode(&out).unwrap(),
            "\npackage a;\n\n/** Doc. */\npublic class B {  }\n"
        );
    }

    #[test]
    fn undecodable_foreign_file_passes_through() {
        let input = b"// hand written\nclass Caf\xe9 {}\n";
        let (outcome, out) = run(&XjcSourceStripper::new(Charset::Utf8), input).unwrap();
        assert_eq!(outcome, StripOutcome::PassedThrough);
        assert_eq!(out, input);
    }

    #[test]
    fn undecodable_generated_file_is_an_encoding_error() {
        let mut input = GENERATED.as_bytes().to_vec();
        input.extend_from_slice(b"class \xff {}\n");
        let err = run(&XjcSourceStripper::new(Charset::Utf8), &input).unwrap_err();
        assert!(matches!(err, StripError::Encoding(_)));
    }

    #[test]
    fn custom_detector_is_honoured() {
        let stripper =
            XjcSourceStripper::with_detector(Charset::Utf8, SignatureDetector::new("@Generated"));
        let (outcome, out) = run(&stripper, b"@Generated // at noon\nclass C {}").unwrap();
        assert_eq!(outcome, StripOutcome::Stripped);
        assert_eq!(out, b"@Generated class C {}");
    }
}
