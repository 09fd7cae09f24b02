//! Strict text codecs for the encodings generated sources are written in.
//!
//! `decode` and `encode` never substitute replacement characters: bytes that
//! are not valid in the chosen charset, or characters it cannot represent, are
//! errors. `decode_lossy` is only for sniffing content that will not be
//! rewritten.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::EncodingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    UsAscii,
    /// ISO-8859-1.
    Latin1,
    Utf16Le,
    Utf16Be,
}

impl Charset {
    /// Canonical label, as accepted by `--charset`.
    pub fn label(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, EncodingError> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| self.malformed(e.valid_up_to())),
            Charset::UsAscii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(self.malformed(offset)),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
            Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Utf16Le | Charset::Utf16Be => self.decode_utf16(bytes),
        }
    }

    /// Decode for inspection only; invalid sequences become U+FFFD.
    pub fn decode_lossy(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            Charset::Utf8 | Charset::UsAscii => String::from_utf8_lossy(bytes),
            Charset::Latin1 => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Utf16Le | Charset::Utf16Be => {
                let units = bytes.chunks_exact(2).map(|pair| self.utf16_unit([pair[0], pair[1]]));
                Cow::Owned(
                    char::decode_utf16(units)
                        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                        .collect(),
                )
            }
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::UsAscii => self.encode_single_byte(text, 0x7f),
            Charset::Latin1 => self.encode_single_byte(text, 0xff),
            Charset::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Charset::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        }
    }

    fn decode_utf16(self, bytes: &[u8]) -> Result<String, EncodingError> {
        if bytes.len() % 2 != 0 {
            return Err(self.malformed(bytes.len() - 1));
        }

        let units = bytes.chunks_exact(2).map(|pair| self.utf16_unit([pair[0], pair[1]]));

        let mut out = String::with_capacity(bytes.len() / 2);
        let mut offset = 0;
        for unit in char::decode_utf16(units) {
            match unit {
                Ok(ch) => {
                    out.push(ch);
                    offset += ch.len_utf16() * 2;
                }
                Err(_) => return Err(self.malformed(offset)),
            }
        }
        Ok(out)
    }

    fn utf16_unit(self, pair: [u8; 2]) -> u16 {
        if self == Charset::Utf16Le {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    }

    fn encode_single_byte(self, text: &str, max: u32) -> Result<Vec<u8>, EncodingError> {
        text.chars()
            .map(|ch| match u8::try_from(u32::from(ch)) {
                Ok(b) if u32::from(b) <= max => Ok(b),
                _ => Err(EncodingError::Unmappable { charset: self, ch }),
            })
            .collect()
    }

    fn malformed(self, offset: usize) -> EncodingError {
        EncodingError::Malformed {
            charset: self,
            offset,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Charset {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        match norm.as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "utf-16le" | "utf16le" => Ok(Charset::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Charset::Utf16Be),
            _ => Err(EncodingError::UnknownCharset(s.to_string())),
        }
    }
}
