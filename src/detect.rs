/// Banner line xjc writes at the top of every source it generates.
pub const XJC_SIGNATURE: &str = "JavaTM Architecture for XML Binding";

/// Decides whether a decoded file came from a particular generator.
///
/// Matching is an exact, case-sensitive substring test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureDetector {
    signature: &'static str,
}

impl SignatureDetector {
    pub const fn new(signature: &'static str) -> Self {
        Self { signature }
    }

    pub const fn xjc() -> Self {
        Self::new(XJC_SIGNATURE)
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn is_target(&self, text: &str) -> bool {
        text.contains(self.signature)
    }
}

impl Default for SignatureDetector {
    fn default() -> Self {
        Self::xjc()
    }
}
