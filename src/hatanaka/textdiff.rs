//! Y. Hatanaka lossless TextDiff algorithm

/// [TextDiff] recovers text compressed with the Text diff. algorithm
/// designed by Y. Hatanaka. Compressed text only carries the characters
/// that changed: ' ' means "unchanged" and '&' means "now blank".
/// It is used for the epoch lines and the LLI / SSI flags of Compact RINEX.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDiff {
    buffer: String,
}

impl TextDiff {
    /// Creates a new [TextDiff] kernel, with initial content
    pub fn new(data: &str) -> Self {
        Self {
            buffer: data.to_string(),
        }
    }

    /// Force kernel reset using new content
    pub fn force_init(&mut self, data: &str) {
        self.buffer = data.to_string();
    }

    /// Latest recovered content
    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Decompresses given data. Returns recovered content,
    /// which is as long as the longest of both inputs.
    pub fn decompress(&mut self, data: &str) -> &str {
        let mut recovered = String::with_capacity(self.buffer.len().max(data.len()));
        let mut history = self.buffer.chars();
        let mut new = data.chars();
        loop {
            match (history.next(), new.next()) {
                (None, None) => break,
                (Some(old), None) | (Some(old), Some(' ')) => recovered.push(old),
                (_, Some('&')) | (None, Some(' ')) => recovered.push(' '),
                (_, Some(c)) => recovered.push(c),
            }
        }
        self.buffer = recovered;
        &self.buffer
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn decompression() {
        let mut diff = TextDiff::new("ABCDEFG 12 000 33 XXACQmpLf");

        let compressed: Vec<&str> = vec![
            "         3   1 44 xxACq   F",
            "        4 ",
            " 11 22   x   0 4  y     p  ",
            "              1     ",
            "                   z",
            " ",
            "                           &",
            "&                           ",
            " ",
        ];
        let expected: Vec<&str> = vec![
            "ABCDEFG 13 001 44 xxACqmpLF",
            "ABCDEFG 43 001 44 xxACqmpLF",
            "A11D22G 4x 000 44 yxACqmpLF",
            "A11D22G 4x 000144 yxACqmpLF",
            "A11D22G 4x 000144 yzACqmpLF",
            "A11D22G 4x 000144 yzACqmpLF",
            "A11D22G 4x 000144 yzACqmpLF ",
            " 11D22G 4x 000144 yzACqmpLF ",
            " 11D22G 4x 000144 yzACqmpLF ",
        ];

        for (compressed, expected) in compressed.iter().zip(expected.iter()) {
            assert_eq!(diff.decompress(compressed), *expected);
        }

        diff.force_init(" 21  1  1");
        assert_eq!(diff.value(), " 21  1  1");
    }
    #[test]
    fn flags_decompression() {
        let mut diff = TextDiff::new("0");
        assert_eq!(diff.decompress("1"), "1");
        assert_eq!(diff.decompress(" "), "1");
        assert_eq!(diff.decompress(""), "1");
        assert_eq!(diff.decompress("&"), " ");
        assert_eq!(diff.decompress("5"), "5");
    }
}
