//! WinAnsi (Windows-1252) encoding for the standard Type1 fonts.

/// Code points in 0x80..=0x9F that Windows-1252 assigns to typographic characters.
#[rustfmt::skip]
const HIGH_CONTROL_RANGE: [(char, u8); 27] = [
    ('€', 0x80), ('‚', 0x82), ('ƒ', 0x83), ('„', 0x84), ('…', 0x85), ('†', 0x86),
    ('‡', 0x87), ('ˆ', 0x88), ('‰', 0x89), ('Š', 0x8A), ('‹', 0x8B), ('Œ', 0x8C),
    ('Ž', 0x8E), ('‘', 0x91), ('’', 0x92), ('“', 0x93), ('”', 0x94), ('•', 0x95),
    ('–', 0x96), ('—', 0x97), ('˜', 0x98), ('™', 0x99), ('š', 0x9A), ('›', 0x9B),
    ('œ', 0x9C), ('ž', 0x9E), ('Ÿ', 0x9F),
];

/// Returns the WinAnsi byte for a printable character, or `None` if the font cannot show it.
///
/// Control characters are never encodable; callers replace tabs before encoding.
pub fn encode_char(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => HIGH_CONTROL_RANGE
            .iter()
            .find(|(candidate, _)| *candidate == c)
            .map(|(_, byte)| *byte),
    }
}

/// Encodes a whole line. Returns the first offending character on failure.
pub fn encode_str(s: &str) -> Result<Vec<u8>, char> {
    s.chars().map(|c| encode_char(c).ok_or(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(encode_str("Python, SQL (5+ yrs)").unwrap(), b"Python, SQL (5+ yrs)".to_vec());
    }

    #[test]
    fn test_latin1_and_typographic_punctuation() {
        assert_eq!(encode_char('é'), Some(0xE9));
        assert_eq!(encode_char('•'), Some(0x95));
        assert_eq!(encode_char('–'), Some(0x96));
        assert_eq!(encode_char('’'), Some(0x92));
        assert_eq!(encode_char('€'), Some(0x80));
    }

    #[test]
    fn test_unrepresentable_characters_rejected() {
        assert_eq!(encode_char('漢'), None);
        assert_eq!(encode_char('🚀'), None);
        assert_eq!(encode_char('\u{7}'), None);
        assert_eq!(encode_char('\t'), None);
        assert_eq!(encode_str("ok 🚀 not ok"), Err('🚀'));
    }
}
