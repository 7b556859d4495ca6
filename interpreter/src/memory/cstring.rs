//! Null-terminated string encoding for `asciiz` data and string syscalls.

/// Encodes an `asciiz` literal: `\n`, `\t` and `\\` escapes become single
/// bytes, the text is UTF-8 encoded and a null terminator is appended.
///
/// Any other backslash sequence is kept verbatim.
pub fn encode_asciiz(literal: &str) -> Vec<u8> {
    let mut unescaped = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    let mut bytes = unescaped.into_bytes();
    bytes.push(0);
    bytes
}

/// Decodes the text stored in `bytes` up to the first null byte (or the end
/// of the slice). Invalid UTF-8 sequences are replaced.
pub fn decode_cstring(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
