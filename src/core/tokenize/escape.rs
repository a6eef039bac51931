//! Decoding of C escape sequences in string literal bodies.
//!
//! Octal and `\x` escapes denote bytes, not characters, so decoding works
//! on the UTF-8 encoding of the literal and converts back at the end.

const NAMED_ESCAPES: &[(u8, u8)] = &[
    (b'a', 0x07),
    (b'b', 0x08),
    (b'f', 0x0c),
    (b'n', b'\n'),
    (b'r', b'\r'),
    (b't', b'\t'),
    (b'v', 0x0b),
];

/// Decode the escape sequences of a literal body as kept by the tokenizer.
pub fn transcode(text: &str) -> String {
    let input = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let c = input[i];
        i += 1;
        if c != b'\\' {
            out.push(c);
            continue;
        }
        let Some(&c) = input.get(i) else {
            break;
        };
        i += 1;
        match c {
            b'\n' => {}
            b'x' | b'u' | b'U' => {
                let start = i;
                while i < input.len() && input[i].is_ascii_hexdigit() {
                    i += 1;
                }
                let value = std::str::from_utf8(&input[start..i])
                    .ok()
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .unwrap_or(0);
                if c == b'x' {
                    out.push(value as u8);
                } else {
                    let ch = char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER);
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
            b'0'..=b'7' => {
                let mut value = u32::from(c - b'0');
                let mut digits = 1;
                while digits < 3 && i < input.len() && (b'0'..=b'7').contains(&input[i]) {
                    value = value * 8 + u32::from(input[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value as u8);
            }
            _ => {
                let decoded = NAMED_ESCAPES
                    .iter()
                    .find(|(name, _)| *name == c)
                    .map_or(c, |(_, byte)| *byte);
                out.push(decoded);
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
