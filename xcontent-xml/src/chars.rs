//! XML 1.1 character classes.
//!
//! One flag byte per BMP code point, computed at compile time. Code points
//! above the BMP are classified by range in the predicates.

const VALID: u8 = 0x01;
const SPACE: u8 = 0x02;
const NAME_START: u8 = 0x04;
const NAME: u8 = 0x08;
const CONTROL: u8 = 0x10;
const CONTENT: u8 = 0x20;
const NCNAME_START: u8 = 0x40;
const NCNAME: u8 = 0x80;

const CTRL: u8 = VALID | CONTROL;
const WS: u8 = VALID | SPACE;
const WS_CONTENT: u8 = VALID | SPACE | CONTENT;
const TEXT: u8 = VALID | CONTENT;
const LETTER: u8 = VALID | CONTENT | NAME_START | NAME | NCNAME_START | NCNAME;
const DIGIT: u8 = VALID | CONTENT | NAME | NCNAME;
const COLON: u8 = VALID | CONTENT | NAME_START | NAME;

/// `(first, last, flags)`, inclusive, in ascending order. Anything not
/// listed (NUL, surrogates, U+FFFE, U+FFFF) is not an XML 1.1 character.
const RANGES: &[(u16, u16, u8)] = &[
    (0x0001, 0x0008, CTRL),
    (0x0009, 0x0009, WS_CONTENT),
    (0x000A, 0x000A, WS),
    (0x000B, 0x000C, CTRL),
    (0x000D, 0x000D, WS),
    (0x000E, 0x001F, CTRL),
    (0x0020, 0x0020, WS_CONTENT),
    (0x0021, 0x0025, TEXT),
    (0x0026, 0x0026, VALID),
    (0x0027, 0x002C, TEXT),
    (0x002D, 0x002E, DIGIT),
    (0x002F, 0x002F, TEXT),
    (0x0030, 0x0039, DIGIT),
    (0x003A, 0x003A, COLON),
    (0x003B, 0x003B, TEXT),
    (0x003C, 0x003C, VALID),
    (0x003D, 0x0040, TEXT),
    (0x0041, 0x005A, LETTER),
    (0x005B, 0x005C, TEXT),
    (0x005D, 0x005D, VALID),
    (0x005E, 0x005E, TEXT),
    (0x005F, 0x005F, LETTER),
    (0x0060, 0x0060, TEXT),
    (0x0061, 0x007A, LETTER),
    (0x007B, 0x007E, TEXT),
    (0x007F, 0x0084, CTRL),
    (0x0085, 0x0085, WS_CONTENT),
    (0x0086, 0x009F, CTRL),
    (0x00A0, 0x00B6, TEXT),
    (0x00B7, 0x00B7, DIGIT),
    (0x00B8, 0x00BF, TEXT),
    (0x00C0, 0x00D6, LETTER),
    (0x00D7, 0x00D7, TEXT),
    (0x00D8, 0x00F6, LETTER),
    (0x00F7, 0x00F7, TEXT),
    (0x00F8, 0x02FF, LETTER),
    (0x0300, 0x036F, DIGIT),
    (0x0370, 0x037D, LETTER),
    (0x037E, 0x037E, TEXT),
    (0x037F, 0x1FFF, LETTER),
    (0x2000, 0x200B, TEXT),
    (0x200C, 0x200D, LETTER),
    (0x200E, 0x2027, TEXT),
    (0x2028, 0x2028, WS_CONTENT),
    (0x2029, 0x203E, TEXT),
    (0x203F, 0x2040, DIGIT),
    (0x2041, 0x206F, TEXT),
    (0x2070, 0x218F, LETTER),
    (0x2190, 0x2BFF, TEXT),
    (0x2C00, 0x2FEF, LETTER),
    (0x2FF0, 0x3000, TEXT),
    (0x3001, 0xD7FF, LETTER),
    (0xE000, 0xF8FF, TEXT),
    (0xF900, 0xFDCF, LETTER),
    (0xFDD0, 0xFDEF, TEXT),
    (0xFDF0, 0xFFFD, LETTER),
];

static TABLE: [u8; 1 << 16] = build_table();

const fn build_table() -> [u8; 1 << 16] {
    let mut table = [0u8; 1 << 16];
    let mut r = 0;
    while r < RANGES.len() {
        let (first, last, flags) = RANGES[r];
        let mut c = first as usize;
        while c <= last as usize {
            table[c] = flags;
            c += 1;
        }
        r += 1;
    }
    table
}

#[inline]
fn flags(c: u32) -> u8 {
    if c < 0x10000 { TABLE[c as usize] } else { 0 }
}

#[inline]
const fn is_supplementary_name(c: u32) -> bool {
    c >= 0x10000 && c < 0xF0000
}

/// Any character allowed in an XML 1.1 document, control characters included.
pub fn is_valid(c: u32) -> bool {
    flags(c) & VALID != 0 || (0x10000..=0x10FFFF).contains(&c)
}

/// XML whitespace, including NEL and LINE SEPARATOR.
pub fn is_space(c: u32) -> bool {
    flags(c) & SPACE != 0
}

/// Allowed unescaped in character content.
pub fn is_content(c: u32) -> bool {
    flags(c) & CONTENT != 0 || (0x10000..=0x10FFFF).contains(&c)
}

/// Restricted characters that must be written as character references.
pub fn is_control(c: u32) -> bool {
    flags(c) & CONTROL != 0
}

/// May start a Name.
pub fn is_name_start(c: u32) -> bool {
    flags(c) & NAME_START != 0 || is_supplementary_name(c)
}

/// May continue a Name.
pub fn is_name(c: u32) -> bool {
    flags(c) & NAME != 0 || is_supplementary_name(c)
}

/// May start an NCName (a Name start other than `:`).
pub fn is_ncname_start(c: u32) -> bool {
    flags(c) & NCNAME_START != 0 || is_supplementary_name(c)
}

/// May continue an NCName.
pub fn is_ncname(c: u32) -> bool {
    flags(c) & NCNAME != 0 || is_supplementary_name(c)
}

fn check(s: &str, start: fn(u32) -> bool, rest: fn(u32) -> bool) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if start(first as u32) => chars.all(|c| rest(c as u32)),
        _ => false,
    }
}

/// Whether `s` is a legal XML 1.1 Name (colons allowed).
pub fn is_valid_name(s: &str) -> bool {
    check(s, is_name_start, is_name)
}

/// Whether `s` is a legal XML 1.1 NCName.
pub fn is_valid_ncname(s: &str) -> bool {
    check(s, is_ncname_start, is_ncname)
}

/// Whether `s` is a legal XML 1.1 Nmtoken.
pub fn is_valid_nmtoken(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_name(c as u32))
}
