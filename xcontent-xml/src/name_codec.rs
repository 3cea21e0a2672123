//! Reversible escaping of arbitrary field names into XML names.
//!
//! A UTF-16 code unit that cannot appear at its position is replaced by
//! `_xHHHH_` (four lowercase hex digits). A literal `_` that would otherwise
//! read back as the start of such a token is escaped the same way, so
//! [`decode`] always restores the input exactly.
//!
//! Characters outside the BMP are escaped as two tokens, one per surrogate.

use std::borrow::Cow;

use crate::chars;

const ESCAPE_LEN: usize = 7;
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Turn `name` into a legal XML name.
///
/// Names that already are legal and contain no `_x` come back borrowed.
/// The empty string is returned as is.
pub fn encode(name: &str) -> Cow<'_, str> {
    if name.is_empty() || (chars::is_valid_name(name) && !name.contains("_x")) {
        return Cow::Borrowed(name);
    }

    let units: Vec<u16> = name.encode_utf16().collect();
    let mut out: Vec<u16> = Vec::with_capacity(units.len() + ESCAPE_LEN);
    for (i, &unit) in units.iter().enumerate() {
        let allowed = if i == 0 {
            chars::is_ncname_start(u32::from(unit))
        } else {
            chars::is_ncname(u32::from(unit))
        };
        if !allowed {
            push_escape(&mut out, unit);
        } else if reads_as_escape(&units, i) {
            push_escape(&mut out, u16::from(b'_'));
        } else {
            out.push(unit);
        }
    }
    Cow::Owned(String::from_utf16_lossy(&out))
}

/// Escape the units of an already encoded name part that are not allowed in
/// an NCName. Underscores are left alone.
pub(crate) fn escape_ncname(part: &str) -> Cow<'_, str> {
    if chars::is_valid_ncname(part) {
        return Cow::Borrowed(part);
    }
    let mut out: Vec<u16> = Vec::with_capacity(part.len() + ESCAPE_LEN);
    for (i, unit) in part.encode_utf16().enumerate() {
        let allowed = if i == 0 {
            chars::is_ncname_start(u32::from(unit))
        } else {
            chars::is_ncname(u32::from(unit))
        };
        if allowed {
            out.push(unit);
        } else {
            push_escape(&mut out, unit);
        }
    }
    Cow::Owned(String::from_utf16_lossy(&out))
}

/// Undo [`encode`].
///
/// Every `_xHHHH_` token (either hex case) becomes the code unit it names.
/// Tokens that decode to an unpaired surrogate become U+FFFD.
pub fn decode(name: &str) -> Cow<'_, str> {
    if name.len() < ESCAPE_LEN || !name.contains("_x") {
        return Cow::Borrowed(name);
    }

    let units: Vec<u16> = name.encode_utf16().collect();
    let mut out: Vec<u16> = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if matches_escape(&units, i) {
            let code = units[i + 2..i + 6]
                .iter()
                .fold(0u16, |acc, &u| (acc << 4) | hex_value(u).unwrap_or(0));
            out.push(code);
            i += ESCAPE_LEN;
        } else {
            out.push(units[i]);
            i += 1;
        }
    }
    Cow::Owned(String::from_utf16_lossy(&out))
}

fn matches_escape(units: &[u16], at: usize) -> bool {
    match units.get(at..at + ESCAPE_LEN) {
        Some(token) => {
            token[0] == u16::from(b'_')
                && token[1] == u16::from(b'x')
                && token[2..6].iter().all(|&u| hex_value(u).is_some())
                && token[6] == u16::from(b'_')
        }
        None => false,
    }
}

/// Whether the `_` at `at` would start an escape token in the encoded
/// output. The closing `_` may also come from escaping the unit there.
fn reads_as_escape(units: &[u16], at: usize) -> bool {
    let Some(&closing) = units.get(at + ESCAPE_LEN - 1) else {
        return false;
    };
    units[at] == u16::from(b'_')
        && units[at + 1] == u16::from(b'x')
        && units[at + 2..at + 6].iter().all(|&u| hex_value(u).is_some())
        && (closing == u16::from(b'_') || !chars::is_ncname(u32::from(closing)))
}

fn hex_value(unit: u16) -> Option<u16> {
    let c = char::from_u32(u32::from(unit))?;
    c.to_digit(16).map(|d| d as u16)
}

fn push_escape(out: &mut Vec<u16>, unit: u16) {
    out.extend_from_slice(&[u16::from(b'_'), u16::from(b'x')]);
    for shift in [12, 8, 4, 0] {
        out.push(u16::from(HEX[usize::from((unit >> shift) & 0xF)]));
    }
    out.push(u16::from(b'_'));
}
