//! Content format detection from a short prefix.
//!
//! Three entry points share one priority order. The first unit `{` means
//! JSON, the Smile magic means Smile, `---` means YAML and `<?x` means XML.
//! Otherwise the window is scanned for a `{`. Only [`detect_chars`] also
//! treats a `<` inside the window as XML.

use std::io::{self, Read};

use tracing::debug;

use crate::ContentFormat;

/// How many leading units are inspected at most.
pub const GUESS_HEADER_LENGTH: usize = 20;

/// First three bytes of every Smile document: `:)\n`.
pub const SMILE_MAGIC: [u8; 3] = [b':', b')', b'\n'];

/// Guess the format of an in-memory byte prefix.
pub fn detect(data: &[u8]) -> Option<ContentFormat> {
    let window = &data[..data.len().min(GUESS_HEADER_LENGTH)];
    let format = detect_window(window);
    debug!(?format, len = window.len(), "sniffed bytes");
    format
}

fn detect_window(window: &[u8]) -> Option<ContentFormat> {
    match window.first()? {
        b'{' => return Some(ContentFormat::Json),
        _ if window.starts_with(&SMILE_MAGIC) => return Some(ContentFormat::Smile),
        _ if window.starts_with(b"---") => return Some(ContentFormat::Yaml),
        _ if window.starts_with(b"<?x") => return Some(ContentFormat::Xml),
        _ => {}
    }
    window
        .contains(&b'{')
        .then_some(ContentFormat::Json)
}

/// Guess the format of a character prefix.
pub fn detect_chars(data: &str) -> Option<ContentFormat> {
    let window: Vec<char> = data.chars().take(GUESS_HEADER_LENGTH).collect();
    let smile: [char; 3] = SMILE_MAGIC.map(char::from);
    let format = match window.first()? {
        '{' => Some(ContentFormat::Json),
        _ if window.starts_with(&smile) => Some(ContentFormat::Smile),
        _ if window.starts_with(&['-', '-', '-']) => Some(ContentFormat::Yaml),
        _ if window.starts_with(&['<', '?', 'x']) => Some(ContentFormat::Xml),
        _ => window.iter().find_map(|c| match c {
            '{' => Some(ContentFormat::Json),
            '<' => Some(ContentFormat::Xml),
            _ => None,
        }),
    };
    debug!(?format, len = window.len(), "sniffed chars");
    format
}

/// Guess the format of a live stream, reading one byte at a time.
///
/// The bytes consumed are lost; wrap the stream in a [`RewindableInput`]
/// when the real parser still needs them.
pub fn detect_stream<R: Read + ?Sized>(input: &mut R) -> io::Result<Option<ContentFormat>> {
    let mut seen = Vec::with_capacity(GUESS_HEADER_LENGTH);
    sniff_into(input, &mut seen)
}

fn sniff_into<R: Read + ?Sized>(
    input: &mut R,
    seen: &mut Vec<u8>,
) -> io::Result<Option<ContentFormat>> {
    let Some(first) = read_unit(input, seen)? else {
        return Ok(None);
    };
    if first == b'{' {
        return Ok(Some(ContentFormat::Json));
    }
    let Some(second) = read_unit(input, seen)? else {
        return Ok(None);
    };
    if second == b'{' {
        return Ok(Some(ContentFormat::Json));
    }

    let candidates = [
        (SMILE_MAGIC, ContentFormat::Smile),
        (*b"---", ContentFormat::Yaml),
        (*b"<?x", ContentFormat::Xml),
    ];
    if let Some((magic, format)) = candidates
        .into_iter()
        .find(|(magic, _)| magic[..2] == [first, second])
    {
        let Some(third) = read_unit(input, seen)? else {
            return Ok(None);
        };
        if third == magic[2] {
            return Ok(Some(format));
        }
        if third == b'{' {
            return Ok(Some(ContentFormat::Json));
        }
    }

    while seen.len() < GUESS_HEADER_LENGTH {
        match read_unit(input, seen)? {
            Some(b'{') => return Ok(Some(ContentFormat::Json)),
            Some(_) => {}
            None => return Ok(None),
        }
    }
    Ok(None)
}

fn read_unit<R: Read + ?Sized>(input: &mut R, seen: &mut Vec<u8>) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => {
                seen.push(byte[0]);
                return Ok(Some(byte[0]));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// A reader that can sniff its own prefix and then replay it.
///
/// The bytes inspected by [`RewindableInput::sniff`] are buffered and served
/// again before the rest of the inner stream, so the real tokenizer sees the
/// complete input without the inner reader ever seeking.
pub struct RewindableInput<R> {
    prefix: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R: Read> RewindableInput<R> {
    /// Wrap a stream.
    pub fn new(inner: R) -> Self {
        Self {
            prefix: Vec::with_capacity(GUESS_HEADER_LENGTH),
            pos: 0,
            inner,
        }
    }

    /// Sniff the format, then rewind to the first byte.
    ///
    /// Calling this again after bytes were read through [`Read`] sniffs what
    /// is left of the replay buffer plus fresh input.
    pub fn sniff(&mut self) -> io::Result<Option<ContentFormat>> {
        let mut replay = io::Cursor::new(self.prefix.split_off(self.pos)).chain(&mut self.inner);
        let mut seen = Vec::with_capacity(GUESS_HEADER_LENGTH);
        let format = sniff_into(&mut replay, &mut seen);
        let (cursor, _) = replay.into_inner();
        let leftover = &cursor.get_ref()[cursor.position() as usize..];
        seen.extend_from_slice(leftover);
        self.prefix = seen;
        self.pos = 0;
        let format = format?;
        debug!(?format, "sniffed stream");
        Ok(format)
    }

    /// Unwrap, discarding any bytes still waiting to be replayed.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for RewindableInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let pending = &self.prefix[self.pos..];
            let n = pending.len().min(buf.len());
            buf[..n].copy_from_slice(&pending[..n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}
