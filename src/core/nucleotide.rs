//! Nucleotide symbols and the DNA to RNA transcription convention.
//!
//! Both the reference and the called bases of every read are compared in
//! RNA space: every thymine (`T`) is read as a uracil (`U`).

/// The symbol that stands in for anything that is not an ASCII character.
pub const UNKNOWN: char = '?';

/// Transcribes a single nucleotide symbol.
///
/// Lowercase symbols are upper-cased before transcription. Symbols outside of
/// the nucleotide alphabet are passed through unchanged (after upper-casing).
///
/// # Examples
///
/// ```
/// use eventarray::core::nucleotide::transcribe;
///
/// assert_eq!(transcribe('T'), 'U');
/// assert_eq!(transcribe('t'), 'U');
/// assert_eq!(transcribe('g'), 'G');
/// assert_eq!(transcribe('N'), 'N');
/// ```
pub fn transcribe(symbol: char) -> char {
    match symbol.to_ascii_uppercase() {
        'T' => 'U',
        c => c,
    }
}

/// Transcribes a sequence of raw base symbols and appends them to `buffer`.
///
/// Each byte is treated as a single ASCII symbol, which is how base calls are
/// stored in per-read event tables. Bytes outside of ASCII are appended as
/// [`UNKNOWN`], so the buffer grows by exactly one byte per symbol.
///
/// # Examples
///
/// ```
/// use eventarray::core::nucleotide::transcribe_bytes_into;
///
/// let mut buffer = String::new();
/// transcribe_bytes_into(b"GTAC", &mut buffer);
/// assert_eq!(buffer, "GUAC");
///
/// buffer.clear();
/// transcribe_bytes_into(&[b'G', 0xE9, b'C'], &mut buffer);
/// assert_eq!(buffer, "G?C");
/// ```
pub fn transcribe_bytes_into(symbols: &[u8], buffer: &mut String) {
    buffer.reserve(symbols.len());
    buffer.extend(symbols.iter().map(|b| match b.is_ascii() {
        true => transcribe(char::from(*b)),
        false => UNKNOWN,
    }));
}

/// Transcribes a textual sequence and appends it to `buffer`.
///
/// Characters outside of ASCII are appended as [`UNKNOWN`].
pub fn transcribe_str_into(sequence: &str, buffer: &mut String) {
    buffer.reserve(sequence.len());
    buffer.extend(sequence.chars().map(|c| match c.is_ascii() {
        true => transcribe(c),
        false => UNKNOWN,
    }));
}
