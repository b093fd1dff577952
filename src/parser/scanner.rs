//! Scanner
//!
//! Tokenizes a character stream into [`Event`]s. [`scan`] is a pure
//! function over the unconsumed suffix of the input; [`Scanner`] wraps it
//! with a pending tail so a sequence split across `feed` calls is decoded
//! once the rest arrives.
//!
//! Grammar handled:
//! - C0 controls, DEL and C1 controls (as [`ControlChar`])
//! - CSI: `ESC [ [marker] params [intermediates] final`
//! - OSC: `ESC ] code ; data` terminated by BEL or ST
//! - DCS: `ESC P ... ST`
//! - SOS/PM/APC: `ESC X|^|_ ... ST`, reported as [`Event::Unknown`]
//! - single-character escapes and `ESC intermediates final`

use super::event::{ControlChar, CsiSequence, EscapeKind, Event, OscCommand, MAX_CSI_PARAMS};

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;
/// C1 String Terminator as a Unicode scalar
const ST_C1: char = '\u{9c}';

/// Largest pending tail kept between calls before it is flushed as
/// [`Event::Unknown`]
pub const MAX_PENDING: usize = 64 * 1024;

/// Result of scanning the front of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// An event and the number of bytes it consumed
    Event(Event, usize),
    /// The input ends inside a sequence; nothing was consumed
    Incomplete,
    /// The input is empty
    End,
}

/// Scan the next event from the front of `input`
pub fn scan(input: &str) -> Scan {
    let Some(first) = input.chars().next() else {
        return Scan::End;
    };

    if first == '\x1b' {
        return scan_escape(input);
    }

    match ControlChar::from_char(first) {
        Some(ctrl) => Scan::Event(Event::Control(ctrl), first.len_utf8()),
        None => Scan::Event(Event::Text(first), first.len_utf8()),
    }
}

fn scan_escape(input: &str) -> Scan {
    let bytes = input.as_bytes();
    let Some(&next) = bytes.get(1) else {
        return Scan::Incomplete;
    };

    match next {
        b'[' => scan_csi(input),
        b']' => scan_osc(input),
        b'P' => match find_string_end(input, 2, false) {
            StringEnd::Found { body_end, consumed } => {
                Scan::Event(Event::Dcs(input[2..body_end].to_string()), consumed)
            }
            StringEnd::Incomplete => Scan::Incomplete,
        },
        b'X' | b'^' | b'_' => match find_string_end(input, 2, false) {
            StringEnd::Found { consumed, .. } => {
                Scan::Event(Event::Unknown(input[..consumed].to_string()), consumed)
            }
            StringEnd::Incomplete => Scan::Incomplete,
        },
        0x20..=0x2f => {
            // ESC intermediates final, e.g. charset designation `ESC ( B`
            let mut pos = 2;
            while let Some(&b) = bytes.get(pos) {
                match b {
                    0x20..=0x2f => pos += 1,
                    0x30..=0x7e => {
                        return Scan::Event(
                            Event::Unknown(input[..=pos].to_string()),
                            pos + 1,
                        );
                    }
                    _ => return Scan::Event(Event::Unknown(input[..pos].to_string()), pos),
                }
            }
            Scan::Incomplete
        }
        0x30..=0x7e => {
            let event = match EscapeKind::from_char(next as char) {
                Some(kind) => Event::Escape(kind),
                None => Event::Unknown(input[..2].to_string()),
            };
            Scan::Event(event, 2)
        }
        // ESC followed by a control, another ESC or non-ASCII: drop the ESC
        // and let the next byte start a fresh token
        _ => Scan::Event(Event::Unknown("\x1b".to_string()), 1),
    }
}

fn scan_csi(input: &str) -> Scan {
    let bytes = input.as_bytes();
    let mut pos = 2;
    let mut csi = CsiSequence::new('\0');

    if let Some(&b) = bytes.get(pos) {
        if matches!(b, b'?' | b'>' | b'<' | b'=') {
            csi.marker = Some(b as char);
            pos += 1;
        }
    }

    let mut current: u16 = 0;
    let mut has_param = false;
    let mut malformed = false;

    // Parameters
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'0'..=b'9' => {
                current = current.saturating_mul(10).saturating_add(u16::from(b - b'0'));
                has_param = true;
            }
            // Sub-parameter separators are treated like `;`
            b';' | b':' => {
                push_param(&mut csi.params, current);
                current = 0;
                has_param = true;
            }
            0x3c..=0x3f => malformed = true,
            _ => break,
        }
        pos += 1;
    }
    if has_param {
        push_param(&mut csi.params, current);
    }

    // Intermediates and final byte
    while let Some(&b) = bytes.get(pos) {
        match b {
            0x20..=0x2f => csi.intermediates.push(b as char),
            0x30..=0x3f => malformed = true,
            0x40..=0x7e => {
                let consumed = pos + 1;
                if malformed {
                    return Scan::Event(Event::Unknown(input[..consumed].to_string()), consumed);
                }
                csi.command = b as char;
                return Scan::Event(Event::Csi(csi), consumed);
            }
            // Control, ESC or non-ASCII aborts the sequence; the byte that
            // aborted it is scanned on its own next time
            _ => return Scan::Event(Event::Unknown(input[..pos].to_string()), pos),
        }
        pos += 1;
    }

    Scan::Incomplete
}

fn push_param(params: &mut Vec<u16>, value: u16) {
    if params.len() < MAX_CSI_PARAMS {
        params.push(value);
    }
}

fn scan_osc(input: &str) -> Scan {
    let (body_end, consumed) = match find_string_end(input, 2, true) {
        StringEnd::Found { body_end, consumed } => (body_end, consumed),
        StringEnd::Incomplete => return Scan::Incomplete,
    };

    let body = &input[2..body_end];
    let (code, data) = match body.split_once(';') {
        Some((code, data)) => (code, data),
        None => (body, ""),
    };

    match code.parse::<u16>() {
        Ok(code) => Scan::Event(
            Event::Osc(OscCommand {
                code,
                data: data.to_string(),
            }),
            consumed,
        ),
        Err(_) => Scan::Event(Event::Unknown(input[..consumed].to_string()), consumed),
    }
}

enum StringEnd {
    /// Payload ends at `body_end`; the terminator ends at `consumed`
    Found { body_end: usize, consumed: usize },
    Incomplete,
}

/// Find the end of a control string starting at byte `start`.
///
/// Terminators are ST (`ESC \` or U+009C) and, when `allow_bel` is set,
/// BEL. An ESC followed by anything else ends the string without being
/// consumed.
fn find_string_end(input: &str, start: usize, allow_bel: bool) -> StringEnd {
    let bytes = input.as_bytes();
    for (offset, ch) in input[start..].char_indices() {
        let pos = start + offset;
        match ch {
            '\x07' if allow_bel => {
                return StringEnd::Found {
                    body_end: pos,
                    consumed: pos + 1,
                };
            }
            ST_C1 => {
                return StringEnd::Found {
                    body_end: pos,
                    consumed: pos + ch.len_utf8(),
                };
            }
            '\x1b' => {
                return match bytes.get(pos + 1) {
                    Some(b'\\') => StringEnd::Found {
                        body_end: pos,
                        consumed: pos + 2,
                    },
                    Some(_) => StringEnd::Found {
                        body_end: pos,
                        consumed: pos,
                    },
                    None => StringEnd::Incomplete,
                };
            }
            _ => {}
        }
    }
    StringEnd::Incomplete
}

/// Report whether `input`, a tail that [`scan`] found incomplete, is still
/// incomplete after more text was appended. Bytes before `from` were
/// already examined and are not looked at again.
fn still_incomplete(input: &str, from: usize) -> bool {
    let bytes = input.as_bytes();
    let Some(&kind) = bytes.get(1) else {
        return true;
    };
    let from = from.max(2);
    match kind {
        b'[' => bytes[from..].iter().all(|b| (0x20..=0x3f).contains(b)),
        b']' => matches!(find_string_end(input, from, true), StringEnd::Incomplete),
        b'P' | b'X' | b'^' | b'_' => {
            matches!(find_string_end(input, from, false), StringEnd::Incomplete)
        }
        0x20..=0x2f => bytes[from..].iter().all(|b| (0x20..=0x2f).contains(b)),
        _ => false,
    }
}

/// Where to resume checking an incomplete tail. A trailing ESC may still
/// become `ESC \`, so it is looked at again.
fn resume_point(tail: &str) -> usize {
    if tail.ends_with('\x1b') {
        tail.len() - 1
    } else {
        tail.len()
    }
}

/// The rest of a sequence whose oversize head was already flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discard {
    /// CSI parameters and intermediates up to the final byte
    Csi,
    /// `ESC` intermediates up to the final byte
    Escape,
    /// Control string payload up to its terminator
    String { allow_bel: bool },
}

impl Discard {
    fn of(tail: &str) -> Option<Self> {
        match tail.as_bytes().get(1)? {
            b'[' => Some(Discard::Csi),
            b']' => Some(Discard::String { allow_bel: true }),
            b'P' | b'X' | b'^' | b'_' => Some(Discard::String { allow_bel: false }),
            0x20..=0x2f => Some(Discard::Escape),
            _ => None,
        }
    }

    /// Whether `b` belongs to the body of a CSI or escape sequence
    fn continues(self, b: u8) -> bool {
        match self {
            Discard::Csi => (0x20..=0x3f).contains(&b),
            Discard::Escape => (0x20..=0x2f).contains(&b),
            Discard::String { .. } => true,
        }
    }

    /// Whether `b` is the final byte of a CSI or escape sequence
    fn finishes(self, b: u8) -> bool {
        match self {
            Discard::Csi => (0x40..=0x7e).contains(&b),
            Discard::Escape => (0x30..=0x7e).contains(&b),
            Discard::String { .. } => false,
        }
    }
}

/// Streaming scanner holding an incomplete trailing sequence between calls
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    pending: String,
    /// Bytes of `pending` already known not to complete it
    checked: usize,
    discard: Option<Discard>,
}

impl Scanner {
    /// Create a new scanner with an empty tail
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a chunk and return all complete events
    pub fn feed(&mut self, text: &str) -> Vec<Event> {
        let mut events = Vec::new();
        self.feed_with(text, |event| events.push(event));
        events
    }

    /// Scan a chunk, passing each complete event to `sink`
    pub fn feed_with<F: FnMut(Event)>(&mut self, text: &str, mut sink: F) {
        let text = self.skip_discarded(text);

        if self.pending.is_empty() {
            self.scan_all(text, &mut sink);
            return;
        }

        self.pending.push_str(text);
        if still_incomplete(&self.pending, self.checked) {
            self.checked = resume_point(&self.pending);
            if self.pending.len() > MAX_PENDING {
                let tail = std::mem::take(&mut self.pending);
                self.discard_tail(&tail, &mut sink);
            }
            return;
        }

        let input = std::mem::take(&mut self.pending);
        self.checked = 0;
        self.scan_all(&input, &mut sink);
    }

    fn scan_all<F: FnMut(Event)>(&mut self, input: &str, sink: &mut F) {
        let mut pos = 0;
        loop {
            match scan(&input[pos..]) {
                Scan::Event(event, consumed) => {
                    tracing::trace!(?event, "scanned");
                    sink(event);
                    pos += consumed;
                }
                Scan::Incomplete => {
                    let tail = &input[pos..];
                    if tail.len() > MAX_PENDING {
                        self.discard_tail(tail, sink);
                    } else {
                        self.pending.push_str(tail);
                        self.checked = resume_point(tail);
                    }
                    break;
                }
                Scan::End => break,
            }
        }
    }

    /// Flush an oversize tail and drop the rest of its sequence as it
    /// arrives
    fn discard_tail<F: FnMut(Event)>(&mut self, tail: &str, sink: &mut F) {
        tracing::warn!(len = tail.len(), "discarding oversize incomplete sequence");
        self.discard = Discard::of(tail);
        self.checked = 0;
        sink(Event::Unknown(tail.to_string()));
    }

    /// Consume the remainder of a discarded sequence from the front of
    /// `text`, returning what follows it
    fn skip_discarded<'a>(&mut self, text: &'a str) -> &'a str {
        let Some(discard) = self.discard else {
            return text;
        };
        if let Discard::String { allow_bel } = discard {
            return match find_string_end(text, 0, allow_bel) {
                StringEnd::Found { consumed, .. } => {
                    self.discard = None;
                    &text[consumed..]
                }
                // A trailing ESC ends the payload; scan it normally
                StringEnd::Incomplete if text.ends_with('\x1b') => {
                    self.discard = None;
                    &text[text.len() - 1..]
                }
                StringEnd::Incomplete => "",
            };
        }

        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| !discard.continues(b)) {
            Some(pos) => {
                self.discard = None;
                if discard.finishes(bytes[pos]) {
                    &text[pos + 1..]
                } else {
                    &text[pos..]
                }
            }
            None => "",
        }
    }

    /// The incomplete sequence carried over from the last call
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Flush the pending tail as an [`Event::Unknown`], e.g. at end of stream
    pub fn flush(&mut self) -> Option<Event> {
        self.checked = 0;
        self.discard = None;
        if self.pending.is_empty() {
            None
        } else {
            Some(Event::Unknown(std::mem::take(&mut self.pending)))
        }
    }

    /// Drop any pending tail
    pub fn reset(&mut self) {
        self.pending.clear();
        self.checked = 0;
        self.discard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(input: &str) -> Vec<Event> {
        Scanner::new().feed(input)
    }

    fn csi(input: &str) -> CsiSequence {
        match scan(input) {
            Scan::Event(Event::Csi(csi), consumed) => {
                assert_eq!(consumed, input.len());
                csi
            }
            other => panic!("expected CSI, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_empty() {
        assert_eq!(scan(""), Scan::End);
    }

    #[test]
    fn test_scan_text() {
        assert_eq!(scan("a"), Scan::Event(Event::Text('a'), 1));
        assert_eq!(scan("日本"), Scan::Event(Event::Text('日'), 3));
    }

    #[test]
    fn test_scan_controls() {
        let events = scan_all("\x07\x08\t\n\x0b\x0c\r\x7f\x00");
        assert_eq!(
            events,
            vec![
                Event::Control(ControlChar::Bell),
                Event::Control(ControlChar::Backspace),
                Event::Control(ControlChar::Tab),
                Event::Control(ControlChar::LineFeed),
                Event::Control(ControlChar::VerticalTab),
                Event::Control(ControlChar::FormFeed),
                Event::Control(ControlChar::CarriageReturn),
                Event::Control(ControlChar::Delete),
                Event::Control(ControlChar::Other(0)),
            ]
        );
    }

    #[test]
    fn test_scan_csi_params() {
        let seq = csi("\x1b[10;20H");
        assert_eq!(seq.command, 'H');
        assert_eq!(seq.params, vec![10, 20]);
        assert!(!seq.is_private());
    }

    #[test]
    fn test_scan_csi_no_params() {
        let seq = csi("\x1b[m");
        assert_eq!(seq.command, 'm');
        assert!(seq.params.is_empty());
    }

    #[test]
    fn test_scan_csi_empty_params() {
        assert_eq!(csi("\x1b[;5H").params, vec![0, 5]);
        assert_eq!(csi("\x1b[5;H").params, vec![5, 0]);
    }

    #[test]
    fn test_scan_csi_private() {
        let seq = csi("\x1b[?1049h");
        assert!(seq.is_private());
        assert_eq!(seq.params, vec![1049]);
        assert_eq!(seq.command, 'h');
    }

    #[test]
    fn test_scan_csi_colon_separator() {
        assert_eq!(csi("\x1b[38:2:1:2:3m").params, vec![38, 2, 1, 2, 3]);
    }

    #[test]
    fn test_scan_csi_saturates() {
        assert_eq!(csi("\x1b[99999999999A").params, vec![u16::MAX]);
    }

    #[test]
    fn test_scan_csi_param_cap() {
        let input = format!("\x1b[{}m", vec!["1"; 40].join(";"));
        assert_eq!(csi(&input).params.len(), MAX_CSI_PARAMS);
    }

    #[test]
    fn test_scan_csi_intermediate() {
        let seq = csi("\x1b[!p");
        assert_eq!(seq.intermediates, vec!['!']);
        assert_eq!(seq.command, 'p');
    }

    #[test]
    fn test_scan_csi_malformed() {
        let input = "\x1b[1?2h";
        assert_eq!(
            scan(input),
            Scan::Event(Event::Unknown(input.to_string()), input.len())
        );
    }

    #[test]
    fn test_scan_csi_aborted_by_control() {
        let events = scan_all("\x1b[1\nX");
        assert_eq!(
            events,
            vec![
                Event::Unknown("\x1b[1".to_string()),
                Event::Control(ControlChar::LineFeed),
                Event::Text('X'),
            ]
        );
    }

    #[test]
    fn test_scan_incomplete() {
        assert_eq!(scan("\x1b"), Scan::Incomplete);
        assert_eq!(scan("\x1b["), Scan::Incomplete);
        assert_eq!(scan("\x1b[12;"), Scan::Incomplete);
        assert_eq!(scan("\x1b]0;title"), Scan::Incomplete);
        assert_eq!(scan("\x1bPdata"), Scan::Incomplete);
        assert_eq!(scan("\x1b("), Scan::Incomplete);
    }

    #[test]
    fn test_scan_osc_bel() {
        let events = scan_all("\x1b]0;My Title\x07");
        assert_eq!(
            events,
            vec![Event::Osc(OscCommand {
                code: 0,
                data: "My Title".to_string()
            })]
        );
    }

    #[test]
    fn test_scan_osc_st() {
        let events = scan_all("\x1b]2;Title\x1b\\A");
        assert_eq!(
            events,
            vec![
                Event::Osc(OscCommand {
                    code: 2,
                    data: "Title".to_string()
                }),
                Event::Text('A'),
            ]
        );
    }

    #[test]
    fn test_scan_osc_non_numeric() {
        let events = scan_all("\x1b]abc;x\x07");
        assert_eq!(events, vec![Event::Unknown("\x1b]abc;x\x07".to_string())]);
    }

    #[test]
    fn test_scan_dcs() {
        let events = scan_all("\x1bPq#0\x1b\\");
        assert_eq!(events, vec![Event::Dcs("q#0".to_string())]);
    }

    #[test]
    fn test_scan_apc() {
        let events = scan_all("\x1b_hidden\x1b\\B");
        assert_eq!(
            events,
            vec![
                Event::Unknown("\x1b_hidden\x1b\\".to_string()),
                Event::Text('B'),
            ]
        );
    }

    #[test]
    fn test_scan_single_escapes() {
        let events = scan_all("\x1b7\x1b8\x1bc\x1bD\x1bE\x1bH\x1bM\x1bZ");
        assert_eq!(
            events,
            vec![
                Event::Escape(EscapeKind::SaveCursor),
                Event::Escape(EscapeKind::RestoreCursor),
                Event::Escape(EscapeKind::FullReset),
                Event::Escape(EscapeKind::Index),
                Event::Escape(EscapeKind::NextLine),
                Event::Escape(EscapeKind::TabSet),
                Event::Escape(EscapeKind::ReverseIndex),
                Event::Escape(EscapeKind::Identify),
            ]
        );
    }

    #[test]
    fn test_scan_unknown_escape() {
        assert_eq!(scan_all("\x1b="), vec![Event::Unknown("\x1b=".to_string())]);
        assert_eq!(scan_all("\x1b(B"), vec![Event::Unknown("\x1b(B".to_string())]);
    }

    #[test]
    fn test_scan_esc_esc() {
        let events = scan_all("\x1b\x1b[A");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Unknown("\x1b".to_string()));
        assert!(matches!(&events[1], Event::Csi(c) if c.command == 'A'));
    }

    #[test]
    fn test_scanner_split_csi() {
        let mut scanner = Scanner::new();
        assert!(scanner.feed("A\x1b[3").len() == 1);
        assert_eq!(scanner.pending(), "\x1b[3");

        let events = scanner.feed("1mB");
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::Csi(c) if c.params == vec![31]));
        assert_eq!(events[1], Event::Text('B'));
        assert!(scanner.pending().is_empty());
    }

    #[test]
    fn test_scanner_every_split_point() {
        let input = "X\x1b[1;31mY\x1b]0;t\x07\x1b7Z";
        let whole = scan_all(input);

        for split in 1..input.len() {
            let mut scanner = Scanner::new();
            let mut events = scanner.feed(&input[..split]);
            events.extend(scanner.feed(&input[split..]));
            assert_eq!(events, whole, "split at {}", split);
        }
    }

    #[test]
    fn test_scanner_oversize_tail() {
        let mut scanner = Scanner::new();
        let payload = "x".repeat(MAX_PENDING + 10);
        let events = scanner.feed(&format!("\x1b]0;{}", payload));

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::Unknown(raw) if raw.len() > MAX_PENDING));
        assert!(scanner.pending().is_empty());
    }

    #[test]
    fn test_scanner_drops_rest_of_oversize_string() {
        let mut scanner = Scanner::new();
        assert!(scanner.feed("\x1b]52;c;").is_empty());

        let events = scanner.feed(&"A".repeat(70 * 1024));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::Unknown(_)));

        assert!(scanner.feed(&"B".repeat(100)).is_empty());
        let events = scanner.feed("ZZZZ\x07ok");
        assert_eq!(events, vec![Event::Text('o'), Event::Text('k')]);
    }

    #[test]
    fn test_scanner_oversize_string_ended_by_split_st() {
        let mut scanner = Scanner::new();
        scanner.feed(&format!("\x1bP{}", "q".repeat(MAX_PENDING + 1)));

        assert!(scanner.feed("ZZ\x1b").is_empty());
        assert_eq!(scanner.pending(), "\x1b");
        let events = scanner.feed("\\A");
        assert_eq!(events.last(), Some(&Event::Text('A')));
        assert!(!events.contains(&Event::Text('Z')));
    }

    #[test]
    fn test_scanner_drops_rest_of_oversize_csi() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(&format!("\x1b[{}", "1;".repeat(MAX_PENDING)));
        assert_eq!(events.len(), 1);

        let events = scanner.feed("1;2HX");
        assert_eq!(events, vec![Event::Text('X')]);
    }

    #[test]
    fn test_scanner_resumes_long_string() {
        let mut scanner = Scanner::new();
        scanner.feed("\x1b]2;");
        for _ in 0..10_000 {
            assert!(scanner.feed("t").is_empty());
            // Only the newest byte is left to examine
            assert_eq!(scanner.checked, scanner.pending().len());
        }
        scanner.feed("\x1b");
        assert_eq!(scanner.checked, scanner.pending().len() - 1);

        let events = scanner.feed("\\");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::Osc(osc) if osc.code == 2 && osc.data.len() == 10_000));
        assert!(scanner.pending().is_empty());
    }

    #[test]
    fn test_scanner_one_char_at_a_time() {
        let input = "a\x1b[38;2;1;2;3mb\x1b]0;title\x1b\\c\x1bPdata\x07\x1b\\\x1b(Bd\x1b[?1049h";
        let whole = scan_all(input);

        let mut scanner = Scanner::new();
        let mut events = Vec::new();
        for (i, ch) in input.char_indices() {
            events.extend(scanner.feed(&input[i..i + ch.len_utf8()]));
        }
        assert_eq!(events, whole);
    }

    #[test]
    fn test_scanner_flush() {
        let mut scanner = Scanner::new();
        scanner.feed("\x1b[");
        assert_eq!(scanner.flush(), Some(Event::Unknown("\x1b[".to_string())));
        assert_eq!(scanner.flush(), None);
    }
}
