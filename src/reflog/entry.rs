//! reflog::entry
//!
//! A single reflog record and its line encoding.
//!
//! # Format
//!
//! ```text
//! <old:40 hex> <new:40 hex> <name> <<email>> <unix_ts> <+HHMM>\t<message>\n
//! ```
//!
//! The UTC offset is held in memory as signed seconds east of UTC and
//! converted to `±HHMM` only at the encoding boundary. Offsets must be a
//! whole number of minutes.
//!
//! # Example
//!
//! ```
//! use reflog::core::actor::Actor;
//! use reflog::core::types::Oid;
//! use reflog::reflog::RefLogEntry;
//!
//! let line = b"0000000000000000000000000000000000000000 \
//! ffffffffffffffffffffffffffffffffffffffff \
//! Jane Doe <jane@example.com> 1700000000 +0130\tbranch: Created from HEAD\n";
//!
//! let entry = RefLogEntry::decode_line(line).unwrap();
//! assert!(entry.old_oid().is_zero());
//! assert_eq!(entry.actor(), &Actor::new("Jane Doe", "jane@example.com").unwrap());
//! assert_eq!(entry.time(), (1_700_000_000, 5400));
//! assert_eq!(entry.encode_line(), line.to_vec());
//! ```

use std::io::Write;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::error::{Field, RefLogError};
use crate::core::actor::Actor;
use crate::core::types::Oid;

/// Largest offset magnitude `±HHMM` can express.
const MAX_OFFSET_SECONDS: i32 = 99 * 3600 + 59 * 60;

/// One immutable reflog record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RefLogEntry {
    old: Oid,
    new: Oid,
    actor: Actor,
    timestamp: i64,
    utc_offset: i32,
    message: String,
}

impl RefLogEntry {
    /// Construct a new entry.
    ///
    /// `actor` may be an [`Actor`] or anything that parses into one, such
    /// as `"Name <email>"`.
    ///
    /// # Errors
    ///
    /// Returns `RefLogError::InvalidValue` if the actor is not valid, the
    /// message contains a newline, or the offset is not a whole number of
    /// minutes within `±99:59`.
    pub fn new<A>(
        old: Oid,
        new: Oid,
        actor: A,
        timestamp: i64,
        utc_offset: i32,
        message: impl Into<String>,
    ) -> Result<Self, RefLogError>
    where
        A: TryInto<Actor>,
        A::Error: Into<RefLogError>,
    {
        let actor: Actor = actor.try_into().map_err(Into::<RefLogError>::into)?;
        let message = message.into();

        if message.contains('\n') {
            return Err(RefLogError::InvalidValue(
                "reflog message cannot contain a newline".to_string(),
            ));
        }
        if utc_offset % 60 != 0 || utc_offset.abs() > MAX_OFFSET_SECONDS {
            return Err(RefLogError::InvalidValue(format!(
                "utc offset {utc_offset}s is not representable as ±HHMM"
            )));
        }

        Ok(Self {
            old,
            new,
            actor,
            timestamp,
            utc_offset,
            message,
        })
    }

    /// Decode one line of a log.
    ///
    /// A single trailing `\n` is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns `RefLogError::Format` naming the first field that failed.
    pub fn decode_line(line: &[u8]) -> Result<Self, RefLogError> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);

        let old = decode_oid(line, 0, Field::OldSha)?;
        let new = decode_oid(line, Oid::HEX_LEN + 1, Field::NewSha)?;
        let rest = &line[2 * (Oid::HEX_LEN + 1)..];

        // The email cannot contain '>', so the first one closes the actor.
        let actor_end = rest
            .iter()
            .position(|b| *b == b'>')
            .ok_or_else(|| RefLogError::format(Field::Actor, "missing '>' after email"))?;
        let actor = std::str::from_utf8(&rest[..=actor_end])
            .map_err(|e| RefLogError::format(Field::Actor, e.to_string()))
            .and_then(|s| {
                Actor::parse(s).map_err(|e| RefLogError::format(Field::Actor, e.to_string()))
            })?;

        let rest = &rest[actor_end + 1..];
        let tab = rest
            .iter()
            .position(|b| *b == b'\t')
            .ok_or_else(|| RefLogError::format(Field::Separator, "missing tab before message"))?;
        let (timestamp, utc_offset) = decode_time(&rest[..tab])?;

        let message = String::from_utf8(rest[tab + 1..].to_vec())
            .map_err(|e| RefLogError::format(Field::Message, e.to_string()))?;

        Ok(Self {
            old,
            new,
            actor,
            timestamp,
            utc_offset,
            message,
        })
    }

    /// Encode as one log line, including the trailing `\n`.
    pub fn encode_line(&self) -> Vec<u8> {
        let mut line = self.to_string().into_bytes();
        line.push(b'\n');
        line
    }

    /// Write the encoded line to `out`.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{self}")
    }

    /// Value of the ref before the update; zero if it did not exist.
    pub fn old_oid(&self) -> &Oid {
        &self.old
    }

    /// Value of the ref after the update; zero if it was deleted.
    pub fn new_oid(&self) -> &Oid {
        &self.new
    }

    /// Who made the update.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// `(unix seconds, utc offset seconds east)`.
    pub fn time(&self) -> (i64, i32) {
        (self.timestamp, self.utc_offset)
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn utc_offset(&self) -> i32 {
        self.utc_offset
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The update time in the offset it was recorded with.
    ///
    /// Returns `None` if the timestamp is outside chrono's range.
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.utc_offset)?;
        DateTime::from_timestamp(self.timestamp, 0).map(|utc| utc.with_timezone(&offset))
    }
}

impl std::fmt::Display for RefLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}\t{}",
            self.old,
            self.new,
            self.actor,
            self.timestamp,
            format_offset(self.utc_offset),
            self.message
        )
    }
}

/// Decode the 40 hex characters at `start`, followed by a space.
fn decode_oid(line: &[u8], start: usize, field: Field) -> Result<Oid, RefLogError> {
    let end = start + Oid::HEX_LEN;
    let hex = line
        .get(start..end)
        .ok_or_else(|| RefLogError::format(field, "line too short"))?;
    let oid = Oid::from_hex(hex).map_err(|e| RefLogError::format(field, e.to_string()))?;
    if line.get(end) != Some(&b' ') {
        return Err(RefLogError::format(field, "expected a space after the sha"));
    }
    Ok(oid)
}

/// Decode ` <unix_ts> <±HHMM>`.
fn decode_time(raw: &[u8]) -> Result<(i64, i32), RefLogError> {
    let err = |detail: &str| RefLogError::format(Field::Timestamp, detail);

    let text = std::str::from_utf8(raw).map_err(|_| err("not valid UTF-8"))?;
    let text = text
        .strip_prefix(' ')
        .ok_or_else(|| err("expected a space after the actor"))?;
    let (seconds, offset) = text
        .split_once(' ')
        .ok_or_else(|| err("expected '<seconds> <offset>'"))?;

    let digits = seconds.strip_prefix('-').unwrap_or(seconds);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err(&format!("'{seconds}' is not an integer")));
    }
    if (digits.len() > 1 && digits.starts_with('0')) || seconds == "-0" {
        return Err(err(&format!("'{seconds}' is not in canonical form")));
    }
    let timestamp: i64 = seconds
        .parse()
        .map_err(|_| err(&format!("'{seconds}' is out of range")))?;

    let utc_offset = parse_offset(offset)
        .ok_or_else(|| err(&format!("'{offset}' is not a ±HHMM offset")))?;

    Ok((timestamp, utc_offset))
}

/// Parse `±HHMM` into seconds east of UTC.
fn parse_offset(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digit = |i: usize| i32::from(bytes[i] - b'0');
    let hours = digit(1) * 10 + digit(2);
    let minutes = digit(3) * 10 + digit(4);
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Format seconds east of UTC as `±HHMM`.
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NULL: &str = "0000000000000000000000000000000000000000";
    const SHA: &str = "ffffffffffffffffffffffffffffffffffffffff";
    const LINE: &str = "0000000000000000000000000000000000000000 \
        ffffffffffffffffffffffffffffffffffffffff \
        Jane Doe <jane@example.com> 1271229940 +0200\tcommit (initial): initial";

    fn actor() -> Actor {
        Actor::new("name", "email").unwrap()
    }

    fn oid(hex: &str) -> Oid {
        Oid::from_hex(hex).unwrap()
    }

    #[test]
    fn new_entry_fields() {
        let e = RefLogEntry::new(oid(NULL), oid(SHA), actor(), 0, 60, "message").unwrap();
        assert_eq!(e.old_oid(), &Oid::zero());
        assert_eq!(e.new_oid().to_hex(), SHA);
        assert_eq!(e.actor(), &actor());
        assert_eq!(e.time(), (0, 60));
        assert_eq!(e.message(), "message");
        assert!(e.to_string().starts_with(NULL));
    }

    #[test]
    fn new_accepts_actor_text() {
        let e = RefLogEntry::new(oid(NULL), oid(SHA), "name <email>", 0, 0, "").unwrap();
        assert_eq!(e.actor(), &actor());
    }

    #[test]
    fn new_rejects_bare_actor_string() {
        let result = RefLogEntry::new(oid(NULL), oid(SHA), "noactor", 0, 0, "");
        assert!(matches!(result, Err(RefLogError::InvalidValue(_))));
    }

    #[test]
    fn new_rejects_newline_in_message() {
        let result = RefLogEntry::new(oid(NULL), oid(SHA), actor(), 0, 0, "two\nlines");
        assert!(matches!(result, Err(RefLogError::InvalidValue(_))));
    }

    #[test]
    fn new_rejects_sub_minute_offset() {
        assert!(RefLogEntry::new(oid(NULL), oid(SHA), actor(), 0, 1, "").is_err());
        assert!(RefLogEntry::new(oid(NULL), oid(SHA), actor(), 0, 100 * 3600, "").is_err());
        assert!(RefLogEntry::new(oid(NULL), oid(SHA), actor(), 0, -(5 * 3600 + 1800), "").is_ok());
    }

    #[test]
    fn decode_known_line() {
        let e = RefLogEntry::decode_line(LINE.as_bytes()).unwrap();
        assert!(e.old_oid().is_zero());
        assert_eq!(e.new_oid().to_hex(), SHA);
        assert_eq!(e.actor().name(), "Jane Doe");
        assert_eq!(e.actor().email(), "jane@example.com");
        assert_eq!(e.time(), (1271229940, 7200));
        assert_eq!(e.message(), "commit (initial): initial");
    }

    #[test]
    fn encode_is_exact_inverse() {
        let with_newline = format!("{LINE}\n");
        let e = RefLogEntry::decode_line(with_newline.as_bytes()).unwrap();
        assert_eq!(e.encode_line(), with_newline.as_bytes());

        let mut out = Vec::new();
        e.write_to(&mut out).unwrap();
        assert_eq!(out, with_newline.as_bytes());
    }

    #[test]
    fn negative_offsets_roundtrip() {
        let line = LINE.replace("+0200", "-0730");
        let e = RefLogEntry::decode_line(line.as_bytes()).unwrap();
        assert_eq!(e.utc_offset(), -(7 * 3600 + 30 * 60));
        assert_eq!(e.to_string(), line);
    }

    #[test]
    fn message_may_contain_tabs_and_be_empty() {
        let line = LINE.replace("commit (initial): initial", "a\tb");
        let e = RefLogEntry::decode_line(line.as_bytes()).unwrap();
        assert_eq!(e.message(), "a\tb");

        let line = LINE.replace("commit (initial): initial", "");
        let e = RefLogEntry::decode_line(line.as_bytes()).unwrap();
        assert_eq!(e.message(), "");
        assert_eq!(e.to_string(), line);
    }

    fn field_of(line: &str) -> Field {
        RefLogEntry::decode_line(line.as_bytes())
            .unwrap_err()
            .field()
            .unwrap()
    }

    #[test]
    fn corrupt_old_sha() {
        assert_eq!(field_of(&LINE.replacen('0', "x", 1)), Field::OldSha);
        assert_eq!(field_of(&LINE[1..]), Field::OldSha);
        assert_eq!(field_of("abc"), Field::OldSha);
    }

    #[test]
    fn corrupt_new_sha() {
        assert_eq!(field_of(&LINE.replacen("fff", "fgf", 1)), Field::NewSha);
        assert_eq!(field_of(&LINE[..60]), Field::NewSha);
    }

    #[test]
    fn corrupt_actor() {
        assert_eq!(
            field_of(&LINE.replace("<jane@example.com>", "jane@example.com")),
            Field::Actor
        );
        assert_eq!(
            field_of(&LINE.replace(" <jane", "<jane")),
            Field::Actor
        );
    }

    #[test]
    fn corrupt_timestamp() {
        assert_eq!(field_of(&LINE.replace("1271229940", "12712x9940")), Field::Timestamp);
        assert_eq!(field_of(&LINE.replace("+0200", "+02")), Field::Timestamp);
        assert_eq!(field_of(&LINE.replace("+0200", "+0260")), Field::Timestamp);
        assert_eq!(field_of(&LINE.replace(" +0200", "")), Field::Timestamp);
    }

    #[test]
    fn non_canonical_timestamp_rejected() {
        assert_eq!(field_of(&LINE.replace("1271229940", "0001271229940")), Field::Timestamp);
        assert_eq!(field_of(&LINE.replace("1271229940", "-0")), Field::Timestamp);
        assert_eq!(field_of(&LINE.replace("1271229940", "-01")), Field::Timestamp);

        for canonical in ["0", "-1", "1271229940"] {
            let line = LINE.replace("1271229940", canonical);
            let entry = RefLogEntry::decode_line(line.as_bytes()).unwrap();
            assert_eq!(entry.encode_line(), format!("{line}\n").into_bytes());
        }
    }

    #[test]
    fn corrupt_separator() {
        assert_eq!(field_of(&LINE.replace('\t', " ")), Field::Separator);
    }

    #[test]
    fn non_utf8_message_rejected() {
        let mut line = LINE.as_bytes().to_vec();
        line.push(0xff);
        assert_eq!(
            RefLogEntry::decode_line(&line).unwrap_err().field(),
            Some(Field::Message)
        );
    }

    #[test]
    fn offset_formatting() {
        assert_eq!(format_offset(0), "+0000");
        assert_eq!(format_offset(7200), "+0200");
        assert_eq!(format_offset(-25200), "-0700");
        assert_eq!(format_offset(19800), "+0530");
        assert_eq!(parse_offset("-0000"), Some(0));
        assert_eq!(parse_offset("0200"), None);
        assert_eq!(parse_offset("+02a0"), None);
    }

    #[test]
    fn datetime_uses_recorded_offset() {
        let e = RefLogEntry::decode_line(LINE.as_bytes()).unwrap();
        let dt = e.datetime().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.timestamp(), 1271229940);
    }

    #[test]
    fn serializes_to_json() {
        let e = RefLogEntry::decode_line(LINE.as_bytes()).unwrap();
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["old"], NULL);
        assert_eq!(json["actor"]["email"], "jane@example.com");
        assert_eq!(json["utc_offset"], 7200);
    }
}
