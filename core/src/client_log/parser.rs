use super::*;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use memchr::{memchr, memchr2};

#[cfg(test)]
mod tests;

/// `YYYY/MM/DD HH:MM:SS` prefix every client log line starts with.
const TIMESTAMP_LEN: usize = 19;

const AREA_MARKER: &[u8] = b"generating level ";
const AREA_KEYWORD: &[u8] = b" area \"";
const SEED_KEYWORD: &[u8] = b" seed ";
const POST_LOAD_MARKER: &[u8] = b"[shader] delay:";

pub struct LogParser;

impl LogParser {
    /// Classify one log line. Malformed lines are not events; this never
    /// fails, it just returns `None`.
    pub fn parse_line(line: &str) -> Option<LogEvent> {
        let bytes = line.as_bytes();
        let timestamp = Self::parse_timestamp(bytes)?;

        let rest = &line[TIMESTAMP_LEN..];
        if let Some(area) = Self::parse_area_enter(rest, timestamp) {
            return Some(LogEvent::AreaEntered(area));
        }
        if find_ci(rest.as_bytes(), POST_LOAD_MARKER).is_some() {
            return Some(LogEvent::LoadComplete { timestamp });
        }
        Some(LogEvent::Interaction { timestamp })
    }

    /// True if the line is an area-enter line. Used by the reader's backward
    /// bootstrap scan to find where to start replaying.
    pub fn is_area_enter(line: &str) -> bool {
        let bytes = line.as_bytes();
        Self::parse_timestamp(bytes).is_some()
            && find_ci(&bytes[TIMESTAMP_LEN..], AREA_MARKER).is_some()
    }

    // parse YYYY/MM/DD HH:MM:SS
    fn parse_timestamp(b: &[u8]) -> Option<NaiveDateTime> {
        if b.len() < TIMESTAMP_LEN
            || b[4] != b'/'
            || b[7] != b'/'
            || b[10] != b' '
            || b[13] != b':'
            || b[16] != b':'
        {
            return None;
        }
        const DIGITS: [usize; 14] = [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18];
        if DIGITS.iter().any(|&i| !b[i].is_ascii_digit()) {
            return None;
        }

        let num = |lo: usize, hi: usize| {
            b[lo..hi]
                .iter()
                .fold(0u32, |acc, d| acc * 10 + (d - b'0') as u32)
        };

        let date = NaiveDate::from_ymd_opt(num(0, 4) as i32, num(5, 7), num(8, 10))?;
        let time = NaiveTime::from_hms_opt(num(11, 13), num(14, 16), num(17, 19))?;
        Some(date.and_time(time))
    }

    // parse `... Generating level 80 area "MapAugury" with seed 2890825190`
    fn parse_area_enter(segment: &str, timestamp: NaiveDateTime) -> Option<AreaInfo> {
        let bytes = segment.as_bytes();

        let marker = find_ci(bytes, AREA_MARKER)?;
        let level_start = marker + AREA_MARKER.len();
        let (level, level_digits) = parse_digits(&bytes[level_start..])?;
        let area_level = u32::try_from(level).ok()?;

        let keyword_start = level_start + level_digits;
        let keyword_end = keyword_start + AREA_KEYWORD.len();
        if bytes.len() < keyword_end || !bytes[keyword_start..keyword_end].eq_ignore_ascii_case(AREA_KEYWORD) {
            return None;
        }

        let name_start = keyword_end;
        let name_len = memchr(b'"', &bytes[name_start..])?;
        let area_name = &segment[name_start..name_start + name_len];
        if area_name.is_empty() {
            return None;
        }

        let tail = &bytes[name_start + name_len + 1..];
        let seed = find_ci(tail, SEED_KEYWORD)
            .and_then(|pos| parse_digits(&tail[pos + SEED_KEYWORD.len()..]))
            .map(|(value, _)| value);

        Some(AreaInfo {
            timestamp,
            area_level,
            area_name: area_name.to_string(),
            seed,
        })
    }
}

/// Case-insensitive substring search. memchr2 narrows candidates to the two
/// case variants of the needle's first byte before comparing windows.
fn find_ci(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let first = *needle.first()?;
    let (lower, upper) = (first.to_ascii_lowercase(), first.to_ascii_uppercase());

    let mut offset = 0;
    while let Some(pos) = memchr2(lower, upper, &haystack[offset..]) {
        let start = offset + pos;
        let end = start + needle.len();
        if end > haystack.len() {
            return None;
        }
        if haystack[start..end].eq_ignore_ascii_case(needle) {
            return Some(start);
        }
        offset = start + 1;
    }
    None
}

/// Leading decimal run as a value plus the number of bytes consumed.
fn parse_digits(bytes: &[u8]) -> Option<(u64, usize)> {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let mut value = 0u64;
    for &d in &bytes[..len] {
        value = value.checked_mul(10)?.checked_add((d - b'0') as u64)?;
    }
    Some((value, len))
}
