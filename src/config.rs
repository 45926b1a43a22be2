use log::debug;

use crate::layout::RTC_SIZE;

/// Parses the offset exclusion list supplied at process start and returns
/// the emulation flag table it describes.
///
/// The list is comma separated; each token is either a two-hex-digit offset
/// (`"B2"`) or an inclusive range (`"B0-B7"`). Parsing stops at the first
/// malformed token and keeps everything applied before it. An empty list
/// marks nothing, leaving the engine in pure pass-through mode.
pub fn parse_offset_list(input: &str) -> [bool; RTC_SIZE] {
    let mut flags = [false; RTC_SIZE];

    for token in input.split(',') {
        match token.split_once('-') {
            None => {
                let offset = match parse_hex_byte(token) {
                    Some(offset) => offset,
                    None => {
                        debug!("rtc offset token {:?} is not valid", token);
                        break;
                    }
                };
                flags[offset as usize] = true;
                debug!("rtc offset {:02X} is marked as emulated", offset);
            }
            Some((start, end)) => {
                let (start, end) = match (parse_hex_byte(start), parse_hex_byte(end)) {
                    (Some(start), Some(end)) => (start, end),
                    _ => {
                        debug!("rtc range token {:?} can't be parsed", token);
                        break;
                    }
                };
                if start >= end {
                    debug!(
                        "rtc start offset {:02X} must be less than end offset {:02X}",
                        start, end
                    );
                    break;
                }
                for offset in start..=end {
                    flags[offset as usize] = true;
                }
                debug!(
                    "rtc range from offset {:02X} to offset {:02X} is marked as emulated",
                    start, end
                );
            }
        }
    }

    flags
}

fn parse_hex_byte(token: &str) -> Option<u8> {
    if token.is_empty() || token.len() > 2 || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

#[cfg(test)]
mod test {
    use super::*;

    fn marked(flags: &[bool; RTC_SIZE]) -> Vec<usize> {
        flags
            .iter()
            .enumerate()
            .filter_map(|(offset, set)| set.then_some(offset))
            .collect()
    }

    #[test]
    fn single_offsets_and_ranges() {
        let flags = parse_offset_list("0A,10-12");
        assert_eq!(marked(&flags), vec![0x0A, 0x10, 0x11, 0x12]);
    }

    #[test]
    fn parsing_halts_at_first_malformed_token() {
        let flags = parse_offset_list("0A,ZZ,10");
        assert_eq!(marked(&flags), vec![0x0A]);
    }

    #[test]
    fn inverted_range_marks_nothing() {
        let flags = parse_offset_list("20-10");
        assert_eq!(marked(&flags), Vec::<usize>::new());
    }

    #[test]
    fn equal_range_bounds_mark_nothing() {
        let flags = parse_offset_list("10-10");
        assert_eq!(marked(&flags), Vec::<usize>::new());
    }

    #[test]
    fn empty_input_marks_nothing() {
        let flags = parse_offset_list("");
        assert_eq!(marked(&flags), Vec::<usize>::new());
    }

    #[test]
    fn prior_tokens_survive_a_bad_range() {
        // Everything before the inverted range stays applied; the trailing
        // `30` is never reached.
        let flags = parse_offset_list("B0-B7,5C,FF-00,30");
        let mut expected: Vec<usize> = vec![0x5C];
        expected.extend(0xB0..=0xB7);
        assert_eq!(marked(&flags), expected);
    }

    #[test]
    fn full_span_is_addressable() {
        let flags = parse_offset_list("00-FF");
        assert_eq!(marked(&flags).len(), RTC_SIZE);
    }
}
