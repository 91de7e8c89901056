use crate::error::{TrellisError, TrellisResult};

/// Minute of day. 1440 stands for the "24:00" end-of-day boundary and is
/// distinct from minute 0 of the following day.
pub type Minute = u16;

pub const DAY_END: Minute = 1440;

/// Parses a wall-clock string in strict `HH:MM` form. Hours run 00-24,
/// minutes 00-59, and 24 is only legal as "24:00" (which maps to 1440).
pub fn parse_hhmm(text: &str) -> TrellisResult<Minute> {
    let invalid = || TrellisError::InvalidFormat(text.to_string());

    let (hours_txt, minutes_txt) = text.split_once(':').ok_or_else(invalid)?;
    if hours_txt.len() != 2
        || minutes_txt.len() != 2
        || !hours_txt.bytes().all(|b| b.is_ascii_digit())
        || !minutes_txt.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: Minute = hours_txt.parse().map_err(|_| invalid())?;
    let minutes: Minute = minutes_txt.parse().map_err(|_| invalid())?;

    if hours > 24 || minutes > 59 || (hours == 24 && minutes != 0) {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Formats a minute of day as `HH:MM`. Out-of-range values are clamped
/// into 0..=1440 rather than rejected, so this never fails; 1440 renders
/// as "24:00".
pub fn format_hhmm(minute: i32) -> String {
    let clamped = minute.clamp(0, DAY_END as i32);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_times() {
        assert_eq!(parse_hhmm("00:00"), Ok(0));
        assert_eq!(parse_hhmm("09:30"), Ok(570));
        assert_eq!(parse_hhmm("23:59"), Ok(1439));
    }

    #[test]
    fn test_parse_end_of_day_sentinel() {
        assert_eq!(parse_hhmm("24:00"), Ok(1440));
        assert_eq!(
            parse_hhmm("24:30"),
            Err(TrellisError::InvalidFormat("24:30".to_string()))
        );
        assert_eq!(
            parse_hhmm("24:01"),
            Err(TrellisError::InvalidFormat("24:01".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for text in [
            "", ":", "9:00", "09:5", "0900", "25:00", "12:60", "ab:cd", "+1:00", "12: 5",
            "12:00:00",
        ] {
            assert!(parse_hhmm(text).is_err(), "accepted '{}'", text);
        }
    }

    #[test]
    fn test_format_clamps_out_of_range() {
        assert_eq!(format_hhmm(-5), "00:00");
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(570), "09:30");
        assert_eq!(format_hhmm(1440), "24:00");
        assert_eq!(format_hhmm(2000), "24:00");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for minute in -10..=1500 {
            let text = format_hhmm(minute);
            let expected = minute.clamp(0, 1440) as Minute;
            assert_eq!(parse_hhmm(&text), Ok(expected));
        }

        for text in ["00:00", "07:45", "12:00", "23:59", "24:00"] {
            let minute = parse_hhmm(text).unwrap();
            assert_eq!(format_hhmm(minute as i32), text);
        }
    }
}
