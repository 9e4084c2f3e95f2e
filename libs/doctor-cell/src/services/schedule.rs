use chrono::Weekday;
use regex::Regex;
use tracing::{debug, warn};

const DAY_NAMES: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

/// How a weekday was matched against a working-days text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMatch {
    /// The day's full name appears verbatim in the text.
    Literal,
    /// The day falls inside a "<day> to <day>" range.
    Range,
    /// One of the comma/space/hyphen/ampersand separated tokens names the day.
    Token,
    /// The text parsed but the day is not part of it.
    NotListed,
    /// The text could not be understood; treated as not working.
    Unparsable(String),
}

impl ScheduleMatch {
    pub fn is_working(&self) -> bool {
        matches!(self, ScheduleMatch::Literal | ScheduleMatch::Range | ScheduleMatch::Token)
    }
}

/// Decides whether a weekday is part of a doctor's free-text working days.
///
/// Three grammars are tried in order: literal day name, `<day> to <day>`
/// range (wrapping past Sunday when the start comes after the end), and a
/// token list. Anything that fails to parse counts as a day off.
#[derive(Debug, Clone)]
pub struct WorkingScheduleParser {
    token_separator: Option<Regex>,
}

impl Default for WorkingScheduleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingScheduleParser {
    pub fn new() -> Self {
        Self {
            token_separator: Regex::new(r"[,\s\-&]+").ok(),
        }
    }

    pub fn is_working_day(&self, schedule: &str, weekday: Weekday) -> bool {
        self.evaluate(schedule, weekday).is_working()
    }

    pub fn evaluate(&self, schedule: &str, weekday: Weekday) -> ScheduleMatch {
        if schedule.trim().is_empty() {
            return ScheduleMatch::Unparsable("working days are empty".to_string());
        }

        let day_name = day_name(weekday);

        if schedule.contains(day_name) {
            debug!("'{}' matched literally in '{}'", day_name, schedule);
            return ScheduleMatch::Literal;
        }

        let normalized = schedule.to_lowercase().replace(',', "");
        let normalized = normalized.trim();

        if normalized.contains(" to ") {
            return match parse_range(normalized) {
                Ok((start, end)) => {
                    if range_contains(start, end, weekday) {
                        ScheduleMatch::Range
                    } else {
                        ScheduleMatch::NotListed
                    }
                }
                Err(reason) => {
                    warn!("Unparsable working-day range '{}': {}", schedule, reason);
                    ScheduleMatch::Unparsable(reason)
                }
            };
        }

        let Some(separator) = &self.token_separator else {
            return ScheduleMatch::Unparsable("token separator unavailable".to_string());
        };

        let listed = separator
            .split(schedule)
            .map(str::trim)
            .any(|token| token.eq_ignore_ascii_case(day_name));

        if listed {
            ScheduleMatch::Token
        } else {
            ScheduleMatch::NotListed
        }
    }
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full English day name, ignoring case and surrounding whitespace.
pub fn parse_day_name(text: &str) -> Option<Weekday> {
    let text = text.trim();
    DAY_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|(_, day)| *day)
}

fn parse_range(normalized: &str) -> Result<(Weekday, Weekday), String> {
    let parts: Vec<&str> = normalized.split(" to ").collect();
    if parts.len() != 2 {
        return Err(format!("expected a single '<day> to <day>' range, found {} parts", parts.len()));
    }

    let start = parse_day_name(parts[0])
        .ok_or_else(|| format!("unknown day name '{}'", parts[0].trim()))?;
    let end = parse_day_name(parts[1])
        .ok_or_else(|| format!("unknown day name '{}'", parts[1].trim()))?;

    Ok((start, end))
}

fn range_contains(start: Weekday, end: Weekday, weekday: Weekday) -> bool {
    let start = start.number_from_monday();
    let end = end.number_from_monday();
    let day = weekday.number_from_monday();

    if start <= end {
        start <= day && day <= end
    } else {
        // Wraps past Sunday, e.g. Saturday to Monday
        day >= start || day <= end
    }
}
