use time::macros::format_description;
use time::OffsetDateTime;

const SEPARATOR: char = '_';

/// Source of "now" for the generation suffix.
pub type Clock = fn() -> OffsetDateTime;

/// Local wall-clock time, UTC when the local offset cannot be determined.
pub fn system_clock() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Everything before the last `_`, or the whole name when there is no
/// separator or it is the first character.
pub fn index_prefix(current_index_name: &str) -> &str {
    match current_index_name.rfind(SEPARATOR) {
        Some(position) if position > 0 => &current_index_name[..position],
        _ => current_index_name,
    }
}

pub fn generation_suffix(now: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]-[hour]-[minute]");
    // only numeric components, formatting cannot fail
    now.format(format).unwrap_or_default()
}

/// Name of the generation that replaces `current_index_name`.
///
/// Two calls within the same minute return the same name.
pub fn next_index_name(current_index_name: &str, now: OffsetDateTime) -> String {
    format!(
        "{}{}{}",
        index_prefix(current_index_name),
        SEPARATOR,
        generation_suffix(now)
    )
}
