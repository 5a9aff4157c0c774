//! Object paths of systemd units.
//!
//! systemd exposes every unit under `/org/freedesktop/systemd1/unit/`, with the unit name
//! escaped into a valid object path element: anything that is not an ASCII letter (and digits,
//! when they come first) is written as `_` followed by its two hex digits.

use std::fmt::Write;

const UNIT_PATH_PREFIX: &str = "/org/freedesktop/systemd1/unit/";

/// Get the object path systemd uses for the unit `name`, IE. `uupd.timer` ->
/// `/org/freedesktop/systemd1/unit/uupd_2etimer`
pub fn unit_object_path(name: &str) -> String {
    let mut path = String::from(UNIT_PATH_PREFIX);
    path.push_str(&escape_label(name));
    path
}

fn escape_label(label: &str) -> String {
    if label.is_empty() {
        return String::from("_");
    }

    let mut escaped = String::with_capacity(label.len() * 3);
    for (idx, byte) in label.bytes().enumerate() {
        let keep = byte.is_ascii_alphabetic() || (idx > 0 && byte.is_ascii_digit());
        if keep {
            escaped.push(char::from(byte));
        } else {
            // Writing to a String never fails.
            let _ = write!(escaped, "_{byte:02x}");
        }
    }

    escaped
}
