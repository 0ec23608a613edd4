//! SRT cue flattening.
//!
//! Caption downloads arrive as SubRip files: blank-line-separated blocks of
//! an optional index line, a `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing line,
//! and one or more cue text lines. Prompt planning only needs the spoken
//! text, so cues are flattened into a single space-joined string.

/// Flatten SRT subtitle content to plain transcript text.
///
/// Index and timing lines are dropped; cue text lines are trimmed and joined
/// with single spaces.
#[must_use]
pub fn flatten(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(normalized.len() / 2);

    for line in normalized.lines() {
        let line = line.trim();
        if line.is_empty() || is_index_line(line) || is_timing_line(line) {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
    }

    out
}

fn is_index_line(line: &str) -> bool {
    line.bytes().all(|b| b.is_ascii_digit())
}

fn is_timing_line(line: &str) -> bool {
    line.contains("-->")
}
