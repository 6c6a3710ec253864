// @module: Filesystem- and editor-safe names and titles

/// Replacement table for characters that are hostile to macOS paths or the
/// editor's draft naming. Full-width glyphs keep the name readable.
const ILLEGAL_CHARS: &[(char, &str)] = &[
    ('/', "-"),
    (':', "-"),
    ('<', "《"),
    ('>', "》"),
    ('"', "'"),
    ('|', "-"),
    ('?', "？"),
    ('*', "✱"),
    ('\\', "-"),
    ('\n', " "),
    ('\r', " "),
    ('\t', " "),
];

/// Fallback name when sanitizing leaves nothing usable
const FALLBACK_NAME: &str = "untitled";

/// Overall byte cap for a composed draft title
const MAX_TITLE_BYTES: usize = 200;

/// Sanitize a file or directory name.
///
/// Replaces each character from the illegal table with a safe substitute,
/// strips leading/trailing periods and spaces, then truncates by whole
/// characters until the UTF-8 byte length fits `max_bytes` - a multi-byte
/// character is never split. An empty result becomes `"untitled"`.
pub fn sanitize_filename(name: &str, max_bytes: usize) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        match ILLEGAL_CHARS.iter().find(|(illegal, _)| *illegal == c) {
            Some((_, replacement)) => cleaned.push_str(replacement),
            None => cleaned.push(c),
        }
    }

    let mut cleaned = cleaned.trim_matches(['.', ' ']).to_string();

    // Drop whole characters from the end until the encoded length fits
    while cleaned.len() > max_bytes {
        cleaned.pop();
    }

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Compose a draft title from the payload's descriptive fields.
///
/// Format: `topic~hook_type~output_language~stamp`, each sub-field
/// independently sanitized and capped before composition, the whole title
/// re-sanitized and capped at 200 bytes.
pub fn build_draft_title(
    topic: &str,
    hook_type: &str,
    output_language: &str,
    stamp_secs: i64,
) -> String {
    let topic = capped_field(topic, 80, FALLBACK_NAME);
    let hook = capped_field(hook_type, 30, "unknown");
    let lang = capped_field(output_language, 10, "unknown");

    let title = format!("{}~{}~{}~{}", topic, hook, lang, stamp_secs);

    sanitize_filename(&title, MAX_TITLE_BYTES)
}

fn capped_field(value: &str, max_bytes: usize, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        sanitize_filename(trimmed, max_bytes)
    }
}
