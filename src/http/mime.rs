//! Content-type table.
//!
//! Maps a file extension to the MIME type sent in `Content-Type`. The table
//! doubles as the whitelist of servable resources: an extension missing from
//! it makes the resource unservable (403).

/// Served for `.txt` and for targets without an extension.
pub const FALLBACK: &str = "text/plain";

/// Served for directory index files.
pub const INDEX: &str = "text/html";

/// Extension to MIME type. The empty key is the extensionless entry.
static CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("swf", "application/x-shockwave-flash"),
    ("txt", FALLBACK),
    ("", FALLBACK),
];

/// Looks up the MIME type for `extension` (without the dot), ignoring ASCII
/// case. Pass `""` for an extensionless resource.
pub fn lookup(extension: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
}
