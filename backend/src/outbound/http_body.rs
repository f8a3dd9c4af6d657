//! Helpers shared by the Mapbox and Cloudinary clients.

const PREVIEW_CHARS: usize = 160;

/// Single-line excerpt of a provider's error body, for log and error text.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut words = text.split_whitespace();
    let mut preview = words.next().unwrap_or_default().to_owned();
    for word in words {
        preview.push(' ');
        preview.push_str(word);
    }
    match preview.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => {
            preview.truncate(cut);
            preview.push_str("...");
            preview
        }
        None => preview,
    }
}
