use uuid::Uuid;

/// Prefix under which all media objects live in the backend.
const KEY_PREFIX: &str = "uploads";

/// Derive the backend object key for a media item.
///
/// The key is a pure function of the internal id and the content type, so
/// id and key stay in a 1:1 relationship for the lifetime of the item.
pub fn derive_key(id: Uuid, mime_type: &str) -> String {
    format!("{KEY_PREFIX}/{id}{}", extension_for(mime_type))
}

/// Map a MIME type to a dotted file extension. Unknown types get no
/// extension; the object is still addressable, just suffix-less.
fn extension_for(mime_type: &str) -> String {
    match mime_type {
        // Pin the common image types; mime_guess enumerates several
        // extensions for these and the order is not contractual.
        "image/jpeg" => ".jpg".into(),
        "image/png" => ".png".into(),
        "image/webp" => ".webp".into(),
        _ => mime_guess::get_mime_extensions_str(mime_type)
            .and_then(|exts| exts.first())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default(),
    }
}
