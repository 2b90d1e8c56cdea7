//! Hierarchy-aware media ids.
//!
//! Media ids are of the form `<categoryType>/<categoryValue>|<trackId>`, so
//! the category a track was selected from can be recovered later and the
//! correct playing queue rebuilt. This matters when one track appears in
//! more than one list, like "by album -> album_1" and "by artist -> artist_1".

/// Root of the browse tree
pub const MEDIA_ID_ROOT: &str = "__ROOT__";
/// Browse category: tracks grouped by artist
pub const MEDIA_ID_BY_ARTIST: &str = "__BY_ARTIST__";
/// Browse category: tracks grouped by album
pub const MEDIA_ID_BY_ALBUM: &str = "__BY_ALBUM__";
/// Browse category: the flat song list
pub const MEDIA_ID_BY_SONG: &str = "__BY_SONG__";
/// Browse category: playlists
pub const MEDIA_ID_BY_PLAYLIST: &str = "__BY_PLAYLIST__";
/// Pseudo-category for queues built from a search
pub const MEDIA_ID_BY_SEARCH: &str = "__BY_SEARCH__";
/// Special playlist backed by the live playing queue
pub const MEDIA_ID_NOW_PLAYING: &str = "__NOW_PLAYING__";

// Non-printing separators keep category values free to contain any
// displayable text.
const CATEGORY_SEPARATOR: char = '\u{1f}';
const LEAF_SEPARATOR: char = '\u{1e}';

/// Build a media id from a category path and an optional leaf track id.
pub fn create_media_id(track_id: Option<&str>, categories: &[&str]) -> String {
    let mut id = String::new();
    if let Some((first, rest)) = categories.split_first() {
        id.push_str(first);
        for category in rest {
            id.push(CATEGORY_SEPARATOR);
            id.push_str(category);
        }
    }
    if let Some(track_id) = track_id {
        id.push(LEAF_SEPARATOR);
        id.push_str(track_id);
    }
    id
}

/// Build a browsable category id, e.g. `__BY_ALBUM__/<albumName>`.
pub fn browse_category_id(category_type: &str, category_value: &str) -> String {
    format!("{category_type}{CATEGORY_SEPARATOR}{category_value}")
}

/// Extract the unique track id from a hierarchy-aware media id.
///
/// Returns `None` for browsable ids that carry no leaf.
pub fn extract_track_id(media_id: &str) -> Option<&str> {
    media_id
        .find(LEAF_SEPARATOR)
        .map(|pos| &media_id[pos + LEAF_SEPARATOR.len_utf8()..])
}

/// Split the category path of a media id into its parts, leaf excluded.
pub fn hierarchy(media_id: &str) -> Vec<&str> {
    let category_part = match media_id.find(LEAF_SEPARATOR) {
        Some(pos) => &media_id[..pos],
        None => media_id,
    };
    let mut parts: Vec<&str> = category_part.split(CATEGORY_SEPARATOR).collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts
}

/// Extract the category value from a two-level media id, e.g. the album name
/// from `__BY_ALBUM__/<albumName>|<trackId>`.
pub fn browse_category_value(media_id: &str) -> Option<&str> {
    let parts = hierarchy(media_id);
    if parts.len() == 2 {
        Some(parts[1])
    } else {
        None
    }
}

/// Whether the id names a browsable node (no leaf track id).
pub fn is_browsable(media_id: &str) -> bool {
    !media_id.contains(LEAF_SEPARATOR)
}

/// Compute the parent node id of a media id.
pub fn parent_media_id(media_id: &str) -> String {
    let parts = hierarchy(media_id);
    if !is_browsable(media_id) {
        return create_media_id(None, &parts);
    }
    if parts.len() <= 1 {
        return MEDIA_ID_ROOT.to_string();
    }
    create_media_id(None, &parts[..parts.len() - 1])
}
