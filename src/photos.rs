//! Task photo lists under partial edits.

/// Outcome of removing indices from a task's photo list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoEdit {
    /// Surviving URLs in their original relative order.
    pub kept: Vec<String>,
    /// URLs whose stored objects must be removed.
    pub removed: Vec<String>,
}

/// Splits `existing` into survivors and removals. Indices that do not
/// address a photo are ignored, as are repeats.
pub fn split(existing: &[String], deleted_indices: &[i64]) -> PhotoEdit {
    let mut edit = PhotoEdit::default();
    for (index, url) in existing.iter().enumerate() {
        if deleted_indices.contains(&(index as i64)) {
            edit.removed.push(url.clone());
        } else {
            edit.kept.push(url.clone());
        }
    }
    edit
}

/// Survivors followed by freshly uploaded URLs.
pub fn merge(kept: Vec<String>, uploaded: Vec<String>) -> Vec<String> {
    let mut photos = kept;
    photos.extend(uploaded);
    photos
}
