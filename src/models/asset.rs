use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "heic" | "tiff" | "tif" => Some(Self::Image),
            "mp4" | "mov" | "m4v" | "webm" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Opaque reference to a single library-managed media item.
///
/// Two handles are equal when their identifiers are equal; the media kind is
/// carried along for filtering but never takes part in comparisons.
#[derive(Debug, Clone)]
pub struct AssetHandle {
    id: Arc<str>,
    kind: MediaKind,
}

impl AssetHandle {
    pub fn new(id: impl Into<Arc<str>>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn image(id: impl Into<Arc<str>>) -> Self {
        Self::new(id, MediaKind::Image)
    }

    pub fn video(id: impl Into<Arc<str>>) -> Self {
        Self::new(id, MediaKind::Video)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

impl PartialEq for AssetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AssetHandle {}

impl Hash for AssetHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_kind() {
        let a = AssetHandle::image("IMG_0001");
        let b = AssetHandle::video("IMG_0001");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("mov"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("txt"), None);
    }
}
