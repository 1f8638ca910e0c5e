//! In-memory store of loaded tiles.
//!
//! The cache is owned and mutated by the [`MapController`](crate::MapController) only. Tasks
//! that load tiles never touch it: they send their results back to the controller, which
//! installs them with [`TileCache::store`]. Because of that the cache needs no locking.
//!
//! Entries are never evicted. The cache lives for the whole session, so tiles that were loaded
//! once are shown immediately when the user returns to them.

use std::sync::Arc;

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use bytes::Bytes;
use tilemap_types::TileIndex;

use crate::decoded_image::DecodedImage;

/// Identity of a tile image: the tile index together with the resolved URL.
///
/// Standard and hiDPI variants of the same tile (as well as tiles of different layers) have
/// different URLs and so are cached independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileLink {
    /// Index of the tile.
    pub index: TileIndex,
    /// URL the tile is loaded from.
    pub url: Arc<str>,
}

impl TileLink {
    /// Creates a new link.
    pub fn new(index: TileIndex, url: impl Into<Arc<str>>) -> Self {
        Self {
            index,
            url: url.into(),
        }
    }
}

/// Tile storage with in-flight tracking.
#[derive(Debug, Default)]
pub struct TileCache {
    images: HashMap<TileLink, Arc<DecodedImage>>,
    raw: HashMap<TileLink, Bytes>,
    in_flight: HashSet<TileLink>,
    failed: HashSet<TileLink>,
}

impl TileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            raw: HashMap::new(),
            in_flight: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// True if nothing is known about the link yet: it has no decoded image, no raw bytes, is
    /// not being loaded and did not fail permanently.
    pub fn needs_fetch(&self, link: &TileLink) -> bool {
        !self.images.contains_key(link)
            && !self.raw.contains_key(link)
            && !self.in_flight.contains(link)
            && !self.failed.contains(link)
    }

    /// True if the raw bytes of the tile are present but the image is not decoded and no task
    /// is working on it. Such a tile needs only to be decoded, not loaded.
    pub fn needs_decode_only(&self, link: &TileLink) -> bool {
        self.raw.contains_key(link)
            && !self.images.contains_key(link)
            && !self.in_flight.contains(link)
            && !self.failed.contains(link)
    }

    /// Marks the link as being loaded. Returns `false` if it was already marked.
    pub fn mark_in_flight(&mut self, link: TileLink) -> bool {
        self.in_flight.insert(link)
    }

    /// Removes the in-flight marker of the link.
    pub fn clear_in_flight(&mut self, link: &TileLink) {
        self.in_flight.remove(link);
    }

    /// True if a task is loading or decoding the link.
    pub fn is_in_flight(&self, link: &TileLink) -> bool {
        self.in_flight.contains(link)
    }

    /// Number of links being loaded or decoded.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Remembers that the link cannot be loaded, so that it is never requested again.
    pub fn mark_failed(&mut self, link: TileLink) {
        self.in_flight.remove(&link);
        self.failed.insert(link);
    }

    /// True if the link was marked as failed.
    pub fn is_failed(&self, link: &TileLink) -> bool {
        self.failed.contains(link)
    }

    /// Installs the raw bytes and the decoded image of a tile together.
    pub fn store(&mut self, link: TileLink, raw: Bytes, image: Arc<DecodedImage>) {
        self.failed.remove(&link);
        self.raw.insert(link.clone(), raw);
        self.images.insert(link, image);
    }

    /// Stores only the raw bytes of a tile, e.g. when they come from an external source. The
    /// image will be decoded the next time the tile is needed.
    pub fn store_raw(&mut self, link: TileLink, raw: Bytes) {
        self.raw.insert(link, raw);
    }

    /// Decoded image of the tile, if loaded.
    pub fn lookup_image(&self, link: &TileLink) -> Option<&Arc<DecodedImage>> {
        self.images.get(link)
    }

    /// Raw bytes of the tile, if loaded.
    pub fn lookup_raw_bytes(&self, link: &TileLink) -> Option<&Bytes> {
        self.raw.get(link)
    }

    /// Number of tiles with decoded images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True if no tile image is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tilemap_types::cartesian::Size;

    use super::*;

    fn link(x: u32) -> TileLink {
        TileLink::new(TileIndex::new(x, 0, 4), format!("https://t/4/{x}/0.png"))
    }

    fn image() -> Arc<DecodedImage> {
        Arc::new(DecodedImage::from_raw(vec![1; 4], Size::new(1, 1)).unwrap())
    }

    #[test]
    fn empty_cache_needs_fetch() {
        let cache = TileCache::new();
        assert!(cache.needs_fetch(&link(1)));
        assert!(!cache.needs_decode_only(&link(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn in_flight_blocks_fetch() {
        let mut cache = TileCache::new();
        assert!(cache.mark_in_flight(link(1)));
        assert!(!cache.mark_in_flight(link(1)));
        assert!(!cache.needs_fetch(&link(1)));
        assert!(cache.needs_fetch(&link(2)));

        cache.clear_in_flight(&link(1));
        assert!(cache.needs_fetch(&link(1)));
    }

    #[test]
    fn stored_image_is_visible() {
        let mut cache = TileCache::new();
        let image = image();
        cache.mark_in_flight(link(1));
        cache.clear_in_flight(&link(1));
        cache.store(link(1), Bytes::from_static(b"png"), image.clone());

        assert!(Arc::ptr_eq(cache.lookup_image(&link(1)).unwrap(), &image));
        assert_eq!(
            cache.lookup_raw_bytes(&link(1)).unwrap(),
            &Bytes::from_static(b"png")
        );
        assert!(!cache.needs_fetch(&link(1)));
        assert!(!cache.needs_decode_only(&link(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn raw_only_needs_decode() {
        let mut cache = TileCache::new();
        cache.store_raw(link(1), Bytes::from_static(b"png"));
        assert!(!cache.needs_fetch(&link(1)));
        assert!(cache.needs_decode_only(&link(1)));

        cache.mark_in_flight(link(1));
        assert!(!cache.needs_decode_only(&link(1)));
    }

    #[test]
    fn failed_link_is_not_requested() {
        let mut cache = TileCache::new();
        cache.mark_in_flight(link(1));
        cache.mark_failed(link(1));

        assert!(!cache.is_in_flight(&link(1)));
        assert!(cache.is_failed(&link(1)));
        assert!(!cache.needs_fetch(&link(1)));
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[test]
    fn variants_are_independent() {
        let mut cache = TileCache::new();
        let index = TileIndex::new(3, 3, 3);
        let standard = TileLink::new(index, "https://t/l/3/3/3.png");
        let hidpi = TileLink::new(index, "https://t/l@2x/3/3/3.png");

        cache.store(standard.clone(), Bytes::new(), image());
        assert!(cache.lookup_image(&standard).is_some());
        assert!(cache.needs_fetch(&hidpi));
    }
}
