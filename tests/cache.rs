use std::time::Duration;

use jmd_backoffice_api::cache::{CatalogueCache, TtlCache};
use uuid::Uuid;

#[test]
fn entries_are_served_until_they_expire() {
    let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(40));
    cache.insert("shirt", 500);
    assert_eq!(cache.get(&"shirt"), Some(500));

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(cache.get(&"shirt"), None);
    assert!(cache.is_empty(), "expired entries are evicted on read");
}

#[test]
fn invalidate_drops_a_single_key() {
    let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
    cache.insert("shirt", 500);
    cache.insert("trouser", 650);

    cache.invalidate(&"shirt");
    assert_eq!(cache.get(&"shirt"), None);
    assert_eq!(cache.get(&"trouser"), Some(650));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn disabled_cache_never_stores() {
    let cache: TtlCache<&str, u32> = TtlCache::disabled();
    cache.insert("shirt", 500);
    assert_eq!(cache.get(&"shirt"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn catalogue_cache_clones_share_entries() {
    let cache = CatalogueCache::new(Duration::from_secs(60));
    let other = cache.clone();
    let id = Uuid::new_v4();

    other.clients().invalidate(&id);
    assert!(cache.items().is_empty());
    assert!(cache.fabrics().get(&id).is_none());
    assert!(CatalogueCache::disabled().branches().is_empty());
}
