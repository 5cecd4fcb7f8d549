//! Pairs catalog manager records with media server records.
//!
//! Two records describe the same item when their normalized titles and their
//! years are equal. This is a heuristic: distinct items that normalize to the
//! same key in the same year collide, and every colliding pair is kept.

use crate::normalize::normalize_title;
use labelarr_models::{CatalogRecord, MediaRecord};
use std::collections::{BTreeSet, HashMap};

/// Normalized title plus year
pub type CorrelationKey = (String, Option<u32>);

pub fn correlation_key(title: &str, year: Option<u32>) -> CorrelationKey {
    (normalize_title(title), year)
}

fn index_by_key<T>(items: &[T], key: impl Fn(&T) -> CorrelationKey) -> HashMap<CorrelationKey, Vec<usize>> {
    let mut index: HashMap<CorrelationKey, Vec<usize>> = HashMap::new();
    for (pos, item) in items.iter().enumerate() {
        index.entry(key(item)).or_default().push(pos);
    }
    index
}

fn catalog_key(record: &CatalogRecord) -> CorrelationKey {
    correlation_key(&record.title, record.year)
}

fn media_key(record: &MediaRecord) -> CorrelationKey {
    correlation_key(&record.title, record.year)
}

/// Matching pairs ordered by catalog record, then by media record.
pub fn correlate<'a>(catalog: &'a [CatalogRecord], media: &'a [MediaRecord]) -> Vec<(&'a CatalogRecord, &'a MediaRecord)> {
    let index = index_by_key(media, media_key);
    let mut pairs = Vec::new();
    for record in catalog {
        if let Some(positions) = index.get(&catalog_key(record)) {
            pairs.extend(positions.iter().map(|&pos| (record, &media[pos])));
        }
    }
    pairs
}

/// Matching pairs ordered by media record, then by catalog record.
pub fn correlate_media_major<'a>(media: &'a [MediaRecord], catalog: &'a [CatalogRecord]) -> Vec<(&'a MediaRecord, &'a CatalogRecord)> {
    let index = index_by_key(catalog, catalog_key);
    let mut pairs = Vec::new();
    for record in media {
        if let Some(positions) = index.get(&media_key(record)) {
            pairs.extend(positions.iter().map(|&pos| (record, &catalog[pos])));
        }
    }
    pairs
}

/// Keys that produce more than one pair, sorted.
///
/// A key is ambiguous when it appears on both sides and at least one side
/// holds it more than once.
pub fn ambiguous_keys(catalog: &[CatalogRecord], media: &[MediaRecord]) -> Vec<CorrelationKey> {
    let catalog_index = index_by_key(catalog, catalog_key);
    let media_index = index_by_key(media, media_key);

    let ambiguous: BTreeSet<CorrelationKey> = catalog_index
        .iter()
        .filter_map(|(key, catalog_hits)| {
            let media_hits = media_index.get(key)?;
            (catalog_hits.len() * media_hits.len() > 1).then(|| key.clone())
        })
        .collect();
    ambiguous.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelarr_models::CatalogId;

    fn catalog(id: u64, title: &str, year: Option<u32>) -> CatalogRecord {
        CatalogRecord::new(id, title, year, Vec::<u32>::new())
    }

    fn media(key: &str, title: &str, year: Option<u32>) -> MediaRecord {
        MediaRecord::new(key, title, year, Vec::<String>::new())
    }

    #[test]
    fn test_pairs_on_normalized_title_and_year() {
        let catalog = vec![
            catalog(1, "Amelie", Some(2001)),
            catalog(2, "Inception", Some(2010)),
            catalog(3, "Dune", Some(2021)),
        ];
        let media = vec![
            media("a", "Amélie (2001)", Some(2001)),
            media("b", "Inception", Some(2010)),
            media("c", "Dune", Some(1984)),
        ];

        let pairs: Vec<_> = correlate(&catalog, &media)
            .into_iter()
            .map(|(c, m)| (c.id, m.rating_key.as_str()))
            .collect();
        assert_eq!(pairs, vec![(CatalogId(1), "a"), (CatalogId(2), "b")]);
    }

    #[test]
    fn test_missing_years_match_each_other_only() {
        let catalog = vec![catalog(1, "Bluey", None)];
        let with_year = vec![media("a", "Bluey", Some(2018))];
        let without_year = vec![media("b", "Bluey", None)];

        assert!(correlate(&catalog, &with_year).is_empty());
        assert_eq!(correlate(&catalog, &without_year).len(), 1);
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let catalog = vec![
            catalog(1, "Tom and Jerry", Some(2021)),
            catalog(2, "Alien", Some(1979)),
            catalog(3, "Heat", Some(1995)),
        ];
        let media = vec![
            media("x", "Heat", Some(1995)),
            media("y", "Tom & Jerry", Some(2021)),
            media("z", "Aliens", Some(1986)),
        ];

        let mut forward: Vec<_> = correlate(&catalog, &media)
            .into_iter()
            .map(|(c, m)| (c.id, m.rating_key.clone()))
            .collect();
        let mut backward: Vec<_> = correlate_media_major(&media, &catalog)
            .into_iter()
            .map(|(m, c)| (c.id, m.rating_key.clone()))
            .collect();
        forward.sort();
        backward.sort();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_pair_order_follows_outer_then_inner_list() {
        let catalog = vec![catalog(1, "Heat", Some(1995)), catalog(2, "Alien", Some(1979))];
        let media = vec![
            media("alien", "Alien", Some(1979)),
            media("heat-1", "Heat", Some(1995)),
            media("heat-2", "HEAT", Some(1995)),
        ];

        let catalog_major: Vec<_> = correlate(&catalog, &media)
            .into_iter()
            .map(|(_, m)| m.rating_key.as_str())
            .collect();
        assert_eq!(catalog_major, vec!["heat-1", "heat-2", "alien"]);

        let media_major: Vec<_> = correlate_media_major(&media, &catalog)
            .into_iter()
            .map(|(m, _)| m.rating_key.as_str())
            .collect();
        assert_eq!(media_major, vec!["alien", "heat-1", "heat-2"]);
    }

    #[test]
    fn test_collisions_are_kept_and_reported() {
        // Two different films that normalize identically in the same year
        let catalog = vec![catalog(1, "Crash", Some(2004)), catalog(2, "Crash!", Some(2004))];
        let media = vec![media("a", "Crash", Some(2004)), media("b", "Solo", Some(2018))];

        assert_eq!(correlate(&catalog, &media).len(), 2);
        assert_eq!(
            ambiguous_keys(&catalog, &media),
            vec![("crash".to_string(), Some(2004))]
        );
    }

    #[test]
    fn test_duplicates_without_counterpart_are_not_ambiguous() {
        let catalog = vec![catalog(1, "Crash", Some(2004)), catalog(2, "Crash", Some(2004))];
        let media = vec![media("a", "Solo", Some(2018))];
        assert!(ambiguous_keys(&catalog, &media).is_empty());
    }
}
