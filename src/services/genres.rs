use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::cache::LruCache;
use crate::clients::MovieCatalog;
use crate::domain::MovieId;

/// Resolves the genre string of a movie through the remote catalog.
///
/// Answers are memoized in a bounded LRU keyed by movie id. A movie the
/// service does not know is cached as `None`; transport or server errors also
/// yield `None` but are not cached, so the next search retries them. Cached
/// genres are never refreshed while the process runs.
pub struct GenreResolver {
    catalog: Arc<dyn MovieCatalog>,
    cache: Mutex<LruCache<MovieId, Option<String>>>,
    concurrency: usize,
}

impl GenreResolver {
    #[must_use]
    pub fn new(catalog: Arc<dyn MovieCatalog>, capacity: usize, concurrency: usize) -> Self {
        Self {
            catalog,
            cache: Mutex::new(LruCache::new(capacity)),
            concurrency: concurrency.max(1),
        }
    }

    fn cached(&self, id: MovieId) -> Option<Option<String>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
    }

    fn remember(&self, id: MovieId, genres: Option<String>) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, genres);
    }

    pub async fn resolve(&self, id: MovieId) -> Option<String> {
        if let Some(hit) = self.cached(id) {
            metrics::counter!("genre_cache_hits_total").increment(1);
            return hit;
        }
        metrics::counter!("genre_cache_misses_total").increment(1);

        match self.catalog.get_movie(id).await {
            Ok(Some(movie)) => {
                self.remember(id, movie.genres.clone());
                movie.genres
            }
            Ok(None) => {
                debug!(movie_id = %id, "Movie unknown to the movie service");
                self.remember(id, None);
                None
            }
            Err(e) => {
                warn!(movie_id = %id, error = %e, "Genre lookup failed");
                metrics::counter!("genre_lookup_failures_total").increment(1);
                None
            }
        }
    }

    /// Resolves many ids with bounded concurrency, preserving input order.
    pub async fn resolve_many(&self, ids: &[MovieId]) -> Vec<Option<String>> {
        stream::iter(ids.iter().copied())
            .map(|id| self.resolve(id))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clients::{CatalogError, RemoteMovie};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory catalog that counts lookups and can fail on chosen ids.
    #[derive(Default)]
    pub struct FakeCatalog {
        pub genres: HashMap<i64, String>,
        pub failing: HashSet<i64>,
        pub lookups: AtomicUsize,
    }

    impl FakeCatalog {
        pub fn with_genres(pairs: &[(i64, &str)]) -> Self {
            Self {
                genres: pairs.iter().map(|(id, g)| (*id, (*g).to_string())).collect(),
                ..Self::default()
            }
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MovieCatalog for FakeCatalog {
        async fn health_check(&self) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn get_movie(&self, id: MovieId) -> Result<Option<RemoteMovie>, CatalogError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&id.value()) {
                return Err(CatalogError::Unhealthy("boom".to_string()));
            }
            Ok(self.genres.get(&id.value()).map(|g| RemoteMovie {
                movie_id: id.value(),
                title: None,
                genres: Some(g.clone()),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeCatalog;
    use super::*;

    #[tokio::test]
    async fn test_hits_are_served_from_cache() {
        let catalog = Arc::new(FakeCatalog::with_genres(&[(1, "Comedy|Drama")]));
        let resolver = GenreResolver::new(catalog.clone(), 10, 2);

        assert_eq!(resolver.resolve(MovieId::new(1)).await.as_deref(), Some("Comedy|Drama"));
        assert_eq!(resolver.resolve(MovieId::new(1)).await.as_deref(), Some("Comedy|Drama"));
        assert_eq!(catalog.lookups(), 1);
    }

    #[tokio::test]
    async fn test_unknown_movies_are_cached_as_none() {
        let catalog = Arc::new(FakeCatalog::default());
        let resolver = GenreResolver::new(catalog.clone(), 10, 2);

        assert!(resolver.resolve(MovieId::new(7)).await.is_none());
        assert!(resolver.resolve(MovieId::new(7)).await.is_none());
        assert_eq!(catalog.lookups(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_retried() {
        let mut fake = FakeCatalog::with_genres(&[(3, "Action")]);
        fake.failing.insert(3);
        let catalog = Arc::new(fake);
        let resolver = GenreResolver::new(catalog.clone(), 10, 2);

        assert!(resolver.resolve(MovieId::new(3)).await.is_none());
        assert!(resolver.resolve(MovieId::new(3)).await.is_none());
        assert_eq!(catalog.lookups(), 2);
        assert_eq!(resolver.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_order_and_respects_capacity() {
        let catalog = Arc::new(FakeCatalog::with_genres(&[
            (1, "Comedy"),
            (2, "Drama"),
            (3, "Horror"),
        ]));
        let resolver = GenreResolver::new(catalog, 2, 3);

        let ids = [MovieId::new(3), MovieId::new(1), MovieId::new(4), MovieId::new(2)];
        let genres = resolver.resolve_many(&ids).await;
        assert_eq!(
            genres,
            vec![
                Some("Horror".to_string()),
                Some("Comedy".to_string()),
                None,
                Some("Drama".to_string()),
            ]
        );
        assert_eq!(resolver.cached_entries(), 2);
    }
}
