pub mod dashboard;
pub use dashboard::{DashboardError, DashboardService, OverviewCharts, TagInsights};

pub mod enrichment;
pub use enrichment::{EnrichmentError, EnrichmentReport, run_enrichment};

pub mod explorer;
pub use explorer::{
    ExplorerError, ExplorerOptions, ExplorerService, MovieCard, MovieFilter, SearchResults,
    SearchSummary,
};

pub mod genres;
pub use genres::GenreResolver;
