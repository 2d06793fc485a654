pub mod movie_service;

pub use movie_service::{CatalogError, MovieCatalog, MovieClient, RemoteMovie};
