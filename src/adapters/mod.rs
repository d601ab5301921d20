// Adapters layer: concrete implementations for external systems
// (filesystem storage, CSV files, the entity model file, the news API).

pub mod csv_codec;
pub mod entity_model;
pub mod news_api;
pub mod storage;

pub use entity_model::GazetteerModel;
pub use news_api::NewsApiClient;
pub use storage::LocalStorage;
