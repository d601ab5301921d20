pub mod entities;
pub mod entity_list;
pub mod scorer;

pub use entities::EntityExtractor;
pub use entity_list::{decode_entity_list, encode_entity_list};
pub use scorer::{RiskKeywordTable, RiskScorer, DEFAULT_RISK_KEYWORDS};
