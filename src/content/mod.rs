//! Generated content model.
//!
//! `GeneratedContentItem` is a sum type over the kinds of output a session
//! can hold (improved copy, alternatives, restyles, headlines, SEO metadata).
//! `ContentStore` keeps them in creation order.

pub mod item;
pub mod store;

pub use item::{
    ContentKind, ContentVariant, CopyBody, CopySection, GeneratedContentItem, GeoScore,
    PromptEvaluation, ScoreData, SeoMetadata, SourceRef,
};
pub use store::ContentStore;
