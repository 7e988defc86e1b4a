//! Services: registry fetching, notification rendering and delivery.

pub mod fetcher;
pub mod notifier;
pub mod render;

pub use fetcher::{HttpPageSource, Page, PageMeta, PageSource, RegistryFetcher};
pub use notifier::{DispatchOutcome, HttpNotifier, Notifier, dispatch};
