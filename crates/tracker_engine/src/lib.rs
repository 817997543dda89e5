//! Tracker engine: fetching, decoding, metadata and highlight extraction,
//! baseline files and notification delivery around the pure `tracker_core` logic.
mod baseline;
mod decode;
mod engine;
mod extract;
mod fetch;
mod highlight;
mod notify;
mod persist;
mod types;

pub use baseline::JsonBaselineStore;
pub use decode::{decode_body, DecodedBody};
pub use engine::{Clock, RunEngine};
pub use extract::{default_meta_rules, HtmlMetaExtractor, MetaExtractor, MetaRule, ParseError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use highlight::{default_highlight_selectors, SelectorRule, SelectorSpec};
pub use notify::{
    discord_payload, DiscordWebhookNotifier, LogNotifier, Notifier, NotifyError,
    MAX_EMBED_DESCRIPTION,
};
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
