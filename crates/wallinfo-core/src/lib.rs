// wallinfo-core: Template resolution and placement between wallinfo-source and consumers (CLI).

pub mod builtins;
pub mod connection;
pub mod error;
pub mod extract;
pub mod placement;
pub mod refresh;
pub mod registry;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use builtins::Builtins;
pub use connection::{Connection, ContentType};
pub use error::{CoreError, ExtractError, ParseError};
pub use extract::extract;
pub use placement::{PlacementRect, PlacementStatus, ScaleContext, TargetPoint, to_target};
pub use refresh::{RefreshLoop, RenderOutcome};
pub use registry::{ConnectionRegistry, SharedRegistry};
pub use template::{ConnectionInspection, RenderReport, Resolution, TagResolution, TemplateRenderer};

// Source-layer types that appear in this crate's public API.
pub use wallinfo_source::{
    AuthType, Fetcher, HttpMethod, SourceFetcher, SourceKind, TlsMode, TransportConfig,
};
