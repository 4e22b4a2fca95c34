//! Correlation identifier shared by logs, responses and error envelopes.
//!
//! The current id lives in task-local storage for the duration of a request.
//! Task locals do not follow `tokio::spawn` or `spawn_blocking`; wrap moved
//! work in [`TraceId::scope`] to keep the correlation.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Header carrying the trace identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// UUID correlating everything produced while serving one request.
///
/// # Examples
/// ```
/// use portal::TraceId;
///
/// async fn handler() -> Option<String> {
///     TraceId::current().map(|id| id.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Adopt an id forwarded by a proxy or client, or mint a fresh one.
    ///
    /// Only well-formed, non-nil UUIDs are adopted so callers cannot inject
    /// arbitrary text into logs.
    ///
    /// # Examples
    /// ```
    /// use portal::TraceId;
    ///
    /// let forwarded = "3f2b8c1e-9a4d-4d6e-8f7a-1c2b3d4e5f60";
    /// assert_eq!(TraceId::adopt_or_generate(Some(forwarded)).to_string(), forwarded);
    /// assert_ne!(TraceId::adopt_or_generate(Some("<script>")).to_string(), "<script>");
    /// ```
    #[must_use]
    pub fn adopt_or_generate(forwarded: Option<&str>) -> Self {
        forwarded
            .and_then(|raw| raw.trim().parse::<Self>().ok())
            .filter(|id| !id.0.is_nil())
            .unwrap_or_else(Self::generate)
    }

    /// The id in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
