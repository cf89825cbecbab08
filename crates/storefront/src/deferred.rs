//! Deferred page sections.
//!
//! A page awaits what it needs above the fold (the header, the product) and
//! spawns everything else as [`Deferred`] tasks that run concurrently with
//! rendering. [`StreamingPage`] sends the rendered page straight away with
//! placeholders where deferred sections go, then streams each section as it
//! resolves:
//!
//! ```text
//! <html>...<div id="deferred-cart">Laddar varukorg ...</div>...     (shell)
//! <template id="deferred-cart-content">...</template><script>...    (per section,
//!                                                                     arrival order)
//! </body></html>                                                     (tail)
//! ```
//!
//! The swap script replaces the placeholder with the template's content.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, FuturesUnordered, Stream, StreamExt};
use thiserror::Error;
use tokio::task::AbortHandle;

/// Why a deferred value never arrived.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeferredError {
    /// The task returned an error.
    #[error("{0}")]
    Failed(String),

    /// The task panicked or was cancelled.
    #[error("deferred task aborted: {0}")]
    Aborted(String),
}

// =============================================================================
// Deferred
// =============================================================================

/// A value being loaded by a spawned task.
///
/// Cloning is cheap; every clone resolves to the same result, so one query
/// can feed several sections (e.g., the cart badge and the cart page).
pub struct Deferred<T: Clone> {
    inner: Shared<BoxFuture<'static, Result<T, DeferredError>>>,
}

/// Aborts a spawned task when dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start `future` on the runtime without waiting for it.
    ///
    /// The task is aborted once every clone is dropped without the value
    /// having been awaited.
    pub fn spawn<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let guard = AbortOnDrop(handle.abort_handle());
        let inner = async move {
            let _guard = guard;
            match handle.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Deferred section failed");
                    Err(DeferredError::Failed(e.to_string()))
                }
                Err(e) => Err(DeferredError::Aborted(e.to_string())),
            }
        }
        .boxed()
        .shared();

        Self { inner }
    }

    /// An already available value.
    #[must_use]
    pub fn ready(value: T) -> Self {
        Self {
            inner: futures::future::ready(Ok(value)).boxed().shared(),
        }
    }

    /// Wait for the value.
    ///
    /// # Errors
    ///
    /// Returns the task's error if it failed or panicked.
    pub async fn resolve(&self) -> Result<T, DeferredError> {
        self.inner.clone().await
    }
}

// =============================================================================
// StreamingPage
// =============================================================================

struct Section {
    id: String,
    html: BoxFuture<'static, String>,
}

/// A rendered page whose deferred sections stream in after it.
pub struct StreamingPage {
    shell: String,
    tail: String,
    nonce: String,
    sections: Vec<Section>,
}

impl StreamingPage {
    /// Split a rendered page into the part sent first and the closing tags.
    ///
    /// Sections are streamed just before `</body>`.
    #[must_use]
    pub fn new(html: String, nonce: impl Into<String>) -> Self {
        let (shell, tail) = match html.rfind("</body>") {
            Some(at) => {
                let (shell, tail) = html.split_at(at);
                (shell.to_string(), tail.to_string())
            }
            None => (html, String::new()),
        };

        Self {
            shell,
            tail,
            nonce: nonce.into(),
            sections: Vec::new(),
        }
    }

    /// Add a section that replaces the `deferred-{id}` placeholder.
    ///
    /// `render` turns the value into HTML; if loading or rendering fails
    /// the placeholder is replaced with `error_element`.
    #[must_use]
    pub fn section<T, F, E>(
        mut self,
        id: &str,
        value: Deferred<T>,
        render: F,
        error_element: &'static str,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<String, E> + Send + 'static,
        E: Display,
    {
        let section_id = id.to_string();
        let html = async move {
            match value.resolve().await {
                Ok(value) => render(value).unwrap_or_else(|e| {
                    tracing::error!(section = %section_id, error = %e, "Failed to render deferred section");
                    error_element.to_string()
                }),
                Err(_) => error_element.to_string(),
            }
        }
        .boxed();

        self.sections.push(Section {
            id: id.to_string(),
            html,
        });
        self
    }

    /// Body chunks: shell, sections in arrival order, tail.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
        let Self {
            shell,
            tail,
            nonce,
            sections,
        } = self;

        let resolved: FuturesUnordered<_> = sections
            .into_iter()
            .map(|section| {
                let nonce = nonce.clone();
                async move { swap_chunk(&section.id, &section.html.await, &nonce) }
            })
            .collect();

        stream::once(async move { shell })
            .chain(resolved)
            .chain(stream::once(async move { tail }))
            .map(|chunk| Ok(Bytes::from(chunk)))
    }

    /// Wait for every section and return the whole document.
    pub async fn resolve_all(self) -> String {
        self.into_stream()
            .fold(String::new(), |mut html, chunk| async move {
                if let Ok(bytes) = chunk {
                    html.push_str(&String::from_utf8_lossy(&bytes));
                }
                html
            })
            .await
    }
}

impl IntoResponse for StreamingPage {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            Body::from_stream(self.into_stream()),
        )
            .into_response()
    }
}

/// Placeholder element ID for a section.
#[must_use]
pub fn placeholder_id(id: &str) -> String {
    format!("deferred-{id}")
}

fn swap_chunk(id: &str, html: &str, nonce: &str) -> String {
    let target = placeholder_id(id);
    format!(
        "<template id=\"{target}-content\">{html}</template>\
         <script nonce=\"{nonce}\">(function(){{\
         var t=document.getElementById(\"{target}-content\"),p=document.getElementById(\"{target}\");\
         if(t&&p){{p.replaceWith(t.content.cloneNode(true));}}if(t){{t.remove();}}\
         }})();</script>"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn page() -> StreamingPage {
        StreamingPage::new(
            "<html><body><div id=\"deferred-slow\"></div><div id=\"deferred-fast\"></div></body></html>"
                .to_string(),
            "n0nce",
        )
    }

    #[tokio::test]
    async fn test_shell_first_then_arrival_order() {
        let slow = Deferred::spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, Infallible>("slow")
        });
        let fast = Deferred::spawn(async { Ok::<_, Infallible>("fast") });

        let chunks: Vec<String> = page()
            .section("slow", slow, |v| Ok::<_, Infallible>(v.to_string()), "fel")
            .section("fast", fast, |v| Ok::<_, Infallible>(v.to_string()), "fel")
            .into_stream()
            .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 4);
        assert!(chunks[0].starts_with("<html><body>"));
        assert!(!chunks[0].contains("</body>"));
        assert!(chunks[1].contains("<template id=\"deferred-fast-content\">fast</template>"));
        assert!(chunks[2].contains("<template id=\"deferred-slow-content\">slow</template>"));
        assert!(chunks[2].contains("nonce=\"n0nce\""));
        assert_eq!(chunks[3], "</body></html>");
    }

    #[tokio::test]
    async fn test_failed_section_renders_error_element() {
        let failing = Deferred::<String>::spawn(async { Err::<String, _>("boom") });
        let html = page()
            .section("slow", failing.clone(), Ok::<_, Infallible>, "Ett problem uppstod")
            .resolve_all()
            .await;
        assert!(html.contains(">Ett problem uppstod</template>"));
        assert_eq!(
            failing.resolve().await.unwrap_err(),
            DeferredError::Failed("boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_clones_share_one_task() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let value = Deferred::spawn(async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, Infallible>(7)
        });
        let other = value.clone();
        assert_eq!(value.resolve().await.unwrap(), 7);
        assert_eq!(other.resolve().await.unwrap(), 7);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_value_aborts_task() {
        let finished = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = finished.clone();
        let value = Deferred::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, Infallible>(())
        });

        drop(value);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_ready_value() {
        assert_eq!(Deferred::ready(3).resolve().await.unwrap(), 3);
    }
}
