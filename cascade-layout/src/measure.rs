//! Height resolution capabilities and the sandbox measurement strategy.
//!
//! The engine never talks to a concrete UI host. Instead it goes through a
//! small set of seams:
//!
//! - [`HeightResolver`] produces an item's rendered height. A caller-supplied
//!   hook fully replaces the default strategy.
//! - [`ItemRenderer`] turns an item into a host-specific subtree. The engine
//!   does not interpret the subtree beyond asking for the images inside it.
//! - [`MeasureHost`] mounts subtrees into an invisible off-screen sandbox and
//!   reports the rendered height. DOM hosts, test hosts and server-side
//!   renderers all fit behind the same trait.
//!
//! The default strategy, [`SandboxResolver`], composes a renderer with a
//! host: render off-screen at the configured width, wait for every image in
//! the subtree to settle, substitute a placeholder for failed ones, read the
//! box height, unmount.

use std::{collections::HashMap, sync::Arc};

use futures_util::future::{BoxFuture, join_all};
use tracing::trace;

use crate::{error::MeasureError, placement::CellPosition, px::Px};

/// Built-in placeholder substituted for images that fail to load when the
/// caller supplies no error image. A 1x1 transparent PNG data URI.
pub const FALLBACK_IMAGE_SRC: &str = "data:image/png;base64,\
iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Per-pass inputs handed to height resolvers.
#[derive(Clone, Debug)]
pub struct MeasureContext {
    /// Fixed item width the sandbox renders at.
    pub width: Px,
    /// Placeholder image source substituted on load failure.
    pub error_image: Arc<str>,
    /// Named host container scoping the sandbox.
    pub container: Arc<str>,
}

/// Resolves one item's rendered height.
///
/// Any `Fn(Arc<T>, MeasureContext) -> BoxFuture<'static, Result<Px,
/// MeasureError>>` closure is a resolver, so a height hook can be passed
/// directly where a resolver is expected; its result is trusted verbatim
/// with no further validation.
pub trait HeightResolver<T>: Send + Sync {
    /// Produces the rendered height of `item` in pixels, suspending until it
    /// is determinable.
    fn resolve(
        &self,
        item: Arc<T>,
        ctx: MeasureContext,
    ) -> BoxFuture<'static, Result<Px, MeasureError>>;
}

impl<T, F> HeightResolver<T> for F
where
    F: Fn(Arc<T>, MeasureContext) -> BoxFuture<'static, Result<Px, MeasureError>> + Send + Sync,
{
    fn resolve(
        &self,
        item: Arc<T>,
        ctx: MeasureContext,
    ) -> BoxFuture<'static, Result<Px, MeasureError>> {
        self(item, ctx)
    }
}

/// Turns an item into a host-specific subtree.
pub trait ItemRenderer<T>: Send + Sync {
    /// Subtree representation understood by the paired [`MeasureHost`].
    type Subtree: Send;

    /// Renders `item` for the given position context. During measurement the
    /// position is [`CellPosition::MEASURE`].
    fn render(&self, item: &Arc<T>, position: CellPosition) -> Self::Subtree;
}

/// Host able to mount subtrees off-screen and report their rendered height.
pub trait MeasureHost: Send + Sync {
    /// Subtree representation this host can mount.
    type Subtree: Send;
    /// Sandbox handle for one mounted subtree.
    type Sandbox: Sandbox + Send;

    /// Mounts `subtree` into an invisible, absolutely positioned off-screen
    /// sandbox of the given width, inside the container named `container`.
    /// Hosts fall back to their root when no such container exists; a
    /// missing container is never an error.
    fn mount(&self, subtree: Self::Subtree, width: Px, container: &str) -> Self::Sandbox;
}

/// One mounted subtree. Dropping the sandbox removes it from the host.
pub trait Sandbox {
    /// Image handle type exposed by this sandbox.
    type Image: ImageSlot + Send;

    /// Hands out the image slots found in the mounted subtree. Called once
    /// per measurement.
    fn take_images(&mut self) -> Vec<Self::Image>;

    /// Rendered box height. Only read after every image slot has settled.
    fn height(&self) -> Px;
}

/// One image inside a mounted subtree.
pub trait ImageSlot {
    /// Current source, if the image declared one.
    fn source(&self) -> Option<String>;

    /// Declared key the substituted source is written back under.
    fn fallback_key(&self) -> Option<String>;

    /// Whether a failure was already answered with a substitution.
    fn substituted(&self) -> bool;

    /// Marks the slot so a second failure settles instead of retrying.
    fn mark_substituted(&mut self);

    /// Points the image at a new source.
    fn set_source(&mut self, source: &str);

    /// Suspends until the current source finishes loading or erroring.
    fn wait(&mut self) -> BoxFuture<'_, ImageLoad>;
}

/// Outcome of waiting on one image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoad {
    /// The source loaded.
    Loaded,
    /// The source errored.
    Failed,
}

/// Write-back seam for substituted image sources.
///
/// When an image fails and a placeholder is substituted, the sandbox
/// strategy hands `declared key -> placeholder source` back to the item,
/// mirroring how the item data drove the image in the first place.
/// Implementations typically use interior mutability; the default ignores
/// the patch.
pub trait ImagePatch {
    /// Stores `source` under the image `key`.
    fn patch_image_source(&self, key: &str, source: &str) {
        let _ = (key, source);
    }
}

/// Default height strategy: render off-screen, wait for images, read the
/// rendered height, unmount.
pub struct SandboxResolver<R, H> {
    renderer: Arc<R>,
    host: Arc<H>,
}

impl<R, H> SandboxResolver<R, H> {
    /// Pairs a renderer with the host that can mount its subtrees.
    pub fn new(renderer: Arc<R>, host: Arc<H>) -> Self {
        Self { renderer, host }
    }
}

impl<T, R, H> HeightResolver<T> for SandboxResolver<R, H>
where
    T: ImagePatch + Send + Sync + 'static,
    R: ItemRenderer<T> + 'static,
    H: MeasureHost<Subtree = R::Subtree> + 'static,
{
    fn resolve(
        &self,
        item: Arc<T>,
        ctx: MeasureContext,
    ) -> BoxFuture<'static, Result<Px, MeasureError>> {
        let renderer = self.renderer.clone();
        let host = self.host.clone();
        Box::pin(async move {
            let subtree = renderer.render(&item, CellPosition::MEASURE);
            let mut sandbox = host.mount(subtree, ctx.width, &ctx.container);
            let substitutions = settle_images(sandbox.take_images(), &ctx.error_image).await;
            for (key, source) in &substitutions {
                item.patch_image_source(key, source);
            }
            let height = sandbox.height();
            trace!(height = height.raw(), "sandbox measurement complete");
            Ok(height)
        })
    }
}

/// Waits until every image slot has settled and returns the map of
/// `declared key -> substituted source` for the images that failed.
///
/// An image with no source settles immediately with no substitution. A
/// failed image is pointed at `error_src` once and waited on again; a second
/// failure (for example the placeholder itself failing) counts as settled
/// either way. An empty slice settles immediately with an empty map.
pub async fn settle_images<I>(images: Vec<I>, error_src: &str) -> HashMap<String, String>
where
    I: ImageSlot + Send,
{
    let settles = images.into_iter().map(|mut image| async move {
        if image.source().is_none() {
            return None;
        }
        let mut substitution = None;
        loop {
            match image.wait().await {
                ImageLoad::Loaded => break,
                ImageLoad::Failed if image.substituted() => break,
                ImageLoad::Failed => {
                    image.mark_substituted();
                    if let Some(key) = image.fallback_key() {
                        substitution = Some((key, error_src.to_string()));
                    }
                    image.set_source(error_src);
                }
            }
        }
        substitution
    });
    join_all(settles).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use futures_util::FutureExt as _;
    use parking_lot::Mutex;

    use super::*;

    struct FakeImage {
        source: Option<String>,
        key: Option<String>,
        substituted: bool,
        outcomes: VecDeque<ImageLoad>,
    }

    impl FakeImage {
        fn loading(key: &str, outcomes: &[ImageLoad]) -> Self {
            Self {
                source: Some("https://example.test/a.png".to_string()),
                key: Some(key.to_string()),
                substituted: false,
                outcomes: outcomes.iter().copied().collect(),
            }
        }

        fn sourceless() -> Self {
            Self {
                source: None,
                key: None,
                substituted: false,
                outcomes: VecDeque::new(),
            }
        }
    }

    impl ImageSlot for FakeImage {
        fn source(&self) -> Option<String> {
            self.source.clone()
        }

        fn fallback_key(&self) -> Option<String> {
            self.key.clone()
        }

        fn substituted(&self) -> bool {
            self.substituted
        }

        fn mark_substituted(&mut self) {
            self.substituted = true;
        }

        fn set_source(&mut self, source: &str) {
            self.source = Some(source.to_string());
        }

        fn wait(&mut self) -> BoxFuture<'_, ImageLoad> {
            let outcome = self.outcomes.pop_front().unwrap_or(ImageLoad::Loaded);
            async move { outcome }.boxed()
        }
    }

    #[tokio::test]
    async fn empty_set_settles_immediately() {
        let subs = settle_images(Vec::<FakeImage>::new(), FALLBACK_IMAGE_SRC).await;
        assert!(subs.is_empty());
    }

    #[tokio::test]
    async fn sourceless_image_settles_without_substitution() {
        let subs = settle_images(vec![FakeImage::sourceless()], FALLBACK_IMAGE_SRC).await;
        assert!(subs.is_empty());
    }

    #[tokio::test]
    async fn failed_image_substitutes_placeholder_once() {
        let images = vec![
            FakeImage::loading("cover", &[ImageLoad::Failed, ImageLoad::Loaded]),
            FakeImage::loading("avatar", &[ImageLoad::Loaded]),
        ];
        let subs = settle_images(images, "placeholder.png").await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs.get("cover").map(String::as_str), Some("placeholder.png"));
    }

    #[tokio::test]
    async fn failing_placeholder_still_settles() {
        let images = vec![FakeImage::loading(
            "cover",
            &[ImageLoad::Failed, ImageLoad::Failed],
        )];
        let subs = settle_images(images, "placeholder.png").await;
        // The substitution was recorded before the placeholder failed.
        assert_eq!(subs.get("cover").map(String::as_str), Some("placeholder.png"));
    }

    struct FakeItem {
        lines: i32,
        image_outcomes: Vec<ImageLoad>,
        patched: Mutex<HashMap<String, String>>,
    }

    impl ImagePatch for FakeItem {
        fn patch_image_source(&self, key: &str, source: &str) {
            self.patched
                .lock()
                .insert(key.to_string(), source.to_string());
        }
    }

    struct FakeSubtree {
        height: Px,
        images: Vec<FakeImage>,
    }

    struct FakeRenderer;

    impl ItemRenderer<FakeItem> for FakeRenderer {
        type Subtree = FakeSubtree;

        fn render(&self, item: &Arc<FakeItem>, _position: CellPosition) -> FakeSubtree {
            FakeSubtree {
                height: Px(item.lines * 18),
                images: vec![FakeImage::loading("cover", &item.image_outcomes)],
            }
        }
    }

    struct FakeHost {
        mounted_in: Mutex<Vec<String>>,
    }

    struct FakeSandbox {
        subtree: FakeSubtree,
    }

    impl Sandbox for FakeSandbox {
        type Image = FakeImage;

        fn take_images(&mut self) -> Vec<FakeImage> {
            std::mem::take(&mut self.subtree.images)
        }

        fn height(&self) -> Px {
            self.subtree.height
        }
    }

    impl MeasureHost for FakeHost {
        type Subtree = FakeSubtree;
        type Sandbox = FakeSandbox;

        fn mount(&self, subtree: FakeSubtree, _width: Px, container: &str) -> FakeSandbox {
            self.mounted_in.lock().push(container.to_string());
            FakeSandbox { subtree }
        }
    }

    fn measure_ctx() -> MeasureContext {
        MeasureContext {
            width: Px(240),
            error_image: Arc::from("placeholder.png"),
            container: Arc::from("feed"),
        }
    }

    #[tokio::test]
    async fn sandbox_resolver_measures_and_patches() {
        let item = Arc::new(FakeItem {
            lines: 5,
            image_outcomes: vec![ImageLoad::Failed, ImageLoad::Loaded],
            patched: Mutex::new(HashMap::new()),
        });
        let host = Arc::new(FakeHost {
            mounted_in: Mutex::new(Vec::new()),
        });
        let resolver = SandboxResolver::new(Arc::new(FakeRenderer), host.clone());

        let height = resolver
            .resolve(item.clone(), measure_ctx())
            .await
            .expect("measurement succeeds");

        assert_eq!(height, Px(90));
        assert_eq!(host.mounted_in.lock().as_slice(), ["feed".to_string()]);
        assert_eq!(
            item.patched.lock().get("cover").map(String::as_str),
            Some("placeholder.png")
        );
    }

    #[tokio::test]
    async fn closure_hook_replaces_default_strategy() {
        let hook = |item: Arc<FakeItem>, _ctx: MeasureContext| -> BoxFuture<'static, Result<Px, MeasureError>> {
            async move { Ok(Px(item.lines * 100)) }.boxed()
        };
        let item = Arc::new(FakeItem {
            lines: 3,
            image_outcomes: Vec::new(),
            patched: Mutex::new(HashMap::new()),
        });
        let height = hook.resolve(item.clone(), measure_ctx()).await.unwrap();
        assert_eq!(height, Px(300));
        // The hook bypassed the sandbox, so nothing was patched.
        assert!(item.patched.lock().is_empty());
    }
}
