//! Demo feed: lays out a batch of cards through the sandbox measurement
//! strategy backed by an in-memory host, then prepends two more.
//!
//! Run with `RUST_LOG=debug cargo run -p example` to see the pass logs.

use std::{collections::HashMap, sync::Arc};

use cascade_layout::{
    CellPosition, FALLBACK_IMAGE_SRC, ImageLoad, ImagePatch, ImageSlot, ItemRenderer, MeasureHost,
    Px, Sandbox, SandboxResolver, Waterfall, WaterfallArgs,
};
use futures_util::{FutureExt as _, future::BoxFuture};
use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LINE_HEIGHT: i32 = 18;
const IMAGE_HEIGHT: i32 = 120;

/// A feed entry. The cover source is interiorly mutable so the engine can
/// patch in a placeholder when the image turns out to be broken.
struct Card {
    title: String,
    body: String,
    cover: Mutex<Option<String>>,
}

impl Card {
    fn new(title: &str, body: &str, cover: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
            body: body.to_string(),
            cover: Mutex::new(cover.map(str::to_string)),
        })
    }
}

impl ImagePatch for Card {
    fn patch_image_source(&self, key: &str, source: &str) {
        info!(key, source, title = %self.title, "patched broken cover");
        *self.cover.lock() = Some(source.to_string());
    }
}

/// The "subtree" our in-memory host understands: some text lines plus the
/// images found in the card.
struct CardSubtree {
    lines: usize,
    images: Vec<InMemoryImage>,
}

struct CardRenderer;

impl ItemRenderer<Card> for CardRenderer {
    type Subtree = CardSubtree;

    fn render(&self, item: &Arc<Card>, _position: CellPosition) -> CardSubtree {
        let images = item
            .cover
            .lock()
            .clone()
            .into_iter()
            .map(|source| InMemoryImage {
                source: Some(source),
                key: Some("cover".to_string()),
                substituted: false,
            })
            .collect();
        CardSubtree {
            lines: 1 + item.body.lines().count(),
            images,
        }
    }
}

/// An image whose load outcome is decided by its source string: anything
/// containing "broken" errors, everything else (the placeholder included)
/// loads.
struct InMemoryImage {
    source: Option<String>,
    key: Option<String>,
    substituted: bool,
}

impl ImageSlot for InMemoryImage {
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
        let outcome = match &self.source {
            Some(source) if source.contains("broken") => ImageLoad::Failed,
            _ => ImageLoad::Loaded,
        };
        async move { outcome }.boxed()
    }
}

struct InMemoryHost;

struct InMemorySandbox {
    lines: usize,
    images: Vec<InMemoryImage>,
}

impl Sandbox for InMemorySandbox {
    type Image = InMemoryImage;

    fn take_images(&mut self) -> Vec<InMemoryImage> {
        std::mem::take(&mut self.images)
    }

    fn height(&self) -> Px {
        Px(self.lines as i32 * LINE_HEIGHT)
    }
}

impl MeasureHost for InMemoryHost {
    type Subtree = CardSubtree;
    type Sandbox = InMemorySandbox;

    fn mount(&self, subtree: CardSubtree, _width: Px, container: &str) -> InMemorySandbox {
        info!(container, "mounted measurement sandbox");
        let image_lines = subtree.images.len() * (IMAGE_HEIGHT / LINE_HEIGHT) as usize;
        InMemorySandbox {
            lines: subtree.lines + image_lines,
            images: subtree.images,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let resolver = SandboxResolver::new(Arc::new(CardRenderer), Arc::new(InMemoryHost));
    let mut feed = Waterfall::new(
        3,
        WaterfallArgs::default()
            .item_width(Px(240))
            .column_gap(Px(16))
            .bottom_gap(Px(12))
            .sandbox_container("demo-feed".to_string()),
        Arc::new(resolver),
    );

    let cards = vec![
        Card::new("hello", "a short card", None),
        Card::new(
            "photo",
            "a card with a working image",
            Some("https://example.test/ok.png"),
        ),
        Card::new(
            "oops",
            "this cover is broken\nand gets a placeholder",
            Some("https://example.test/broken.png"),
        ),
        Card::new("long", "one\ntwo\nthree\nfour\nfive", None),
    ];

    feed.layout(&cards).await?;
    dump(&feed, &cards, "after initial layout");

    let fresh = vec![
        Card::new("breaking", "prepended news", None),
        Card::new("more", "another prepended card", None),
    ];
    feed.insert_items_before(&cards, &fresh).await?;

    let all: Vec<Arc<Card>> = fresh.iter().chain(&cards).cloned().collect();
    dump(&feed, &all, "after prepend");

    // The broken cover was rewritten to the built-in placeholder.
    let patched: HashMap<&str, Option<String>> = cards
        .iter()
        .map(|card| (card.title.as_str(), card.cover.lock().clone()))
        .collect();
    assert_eq!(
        patched["oops"].as_deref(),
        Some(FALLBACK_IMAGE_SRC),
        "broken cover should have been patched"
    );

    Ok(())
}

fn dump(feed: &Waterfall<Card>, cards: &[Arc<Card>], label: &str) {
    info!(
        label,
        wrapper = feed.wrapper_height().raw(),
        columns = ?feed.column_heights(),
        "published layout"
    );
    for card in cards {
        if let Some(placement) = feed.placement(card) {
            info!(
                title = %card.title,
                column = placement.position.column,
                row = placement.position.row,
                style = %placement.style(),
                "card placement"
            );
        }
    }
}
