use std::collections::HashMap;

use crate::config;
use crate::error::Result;
use crate::proxy::images::{CellImage, ImageLoader};
use crate::proxy::layout::{self, Rect};
use crate::proxy::pdf::{PdfDocument, PdfPage};
use crate::proxy::{expand, paginate, ProxyCard, ProxyEntry};

const PLACEHOLDER_NOTICE: &str = "Image unavailable";

/// A proxy sheet ready to render: the expanded cards in print order.
#[derive(Debug, Clone)]
pub struct ProxySheet {
    cards: Vec<ProxyCard>,
}

impl ProxySheet {
    /// Expand `entries` into printable copies. Fails with
    /// [`crate::CompanionError::NothingToPrint`] when nothing would be printed.
    pub fn new(entries: &[ProxyEntry]) -> Result<Self> {
        Ok(Self {
            cards: expand(entries)?,
        })
    }

    pub fn cards(&self) -> &[ProxyCard] {
        &self.cards
    }

    pub fn pages(&self) -> Vec<&[ProxyCard]> {
        paginate(&self.cards)
    }

    pub fn page_count(&self) -> usize {
        self.cards.len().div_ceil(layout::CARDS_PER_PAGE)
    }

    /// Load every image, then assemble pages strictly in order, yielding to
    /// the runtime between pages.
    pub async fn render(&self, loader: &ImageLoader) -> Result<PdfDocument> {
        let images = loader.load_all(&self.cards).await;
        let failed = images
            .values()
            .filter(|i| matches!(i, CellImage::Failed(_)))
            .count();
        log::info!(
            "Rendering {} proxies on {} pages ({} images unavailable)",
            self.cards.len(),
            self.page_count(),
            failed
        );

        let mut doc = PdfDocument::new(config::PAGE_WIDTH_MM, config::PAGE_HEIGHT_MM);
        let mut embedded: HashMap<i64, usize> = HashMap::new();

        for (number, page_cards) in self.pages().into_iter().enumerate() {
            let mut page = doc.new_page();
            for (slot, card) in page_cards.iter().enumerate() {
                let rect = layout::cell_rect(slot);
                match images.get(&card.id) {
                    Some(CellImage::Loaded(img)) => {
                        let id = match embedded.get(&card.id) {
                            Some(&id) => id,
                            None => {
                                let id = doc.add_image(img)?;
                                embedded.insert(card.id, id);
                                id
                            }
                        };
                        page.draw_image(id, rect);
                    }
                    _ => draw_placeholder(&mut page, card, rect),
                }
            }
            doc.push_page(page);
            log::debug!("Proxy page {} assembled", number + 1);
            tokio::task::yield_now().await;
        }

        Ok(doc)
    }
}

fn draw_placeholder(page: &mut PdfPage, card: &ProxyCard, rect: Rect) {
    page.draw_frame(rect);
    let x = rect.x + 4.0;
    let mid = rect.y + rect.height / 2.0;
    page.draw_text(x, mid - 6.0, 10.0, &card.name);
    page.draw_text(x, mid, 9.0, &card.code);
    page.draw_text(x, mid + 6.0, 8.0, PLACEHOLDER_NOTICE);
}
