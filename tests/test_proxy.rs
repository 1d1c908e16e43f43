//! Proxy sheet tests: expansion, tiling, geometry, image URL rewriting and
//! PDF assembly.

mod common;

use common::*;
use image::RgbImage;
use optcg_companion::models::{ListCard, UserList};
use optcg_companion::proxy::layout::{card_pixels, cell_rect, margin_x, margin_y, CARDS_PER_PAGE};
use optcg_companion::proxy::{
    entries_from_deck, entries_from_list, expand, paginate, resolve_image_url, ImageLoader,
    PdfDocument, ProxyEntry, ProxySheet,
};
use optcg_companion::config::MAX_PROXY_CARDS;
use optcg_companion::{CompanionError, DeckState};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn entry(id: i64, quantity: u32, image: Option<&str>) -> ProxyEntry {
    ProxyEntry {
        id,
        quantity,
        name: format!("Card {}", id),
        code: format!("OP01-{:03}", id),
        image: image.map(str::to_string),
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    occurrences(haystack, needle) > 0
}

fn occurrences(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle.as_bytes())
        .count()
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(6, 8, image::Rgb([200, 30, 30]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Serve `/card.png` as a PNG and 404 everything else. Returns the address
/// and a counter of `/card.png` requests.
async fn spawn_image_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let png = png_bytes();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            let png = png.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/");
                let (status, content_type, body) = if path == "/card.png" {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ("200 OK", "image/png", png)
                } else {
                    ("404 Not Found", "text/plain", b"missing".to_vec())
                };
                let header = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    (addr, hits)
}

// ---------------------------------------------------------------------------
// Expansion and pagination
// ---------------------------------------------------------------------------

#[test]
fn expand_repeats_each_entry_in_order() {
    let cards = expand(&[entry(1, 2, None), entry(2, 0, None), entry(3, 3, None)]).unwrap();
    let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 1, 3, 3, 3]);
}

#[test]
fn expand_with_nothing_to_print_fails() {
    assert!(matches!(expand(&[]), Err(CompanionError::NothingToPrint)));
    assert!(matches!(
        expand(&[entry(1, 0, None)]),
        Err(CompanionError::NothingToPrint)
    ));
}

#[test]
fn expand_rejects_more_copies_than_one_document_holds() {
    let err = expand(&[entry(1, 4_000_000_000, None)]).unwrap_err();
    assert!(matches!(err, CompanionError::InvalidArgument(_)));

    // Many in-range entries that together pass the limit.
    let entries: Vec<ProxyEntry> = (0..3).map(|i| entry(i, u32::MAX, None)).collect();
    assert!(matches!(expand(&entries), Err(CompanionError::InvalidArgument(_))));

    let at_limit = expand(&[entry(1, MAX_PROXY_CARDS as u32, None)]).unwrap();
    assert_eq!(at_limit.len(), MAX_PROXY_CARDS);
    assert!(ProxySheet::new(&[entry(1, MAX_PROXY_CARDS as u32 + 1, None)]).is_err());
}

#[test]
fn paginate_fills_pages_of_nine() {
    let cards = expand(&[entry(1, 10, None)]).unwrap();
    let pages = paginate(&cards);
    assert_eq!(CARDS_PER_PAGE, 9);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 9);
    assert_eq!(pages[1].len(), 1);
}

#[test]
fn sheet_page_count() {
    assert_eq!(ProxySheet::new(&[entry(1, 9, None)]).unwrap().page_count(), 1);
    assert_eq!(ProxySheet::new(&[entry(1, 19, None)]).unwrap().page_count(), 3);
    assert!(ProxySheet::new(&[]).is_err());
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[test]
fn deck_entries_optionally_include_leader() {
    let deck = DeckState::from_deck(&sample_deck(1));

    let with_leader = entries_from_deck(&deck, true);
    assert_eq!(with_leader[0].id, ZORO_LEADER);
    assert_eq!(with_leader[0].quantity, 1);
    assert_eq!(with_leader.len(), 4);

    let without = entries_from_deck(&deck, false);
    let ids: Vec<i64> = without.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![NAMI, ZORO, SUNNY]);
}

#[test]
fn list_entries_skip_unknown_and_empty_cards() {
    let catalog = sample_catalog();
    let list = UserList {
        id: 1,
        user_id: 1,
        name: "Binder".into(),
        is_ordered: false,
        is_collection: false,
        max_rows: 3,
        max_columns: 3,
        total_pages: 1,
        cards: vec![
            ListCard { card_id: NAMI, quantity: 2, page: None, row: None, column: None },
            ListCard { card_id: 9999, quantity: 1, page: None, row: None, column: None },
            ListCard { card_id: ZORO_PARALLEL, quantity: 1, page: None, row: None, column: None },
            ListCard { card_id: SUNNY, quantity: 0, page: None, row: None, column: None },
        ],
    };
    let entries = entries_from_list(&list, &catalog);
    let got: Vec<(i64, u32)> = entries.iter().map(|e| (e.id, e.quantity)).collect();
    assert_eq!(got, vec![(NAMI, 2), (ZORO_PARALLEL, 1)]);
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn grid_is_centred_on_a4() {
    assert!((margin_x() - 10.5).abs() < 1e-9);
    assert!((margin_y() - 16.5).abs() < 1e-9);
}

#[test]
fn cells_are_row_major() {
    let first = cell_rect(0);
    assert!((first.x - 10.5).abs() < 1e-9);
    assert!((first.y - 16.5).abs() < 1e-9);
    assert_eq!(first.width, 63.0);
    assert_eq!(first.height, 88.0);

    let centre = cell_rect(4);
    assert!((centre.x - 73.5).abs() < 1e-9);
    assert!((centre.y - 104.5).abs() < 1e-9);

    let last = cell_rect(8);
    assert!((last.x + last.width - 199.5).abs() < 1e-9);
    assert!((last.y + last.height - 280.5).abs() < 1e-9);
}

#[test]
fn card_raster_is_300_dpi() {
    assert_eq!(card_pixels(), (744, 1039));
}

// ---------------------------------------------------------------------------
// Image URLs
// ---------------------------------------------------------------------------

#[test]
fn relative_image_path_joins_api_base() {
    let url = resolve_image_url("/images/OP01-001.png", "https://api.example.com").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/images/OP01-001.png");
}

#[test]
fn proxied_host_goes_through_image_proxy() {
    let raw = "https://en.onepiece-cardgame.com/images/cardlist/card/OP01-001.png";
    let url = resolve_image_url(raw, "https://api.example.com").unwrap();
    assert_eq!(url.host_str(), Some("api.example.com"));
    assert_eq!(url.path(), "/api/proxy-image");
    let target = url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned());
    assert_eq!(target.as_deref(), Some(raw));
}

#[test]
fn other_hosts_are_left_alone() {
    let raw = "https://images.example.org/card.png";
    let url = resolve_image_url(raw, "https://api.example.com").unwrap();
    assert_eq!(url.as_str(), raw);
}

#[test]
fn bad_api_base_is_rejected() {
    let err = resolve_image_url("/a.png", "not a base").unwrap_err();
    assert!(matches!(err, CompanionError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

#[test]
fn pdf_has_header_trailer_and_image_xobject() {
    let mut doc = PdfDocument::new(210.0, 297.0);
    let image = doc.add_image(&RgbImage::new(8, 8)).unwrap();
    let mut page = doc.new_page();
    page.draw_image(image, cell_rect(0));
    page.draw_text(20.0, 40.0, 10.0, "Zoro (Parallel)");
    doc.push_page(page);

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.image_count(), 1);

    let bytes = doc.to_bytes();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    assert!(contains(&bytes, "/Count 1"));
    assert!(contains(&bytes, "/Filter /DCTDecode"));
    assert!(contains(&bytes, "/Im0 Do"));
    assert!(contains(&bytes, "Zoro \\(Parallel\\)"));
}

#[test]
fn pdf_save_writes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("sheet.pdf");
    let mut doc = PdfDocument::new(210.0, 297.0);
    let page = doc.new_page();
    doc.push_page(page);
    doc.save(&path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, doc.to_bytes());
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cards_without_images_render_as_placeholders() {
    let sheet = ProxySheet::new(&[entry(1, 7, None), entry(2, 3, Some("not a url"))]).unwrap();
    let loader = ImageLoader::new(reqwest::Client::new(), None);

    let images = loader.load_all(sheet.cards()).await;
    assert_eq!(images.len(), 2);

    let doc = sheet.render(&loader).await.unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.image_count(), 0);

    let bytes = doc.to_bytes();
    assert!(contains(&bytes, "Image unavailable"));
    assert!(contains(&bytes, "OP01-002"));
}

#[tokio::test]
async fn loaded_images_are_embedded_once_and_failures_become_placeholders() {
    let (addr, hits) = spawn_image_server().await;
    let good = format!("http://{addr}/card.png");
    let missing = format!("http://{addr}/gone.png");
    let sheet = ProxySheet::new(&[
        entry(1, 10, Some(good.as_str())),
        entry(2, 1, Some(missing.as_str())),
    ])
    .unwrap();
    let loader = ImageLoader::new(reqwest::Client::new(), None);

    let doc = sheet.render(&loader).await.unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.image_count(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let bytes = doc.to_bytes();
    assert!(contains(&bytes, "/Filter /DCTDecode"));
    assert_eq!(occurrences(&bytes, "/Im0 Do"), 10);
    assert_eq!(occurrences(&bytes, "Image unavailable"), 1);
    assert!(contains(&bytes, "OP01-002"));
}
