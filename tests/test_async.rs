//! AsyncCompanion wrapper tests.
#![cfg(feature = "async")]

mod common;

use common::*;
use optcg_companion::models::NewUserList;
use optcg_companion::proxy::ImageLoader;
use optcg_companion::{AsyncCompanion, CompanionError};

fn async_companion() -> (AsyncCompanion, tempfile::TempDir) {
    let (companion, tmp) = setup_companion();
    (AsyncCompanion::from_sync(companion), tmp)
}

#[tokio::test]
async fn run_executes_on_blocking_pool() {
    let (companion, _tmp) = async_companion();
    let leaders = companion.run(|c| c.cards().leaders()).await.unwrap();
    assert_eq!(leaders.len(), 3);
    assert_eq!(companion.catalog().await.unwrap().len(), 9);
}

#[tokio::test]
async fn sql_passes_params() {
    let (companion, _tmp) = async_companion();
    let rows = companion
        .sql("SELECT CAST(? AS BIGINT) + 1 AS n", &["41".to_string()])
        .await
        .unwrap();
    assert_eq!(rows[0]["n"], 42);
}

#[tokio::test]
async fn list_proxy_sheet_renders_list_cards() {
    let (companion, _tmp) = async_companion();
    let list_id = companion
        .run(|c| {
            let list = c.lists().create(1, &NewUserList::named("Print me"))?;
            c.lists().set_card_quantity(1, list.id, ZORO, 10, None)?;
            Ok(list.id)
        })
        .await
        .unwrap();

    let loader = ImageLoader::new(reqwest::Client::new(), None);
    let doc = companion.list_proxy_sheet(1, list_id, &loader).await;
    // No image on this card, so every cell is a placeholder.
    assert_eq!(doc.unwrap().page_count(), 2);
}

#[tokio::test]
async fn list_proxy_sheet_of_empty_list_has_nothing_to_print() {
    let (companion, _tmp) = async_companion();
    let list_id = companion
        .run(|c| Ok(c.lists().create(1, &NewUserList::named("Empty"))?.id))
        .await
        .unwrap();

    let loader = ImageLoader::new(reqwest::Client::new(), None);
    let err = companion.list_proxy_sheet(1, list_id, &loader).await.unwrap_err();
    assert!(matches!(err, CompanionError::NothingToPrint));

    let err = companion.list_proxy_sheet(2, list_id, &loader).await.unwrap_err();
    assert!(matches!(err, CompanionError::NotFound(_)));
}
