//! Product catalog behavior: price history, list pagination, filters.

use std::str::FromStr;

use shared::models::product::{ProductForm, ProductListQuery};
use shared::response::PageQuery;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tally_server::db;

async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

fn form(name: &str, price: f64) -> ProductForm {
    ProductForm {
        name: Some(name.into()),
        unit_price: Some(price),
        ..Default::default()
    }
}

fn no_filter() -> ProductListQuery {
    ProductListQuery {
        category: None,
        keyword: None,
    }
}

fn page(n: i64, size: i64) -> PageQuery {
    PageQuery {
        page: Some(n),
        page_size: Some(size),
    }
}

#[tokio::test]
async fn price_change_appends_exactly_one_history_row() {
    let pool = pool().await;
    let product = db::products::create(&pool, &form("rope", 10.0)).await.unwrap();

    db::products::update(&pool, product.id, &form("rope", 12.5))
        .await
        .unwrap()
        .unwrap();

    let history = db::products::price_history(&pool, product.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_price, 10.0);
    assert_eq!(history[0].new_price, 12.5);
}

#[tokio::test]
async fn same_price_update_appends_no_history() {
    let pool = pool().await;
    let product = db::products::create(&pool, &form("rope", 10.0)).await.unwrap();

    db::products::update(&pool, product.id, &form("rope renamed", 10.0))
        .await
        .unwrap()
        .unwrap();

    let history = db::products::price_history(&pool, product.id).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn pages_are_disjoint_and_cover_everything() {
    let pool = pool().await;
    for i in 0..7 {
        db::products::create(&pool, &form(&format!("item-{i}"), 1.0))
            .await
            .unwrap();
    }

    let (all, total) = db::products::list(&pool, &no_filter(), &page(1, 100))
        .await
        .unwrap();
    assert_eq!(total, 7);

    let (first, _) = db::products::list(&pool, &no_filter(), &page(1, 3)).await.unwrap();
    let (second, _) = db::products::list(&pool, &no_filter(), &page(2, 3)).await.unwrap();
    let (third, _) = db::products::list(&pool, &no_filter(), &page(3, 3)).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert_eq!(third.len(), 1);

    // concatenated pages equal the unpaginated result, in order
    let paged_ids: Vec<i64> = first
        .iter()
        .chain(&second)
        .chain(&third)
        .map(|p| p.id)
        .collect();
    let all_ids: Vec<i64> = all.iter().map(|p| p.id).collect();
    assert_eq!(paged_ids, all_ids);
}

#[tokio::test]
async fn keyword_filter_applies_to_count_and_rows() {
    let pool = pool().await;
    db::products::create(&pool, &form("nylon rope", 1.0)).await.unwrap();
    db::products::create(&pool, &form("steel wire", 1.0)).await.unwrap();

    let query = ProductListQuery {
        category: None,
        keyword: Some("rope".into()),
    };
    let (rows, total) = db::products::list(&pool, &query, &page(1, 20)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "nylon rope");
}

#[tokio::test]
async fn categories_are_distinct_and_sorted() {
    let pool = pool().await;
    for (name, category) in [("a", "绳索"), ("b", "绳索"), ("c", "五金")] {
        let mut f = form(name, 1.0);
        f.category = Some(category.into());
        db::products::create(&pool, &f).await.unwrap();
    }

    let categories = db::products::categories(&pool).await.unwrap();
    assert_eq!(categories, vec!["五金".to_string(), "绳索".to_string()]);
}

#[tokio::test]
async fn missing_product_reads_as_none() {
    let pool = pool().await;
    assert!(db::products::get(&pool, 99).await.unwrap().is_none());
    assert!(
        db::products::update(&pool, 99, &form("x", 1.0))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(db::products::delete(&pool, 99).await.unwrap(), 0);
}
