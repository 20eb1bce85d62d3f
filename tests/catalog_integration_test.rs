use anyhow::Result;
use httpmock::prelude::*;
use menufy::core::session::ErrorKind;
use menufy::{AggregateResult, CatalogAggregator, CatalogSession, HttpCatalogClient, LoadOutcome};
use serde_json::json;

fn client_for(server: &MockServer) -> Result<HttpCatalogClient> {
    Ok(HttpCatalogClient::new(&server.base_url(), None)?)
}

#[tokio::test]
async fn test_failed_product_tier_leaves_category_empty() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/menu/m1");
            then.status(200)
                .json_body(json!({ "_id": "m1", "name": "Lunch", "rate": 4.4 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/category/menu/m1");
            then.status(200).json_body(json!([
                { "_id": "c1", "libelle": "Starters", "photo": "/uploads/c1.jpg", "menu": "m1" }
            ]));
        })
        .await;
    let products = server
        .mock_async(|when, then| {
            when.method(GET).path("/product/category/c1");
            then.status(500);
        })
        .await;

    let session = CatalogSession::new(CatalogAggregator::new(client_for(&server)?));
    let outcome = session.load(Some("m1")).await;

    products.assert_async().await;
    let tree = match outcome {
        LoadOutcome::Applied(AggregateResult::Ready(tree)) => tree,
        other => panic!("expected a ready tree, got {:?}", other),
    };
    assert_eq!(tree.menu.name, "Lunch");
    assert_eq!(tree.categories.len(), 1);
    assert_eq!(tree.categories[0].category.label, "Starters");
    assert!(tree.categories[0].products.is_empty());
    assert_eq!(tree.first_image.as_deref(), Some("/uploads/c1.jpg"));
    assert_eq!(tree.degradations.len(), 1);
    assert_eq!(tree.degradations[0].category_id, "c1");

    Ok(())
}

#[tokio::test]
async fn test_missing_menu_skips_category_fetch() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/menu/gone");
            then.status(404);
        })
        .await;
    let categories = server
        .mock_async(|when, then| {
            when.method(GET).path("/category/menu/gone");
            then.status(200).json_body(json!([]));
        })
        .await;

    let session = CatalogSession::new(CatalogAggregator::new(client_for(&server)?));
    session.load(Some("gone")).await;

    match session.state() {
        AggregateResult::Error { kind, message } => {
            assert_eq!(kind, ErrorKind::FetchFailed);
            assert_eq!(message, "Failed to fetch menu");
        }
        other => panic!("expected an error state, got {:?}", other),
    }
    categories.assert_hits_async(0).await;

    Ok(())
}

#[tokio::test]
async fn test_absent_menu_id_makes_no_requests() -> Result<()> {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({}));
        })
        .await;

    let session = CatalogSession::new(CatalogAggregator::new(client_for(&server)?));
    let outcome = session.load(None).await;

    assert!(matches!(
        outcome,
        LoadOutcome::Applied(AggregateResult::Error {
            kind: ErrorKind::PreconditionMissing,
            ..
        })
    ));
    any.assert_hits_async(0).await;

    Ok(())
}

#[tokio::test]
async fn test_category_order_follows_backend() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/menu/m2");
            then.status(200).json_body(json!({ "_id": "m2", "name": "Dinner" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/category/menu/m2");
            then.status(200).json_body(json!([
                { "_id": "c9", "libelle": "Mains" },
                { "_id": "c3", "libelle": "Desserts" }
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/product/category/c9");
            then.status(200)
                .delay(std::time::Duration::from_millis(50))
                .json_body(json!([
                    { "_id": "p1", "name": "Steak", "price": 24.5, "disponibility": "Available" },
                    { "_id": "p2", "name": "Risotto", "price": 18 }
                ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/product/category/c3");
            then.status(200)
                .json_body(json!([{ "_id": "p3", "name": "Tart", "duration": 15 }]));
        })
        .await;

    let tree = CatalogAggregator::new(client_for(&server)?)
        .aggregate(Some("m2"))
        .await?;

    let ids: Vec<&str> = tree.categories.iter().map(|n| n.category.id.as_str()).collect();
    assert_eq!(ids, vec!["c9", "c3"]);
    let mains: Vec<&str> = tree.categories[0]
        .products
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(mains, vec!["Steak", "Risotto"]);
    assert_eq!(tree.categories[1].products[0].duration.as_deref(), Some("15"));
    assert_eq!(tree.first_image, None);
    assert!(tree.degradations.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_menus_and_products() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/menu");
            then.status(200).json_body(json!([
                { "_id": "m1", "name": "Lunch", "rate": 3.5 },
                { "_id": "m2", "name": "Dinner" }
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/product");
            then.status(200).json_body(json!([
                {
                    "_id": "p1",
                    "name": "Pizza",
                    "typePlat": "Main",
                    "categoryFK": { "_id": "c1", "menu": "m1" },
                    "recipeFK": { "variants": [
                        { "_id": "v1", "name": "Classic", "portions": ["small", "large"] }
                    ] }
                }
            ]));
        })
        .await;

    let aggregator = CatalogAggregator::new(client_for(&server)?);
    let menus = aggregator.list_menus().await?;
    assert_eq!(menus.len(), 2);
    assert_eq!(menus[0].rating, Some(3.5));
    assert_eq!(menus[1].rating, None);

    let products = aggregator.list_products().await?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].dish_type.as_deref(), Some("Main"));
    assert_eq!(
        products[0].category.as_ref().and_then(|c| c.menu_id()),
        Some("m1")
    );
    assert!(products[0].variant("v1").is_some_and(|v| v.offers_portion("large")));

    Ok(())
}
