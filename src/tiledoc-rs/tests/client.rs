//! Client behaviour against a mock SODA server.

use serde_json::{json, Value};
use tiledoc_rs::{
    Client, ClientError, CollectionMetadata, Config, CreateOptions, Feature, FeatureProperties,
    Predicate, Region, DEFAULT_TILE_SIZE,
};
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "admin";
const PASSWORD: &str = "secret";
const COLLECTION: &str = "b123__p123__20201010";
const ROOT_PATH: &str = "/admin/soda/latest";
const COLLECTION_PATH: &str = "/admin/soda/latest/b123__p123__20201010";

fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: server.uri(),
        user: USER.to_string(),
        password: PASSWORD.to_string(),
        ..Config::default()
    }
}

fn client_for(server: &MockServer) -> Client {
    Client::from_config(&config_for(server), COLLECTION).unwrap()
}

fn listing(names: &[&str]) -> ResponseTemplate {
    let items: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
    ResponseTemplate::new(200).set_body_json(json!({ "items": items, "hasMore": false }))
}

fn page(values: &[Value], has_more: bool) -> ResponseTemplate {
    let items: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, value)| json!({ "id": format!("ID{}", i), "etag": "E", "value": value }))
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "items": items,
        "hasMore": has_more,
        "count": values.len()
    }))
}

fn feature(x: i64, y: i64, z: i64) -> Value {
    serde_json::to_value(Feature::point(
        x,
        y,
        z,
        FeatureProperties {
            area: 500,
            perimeter: 150,
            rle: "2098177 8 2100225 8".to_string(),
        },
    ))
    .unwrap()
}

fn sample_metadata() -> Value {
    json!({
        "block_name": "b123",
        "patch_id": "p123",
        "registration_version": "20201015",
        "segmentation_model": "UXYZ123",
        "deduplication_method": "M2_V1",
        "roi_size": [2048, 2048],
        "roi_offset": [1024, 1024]
    })
}

async fn methods_received(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.method.to_string())
        .collect()
}

#[tokio::test]
async fn test_create_new_collection_then_listed() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(listing(&["other"]))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(listing(&["other", COLLECTION]))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(COLLECTION_PATH))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::connect(&config_for(&server), COLLECTION, CreateOptions::create()).await?;

    let names = client.list_collections().await?;
    assert!(names.iter().any(|n| n == COLLECTION));
    assert!(client.collection_exists().await?);
    Ok(())
}

#[tokio::test]
async fn test_create_existing_without_overwrite_fails() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(listing(&[COLLECTION]))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Client::connect(&config_for(&server), COLLECTION, CreateOptions::create())
        .await
        .err()
        .expect("connect should fail");

    assert!(matches!(err, ClientError::CollectionExists(ref name) if name == COLLECTION));
    assert_eq!(methods_received(&server).await, vec!["GET"]);
    Ok(())
}

#[tokio::test]
async fn test_overwrite_deletes_then_recreates() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(listing(&[COLLECTION]))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(query_param("action", "query"))
        .respond_with(page(&[], false))
        .mount(&server)
        .await;

    let client =
        Client::connect(&config_for(&server), COLLECTION, CreateOptions::overwrite()).await?;
    assert_eq!(methods_received(&server).await, vec!["GET", "DELETE", "PUT"]);

    assert!(client.extract_items(0).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_open_does_not_touch_the_store() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    let client = Client::connect(&config_for(&server), COLLECTION, CreateOptions::open()).await?;

    assert_eq!(client.collection(), COLLECTION);
    assert!(methods_received(&server).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_list_collections_without_items_is_empty() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hasMore": false })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.list_collections().await?.is_empty());
    assert_eq!(client.list_collections_schema().await?, json!({ "hasMore": false }));
    Ok(())
}

#[tokio::test]
async fn test_add_item_posts_document() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let item = feature(10, 20, 0);
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(basic_auth(USER, PASSWORD))
        .and(body_json(&item))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).add_item(&item).await?;
    Ok(())
}

#[tokio::test]
async fn test_add_multiple_items_uses_insert_action() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let items = vec![feature(1, 2, 0), feature(3, 4, 1)];
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(query_param("action", "insert"))
        .and(body_json(json!(items)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).add_multiple_items(&items).await?;
    Ok(())
}

#[tokio::test]
async fn test_extract_items_walks_every_page() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let docs: Vec<Value> = (0..5).map(|i| feature(i * 10, i * 10, 0)).collect();
    let predicate = json!({ "geometry.coordinates[2]": { "$eq": 0 } });

    let pages = [
        (0, &docs[0..2], true),
        (2, &docs[2..4], true),
        (4, &docs[4..5], false),
    ];
    for (offset, chunk, has_more) in pages {
        Mock::given(method("POST"))
            .and(path(COLLECTION_PATH))
            .and(query_param("action", "query"))
            .and(query_param("offset", offset.to_string()))
            .and(body_json(&predicate))
            .respond_with(page(chunk, has_more))
            .expect(1)
            .mount(&server)
            .await;
    }

    let items = client_for(&server).extract_items(0).await?;

    assert_eq!(items.len(), 5);
    assert_eq!(items, docs);
    Ok(())
}

#[tokio::test]
async fn test_page_limit_is_sent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "2"))
        .respond_with(page(&[feature(0, 0, 1)], false))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        page_limit: Some(2),
        ..config_for(&server)
    };
    let client = Client::from_config(&config, COLLECTION)?;

    assert_eq!(client.extract_items(1).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_page_stops_pagination() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(query_param("action", "query"))
        .respond_with(page(&[], true))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).extract_items(7).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_page_discards_partial_results() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("offset", "0"))
        .respond_with(page(&[feature(1, 1, 0), feature(2, 2, 0)], true))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).extract_items(0).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::ExtractData { status: 500, ref reason } if reason == "Internal Server Error"
    ));
    Ok(())
}

#[tokio::test]
async fn test_tile_query_selects_inclusive_bounds() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let inside = vec![feature(0, 0, 0), feature(255, 255, 0), feature(128, 7, 0)];
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(query_param("action", "query"))
        .and(body_json(json!({
            "geometry.coordinates[0]": { "$between": [0, 255] },
            "geometry.coordinates[1]": { "$between": [0, 255] },
            "geometry.coordinates[2]": { "$eq": 0 }
        })))
        .respond_with(page(&inside, false))
        .expect(1)
        .mount(&server)
        .await;

    let items = client_for(&server)
        .extract_tile_data(0, 0, 0, DEFAULT_TILE_SIZE)
        .await?;

    let tile = Region::tile(0, 0, DEFAULT_TILE_SIZE);
    assert_eq!(items.len(), 3);
    for item in items {
        let feature: Feature = serde_json::from_value(item)?;
        assert!(tile.contains(feature.x(), feature.y()));
        assert_eq!(feature.z_layer(), 0);
    }
    Ok(())
}

#[tokio::test]
async fn test_region_query_uses_explicit_box() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let predicate = serde_json::to_value(Predicate::region(2, Region::new(100, 200, 300, 400)))?;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(body_json(&predicate))
        .respond_with(page(&[feature(150, 250, 2)], false))
        .expect(1)
        .mount(&server)
        .await;

    let items = client_for(&server)
        .extract_region(2, 100, 200, 300, 400)
        .await?;
    assert_eq!(items, vec![feature(150, 250, 2)]);
    Ok(())
}

#[tokio::test]
async fn test_add_metadata_twice_fails() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let meta = sample_metadata();
    let stored = json!({ "type": "Metadata", "content": meta });
    let metadata_query = json!({ "type": { "$eq": "Metadata" } });

    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .and(body_json(&metadata_query))
        .respond_with(page(&[], false))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .and(body_json(&metadata_query))
        .respond_with(page(&[stored.clone()], false))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(body_json(&stored))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.add_metadata(&meta).await?;

    let err = client.add_metadata(&meta).await.unwrap_err();
    assert!(matches!(err, ClientError::MetadataAlreadyExists));

    let extracted = client.extract_metadata().await?;
    assert_eq!(Value::Object(extracted), meta);

    let typed: CollectionMetadata = client.extract_metadata_as().await?.expect("metadata");
    assert_eq!(typed.block_name.as_deref(), Some("b123"));
    assert_eq!(typed.roi_offset, Some([1024, 1024]));
    Ok(())
}

#[tokio::test]
async fn test_extract_metadata_when_absent_is_empty() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(page(&[], false))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.extract_metadata().await?.is_empty());
    assert!(client.extract_metadata_as::<CollectionMetadata>().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_extract_metadata_rejects_duplicates() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let doc = json!({ "type": "Metadata", "content": { "block_name": "b1" } });
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(page(&[doc.clone(), doc], false))
        .mount(&server)
        .await;

    let err = client_for(&server).extract_metadata().await.unwrap_err();
    assert!(matches!(err, ClientError::TooManyMetadata { count: 2 }));
    Ok(())
}

#[tokio::test]
async fn test_add_metadata_rejects_non_object() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    let err = client_for(&server).add_metadata(&vec![1, 2, 3]).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidDocument(_)));
    assert!(methods_received(&server).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_collection() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(COLLECTION_PATH))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_collection().await?;
    Ok(())
}

#[tokio::test]
async fn test_remote_failures_keep_status_and_reason() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("action", "insert"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.list_collections().await.unwrap_err();
    assert!(matches!(err, ClientError::Access { status: 401, ref reason } if reason == "Unauthorized"));

    let err = client.delete_collection().await.unwrap_err();
    assert!(matches!(err, ClientError::DeleteCollection { status: 204, ref reason } if reason == "No Content"));

    let err = client.add_item(&feature(1, 1, 1)).await.unwrap_err();
    assert!(matches!(err, ClientError::AddItem { status: 400, ref reason } if reason == "Bad Request"));

    let err = client.add_multiple_items(&[feature(1, 1, 1)]).await.unwrap_err();
    assert!(matches!(err, ClientError::AddItem { status: 503, ref reason } if reason == "Service Unavailable"));

    let err = client.extract_metadata().await.unwrap_err();
    assert!(matches!(err, ClientError::ExtractData { status: 404, ref reason } if reason == "Not Found"));
    assert_eq!(err.status(), Some(404));

    let err = client.add_metadata(&sample_metadata()).await.unwrap_err();
    assert!(matches!(err, ClientError::ExtractData { status: 404, .. }));

    let err = client.extract_tile_data(0, 0, 0, DEFAULT_TILE_SIZE).await.unwrap_err();
    assert!(matches!(err, ClientError::ExtractData { status: 404, .. }));
    Ok(())
}

#[tokio::test]
async fn test_create_failure_keeps_status() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(listing(&[]))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = Client::connect(&config_for(&server), COLLECTION, CreateOptions::create())
        .await
        .err()
        .expect("connect should fail");

    assert!(matches!(
        err,
        ClientError::CreateCollection { status: 500, ref reason } if reason == "Internal Server Error"
    ));
    Ok(())
}

#[tokio::test]
async fn test_extract_metadata_finds_duplicates_on_later_pages() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let first = json!({ "type": "Metadata", "content": { "a": 1 } });
    let second = json!({ "type": "Metadata", "content": { "b": 2 } });
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "1"))
        .respond_with(page(&[first], true))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .and(query_param("offset", "1"))
        .and(query_param("limit", "1"))
        .respond_with(page(&[second], false))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        page_limit: Some(1),
        ..config_for(&server)
    };
    let err = Client::from_config(&config, COLLECTION)?
        .extract_metadata()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TooManyMetadata { count: 2 }));
    Ok(())
}

#[tokio::test]
async fn test_extract_metadata_stops_once_duplicates_seen() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let doc = json!({ "type": "Metadata", "content": { "a": 1 } });
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(page(&[doc], true))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config {
        page_limit: Some(1),
        ..config_for(&server)
    };
    let err = Client::from_config(&config, COLLECTION)?
        .extract_metadata()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TooManyMetadata { count: 2 }));
    Ok(())
}

#[tokio::test]
async fn test_add_metadata_with_duplicates_stored_reports_inconsistency() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let doc = json!({ "type": "Metadata", "content": { "a": 1 } });
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(page(&[doc.clone(), doc], false))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(body_json(json!({ "type": "Metadata", "content": { "b": 2 } })))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .add_metadata(&json!({ "b": 2 }))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TooManyMetadata { count: 2 }));
    Ok(())
}

#[tokio::test]
async fn test_add_metadata_rejects_when_empty_metadata_stored() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let doc = json!({ "type": "Metadata", "content": {} });
    Mock::given(method("POST"))
        .and(query_param("action", "query"))
        .respond_with(page(&[doc], false))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .add_metadata(&json!({ "b": 2 }))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::MetadataAlreadyExists));
    Ok(())
}
