use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn creates_a_location_for_a_festival() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Loc Fest").await;

    let res = app
        .post(
            routes::LOCATIONS,
            &json!({
                "festival_id": festival_id,
                "type": "main venue",
                "name": "Riverside park",
                "latitude": 35.36,
                "longitude": 136.62,
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["message"], "Location created successfully");
    assert_eq!(res.body["location"]["type"], "main venue");
    assert_eq!(res.body["location"]["festival_id"], festival_id);
}

#[tokio::test]
async fn create_for_unknown_festival_is_404() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::LOCATIONS,
            &json!({
                "festival_id": 999,
                "type": "parking",
                "latitude": 1.0,
                "longitude": 2.0,
            }),
        )
        .await;

    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn rejects_out_of_range_coordinates() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Bounds Fest").await;

    let res = app
        .post(
            routes::LOCATIONS,
            &json!({
                "festival_id": festival_id,
                "type": "parking",
                "latitude": -90.5,
                "longitude": 180.5,
            }),
        )
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_fields(), ["latitude", "longitude"]);
}

#[tokio::test]
async fn boundary_coordinates_are_accepted() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Edge Fest").await;

    let res = app
        .post(
            routes::LOCATIONS,
            &json!({
                "festival_id": festival_id,
                "type": "corner",
                "latitude": -90.0,
                "longitude": 180.0,
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
}

#[tokio::test]
async fn listing_an_empty_collection_returns_an_empty_array() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Empty Fest").await;

    let res = app.get(&routes::locations(festival_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["locations"], json!([]));
}

#[tokio::test]
async fn listing_for_unknown_festival_is_404() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::locations(999)).await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn fetches_a_single_location() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Single Fest").await;
    let id = app.create_location(festival_id, "stage").await;

    let res = app.get(&routes::location(festival_id, id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["location"]["id"], id);

    assert_eq!(app.get(&routes::location(festival_id, 999)).await.status, 404);
}

#[tokio::test]
async fn lists_locations_across_festivals() {
    let app = TestApp::spawn().await;
    let a = app.create_festival("Fest A").await;
    let b = app.create_festival("Fest B").await;
    app.create_location(a, "stage").await;
    app.create_location(b, "parking").await;

    let res = app.get(routes::LOCATIONS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["locations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn updates_a_location_in_place() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Update Fest").await;
    let id = app.create_location(festival_id, "parking").await;

    let res = app
        .put(
            &routes::location(festival_id, id),
            &json!({
                "type": "restroom",
                "name": null,
                "latitude": 10.0,
                "longitude": 20.0,
            }),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["location"]["type"], "restroom");
    assert_eq!(res.body["location"]["name"], serde_json::Value::Null);
}

#[tokio::test]
async fn update_scoped_to_the_owning_festival() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Owner Fest").await;
    let other = app.create_festival("Other Fest").await;
    let id = app.create_location(festival_id, "parking").await;

    let res = app
        .put(
            &routes::location(other, id),
            &json!({"type": "stolen", "latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn deleting_a_location_detaches_its_programs() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Detach Fest").await;
    let location_id = app.create_location(festival_id, "stage").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Concert",
                "location_id": location_id,
                "start_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app.delete(&routes::location(festival_id, location_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let programs = app.get(&routes::programs(festival_id)).await;
    assert_eq!(programs.body["programs"][0]["location_id"], serde_json::Value::Null);
}
