use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn creates_a_program_linked_to_a_location() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Program Fest").await;
    let location_id = app.create_location(festival_id, "stage").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Fireworks",
                "location_id": location_id,
                "start_time": "2024-08-01T19:00:00Z",
                "end_time": "2024-08-01T20:00:00Z",
                "description": "Riverside fireworks show.",
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["program"]["location_id"], location_id);
}

#[tokio::test]
async fn rejects_locations_of_another_festival() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Here Fest").await;
    let other = app.create_festival("There Fest").await;
    let foreign_location = app.create_location(other, "stage").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Fireworks",
                "location_id": foreign_location,
                "start_time": "2024-08-01T19:00:00Z",
            }),
        )
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_fields(), ["location_id"]);
}

#[tokio::test]
async fn rejects_end_before_start() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Time Fest").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Backwards",
                "start_time": "2024-08-01T19:00:00Z",
                "end_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_fields(), ["end_time"]);
}

#[tokio::test]
async fn end_time_is_optional() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Open Fest").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "All night",
                "start_time": "2024-08-01T19:00:00Z",
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["program"]["end_time"], serde_json::Value::Null);
}

#[tokio::test]
async fn fetches_a_single_program() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Fetch Fest").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Parade",
                "start_time": "2024-08-02T10:00:00Z",
            }),
        )
        .await;
    let id = res.entity_id("program");

    let res = app.get(&routes::program(festival_id, id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["program"]["name"], "Parade");

    assert_eq!(app.get(&routes::program(festival_id, 999)).await.status, 404);
}

#[tokio::test]
async fn lists_programs_across_festivals() {
    let app = TestApp::spawn().await;
    let a = app.create_festival("Fest A").await;
    let b = app.create_festival("Fest B").await;
    for festival_id in [a, b] {
        let res = app
            .post(
                routes::PROGRAMS,
                &json!({
                    "festival_id": festival_id,
                    "name": "Opening",
                    "start_time": "2024-08-01T09:00:00Z",
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get(routes::PROGRAMS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["programs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn update_can_relink_and_clear_the_location() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Relink Fest").await;
    let location_id = app.create_location(festival_id, "stage").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Concert",
                "start_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;
    let id = res.entity_id("program");

    let res = app
        .put(
            &routes::program(festival_id, id),
            &json!({
                "name": "Concert",
                "location_id": location_id,
                "start_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["program"]["location_id"], location_id);

    let res = app
        .put(
            &routes::program(festival_id, id),
            &json!({
                "name": "Concert",
                "location_id": null,
                "start_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["program"]["location_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn deletes_a_program() {
    let app = TestApp::spawn().await;
    let festival_id = app.create_festival("Delete Fest").await;

    let res = app
        .post(
            routes::PROGRAMS,
            &json!({
                "festival_id": festival_id,
                "name": "Doomed",
                "start_time": "2024-08-01T18:00:00Z",
            }),
        )
        .await;
    let id = res.entity_id("program");

    assert_eq!(app.delete(&routes::program(festival_id, id)).await.status, 200);
    assert_eq!(app.delete(&routes::program(festival_id, id)).await.status, 404);

    let list = app.get(&routes::programs(festival_id)).await;
    assert_eq!(list.body["programs"], json!([]));
}
