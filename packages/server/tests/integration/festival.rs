use serde_json::json;

use crate::common::{TestApp, routes};

fn nested_festival_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "country": "Japan",
        "prefecture": "Gifu",
        "city_town": "Ogaki",
        "representative": "Taro Yamada",
        "overview": "A summer festival along the river.",
        "start_date": "2024-08-01",
        "end_date": "2024-08-03",
        "locations": [
            {"type": "main venue", "name": "Riverside park", "latitude": 35.36, "longitude": 136.62},
            {"type": "parking", "latitude": 35.37, "longitude": 136.63},
        ],
        "news": [
            {"importance": "high", "posted_date": "2024-07-20", "title": "Opening hours", "content": "Gates open at 10:00."},
        ],
        "images": [
            {"type": "thumbnail", "image_url": "https://cdn.example.com/thumb.png", "uploaded_date": "2024-07-01"},
        ],
        "programs": [
            {"name": "Fireworks", "start_time": "2024-08-01T19:00:00Z", "end_time": "2024-08-01T20:00:00Z"},
        ],
    })
}

mod festival_creation {
    use super::*;

    #[tokio::test]
    async fn creates_a_minimal_festival() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::FESTIVALS,
                &json!({
                    "name": "Culture Fest",
                    "country": "Japan",
                    "prefecture": "Gifu",
                    "city_town": "Ogaki",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["message"], "Festival created successfully");
        assert_eq!(res.body["festival"]["name"], "Culture Fest");
        assert_eq!(res.body["festival"]["representative"], serde_json::Value::Null);
        assert_eq!(res.body["festival"]["locations"], json!([]));
    }

    #[tokio::test]
    async fn creates_nested_children_with_the_festival() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::FESTIVALS, &nested_festival_body("Nested Fest"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let festival = &res.body["festival"];
        assert_eq!(festival["locations"].as_array().unwrap().len(), 2);
        assert_eq!(festival["locations"][0]["type"], "main venue");
        assert_eq!(festival["news"].as_array().unwrap().len(), 1);
        assert_eq!(festival["images"].as_array().unwrap().len(), 1);
        assert_eq!(festival["programs"].as_array().unwrap().len(), 1);
        // Bare dates parse to midnight UTC.
        assert_eq!(festival["start_date"], "2024-08-01T00:00:00Z");
    }

    #[tokio::test]
    async fn collects_every_validation_error_in_one_response() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::FESTIVALS,
                &json!({
                    "name": "  ",
                    "country": "Japan",
                    "prefecture": "Gifu",
                    "city_town": "Ogaki",
                    "locations": [
                        {"type": "ok", "latitude": 10.0, "longitude": 20.0},
                        {"type": "bad", "latitude": 95.0, "longitude": 200.0},
                    ],
                    "news": [
                        {"importance": "urgent", "posted_date": "2024-07-20", "title": "t", "content": "c"},
                    ],
                }),
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(
            res.error_fields(),
            [
                "name",
                "locations[1].latitude",
                "locations[1].longitude",
                "news[0].importance",
            ]
        );
    }

    #[tokio::test]
    async fn rejects_nested_programs_that_reference_locations() {
        let app = TestApp::spawn().await;

        let mut body = nested_festival_body("Bad Fest");
        body["programs"][0]["location_id"] = json!(1);

        let res = app.post(routes::FESTIVALS, &body).await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_fields(), ["programs[0].location_id"]);
    }
}

mod festival_reads {
    use super::*;

    #[tokio::test]
    async fn get_returns_the_festival_with_children() {
        let app = TestApp::spawn().await;
        let res = app
            .post(routes::FESTIVALS, &nested_festival_body("Read Fest"))
            .await;
        let id = res.entity_id("festival");

        let res = app.get(&routes::festival(id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["festival"]["id"], id);
        assert_eq!(res.body["festival"]["locations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_festival_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::festival(999)).await;
        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn list_returns_all_festivals_with_children() {
        let app = TestApp::spawn().await;
        app.post(routes::FESTIVALS, &nested_festival_body("Fest A"))
            .await;
        app.create_festival("Fest B").await;

        let res = app.get(routes::FESTIVALS).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let festivals = res.body["festivals"].as_array().unwrap();
        assert_eq!(festivals.len(), 2);
        assert_eq!(festivals[0]["name"], "Fest A");
        assert_eq!(festivals[0]["locations"].as_array().unwrap().len(), 2);
        assert_eq!(festivals[1]["locations"], json!([]));
    }
}

mod festival_update {
    use super::*;

    async fn create_nested(app: &TestApp, name: &str) -> i32 {
        let res = app.post(routes::FESTIVALS, &nested_festival_body(name)).await;
        assert_eq!(res.status, 201, "{}", res.text);
        res.entity_id("festival")
    }

    #[tokio::test]
    async fn replaces_only_the_supplied_collection() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Replace Fest").await;

        let res = app
            .put(
                &routes::festival(id),
                &json!({
                    "locations": [
                        {"type": "restroom", "latitude": 1.0, "longitude": 2.0},
                    ],
                }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Festival updated successfully");

        let detail = app.get(&routes::festival(id)).await;
        let festival = &detail.body["festival"];
        let locations = festival["locations"].as_array().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0]["type"], "restroom");
        // Untouched collections survive.
        assert_eq!(festival["news"].as_array().unwrap().len(), 1);
        assert_eq!(festival["images"].as_array().unwrap().len(), 1);
        assert_eq!(festival["programs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_arrays_clear_collections() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Clear Fest").await;

        let res = app
            .put(
                &routes::festival(id),
                &json!({"news": [], "programs": []}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get(&routes::festival(id)).await;
        let festival = &detail.body["festival"];
        assert_eq!(festival["news"], json!([]));
        assert_eq!(festival["programs"], json!([]));
        assert_eq!(festival["locations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn merges_scalars_and_distinguishes_null_from_absent() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Merge Fest").await;

        let res = app
            .put(
                &routes::festival(id),
                &json!({"name": "Renamed Fest", "representative": null}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["festival"]["name"], "Renamed Fest");
        // Explicit null clears the field.
        assert_eq!(res.body["festival"]["representative"], serde_json::Value::Null);
        // Absent fields keep their values.
        assert_eq!(res.body["festival"]["overview"], "A summer festival along the river.");
        assert_eq!(res.body["festival"]["country"], "Japan");
    }

    #[tokio::test]
    async fn empty_payload_leaves_everything_untouched() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "NoOp Fest").await;

        let res = app.put(&routes::festival(id), &json!({})).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get(&routes::festival(id)).await;
        let festival = &detail.body["festival"];
        assert_eq!(festival["name"], "NoOp Fest");
        assert_eq!(festival["locations"].as_array().unwrap().len(), 2);
        assert_eq!(festival["news"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn programs_may_reference_surviving_locations() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Linked Fest").await;

        let detail = app.get(&routes::festival(id)).await;
        let location_id = detail.body["festival"]["locations"][0]["id"]
            .as_i64()
            .unwrap();

        let res = app
            .put(
                &routes::festival(id),
                &json!({
                    "programs": [
                        {"name": "Parade", "location_id": location_id, "start_time": "2024-08-02T10:00:00Z"},
                    ],
                }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get(&routes::festival(id)).await;
        let programs = detail.body["festival"]["programs"].as_array().unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0]["location_id"], location_id);
    }

    #[tokio::test]
    async fn rejects_programs_referencing_foreign_locations() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Strict Fest").await;
        let other = app.create_festival("Other Fest").await;
        let foreign_location = app.create_location(other, "main venue").await;

        let res = app
            .put(
                &routes::festival(id),
                &json!({
                    "programs": [
                        {"name": "Parade", "location_id": foreign_location, "start_time": "2024-08-02T10:00:00Z"},
                    ],
                }),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_fields(), ["programs[0].location_id"]);

        // The rejected payload must not have partially applied.
        let detail = app.get(&routes::festival(id)).await;
        assert_eq!(detail.body["festival"]["programs"].as_array().unwrap().len(), 1);
        assert_eq!(detail.body["festival"]["programs"][0]["name"], "Fireworks");
    }

    #[tokio::test]
    async fn rejects_duplicate_image_types_in_one_replacement() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Dup Slot Fest").await;

        let res = app
            .put(
                &routes::festival(id),
                &json!({
                    "images": [
                        {"image_url": "https://cdn.example.com/a.png", "type": "thumbnail", "uploaded_date": "2024-07-01"},
                        {"image_url": "https://cdn.example.com/b.png", "type": "thumbnail", "uploaded_date": "2024-07-02"},
                    ],
                }),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_fields(), ["images[1].type"]);

        // The existing collection survives the rejected replacement.
        let detail = app.get(&routes::festival(id)).await;
        assert_eq!(detail.body["festival"]["images"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replacing_locations_detaches_existing_programs() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Detach Fest").await;

        let detail = app.get(&routes::festival(id)).await;
        let location_id = detail.body["festival"]["locations"][0]["id"]
            .as_i64()
            .unwrap();
        app.put(
            &routes::festival(id),
            &json!({
                "programs": [
                    {"name": "Parade", "location_id": location_id, "start_time": "2024-08-02T10:00:00Z"},
                ],
            }),
        )
        .await;

        // Replacing locations only: the program survives without its link.
        let res = app
            .put(
                &routes::festival(id),
                &json!({
                    "locations": [
                        {"type": "main venue", "latitude": 10.0, "longitude": 20.0},
                    ],
                }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get(&routes::festival(id)).await;
        let programs = detail.body["festival"]["programs"].as_array().unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0]["location_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn rejects_inverted_date_ranges_against_stored_values() {
        let app = TestApp::spawn().await;
        let id = create_nested(&app, "Date Fest").await;

        // end before the stored start_date of 2024-08-01.
        let res = app
            .put(&routes::festival(id), &json!({"end_date": "2024-07-01"}))
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_fields(), ["end_date"]);
    }

    #[tokio::test]
    async fn update_unknown_festival_is_404() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::festival(999), &json!({"name": "Ghost"}))
            .await;
        assert_eq!(res.status, 404, "{}", res.text);
    }
}

mod festival_deletion {
    use super::*;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use server::entity::{location, news, program};

    #[tokio::test]
    async fn deletes_the_festival_and_all_children() {
        let app = TestApp::spawn().await;
        let res = app
            .post(routes::FESTIVALS, &nested_festival_body("Doomed Fest"))
            .await;
        let id = res.entity_id("festival");

        let res = app.delete(&routes::festival(id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Festival deleted successfully");
        assert_eq!(res.body["festival"]["name"], "Doomed Fest");

        assert_eq!(app.get(&routes::festival(id)).await.status, 404);

        for count in [
            location::Entity::find()
                .filter(location::Column::FestivalId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            news::Entity::find()
                .filter(news::Column::FestivalId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            program::Entity::find()
                .filter(program::Column::FestivalId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
        ] {
            assert_eq!(count, 0);
        }
    }

    #[tokio::test]
    async fn deleting_twice_is_404() {
        let app = TestApp::spawn().await;
        let id = app.create_festival("Once Fest").await;

        assert_eq!(app.delete(&routes::festival(id)).await.status, 200);
        assert_eq!(app.delete(&routes::festival(id)).await.status, 404);
    }
}
