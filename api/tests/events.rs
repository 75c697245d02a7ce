mod common;

use axum::http::{Method, StatusCode};
use common::{PNG_BYTES, Upload, app};
use serde_json::json;

#[tokio::test]
async fn create_requires_a_valid_token() {
    let app = app();
    let fields = [
        ("title", "RustConf"),
        ("date", "2025-09-01"),
        ("location", "Montreal"),
    ];

    let (status, body) = app
        .multipart(Method::POST, "/event/create", None, &fields, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Unauthenticated");

    let (status, body) = app
        .multipart(Method::POST, "/event/create", Some("garbage"), &fields, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "Forbidden");

    let (_, events) = app.get("/event/getAll/all", None).await;
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn create_sets_caller_as_organizer() {
    let app = app();
    let (organizer, token) = app
        .signed_up("Ada", "ada@example.com", "organizer")
        .await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/event/create",
            Some(&token),
            &[
                ("title", "RustConf"),
                ("date", "2025-09-01T18:00:00Z"),
                ("location", "Montreal"),
                ("organizer", "65f1c0ffee0000000000beef"),
            ],
            Some(Upload {
                file_name: "poster.png",
                content_type: "image/png",
                bytes: PNG_BYTES,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Event created successfully");

    let event = &body["event"];
    assert_eq!(event["title"], "RustConf");
    assert_eq!(event["date"], "2025-09-01T18:00:00Z");
    assert_eq!(event["organizer"]["id"], organizer["id"]);
    assert_eq!(event["organizer"]["email"], "ada@example.com");
    assert_eq!(event["participants"], json!([]));
    assert!(
        event["image"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/events/")
    );
    assert_eq!(app.stored_files("events"), 1);
}

#[tokio::test]
async fn create_lists_each_missing_field() {
    let app = app();
    let (_, token) = app.signed_up("Ada", "ada@example.com", "organizer").await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/event/create",
            Some(&token),
            &[("title", "No date or place")],
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["date", "location"]);
}

#[tokio::test]
async fn register_create_join_join() {
    let app = app();
    let (_, organizer_token) = app
        .signed_up("Ada", "ada@example.com", "organizer")
        .await;
    let (participant, participant_token) =
        app.signed_up("Grace", "grace@example.com", "user").await;

    let event = app.create_event(&organizer_token, "Compiler Night").await;
    let event_id = event["id"].as_str().unwrap();

    let (status, body) = app.join(&participant_token, event_id).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["message"], "User successfully joined the event");
    assert_eq!(body["data"]["eventId"], event_id);

    let (status, body) = app.join(&participant_token, event_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "AlreadyJoined");
    assert_eq!(body["message"], "User already joined this event");

    let (_, stored) = app.get(&format!("/event/{event_id}"), None).await;
    assert_eq!(stored["participants"], json!([participant["id"]]));
    assert_eq!(stored["organizer"]["name"], "Ada");

    let (_, user) = app
        .get(
            &format!("/users/{}", participant["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(user["registeredEvents"], json!([event_id]));

    let (status, joined) = app
        .get("/event/MyEvent/getAll", Some(&participant_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined.as_array().unwrap().len(), 1);
    assert_eq!(joined[0]["id"], event_id);
}

#[tokio::test]
async fn join_missing_or_malformed_event() {
    let app = app();
    let (user, token) = app.signed_up("Grace", "grace@example.com", "user").await;

    let (status, body) = app.join(&token, "65f1c0ffee0000000000beef").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");

    let (status, body) = app.join(&token, "not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidId");

    let (status, body) = app
        .json(Method::POST, "/event/joinEvent", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "eventId");

    let (_, stored) = app
        .get(&format!("/users/{}", user["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(stored["registeredEvents"], json!([]));
}

#[tokio::test]
async fn join_requires_token() {
    let app = app();

    let (status, _) = app
        .json(
            Method::POST,
            "/event/joinEvent",
            None,
            json!({ "eventId": "65f1c0ffee0000000000beef" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_yield_one_participant() {
    let app = std::sync::Arc::new(app());
    let (_, organizer_token) = app
        .signed_up("Ada", "ada@example.com", "organizer")
        .await;
    let (_, token) = app.signed_up("Grace", "grace@example.com", "user").await;
    let event = app.create_event(&organizer_token, "Popular").await;
    let event_id = event["id"].as_str().unwrap().to_string();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let token = token.clone();
            let event_id = event_id.clone();
            tokio::spawn(async move { app.join(&token, &event_id).await.0 })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::OK).count(),
        1
    );
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::OK || *s == StatusCode::CONFLICT)
    );

    let (_, stored) = app.get(&format!("/event/{event_id}"), None).await;
    assert_eq!(stored["participants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_by_name_is_case_insensitive() {
    let app = app();
    let (_, token) = app.signed_up("Ada", "ada@example.com", "organizer").await;
    app.create_event(&token, "Rust Meetup").await;
    app.create_event(&token, "Trusty Tools").await;
    app.create_event(&token, "Go Night").await;

    let (status, found) = app
        .get("/event/search/searchByName?name=RUST", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut titles: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Rust Meetup", "Trusty Tools"]);

    let (_, found) = app
        .get("/event/search/searchByName?name=.%2A", None)
        .await;
    assert_eq!(found, json!([]));

    let (status, _) = app.get("/event/search/searchByName", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/event/search/searchByName?name=%20%20", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn by_organizer_lists_only_own_events() {
    let app = app();
    let (_, ada) = app.signed_up("Ada", "ada@example.com", "organizer").await;
    let (_, grace) = app.signed_up("Grace", "grace@example.com", "user").await;
    app.create_event(&ada, "Ada's talk").await;

    let (status, events) = app.get("/event/byOrganizer/all", Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);

    let (status, events) = app.get("/event/byOrganizer/all", Some(&grace)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([]));

    let (status, _) = app.get("/event/byOrganizer/all", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_event_errors() {
    let app = app();

    let (status, body) = app.get("/event/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid ID format");

    let (status, _) = app.get("/event/65f1c0ffee0000000000beef", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_event_fields() {
    let app = app();
    let (_, token) = app.signed_up("Ada", "ada@example.com", "organizer").await;
    let event = app.create_event(&token, "Draft").await;
    let event_id = event["id"].as_str().unwrap();

    let (status, body) = app
        .multipart(
            Method::PUT,
            &format!("/event/update/{event_id}"),
            None,
            &[("title", "Final"), ("date", "2025-10-01")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Event updated successfully");
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["date"], "2025-10-01T00:00:00Z");
    assert_eq!(body["data"]["location"], "Amsterdam");
    assert_eq!(body["data"]["organizer"]["name"], "Ada");

    let (status, body) = app
        .multipart(
            Method::PUT,
            &format!("/event/update/{event_id}"),
            None,
            &[("date", "someday")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "date");

    let (status, _) = app
        .multipart(
            Method::PUT,
            "/event/update/65f1c0ffee0000000000beef",
            None,
            &[("title", "Ghost")],
            Some(Upload {
                file_name: "ghost.png",
                content_type: "image/png",
                bytes: PNG_BYTES,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.stored_files("events"), 0);
}

#[tokio::test]
async fn delete_one_then_all() {
    let app = app();
    let (_, token) = app.signed_up("Ada", "ada@example.com", "organizer").await;
    let first = app.create_event(&token, "First").await;
    app.create_event(&token, "Second").await;
    app.create_event(&token, "Third").await;

    let first_id = first["id"].as_str().unwrap();
    let (status, body) = app.delete(&format!("/event/delete/{first_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event deleted successfully");
    assert_eq!(body["deletedEvent"]["id"], first_id);

    let (status, _) = app.delete(&format!("/event/delete/{first_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete("/event/delete/event/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["deletedCount"], 2);

    let (_, events) = app.get("/event/getAll/all", None).await;
    assert_eq!(events, json!([]));
}
