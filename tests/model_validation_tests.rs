use axum::{http::StatusCode, response::IntoResponse};
use chrono::{TimeZone, Utc};
use posts_api::{
    ApiError,
    models::{PageMeta, Post, PostCollection, PostPayload, RegisterUserRequest},
    validation::{self, MAX_STRING_LEN, ValidationErrors},
};
use serde_json::{Value, json};

fn payload(title: Value) -> PostPayload {
    PostPayload { title: Some(title) }
}

// --- Serialization ---

#[test]
fn test_post_json_shape() {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let post = Post {
        id: 3,
        title: "Post de prueba".to_string(),
        created_at: stamp,
        updated_at: stamp,
    };

    let value = serde_json::to_value(&post).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["created_at", "id", "title", "updated_at"]);
    assert_eq!(value["created_at"], "2024-01-02T03:04:05Z");
}

#[test]
fn test_collection_omits_meta_when_unpaginated() {
    let collection = PostCollection {
        data: vec![Post::default()],
        meta: None,
    };

    let json_output = serde_json::to_string(&collection).unwrap();
    assert!(json_output.starts_with(r#"{"data":["#));
    assert!(!json_output.contains("meta"));

    let paged = PostCollection {
        data: vec![],
        meta: Some(PageMeta {
            current_page: 1,
            per_page: 15,
            total: 0,
            last_page: 1,
        }),
    };
    let value = serde_json::to_value(&paged).unwrap();
    assert_eq!(value["meta"]["per_page"], 15);
}

// --- Validation rules ---

#[test]
fn test_title_required() {
    let cases = [
        PostPayload::default(),
        payload(Value::Null),
        payload(json!("")),
        payload(json!("  \t")),
    ];
    for missing in cases {
        let errors = validation::validate_post(&missing).unwrap_err();
        assert_eq!(errors.messages("title"), ["The title field is required."]);
    }
}

#[test]
fn test_title_must_be_string() {
    for wrong in [json!(5), json!(true), json!(["a"]), json!({"a": 1})] {
        let errors = validation::validate_post(&payload(wrong)).unwrap_err();
        assert_eq!(errors.messages("title"), ["The title must be a string."]);
    }
}

#[test]
fn test_title_max_length_counts_characters() {
    let at_limit = "ñ".repeat(MAX_STRING_LEN);
    assert_eq!(
        validation::validate_post(&payload(json!(at_limit.clone()))).unwrap(),
        at_limit
    );

    let too_long = "a".repeat(MAX_STRING_LEN + 1);
    let errors = validation::validate_post(&payload(json!(too_long))).unwrap_err();
    assert_eq!(
        errors.messages("title"),
        ["The title may not be greater than 255 characters."]
    );
}

#[test]
fn test_registration_rules() {
    let ok = RegisterUserRequest {
        name: Some(json!(" Ada ")),
        email: Some(json!("ADA@example.com")),
    };
    assert_eq!(
        validation::validate_registration(&ok).unwrap(),
        ("Ada".to_string(), "ada@example.com".to_string())
    );

    let errors = validation::validate_registration(&RegisterUserRequest::default()).unwrap_err();
    assert!(errors.has("name"));
    assert!(errors.has("email"));

    for bad in [
        "nope",
        "@example.com",
        "a@@example.com",
        "a b@example.com",
        "a@b..c",
        "a@.example.com",
    ] {
        let request = RegisterUserRequest {
            name: Some(json!("Ada")),
            email: Some(json!(bad)),
        };
        let errors = validation::validate_registration(&request).unwrap_err();
        assert_eq!(
            errors.messages("email"),
            ["The email must be a valid email address."],
            "{bad} should be rejected"
        );
        assert!(!errors.has("name"));
    }
}

#[test]
fn test_title_rejects_nul_characters() {
    let errors = validation::validate_post(&payload(json!("Post\u{0000}de prueba"))).unwrap_err();
    assert_eq!(errors.messages("title"), ["The title format is invalid."]);
}

#[test]
fn test_registration_accepts_plain_addresses() {
    for good in ["ada@example.com", "ada.lovelace+posts@mail.example.co.uk"] {
        let request = RegisterUserRequest {
            name: Some(json!("Ada")),
            email: Some(json!(good)),
        };
        assert!(validation::validate_registration(&request).is_ok(), "{good} should pass");
    }
}

// --- Error responses ---

#[tokio::test]
async fn test_validation_error_body() {
    let response = ApiError::from(ValidationErrors::single("title", "The title field is required."))
        .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({
            "message": "The given data was invalid.",
            "errors": { "title": ["The title field is required."] }
        })
    );
}

#[test]
fn test_error_status_mapping() {
    assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::NotFound("post").status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        ApiError::BadRequest("eof".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ApiError::Internal("boom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
