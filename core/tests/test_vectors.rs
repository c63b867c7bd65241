//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, its input, the request it must produce, a
//! simulated vendor response and either the expected result or the expected
//! error. Results are compared as JSON values so field order does not matter.

use serde_json::Value;
use vibezy::{HttpMethod, HttpRequest, HttpResponse, VibeClient, VibeError};

const BASE_URL: &str = "http://localhost:3000";
const API_KEY: &str = "t3stT0K3n";

fn client() -> VibeClient {
    VibeClient::new(API_KEY, BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn input<T: serde::de::DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn to_json<T: serde::Serialize>(result: Result<T, VibeError>) -> Result<Value, VibeError> {
    result.map(|value| serde_json::to_value(value).unwrap())
}

/// Build the request for `case` and run `response` through the matching parser.
fn run_case(
    c: &VibeClient,
    case: &Value,
    response: &HttpResponse,
) -> (HttpRequest, Result<Value, VibeError>) {
    let operation = case["operation"].as_str().unwrap();
    match operation {
        "ping" => (c.build_ping(), to_json(c.parse_ping(response))),
        "list_users" => (c.build_list_users(), to_json(c.parse_list_users(response))),
        "get_user" => (
            c.build_get_user(case["input"].as_str().unwrap()),
            to_json(c.parse_get_user(response)),
        ),
        "update_user" => (
            c.build_update_user(case["input"].as_str().unwrap()),
            to_json(c.parse_update_user(response)),
        ),
        "deactivate_user" => (
            c.build_deactivate_user(&input(case)).unwrap(),
            to_json(c.parse_deactivate_user(response)),
        ),
        "list_groups" => (c.build_list_groups(), to_json(c.parse_list_groups(response))),
        "get_group" => (
            c.build_get_group(case["input"].as_str().unwrap()),
            to_json(c.parse_get_group(response)),
        ),
        "create_group" => (
            c.build_create_group(&input(case)).unwrap(),
            to_json(c.parse_create_group(response)),
        ),
        "remove_group" => (
            c.build_remove_group(&input(case)).unwrap(),
            to_json(c.parse_remove_group(response)),
        ),
        "add_users_to_group" => (
            c.build_add_users_to_group(&input(case)).unwrap(),
            to_json(c.parse_add_users_to_group(response)),
        ),
        "remove_users_from_group" => (
            c.build_remove_users_from_group(&input(case)).unwrap(),
            to_json(c.parse_remove_users_from_group(response)),
        ),
        "remove_all_users_from_group" => (
            c.build_remove_all_users_from_group(&input(case)).unwrap(),
            to_json(c.parse_remove_all_users_from_group(response)),
        ),
        "sync" => (
            c.build_sync(&input(case)).unwrap(),
            to_json(c.parse_sync(response)),
        ),
        other => panic!("unknown operation: {other}"),
    }
}

fn check_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let c = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );

        let (req, result) = run_case(&c, case, &response);

        // Verify build
        let expected_req = &case["expected_request"];
        let method = parse_method(expected_req["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        let path = expected_req["path"].as_str().unwrap();
        assert_eq!(req.url, format!("{BASE_URL}{path}"), "{name}: url");
        assert_eq!(
            req.header("Authorization"),
            Some("Bearer t3stT0K3n"),
            "{name}: auth header"
        );
        assert_eq!(
            req.header("content-type"),
            Some("application/json"),
            "{name}: content type"
        );
        match expected_req.get("body") {
            Some(expected_body) => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        // Verify parse
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error["kind"].as_str().unwrap() {
                "DecodingError" => assert!(
                    matches!(err, VibeError::DecodingError(_)),
                    "{name}: expected DecodingError, got {err:?}"
                ),
                "ApiError" => match err {
                    VibeError::ApiError { status, message } => {
                        let expected_status = expected_error["status"].as_u64().unwrap();
                        assert_eq!(u64::from(status), expected_status, "{name}: status");
                        let expected_message = expected_error["message"].as_str().unwrap();
                        assert_eq!(message, expected_message, "{name}: message");
                    }
                    other => panic!("{name}: expected ApiError, got {other:?}"),
                },
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn user_test_vectors() {
    check_vectors(include_str!("../../test-vectors/users.json"));
}

#[test]
fn group_test_vectors() {
    check_vectors(include_str!("../../test-vectors/groups.json"));
}
