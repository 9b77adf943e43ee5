//! Full dispatch through a built app, driven by synthetic events.

use cirrus::prelude::*;
use cirrus_config::ConfigLoader;
use cirrus_middleware::stages::REQUEST_ID_HEADER;
use cirrus_test::{TestClient, TestRequest};
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::json;

static QUOTA: ErrorKind = ErrorKind::new("QuotaExceeded", &RUNTIME_ERROR);
static STRAY: ErrorKind = ErrorKind::root("Stray");

fn items() -> AppBuilder {
    App::builder()
        .get("/items/{id:int}", |req: &Request| {
            let id: i64 = req.path_params().get_as("id")?;
            Ok((format!("item {id}"), 200))
        })
        .get("/quota", |_: &Request| -> Result<Response, Error> {
            Err(Error::new(&QUOTA, "too many"))
        })
        .get("/stray", |_: &Request| -> Result<Response, Error> {
            Err(Error::new(&STRAY, "outside the hierarchy"))
        })
        .get("/teapot", |_: &Request| -> Result<Response, Error> {
            Err(HttpError::new(StatusCode::IM_A_TEAPOT).into())
        })
}

#[test]
fn test_routing_outcomes_on_the_wire() {
    let client = TestClient::new(items().build().unwrap());

    assert_eq!(
        client.get("/items/42").send().to_json(),
        json!({"body": "item 42", "statusCode": 200})
    );
    assert_eq!(
        client.post("/items/42").send().to_json(),
        json!({"body": "Method Not Allowed", "statusCode": 405, "headers": {"Allow": "GET"}})
    );
    assert_eq!(
        client.get("/missing").send().to_json(),
        json!({"body": "Not Found", "statusCode": 404})
    );
}

#[test]
fn test_converter_rejects_non_matching_segment() {
    let client = TestClient::new(items().build().unwrap());
    client.get("/items/abc").send().assert_status(404);
}

#[test]
fn test_ancestor_kind_handler() {
    let app = items()
        .exception_handler(&RUNTIME_ERROR, |_: &Request, err: &Error| {
            (format!("runtime: {}", err.kind()), 503)
        })
        .build()
        .unwrap();

    TestClient::new(app)
        .get("/quota")
        .send()
        .assert_status(503)
        .assert_text("runtime: QuotaExceeded");
}

#[test]
fn test_status_handler_beats_kind_handler() {
    let app = items()
        .exception_handler(StatusCode::NOT_FOUND, |_: &Request, _: &Error| ("nothing here", 404))
        .exception_handler(&HTTP_ERROR, |_: &Request, _: &Error| ("generic", 400))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client.get("/missing").send().assert_status(404).assert_text("nothing here");
    client.get("/teapot").send().assert_status(400).assert_text("generic");
}

#[test]
fn test_unhandled_errors_become_500() {
    let client = TestClient::new(items().build().unwrap());

    for path in ["/quota", "/stray"] {
        assert_eq!(
            client.get(path).send().to_json(),
            json!({"body": "Internal Server Error", "statusCode": 500})
        );
    }
}

#[test]
fn test_debug_mode_renders_report() {
    let client = TestClient::new(items().debug(true).build().unwrap());
    let response = client.get("/quota").send();
    response.assert_status(500);
    assert!(response.text().unwrap().contains("QuotaExceeded: too many"));
}

#[test]
fn test_boundary_handler_from_root_kind() {
    let app = items()
        .debug(true)
        .exception_handler(&ERROR, |_: &Request, err: &Error| {
            (format!("oops: {}", err.message()), 500)
        })
        .build()
        .unwrap();

    TestClient::new(app)
        .get("/stray")
        .send()
        .assert_status(500)
        .assert_text("oops: outside the hierarchy");
}

#[test]
fn test_middleware_wraps_in_registration_order() {
    let app = items()
        .middleware(FnMiddleware::new("inner", |req: &Request, ctx: &Context, next: Next<'_>| {
            Ok(next.run(req, ctx)?.with_header("x-order", "inner"))
        }))
        .middleware(FnMiddleware::new("outer", |req: &Request, ctx: &Context, next: Next<'_>| {
            let response = next.run(req, ctx)?;
            let seen = response.headers().get("x-order").unwrap_or_default().to_string();
            Ok(response.with_header("x-order", format!("{seen}>outer")))
        }))
        .build()
        .unwrap();

    assert_eq!(app.stage_names(), ["server_error", "outer", "inner", "exception"]);

    let response = TestClient::new(app).get("/items/1").send();
    assert_eq!(response.header("x-order"), Some("inner>outer"));
}

#[test]
fn test_user_layer_errors_skip_exception_layer() {
    let app = items()
        .middleware(FnMiddleware::new("deny", |_: &Request, _: &Context, _: Next<'_>| {
            Err(HttpError::new(StatusCode::FORBIDDEN).into())
        }))
        .build()
        .unwrap();

    TestClient::new(app).get("/items/1").send().assert_status(500);
}

#[test]
fn test_request_id_middleware() {
    let app = items().middleware(RequestIdMiddleware::new()).build().unwrap();
    let client = TestClient::new(app);

    let id = client.get("/items/1").send().header(REQUEST_ID_HEADER).map(str::to_owned);
    assert_eq!(id.map(|id| id.len()), Some(36));

    let missing = client.get("/missing").send();
    missing.assert_status(404);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    sku: String,
    qty: u32,
}

#[test]
fn test_json_body_codec() {
    let app = App::builder()
        .post("/orders", |req: &Request| {
            let order: Order = req.json()?;
            Ok((json!({"sku": order.sku, "qty": order.qty}), 201))
        })
        .build()
        .unwrap();
    let client = TestClient::new(app);

    let created = client.post("/orders").json(&json!({"sku": "a-1", "qty": 2})).send();
    created.assert_status(201);
    assert_eq!(created.json::<Order>().unwrap(), Order { sku: "a-1".into(), qty: 2 });

    client
        .post("/orders")
        .body("{\"sku\":\"a-1\",\"qty\":2}")
        .send()
        .assert_status(415);

    client
        .post("/orders")
        .content_type("application/json; charset=utf-8")
        .body("{not json")
        .send()
        .assert_status(400);
}

#[test]
fn test_query_and_form() {
    let app = App::builder()
        .get("/search", |req: &Request| {
            Ok(req.query().get("q").unwrap_or("none").to_string())
        })
        .post("/login", |req: &Request| {
            let form = req.form()?;
            Ok(format!("hello {}", form.get("user").unwrap_or("?")))
        })
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client.get("/search").query("q", "a b").send().assert_text("a b");
    client.get("/search").send().assert_text("none");
    client
        .post("/login")
        .form(&[("user", "ann")])
        .send()
        .assert_text("hello ann");
}

#[test]
fn test_binary_round_trip() {
    let app = App::builder()
        .post("/blob", |req: &Request| {
            let mut bytes = req.body_bytes()?.to_vec();
            bytes.reverse();
            Ok(bytes)
        })
        .build()
        .unwrap();

    let response = TestClient::new(app).post("/blob").binary([1u8, 2, 3]).send();
    assert_eq!(response.bytes().unwrap().as_ref(), [3, 2, 1]);
}

#[test]
fn test_endpoint_per_method_handlers() {
    let app = App::builder()
        .endpoint(
            "/things",
            MethodRouter::new()
                .get(|_: &Request| Ok("list"))
                .post(|_: &Request| Ok(("made", 201))),
        )
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client.get("/things").send().assert_text("list");
    client.post("/things").send().assert_status(201);
    client
        .delete("/things")
        .send()
        .assert_status(405)
        .assert_header("Allow", "GET, POST");
}

#[test]
fn test_first_path_match_decides() {
    let app = App::builder()
        .get("/pets/{name}", |_: &Request| Ok("by name"))
        .post("/pets/{name}", |_: &Request| Ok("never reached"))
        .build()
        .unwrap();

    TestClient::new(app)
        .post("/pets/rex")
        .send()
        .assert_status(405)
        .assert_header("allow", "GET");
}

#[test]
fn test_non_web_event() {
    let client = TestClient::new(items().build().unwrap());
    assert_eq!(
        client.handle_raw(json!({"source": "scheduler"})),
        json!({"body": "Internal Server Error"})
    );
}

#[test]
fn test_malformed_method_goes_through_handlers() {
    let app = items()
        .exception_handler(StatusCode::BAD_REQUEST, |_: &Request, _: &Error| ("custom 400", 400))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    assert_eq!(
        client.handle_raw(json!({"http": {"method": "GE T", "path": "/x", "headers": {}}})),
        json!({"body": "custom 400", "statusCode": 400})
    );
}

#[test]
fn test_malformed_method_default_rendering() {
    let client = TestClient::new(items().build().unwrap());
    client
        .request(Method::from_bytes(b"PURGE").unwrap(), "/items/1")
        .send()
        .assert_status(405);
    assert_eq!(
        client.handle_raw(json!({"http": {"method": "GE T", "path": "/items/1"}})),
        json!({"body": "invalid method `GE T`", "statusCode": 400})
    );
}

#[test]
fn test_context_reaches_middleware() {
    let app = items()
        .middleware(FnMiddleware::new("ctx", |req: &Request, ctx: &Context, next: Next<'_>| {
            let tenant = ctx.as_value()["tenant"].as_str().unwrap_or("none").to_string();
            Ok(next.run(req, ctx)?.with_header("x-tenant", tenant))
        }))
        .build()
        .unwrap();
    let client = TestClient::new(app).with_context(json!({"tenant": "acme"}));

    client.get("/items/1").send().assert_header("x-tenant", "acme");
    client
        .get("/items/1")
        .context(json!({"tenant": "other"}))
        .send()
        .assert_header("x-tenant", "other");
}

#[test]
fn test_prebuilt_request_dispatch() {
    let client = TestClient::new(items().build().unwrap());
    let request = TestRequest::get("/items/7")
        .parameter("stage", "prod")
        .build()
        .unwrap();
    client.dispatch(&request).assert_text("item 7");
}

#[test]
fn test_app_from_config() {
    let config = ConfigLoader::new()
        .with_string("[app]\nname = \"orders\"\ndebug = true\n", "toml")
        .unwrap()
        .load()
        .unwrap();

    let app = AppBuilder::from_config(&config)
        .get("/boom", |_: &Request| -> Result<Response, Error> {
            Err(Error::new(&VALUE_ERROR, "bad input"))
        })
        .build()
        .unwrap();
    assert_eq!(app.name(), "orders");
    assert!(app.is_debug());

    let response = TestClient::new(app).get("/boom").send();
    assert!(response.text().unwrap().contains("ValueError: bad input"));
}

proptest! {
    #[test]
    fn prop_int_paths_echo_id(id in 0u32..1_000_000) {
        let client = TestClient::new(items().build().unwrap());
        let response = client.get(format!("/items/{id}")).send();
        prop_assert_eq!(response.status_code(), Some(200));
        prop_assert_eq!(response.text().unwrap(), format!("item {id}"));
    }

    #[test]
    fn prop_unknown_paths_are_404(segment in "[a-z]{1,12}") {
        prop_assume!(!["items", "quota", "stray", "teapot"].contains(&segment.as_str()));
        let client = TestClient::new(items().build().unwrap());
        prop_assert_eq!(client.get(format!("/{segment}")).send().status_code(), Some(404));
    }
}
