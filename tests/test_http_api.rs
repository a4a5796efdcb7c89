use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use spicebox::{api, Spicebox};
use tokio::net::TcpListener;

/// Start a server on an ephemeral port over fresh in-memory stores.
async fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Spicebox::in_memory().unwrap();
    tokio::spawn(async move {
        api::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn send(request: reqwest::RequestBuilder) -> (StatusCode, Value) {
    let response = request.send().await.unwrap();
    let status = response.status();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}

async fn add_pancakes(client: &Client, base: &str) {
    let (status, _) = send(client.post(format!("{}/recipes", base)).json(&json!({
        "name": "pancakes",
        "steps": "mix and fry",
        "ingredients": [
            {"name": "flour", "quantity": "200", "unit": "gramas"},
            {"name": "milk", "quantity": "250", "unit": "mls"}
        ]
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app().await;
    let (status, body) = send(Client::new().get(format!("{}/health", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_recipe_lifecycle() {
    let base = spawn_app().await;
    let client = Client::new();
    add_pancakes(&client, &base).await;

    let (status, body) = send(client.get(format!("{}/recipes/pancakes", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "Pancakes");
    assert_eq!(body["data"]["ingredients"][0]["unit"], "Grm");

    let (status, body) = send(client.post(format!("{}/recipes", base)).json(&json!({
        "name": "Pancakes", "steps": "again", "ingredients": []
    })))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Recipe name 'Pancakes' already exists."})
    );

    let (status, _) = send(
        client
            .put(format!("{}/recipes/pancakes/ingredients/flour/quantity", base))
            .json(&json!({"new_quantity": "180"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        client
            .put(format!("{}/recipes/pancakes/name", base))
            .json(&json!({"new_name": "crepes"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_name"], "Crepes");

    let (_, body) = send(client.get(format!("{}/recipes/crepes", base))).await;
    assert_eq!(body["data"]["ingredients"][0]["quantity"], 180.0);

    let (status, _) = send(client.delete(format!("{}/recipes/crepes", base))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(client.get(format!("{}/recipes/crepes", base))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "'Crepes' not found.");
}

#[tokio::test]
async fn test_invalid_recipe_is_unprocessable() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = send(client.post(format!("{}/recipes", base)).json(&json!({
        "name": "soup",
        "steps": "boil",
        "ingredients": [{"name": "water", "quantity": "lots", "unit": "mls"}]
    })))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");

    let (status, body) = send(
        client
            .post(format!("{}/recipes", base))
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_ingredient_endpoints() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = send(
        client
            .post(format!("{}/ingredients", base))
            .json(&json!({"name": "rice", "unit": "kilos"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!({"name": "Rice", "unit": "Kgs"}));

    let (status, _) = send(
        client
            .put(format!("{}/ingredients/rice/unit", base))
            .json(&json!({"new_unit": "gramas"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        client
            .put(format!("{}/ingredients/rice/name", base))
            .json(&json!({"new_name": "basmati rice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(client.get(format!("{}/ingredients", base))).await;
    assert_eq!(body["data"], json!([{"name": "Basmati Rice", "unit": "Grm"}]));

    let (status, _) = send(client.delete(format!("{}/ingredients/basmati%20rice", base))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(client.get(format!("{}/ingredients/basmati%20rice", base))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_spice_link_and_suggest() {
    let base = spawn_app().await;
    let client = Client::new();
    add_pancakes(&client, &base).await;

    let (status, _) = send(client.post(format!("{}/spices", base)).json(&json!({
        "name": "cinnamon",
        "flavor_profile": "Sweet",
        "pairs_with_ingredients": "flour, milk"
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(client.put(format!("{}/spices", base)).json(&json!({
        "name": "cinnamon",
        "recommended_quantity": "1 tsp"
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["flavor_profile"], "Sweet");

    let link = json!({"recipe_name": "pancakes"});
    let url = format!("{}/spices/cinnamon/links", base);
    let (status, _) = send(client.post(&url).json(&link)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(client.post(&url).json(&link)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "'Cinnamon' already linked to 'Pancakes'.");

    let (status, body) =
        send(client.get(format!("{}/recipes/pancakes/spice-suggestions", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Cinnamon");
    assert_eq!(body["data"][0]["match_score"], 3);
    assert_eq!(body["data"][0]["recommended_quantity"], "1 tsp");

    let (status, body) = send(client.get(format!("{}/spices/cinnamon", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pairs_with_recipes"], json!(["Pancakes"]));

    let url = format!("{}/spices/cinnamon/links/pancakes", base);
    let (status, body) = send(client.delete(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recipe_name"], "Pancakes");
    let (status, _) = send(client.delete(&url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send(client.get(format!("{}/recipes/waffles/spice-suggestions", base))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_spices_named_like_route_segments_are_reachable() {
    let base = spawn_app().await;
    let client = Client::new();

    for name in ["link", "unlink", "suggest"] {
        let (status, _) = send(
            client
                .post(format!("{}/spices", base))
                .json(&json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(client.get(format!("{}/spices/link", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Link");
    let (status, body) = send(client.get(format!("{}/spices/unlink", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Unlink");
}

#[tokio::test]
async fn test_comma_names_rejected_over_http() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = send(client.post(format!("{}/recipes", base)).json(&json!({
        "name": "chicken, rice and beans",
        "steps": "simmer",
        "ingredients": []
    })))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid structure: name cannot contain commas");
}

#[tokio::test]
async fn test_import_endpoints() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = send(client.post(format!("{}/import/bulk", base)).json(&json!([
        {"title": "toast", "instructions": "toast it", "items": [
            {"item": "bread", "qty": 2, "measure": "unit"}
        ]},
        {"title": "nothing"}
    ])))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[0]["status"], "success");
    assert_eq!(body[1]["status"], "error");

    let (status, body) = send(
        client
            .post(format!("{}/import/bulkspices", base))
            .json(&json!([
                {"name": "pepper", "recipes": "toast", "combines_ingredients": ["bread"]},
                {"taste": "unnamed"}
            ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["success_count"], 1);
    assert_eq!(body["error_count"], 1);

    let (_, body) = send(client.get(format!("{}/recipes/toast", base))).await;
    assert_eq!(body["data"]["spices"], json!(["Pepper"]));
}
