use movlib_e2e_tests::{extend_url, launch_env};
use serde_json::Value;
use tracing::info;
use tracing_test::traced_test;

async fn post(client: &reqwest::Client, url: url::Url, body: Value) -> Value {
    let response = client.post(url).json(&body).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_movie_lifecycle_with_guarded_deletes() {
    let (client, env) = launch_env("test_movie_lifecycle").await.unwrap();

    let producer_url = env.base_url.join("api/producer").unwrap();
    let genre_url = env.base_url.join("api/genre").unwrap();
    let movie_url = env.base_url.join("api/movie").unwrap();
    let instance_url = env.base_url.join("api/instance").unwrap();

    let producer = post(
        &client,
        producer_url.clone(),
        serde_json::json!({"first_name": "Ben", "family_name": "Bova"}),
    )
    .await;
    let producer_id = producer["id"].as_i64().unwrap();

    let genre = post(
        &client,
        genre_url.clone(),
        serde_json::json!({"name": "Science Fiction"}),
    )
    .await;
    let genre_id = genre["id"].as_i64().unwrap();

    let movie = post(
        &client,
        movie_url.clone(),
        serde_json::json!({
            "title": "Death Wave",
            "producer_id": producer_id,
            "summary": "Jordan Kell led the first human mission to Sirius.",
            "isbn": "9780765379504",
            "genres": [genre_id],
        }),
    )
    .await;
    let movie_id = movie["id"].as_i64().unwrap();
    assert_eq!(movie["producer"]["name"], "Bova, Ben");
    assert_eq!(movie["genres"][0]["name"], "Science Fiction");

    // producer delete is blocked by the movie and returns it
    let producer_record_url = extend_url(&producer_url, producer_id);
    let response = client
        .delete(producer_record_url.clone())
        .send()
        .await
        .unwrap();
    info!("Blocked delete response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 409);
    let blocked: Value = response.json().await.unwrap();
    let blocking = blocked["blocking"].as_array().unwrap();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0]["id"].as_i64().unwrap(), movie_id);
    assert_eq!(blocking[0]["title"], "Death Wave");

    let instance = post(
        &client,
        instance_url.clone(),
        serde_json::json!({
            "movie_id": movie_id,
            "imprint": "New York Tor, 2015.",
            "status": "Available",
        }),
    )
    .await;
    let instance_id = instance["id"].as_i64().unwrap();
    assert_eq!(instance["movie"]["title"], "Death Wave");

    // movie detail resolves references and lists its copies
    let movie_record_url = extend_url(&movie_url, movie_id);
    let detail: Value = client
        .get(movie_record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["title"], "Death Wave");
    assert_eq!(detail["instances"].as_array().unwrap().len(), 1);

    // movie delete is blocked by the instance
    let response = client
        .delete(movie_record_url.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    let blocked: Value = response.json().await.unwrap();
    assert_eq!(
        blocked["blocking"][0]["id"].as_i64().unwrap(),
        instance_id
    );

    // removing the instance unblocks the movie, then the producer
    let response = client
        .delete(extend_url(&instance_url, instance_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.delete(movie_record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.delete(producer_record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
#[traced_test]
async fn test_movie_form_options() {
    let (client, env) = launch_env("test_movie_form_options").await.unwrap();

    let producer_url = env.base_url.join("api/producer").unwrap();
    let genre_url = env.base_url.join("api/genre").unwrap();

    post(
        &client,
        producer_url,
        serde_json::json!({"first_name": "Patrick", "family_name": "Rothfuss"}),
    )
    .await;
    let fantasy = post(&client, genre_url.clone(), serde_json::json!({"name": "Fantasy"})).await;
    post(&client, genre_url, serde_json::json!({"name": "Poetry"})).await;
    let fantasy_id = fantasy["id"].as_i64().unwrap();

    let mut options_url = env.base_url.join("api/movie/form-options").unwrap();
    options_url.set_query(Some(&format!("selected={fantasy_id}")));
    let options: Value = client
        .get(options_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(options["producers"].as_array().unwrap().len(), 1);
    let genres = options["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 2);
    for genre in genres {
        let expected = genre["id"].as_i64().unwrap() == fantasy_id;
        assert_eq!(genre["selected"].as_bool().unwrap(), expected);
    }
}
