use movlib_dal::summary::LibrarySummary;
use movlib_e2e_tests::{extend_url, launch_env};
use serde_json::Value;
use tracing_test::traced_test;

async fn get_summary(client: &reqwest::Client, base: &url::Url) -> LibrarySummary {
    client
        .get(base.join("api/summary").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_summary_counts() {
    let (client, env) = launch_env("test_summary_counts").await.unwrap();

    let empty = get_summary(&client, &env.base_url).await;
    assert_eq!(
        empty,
        LibrarySummary {
            movie_count: 0,
            movie_instance_count: 0,
            available_instance_count: 0,
            producer_count: 0,
            genre_count: 0,
        }
    );

    let producer: Value = client
        .post(env.base_url.join("api/producer").unwrap())
        .json(&serde_json::json!({"first_name": "Isaac", "family_name": "Asimov"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let movie: Value = client
        .post(env.base_url.join("api/movie").unwrap())
        .json(&serde_json::json!({
            "title": "Foundation",
            "producer_id": producer["id"],
            "summary": "Psychohistory.",
            "isbn": "9780553293357",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let instance: Value = client
        .post(env.base_url.join("api/instance").unwrap())
        .json(&serde_json::json!({
            "movie_id": movie["id"],
            "imprint": "Gnome Press, 1951.",
            "status": "Available",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let summary = get_summary(&client, &env.base_url).await;
    assert_eq!(summary.movie_count, 1);
    assert_eq!(summary.movie_instance_count, 1);
    assert_eq!(summary.available_instance_count, 1);
    assert_eq!(summary.producer_count, 1);
    assert_eq!(summary.genre_count, 0);

    // loaning the copy only moves the available count
    let instance_url = extend_url(&env.base_url.join("api/instance").unwrap(), instance["id"].as_i64().unwrap());
    let response = client
        .put(instance_url)
        .json(&serde_json::json!({
            "movie_id": movie["id"],
            "imprint": instance["imprint"],
            "status": "Loaned",
            "due_back": instance["due_back"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let after = get_summary(&client, &env.base_url).await;
    assert_eq!(after.available_instance_count, 0);
    assert_eq!(after.movie_instance_count, 1);
    assert_eq!(after.movie_count, 1);
}
