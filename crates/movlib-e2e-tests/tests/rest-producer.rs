use movlib_dal::producer::Producer;
use movlib_e2e_tests::{extend_url, launch_env};
use serde_json::Value;
use tracing::info;
use tracing_test::traced_test;

fn create_producer(first_name: &str, family_name: &str) -> Value {
    serde_json::json!({"first_name": first_name, "family_name": family_name})
}

#[tokio::test]
#[traced_test]
async fn test_producers() {
    let (client, env) = launch_env("test_producers").await.unwrap();

    let api_url = env.base_url.join("api/producer").unwrap();

    let producer = serde_json::json!({
        "first_name": "Ben",
        "family_name": "Bova",
        "date_of_birth": "1932-11-08",
        "date_of_death": "2020-11-29",
    });
    let response = client
        .post(api_url.clone())
        .json(&producer)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);

    let new_producer: Producer = response.json().await.unwrap();
    let id = new_producer.id;
    assert_eq!(new_producer.family_name, "Bova");

    let record_url = extend_url(&api_url, id);

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let detail: Value = response.json().await.unwrap();
    assert_eq!(detail["name"], "Bova, Ben");
    assert_eq!(detail["lifespan"], "1932-11-08 - 2020-11-29");
    assert_eq!(detail["movies"].as_array().unwrap().len(), 0);

    let updated = create_producer("Benjamin", "Bova");
    let response = client
        .put(record_url.clone())
        .json(&updated)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let rec: Producer = response.json().await.unwrap();
    assert_eq!(rec.first_name, "Benjamin");
    assert_eq!(rec.date_of_birth, None);

    let response = client.get(api_url.clone()).send().await.unwrap();
    let list: Value = response.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Bova, Benjamin");

    // unguarded delete, no movies reference this producer
    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[traced_test]
async fn test_producer_validation() {
    let (client, env) = launch_env("test_producer_validation").await.unwrap();

    let api_url = env.base_url.join("api/producer").unwrap();

    // empty family name fails validation before any store mutation
    let response = client
        .post(api_url.clone())
        .json(&create_producer("Ben", ""))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client.get(api_url.clone()).send().await.unwrap();
    let list: serde_json::Value = response.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 0);
}
