use std::sync::Arc;

use rocket::{
    http::{ContentType, Header, Status},
    local::asynchronous::{Client, LocalResponse},
};

use crate::{
    admin::{ClearReport, ClearStrategy, ADMIN_KEY_HEADER},
    config::Config,
    database::{FailureSwitches, GameMode, GameRecord, GameRecordInput, MemoryRecordStore},
    leaderboard::RankedEntry,
};

const MASTER_PASSWORD: &str = "correct horse";

async fn spawn_client() -> (Client, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::new());
    let rocket = super::build(Config::in_memory(MASTER_PASSWORD), store.clone());
    let client = Client::tracked(rocket).await.expect("valid rocket instance");
    (client, store)
}

async fn deserialize_response<'a, T: rocket::serde::DeserializeOwned>(
    response: LocalResponse<'a>,
) -> rocket::serde::json::serde_json::Result<T> {
    let string = response.into_string().await.unwrap();
    rocket::serde::json::serde_json::from_str(&string)
}

/// Submits a record and returns the stored version
async fn save_record<'a>(
    client: &'a Client,
    record: &GameRecordInput,
) -> Result<GameRecord, LocalResponse<'a>> {
    let response = client.post("/records").json(record).dispatch().await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    Ok(deserialize_response(response).await.unwrap())
}

async fn get_records<'a>(
    client: &'a Client,
    uri: &'a str,
) -> Result<Vec<GameRecord>, LocalResponse<'a>> {
    let response = client.get(uri).dispatch().await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    Ok(deserialize_response(response).await.unwrap())
}

/// Clears all records with the given admin password
async fn clear_records<'a>(
    client: &'a Client,
    password: &str,
) -> Result<ClearReport, LocalResponse<'a>> {
    let response = client
        .delete("/records")
        .header(Header::new(ADMIN_KEY_HEADER, password.to_owned()))
        .dispatch()
        .await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    Ok(deserialize_response(response).await.unwrap())
}

fn sample_records() -> Vec<GameRecordInput> {
    vec![
        GameRecordInput::new("ten_thirty", 10, 10, 30, GameMode::FlagToCountry),
        GameRecordInput::new("ten_twenty", 10, 10, 20, GameMode::FlagToCountry),
        GameRecordInput::new("eight_ten", 8, 10, 10, GameMode::FlagToCountry),
        GameRecordInput::new("capital_slow", 7, 10, 90, GameMode::CountryToCapital),
        GameRecordInput::new("capital_fast", 7, 10, 45, GameMode::CountryToCapital),
    ]
}

async fn fill(client: &Client) {
    for record in sample_records() {
        save_record(client, &record).await.unwrap();
    }
}

#[rocket::async_test]
async fn index_and_modes() {
    let (client, _) = spawn_client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/modes").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("FLAG_TO_COUNTRY"));
    assert!(body.contains("COUNTRY_TO_CAPITAL"));
}

/// Saves a record and gets the server-assigned fields back
#[rocket::async_test]
async fn save_assigns_id() {
    let (client, store) = spawn_client().await;

    let input = GameRecordInput::new(" mina ", 9, 10, 61, GameMode::CountryToCapital);
    let record = save_record(&client, &input).await.unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.player_name, "mina");
    assert_eq!(record.score, 9);
    assert_eq!(record.game_mode, GameMode::CountryToCapital);
    assert!(!record.created_at.is_empty());
    assert_eq!(store.len().await, 1);
}

#[rocket::async_test]
async fn save_rejects_invalid_record() {
    let (client, store) = spawn_client().await;

    let input = GameRecordInput::new("cheater", 11, 10, 1, GameMode::FlagToCountry);
    let response = save_record(&client, &input).await.unwrap_err();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    assert!(response.into_string().await.unwrap().contains("exceeds"));

    let response = client
        .post("/records")
        .header(ContentType::JSON)
        .body(r#"{"player_name":"x","score":1,"total_questions":2,"time_taken":3,"game_mode":"SPACE"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    assert!(store.is_empty().await);
}

/// Records come back filtered by mode and in ranking order
#[rocket::async_test]
async fn records_filtered_and_ranked() {
    let (client, _) = spawn_client().await;
    fill(&client).await;

    let flags = get_records(&client, "/records?mode=FLAG_TO_COUNTRY")
        .await
        .unwrap();
    let names: Vec<&str> = flags.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, vec!["ten_twenty", "ten_thirty", "eight_ten"]);

    let capitals = get_records(&client, "/records?mode=COUNTRY_TO_CAPITAL&limit=20")
        .await
        .unwrap();
    assert_eq!(capitals.len(), 2);
    assert!(capitals
        .iter()
        .all(|r| r.game_mode == GameMode::CountryToCapital));
    assert_eq!(capitals[0].player_name, "capital_fast");

    let all = get_records(&client, "/records?limit=4").await.unwrap();
    assert_eq!(all.len(), 4);
    for pair in all.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].time_taken <= pair[1].time_taken)
        );
    }
}

#[rocket::async_test]
async fn leaderboard_entries() {
    let (client, _) = spawn_client().await;
    fill(&client).await;

    let response = client.get("/leaderboard/FLAG_TO_COUNTRY").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let entries: Vec<RankedEntry> = deserialize_response(response).await.unwrap();

    let ranked: Vec<(usize, &str)> = entries
        .iter()
        .map(|entry| (entry.rank, entry.record.player_name.as_str()))
        .collect();
    assert_eq!(
        ranked,
        vec![(1, "ten_twenty"), (2, "ten_thirty"), (3, "eight_ten")]
    );
    assert_eq!(entries[0].percentage, 100);
    assert_eq!(entries[0].time, "0:20");
    assert_eq!(entries[2].percentage, 80);

    let response = client.get("/leaderboard/NOT_A_MODE").dispatch().await;
    assert_ne!(response.status(), Status::Ok);
}

/// A failing store is reported instead of showing an empty leaderboard
#[rocket::async_test]
async fn store_failure_is_reported() {
    let (client, store) = spawn_client().await;
    fill(&client).await;
    store
        .set_failures(FailureSwitches {
            select: true,
            ..FailureSwitches::default()
        })
        .await;

    let response = get_records(&client, "/records").await.unwrap_err();
    assert_eq!(response.status(), Status::ServiceUnavailable);

    let response = client.get("/leaderboard/COUNTRY_TO_CAPITAL").dispatch().await;
    assert_eq!(response.status(), Status::ServiceUnavailable);

    store.set_failures(FailureSwitches::default()).await;
    assert_eq!(get_records(&client, "/records").await.unwrap().len(), 5);
}

/// Fails to clear with a bad password, then clears twice
#[rocket::async_test]
async fn clear_with_password() {
    let (client, store) = spawn_client().await;
    fill(&client).await;

    let response = clear_records(&client, "thatisarandomkey").await.unwrap_err();
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(store.len().await, 5);

    let response = clear_records(&client, "").await.unwrap_err();
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.delete("/records").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(store.len().await, 5);

    let report = clear_records(&client, MASTER_PASSWORD).await.unwrap();
    assert_eq!(report.strategy, ClearStrategy::Bulk);
    assert_eq!((report.deleted, report.total), (5, 5));
    assert!(store.is_empty().await);

    let report = clear_records(&client, MASTER_PASSWORD).await.unwrap();
    assert_eq!((report.deleted, report.total), (0, 0));
    assert!(store.is_empty().await);
}

#[rocket::async_test]
async fn partial_clear_reports_count() {
    let (client, store) = spawn_client().await;
    fill(&client).await;
    store
        .set_failures(FailureSwitches {
            delete_all: true,
            delete_id_list: true,
            delete_rows: [3].into_iter().collect(),
            ..FailureSwitches::default()
        })
        .await;

    let report = clear_records(&client, MASTER_PASSWORD).await.unwrap();
    assert_eq!(report.strategy, ClearStrategy::RowByRow);
    assert_eq!((report.deleted, report.total), (4, 5));
    assert!(!report.complete());
    assert_eq!(store.len().await, 1);
}

/// Query values that do not parse are rejected instead of being ignored
#[rocket::async_test]
async fn malformed_query_is_rejected() {
    let (client, _) = spawn_client().await;
    fill(&client).await;

    let response = get_records(&client, "/records?mode=SPACE").await.unwrap_err();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    assert!(response
        .into_string()
        .await
        .unwrap()
        .contains("unknown game mode"));

    for uri in ["/records?limit=abc", "/records?limit=-1"] {
        let response = get_records(&client, uri).await.unwrap_err();
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }

    let response = client
        .get("/leaderboard/FLAG_TO_COUNTRY?limit=x")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let capitals = get_records(&client, "/records?mode=country_to_capital")
        .await
        .unwrap();
    assert_eq!(capitals.len(), 2);
}

/// A bulk delete that succeeded is reported even if the follow-up count fails
#[rocket::async_test]
async fn clear_survives_failed_count() {
    let (client, store) = spawn_client().await;
    fill(&client).await;
    store
        .set_failures(FailureSwitches {
            record_ids: true,
            ..FailureSwitches::default()
        })
        .await;

    let report = clear_records(&client, MASTER_PASSWORD).await.unwrap();
    assert_eq!(report.strategy, ClearStrategy::Bulk);
    assert_eq!((report.deleted, report.total), (5, 5));
    assert!(store.is_empty().await);
}
