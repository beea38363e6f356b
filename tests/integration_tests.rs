use httpmock::prelude::*;
use medibot::app::medibot::{MediBot, PARSE_FALLBACK};
use medibot::utils::validation::Validate;
use medibot::{ChatSession, LocalStorage, MediBotError, Resolution, TomlConfig};
use tempfile::TempDir;

const TABLE: &str = "\
center,services,address,phone,hours,ratings,fees
Harborview Medical Center,\"Dialysis, Checkup\",120 Harbor Ave,555-0101,Mon-Fri 8am-6pm,4.6,150
Riverside Dermatology,\"Dermatology, Allergy Testing\",8 River Rd,555-0103,Tue-Sat 10am-6pm,4.8,120
Pinecrest Kidney Care,\"Dialysis, Nephrology\",14 Pinecrest Ave,555-0110,Mon-Sat 6am-10pm,4.0,180
";

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn write_fixture(dir: &TempDir, table: &str, assistant_endpoint: Option<&str>) -> TomlConfig {
    std::fs::write(dir.path().join("centers.csv"), table).unwrap();

    let assistant = match assistant_endpoint {
        Some(endpoint) => format!(
            "[assistant]\nenabled = true\nendpoint = \"{}\"\napi_key = \"integration-key\"\ntimeout_seconds = 5\n",
            endpoint
        ),
        None => String::new(),
    };
    let config_path = dir.path().join("medibot.toml");
    std::fs::write(
        &config_path,
        format!("[catalog]\npath = \"centers.csv\"\n\n{}", assistant),
    )
    .unwrap();

    let config = TomlConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();
    config
}

fn storage_for(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_str().unwrap().to_string())
}

fn reply_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_end_to_end_service_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, TABLE, None);

    let bot = MediBot::bootstrap(&config, &storage_for(&temp_dir))
        .await
        .unwrap();

    assert_eq!(bot.catalog().len(), 3);

    let answer = bot.answer_service_query("  Dialysis ");
    assert_eq!(answer.notice, None);
    let harbor = answer.listing.find("Harborview Medical Center").unwrap();
    let pinecrest = answer.listing.find("Pinecrest Kidney Care").unwrap();
    assert!(harbor < pinecrest);
    assert!(!answer.listing.contains("Riverside Dermatology"));
    assert!(answer.listing.contains("  Fees: $150\n"));

    let corrected = bot.answer_service_query("dermatolgy");
    assert_eq!(
        corrected.notice.as_deref(),
        Some("Did you mean 'dermatology'? Showing results for 'dermatology'.")
    );
    assert!(corrected.listing.contains("Riverside Dermatology"));

    let missing = bot.answer_service_query("xyz123");
    assert_eq!(
        missing.listing,
        "Sorry, we do not have information on that service."
    );
}

#[tokio::test]
async fn test_resolution_tiers() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, TABLE, None);
    let bot = MediBot::bootstrap(&config, &storage_for(&temp_dir))
        .await
        .unwrap();

    assert!(matches!(
        bot.resolve("allergy"),
        Resolution::ExactOrSubstring { ref matches } if matches.len() == 1
    ));
    assert!(matches!(
        bot.resolve("nefrology"),
        Resolution::Corrected { ref suggested_tag, .. } if suggested_tag == "nephrology"
    ));
    assert_eq!(bot.resolve("xyz123"), Resolution::NoMatch);
}

#[tokio::test]
async fn test_bootstrap_fails_on_missing_column() {
    let temp_dir = TempDir::new().unwrap();
    let table = "center,services,address,hours,ratings,fees\nA,checkup,1 Main,9-5,4,10\n";
    let config = write_fixture(&temp_dir, table, None);

    let result = MediBot::bootstrap(&config, &storage_for(&temp_dir)).await;
    match result {
        Err(MediBotError::MalformedRow { reason, .. }) => assert!(reason.contains("phone")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("catalog should not load without a phone column"),
    }
}

#[tokio::test]
async fn test_bootstrap_fails_on_missing_table() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, TABLE, None);
    std::fs::remove_file(temp_dir.path().join("centers.csv")).unwrap();

    let result = MediBot::bootstrap(&config, &storage_for(&temp_dir)).await;
    assert!(matches!(result, Err(MediBotError::IoError(_))));
}

#[tokio::test]
async fn test_chat_session_with_mock_assistant() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let config = write_fixture(&temp_dir, TABLE, Some(&server.base_url()));

    let mut first = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .header("x-goog-api-key", "integration-key")
            .body_contains("What does a nephrologist do?");
        then.status(200).json_body(reply_body(
            r#"{"response": "A nephrologist treats kidney conditions.", "quit": false}"#,
        ));
    });

    let bot = MediBot::bootstrap(&config, &storage_for(&temp_dir))
        .await
        .unwrap();
    let mut session = ChatSession::new();

    let answer = bot
        .answer_prompt(&mut session, "What does a nephrologist do?")
        .await;
    assert_eq!(answer.text, "A nephrologist treats kidney conditions.");
    assert!(!session.is_ended());
    first.assert();
    first.delete();

    // the follow-up carries the first exchange as history
    let second = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_contains("A nephrologist treats kidney conditions.")
            .body_contains("Thanks, bye");
        then.status(200).json_body(reply_body(
            "```json\n{\"response\": \"Goodbye!\", \"quit\": true}\n```",
        ));
    });

    let answer = bot.answer_prompt(&mut session, "Thanks, bye").await;
    assert_eq!(answer.text, "Goodbye!");
    assert!(answer.quit);
    assert!(session.is_ended());
    assert_eq!(session.history().len(), 4);
    second.assert();
}

#[tokio::test]
async fn test_unparsable_assistant_reply_uses_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let config = write_fixture(&temp_dir, TABLE, Some(&server.base_url()));

    let _api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .json_body(reply_body("{'response': 'single quotes', 'quit': false}"));
    });

    let bot = MediBot::bootstrap(&config, &storage_for(&temp_dir))
        .await
        .unwrap();
    let mut session = ChatSession::new();

    let answer = bot.answer_prompt(&mut session, "hello").await;
    assert_eq!(answer.text, PARSE_FALLBACK);
    assert!(!answer.quit);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_bundled_table_loads() -> anyhow::Result<()> {
    let storage = LocalStorage::new(env!("CARGO_MANIFEST_DIR").to_string());
    let catalog =
        medibot::app::medibot::load_catalog(&storage, "data/medical_services.csv").await?;

    assert_eq!(catalog.len(), 10);
    assert!(catalog.all_service_tags().contains("dialysis"));
    assert_eq!(catalog.find_by_service("x-ray").len(), 2);
    Ok(())
}
