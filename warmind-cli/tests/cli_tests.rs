use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::io::Write;
use tracing::level_filters::LevelFilter;
use warmind_cli::{Args, Command, entity_type, log_filter, run};
use warmind_types::DestinyHash;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENT_PATH: &str = "/content/en.json";

fn args_for(server: &MockServer, command: &[&str]) -> Args {
    let api = format!("{}/Platform", server.uri());
    let content = server.uri();
    let mut argv = vec![
        "warmind",
        "--api-key",
        "test-key",
        "--api-base-url",
        api.as_str(),
        "--content-base-url",
        content.as_str(),
    ];
    argv.extend_from_slice(command);
    Args::try_parse_from(argv).unwrap()
}

async fn mock_manifest(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Manifest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": {"version": "240601.2", "jsonWorldContentPaths": {"en": CONTENT_PATH, "fr": "/content/fr.json"}},
            "ErrorCode": 1,
            "ErrorStatus": "Success",
            "Message": "Ok"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(CONTENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DestinyStatDefinition": {
                "1480404414": {"hash": 1480404414, "displayProperties": {"name": "Attack"}},
                "2382671403": {"hash": 2382671403u32, "displayProperties": {"name": "Handling"}}
            },
            "DestinyInventoryItemDefinition": {
                "1363886209": {
                    "hash": 1363886209,
                    "displayProperties": {"name": "Jade Rabbit", "icon": "/jade.jpg"},
                    "itemType": 1,
                    "inventory": {"tierType": 6},
                    "stats": {"stats": {"1480404414": {"value": 42, "maximum": 100}}}
                }
            }
        })))
        .mount(server)
        .await;
}

// ── Argument parsing ────────────────────────────────────────────

#[test]
fn lookup_accepts_signed_hashes() {
    let args = Args::try_parse_from([
        "warmind",
        "--api-key",
        "k",
        "lookup",
        "stat",
        "-1912295893",
        "1480404414",
    ])
    .unwrap();

    match args.command {
        Command::Lookup {
            entity_type,
            hashes,
        } => {
            assert_eq!(entity_type, "stat");
            assert_eq!(
                hashes,
                vec![DestinyHash::new(2_382_671_403), DestinyHash::new(1_480_404_414)]
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn lookup_requires_a_hash() {
    assert!(Args::try_parse_from(["warmind", "--api-key", "k", "lookup", "stat"]).is_err());
}

#[test]
fn invalid_hash_is_rejected() {
    assert!(Args::try_parse_from(["warmind", "--api-key", "k", "lookup", "stat", "abc"]).is_err());
}

#[test]
fn flags_map_onto_configs() {
    let args = Args::try_parse_from([
        "warmind",
        "--api-key",
        "k",
        "--language",
        "de",
        "--download-timeout",
        "30",
        "--content-base-url",
        "https://cdn.test/",
        "version",
    ])
    .unwrap();

    let processor = args.processor_config();
    assert_eq!(processor.language, "de");
    assert_eq!(processor.download_timeout_secs, 30);
    assert_eq!(processor.content_host, "https://cdn.test/");

    let bungie = args.bungie_config();
    assert_eq!(bungie.api_key, "k");
    assert_eq!(bungie.content_base_url, "https://cdn.test");
    assert_eq!(bungie.api_base_url, "https://www.bungie.net/Platform");
}

#[test]
fn entity_aliases() {
    assert_eq!(entity_type("item"), "DestinyInventoryItemDefinition");
    assert_eq!(entity_type("Stat"), "DestinyStatDefinition");
    assert_eq!(entity_type("sandbox-perk"), "DestinySandboxPerkDefinition");
    assert_eq!(entity_type("DestinyLoreDefinition"), "DestinyLoreDefinition");
}

#[test]
fn log_filter_prefers_env_directives() {
    assert_eq!(log_filter(None, false).max_level_hint(), Some(LevelFilter::INFO));
    assert_eq!(log_filter(None, true).max_level_hint(), Some(LevelFilter::DEBUG));
    assert_eq!(log_filter(Some("warn"), true).max_level_hint(), Some(LevelFilter::WARN));
    assert_eq!(log_filter(Some("  "), false).max_level_hint(), Some(LevelFilter::INFO));
}

// ── Commands ────────────────────────────────────────────────────

#[tokio::test]
async fn version_command() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let output = run(&args_for(&server, &["version"])).await.unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, json!({"version": "240601.2", "languages": ["en", "fr"]}));
}

#[tokio::test]
async fn lookup_command_reports_missing_hashes() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let output = run(&args_for(
        &server,
        &["lookup", "item", "1363886209", "5"],
    ))
    .await
    .unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();

    let definitions = value["definitions"].as_array().unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0]["displayProperties"]["name"], "Jade Rabbit");
    assert_eq!(
        definitions[0]["resolvedHashes"]["stats"]["1480404414"]["definition"]["displayProperties"]["name"],
        "Attack"
    );
    assert_eq!(value["missing"], json!([5]));
}

#[tokio::test]
async fn search_command_falls_back_to_local_scan() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let output = run(&args_for(&server, &["search", "stat", "HANDL", "-n", "5"]))
        .await
        .unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(
        value,
        json!([{"hash": 2382671403u32, "name": "Handling", "description": "", "icon": null}])
    );
}

#[tokio::test]
async fn analyze_command_reads_item_file() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({"itemHash": 1363886209, "state": 4, "energy": {"energyCapacity": 10, "energyUsed": 7}})
    )
    .unwrap();
    let item_path = file.path().to_string_lossy().to_string();

    let output = run(&args_for(&server, &["analyze", item_path.as_str()]))
        .await
        .unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["basic"]["name"], "Jade Rabbit");
    assert_eq!(value["basic"]["itemType"], "Weapon");
    assert_eq!(value["basic"]["tier"], "Exotic");
    assert_eq!(value["basic"]["isEquipped"], true);
    assert_eq!(value["basic"]["masterworkLevel"], 7);
    assert_eq!(value["quality"]["masterworked"], true);
    assert_eq!(value["stats"][0]["name"], "Attack");
    assert_eq!(value["metadata"]["manifestVersion"], "240601.2");
}

#[tokio::test]
async fn unknown_language_fails_to_load() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let mut args = args_for(&server, &["lookup", "stat", "1480404414"]);
    args.language = "xx".to_string();

    let err = run(&args).await.unwrap_err();
    assert!(format!("{err:#}").contains("xx"));
}

#[tokio::test]
async fn missing_item_file_is_an_error() {
    let server = MockServer::start().await;
    mock_manifest(&server).await;

    let err = run(&args_for(&server, &["analyze", "/nonexistent/item.json"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
