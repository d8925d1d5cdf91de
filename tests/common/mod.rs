//! Shared helpers for integration tests

#![allow(dead_code)]

use gonka_auth::discovery::{JsonFetcher, ParticipantsWithProof};
use gonka_auth::{GonkaError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

pub const SOURCE_URL: &str = "http://source.gonka.example:9000";

pub const NODE1: &str = "gonka1g6dgmylnelj3s0v2fn9cv2qfz3hqf55p3gc9nr";
pub const NODE2_EXCLUDED: &str = "gonka1vyrnu29mjsxvns7nkatrjaq5ct5z3p8why6a0k";
pub const NODE3: &str = "gonka1re9ywu9p9ak99565ml7em69xrdrvqtna2d38ff";

pub const FIXTURE_APP_HASH: &str =
    "930abaefe293ea620e1db9ee252a384f2bc38aaea4cb731afc966c2e4ba37bc9";

pub const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
pub const KEY_ONE_ADDRESS: &str = "gonka1w508d6qejxtdg4y5r3zarvary0c5xw7k2gsyg6";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_json() -> Value {
    let content = std::fs::read_to_string(fixture_path("participants_with_proof.json"))
        .expect("fixture should be readable");
    serde_json::from_str(&content).expect("fixture should be valid JSON")
}

pub fn fixture_payload() -> ParticipantsWithProof {
    serde_json::from_value(fixture_json()).expect("fixture should match the payload shape")
}

pub fn allow_list(addresses: &[&str]) -> Value {
    serde_json::json!({
        "params": { "transfer_agent_access_params": {
            "allowed_transfer_addresses": addresses
        }}
    })
}

/// Serves canned JSON per URL and records every request
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Value>,
    pub requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: Value) -> Self {
        self.responses.insert(url.into(), body);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("lock").clone()
    }
}

impl JsonFetcher for StaticFetcher {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.requested.lock().expect("lock").push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| GonkaError::network(format!("connection refused: {}", url)))
    }
}

pub fn participants_url() -> String {
    format!("{}/v1/epochs/current/participants", SOURCE_URL)
}

pub fn allow_list_url() -> String {
    format!("{}/chain-api/productscience/inference/inference/params", SOURCE_URL)
}
