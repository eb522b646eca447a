//! Configuration loading.

use std::collections::HashMap;
use serde::Deserialize;
use std::fs;
use toml::Value;

pub fn load(path: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();
    if let Ok(text) = fs::read_to_string(path) {
        for line in text.lines() {
            if let Some((key, value)) = line.split_once('=') {
                config.insert(key.trim().to_owned(), value.trim().to_owned());
            }
        }
    }
    config
}
