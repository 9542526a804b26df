//! HTTP client for end-to-end tests
//!
//! A thin wrapper over reqwest with helpers for every server endpoint.
//! When API routes change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get_product(&self, sku: &str) -> Response {
        self.client
            .get(format!("{}/product/{}", self.base_url, sku))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get_compatible(&self, sku: &str, query: &str) -> Response {
        self.client
            .get(format!(
                "{}/product/{}/compatible{}",
                self.base_url, sku, query
            ))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn generate_looks(&self, sku: &str, num_looks: usize) -> Response {
        self.client
            .get(format!(
                "{}/outfits/{}/looks?num_looks={}",
                self.base_url, sku, num_looks
            ))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn generate_looks_default(&self, sku: &str) -> Response {
        self.client
            .get(format!("{}/outfits/{}/looks", self.base_url, sku))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn score_outfit(&self, sku_ids: &[&str]) -> Response {
        self.client
            .post(format!("{}/outfits/score", self.base_url))
            .json(&json!({ "sku_ids": sku_ids }))
            .send()
            .await
            .expect("Request failed")
    }
}
