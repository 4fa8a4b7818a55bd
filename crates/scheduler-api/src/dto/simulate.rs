use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct IterationsQuery {
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

pub fn default_iterations() -> u64 {
    10_000
}

/// `POST /pools/{name}/{partition}/simulate?iterations=N` response (§6).
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub results: HashMap<String, u64>,
    pub iterations: u64,
}
