use serde::Deserialize;

/// `POST /scheduler/select` body (§6). Shared verbatim by `/simulate` and
/// `/analyze`, which take the same candidate set but run it through the
/// simulation loop instead of a single draw.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub pool_name: String,
    pub partition: String,
    pub members: Vec<String>,
}
