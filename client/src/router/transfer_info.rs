/// Where the server asks the avatar to continue its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInfo {
    pub host: String,
    pub port: i64,
    /// Key proving the right to take over `possess_entity_id` on the new host
    pub possess_key: String,
    pub possess_entity_id: String,
}

impl TransferInfo {
    pub fn new(host: &str, port: i64, possess_key: &str, possess_entity_id: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            possess_key: possess_key.to_string(),
            possess_entity_id: possess_entity_id.to_string(),
        }
    }
}
