/// Builds the agent-facing URL for a ticket.
#[derive(Debug, Clone)]
pub struct LinkTemplate {
    base_url: String,
}

impl LinkTemplate {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, ticket_id: &str) -> String {
        format!("{}/agent/tickets/{}", self.base_url, ticket_id)
    }
}
