use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub engine: query::QueryEngine,
    pub http: reqwest::Client,
    pub introspection_url: Url,
}
