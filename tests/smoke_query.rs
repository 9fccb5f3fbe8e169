use puppetdb::{Client, ClientConfig};

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn smoke_query_nodes() {
    let server = match std::env::var("PUPPETDB_URL") {
        Ok(server) => server,
        Err(_) => return,
    };

    let mut config = ClientConfig::new(server);
    if let Ok(token) = std::env::var("PUPPETDB_TOKEN") {
        config = config.with_token(token);
    }

    let client = Client::new(config).expect("client");
    let response = client
        .query("nodes", serde_json::json!(["~", "certname", ".*"]), None)
        .await
        .expect("nodes query");

    assert!(response.total.is_some());
    assert!(response.body.is_array());
}
