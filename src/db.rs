use std::time::Duration;

use anyhow::Context;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tracing::info;

use crate::config::MongoConfig;

/// Opens the client and pings the target database before handing it out.
pub async fn connect(config: &MongoConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&config.uri)
        .await
        .context("parse MONGO_URI")?;
    options.app_name = Some("accounts-api".into());
    options.connect_timeout = Some(Duration::from_secs(10));
    options.server_selection_timeout = Some(Duration::from_secs(30));

    let client = Client::with_options(options).context("build mongodb client")?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 })
        .await
        .context("connect to database")?;

    info!(database = %config.database, "mongodb connected");
    Ok(db)
}
