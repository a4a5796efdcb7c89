use log::{error, info};
use serde_json::Value;
use spicebox::{api, AppConfig, Spicebox};
use std::env;
use tokio::net::TcpListener;

const USAGE: &str = "Usage: spicebox [serve | import-recipes <file> | import-spices <file>]";

async fn read_json(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("serve");

    let config = AppConfig::load()?;
    let app = Spicebox::open(&config.storage)?;

    match command {
        "serve" => {
            let addr = config.server.bind_addr()?;
            let listener = TcpListener::bind(addr).await?;
            api::serve(listener, app).await?;
        }
        "import-recipes" => {
            let path = args.get(2).ok_or(USAGE)?;
            let outcomes = app.importer.import_recipes(&read_json(path).await?)?;
            let imported = outcomes.iter().filter(|o| o.is_success()).count();
            info!("Imported {} of {} recipes from {}", imported, outcomes.len(), path);
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        "import-spices" => {
            let path = args.get(2).ok_or(USAGE)?;
            let report = app.importer.import_spices(&read_json(path).await?)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => {
            error!("Unknown command '{}'", other);
            return Err(USAGE.into());
        }
    }

    Ok(())
}
