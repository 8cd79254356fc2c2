//! Merges a JSON payload into the configured Writer template and sends it out for signatures.
//!
//! Settings come from `Z_`-prefixed environment variables (a `.env` file is honored):
//! `Z_TLD`, `Z_CLIENT_ID`, `Z_CLIENT_SECRET`, `Z_CLIENT_REDIRECT`, `Z_AUTH_SCOPE`,
//! `Z_REFRESH_TOKEN` and `Z_TEMPLATE_ID`. The merge payload is read from the first
//! argument, defaulting to `demos/merge.json`. The template's fields are written to
//! `fields.json` and the merge result to `result.json`.

// std
use std::{env, fs};
// crates.io
use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use zoho_writer_broker::{api::MergeSignRequest, config::BrokerConfig, flows::Broker};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = BrokerConfig::from_env()?;
	let refresh_token =
		config.refresh_token.clone().ok_or_else(|| eyre!("Z_REFRESH_TOKEN is not set."))?;
	let template_id =
		config.template_id.clone().ok_or_else(|| eyre!("Z_TEMPLATE_ID is not set."))?;
	let broker = Broker::from_config(&config)?;
	let access_token = broker
		.service_token(&refresh_token)
		.await?
		.ok_or_else(|| eyre!("Zoho did not return an access token."))?;
	let fields = broker.document_fields(&access_token, &template_id).await?;

	fs::write("fields.json", serde_json::to_vec_pretty(&fields)?)?;
	println!("Template fields written to fields.json.");

	let payload_path = env::args().nth(1).unwrap_or_else(|| "demos/merge.json".into());
	let payload = serde_json::from_slice::<MergeSignRequest>(&fs::read(&payload_path)?)?;
	let result = broker.merge_and_sign(&access_token, &template_id, &payload).await?;

	fs::write("result.json", serde_json::to_vec_pretty(&result)?)?;
	println!("Merge-and-sign result written to result.json.");

	Ok(())
}
