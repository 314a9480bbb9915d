use coastle_engine::models::Location;

use crate::catalog::parse_locations;

pub fn daily_url(api_url: &str) -> String {
    format!("{}/data/daily", api_url.trim_end_matches('/'))
}

pub fn infinite_url(api_url: &str) -> String {
    format!("{}/data/infinite", api_url.trim_end_matches('/'))
}

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;
    resp.text().await.map_err(|e| e.to_string())
}

/// The location of the day.
pub async fn fetch_daily(client: &reqwest::Client, api_url: &str) -> Result<Location, String> {
    let url = daily_url(api_url);
    let body = get_text(client, &url).await?;
    let location = parse_daily(&body)?;
    tracing::info!(id = %location.id, "Fetched daily location");
    Ok(location)
}

/// Every location eligible for infinite mode.
pub async fn fetch_infinite(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<Vec<Location>, String> {
    let url = infinite_url(api_url);
    let body = get_text(client, &url).await?;
    let locations = parse_locations(&body)?;
    tracing::info!(locations = locations.len(), "Fetched infinite locations");
    Ok(locations)
}

pub fn parse_daily(body: &str) -> Result<Location, String> {
    serde_json::from_str(body).map_err(|e| format!("Malformed daily location: {}", e))
}
