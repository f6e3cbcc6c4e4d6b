use url::Url;

use super::ServerConfig;

/// Validate a merged configuration.
pub(super) fn validate(config: &ServerConfig) -> Result<(), String> {
    validate_base_url(&config.openai_base_url)?;
    validate_rate_limit(
        config.rate_limit_requests_per_second,
        config.rate_limit_burst_size,
    )?;
    validate_cors_origins(config)?;
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), String> {
    let url = Url::parse(base_url)
        .map_err(|e| format!("Invalid OpenAI base URL '{base_url}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "Invalid OpenAI base URL '{base_url}': unsupported scheme '{scheme}'"
        )),
    }
}

fn validate_rate_limit(requests_per_second: u32, burst_size: u32) -> Result<(), String> {
    if requests_per_second == 0 {
        return Err("Rate limit requests per second must be greater than zero".to_string());
    }
    if burst_size == 0 {
        return Err("Rate limit burst size must be greater than zero".to_string());
    }
    Ok(())
}

fn validate_cors_origins(config: &ServerConfig) -> Result<(), String> {
    if config.allows_any_origin() {
        return Ok(());
    }
    for origin in config.cors_origins() {
        if origin.parse::<http::HeaderValue>().is_err() {
            return Err(format!("Invalid CORS origin '{origin}'"));
        }
    }
    Ok(())
}
