use std::collections::HashMap;
use std::fs;

#[derive(Debug, Clone)]
pub struct Settings {
    pub store_url: String,
    pub store_api_key: String,
    pub store_service_token: Option<String>,
    pub images_bucket: String,
    pub snapshot_path: String,
    pub deploy_hook_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: "http://127.0.0.1:54321".into(),
            store_api_key: "dev-anon-key".into(),
            store_service_token: None,
            images_bucket: "images".into(),
            snapshot_path: "data/portfolio-cache.json".into(),
            deploy_hook_url: None,
        }
    }
}

/// Defaults, overlaid by `landing.toml` when present, overlaid by
/// environment variables. Missing or malformed layers are skipped silently;
/// a wrong store URL surfaces as a fetch error at first use.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("landing.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_layer(&mut settings, |key| file_cfg.get(key).cloned());
        }
    }

    apply_layer(&mut settings, |key| {
        std::env::var(format!("LANDING__{}", key.to_ascii_uppercase())).ok()
    });

    settings
}

fn apply_layer(settings: &mut Settings, get: impl Fn(&str) -> Option<String>) {
    if let Some(v) = get("store_url") {
        settings.store_url = v;
    }
    if let Some(v) = get("store_api_key") {
        settings.store_api_key = v;
    }
    if let Some(v) = get("store_service_token") {
        settings.store_service_token = Some(v);
    }
    if let Some(v) = get("images_bucket") {
        settings.images_bucket = v;
    }
    if let Some(v) = get("snapshot_path") {
        settings.snapshot_path = v;
    }
    if let Some(v) = get("deploy_hook_url") {
        settings.deploy_hook_url = Some(v);
    }
}
