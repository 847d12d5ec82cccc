// Import necessary libraries and modules for API interaction, file I/O, and serialization.
use async_openai::{Client, config::OpenAIConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Serialize, Deserialize, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Optional API key for OpenAI services.
    pub model: String,
    pub save_store_url: Option<String>, // Base URL of the document store, if configured.
    pub save_store_key: Option<String>, // API key for the document store.
    pub theme: String,                  // Render-layer theme name.
}

// Implement the Default trait for Settings to provide a method to create default settings.
impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None, // No API key by default.
            model: "gpt-4o".to_string(),
            save_store_url: None, // Autosave disabled until a store is configured.
            save_store_key: None,
            theme: "neon".to_string(),
        }
    }
}

// Additional implementation block for Settings.
impl Settings {
    // Constructor function to create new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    // Default on-disk location of the settings file.
    pub fn default_path() -> PathBuf {
        dir::home_dir()
            .unwrap_or_default()
            .join("infinite_adventure")
            .join("data")
            .join("settings.json")
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?; // Serialize settings into pretty JSON format.
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?; // Write the serialized data to the file.
        Ok(())
    }

    // Asynchronously validate an API key with OpenAI's services.
    pub async fn validate_api_key(api_key: &str) -> bool {
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        match client.models().list().await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("API key validation failed: {e:#}");
                false
            }
        }
    }
}
