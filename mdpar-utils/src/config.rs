use std::path::Path;

use Result;

/// A training and parsing configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub parser: Parser,
    pub model: Model,
    pub features: Features,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Parser {
    /// The transition system to use.
    pub system: String,

    /// The number of perceptron iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Reserved for beam decoding; the greedy decoder uses 1.
    #[serde(default = "default_beam_size")]
    pub beam_size: usize,

    /// Fan model updates out over the feature templates.
    #[serde(default)]
    pub concurrent_updates: bool,

    /// Retain the feature history on parse outcomes.
    #[serde(default)]
    pub return_model_value: bool,

    /// Retain the transition sequence on parse outcomes.
    #[serde(default)]
    pub return_sequence: bool,

    /// Abort on oracle failures instead of skipping the instance.
    #[serde(default)]
    pub no_recover: bool,

    /// Log every candidate-scoring event.
    #[serde(default)]
    pub show_considerations: bool,

    /// Projectivize training data before deriving oracle sequences.
    #[serde(default)]
    pub pproj: bool,
}

fn default_iterations() -> usize {
    1
}

fn default_beam_size() -> usize {
    1
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Model {
    /// The model parameters file.
    pub parameters: String,

    /// The transition table and enumeration file.
    pub transitions: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Features {
    /// Feature templates, e.g. `["S0w", "N0w", "S0p+N0p"]`.
    pub templates: Vec<String>,
}

impl Config {
    /// Reinterpret relative paths in the configuration as relative to
    /// the directory of the configuration file.
    pub fn relativize_paths<P>(&mut self, config_path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let parent = config_path.as_ref().parent().ok_or_else(|| {
            format_err!(
                "cannot get the parent directory of: {:?}",
                config_path.as_ref()
            )
        })?;

        self.model.parameters = relativize(parent, &self.model.parameters);
        self.model.transitions = relativize(parent, &self.model.transitions);

        Ok(())
    }
}

fn relativize(parent: &Path, path: &str) -> String {
    if Path::new(path).is_absolute() {
        path.to_owned()
    } else {
        parent.join(path).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use ser::TomlRead;

    use super::Config;

    static CONFIG: &str = r#"
[parser]
system = "arceagermorph"
iterations = 3
concurrent_updates = true

[model]
parameters = "model.params"
transitions = "model.transitions"

[features]
templates = ["S0w", "N0w", "S0p+N0p"]
"#;

    #[test]
    fn configurations_parse_with_defaults() {
        let config = Config::from_toml_read(CONFIG.as_bytes()).unwrap();
        assert_eq!(config.parser.system, "arceagermorph");
        assert_eq!(config.parser.iterations, 3);
        assert_eq!(config.parser.beam_size, 1);
        assert!(config.parser.concurrent_updates);
        assert!(!config.parser.no_recover);
        assert!(!config.parser.pproj);
        assert_eq!(config.features.templates.len(), 3);
    }

    #[test]
    fn relative_paths_follow_the_configuration_file() {
        let mut config = Config::from_toml_read(CONFIG.as_bytes()).unwrap();
        config.relativize_paths("/etc/mdpar/train.toml").unwrap();
        assert_eq!(config.model.parameters, "/etc/mdpar/model.params");
        assert_eq!(config.model.transitions, "/etc/mdpar/model.transitions");
    }
}
