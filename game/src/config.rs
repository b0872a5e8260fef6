use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use vowel_race::{Alphabet, RoundConfig, WorkerOptions};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub alphabet: String,
    pub guess_timeout_secs: u64,
    pub max_delay_ms: u64,
    pub render_interval_ms: u64,
    pub clear_screen: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            alphabet: "aeiou".to_string(),
            guess_timeout_secs: 10,
            max_delay_ms: 50,
            render_interval_ms: 100,
            clear_screen: true,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<GameConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let config = serde_json::from_str::<GameConfig>(&json)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn alphabet(&self) -> anyhow::Result<Alphabet> {
        Alphabet::new(self.alphabet.chars())
            .with_context(|| format!("invalid alphabet {:?}", self.alphabet))
    }

    pub fn round_config(&self, sentence: String, random_delay: bool, yield_now: bool) -> RoundConfig {
        RoundConfig {
            sentence,
            options: WorkerOptions {
                random_delay,
                yield_now,
                max_delay: Duration::from_millis(self.max_delay_ms),
            },
            guess_timeout: Duration::from_secs(self.guess_timeout_secs),
            render_interval: Duration::from_millis(self.render_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{ "guess_timeout_secs": 5 }"#).unwrap();
        assert_eq!(config.guess_timeout_secs, 5);
        assert_eq!(config.alphabet, "aeiou");
        assert!(config.clear_screen);
    }

    #[test]
    fn round_config_carries_flags_and_durations() {
        let config = GameConfig { max_delay_ms: 20, ..GameConfig::default() };
        let round = config.round_config("ciao".to_string(), true, false);
        assert_eq!(round.sentence, "ciao");
        assert!(round.options.random_delay);
        assert!(!round.options.yield_now);
        assert_eq!(round.options.max_delay, Duration::from_millis(20));
        assert_eq!(round.guess_timeout, Duration::from_secs(10));
    }

    #[test]
    fn bad_alphabet_is_an_error() {
        let config = GameConfig { alphabet: "aa".to_string(), ..GameConfig::default() };
        assert!(config.alphabet().is_err());
        assert_eq!(GameConfig::default().alphabet().unwrap(), Alphabet::vowels());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(GameConfig::load("definitely/not/here.json").is_err());
    }
}
