use crate::config::{Config, SCHEMA_VERSION};
use crate::error::{Error, Result, ValidationError};
use crate::search::{ScoringWeights, WeightsError, MAX_PAGE_SIZE};
use crate::timeline::{GroupType, MAX_RELATED_LIMIT, MIN_RELATED_LIMIT};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every problem at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate storage settings
        Self::validate_storage(config, &mut errors);

        // Validate search settings
        Self::validate_weights(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_recency(config, &mut errors);

        // Validate timeline settings
        Self::validate_timeline(config, &mut errors);

        // Validate logging settings
        Self::validate_logging(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.thoughts_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.thoughts_file",
                "Thoughts file path cannot be empty",
            ));
        }
    }

    fn validate_weights(config: &Config, errors: &mut Vec<ValidationError>) {
        let w = config.search.weights;
        match ScoringWeights::new(w.semantic, w.keyword, w.recency, w.confidence) {
            Ok(_) => {}
            Err(WeightsError::OutOfRange { name, value }) => {
                errors.push(ValidationError::new(
                    format!("search.weights.{}", name),
                    format!("Weight must be between 0.0 and 1.0, got {}", value),
                ));
            }
            Err(e @ WeightsError::InvalidSum(_)) => {
                errors.push(ValidationError::new("search.weights", e.to_string()));
            }
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        let page_size = config.search.default_page_size;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.push(ValidationError::new(
                "search.default_page_size",
                format!(
                    "Page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, page_size
                ),
            ));
        }

        let confidence = config.search.default_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            errors.push(ValidationError::new(
                "search.default_confidence",
                format!("Confidence must be between 0.0 and 1.0, got {}", confidence),
            ));
        }

        if config.search.max_suggestions == 0 {
            errors.push(ValidationError::new(
                "search.max_suggestions",
                "Suggestion limit must be greater than 0",
            ));
        }
    }

    fn validate_recency(config: &Config, errors: &mut Vec<ValidationError>) {
        let recency = &config.search.recency;

        if !(0.0..=1.0).contains(&recency.floor) {
            errors.push(ValidationError::new(
                "search.recency.floor",
                format!("Score must be between 0.0 and 1.0, got {}", recency.floor),
            ));
        }

        let mut previous_age: Option<i64> = None;
        for (i, tier) in recency.tiers.iter().enumerate() {
            if !(0.0..=1.0).contains(&tier.score) {
                errors.push(ValidationError::new(
                    format!("search.recency.tiers[{}].score", i),
                    format!("Score must be between 0.0 and 1.0, got {}", tier.score),
                ));
            }

            if tier.max_age_days < 0 {
                errors.push(ValidationError::new(
                    format!("search.recency.tiers[{}].max_age_days", i),
                    format!("Age must not be negative, got {}", tier.max_age_days),
                ));
            }

            if let Some(previous) = previous_age {
                if tier.max_age_days <= previous {
                    errors.push(ValidationError::new(
                        format!("search.recency.tiers[{}].max_age_days", i),
                        format!(
                            "Tiers must be in ascending age order, {} follows {}",
                            tier.max_age_days, previous
                        ),
                    ));
                }
            }
            previous_age = Some(tier.max_age_days);
        }
    }

    fn validate_timeline(config: &Config, errors: &mut Vec<ValidationError>) {
        if let Err(e) = config.timeline.default_group_type.parse::<GroupType>() {
            errors.push(ValidationError::new(
                "timeline.default_group_type",
                e.to_string(),
            ));
        }

        let limit = config.timeline.default_related_limit;
        if !(MIN_RELATED_LIMIT..=MAX_RELATED_LIMIT).contains(&limit) {
            errors.push(ValidationError::new(
                "timeline.default_related_limit",
                format!(
                    "Related limit must be between {} and {}, got {}",
                    MIN_RELATED_LIMIT, MAX_RELATED_LIMIT, limit
                ),
            ));
        }
    }

    fn validate_logging(config: &Config, errors: &mut Vec<ValidationError>) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ValidationError::new(
                "logging.level",
                format!(
                    "Level must be one of {:?}, got '{}'",
                    LOG_LEVELS, config.logging.level
                ),
            ));
        }
    }
}
