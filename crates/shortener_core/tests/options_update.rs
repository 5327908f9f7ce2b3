mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use shortener_core::{
    FieldError, FieldOptions, FieldRegistry, FieldState, OptionName, OptionValue, Pattern,
    ValidatorFn,
};
use support::init_logging;

const FIELD: u64 = 5;

fn registry() -> FieldRegistry {
    let mut registry = FieldRegistry::new();
    registry
        .attach(FIELD, [OptionValue::endpoint("/bitly/endpoint/")])
        .unwrap();
    registry
}

#[test]
fn endpoint_option_can_be_read_and_updated() {
    init_logging();
    let mut registry = registry();

    registry
        .set_option(FIELD, OptionValue::endpoint("/googly/endpoint/"))
        .unwrap();

    let value = registry.option(FIELD, OptionName::Endpoint).unwrap();
    assert_eq!(value.to_string(), "/googly/endpoint/");
    let options = registry.options(FIELD).unwrap();
    assert_eq!(options.url_pattern, FieldOptions::default().url_pattern);
}

#[test]
fn removing_endpoint_fails_and_detaches() {
    init_logging();
    let mut registry = registry();

    let err = registry
        .set_option(FIELD, OptionValue::Endpoint(None))
        .unwrap_err();

    assert!(matches!(err, FieldError::Configuration(_)));
    assert_eq!(registry.state(FIELD), FieldState::Detached);
    assert!(registry.options(FIELD).is_err());
}

#[test]
fn failed_bulk_update_applies_nothing_before_detaching() {
    init_logging();
    let mut registry = registry();

    let result = registry.set_options(
        FIELD,
        [
            OptionValue::UrlPattern(Pattern::new("^never$").unwrap()),
            OptionValue::Endpoint(Some("  ".to_string())),
        ],
    );

    assert!(result.is_err());
    assert!(!registry.is_attached(FIELD));
}

#[test]
fn custom_validator_can_be_installed_later() {
    init_logging();
    let mut registry = registry();

    let validator: ValidatorFn = Arc::new(|value: &str| value == "custom url validator is go!");
    registry
        .set_option(FIELD, OptionValue::Validator(Some(validator)))
        .unwrap();

    assert!(registry
        .value_changed(FIELD, "custom url validator is go!")
        .unwrap()
        .is_some());
}

#[test]
fn shortened_patterns_can_be_replaced_from_text() {
    init_logging();
    let mut registry = registry();

    let value = OptionValue::parse(OptionName::ShortenedPatterns, r"sho\.rt").unwrap();
    registry.set_option(FIELD, value).unwrap();

    assert!(registry
        .value_changed(FIELD, "http://sho.rt/abc")
        .unwrap()
        .is_none());
    assert!(registry
        .value_changed(FIELD, "http://bit.ly/abc")
        .unwrap()
        .is_some());
}

#[test]
fn options_deserialize_with_defaults_for_missing_fields() {
    let options: FieldOptions =
        serde_json::from_str(r#"{"endpoint": "/api/shorten"}"#).unwrap();

    assert_eq!(options.endpoint.as_deref(), Some("/api/shorten"));
    assert_eq!(
        options.shortened_patterns,
        FieldOptions::default().shortened_patterns
    );
    assert!(options.validator.is_none());
}

#[test]
fn invalid_pattern_in_configuration_is_rejected() {
    let result: Result<FieldOptions, _> =
        serde_json::from_str(r#"{"endpoint": "/x", "url_pattern": "(unclosed"}"#);
    assert!(result.is_err());
}
