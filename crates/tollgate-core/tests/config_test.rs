use tollgate_core::config::*;
use tollgate_core::models::FeatureGrant;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = TollgateConfig::from_toml("").unwrap();

    assert_eq!(config.storage.db_path, "tollgate.db");
    assert_eq!(config.storage.read_pool_size, 4);

    assert_eq!(config.catalog.free_tier_slug, "free");
    assert!(config.catalog.tiers.is_empty());

    assert_eq!(config.metering.near_limit_threshold, 0.8);
    assert_eq!(config.metering.subscription_cache_ttl_secs, 60);
    assert_eq!(config.metering.subscription_cache_capacity, 10_000);
    assert_eq!(config.metering.usage_retention_days, 400);

    assert_eq!(config.observability.log_level, "info");
    assert!(config.observability.json);
    assert!(config.validate().is_ok());
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[storage]
db_path = "/var/lib/tollgate/usage.db"

[metering]
subscription_cache_ttl_secs = 0
"#;
    let config = TollgateConfig::from_toml(toml).unwrap();
    assert_eq!(config.storage.db_path, "/var/lib/tollgate/usage.db");
    assert_eq!(config.metering.subscription_cache_ttl_secs, 0);
    // Non-overridden fields keep defaults
    assert_eq!(config.storage.read_pool_size, 4);
    assert_eq!(config.metering.near_limit_threshold, 0.8);
}

#[test]
fn config_parses_tier_catalog() {
    let toml = r#"
[catalog]
free_tier_slug = "starter"

[[catalog.tiers]]
slug = "starter"
name = "Starter"
display_order = 0

[catalog.tiers.features.deal_finder]
limit = 5

[[catalog.tiers]]
slug = "pro"
name = "Pro"
display_order = 2

[catalog.tiers.features.deal_finder]

[catalog.tiers.features.api_access]
enabled = false
"#;
    let config = TollgateConfig::from_toml(toml).unwrap();
    assert_eq!(config.catalog.free_tier_slug, "starter");
    assert_eq!(config.catalog.tiers.len(), 2);

    let starter = &config.catalog.tiers[0];
    assert_eq!(starter.grant("deal_finder"), Some(&FeatureGrant::limited(5)));

    let pro = &config.catalog.tiers[1];
    assert_eq!(pro.grant("deal_finder"), Some(&FeatureGrant::unlimited()));
    assert_eq!(pro.grant("api_access"), Some(&FeatureGrant::disabled()));
}

#[test]
fn negative_limit_is_rejected_at_parse_time() {
    let toml = r#"
[[catalog.tiers]]
slug = "free"
name = "Free"

[catalog.tiers.features.deal_finder]
limit = -1
"#;
    assert!(TollgateConfig::from_toml(toml).is_err());
}

#[test]
fn validate_rejects_out_of_range_threshold() {
    let mut config = TollgateConfig::default();
    config.metering.near_limit_threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_blank_free_tier_slug() {
    let mut config = TollgateConfig::default();
    config.catalog.free_tier_slug = "  ".into();
    assert!(config.validate().is_err());
}

#[test]
fn config_roundtrips_through_toml() {
    let config = TollgateConfig::default();
    let raw = toml::to_string(&config).unwrap();
    let parsed = TollgateConfig::from_toml(&raw).unwrap();
    assert_eq!(parsed.storage.db_path, config.storage.db_path);
    assert_eq!(parsed.metering.usage_retention_days, 400);
}
