use std::path::Path;

use photosort::compare::{Comparer, ComparerRegistry};
use photosort::config::Config;

#[test]
fn test_missing_config_file_gives_defaults() {
    figment::Jail::expect_with(|_jail| {
        let config: Config = Config::figment(Some(Path::new("absent.toml"))).extract()?;
        assert_eq!(config, Config::default());
        Ok(())
    });
}

#[test]
fn test_malformed_value_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "by_month = \"sometimes\"")?;
        assert!(Config::figment(Some(Path::new("config.toml")))
            .extract::<Config>()
            .is_err());
        Ok(())
    });
}

#[test]
fn test_unknown_keys_are_ignored() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "theme = \"dark\"\nreport_name = \"dupes.html\"")?;
        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;
        assert_eq!(config.report_name, "dupes.html");
        Ok(())
    });
}

#[test]
fn test_configured_strategies_resolve() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "compare = [\"name\"]")?;
        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;

        let comparer = ComparerRegistry::builtin().resolve(&config.compare).unwrap();
        assert_eq!(comparer, Comparer::Name);
        Ok(())
    });
}
