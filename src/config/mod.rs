pub mod schema;

pub use schema::{
    parse_origins, AgentConfig, Config, GatewayConfig, ProviderConfig, SearchConfig,
    CONFIG_PATH_ENV,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexported_config_default_is_constructible() {
        let config = Config::default();

        assert!(config.config_path.is_none());
        assert!(!config.provider.model.is_empty());
        assert!(config.agent.search_results > 0);
    }

    #[test]
    fn reexported_section_configs_are_constructible() {
        let provider = ProviderConfig {
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        let search = SearchConfig {
            zone: "serp_custom".into(),
            ..SearchConfig::default()
        };
        let gateway = GatewayConfig {
            port: 0,
            ..GatewayConfig::default()
        };

        assert_eq!(provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(search.zone, "serp_custom");
        assert_eq!(gateway.port, 0);
        assert_eq!(AgentConfig::default().search_results, 5);
    }
}
