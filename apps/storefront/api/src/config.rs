use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use query_filter::TranslatorConfig;

pub use core_config::Environment;

/// Environment variable prefix for listing overrides
/// (`PRODUCTS_PAGE_SIZE`, `PRODUCTS_SEARCH_FIELD`).
const PRODUCTS_PREFIX: &str = "PRODUCTS";

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Search, filter and paging settings for the product listing
    pub products: TranslatorConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let products = domain_products::product_query_config().with_env_overrides(PRODUCTS_PREFIX)?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("PRODUCTS_PAGE_SIZE", Some("12")),
                ("PRODUCTS_SEARCH_FIELD", None),
                ("PORT", Some("4000")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "storefront_api");
                assert_eq!(config.server.port, 4000);
                assert_eq!(config.products.page_size.get(), 12);
                assert_eq!(config.products.search_field, "name");
                assert_eq!(
                    config.products.field_kind("price"),
                    query_filter::FieldKind::Integer
                );
            },
        );
    }

    #[test]
    fn test_invalid_page_size() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("PRODUCTS_PAGE_SIZE", Some("0")),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("PRODUCTS_PAGE_SIZE"));
            },
        );
    }
}
