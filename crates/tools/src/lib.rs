//! Capability adapters for Concierge.
//!
//! Each adapter wraps one external capability behind the `Tool` trait:
//! web search, market data, weather, flights, hotels, shopping, jobs,
//! recipes, the internal knowledge base, and the user's long-term memory.
//! [`ToolKit::roster`] hands each specialist its fixed set.

pub mod flights;
pub mod hotels;
pub mod http;
pub mod jobs;
pub mod knowledge_base;
pub mod memory_tools;
pub mod recipes;
pub mod serpapi;
pub mod shopping;
pub mod stock;
pub mod weather;
pub mod web_search;

use concierge_config::ToolsConfig;
use concierge_core::memory::MemoryService;
use concierge_core::route::Specialist;
use concierge_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::warn;

pub use http::ApiClient;
pub use knowledge_base::KnowledgeBase;
pub use serpapi::SerpApi;

/// Everything the adapters need, built once and shared by all rosters.
#[derive(Clone)]
pub struct ToolKit {
    http: ApiClient,
    serp: SerpApi,
    tavily_api_key: Option<String>,
    openweather_api_key: Option<String>,
    alphavantage_api_key: Option<String>,
    currency: String,
    knowledge: Option<Arc<KnowledgeBase>>,
    memory: Arc<dyn MemoryService>,
    memory_list_limit: usize,
}

impl ToolKit {
    pub fn from_config(
        config: &ToolsConfig,
        memory: Arc<dyn MemoryService>,
        memory_list_limit: usize,
    ) -> Self {
        let http = ApiClient::new(config.http_timeout_secs);
        let knowledge = config.knowledge_dir.as_deref().and_then(|dir| {
            KnowledgeBase::load(dir)
                .map(Arc::new)
                .map_err(|e| warn!(dir = %dir.display(), error = %e, "Knowledge base unavailable"))
                .ok()
        });

        Self {
            serp: SerpApi::new(http.clone(), config.serpapi_api_key.clone()),
            http,
            tavily_api_key: config.tavily_api_key.clone(),
            openweather_api_key: config.openweather_api_key.clone(),
            alphavantage_api_key: config.alphavantage_api_key.clone(),
            currency: config.currency.clone(),
            knowledge,
            memory,
            memory_list_limit,
        }
    }

    /// The fixed tool set for one specialist.
    pub fn roster(&self, specialist: Specialist) -> ToolRegistry {
        let registry = ToolRegistry::new();
        match specialist {
            Specialist::Research => registry.with(Box::new(web_search::WebSearchTool::new(
                self.http.clone(),
                self.tavily_api_key.clone(),
            ))),
            Specialist::Finance => registry
                .with(Box::new(stock::StockPriceTool::new(
                    self.http.clone(),
                    self.alphavantage_api_key.clone(),
                )))
                .with(Box::new(stock::CompanyInfoTool::new(
                    self.http.clone(),
                    self.alphavantage_api_key.clone(),
                ))),
            Specialist::Travel => registry
                .with(Box::new(weather::WeatherTool::new(
                    self.http.clone(),
                    self.openweather_api_key.clone(),
                )))
                .with(Box::new(flights::SearchFlightsTool::new(
                    self.serp.clone(),
                    &self.currency,
                )))
                .with(Box::new(hotels::SearchHotelsTool::new(
                    self.serp.clone(),
                    &self.currency,
                ))),
            Specialist::KnowledgeBase => registry.with(Box::new(
                knowledge_base::DatabaseSearchTool::new(self.knowledge.clone()),
            )),
            Specialist::Shopping => {
                registry.with(Box::new(shopping::ShoppingSearchTool::new(self.serp.clone())))
            }
            Specialist::Jobs => registry.with(Box::new(jobs::JobSearchTool::new(self.serp.clone()))),
            Specialist::Memory => registry
                .with(Box::new(memory_tools::SearchMemoriesTool::new(Arc::clone(
                    &self.memory,
                ))))
                .with(Box::new(memory_tools::GetAllMemoriesTool::new(
                    Arc::clone(&self.memory),
                    self.memory_list_limit,
                ))),
            Specialist::Recipes => {
                registry.with(Box::new(recipes::SearchRecipesTool::new(self.serp.clone())))
            }
        }
    }
}
