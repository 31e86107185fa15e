//! Routing decisions.
//!
//! The Supervisor's output is parsed into a [`Route`] exactly once. Anything
//! outside the closed set is rejected here, at the boundary; the graph only
//! ever matches on the enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A domain specialist responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialist {
    Research,
    Finance,
    Travel,
    KnowledgeBase,
    Shopping,
    Jobs,
    Memory,
    Recipes,
}

impl Specialist {
    pub const ALL: [Specialist; 8] = [
        Specialist::Research,
        Specialist::Finance,
        Specialist::Travel,
        Specialist::KnowledgeBase,
        Specialist::Shopping,
        Specialist::Jobs,
        Specialist::Memory,
        Specialist::Recipes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialist::Research => "research",
            Specialist::Finance => "finance",
            Specialist::Travel => "travel",
            Specialist::KnowledgeBase => "knowledge_base",
            Specialist::Shopping => "shopping",
            Specialist::Jobs => "jobs",
            Specialist::Memory => "memory",
            Specialist::Recipes => "recipes",
        }
    }

    /// What this specialist handles, as told to the Supervisor.
    pub fn responsibility(&self) -> &'static str {
        match self {
            Specialist::Research => "web searches, current events, general information, and news",
            Specialist::Finance => "stock prices, company financials, market data",
            Specialist::Travel => "weather queries, flight searches, hotel bookings",
            Specialist::KnowledgeBase => "internal documents, manuals, company knowledge base",
            Specialist::Shopping => "product searches, price comparisons, shopping queries",
            Specialist::Jobs => "job searches, career opportunities, employment postings",
            Specialist::Memory => {
                "queries about past conversations, what you remember, user preferences"
            }
            Specialist::Recipes => {
                "recipe searches, cooking instructions, ingredients, and culinary queries"
            }
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routing decision: one specialist, the direct responder, or termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Route {
    Specialist(Specialist),
    Respond,
    Finish,
}

impl Route {
    /// Every member of the closed decision set.
    pub fn all() -> Vec<Route> {
        Specialist::ALL
            .iter()
            .copied()
            .map(Route::Specialist)
            .chain([Route::Respond, Route::Finish])
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Specialist(s) => s.as_str(),
            Route::Respond => "respond",
            Route::Finish => "FINISH",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized routing decision: {0:?}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Parse a decision. Surrounding whitespace, quotes, backticks and a
    /// trailing period are ignored, case is ignored, and the legacy
    /// `<name>_agent` identifiers are accepted.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
            .trim_end_matches('.')
            .trim()
            .to_ascii_lowercase();

        let route = match token.as_str() {
            "research" | "research_agent" => Route::Specialist(Specialist::Research),
            "finance" | "finance_agent" => Route::Specialist(Specialist::Finance),
            "travel" | "travel_agent" => Route::Specialist(Specialist::Travel),
            "knowledge_base" | "database_agent" => Route::Specialist(Specialist::KnowledgeBase),
            "shopping" | "shopping_agent" => Route::Specialist(Specialist::Shopping),
            "jobs" | "job_agent" => Route::Specialist(Specialist::Jobs),
            "memory" | "memory_agent" => Route::Specialist(Specialist::Memory),
            "recipes" | "recipe_agent" => Route::Specialist(Specialist::Recipes),
            "respond" => Route::Respond,
            "finish" => Route::Finish,
            _ => return Err(UnknownRoute(raw.to_string())),
        };
        Ok(route)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.as_str().to_string()
    }
}

impl TryFrom<String> for Route {
    type Error = UnknownRoute;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_set_has_ten_members() {
        let all = Route::all();
        assert_eq!(all.len(), 10);
        assert!(all.contains(&Route::Respond));
        assert!(all.contains(&Route::Finish));
    }

    #[test]
    fn every_identifier_parses_to_itself() {
        for route in Route::all() {
            assert_eq!(route.as_str().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn tolerates_formatting_noise() {
        assert_eq!(" travel\n".parse::<Route>().unwrap(), Route::Specialist(Specialist::Travel));
        assert_eq!("`memory`".parse::<Route>().unwrap(), Route::Specialist(Specialist::Memory));
        assert_eq!("\"Respond\".".parse::<Route>().unwrap(), Route::Respond);
        assert_eq!("finish".parse::<Route>().unwrap(), Route::Finish);
    }

    #[test]
    fn legacy_agent_names() {
        assert_eq!(
            "database_agent".parse::<Route>().unwrap(),
            Route::Specialist(Specialist::KnowledgeBase)
        );
        assert_eq!("job_agent".parse::<Route>().unwrap(), Route::Specialist(Specialist::Jobs));
        assert_eq!(
            "recipe_agent".parse::<Route>().unwrap(),
            Route::Specialist(Specialist::Recipes)
        );
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert!("".parse::<Route>().is_err());
        assert!("weather_agent".parse::<Route>().is_err());
        assert!("I think travel is best".parse::<Route>().is_err());
    }

    #[test]
    fn serde_uses_identifiers() {
        let json = serde_json::to_string(&Route::Specialist(Specialist::KnowledgeBase)).unwrap();
        assert_eq!(json, r#""knowledge_base""#);
        let back: Route = serde_json::from_str(r#""FINISH""#).unwrap();
        assert_eq!(back, Route::Finish);
    }
}
