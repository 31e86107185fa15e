//! The Supervisor decides who handles the conversation next.
//!
//! One classification call per decision. The model's literal output is
//! parsed into a [`Route`]; anything outside the closed set becomes
//! [`Route::Respond`] with a warning.

use std::fmt::Write;
use std::sync::Arc;
use chrono::Utc;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, ThreadId};
use concierge_core::provider::{ModelOptions, Provider};
use concierge_core::route::{Route, Specialist};
use concierge_core::state::ConversationState;
use concierge_memory::MemoryClient;
use tracing::{info, warn};

pub struct Supervisor {
    provider: Arc<dyn Provider>,
    options: ModelOptions,
    memory: MemoryClient,
    events: Arc<EventBus>,
    instructions: String,
    retry_invalid: bool,
}

impl Supervisor {
    pub fn new(
        provider: Arc<dyn Provider>,
        options: ModelOptions,
        memory: MemoryClient,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            options,
            memory,
            events,
            instructions: routing_instructions("Samantha"),
            retry_invalid: false,
        }
    }

    pub fn with_persona(mut self, persona: &str) -> Self {
        self.instructions = routing_instructions(persona);
        self
    }

    /// Ask once more when the first answer is not a valid decision.
    pub fn with_retry_invalid(mut self, retry: bool) -> Self {
        self.retry_invalid = retry;
        self
    }

    pub async fn decide(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<Route, concierge_core::Error> {
        let query = state.latest_user_text();
        let memories = self.memory.retrieve(query, &state.user_id).await;

        let mut messages = vec![Message::system(&self.instructions)];
        messages.extend(MemoryClient::context_turn(&memories));
        messages.extend(state.turns.iter().cloned());

        let raw = self.classify(messages.clone()).await?;
        let (route, valid) = match raw.parse::<Route>() {
            Ok(route) => (route, true),
            Err(e) if self.retry_invalid => {
                warn!(thread_id = %thread_id, error = %e, "Invalid routing decision, asking again");
                messages.push(Message::assistant(&raw));
                messages.push(Message::system(reminder()));
                let second = self.classify(messages).await?;
                match second.parse::<Route>() {
                    Ok(route) => (route, true),
                    Err(e) => {
                        warn!(thread_id = %thread_id, error = %e, "Invalid routing decision. Defaulting to respond");
                        (Route::Respond, false)
                    }
                }
            }
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "Invalid routing decision. Defaulting to respond");
                (Route::Respond, false)
            }
        };

        info!(thread_id = %thread_id, route = %route, valid, "Supervisor routing");
        self.events.publish(DomainEvent::RouteDecided {
            thread_id: thread_id.to_string(),
            route,
            valid,
            timestamp: Utc::now(),
        });

        Ok(route)
    }

    async fn classify(&self, messages: Vec<Message>) -> Result<String, concierge_core::Error> {
        let response = self.provider.complete(self.options.request(messages, vec![])).await?;
        Ok(response.message.content.trim().to_string())
    }
}

fn choices() -> String {
    Route::all()
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn reminder() -> String {
    format!(
        "That is not one of the options. Reply with exactly one of: {}.",
        choices()
    )
}

/// The routing prompt: every specialist with its responsibility, plus the
/// rules for `respond` and `FINISH`.
pub fn routing_instructions(persona: &str) -> String {
    let mut prompt = format!(
        "You are {persona}, a helpful AI supervisor managing a team of specialized agents.\n\nYour team consists of:\n"
    );
    for specialist in Specialist::ALL {
        let _ = writeln!(prompt, "- {}: Handles {}", specialist, specialist.responsibility());
    }
    let _ = writeln!(
        prompt,
        "- {}: Use this for greetings, casual conversation, or when you can answer directly without tools",
        Route::Respond
    );
    let _ = writeln!(prompt, "- {}: Select this when the conversation is complete", Route::Finish);
    let _ = write!(
        prompt,
        "\nBased on the user's query, determine which agent should handle it next.\n\
         For greetings like \"hello\", \"hi\", introductions, or simple questions you can answer, use \"{respond}\".\n\
         For queries about past conversations like \"what do you remember?\", \"what do you know about me?\", use \"{memory}\".\n\
         For recipe queries like \"how to make pasta\", \"recipe for cheesecake\", use \"{recipes}\".\n\
         For queries needing specific tools, route to the appropriate specialist agent.\n\
         When unsure, use \"{respond}\".\n\n\
         Respond ONLY with the name of the next agent to use.",
        respond = Route::Respond,
        memory = Specialist::Memory,
        recipes = Specialist::Recipes,
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use concierge_core::message::Role;

    fn supervisor(provider: Arc<ScriptedProvider>, memory: Arc<FakeMemory>) -> Supervisor {
        Supervisor::new(
            provider,
            ModelOptions::new("mock-model", 0.3, Some(512)),
            MemoryClient::new(memory),
            Arc::new(EventBus::default()),
        )
    }

    fn state(text: &str) -> ConversationState {
        let mut state = ConversationState::new("samantha");
        state.append(Message::user(text));
        state
    }

    async fn decide_on(output: &str) -> Route {
        let provider = Arc::new(ScriptedProvider::new(vec![text(output)]));
        supervisor(provider, Arc::new(FakeMemory::default()))
            .decide(&"t".into(), &state("anything"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn every_valid_decision_maps_to_its_route() {
        for route in Route::all() {
            assert_eq!(decide_on(route.as_str()).await, route);
        }
    }

    #[tokio::test]
    async fn invalid_output_becomes_respond() {
        for garbage in ["", "   ", "I think the travel agent", "weather_agent", "🤷"] {
            assert_eq!(decide_on(garbage).await, Route::Respond, "{garbage:?}");
        }
    }

    #[tokio::test]
    async fn legacy_names_and_padding_are_accepted() {
        assert_eq!(decide_on("  travel_agent\n").await, Route::Specialist(Specialist::Travel));
        assert_eq!(decide_on("\"recipe_agent\"").await, Route::Specialist(Specialist::Recipes));
    }

    #[tokio::test]
    async fn prompt_includes_instructions_memory_and_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("memory")]));
        let memory = Arc::new(FakeMemory::with_memories(&["Likes fighter jets."]));
        supervisor(provider.clone(), memory.clone())
            .decide(&"t".into(), &state("What do you remember about me?"))
            .await
            .unwrap();

        let request = &provider.requests()[0];
        assert!(request.tools.is_empty());
        assert_eq!(request.messages.len(), 3);
        assert!(request.messages[0].content.contains("knowledge_base: Handles internal documents"));
        assert_eq!(
            request.messages[1].content,
            "Relevant information from past conversations: Likes fighter jets."
        );
        assert_eq!(request.messages[2].role, Role::User);

        let searches = memory.searches.lock().unwrap();
        assert_eq!(searches[0].query, "What do you remember about me?");
        assert_eq!(searches[0].user_id, "samantha");
    }

    #[tokio::test]
    async fn memory_outage_does_not_block_routing() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("travel")]));
        let route = supervisor(provider.clone(), Arc::new(FakeMemory::down()))
            .decide(&"t".into(), &state("Weather in Hyderabad?"))
            .await
            .unwrap();
        assert_eq!(route, Route::Specialist(Specialist::Travel));
        assert_eq!(provider.requests()[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn empty_history_uses_empty_query() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("respond")]));
        let memory = Arc::new(FakeMemory::default());
        supervisor(provider, memory.clone())
            .decide(&"t".into(), &ConversationState::new("samantha"))
            .await
            .unwrap();
        assert_eq!(memory.searches.lock().unwrap()[0].query, "");
    }

    #[tokio::test]
    async fn retry_is_off_by_default() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("nonsense"), text("travel")]));
        let route = supervisor(provider.clone(), Arc::new(FakeMemory::default()))
            .decide(&"t".into(), &state("hi"))
            .await
            .unwrap();
        assert_eq!(route, Route::Respond);
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn retry_asks_exactly_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("nonsense"), text("travel")]));
        let route = supervisor(provider.clone(), Arc::new(FakeMemory::default()))
            .with_retry_invalid(true)
            .decide(&"t".into(), &state("flights to Goa"))
            .await
            .unwrap();
        assert_eq!(route, Route::Specialist(Specialist::Travel));
        let second = &provider.requests()[1];
        assert!(second.messages.last().unwrap().content.contains("exactly one of"));

        let provider = Arc::new(ScriptedProvider::new(vec![text("nonsense"), text("still nonsense")]));
        let route = supervisor(provider.clone(), Arc::new(FakeMemory::default()))
            .with_retry_invalid(true)
            .decide(&"t".into(), &state("flights to Goa"))
            .await
            .unwrap();
        assert_eq!(route, Route::Respond);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let result = supervisor(provider, Arc::new(FakeMemory::default()))
            .decide(&"t".into(), &state("hi"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn instructions_name_every_route() {
        let prompt = routing_instructions("Samantha");
        assert!(prompt.starts_with("You are Samantha"));
        for route in Route::all() {
            assert!(prompt.contains(&format!("- {}:", route.as_str())), "{route}");
        }
        assert!(prompt.ends_with("Respond ONLY with the name of the next agent to use."));
    }
}
