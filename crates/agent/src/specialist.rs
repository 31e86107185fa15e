//! Domain specialists: a reasoning loop bound to a fixed tool roster.

use crate::reasoning::ReasoningLoop;
use crate::responder::{Responder, ResponderOutput};
use async_trait::async_trait;
use chrono::Utc;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::ThreadId;
use concierge_core::route::Specialist;
use concierge_core::state::ConversationState;
use concierge_core::tool::{ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::info;

const BE_BRIEF: &str =
    "Provide direct and straightforward answers without unnecessary fluff. Get straight to the point.";

/// The system instructions a specialist runs under.
pub fn instructions_for(specialist: Specialist) -> String {
    let role = match specialist {
        Specialist::Research => {
            "You are a research specialist. Use web search to find general or current information."
        }
        Specialist::Finance => {
            "You are a financial analyst. Provide stock prices, company information, and financial data."
        }
        Specialist::Travel => {
            "You are a travel specialist. Help with weather information, flight bookings, and hotel reservations."
        }
        Specialist::KnowledgeBase => {
            "You are a knowledge base specialist. Search internal documents, manuals, and other information."
        }
        Specialist::Shopping => {
            "You are a shopping assistant. Search for products, prices, and reviews using Google Shopping."
        }
        Specialist::Jobs => {
            "You are a career specialist. Search for job openings, roles, and employers that match the user's request."
        }
        Specialist::Memory => {
            "You are a memory specialist. Use the memory tools to recall what you know about the user from past conversations."
        }
        Specialist::Recipes => {
            "You are a culinary specialist. Find recipes, ingredients, and cooking instructions."
        }
    };
    format!("{role} {BE_BRIEF}")
}

pub struct SpecialistResponder {
    specialist: Specialist,
    instructions: String,
    tools: ToolRegistry,
    reasoning: Arc<ReasoningLoop>,
    events: Arc<EventBus>,
}

impl SpecialistResponder {
    pub fn new(
        specialist: Specialist,
        tools: ToolRegistry,
        reasoning: Arc<ReasoningLoop>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            specialist,
            instructions: instructions_for(specialist),
            tools,
            reasoning,
            events,
        }
    }
}

#[async_trait]
impl Responder for SpecialistResponder {
    fn name(&self) -> &str {
        self.specialist.as_str()
    }

    async fn run(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<ResponderOutput, concierge_core::Error> {
        let ctx = ToolContext::for_user(&state.user_id);
        let outcome = self
            .reasoning
            .run(&self.instructions, &state.turns, &self.tools, &ctx)
            .await?;

        info!(
            thread_id = %thread_id,
            specialist = %self.specialist,
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls,
            "Specialist answered"
        );
        self.events.publish(DomainEvent::ResponseGenerated {
            thread_id: thread_id.to_string(),
            responder: self.specialist.as_str().into(),
            tokens_used: outcome.tokens_used,
            timestamp: Utc::now(),
        });

        Ok(ResponderOutput::finish(outcome.answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::Next;
    use crate::test_helpers::*;
    use concierge_core::message::{Message, Role};
    use concierge_core::provider::ModelOptions;
    use serde_json::json;

    fn travel(provider: Arc<ScriptedProvider>, tools: ToolRegistry) -> SpecialistResponder {
        let events = Arc::new(EventBus::default());
        let reasoning = ReasoningLoop::new(
            provider,
            ModelOptions::new("mock-model", 0.3, Some(512)),
            Arc::clone(&events),
        );
        SpecialistResponder::new(Specialist::Travel, tools, Arc::new(reasoning), events)
    }

    #[tokio::test]
    async fn appends_only_the_final_answer() {
        let weather = RecordingTool::new("get_weather", "Hyderabad: 31°C, haze");
        let calls = weather.calls();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_calls(vec![call("get_weather", json!({"location": "Hyderabad"}))]),
            text("It's 31°C with haze in Hyderabad."),
        ]));

        let mut state = ConversationState::new("samantha");
        state.append(Message::user("what's the weather in Hyderabad"));

        let output = travel(provider, ToolRegistry::new().with(Box::new(weather)))
            .run(&"samantha".into(), &state)
            .await
            .unwrap();

        assert_eq!(output.next, Next::Finish);
        assert_eq!(output.turns.len(), 1);
        assert_eq!(output.turns[0].role, Role::Assistant);
        assert_eq!(output.turns[0].content, "It's 31°C with haze in Hyderabad.");
        assert_eq!(calls.lock().unwrap()[0], json!({"location": "Hyderabad"}));
    }

    #[tokio::test]
    async fn model_sees_specialist_instructions() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("Sure.")]));
        let mut state = ConversationState::new("samantha");
        state.append(Message::user("flights?"));

        travel(provider.clone(), ToolRegistry::new())
            .run(&"t".into(), &state)
            .await
            .unwrap();

        let system = &provider.requests()[0].messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.starts_with("You are a travel specialist."));
        assert!(system.content.ends_with("Get straight to the point."));
    }

    #[tokio::test]
    async fn model_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let state = ConversationState::new("samantha");
        let result = travel(provider, ToolRegistry::new()).run(&"t".into(), &state).await;
        assert!(result.is_err());
    }

    #[test]
    fn every_specialist_has_instructions() {
        for specialist in Specialist::ALL {
            let prompt = instructions_for(specialist);
            assert!(prompt.starts_with("You are a"), "{specialist}");
            assert!(prompt.contains(BE_BRIEF));
        }
    }
}
