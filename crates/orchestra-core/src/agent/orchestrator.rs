//! The coordinating agent.
//!
//! The orchestrator discovers specialists, hires each one through an
//! RFP -> PROPOSE -> ACCEPT -> TASK -> RESULT exchange, and assembles the
//! results of a four-phase plan:
//!
//! 1. market insight and customer insight, concurrently
//! 2. compliance and partnerships, concurrently
//! 3. design, fed the customer's `top_requests`
//! 4. go-to-market, fed the region and the partner directory

use std::collections::BTreeMap;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::try_join_all;
use orchestra_types::address::Address;
use orchestra_types::card::{AgentCard, Capability};
use orchestra_types::intent::Intent;
use orchestra_types::message::{into_payload, Envelope, Payload};
use orchestra_types::plan::{PlanReport, PlanRequest};
use serde_json::{json, Value};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::message::MessageError;

use super::context::AgentContext;
use super::mesh::Roster;
use super::Agent;

pub struct Orchestrator {
    context: AgentContext,
    /// Cards fetched during discovery, keyed by card name.
    cards: DashMap<String, AgentCard>,
    reply_timeout: Option<Duration>,
}

impl Orchestrator {
    /// `reply_timeout` bounds every wait for a CARD, PROPOSE or RESULT;
    /// `None` waits indefinitely.
    pub fn new(context: AgentContext, reply_timeout: Option<Duration>) -> Self {
        Self {
            context,
            cards: DashMap::new(),
            reply_timeout,
        }
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout
    }

    /// Snapshot of the card cache, ordered by name.
    pub fn cards(&self) -> BTreeMap<String, AgentCard> {
        self.cards
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Name of the first cached card (by name order) offering `capability`.
    pub fn provider_of(&self, capability: Capability) -> Option<String> {
        self.cards()
            .into_values()
            .find(|card| card.offers(capability))
            .map(|card| card.name)
    }

    /// Send DISCOVER to every address and cache the returned cards.
    ///
    /// The cache is only updated once every card has arrived; a failed
    /// discovery leaves it as it was. Cards are stored under their own
    /// `name`, so repeating discovery replaces entries instead of adding new
    /// ones.
    pub async fn discover_agents(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<AgentCard>, MessageError> {
        let cards = try_join_all(addresses.iter().map(|address| self.fetch_card(address))).await?;
        for card in &cards {
            self.cards.insert(card.name.clone(), card.clone());
        }
        debug!(count = cards.len(), "discovery complete");
        Ok(cards)
    }

    async fn fetch_card(&self, address: &Address) -> Result<AgentCard, MessageError> {
        let discover = self.context.envelope(Intent::Discover, address);
        let key = discover.message_id().to_string();
        let payload = self.request(discover, key).await?;

        AgentCard::from_payload(&payload).map_err(|err| MessageError::InvalidPayload {
            intent: Intent::Card,
            sender: address.name().to_string(),
            reason: err.to_string(),
        })
    }

    /// Watch `key`, send `envelope`, and wait for the correlated reply.
    ///
    /// The watch is discarded if the send fails or the request is dropped
    /// before the reply arrives.
    async fn request(&self, envelope: Envelope, key: String) -> Result<Payload, MessageError> {
        let conversation = &self.context.conversation;
        let pending = conversation.watch(key);
        self.context.send(envelope).await?;
        conversation.wait_for(pending, self.reply_timeout).await
    }

    /// Hire the agent at `address` for one task and return its RESULT payload.
    ///
    /// The first proposal is always accepted. ACCEPT and TASK both carry the
    /// RFP's message id as correlation id, so the whole exchange shares one
    /// key.
    pub async fn negotiate(
        &self,
        address: &Address,
        payload: Payload,
    ) -> Result<Payload, MessageError> {
        let rfp = self
            .context
            .seal(self.context.draft(Intent::Rfp, address).payload(payload.clone()));
        let exchange = rfp.message_id().to_string();

        let proposal = self.request(rfp, exchange.clone()).await?;
        debug!(agent = address.name(), %exchange, "accepting proposal");

        let accept = self.context.seal(
            self.context
                .draft(Intent::Accept, address)
                .correlation_id(exchange.clone())
                .payload(proposal),
        );
        self.context.send(accept).await?;

        let task = self.context.seal(
            self.context
                .draft(Intent::Task, address)
                .correlation_id(exchange.clone())
                .payload(payload),
        );
        self.request(task, exchange).await
    }

    /// Run the four-phase plan against the agents in `roster`.
    ///
    /// Discovery happens first if the card cache is empty. Any failed
    /// exchange aborts the plan.
    pub async fn run_plan(
        &self,
        request: &PlanRequest,
        roster: &Roster,
    ) -> Result<PlanReport, MessageError> {
        let span = info_span!(
            "plan",
            run_id = %Uuid::now_v7(),
            region = request.region(),
            product = request.product()
        );
        self.execute_plan(request, roster).instrument(span).await
    }

    async fn execute_plan(
        &self,
        request: &PlanRequest,
        roster: &Roster,
    ) -> Result<PlanReport, MessageError> {
        let region = request.region();
        let product = request.product();
        self.context.log(format!(
            "Starting plan for product '{product}' in region '{region}'"
        ));

        if self.cards.is_empty() {
            self.discover_agents(&roster.all()).await?;
        }
        self.check_roster(roster);

        let (market_insights, customer_insights) = tokio::try_join!(
            self.negotiate(&roster.market, into_payload(json!({ "region": region }))),
            self.negotiate(&roster.customer, into_payload(json!({ "product": product }))),
        )?;

        let (compliance, partners) = tokio::try_join!(
            self.negotiate(&roster.compliance, into_payload(json!({ "region": region }))),
            self.negotiate(&roster.partnership, into_payload(json!({ "region": region }))),
        )?;

        let top_requests = customer_insights
            .get("top_requests")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let design = self
            .negotiate(
                &roster.design,
                into_payload(json!({ "top_requests": top_requests })),
            )
            .await?;

        let go_to_market = self
            .negotiate(
                &roster.gtm,
                into_payload(json!({
                    "region": region,
                    "partners": Value::Object(partners.clone()),
                })),
            )
            .await?;

        self.context.log("Plan execution completed");
        Ok(PlanReport {
            region: region.to_string(),
            product: product.to_string(),
            market_insights,
            customer_insights,
            compliance,
            partners,
            design,
            go_to_market,
        })
    }

    /// Warn about roster entries whose cached card does not advertise the
    /// capability they are hired for. The plan still proceeds.
    fn check_roster(&self, roster: &Roster) {
        for (address, capability) in roster.assignments() {
            match self.cards.get(address.name()) {
                Some(card) if card.offers(capability) => {}
                Some(_) => warn!(
                    agent = address.name(),
                    %capability,
                    "card does not advertise the capability it is hired for"
                ),
                None => warn!(agent = address.name(), "no card cached for agent"),
            }
        }
    }
}

impl Agent for Orchestrator {
    fn address(&self) -> &Address {
        &self.context.address
    }

    fn card(&self) -> AgentCard {
        AgentCard {
            name: self.context.address.name().to_string(),
            description: "Coordinates multi-step plans across specialist agents.".to_string(),
            capabilities: ["orchestration".to_string()].into(),
            supported_intents: [Intent::Card, Intent::Propose, Intent::Result, Intent::Info].into(),
            endpoints: vec![self.context.address.name().to_string()],
        }
    }

    async fn on_message(&self, envelope: Envelope) -> Result<(), MessageError> {
        match envelope.intent() {
            intent if intent.is_reply() => {
                let key = envelope.correlation_key();
                self.context.conversation.resolve(&key, envelope.into_payload());
            }
            Intent::Info => {
                let message = envelope.payload_str("message").unwrap_or_default();
                self.context.log(message);
            }
            other => {
                warn!(intent = %other, sender = envelope.sender(), "unhandled message");
                self.context.log(format!(
                    "Received unhandled {other} message from {}",
                    envelope.sender()
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("address", &self.context.address)
            .field("cached_cards", &self.cards.len())
            .field("reply_timeout", &self.reply_timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::message::{Conversation, Router};
    use orchestra_types::message::MessageIdAllocator;

    fn orchestrator(reply_timeout: Option<Duration>) -> Arc<Orchestrator> {
        let router = Arc::new(Router::new());
        let context = AgentContext::new(
            Address::new("orchestrator"),
            "Orchestrator",
            Arc::clone(&router),
            Arc::new(Conversation::new()),
            Arc::new(MessageIdAllocator::new()),
        );
        let orchestrator = Arc::new(Orchestrator::new(context, reply_timeout));
        router.register_agent(Arc::clone(&orchestrator));
        orchestrator
    }

    /// Registers a responder at "scripted" that proposes, then returns a fixed
    /// result, recording every envelope it receives.
    fn scripted(orchestrator: &Orchestrator) -> Arc<Mutex<Vec<Envelope>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let router = Arc::clone(&orchestrator.context().router);
        let ids = Arc::clone(&orchestrator.context().ids);

        orchestrator.context().router.register("scripted", move |env: Envelope| {
            log.lock().unwrap().push(env.clone());
            let router = Arc::clone(&router);
            let ids = Arc::clone(&ids);
            async move {
                let reply = match env.intent() {
                    Intent::Rfp => Some(env.reply(
                        &ids,
                        "scripted",
                        Intent::Propose,
                        into_payload(json!({"capability": "market_insight", "eta_days": 1})),
                    )),
                    Intent::Task => Some(env.reply(
                        &ids,
                        "scripted",
                        Intent::Result,
                        into_payload(json!({"answer": 42, "echo": env.payload().clone()})),
                    )),
                    _ => None,
                };
                match reply {
                    Some(reply) => router.send(reply).await,
                    None => Ok(()),
                }
            }
        });
        seen
    }

    #[tokio::test]
    async fn negotiate_accepts_between_propose_and_task() {
        let orchestrator = orchestrator(None);
        let seen = scripted(&orchestrator);

        let result = orchestrator
            .negotiate(&Address::new("scripted"), into_payload(json!({"region": "EU"})))
            .await
            .unwrap();

        assert_eq!(
            result,
            into_payload(json!({"answer": 42, "echo": {"region": "EU"}}))
        );

        let seen = seen.lock().unwrap();
        let intents: Vec<Intent> = seen.iter().map(Envelope::intent).collect();
        assert_eq!(intents, vec![Intent::Rfp, Intent::Accept, Intent::Task]);

        let rfp_id = seen[0].message_id().to_string();
        assert_eq!(seen[1].correlation_id(), Some(rfp_id.as_str()));
        assert_eq!(seen[2].correlation_id(), Some(rfp_id.as_str()));
        // ACCEPT carries the proposal, TASK the original request.
        assert_eq!(seen[1].payload_str("capability"), Some("market_insight"));
        assert_eq!(seen[2].payload_str("region"), Some("EU"));
        assert_eq!(orchestrator.context().conversation.pending_count(), 0);
    }

    #[tokio::test]
    async fn negotiate_with_unknown_agent_fails_and_leaves_no_watch() {
        let orchestrator = orchestrator(None);
        let result = orchestrator
            .negotiate(&Address::new("nobody"), Payload::new())
            .await;

        assert!(matches!(result, Err(MessageError::NotRegistered(ref a)) if a == "nobody"));
        assert_eq!(orchestrator.context().conversation.pending_count(), 0);
    }

    #[tokio::test]
    async fn silent_agent_times_out() {
        let orchestrator = orchestrator(Some(Duration::from_millis(20)));
        orchestrator
            .context()
            .router
            .register("silent", |_env: Envelope| async { Ok::<(), MessageError>(()) });

        let result = orchestrator
            .negotiate(&Address::new("silent"), Payload::new())
            .await;

        assert!(matches!(result, Err(MessageError::Timeout { .. })));
        assert_eq!(orchestrator.context().conversation.pending_count(), 0);
    }

    #[tokio::test]
    async fn failed_sibling_exchange_discards_pending_watch() {
        let orchestrator = orchestrator(None);
        orchestrator
            .context()
            .router
            .register("silent", |_env: Envelope| async { Ok::<(), MessageError>(()) });

        let silent = Address::new("silent");
        let nobody = Address::new("nobody");
        let outcome = tokio::try_join!(
            orchestrator.negotiate(&silent, Payload::new()),
            orchestrator.negotiate(&nobody, Payload::new()),
        );

        assert!(matches!(outcome, Err(MessageError::NotRegistered(ref a)) if a == "nobody"));
        assert_eq!(orchestrator.context().conversation.pending_count(), 0);
    }

    #[tokio::test]
    async fn malformed_card_is_rejected() {
        let orchestrator = orchestrator(None);
        let router = Arc::clone(&orchestrator.context().router);
        let ids = Arc::clone(&orchestrator.context().ids);
        orchestrator.context().router.register("odd", move |env: Envelope| {
            let router = Arc::clone(&router);
            let ids = Arc::clone(&ids);
            async move {
                let reply = env.reply(&ids, "odd", Intent::Card, into_payload(json!({"capabilities": 7})));
                router.send(reply).await
            }
        });

        let result = orchestrator.discover_agents(&[Address::new("odd")]).await;
        assert!(matches!(
            result,
            Err(MessageError::InvalidPayload { intent: Intent::Card, ref sender, .. }) if sender == "odd"
        ));
        assert!(orchestrator.cards().is_empty());
    }

    #[tokio::test]
    async fn unhandled_intent_is_logged_not_escalated() {
        let orchestrator = orchestrator(None);
        let ids = Arc::clone(&orchestrator.context().ids);
        let stray = Envelope::new(&ids, Intent::Task, "market", "orchestrator");

        orchestrator.context().router.send(stray).await.unwrap();

        assert_eq!(
            orchestrator.context().transcript.lines(),
            vec!["Received unhandled TASK message from market"]
        );
    }

    #[tokio::test]
    async fn info_messages_are_logged() {
        let orchestrator = orchestrator(None);
        let ids = Arc::clone(&orchestrator.context().ids);
        let info = Envelope::builder(Intent::Info, "design", "orchestrator")
            .payload(into_payload(json!({"message": "prototype ready"})))
            .build(&ids);

        orchestrator.on_message(info).await.unwrap();
        assert_eq!(orchestrator.context().transcript.lines(), vec!["prototype ready"]);
    }

    #[test]
    fn own_card_describes_coordinator() {
        let orchestrator = orchestrator(None);
        let card = orchestrator.card();
        assert_eq!(card.name, "orchestrator");
        assert!(card.supports(Intent::Result));
        assert!(!card.supports(Intent::Rfp));
    }
}
