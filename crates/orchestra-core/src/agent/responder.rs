//! Generic specialist agent.
//!
//! A [`Responder`] answers discovery, bids on RFPs and performs tasks for one
//! [`Specialist`]. What it does for each incoming envelope is decided by
//! [`Responder::react`], which only looks at the envelope and the state of the
//! exchange it belongs to; sending and bookkeeping happen afterwards in
//! `on_message`. An exchange is tracked from its RFP until its TASK is
//! answered or its proposal is rejected.

use std::collections::BTreeSet;

use dashmap::DashMap;
use orchestra_types::address::Address;
use orchestra_types::card::{AgentCard, Capability};
use orchestra_types::intent::Intent;
use orchestra_types::message::{Envelope, Payload};
use tracing::warn;

use crate::message::MessageError;

use super::context::AgentContext;
use super::Agent;

/// Output of one performed task.
#[derive(Debug, Clone, PartialEq)]
pub struct Work {
    /// RESULT payload sent back to the requester.
    pub result: Payload,
    /// Transcript line describing what was produced.
    pub note: String,
}

/// The domain half of a responder: what it bids and what it produces.
pub trait Specialist: Send + Sync {
    fn capability(&self) -> Capability;

    fn description(&self) -> &'static str;

    /// PROPOSE payload for an RFP carrying `request`.
    fn propose(&self, request: &Payload) -> Payload;

    /// Perform the task described by `task`.
    fn execute(&self, task: &Payload) -> serde_json::Result<Work>;
}

/// Where an open exchange (keyed by correlation key) stands on the responder
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Proposed,
    Accepted,
}

/// What a responder does in answer to one envelope.
#[derive(Debug, Clone)]
pub struct Reaction {
    /// New exchange state; `None` forgets the exchange.
    pub next: Option<ExchangeState>,
    /// Reply to send back through the router.
    pub reply: Option<Envelope>,
    /// Line for the transcript.
    pub note: Option<String>,
}

impl Reaction {
    fn reply(next: Option<ExchangeState>, reply: Envelope) -> Self {
        Self {
            next,
            reply: Some(reply),
            note: None,
        }
    }

    fn note(next: Option<ExchangeState>, note: String) -> Self {
        Self {
            next,
            reply: None,
            note: Some(note),
        }
    }
}

/// Intents a responder declares on its card.
const RESPONDER_INTENTS: [Intent; 5] = [
    Intent::Discover,
    Intent::Rfp,
    Intent::Accept,
    Intent::Reject,
    Intent::Task,
];

pub struct Responder<S> {
    context: AgentContext,
    specialist: S,
    exchanges: DashMap<String, ExchangeState>,
}

impl<S: Specialist> Responder<S> {
    pub fn new(context: AgentContext, specialist: S) -> Self {
        Self {
            context,
            specialist,
            exchanges: DashMap::new(),
        }
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    pub fn specialist(&self) -> &S {
        &self.specialist
    }

    /// Responder-side state of the exchange correlated on `key`.
    pub fn exchange_state(&self, key: &str) -> Option<ExchangeState> {
        self.exchanges.get(key).map(|entry| *entry.value())
    }

    /// Number of exchanges still open.
    pub fn open_exchanges(&self) -> usize {
        self.exchanges.len()
    }

    /// Decide how to answer `envelope` given the current exchange `state`.
    ///
    /// Fails only when the specialist's result cannot be encoded.
    pub fn react(
        &self,
        state: Option<ExchangeState>,
        envelope: &Envelope,
    ) -> Result<Reaction, MessageError> {
        let me = self.context.address.name();
        let ids = &self.context.ids;

        let reaction = match envelope.intent() {
            Intent::Discover => Reaction::reply(
                state,
                envelope.reply(ids, me, Intent::Card, self.card().to_payload()),
            ),
            Intent::Rfp => Reaction::reply(
                Some(ExchangeState::Proposed),
                envelope.reply(
                    ids,
                    me,
                    Intent::Propose,
                    self.specialist.propose(envelope.payload()),
                ),
            ),
            Intent::Accept => Reaction::note(
                Some(ExchangeState::Accepted),
                format!("Proposal accepted by {}", envelope.sender()),
            ),
            Intent::Reject => Reaction::note(
                None,
                format!("Proposal rejected by {}", envelope.sender()),
            ),
            Intent::Task => {
                let work = self.specialist.execute(envelope.payload()).map_err(|err| {
                    MessageError::InvalidPayload {
                        intent: Intent::Result,
                        sender: me.to_string(),
                        reason: err.to_string(),
                    }
                })?;
                // Answering the task closes the exchange.
                Reaction {
                    next: None,
                    reply: Some(envelope.reply(ids, me, Intent::Result, work.result)),
                    note: Some(work.note),
                }
            }
            Intent::Info => Reaction::note(
                state,
                envelope.payload_str("message").unwrap_or_default().to_string(),
            ),
            other => {
                warn!(agent = me, intent = %other, sender = envelope.sender(), "unhandled message");
                Reaction::note(
                    state,
                    format!("Received unhandled {other} message from {}", envelope.sender()),
                )
            }
        };
        Ok(reaction)
    }
}

impl<S: Specialist> Agent for Responder<S> {
    fn address(&self) -> &Address {
        &self.context.address
    }

    fn card(&self) -> AgentCard {
        AgentCard {
            name: self.context.address.name().to_string(),
            description: self.specialist.description().to_string(),
            capabilities: BTreeSet::from([self.specialist.capability().as_str().to_string()]),
            supported_intents: RESPONDER_INTENTS.into_iter().collect(),
            endpoints: vec![self.context.address.name().to_string()],
        }
    }

    async fn on_message(&self, envelope: Envelope) -> Result<(), MessageError> {
        let key = envelope.correlation_key();
        let reaction = self.react(self.exchange_state(&key), &envelope)?;

        match reaction.next {
            Some(state) => {
                self.exchanges.insert(key, state);
            }
            None => {
                self.exchanges.remove(&key);
            }
        }
        if let Some(note) = reaction.note {
            self.context.log(note);
        }
        match reaction.reply {
            Some(reply) => self.context.send(reply).await,
            None => Ok(()),
        }
    }
}

impl<S> std::fmt::Debug for Responder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("address", &self.context.address)
            .field("open_exchanges", &self.exchanges.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::message::{Conversation, Router};
    use orchestra_types::message::{into_payload, EnvelopeBuilder, MessageIdAllocator};
    use serde_json::json;

    struct Echo;

    impl Specialist for Echo {
        fn capability(&self) -> Capability {
            Capability::MarketInsight
        }

        fn description(&self) -> &'static str {
            "Echoes requests back."
        }

        fn propose(&self, request: &Payload) -> Payload {
            let mut proposal = into_payload(json!({"capability": "market_insight"}));
            proposal.extend(request.clone());
            proposal
        }

        fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
            Ok(Work {
                result: task.clone(),
                note: "echoed".into(),
            })
        }
    }

    /// Bids like [`Echo`] but can never encode its result.
    struct Broken;

    impl Specialist for Broken {
        fn capability(&self) -> Capability {
            Capability::MarketInsight
        }

        fn description(&self) -> &'static str {
            "Fails every task."
        }

        fn propose(&self, request: &Payload) -> Payload {
            Echo.propose(request)
        }

        fn execute(&self, _task: &Payload) -> serde_json::Result<Work> {
            Err(serde_json::from_str::<Payload>("{").unwrap_err())
        }
    }

    fn context() -> AgentContext {
        AgentContext::new(
            Address::new("market"),
            "Market Insight",
            Arc::new(Router::new()),
            Arc::new(Conversation::new()),
            Arc::new(MessageIdAllocator::new()),
        )
    }

    fn responder() -> Responder<Echo> {
        Responder::new(context(), Echo)
    }

    fn draft(intent: Intent) -> EnvelopeBuilder {
        Envelope::builder(intent, "orchestrator", "market")
    }

    fn incoming<S: Specialist>(responder: &Responder<S>, intent: Intent) -> Envelope {
        draft(intent).build(&responder.context.ids)
    }

    #[test]
    fn discover_replies_with_card() {
        let r = responder();
        let env = incoming(&r, Intent::Discover);
        let reaction = r.react(None, &env).unwrap();

        let reply = reaction.reply.unwrap();
        assert_eq!(reply.intent(), Intent::Card);
        assert_eq!(reply.recipient(), "orchestrator");
        assert_eq!(reply.correlation_id(), Some(env.message_id().to_string().as_str()));

        let card = AgentCard::from_payload(reply.payload()).unwrap();
        assert_eq!(card.name, "market");
        assert!(card.offers(Capability::MarketInsight));
        assert!(card.supports(Intent::Rfp));
        assert!(card.supports(Intent::Task));
        assert_eq!(card.endpoints, vec!["market".to_string()]);
        assert!(reaction.next.is_none());
    }

    #[test]
    fn rfp_proposes_and_opens_exchange() {
        let r = responder();
        let env = draft(Intent::Rfp)
            .payload(into_payload(json!({"region": "EU"})))
            .build(&r.context.ids);
        let reaction = r.react(None, &env).unwrap();

        assert_eq!(reaction.next, Some(ExchangeState::Proposed));
        let reply = reaction.reply.unwrap();
        assert_eq!(reply.intent(), Intent::Propose);
        assert_eq!(reply.payload_str("region"), Some("EU"));
        assert_eq!(reply.payload_str("capability"), Some("market_insight"));
    }

    #[test]
    fn accept_and_reject_only_update_state() {
        let r = responder();
        let accept = r
            .react(Some(ExchangeState::Proposed), &incoming(&r, Intent::Accept))
            .unwrap();
        assert_eq!(accept.next, Some(ExchangeState::Accepted));
        assert!(accept.reply.is_none());
        assert_eq!(accept.note.as_deref(), Some("Proposal accepted by orchestrator"));

        let reject = r
            .react(Some(ExchangeState::Proposed), &incoming(&r, Intent::Reject))
            .unwrap();
        assert!(reject.next.is_none());
        assert!(reject.reply.is_none());
    }

    #[test]
    fn task_returns_result_and_closes_exchange() {
        let r = responder();
        let env = draft(Intent::Task)
            .correlation_id("msg-40")
            .payload(into_payload(json!({"product": "EcoWidget"})))
            .build(&r.context.ids);
        let reaction = r.react(Some(ExchangeState::Accepted), &env).unwrap();

        assert!(reaction.next.is_none());
        assert_eq!(reaction.note.as_deref(), Some("echoed"));
        let reply = reaction.reply.unwrap();
        assert_eq!(reply.intent(), Intent::Result);
        assert_eq!(reply.correlation_id(), Some("msg-40"));
        assert_eq!(reply.payload_str("product"), Some("EcoWidget"));
    }

    #[test]
    fn unexpected_intent_is_noted_not_answered() {
        let r = responder();
        let reaction = r.react(None, &incoming(&r, Intent::Propose)).unwrap();

        assert!(reaction.reply.is_none());
        assert_eq!(
            reaction.note.as_deref(),
            Some("Received unhandled PROPOSE message from orchestrator")
        );
    }

    #[tokio::test]
    async fn on_message_tracks_exchange_until_task_answered() {
        let r = responder();
        r.context.router.register("orchestrator", |_env: Envelope| async { Ok::<(), MessageError>(()) });

        let rfp = incoming(&r, Intent::Rfp);
        let key = rfp.correlation_key();
        r.on_message(rfp).await.unwrap();
        assert_eq!(r.exchange_state(&key), Some(ExchangeState::Proposed));

        let accept = draft(Intent::Accept).correlation_id(key.clone()).build(&r.context.ids);
        r.on_message(accept).await.unwrap();
        assert_eq!(r.exchange_state(&key), Some(ExchangeState::Accepted));

        let task = draft(Intent::Task).correlation_id(key.clone()).build(&r.context.ids);
        r.on_message(task).await.unwrap();
        assert_eq!(r.exchange_state(&key), None);
        assert_eq!(
            r.context.transcript.lines(),
            vec!["Proposal accepted by orchestrator", "echoed"]
        );
    }

    #[tokio::test]
    async fn finished_exchanges_are_not_retained() {
        let r = responder();
        r.context.router.register("orchestrator", |_env: Envelope| async { Ok::<(), MessageError>(()) });

        for _ in 0..100 {
            let rfp = incoming(&r, Intent::Rfp);
            let key = rfp.correlation_key();
            r.on_message(rfp).await.unwrap();
            for intent in [Intent::Accept, Intent::Task] {
                let env = draft(intent).correlation_id(key.clone()).build(&r.context.ids);
                r.on_message(env).await.unwrap();
            }
        }
        assert_eq!(r.open_exchanges(), 0);

        let rfp = incoming(&r, Intent::Rfp);
        let key = rfp.correlation_key();
        r.on_message(rfp).await.unwrap();
        let reject = draft(Intent::Reject).correlation_id(key).build(&r.context.ids);
        r.on_message(reject).await.unwrap();
        assert_eq!(r.open_exchanges(), 0);
    }

    #[tokio::test]
    async fn unencodable_result_is_reported_not_sent() {
        let r = Responder::new(context(), Broken);
        let result = r.on_message(incoming(&r, Intent::Task)).await;

        assert!(matches!(
            result,
            Err(MessageError::InvalidPayload { intent: Intent::Result, ref sender, .. }) if sender == "market"
        ));
        assert!(r.context.transcript.lines().is_empty());
    }

    #[tokio::test]
    async fn reply_to_unregistered_sender_fails() {
        let r = responder();
        let result = r.on_message(incoming(&r, Intent::Discover)).await;
        assert!(matches!(result, Err(MessageError::NotRegistered(ref a)) if a == "orchestrator"));
    }
}
