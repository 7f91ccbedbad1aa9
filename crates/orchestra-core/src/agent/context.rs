//! Shared wiring handed to each participant.

use std::sync::Arc;

use orchestra_types::address::Address;
use orchestra_types::intent::Intent;
use orchestra_types::message::{Envelope, EnvelopeBuilder, MessageIdAllocator};

use crate::message::{Conversation, MessageError, Router};

use super::transcript::Transcript;

/// Everything a participant needs to talk on the bus.
///
/// The router, conversation tracker and id allocator are shared by the whole
/// mesh; the address, display name and transcript belong to one participant.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub address: Address,
    pub name: String,
    pub router: Arc<Router>,
    pub conversation: Arc<Conversation>,
    pub ids: Arc<MessageIdAllocator>,
    pub transcript: Transcript,
}

impl AgentContext {
    pub fn new(
        address: Address,
        name: impl Into<String>,
        router: Arc<Router>,
        conversation: Arc<Conversation>,
        ids: Arc<MessageIdAllocator>,
    ) -> Self {
        let name = name.into();
        Self {
            transcript: Transcript::new(name.clone()),
            address,
            name,
            router,
            conversation,
            ids,
        }
    }

    /// A fresh envelope from this participant to `recipient`.
    pub fn envelope(&self, intent: Intent, recipient: &Address) -> Envelope {
        self.draft(intent, recipient).build(&self.ids)
    }

    /// Start an envelope to `recipient`; seal it with [`AgentContext::seal`].
    pub fn draft(&self, intent: Intent, recipient: &Address) -> EnvelopeBuilder {
        Envelope::builder(intent, self.address.name(), recipient.name())
    }

    pub fn seal(&self, draft: EnvelopeBuilder) -> Envelope {
        draft.build(&self.ids)
    }

    /// Send through the shared router.
    pub async fn send(&self, envelope: Envelope) -> Result<(), MessageError> {
        self.router.send(envelope).await
    }

    /// Append a line to this participant's transcript.
    pub fn log(&self, line: impl Into<String>) {
        self.transcript.record(line);
    }
}
