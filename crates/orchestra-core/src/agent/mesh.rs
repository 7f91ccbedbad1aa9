//! Assembly of the full set of participants on one router.

use std::sync::Arc;

use orchestra_types::address::Address;
use orchestra_types::card::{AgentCard, Capability};
use orchestra_types::config::OrchestraConfig;
use orchestra_types::message::MessageIdAllocator;
use orchestra_types::plan::{PlanReport, PlanRequest};
use tracing::info;

use crate::insight::InsightSource;
use crate::message::{AddressRegistry, Conversation, MessageError, Router};

use super::context::AgentContext;
use super::orchestrator::Orchestrator;
use super::responder::{Responder, Specialist};
use super::specialist::{
    ComplianceSustainability, CustomerInsight, DesignArchitect, GoToMarket, MarketInsight,
    Partnership,
};
use super::transcript::Transcript;

pub const ORCHESTRATOR: &str = "orchestrator";

/// The specialists a plan is executed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub market: Address,
    pub customer: Address,
    pub partnership: Address,
    pub compliance: Address,
    pub design: Address,
    pub gtm: Address,
}

impl Roster {
    /// The standard addresses, resolved through `registry`.
    pub fn resolve(registry: &AddressRegistry) -> Self {
        Self {
            market: registry.resolve("market"),
            customer: registry.resolve("customer"),
            partnership: registry.resolve("partnership"),
            compliance: registry.resolve("compliance"),
            design: registry.resolve("design"),
            gtm: registry.resolve("gtm"),
        }
    }

    pub fn all(&self) -> Vec<Address> {
        self.assignments()
            .into_iter()
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Each roster entry paired with the capability it is hired for.
    pub fn assignments(&self) -> [(&Address, Capability); 6] {
        [
            (&self.market, Capability::MarketInsight),
            (&self.customer, Capability::CustomerInsight),
            (&self.partnership, Capability::Partnerships),
            (&self.compliance, Capability::ComplianceEsg),
            (&self.design, Capability::DesignArchitecture),
            (&self.gtm, Capability::GoToMarket),
        ]
    }
}

/// An orchestrator and six specialists sharing one router, conversation
/// tracker and message id allocator.
///
/// Dropping the mesh clears the router, releasing the participants.
pub struct AgentMesh {
    registry: AddressRegistry,
    router: Arc<Router>,
    ids: Arc<MessageIdAllocator>,
    orchestrator: Arc<Orchestrator>,
    roster: Roster,
    transcripts: Vec<Transcript>,
}

impl AgentMesh {
    pub fn assemble(source: Arc<dyn InsightSource>, config: &OrchestraConfig) -> Self {
        let registry = AddressRegistry::new();
        let router = Arc::new(Router::new());
        let conversation = Arc::new(Conversation::new());
        let ids = Arc::new(MessageIdAllocator::new());

        let context = |address: &Address, name: &str| {
            AgentContext::new(
                address.clone(),
                name,
                Arc::clone(&router),
                Arc::clone(&conversation),
                Arc::clone(&ids),
            )
        };

        let orchestrator = Arc::new(Orchestrator::new(
            context(&registry.resolve(ORCHESTRATOR), "Orchestrator"),
            config.reply_timeout(),
        ));
        router.register_agent(Arc::clone(&orchestrator));

        let roster = Roster::resolve(&registry);
        let transcripts = vec![
            orchestrator.context().transcript.clone(),
            enlist(
                &router,
                context(&roster.market, "Market Insight"),
                MarketInsight::new(Arc::clone(&source)),
            ),
            enlist(
                &router,
                context(&roster.customer, "Customer Insight"),
                CustomerInsight::new(Arc::clone(&source)),
            ),
            enlist(
                &router,
                context(&roster.partnership, "Partnership"),
                Partnership::new(Arc::clone(&source)),
            ),
            enlist(
                &router,
                context(&roster.compliance, "Compliance"),
                ComplianceSustainability::new(Arc::clone(&source)),
            ),
            enlist(
                &router,
                context(&roster.design, "Design"),
                DesignArchitect::new(Arc::clone(&source)),
            ),
            enlist(&router, context(&roster.gtm, "Go-to-Market"), GoToMarket),
        ];

        info!(agents = router.len(), "agent mesh assembled");
        Self {
            registry,
            router,
            ids,
            orchestrator,
            roster,
            transcripts,
        }
    }

    /// Execute one plan.
    pub async fn run(&self, request: &PlanRequest) -> Result<PlanReport, MessageError> {
        self.orchestrator.run_plan(request, &self.roster).await
    }

    /// Discover every specialist on the roster and return their cards.
    pub async fn discover(&self) -> Result<Vec<AgentCard>, MessageError> {
        self.orchestrator.discover_agents(&self.roster.all()).await
    }

    /// Every participant's transcript, orchestrator first, then the roster
    /// in hiring order.
    pub fn transcripts(&self) -> Vec<(String, Vec<String>)> {
        self.transcripts
            .iter()
            .map(|transcript| (transcript.owner().to_string(), transcript.lines()))
            .collect()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Number of envelopes created so far.
    pub fn messages_sent(&self) -> u64 {
        self.ids.issued()
    }
}

fn enlist<S: Specialist + 'static>(
    router: &Router,
    context: AgentContext,
    specialist: S,
) -> Transcript {
    let transcript = context.transcript.clone();
    router.register_agent(Arc::new(Responder::new(context, specialist)));
    transcript
}

impl Drop for AgentMesh {
    fn drop(&mut self) {
        self.router.clear();
    }
}

impl std::fmt::Debug for AgentMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentMesh")
            .field("router", &self.router)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
