// crates/propdesk-agent/src/orchestrator.rs
// ============================================================================
// Module: Conversation Orchestrator
// Description: Turn loop driving the reasoning service toward ticket creation.
// Purpose: Apply tool invocations to the store with exactly-once creation.
// Dependencies: propdesk-core, crate::{contract, events, prompt, provider}, rand
// ============================================================================

//! ## Overview
//! One [`TriageSession`] drives a single triage conversation: it calls the
//! reasoning service up to [`MAX_MODEL_ROUNDS`] times, streams prose through
//! the event emitter, validates and executes tool invocations, and ends the
//! loop on ticket creation, a tool-free response, or the round cap.
//!
//! Invariants:
//! - Exactly one ticket is created per session that reaches `create_ticket`,
//!   even if the tool fires twice.
//! - Ticket creation is confirmed by an independent read-after-write; an
//!   unverified write never produces a `ticket_created` event.
//! - The follow-up path spends one compensating round trip so the question
//!   reaches the tenant as prose; that call is outside the round cap, and a
//!   prose-free compensating turn falls back to the question verbatim.
//! - The `done` marker is emitted unconditionally, after success or failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;

use propdesk_core::ChatMessage;
use propdesk_core::Property;
use propdesk_core::PropertyId;
use propdesk_core::SharedClock;
use propdesk_core::SharedTicketStore;
use propdesk_core::SharedVendorDirectory;
use propdesk_core::SpeakerRole;
use propdesk_core::StoreError;
use propdesk_core::Tenant;
use propdesk_core::TenantId;
use propdesk_core::Ticket;
use propdesk_core::TicketId;
use propdesk_core::TicketStatus;

use crate::contract::ClassifyIssueInput;
use crate::contract::CreateTicketInput;
use crate::contract::ToolCatalog;
use crate::contract::ToolError;
use crate::contract::ToolName;
use crate::events::EventEmitter;
use crate::events::TriageEvent;
use crate::events::TriagePhase;
use crate::prompt::build_system_prompt;
use crate::provider::ContentBlock;
use crate::provider::ModelTurn;
use crate::provider::ProviderError;
use crate::provider::SharedReasoningProvider;
use crate::provider::ToolInvocation;
use crate::provider::Turn;
use crate::provider::TurnRole;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hard upper bound on model round trips per session.
///
/// Reaching the cap without a ticket ends the loop without error; this is a
/// bounded-effort guarantee, not a failure.
pub const MAX_MODEL_ROUNDS: usize = 6;

// ============================================================================
// SECTION: Session Context
// ============================================================================

/// Property and reporter context for one triage session.
///
/// # Invariants
/// - `property` is always resolved before a session starts; `tenant` may be
///   absent, in which case advisory tool-input identity is used at creation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Originating property.
    pub property: Property,
    /// Reporting tenant, when resolved from the session.
    pub tenant: Option<Tenant>,
}

// ============================================================================
// SECTION: Tool Outcomes
// ============================================================================

/// Internal outcome of one tool execution.
enum ToolOutcome {
    /// Classification complete; continue the loop expecting `create_ticket`.
    Classified {
        /// Human-readable classification detail for the status event.
        detail: String,
    },
    /// More information needed; ask the follow-up and end the turn.
    FollowUp {
        /// The single follow-up question.
        question: String,
    },
    /// Ticket created and verified; end the loop.
    Created {
        /// The verified ticket as re-read from the store.
        ticket: Box<Ticket>,
    },
    /// Tool execution failed; feed the error back and continue.
    Failed {
        /// Error message for the tool result.
        message: String,
    },
}

// ============================================================================
// SECTION: Triage Session
// ============================================================================

/// One ephemeral triage conversation against the reasoning service.
///
/// Sessions share no state with each other; the ticket store is the only
/// shared mutable resource.
pub struct TriageSession {
    /// Property and reporter context.
    ctx: SessionContext,
    /// Shared ticket store.
    store: SharedTicketStore,
    /// Vendor lookup collaborator.
    vendors: SharedVendorDirectory,
    /// Reasoning-service client.
    provider: SharedReasoningProvider,
    /// Tool catalog with compiled validators.
    catalog: std::sync::Arc<ToolCatalog>,
    /// Clock for creation stamping.
    clock: SharedClock,
    /// Ordered session event channel.
    emitter: EventEmitter,
}

impl TriageSession {
    /// Creates a session over the shared collaborators.
    #[must_use]
    pub fn new(
        ctx: SessionContext,
        store: SharedTicketStore,
        vendors: SharedVendorDirectory,
        provider: SharedReasoningProvider,
        catalog: std::sync::Arc<ToolCatalog>,
        clock: SharedClock,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            ctx,
            store,
            vendors,
            provider,
            catalog,
            clock,
            emitter,
        }
    }

    /// Runs the session to completion.
    ///
    /// Provider failures surface as a single `error` event; the `done`
    /// marker is emitted unconditionally as the final frame.
    pub async fn run(self, history: Vec<ChatMessage>) {
        if let Err(err) = self.drive(history).await {
            self.emitter.emit(TriageEvent::Error {
                message: err.to_string(),
            });
        }
        self.emitter.emit(TriageEvent::Done);
    }

    /// Drives the turn loop until creation, a tool-free turn, or the cap.
    async fn drive(&self, history: Vec<ChatMessage>) -> Result<(), ProviderError> {
        let system = build_system_prompt(&self.ctx.property, self.ctx.tenant.as_ref());
        let mut turns = map_history(&history);
        let mut created: Option<TicketId> = None;

        for _round in 0..MAX_MODEL_ROUNDS {
            let turn = self.provider.complete(&system, &turns, &self.catalog.specs()).await?;
            for fragment in &turn.prose {
                self.emitter.emit_text(fragment.clone());
            }
            let Some(invocation) = turn.tool.clone() else {
                // Turn legitimately ended without a tool request.
                return Ok(());
            };
            self.emitter.emit(TriageEvent::ToolCall {
                name: invocation.name.clone(),
                input: invocation.input.clone(),
            });
            turns.push(assistant_turn(&turn, &invocation));

            match self.execute_tool(&invocation, &history, &mut created) {
                ToolOutcome::FollowUp {
                    question,
                } => {
                    self.emitter.emit_status(TriagePhase::GatheringInfo, Some(question.clone()));
                    turns.push(tool_result_turn(
                        &invocation.id,
                        "Follow-up pending. Ask the tenant your follow-up question now.",
                        false,
                    ));
                    self.request_follow_up_prose(&system, &turns, &question).await?;
                    return Ok(());
                }
                ToolOutcome::Classified {
                    detail,
                } => {
                    self.emitter.emit_status(TriagePhase::Triaged, Some(detail));
                    turns.push(tool_result_turn(
                        &invocation.id,
                        "Classification recorded. Now call create_ticket.",
                        false,
                    ));
                }
                ToolOutcome::Created {
                    ticket,
                } => {
                    self.emitter.emit(TriageEvent::TicketCreated {
                        ticket: *ticket,
                    });
                    return Ok(());
                }
                ToolOutcome::Failed {
                    message,
                } => {
                    turns.push(tool_result_turn(&invocation.id, &message, true));
                }
            }
        }
        // Round cap reached: bounded effort, the caller keeps the prose
        // already streamed.
        Ok(())
    }

    /// Issues the compensating round trip that turns the follow-up question
    /// into prose for the tenant.
    ///
    /// Tool invocation and natural-language output are mutually exclusive in
    /// a single turn for the underlying service; this named extra call is how
    /// the question itself reaches the reporter. Any tool requested by the
    /// compensating turn is ignored: the session is ending. When the
    /// compensating turn carries no prose at all, the validated question is
    /// emitted verbatim so the tenant always receives a text frame.
    async fn request_follow_up_prose(
        &self,
        system: &str,
        turns: &[Turn],
        question: &str,
    ) -> Result<(), ProviderError> {
        let turn = self.provider.complete(system, turns, &self.catalog.specs()).await?;
        if turn.prose.is_empty() {
            self.emitter.emit_text(question);
            return Ok(());
        }
        for fragment in &turn.prose {
            self.emitter.emit_text(fragment.clone());
        }
        Ok(())
    }

    /// Validates and executes one tool invocation.
    fn execute_tool(
        &self,
        invocation: &ToolInvocation,
        history: &[ChatMessage],
        created: &mut Option<TicketId>,
    ) -> ToolOutcome {
        let name = match self.catalog.validate(&invocation.name, &invocation.input) {
            Ok(name) => name,
            Err(err) => {
                return ToolOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };
        match name {
            ToolName::ClassifyIssue => match ClassifyIssueInput::from_value(&invocation.input) {
                Ok(input) if input.needs_more_info => ToolOutcome::FollowUp {
                    question: input.follow_up_question.unwrap_or_default(),
                },
                Ok(input) => ToolOutcome::Classified {
                    detail: format!("{} / {}", input.issue_type.as_str(), input.urgency.as_str()),
                },
                Err(err) => ToolOutcome::Failed {
                    message: err.to_string(),
                },
            },
            ToolName::CreateTicket => match CreateTicketInput::from_value(&invocation.input) {
                Ok(input) => self.create_ticket(&input, history, created),
                Err(err) => ToolOutcome::Failed {
                    message: err.to_string(),
                },
            },
        }
    }

    /// Creates the ticket with read-after-write verification.
    ///
    /// The write call's own return value is never trusted as proof of
    /// durability; the record is independently re-read before the terminal
    /// event is emitted.
    fn create_ticket(
        &self,
        input: &CreateTicketInput,
        history: &[ChatMessage],
        created: &mut Option<TicketId>,
    ) -> ToolOutcome {
        // Session-scoped idempotency: a repeated create_ticket returns the
        // existing record instead of double-firing the side effect.
        if let Some(existing) = created.as_ref() {
            return match self.store.get(existing) {
                Ok(ticket) => ToolOutcome::Created {
                    ticket: Box::new(ticket),
                },
                Err(err) => ToolOutcome::Failed {
                    message: ToolError::StoreWrite(err.to_string()).to_string(),
                },
            };
        }

        self.emitter.emit_status(TriagePhase::FindingVendors, None);
        let candidates = self.vendors.search(input.issue_type, &self.ctx.property.zip);

        // Identity comes from the session context; the tool input is
        // advisory and used only when context is absent.
        let (tenant_id, tenant_name, unit) = self.ctx.tenant.as_ref().map_or_else(
            || (TenantId::new(input.tenant_id.clone()), input.tenant_name.clone(), input.unit.clone()),
            |tenant| (tenant.id.clone(), tenant.name.clone(), tenant.unit.clone()),
        );
        let property_id: PropertyId = self.ctx.property.id.clone();

        let now = self.clock.now();
        let ticket = Ticket {
            id: generate_ticket_id(),
            property_id,
            tenant_id,
            tenant_name,
            unit,
            issue_type: input.issue_type,
            urgency: input.urgency,
            summary: input.summary.clone(),
            raw_message: input.raw_message.clone(),
            status: TicketStatus::AwaitingApproval,
            messages: history.to_vec(),
            vendors: candidates,
            selected_vendor: None,
            selected_slot: None,
            created_at: now,
            updated_at: now,
        };

        let id = match self.store.create(ticket) {
            Ok(id) => id,
            Err(err) => {
                return ToolOutcome::Failed {
                    message: ToolError::StoreWrite(err.to_string()).to_string(),
                };
            }
        };

        match self.store.get(&id) {
            Ok(verified) => {
                *created = Some(id);
                ToolOutcome::Created {
                    ticket: Box::new(verified),
                }
            }
            Err(StoreError::NotFound(missing)) => ToolOutcome::Failed {
                message: ToolError::StoreWrite(format!(
                    "created ticket {missing} not readable after write"
                ))
                .to_string(),
            },
            Err(err) => ToolOutcome::Failed {
                message: ToolError::StoreWrite(err.to_string()).to_string(),
            },
        }
    }
}

// ============================================================================
// SECTION: Turn Assembly
// ============================================================================

/// Maps caller-supplied history into the reasoning-service role convention.
fn map_history(history: &[ChatMessage]) -> Vec<Turn> {
    history
        .iter()
        .filter(|message| !message.content.is_empty())
        .map(|message| {
            let role = match message.role {
                SpeakerRole::Tenant => TurnRole::User,
                SpeakerRole::Agent => TurnRole::Assistant,
            };
            Turn::text(role, message.content.clone())
        })
        .collect()
}

/// Builds the assistant turn echoing prose and the tool invocation.
fn assistant_turn(turn: &ModelTurn, invocation: &ToolInvocation) -> Turn {
    let mut content: Vec<ContentBlock> = turn
        .prose
        .iter()
        .map(|text| ContentBlock::Text {
            text: text.clone(),
        })
        .collect();
    content.push(ContentBlock::ToolUse {
        id: invocation.id.clone(),
        name: invocation.name.clone(),
        input: invocation.input.clone(),
    });
    Turn {
        role: TurnRole::Assistant,
        content,
    }
}

/// Builds the user turn carrying a tool result.
fn tool_result_turn(tool_use_id: &str, content: &str, is_error: bool) -> Turn {
    Turn {
        role: TurnRole::User,
        content: vec![ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: content.to_string(),
            is_error,
        }],
    }
}

/// Generates a fresh opaque ticket identifier.
fn generate_ticket_id() -> TicketId {
    let entropy: u64 = rand::thread_rng().r#gen();
    TicketId::new(format!("ticket-{entropy:016x}"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
