//! # Interchain Query Service
//!
//! Application service orchestrating query submission, response
//! verification, timeout handling and callback dispatch.
//!
//! ## Response flow
//!
//! ```text
//! validate_basic → ledger lookup ─(absent)→ Ok, no-op
//!                       │
//!                 verify_key_proof → delete query → query_response event
//!                       │
//!              empty result ─→ Ok
//!                       │
//!              timeout decision ─(reject)→ Ok
//!                       │          └(retry)→ re-submit under fresh id
//!                  dispatch callback
//! ```
//!
//! Each API call is one atomic step. Any error rolls back every write of
//! the step, the query deletion included, and drops its events.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::context::Context;
use super::ledger;
use super::registry::CallbackRegistry;
use crate::algorithms::{generate_query_id, timeout_decision, verify_key_proof, TimeoutDecision};
use crate::config::InterchainQueryConfig;
use crate::domain::{
    invariant_connection_id, IcqError, MsgSubmitQueryResponse, MsgSubmitQueryResponseResponse,
    Query, QueryEvent, TimeoutPolicy,
};
use crate::ports::inbound::InterchainQueryApi;
use crate::ports::outbound::{ClientResolver, CommitmentVerifier, EventSink};

/// Interchain Query Service.
pub struct InterchainQueryService {
    /// Configuration.
    config: InterchainQueryConfig,
    /// Connection and light-client lookups.
    clients: Arc<dyn ClientResolver>,
    /// Merkle proof engine.
    commitments: Arc<dyn CommitmentVerifier>,
    /// Destination of committed events.
    events: Arc<dyn EventSink>,
    /// Callback modules.
    callbacks: CallbackRegistry,
}

impl InterchainQueryService {
    /// Create a new service. Fails if `config` does not validate.
    pub fn new(
        config: InterchainQueryConfig,
        clients: Arc<dyn ClientResolver>,
        commitments: Arc<dyn CommitmentVerifier>,
        events: Arc<dyn EventSink>,
        callbacks: CallbackRegistry,
    ) -> Result<Self, IcqError> {
        config.validate()?;
        info!(
            modules = ?callbacks.module_names(),
            max_proof_ops = config.max_proof_ops,
            "[qc-15] Interchain query service ready"
        );
        Ok(Self {
            config,
            clients,
            commitments,
            events,
            callbacks,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &InterchainQueryConfig {
        &self.config
    }

    /// Registered callback modules.
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Stateless and registry checks on a query about to be stored.
    pub fn validate_query(&self, query: &Query) -> Result<(), IcqError> {
        if query.chain_id.trim().is_empty() {
            return Err(IcqError::InvalidQuery("chain-id cannot be empty".to_string()));
        }
        invariant_connection_id(&query.connection_id)?;
        if query.query_type.trim().is_empty() {
            return Err(IcqError::InvalidQuery("query type cannot be empty".to_string()));
        }
        if query.request_data.len() > self.config.max_request_data_len {
            return Err(IcqError::InvalidQuery(format!(
                "request data is {} bytes, at most {} allowed",
                query.request_data.len(),
                self.config.max_request_data_len
            )));
        }
        if query.callback_module.is_empty() {
            return Err(IcqError::InvalidQuery(
                "callback module must be specified".to_string(),
            ));
        }
        if !query.callback_id.is_empty() {
            if !self.callbacks.is_registered(&query.callback_module) {
                return Err(IcqError::InvalidQuery(format!(
                    "no callback handler registered for module ({})",
                    query.callback_module
                )));
            }
            if !self
                .callbacks
                .module_claims(&query.callback_module, &query.callback_id)
            {
                return Err(IcqError::InvalidQuery(format!(
                    "callback-id ({}) is not registered for module ({})",
                    query.callback_id, query.callback_module
                )));
            }
        }
        if query.timeout_duration == 0 {
            return Err(IcqError::InvalidQuery("timeout duration must be set".to_string()));
        }
        if query.timeout_duration > self.config.max_timeout_duration_nanos {
            return Err(IcqError::InvalidQuery(format!(
                "timeout duration {}ns exceeds maximum {}ns",
                query.timeout_duration, self.config.max_timeout_duration_nanos
            )));
        }
        if query.policy()? == TimeoutPolicy::Unspecified {
            return Err(IcqError::InvalidQuery(
                "timeout policy must be specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Store a new query and emit its request event.
    ///
    /// Assigns the id, the submission height (latest height of the
    /// connection's light client) and the deadline.
    fn submit_query_in(
        &self,
        ctx: &mut Context<'_>,
        mut query: Query,
        force_unique: bool,
    ) -> Result<String, IcqError> {
        self.validate_query(&query)?;

        let connection = self.clients.connection(&query.connection_id).ok_or_else(|| {
            IcqError::InvalidQuery(format!("connection ({}) not found", query.connection_id))
        })?;
        let client_state = self.clients.client_state(&connection.client_id).ok_or_else(|| {
            IcqError::InvalidQuery(format!(
                "client state not found for client ({})",
                connection.client_id
            ))
        })?;

        query.submission_height = client_state.latest_height().revision_height;
        query.timeout_timestamp = ctx
            .block_time_nanos()
            .checked_add(query.timeout_duration)
            .ok_or_else(|| IcqError::InvalidQuery("timeout timestamp overflows".to_string()))?;
        query.request_sent = false;

        let uid = if force_unique {
            Some(ledger::next_query_uid(ctx.store_mut())?)
        } else {
            None
        };
        query.id = generate_query_id(&query.query_key(), uid);

        ledger::set_query(ctx.store_mut(), &query)?;
        let height = ctx.block_height();
        ctx.emit_event(QueryEvent::request(&query, height));

        info!(
            query_id = %query.id,
            chain_id = %query.chain_id,
            local_chain = %ctx.chain_id(),
            callback_id = %query.callback_id,
            submission_height = query.submission_height,
            "[qc-15] Queued ICQ request"
        );

        Ok(query.id)
    }

    /// Re-issue a timed-out query under a fresh id.
    fn retry_query_request(&self, ctx: &mut Context<'_>, query: &Query) -> Result<(), IcqError> {
        info!(query_id = %query.id, "[qc-15] Retrying ICQ request");

        ledger::delete_query(ctx.store_mut(), &query.id)?;
        let new_id = self.submit_query_in(ctx, query.clone(), true)?;
        debug!(old_id = %query.id, new_id = %new_id, "[qc-15] ICQ re-submitted");
        Ok(())
    }

    /// Apply the timeout policy to a late response, then dispatch if due.
    fn handle_query_timeout(
        &self,
        ctx: &mut Context<'_>,
        query: &Query,
        result: &[u8],
    ) -> Result<(), IcqError> {
        match timeout_decision(query, ctx.block_time_nanos())? {
            TimeoutDecision::NotExpired => self.callbacks.dispatch(ctx, query, result),
            TimeoutDecision::Reject => {
                info!(
                    query_id = %query.id,
                    deadline = query.timeout_timestamp,
                    "[qc-15] ICQ response rejected after timeout"
                );
                Ok(())
            }
            TimeoutDecision::Retry => self.retry_query_request(ctx, query),
            TimeoutDecision::ExecuteCallback => {
                info!(query_id = %query.id, "[qc-15] Executing callback of timed-out ICQ");
                self.callbacks.dispatch(ctx, query, result)
            }
        }
    }

    /// Process a response inside an atomic step.
    fn handle_query_response(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgSubmitQueryResponse,
    ) -> Result<(), IcqError> {
        msg.validate_basic()?;

        let query = match ledger::get_query(ctx.store(), &msg.query_id)? {
            Some(query) => query,
            None => {
                info!(
                    query_id = %msg.query_id,
                    "[qc-15] ICQ response ignored: query not found (already processed or never issued)"
                );
                return Ok(());
            }
        };

        verify_key_proof(
            self.clients.as_ref(),
            self.commitments.as_ref(),
            self.config.max_proof_ops,
            &query,
            msg,
        )?;

        // Deleted before dispatch: a callback never sees its own query pending.
        ledger::delete_query(ctx.store_mut(), &query.id)?;
        let height = ctx.block_height();
        ctx.emit_event(QueryEvent::response(&query, height));

        if msg.result.is_empty() {
            debug!(query_id = %query.id, "[qc-15] Contentless ICQ response");
            return Ok(());
        }

        self.handle_query_timeout(ctx, &query, &msg.result)
    }

    fn publish_events(&self, ctx: &Context<'_>, from: usize) {
        for event in ctx.events().iter().skip(from) {
            self.events.emit(event.clone());
        }
    }
}

impl InterchainQueryApi for InterchainQueryService {
    fn submit_query(
        &self,
        ctx: &mut Context<'_>,
        query: Query,
        force_unique: bool,
    ) -> Result<String, IcqError> {
        let before = ctx.events().len();
        let id = ctx.run_atomic(|branch| self.submit_query_in(branch, query, force_unique))?;
        self.publish_events(ctx, before);
        Ok(id)
    }

    fn submit_query_response(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgSubmitQueryResponse,
    ) -> Result<MsgSubmitQueryResponseResponse, IcqError> {
        let before = ctx.events().len();
        match ctx.run_atomic(|branch| self.handle_query_response(branch, &msg)) {
            Ok(()) => {
                self.publish_events(ctx, before);
                Ok(MsgSubmitQueryResponseResponse {})
            }
            Err(e) => {
                warn!(
                    query_id = %msg.query_id,
                    chain_id = %msg.chain_id,
                    local_chain = %ctx.chain_id(),
                    error = %e,
                    "[qc-15] ICQ response rejected"
                );
                Err(e)
            }
        }
    }

    fn get_query(&self, ctx: &Context<'_>, query_id: &str) -> Result<Option<Query>, IcqError> {
        ledger::get_query(ctx.store(), query_id)
    }

    fn pending_queries(&self, ctx: &Context<'_>) -> Result<Vec<Query>, IcqError> {
        ledger::all_queries(ctx.store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryClientRegistry, InMemoryKvStore, RecordingEventSink};
    use crate::domain::{
        CallbackError, ClientState, ConsensusState, Height, MerklePath, ProofOps,
        ProofSpec, QueryBuilder, TendermintClientState, TimeoutPolicy,
    };
    use crate::domain::{CommitmentError, CommitmentRoot};
    use crate::ports::outbound::QueryCallbacks;
    use parking_lot::Mutex;

    /// Accepts every proof.
    struct TrustingVerifier;

    impl CommitmentVerifier for TrustingVerifier {
        fn verify_membership(
            &self,
            _: &[ProofSpec],
            _: &CommitmentRoot,
            _: &MerklePath,
            _: &ProofOps,
            _: &[u8],
        ) -> Result<(), CommitmentError> {
            Ok(())
        }

        fn verify_non_membership(
            &self,
            _: &[ProofSpec],
            _: &CommitmentRoot,
            _: &MerklePath,
            _: &ProofOps,
        ) -> Result<(), CommitmentError> {
            Ok(())
        }
    }

    /// Records the results it was called with; fails on `fail`.
    struct RecordingCallbacks {
        calls: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    }

    impl QueryCallbacks for RecordingCallbacks {
        fn has_callback(&self, callback_id: &str) -> bool {
            callback_id == "record" || callback_id == "fail"
        }

        fn call(
            &self,
            ctx: &mut Context<'_>,
            callback_id: &str,
            result: &[u8],
            query: &Query,
        ) -> Result<(), CallbackError> {
            // The triggering query is already gone.
            assert!(ledger::get_query(ctx.store(), &query.id)?.is_none());
            ctx.store_mut().put(b"callback/ran", result)?;
            if callback_id == "fail" {
                return Err("callback failed".into());
            }
            self.calls.lock().push((query.id.clone(), result.to_vec()));
            Ok(())
        }
    }

    struct Harness {
        service: InterchainQueryService,
        sink: Arc<RecordingEventSink>,
        calls: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        store: InMemoryKvStore,
    }

    fn harness() -> Harness {
        let clients = InMemoryClientRegistry::new();
        clients.add_connection("connection-0", "07-tendermint-0");
        clients.set_client_state(
            "07-tendermint-0",
            ClientState::Tendermint(TendermintClientState {
                chain_id: "gaia-4".to_string(),
                latest_height: Height::new(4, 20),
                proof_specs: ProofSpec::sdk_specs(),
            }),
        );
        for h in 0..200 {
            clients.set_consensus_state(
                "07-tendermint-0",
                Height::new(4, h),
                ConsensusState::Tendermint(crate::domain::TendermintConsensusState {
                    root: CommitmentRoot::default(),
                    timestamp_nanos: 0,
                }),
            );
        }

        let calls = Arc::new(Mutex::new(Vec::new()));
        let callbacks = CallbackRegistry::builder()
            .register(
                "recorder",
                Box::new(RecordingCallbacks {
                    calls: calls.clone(),
                }),
            )
            .unwrap()
            .build();
        let sink = Arc::new(RecordingEventSink::new());
        let service = InterchainQueryService::new(
            InterchainQueryConfig::for_testing(),
            Arc::new(clients),
            Arc::new(TrustingVerifier),
            sink.clone(),
            callbacks,
        )
        .unwrap();
        Harness {
            service,
            sink,
            calls,
            store: InMemoryKvStore::new(),
        }
    }

    fn new_query(callback_id: &str, policy: TimeoutPolicy) -> Query {
        QueryBuilder::new("gaia-4", "connection-0", "store/bank/key")
            .request_data(b"balances/alice".to_vec())
            .callback("recorder", callback_id)
            .timeout_policy(policy)
            .timeout_duration(1_000)
            .build()
    }

    fn response(query_id: &str, result: &[u8], height: i64) -> MsgSubmitQueryResponse {
        MsgSubmitQueryResponse {
            chain_id: "gaia-4".to_string(),
            query_id: query_id.to_string(),
            result: result.to_vec(),
            proof_ops: Some(ProofOps {
                ops: vec![crate::domain::ProofOp {
                    field_type: "ics23:iavl".to_string(),
                    key: b"balances/alice".to_vec(),
                    data: vec![],
                }],
            }),
            height,
            from_address: "relayer".to_string(),
        }
    }

    #[test]
    fn test_submit_query_assigns_fields() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();

        let stored = h.service.get_query(&ctx, &id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.submission_height, 20);
        assert_eq!(stored.timeout_timestamp, 11_000);
        assert!(matches!(h.sink.events()[0], QueryEvent::QueryRequest { .. }));
    }

    #[test]
    fn test_submit_query_validation() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);

        let mut bad_connection = new_query("record", TimeoutPolicy::RejectQueryResponse);
        bad_connection.connection_id = "channel-0".to_string();
        let mut unclaimed = new_query("record", TimeoutPolicy::RejectQueryResponse);
        unclaimed.callback_id = "unknown".to_string();
        let mut unregistered = new_query("record", TimeoutPolicy::RejectQueryResponse);
        unregistered.callback_module = "nobody".to_string();
        let mut no_timeout = new_query("record", TimeoutPolicy::RejectQueryResponse);
        no_timeout.timeout_duration = 0;
        let mut too_long = new_query("record", TimeoutPolicy::RejectQueryResponse);
        too_long.timeout_duration = u64::MAX;
        let mut empty_type = new_query("record", TimeoutPolicy::RejectQueryResponse);
        empty_type.query_type.clear();
        let mut huge_request = new_query("record", TimeoutPolicy::RejectQueryResponse);
        huge_request.request_data = vec![0u8; 1024];
        let unspecified_policy = new_query("record", TimeoutPolicy::Unspecified);

        for query in [
            bad_connection,
            unclaimed,
            unregistered,
            no_timeout,
            too_long,
            empty_type,
            huge_request,
            unspecified_policy,
        ] {
            let err = h.service.submit_query(&mut ctx, query, false).unwrap_err();
            assert!(matches!(err, IcqError::InvalidQuery(_)), "{err}");
        }
        assert!(h.service.pending_queries(&ctx).unwrap().is_empty());
        assert!(h.sink.is_empty());
    }

    #[test]
    fn test_unknown_connection_rejected_at_submission() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let mut query = new_query("record", TimeoutPolicy::RejectQueryResponse);
        query.connection_id = "connection-7".to_string();
        assert!(h.service.submit_query(&mut ctx, query, false).is_err());
    }

    #[test]
    fn test_force_unique_ids_differ() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let query = new_query("record", TimeoutPolicy::RejectQueryResponse);
        let plain = h.service.submit_query(&mut ctx, query.clone(), false).unwrap();
        let again = h.service.submit_query(&mut ctx, query.clone(), false).unwrap();
        let unique = h.service.submit_query(&mut ctx, query, true).unwrap();
        assert_eq!(plain, again);
        assert_ne!(plain, unique);
        assert_eq!(h.service.pending_queries(&ctx).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_query_is_noop() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let out = h
            .service
            .submit_query_response(&mut ctx, response("missing", b"x", 30))
            .unwrap();
        assert_eq!(out, MsgSubmitQueryResponseResponse {});
        assert!(h.sink.is_empty());
        drop(ctx);
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_invalid_message_rejected_before_lookup() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let mut msg = response("missing", b"x", 30);
        msg.from_address.clear();
        assert!(matches!(
            h.service.submit_query_response(&mut ctx, msg),
            Err(IcqError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = InterchainQueryConfig::for_testing();
        config.max_proof_ops = 0;
        let result = InterchainQueryService::new(
            config,
            Arc::new(InMemoryClientRegistry::new()),
            Arc::new(TrustingVerifier),
            Arc::new(RecordingEventSink::new()),
            CallbackRegistry::builder().build(),
        );
        match result {
            Err(IcqError::Config(err)) => assert!(err.to_string().contains("max_proof_ops")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("invalid config accepted"),
        }
    }

    #[test]
    fn test_on_time_response_dispatches_and_deletes() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();

        h.service
            .submit_query_response(&mut ctx, response(&id, b"42", 30))
            .unwrap();

        assert!(h.service.get_query(&ctx, &id).unwrap().is_none());
        assert_eq!(h.calls.lock().as_slice(), &[(id.clone(), b"42".to_vec())]);
        assert!(matches!(h.sink.events()[1], QueryEvent::QueryResponse { .. }));

        // Duplicate submission is a no-op.
        h.service
            .submit_query_response(&mut ctx, response(&id, b"42", 30))
            .unwrap();
        assert_eq!(h.calls.lock().len(), 1);
    }

    #[test]
    fn test_contentless_response_skips_dispatch() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();

        h.service
            .submit_query_response(&mut ctx, response(&id, b"", 30))
            .unwrap();
        assert!(h.service.get_query(&ctx, &id).unwrap().is_none());
        assert!(h.calls.lock().is_empty());
    }

    #[test]
    fn test_stale_proof_rolls_back() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();

        // Submission height is 20.
        let err = h
            .service
            .submit_query_response(&mut ctx, response(&id, b"42", 20))
            .unwrap_err();
        assert!(matches!(err, IcqError::InvalidProof(_)));
        assert!(h.service.get_query(&ctx, &id).unwrap().is_some());
        assert_eq!(h.sink.len(), 1);
    }

    #[test]
    fn test_callback_failure_rolls_back_deletion() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("fail", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();

        let err = h
            .service
            .submit_query_response(&mut ctx, response(&id, b"42", 30))
            .unwrap_err();
        assert!(matches!(err, IcqError::CallbackFailed { .. }));
        assert!(h.service.get_query(&ctx, &id).unwrap().is_some());
        assert_eq!(ctx.store().get(b"callback/ran").unwrap(), None);
        assert_eq!(h.sink.len(), 1);
    }

    #[test]
    fn test_timeout_reject() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();
        drop(ctx);

        let mut late = Context::new(&mut h.store, "stride-1", 6, 11_001);
        h.service
            .submit_query_response(&mut late, response(&id, b"42", 30))
            .unwrap();
        assert!(h.calls.lock().is_empty());
        assert!(h.service.pending_queries(&late).unwrap().is_empty());
    }

    #[test]
    fn test_timeout_retry_creates_one_new_query() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RetryQueryRequest), false)
            .unwrap();
        drop(ctx);

        let mut late = Context::new(&mut h.store, "stride-1", 6, 20_000);
        h.service
            .submit_query_response(&mut late, response(&id, b"42", 30))
            .unwrap();

        assert!(h.calls.lock().is_empty());
        let pending = h.service.pending_queries(&late).unwrap();
        assert_eq!(pending.len(), 1);
        let retried = &pending[0];
        assert_ne!(retried.id, id);
        assert_eq!(retried.timeout_timestamp, 21_000);
        assert_eq!(retried.request_data, b"balances/alice".to_vec());
        assert_eq!(retried.callback_id, "record");
    }

    #[test]
    fn test_timeout_execute_callback() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::ExecuteQueryCallback), false)
            .unwrap();
        drop(ctx);

        let mut late = Context::new(&mut h.store, "stride-1", 6, 20_000);
        h.service
            .submit_query_response(&mut late, response(&id, b"late", 30))
            .unwrap();
        assert_eq!(h.calls.lock().as_slice(), &[(id, b"late".to_vec())]);
    }

    #[test]
    fn test_corrupt_policy_rolls_back() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let id = h
            .service
            .submit_query(&mut ctx, new_query("record", TimeoutPolicy::RejectQueryResponse), false)
            .unwrap();
        let mut stored = h.service.get_query(&ctx, &id).unwrap().unwrap();
        stored.timeout_policy = 9;
        ledger::set_query(ctx.store_mut(), &stored).unwrap();
        drop(ctx);

        let mut late = Context::new(&mut h.store, "stride-1", 6, 20_000);
        let err = h
            .service
            .submit_query_response(&mut late, response(&id, b"42", 30))
            .unwrap_err();
        assert!(matches!(err, IcqError::UnsupportedTimeoutPolicy(9)));
        assert!(h.service.get_query(&late, &id).unwrap().is_some());
    }

    #[test]
    fn test_non_key_query_skips_proof() {
        let mut h = harness();
        let mut ctx = Context::new(&mut h.store, "stride-1", 5, 10_000);
        let mut query = new_query("record", TimeoutPolicy::RejectQueryResponse);
        query.query_type = "cosmos.staking.v1beta1.Query/Delegation".to_string();
        let id = h.service.submit_query(&mut ctx, query, false).unwrap();

        let mut msg = response(&id, b"7", 0);
        msg.proof_ops = None;
        h.service.submit_query_response(&mut ctx, msg).unwrap();
        assert_eq!(h.calls.lock().len(), 1);
    }
}
