use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::config::EngineConfig;
use crate::decision::DecisionPolicy;
use crate::detection::ProtectionClassifier;
use crate::models::{Candidate, ComparisonResult, ProtectionVerdict};
use crate::net::{HttpProbe, IntelLookup, PortProbe, Resolver};
use crate::origin::OriginComparator;
use crate::session::ScanSession;
use super::events::ScanEvent;

/// Network collaborators and the decision policy for one scan.
#[derive(Clone)]
pub struct ScanServices {
    pub http: Arc<dyn HttpProbe>,
    pub intel: Arc<dyn IntelLookup>,
    pub ports: Arc<dyn PortProbe>,
    pub resolver: Arc<dyn Resolver>,
    pub policy: Arc<dyn DecisionPolicy>,
}

/// What a finished (or interrupted) scan hands back to the caller.
#[derive(Debug)]
pub struct ScanOutcome {
    pub session: ScanSession,
    pub interrupted: bool,
    pub stopped_early: bool,
    pub duration_ms: u64,
}

/// Drives classification and comparison over the candidate list and owns
/// the session while the scan runs.
pub struct ScanOrchestrator {
    domain: String,
    classifier: Arc<ProtectionClassifier>,
    comparator: OriginComparator,
    resolver: Arc<dyn Resolver>,
    policy: Arc<dyn DecisionPolicy>,
    concurrency: usize,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<ScanEvent>>,
}

impl ScanOrchestrator {
    pub fn new(domain: impl Into<String>, config: &EngineConfig, services: ScanServices) -> Self {
        let classifier = Arc::new(ProtectionClassifier::new(
            services.http.clone(),
            services.intel,
            services.ports,
        ));
        let comparator = OriginComparator::new(
            config,
            services.http,
            services.resolver.clone(),
            classifier.clone(),
            services.policy.clone(),
        );
        // Prompts cannot interleave, so an interactive policy forces one
        // candidate at a time.
        let concurrency = if services.policy.is_interactive() { 1 } else { config.concurrency.max(1) };
        Self {
            domain: domain.into(),
            classifier,
            comparator,
            resolver: services.resolver,
            policy: services.policy,
            concurrency,
            cancel_token: CancellationToken::new(),
            event_tx: None,
        }
    }

    /// Share a cancel token with the interrupt handler.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<ScanEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Evaluate every candidate once. Duplicates are dropped up front,
    /// keeping first-seen order.
    pub async fn run(&self, candidates: Vec<Candidate>) -> ScanOutcome {
        let start = Instant::now();
        let mut seen = HashSet::new();
        let candidates: Vec<Candidate> = candidates.into_iter().filter(|c| seen.insert(c.clone())).collect();

        let mut session = ScanSession::new(self.domain.clone());
        info!(
            scan_id = %session.scan_id,
            domain = %self.domain,
            candidates = candidates.len(),
            concurrency = self.concurrency,
            "Scan started"
        );
        self.emit(ScanEvent::ScanStarted {
            scan_id: session.scan_id.clone(),
            target: self.domain.clone(),
            candidates: candidates.len(),
        });

        let (interrupted, stopped_early) = if self.concurrency > 1 {
            (self.run_concurrent(candidates, &mut session).await, false)
        } else {
            self.run_sequential(candidates, &mut session).await
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let counters = session.counters();
        info!(
            total = counters.total_subdomains,
            protected = counters.protected_by_waf,
            exposed = counters.potential_real_ips,
            errors = counters.errors,
            interrupted,
            duration_ms,
            "Scan finished"
        );
        self.emit(ScanEvent::ScanCompleted { duration_ms, interrupted });

        ScanOutcome { session, interrupted, stopped_early, duration_ms }
    }

    /// Returns `(interrupted, stopped_early)`.
    async fn run_sequential(&self, candidates: Vec<Candidate>, session: &mut ScanSession) -> (bool, bool) {
        for candidate in candidates {
            if self.cancel_token.is_cancelled() {
                return (true, false);
            }
            let result = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    warn!(candidate = %candidate, "Interrupted while testing candidate");
                    return (true, false);
                }
                result = self.evaluate(&candidate) => result,
            };

            let real_ip = result.real_ip.clone().filter(|_| result.is_exposed());
            self.record(session, result);

            if let Some(ip) = real_ip {
                if self.policy.should_stop_after_exposure(&ip).await {
                    info!(ip = %ip, "Stopping after origin discovery");
                    return (false, true);
                }
            }
        }
        (false, false)
    }

    /// Single writer: results flow back through the stream and only this
    /// loop touches the session. Returns whether the scan was interrupted.
    async fn run_concurrent(&self, candidates: Vec<Candidate>, session: &mut ScanSession) -> bool {
        let mut results = stream::iter(candidates)
            .map(|candidate| async move { self.evaluate(&candidate).await })
            .buffer_unordered(self.concurrency);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    warn!("Interrupted, abandoning in-flight candidates");
                    return true;
                }
                next = results.next() => match next {
                    Some(result) => self.record(session, result),
                    None => return false,
                },
            }
        }
    }

    fn record(&self, session: &mut ScanSession, result: ComparisonResult) {
        if session.record(result.clone()) {
            self.emit(ScanEvent::ResultRecorded { result });
        } else {
            debug!(candidate = %result.candidate, "Duplicate result ignored");
        }
    }

    /// Classify the candidate host first; only unprotected hosts reach the
    /// comparator. IP literals go straight to the comparator, which
    /// classifies the address itself.
    pub async fn evaluate(&self, candidate: &Candidate) -> ComparisonResult {
        self.emit(ScanEvent::CandidateStarted { candidate: candidate.clone() });

        if candidate.ip_literal().is_none() {
            if let ProtectionVerdict::Protected { provider, evidence_ip } =
                self.classifier.classify(candidate.as_str()).await
            {
                let waf_ip = match self.resolver.resolve(candidate.as_str()).await {
                    Ok(ip) => ip.to_string(),
                    Err(e) => {
                        debug!(candidate = %candidate, error = %e, "Cannot resolve protected host");
                        evidence_ip
                    }
                };
                info!(candidate = %candidate, provider = %provider, waf_ip = %waf_ip, "Candidate is behind a protection provider");
                return ComparisonResult::protected(candidate.clone(), waf_ip, provider);
            }
        }

        self.comparator.compare(&self.domain, candidate).await
    }
}
