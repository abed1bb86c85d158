use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use console::{style, Term};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::cli::commands::ScanArgs;
use crate::config::{
    self, parse_header_spec, resolve_credential, CloudmareConfig, DelayRange, EngineConfig,
    ExportFormat, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_INTEL_URL, DEFAULT_SIMILARITY_THRESHOLD, MAX_WAIT_SECS,
};
use crate::decision::{AutoPolicy, DecisionPolicy, FixedPolicy, InteractivePolicy};
use crate::enumeration::{
    self, CandidateSource, CensysSearch, DnsRecords, HostFile, SecurityTrailsSearch, ShodanSearch, StaticHosts,
    WordlistBrute,
};
use crate::errors::{CloudmareError, RetryConfig};
use crate::net::{CheckHostIntel, HickoryResolver, ReqwestProbe, Resolver, TcpPortProbe};
use crate::pipeline::{spawn_interrupt_handler, ScanOrchestrator, ScanServices};
use crate::reporting;
use crate::ui::{print_banner, print_summary, ScanProgress};
use crate::utils::domain::normalize_target;
use crate::utils::formatting::format_duration;

const DEFAULT_OUTPUT_DIR: &str = "data/output";

pub async fn handle_scan(args: ScanArgs, quiet: bool) -> Result<(), CloudmareError> {
    let domain = normalize_target(&args.domain)?;

    let file_config = if let Some(config_path) = &args.config {
        config::parse_config(&PathBuf::from(config_path)).await?
    } else {
        CloudmareConfig::default()
    };

    let engine = build_engine_config(&args, &file_config)?;
    let formats = resolve_formats(&args, &file_config)?;
    let output_dir = PathBuf::from(
        args.output_dir
            .clone()
            .or_else(|| file_config.output.as_ref().and_then(|o| o.directory.clone()))
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
    );

    if !quiet {
        print_banner();
    }
    info!(domain = %domain, "Starting origin discovery");

    let resolver: Arc<dyn Resolver> = Arc::new(HickoryResolver::from_system());
    let sources = build_sources(&args, &file_config, resolver.clone())?;
    if sources.is_empty() {
        return Err(CloudmareError::Config(
            "No candidate source given, cannot continue with tasks (use --host, --host-file, --wordlist, --records, --shodan, --censys or --securitytrails)".into(),
        ));
    }
    let candidates = enumeration::gather(&domain, &sources).await?;

    let policy = choose_policy(&engine);
    if engine.concurrency > 1 && policy.is_interactive() {
        warn!(concurrency = engine.concurrency, "Concurrency needs --auto-force, testing candidates one at a time");
    }
    let services = ScanServices {
        http: Arc::new(ReqwestProbe::new(&engine)?),
        intel: Arc::new(CheckHostIntel::new(engine.intel_url.clone())?),
        ports: Arc::new(TcpPortProbe),
        resolver,
        policy: policy.clone(),
    };

    let cancel_token = CancellationToken::new();
    let interrupt = spawn_interrupt_handler(cancel_token.clone(), policy);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let orchestrator = ScanOrchestrator::new(domain.clone(), &engine, services)
        .with_cancel_token(cancel_token.clone())
        .with_event_channel(event_tx);

    let show_bar = orchestrator.concurrency() > 1 && Term::stderr().is_term();
    let renderer = tokio::spawn(async move {
        let mut progress = ScanProgress::new(show_bar);
        while let Some(event) = event_rx.recv().await {
            progress.handle_event(&event);
        }
    });

    let outcome = orchestrator.run(candidates).await;
    // Dropping the orchestrator closes the event channel.
    drop(orchestrator);
    let _ = renderer.await;
    cancel_token.cancel();
    let _ = interrupt.await;

    if outcome.stopped_early {
        info!("Remaining candidates skipped at operator request");
    }
    print_summary(&outcome.session, &format_duration(outcome.duration_ms), outcome.interrupted);

    let written = reporting::export(&outcome.session, &formats, &output_dir).await?;
    for path in written {
        println!("  {} {}", style("Saved").dim(), path.display());
    }

    Ok(())
}

/// Merge CLI flags over file values over defaults.
pub fn build_engine_config(args: &ScanArgs, file_config: &CloudmareConfig) -> Result<EngineConfig, CloudmareError> {
    let scan = file_config.scan.clone().unwrap_or_default();

    let timeout = args.timeout.or(scan.http_timeout_seconds).unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(CloudmareError::Config(format!("Timeout must be positive, got {}", timeout)));
    }
    if timeout > MAX_WAIT_SECS {
        return Err(CloudmareError::Config(format!(
            "Timeout must not exceed {} seconds, got {}",
            MAX_WAIT_SECS, timeout
        )));
    }
    let http_timeout = Duration::try_from_secs_f64(timeout)
        .map_err(|e| CloudmareError::Config(format!("Invalid timeout {}: {}", timeout, e)))?;

    let threshold = args
        .threshold
        .or(scan.response_similarity_threshold)
        .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CloudmareError::Config(format!("Threshold must be within [0, 1], got {}", threshold)));
    }

    let delay = args
        .delay
        .as_deref()
        .or(scan.delay.as_deref())
        .map(str::parse::<DelayRange>)
        .transpose()?;

    let concurrency = args.concurrency.or(scan.concurrency).unwrap_or(1);
    if concurrency == 0 {
        return Err(CloudmareError::Config("Concurrency must be at least 1".into()));
    }

    let headers = match args.header.as_deref().or(scan.headers.as_deref()) {
        Some(spec) => parse_header_spec(spec)?,
        None => Vec::new(),
    };

    Ok(EngineConfig {
        http_timeout,
        similarity_threshold: threshold,
        delay,
        auto_force: args.auto_force || scan.auto_force.unwrap_or(false),
        concurrency,
        follow_redirects_default: !args.no_follow_redirects && scan.follow_redirects_default.unwrap_or(true),
        user_agent: args.user_agent.clone().or(scan.user_agent),
        random_agent: args.random_agent || scan.random_agent.unwrap_or(false),
        headers,
        intel_url: args
            .intel_url
            .clone()
            .or_else(|| file_config.intel.as_ref().and_then(|i| i.lookup_url.clone()))
            .unwrap_or_else(|| DEFAULT_INTEL_URL.to_string()),
    })
}

fn resolve_formats(args: &ScanArgs, file_config: &CloudmareConfig) -> Result<Vec<ExportFormat>, CloudmareError> {
    match &args.output_formats {
        Some(spec) => ExportFormat::parse_list(spec),
        None => match file_config.output.as_ref().and_then(|o| o.formats.as_ref()) {
            Some(list) => ExportFormat::parse_list(&list.join(",")),
            None => Ok(Vec::new()),
        },
    }
}

/// Candidate sources in a fixed order: explicit hosts, host file, DNS
/// records, wordlist, Shodan, Censys, SecurityTrails.
pub fn build_sources(
    args: &ScanArgs,
    file_config: &CloudmareConfig,
    resolver: Arc<dyn Resolver>,
) -> Result<Vec<Box<dyn CandidateSource>>, CloudmareError> {
    let enumeration = file_config.enumeration.clone().unwrap_or_default();
    let retry = RetryConfig {
        max_retries: file_config
            .retry
            .as_ref()
            .and_then(|r| r.max_retries)
            .unwrap_or(RetryConfig::default().max_retries),
    };
    let mut sources: Vec<Box<dyn CandidateSource>> = Vec::new();

    let hosts = if args.hosts.is_empty() { enumeration.hosts.unwrap_or_default() } else { args.hosts.clone() };
    if !hosts.is_empty() {
        sources.push(Box::new(StaticHosts::new(hosts)));
    }
    if let Some(path) = args.host_file.clone().or(enumeration.host_file) {
        sources.push(Box::new(HostFile::new(path)));
    }
    if args.records || enumeration.records.unwrap_or(false) {
        let mut records = DnsRecords::new(resolver.clone());
        let extensions =
            if args.extensions.is_empty() { enumeration.record_extensions } else { Some(args.extensions.clone()) };
        if let Some(extensions) = extensions {
            records = records.with_extensions(extensions);
        }
        sources.push(Box::new(records));
    }
    if let Some(path) = args.wordlist.clone().or(enumeration.wordlist) {
        sources.push(Box::new(WordlistBrute::new(path, resolver)));
    }
    if let Some(raw) = args.shodan.clone().or(enumeration.shodan_api_key) {
        let key = api_key("Shodan", &raw)?;
        sources.push(Box::new(ShodanSearch::new(key, retry.clone())?));
    }
    if let Some(raw) = args.censys.clone().or(enumeration.censys_api_key) {
        let key = api_key("Censys", &raw)?;
        sources.push(Box::new(CensysSearch::new(&key, retry.clone())?));
    }
    if let Some(raw) = args.securitytrails.clone().or(enumeration.securitytrails_api_key) {
        let key = api_key("SecurityTrails", &raw)?;
        sources.push(Box::new(SecurityTrailsSearch::new(key, retry)?));
    }

    Ok(sources)
}

/// Resolve a `$ENV_VAR` reference; an unset variable is a config error.
fn api_key(service: &str, raw: &str) -> Result<String, CloudmareError> {
    let key = resolve_credential(raw);
    if key.trim().is_empty() || key.starts_with('$') {
        return Err(CloudmareError::Config(format!("{} API key '{}' is not set", service, raw)));
    }
    Ok(key)
}

/// Auto-force never asks. Without a terminal to ask on, fall back to fixed
/// answers that never force a non-200 connection.
fn choose_policy(engine: &EngineConfig) -> Arc<dyn DecisionPolicy> {
    if engine.auto_force {
        Arc::new(AutoPolicy)
    } else if std::io::stdin().is_terminal() && Term::stderr().is_term() {
        Arc::new(InteractivePolicy::new(engine.follow_redirects_default))
    } else {
        warn!("No terminal attached and --auto-force not set, non-200 candidates will not be forced");
        Arc::new(FixedPolicy {
            follow_redirects: engine.follow_redirects_default,
            force_connection: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_config_str;
    use crate::net::RecordKind;
    use async_trait::async_trait;
    use std::net::IpAddr;

    struct NoDns;

    #[async_trait]
    impl Resolver for NoDns {
        async fn resolve(&self, host: &str) -> Result<IpAddr, CloudmareError> {
            Err(CloudmareError::DnsResolution(host.to_string()))
        }

        async fn records(&self, _domain: &str, _kind: RecordKind) -> Result<Vec<String>, CloudmareError> {
            Ok(Vec::new())
        }
    }

    fn args() -> ScanArgs {
        ScanArgs { domain: "example.com".into(), ..Default::default() }
    }

    #[test]
    fn test_defaults_without_file() {
        let engine = build_engine_config(&args(), &CloudmareConfig::default()).unwrap();
        assert_eq!(engine.http_timeout, Duration::from_secs(5));
        assert_eq!(engine.similarity_threshold, 0.9);
        assert!(engine.delay.is_none());
        assert!(!engine.auto_force);
        assert!(engine.follow_redirects_default);
        assert_eq!(engine.intel_url, DEFAULT_INTEL_URL);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_config_str("scan:\n  http_timeout_seconds: 8\n  response_similarity_threshold: 0.7\n  delay: '1'\n").unwrap();
        let mut a = args();
        a.threshold = Some(0.95);
        a.delay = Some("0.5-1".into());
        let engine = build_engine_config(&a, &file).unwrap();
        assert_eq!(engine.http_timeout, Duration::from_secs(8));
        assert_eq!(engine.similarity_threshold, 0.95);
        assert_eq!(engine.delay, Some(DelayRange { min: 0.5, max: 1.0 }));
    }

    #[test]
    fn test_bad_cli_values_rejected() {
        let mut a = args();
        a.delay = Some("later".into());
        assert!(matches!(build_engine_config(&a, &CloudmareConfig::default()), Err(CloudmareError::Config(_))));

        let mut a = args();
        a.header = Some("Host: example.com".into());
        assert!(build_engine_config(&a, &CloudmareConfig::default()).is_err());

        let mut a = args();
        a.concurrency = Some(0);
        assert!(build_engine_config(&a, &CloudmareConfig::default()).is_err());
    }

    #[test]
    fn test_oversized_waits_rejected() {
        let mut a = args();
        a.timeout = Some(1e300);
        assert!(matches!(build_engine_config(&a, &CloudmareConfig::default()), Err(CloudmareError::Config(_))));

        let mut a = args();
        a.delay = Some("1e300".into());
        assert!(matches!(build_engine_config(&a, &CloudmareConfig::default()), Err(CloudmareError::Config(_))));

        let mut a = args();
        a.timeout = Some(3600.0);
        assert_eq!(build_engine_config(&a, &CloudmareConfig::default()).unwrap().http_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_no_sources_requested() {
        let sources = build_sources(&args(), &CloudmareConfig::default(), Arc::new(NoDns)).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_sources_from_flags_and_file() {
        let file = parse_config_str("enumeration:\n  hosts: ['origin.example.com']\n  records: true\n").unwrap();
        let mut a = args();
        a.wordlist = Some("words.txt".into());
        let sources = build_sources(&a, &file, Arc::new(NoDns)).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["hosts", "dns-records", "dns-bruteforce"]);
    }

    #[test]
    fn test_search_sources_in_order() {
        let file = parse_config_str(
            "enumeration:\n  securitytrails_api_key: 'stkey'\n  censys_api_key: 'id:secret'\n  record_extensions: ['.net']\n",
        )
        .unwrap();
        let mut a = args();
        a.shodan = Some("shodankey".into());
        a.records = true;
        let sources = build_sources(&a, &file, Arc::new(NoDns)).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["dns-records", "shodan", "censys", "securitytrails"]);
    }

    #[test]
    fn test_malformed_censys_credential_is_config_error() {
        let mut a = args();
        a.censys = Some("no-separator".into());
        let err = build_sources(&a, &CloudmareConfig::default(), Arc::new(NoDns)).err().unwrap();
        assert!(matches!(err, CloudmareError::Config(_)));
    }

    #[test]
    fn test_unset_shodan_env_is_config_error() {
        let mut a = args();
        a.shodan = Some("$CLOUDMARE_TEST_UNSET_SHODAN_KEY".into());
        let err = build_sources(&a, &CloudmareConfig::default(), Arc::new(NoDns)).err().unwrap();
        assert!(matches!(err, CloudmareError::Config(_)));
    }

    #[test]
    fn test_formats_from_file() {
        let file = parse_config_str("output:\n  formats: ['json', 'txt']\n").unwrap();
        assert_eq!(resolve_formats(&args(), &file).unwrap(), vec![ExportFormat::Json, ExportFormat::Txt]);
        assert!(resolve_formats(&args(), &CloudmareConfig::default()).unwrap().is_empty());
    }
}
