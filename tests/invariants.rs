use std::collections::HashSet;
use cloudmare::models::{Candidate, ComparisonResult, Provider, ScanStatus};
use cloudmare::session::ScanSession;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_result(rng: &mut StdRng) -> ComparisonResult {
    let candidate = Candidate::new(format!("host{}.example.com", rng.gen_range(0..60)));
    match rng.gen_range(0..3) {
        0 => ComparisonResult::protected(candidate, format!("104.16.0.{}", rng.gen_range(1..20)), Provider::Cloudflare),
        1 => ComparisonResult::exposed(candidate, format!("203.0.113.{}", rng.gen_range(1..8)), rng.gen_range(0.91..=1.0)),
        _ => ComparisonResult::error(candidate, "Connection refused", None),
    }
}

#[test]
fn counters_partition_random_result_sequences() {
    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = ScanSession::new("example.com");
        let mut unique = HashSet::new();

        for _ in 0..rng.gen_range(0..120) {
            let result = random_result(&mut rng);
            let fresh = unique.insert(result.candidate.clone());
            assert_eq!(session.record(result), fresh);
        }

        let c = session.counters();
        assert_eq!(c.total_subdomains, unique.len(), "seed {}", seed);
        assert_eq!(c.protected_by_waf + c.potential_real_ips + c.errors, c.total_subdomains, "seed {}", seed);
        assert_eq!(session.results().len(), c.total_subdomains);

        for r in session.results() {
            match r.status {
                ScanStatus::Protected => {
                    assert!(r.real_ip.is_none());
                    assert!(r.waf_ip.is_some() && r.provider.is_some());
                }
                ScanStatus::Exposed => {
                    assert!(r.real_ip.is_some());
                    assert!(r.waf_ip.is_none());
                }
                ScanStatus::Error => assert!(r.real_ip.is_none() && r.cause.is_some()),
            }
        }

        let ips = session.real_ips();
        let distinct: HashSet<_> = ips.iter().collect();
        assert_eq!(distinct.len(), ips.len(), "real IPs must be unique");
        assert_eq!(session.summary().counters, c);
    }
}
