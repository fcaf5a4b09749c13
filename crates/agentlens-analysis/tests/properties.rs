use agentlens_analysis::{aggregate, analyze_tool, detect, spearman, AnalysisConfig, InterventionConfig};
use agentlens_core::{parse_timestamp, Event, EventKind, ToolBundle};
use proptest::prelude::*;
use serde_json::json;
use time::Duration;

fn arb_event() -> impl Strategy<Value = Event> {
    (0..3u8, "[a-z]{0,6}", any::<bool>(), proptest::option::of(0..500i64)).prop_map(
        |(kind, actor, is_agent, hours)| {
            let kind = match kind {
                0 => EventKind::Commit,
                1 => EventKind::Comment,
                _ => EventKind::Review,
            };
            let base = parse_timestamp("2024-01-01T00:00:00Z");
            let ts = hours.and_then(|h| base.map(|b| b + Duration::hours(h)));
            Event::new(kind, actor.as_str(), is_agent, ts)
        },
    )
}

proptest! {
    #[test]
    fn attribution_partitions(events in prop::collection::vec(arb_event(), 0..40)) {
        let s = aggregate(&events);
        prop_assert_eq!(s.agent_count + s.human_count, s.total);
        prop_assert_eq!(s.total, events.len());
        prop_assert!((0.0..=100.0).contains(&s.agent_percentage));
        prop_assert!(s.top_human_identities.len() <= 10);
    }

    #[test]
    fn interventions_bounded(events in prop::collection::vec(arb_event(), 0..40), window in 0.0..200.0f64) {
        let cfg = InterventionConfig { window_hours: window, count_inverse: false };
        let r = detect("x", &events, &cfg);
        prop_assert_eq!(r.total_events, events.len());
        prop_assert!(r.intervention_count <= events.len().saturating_sub(1));
        prop_assert!((0.0..=1.0).contains(&r.intervention_rate));
    }

    #[test]
    fn wider_window_never_counts_less(events in prop::collection::vec(arb_event(), 0..30)) {
        let narrow = InterventionConfig { window_hours: 5.0, count_inverse: false };
        let wide = InterventionConfig { window_hours: 72.0, count_inverse: false };
        prop_assert!(detect("x", &events, &narrow).intervention_count <= detect("x", &events, &wide).intervention_count);
    }

    #[test]
    fn spearman_in_range(pairs in prop::collection::vec((0..20i32, 0..20i32), 3..25)) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.iter().map(|&(a, b)| (a as f64, b as f64)).unzip();
        if let Ok((rho, p)) = spearman(&x, &y) {
            prop_assert!((-1.0..=1.0).contains(&rho));
            prop_assert!((0.0..=1.0).contains(&p));
            let (rho2, p2) = spearman(&y, &x).unwrap();
            prop_assert!((rho - rho2).abs() < 1e-12);
            prop_assert!((p - p2).abs() < 1e-12);
        }
    }

    #[test]
    fn full_pass_is_deterministic(
        commits in prop::collection::vec((1..6u32, "[a-z]{1,6}", any::<bool>(), 0..100i64), 0..25),
        comments in prop::collection::vec((1..6u32, "[a-z]{1,6}", any::<bool>(), 0..100i64), 0..25),
    ) {
        let mut bundle = ToolBundle::new("prop");
        bundle.pull_requests = (1..6u32)
            .map(|id| json!({"id": id, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
                             "merged_at": format!("2024-01-0{}T00:00:00Z", id + 1)}))
            .collect();
        for (pr, login, bot, h) in commits {
            let login = if bot { format!("{login}[bot]") } else { login };
            let date = format!("2024-01-01T{:02}:00:00Z", h % 24);
            bundle.commits.insert(&format!("{pr}.json"), json!([
                {"author": {"login": login}, "commit": {"author": {"name": "x", "date": date}}}
            ]));
        }
        for (pr, login, bot, h) in comments {
            let login = if bot { format!("{login}[bot]") } else { login };
            let date = format!("2024-01-01T{:02}:30:00Z", h % 24);
            bundle.comments.insert(&format!("{pr}"), json!([{"user": {"login": login}, "created_at": date}]));
        }
        let cfg = AnalysisConfig::default();
        let a = analyze_tool(&bundle, &cfg).unwrap();
        let b = analyze_tool(&bundle, &cfg).unwrap();
        prop_assert_eq!(&a, &b);
        for e in &a.entities {
            prop_assert_eq!(e.overall.agent_count + e.overall.human_count, e.overall.total);
        }
    }
}

#[test]
fn perfect_monotone_sample() {
    let (rho, p) = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
    assert_eq!(rho, 1.0);
    assert!(p < 0.05);
}
