use kbassist::data_models::Document;
use kbassist::query_engine::{QueryEngine, ScoringParams, UNTITLED, excerpt};

mod common;
use common::doc;

fn engine() -> QueryEngine {
    QueryEngine::default()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_printer_offline_scenario() {
    let d = doc(
        "https://kb.example.com/kb/printer-offline",
        "Printer offline",
        "If the receipt printer shows printer offline, check the cable. Restart the printer.",
    );

    let score = engine().score("printer offline", &d);

    let expected = 3.5f64.sqrt() + 1.5f64.sqrt() + 1.2;
    assert!(approx(score, expected), "got {score}, expected {expected}");

    let snippets = engine().select_top_k("printer offline", &[d], 1);
    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].url, "https://kb.example.com/kb/printer-offline");
    assert_eq!(snippets[0].title, "Printer offline");
}

#[test]
fn test_phrase_bonus_needs_multiple_terms_and_contiguity() {
    let d = doc("u", "", "offline printer");
    let split = engine().score("printer offline", &d);
    assert!(approx(split, 1.5f64.sqrt() * 2.0));

    let single = engine().score("printer", &doc("u", "", "printer"));
    assert!(approx(single, 1.5f64.sqrt()));
}

#[test]
fn test_scoring_is_case_insensitive() {
    let d = doc("u", "", "KDS Menu Sync");
    assert!(approx(
        engine().score("kds MENU sync", &d),
        3.0 * 1.5f64.sqrt() + 1.2
    ));
}

#[test]
fn test_score_monotone_in_occurrences() {
    let mut previous = 0.0;
    for count in 0..12 {
        let text = vec!["printer"; count].join(" filler ");
        let score = engine().score("printer", &doc("u", "", &text));
        assert!(score >= previous, "count {count}: {score} < {previous}");
        if count > 0 {
            assert!(score > 0.0);
        }
        previous = score;
    }
}

#[test]
fn test_hits_have_diminishing_returns() {
    let one = engine().score("sync", &doc("u", "", "sync"));
    let two = engine().score("sync", &doc("u", "", "sync sync"));
    let three = engine().score("sync", &doc("u", "", "sync sync sync"));
    assert!(two - one > three - two);
    assert!(three - two > 0.0);
}

#[test]
fn test_no_matching_token_returns_empty() {
    let docs = vec![
        doc("a", "A", "printers and receipts"),
        doc("b", "B", "payments terminal"),
    ];
    assert!(engine().select_top_k("zebra unicorn", &docs, 6).is_empty());
}

#[test]
fn test_empty_question_returns_empty() {
    let docs = vec![doc("a", "A", "printers")];
    assert!(engine().select_top_k("", &docs, 6).is_empty());
    assert!(engine().select_top_k("   \t ", &docs, 6).is_empty());
}

#[test]
fn test_empty_cache_returns_empty() {
    let docs: Vec<Document> = Vec::new();
    assert!(engine().select_top_k("anything", &docs, 6).is_empty());
}

#[test]
fn test_never_more_than_k_and_never_zero_scores() {
    let docs: Vec<Document> = (0..20)
        .map(|i| {
            let text = if i % 3 == 0 { "no match here" } else { "network router network" };
            doc(&format!("https://kb/{i}"), "", text)
        })
        .collect();

    for k in 0..15 {
        let snippets = engine().select_top_k("network", &docs, k);
        assert!(snippets.len() <= k);
        for s in &snippets {
            let source = docs.iter().find(|d| d.url == s.url).unwrap();
            assert!(engine().score("network", source) > 0.0);
        }
    }
}

#[test]
fn test_ranked_by_score_descending() {
    let docs = vec![
        doc("low", "", "printer"),
        doc("high", "", "printer offline printer printer"),
        doc("mid", "", "printer printer"),
    ];
    let urls: Vec<String> = engine()
        .select_top_k("printer offline", &docs, 6)
        .into_iter()
        .map(|s| s.url)
        .collect();
    assert_eq!(urls, vec!["high", "mid", "low"]);
}

#[test]
fn test_equal_scores_keep_cache_order() {
    let docs = vec![
        doc("first", "", "wifi setup"),
        doc("second", "", "setup wifi"),
        doc("third", "", "nothing"),
        doc("fourth", "", "wifi and setup"),
    ];
    let urls: Vec<String> = engine()
        .select_top_k("wifi", &docs, 6)
        .into_iter()
        .map(|s| s.url)
        .collect();
    assert_eq!(urls, vec!["first", "second", "fourth"]);
}

#[test]
fn test_excerpt_budget() {
    let budget = ScoringParams::default().excerpt_chars;
    for len in [0, 1, 10, budget - 1, budget, budget + 1, budget * 3] {
        let text = "é".repeat(len);
        let out = excerpt(&text, budget);
        assert!(out.chars().count() <= budget, "len {len}");
        assert_eq!(out.ends_with('…'), len > budget, "len {len}");
    }
}

#[test]
fn test_snippet_excerpt_and_title() {
    let long = format!("printer {}", "x".repeat(2_000));
    let docs = vec![doc("https://kb/long", "", &long)];
    let snippets = engine().select_top_k("printer", &docs, 1);
    assert_eq!(snippets[0].title, UNTITLED);
    assert_eq!(snippets[0].excerpt.chars().count(), 500);
    assert!(snippets[0].excerpt.starts_with("printer xxx"));
    assert!(snippets[0].excerpt.ends_with('…'));
}

#[test]
fn test_custom_params() {
    let engine = QueryEngine::new(ScoringParams {
        occurrence_offset: 0.0,
        phrase_bonus: 10.0,
        excerpt_chars: 5,
    });
    let d = doc("u", "", "card reader offline");
    assert!(approx(engine.score("card reader", &d), 2.0 + 10.0));
    let snippets = engine.select_top_k("card", &[d], 1);
    assert_eq!(snippets[0].excerpt, "card…");
}
