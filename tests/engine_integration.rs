//! End-to-end engine tests over in-memory sources and mock providers.

use std::sync::Arc;

use alignment::testing::{MockChat, MockEmbedder, MockSource};
use alignment::{
    AlignmentConfig, AlignmentEngine, LocalizedTerm, MemorySource, NewsCandidate, PolicyCandidate,
    Term,
};

fn paragraph(id: i64, text: &str, topic: Option<&str>) -> PolicyCandidate {
    PolicyCandidate {
        id,
        report_id: 1,
        text: text.to_string(),
        source: "pboc".to_string(),
        topic: topic.map(str::to_string),
        section_title: Some("物价形势".to_string()),
        report_title: Some("货币政策执行报告".to_string()),
        report_date: Some("2026-06-30".to_string()),
    }
}

fn article(id: i64, title: &str, label: &str) -> NewsCandidate {
    NewsCandidate {
        id,
        title: title.to_string(),
        summary: Some("Inflation data and central bank policy outlook".to_string()),
        source: "Reuters".to_string(),
        url: format!("https://example.com/{id}"),
        published_date: recent_date(3),
        sentiment_label: Some(label.to_string()),
        sentiment_confidence: Some(0.85),
    }
}

fn recent_date(days_ago: i64) -> String {
    (chrono::Utc::now() - chrono::Duration::days(days_ago))
        .format("%Y-%m-%d")
        .to_string()
}

fn rule_only_config(min_final_score: f64) -> AlignmentConfig {
    let mut config = AlignmentConfig::default();
    config.rule.weight = 1.0;
    config.vector.enabled = false;
    config.llm.enabled = false;
    config.global.min_final_score = min_final_score;
    config
}

/// A Chinese-only policy paragraph must be accepted for an English term
/// through its localized definition, with the rule score carried
/// unchanged into the final score when rule is the only strategy.
#[tokio::test]
async fn chinese_policy_paragraph_aligns_to_english_term() {
    let source = MemorySource::new().with_policy(vec![paragraph(
        42,
        "通胀水平保持温和，CPI同比上涨0.4%",
        Some("inflation"),
    )]);

    let engine = AlignmentEngine::new(source, rule_only_config(0.3), None, None);
    let term = Term::new(7, "Inflation").with_translation(
        "zh",
        LocalizedTerm {
            term: Some("通胀".to_string()),
            summary: Some("通胀水平保持温和，物价稳定".to_string()),
            url: None,
        },
    );

    let cell = engine.align_term(&term).await.unwrap();

    assert_eq!(cell.concept_id, "TERM_7");
    assert_eq!(cell.policy_evidence.len(), 1);

    let evidence = &cell.policy_evidence[0];
    assert_eq!(evidence.paragraph_id, 42);
    assert_eq!(evidence.topic.as_deref(), Some("inflation"));
    assert_eq!(evidence.alignment_method, "hybrid_ensemble");
    assert_eq!(
        evidence.alignment_scores.rule,
        Some(evidence.alignment_scores.final_score)
    );
    assert!(evidence.alignment_scores.vector.is_none());
    assert!(evidence.alignment_scores.llm.is_none());
    assert!(evidence.alignment_scores.final_score >= 0.3);
}

/// All three strategies contribute individual scores to accepted
/// evidence when their providers are available.
#[tokio::test]
async fn all_strategies_contribute_scores() {
    let source = MockSource::new()
        .with_policy(
            "Inflation",
            vec![
                paragraph(1, "Inflation remained moderate while prices stabilized", None),
                paragraph(2, "Regional bank branch openings continued", None),
            ],
        )
        .with_news("Inflation", vec![article(10, "Inflation cools in June", "bullish")]);

    let chat = MockChat::new()
        .with_response(r#"[{"index": 0, "score": 0.9, "reason": "direct"}, {"index": 1, "score": 0.1, "reason": "unrelated"}]"#)
        .with_response(r#"[{"index": 0, "score": 0.85, "reason": "on topic"}]"#);
    let embedder = MockEmbedder::new();

    let mut config = AlignmentConfig::default();
    config.llm.enabled = true;
    config.llm.batch_delay_ms = 0;
    config.global.min_final_score = 0.2;

    let engine = AlignmentEngine::new(
        source,
        config,
        Some(Arc::new(chat)),
        Some(Arc::new(embedder)),
    );
    let term = Term::new(1, "Inflation").with_translation(
        "en",
        LocalizedTerm {
            term: Some("Inflation".to_string()),
            summary: Some("A sustained rise in the general price level".to_string()),
            url: Some("https://en.wikipedia.org/wiki/Inflation".to_string()),
        },
    );

    let cell = engine.align_term(&term).await.unwrap();

    assert!(!cell.policy_evidence.is_empty());
    let top = &cell.policy_evidence[0];
    assert_eq!(top.paragraph_id, 1);
    assert!(top.alignment_scores.rule.is_some());
    assert!(top.alignment_scores.vector.is_some());
    assert_eq!(top.alignment_scores.llm, Some(0.9));
    assert!((0.0..=1.0).contains(&top.alignment_scores.final_score));

    assert_eq!(cell.sentiment_evidence.len(), 1);
    let news = &cell.sentiment_evidence[0];
    assert_eq!(news.article_id, 10);
    assert_eq!(news.sentiment.label, "bullish");
    assert_eq!(news.sentiment.confidence, 0.85);
}

/// One failing term degrades to an empty cell without touching the
/// others, and the run summary reflects both.
#[tokio::test]
async fn run_survives_failing_term() {
    let source = MockSource::new()
        .with_policy(
            "Inflation",
            vec![paragraph(1, "Inflation expectations stayed anchored", None)],
        )
        .with_failing_term("Quantitative Easing");

    let engine = AlignmentEngine::new(source, rule_only_config(0.1), None, None);
    let terms = vec![
        inflation_term(1),
        Term::new(2, "Quantitative Easing"),
        Term::new(3, "Deflation"),
    ];

    let (cells, summary) = engine.run(&terms).await;

    assert_eq!(cells.len(), 3);
    assert!(!cells[0].policy_evidence.is_empty());
    assert_eq!(cells[1].concept_id, "TERM_2");
    assert!(cells[1].policy_evidence.is_empty());
    assert!(cells[1].sentiment_evidence.is_empty());
    assert_eq!(cells[1].metadata.quality_metrics.overall_score, 0.0);
    assert!(cells[2].policy_evidence.is_empty());

    assert_eq!(summary.total_cells, 3);
    assert_eq!(summary.cells_with_policy, 1);
    assert_eq!(summary.cells_with_sentiment, 0);
}

/// Generated cells survive a JSONL export/import round trip with the
/// wire field names intact.
#[tokio::test]
async fn exported_cells_round_trip() {
    let source = MockSource::new().with_policy(
        "Inflation",
        vec![paragraph(5, "Inflation held steady across the quarter", None)],
    );
    let engine = AlignmentEngine::new(source, rule_only_config(0.1), None, None);

    let (cells, _) = engine.run(&[inflation_term(9)]).await;

    let dir = std::env::temp_dir().join("alignment-engine-integration");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cells.jsonl");
    alignment::export::write_jsonl(&cells, &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
    assert_eq!(value["concept_id"], "TERM_9");
    assert!(value["policy_evidence"][0]["alignment_scores"]["final"].is_f64());
    assert!(value["metadata"]["quality_metrics"]["overall_score"].is_f64());

    let loaded = alignment::export::load_jsonl(&path).unwrap();
    assert_eq!(loaded.len(), cells.len());
    assert_eq!(loaded[0].primary_term, "Inflation");
    assert_eq!(
        loaded[0].policy_evidence[0].alignment_scores.final_score,
        cells[0].policy_evidence[0].alignment_scores.final_score
    );

    let report = alignment::export::validate_jsonl(&path).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.valid, cells.len());
}

fn inflation_term(id: i64) -> Term {
    Term::new(id, "Inflation").with_translation(
        "en",
        LocalizedTerm {
            term: Some("Inflation".to_string()),
            summary: Some("A sustained rise in the general price level".to_string()),
            url: None,
        },
    )
}
