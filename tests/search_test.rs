//! Lookups against a real Doxygen search directory.

mod common;

use assert2::{check, let_assert};
use common::FixtureDir;
use doxysearch::tools::{SearchDefaults, SearchRequest, handle_search};
use doxysearch::{DisplayResult, IndexError, IndexOptions, SearchIndex, ShardId, ShardSource, Target};
use rstest::{fixture, rstest};

#[fixture]
fn fixture_dir() -> FixtureDir {
    FixtureDir::new()
}

fn labels(results: &[DisplayResult]) -> Vec<&str> {
    results.iter().map(|r| r.display_label.as_str()).collect()
}

#[rstest]
#[tokio::test]
async fn test_timer_ranks_exact_key_before_files(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let results = index.search("timer", &["all"]).await;

    check!(labels(&results) == ["timer", "Timer.cpp", "Timer.hpp", "Timer_test.cpp"]);

    let timer = &results[0];
    check!(timer.targets.len() == 4);
    check!(timer.targets[0].scope_label == "Nextsim::ScopedTimer::timer()");
    check!(timer.targets[1] == Target::new("../class_nextsim_1_1_timer.html", "Nextsim::Timer"));
    check!(timer.targets[3].scope_label == "Nextsim::Timer::Timer(const Key &rootKey)");
    check!(results[3].targets == vec![Target::new("../_timer__test_8cpp.html", "")]);
}

#[rstest]
#[tokio::test]
async fn test_prefix_matches_rank_before_substring_matches(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let results = index.search("te", &["all"]).await;

    check!(
        labels(&results)
            == [
                "TextTag",
                "TextTag.hpp",
                "TimestepTime",
                "Using the interface",
                "Time_test.cpp",
                "Timer_test.cpp",
                "Implementing a new <tt>IInterfaceModule</tt> class",
            ]
    );
}

#[rstest]
#[case::spaced("The header")]
#[case::extra_whitespace("  the   HEADER ")]
#[tokio::test]
async fn test_multi_word_page_title(fixture_dir: FixtureDir, #[case] query: &str) {
    let index = fixture_dir.open().await;
    let results = index.search(query, &["all"]).await;

    let_assert!([page] = results.as_slice());
    check!(page.display_label == "The header");
    check!(page.key == "the header");
    check!(page.targets[0].anchor_url.ends_with("#autotoc_md4"));
}

#[rstest]
#[tokio::test]
async fn test_labels_are_entity_decoded(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let results = index.search("tt module", &["all"]).await;

    check!(labels(&results) == ["<tt>Module</tt> namespace and class"]);
}

#[rstest]
#[tokio::test]
async fn test_missing_shard_leaves_other_sections_intact(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let alone = index.search("timer", &["all"]).await;
    let with_namespaces = index.search("timer", &["all", "namespaces"]).await;

    check!(with_namespaces == alone);
    let missing = ShardId::new("namespaces", 4);
    check!(index.cache().is_cached(&missing).await);
    check!(index.load_shard(&missing).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_deleted_shard_only_affects_its_bucket(fixture_dir: FixtureDir) {
    fixture_dir.remove_file("all_f.js");
    let index = fixture_dir.open().await;

    check!(index.search("rect", &["all"]).await.is_empty());
    check!(labels(&index.search("tick", &["all"]).await) == ["tick", "ticks"]);
}

#[rstest]
#[tokio::test]
async fn test_sections_merge_targets_by_key(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let results = index.search("rectgridio", &["all", "classes"]).await;

    check!(labels(&results) == ["RectGridIO", "RectGridIO.cpp", "RectGridIO.hpp"]);

    let mut external = Target::new("../external/class_rect_grid_i_o.html", "Upstream");
    external.external = true;
    check!(
        results[0].targets
            == vec![
                Target::new("../class_nextsim_1_1_rect_grid_i_o.html", "Nextsim"),
                external,
            ]
    );
}

#[rstest]
#[tokio::test]
async fn test_malformed_entry_is_skipped(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let shard = index.load_shard(&ShardId::new("classes", 2)).await;

    let keys: Vec<_> = shard.entries().iter().map(|e| e.key.as_str()).collect();
    check!(keys == ["rectangulargrid", "rectgridio", "rectgridio"]);
    check!(index.search("broken", &["classes"]).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_unparseable_shard_is_treated_as_empty(fixture_dir: FixtureDir) {
    fixture_dir.write_file("classes_3.js", "var searchData = [ ['timer_3', ");
    let index = fixture_dir.open().await;

    check!(index.search("timer", &["classes"]).await.is_empty());
    check!(index.search("timer", &["classes"]).await.is_empty());
    check!(index.cache().fetch_count() == 1);
}

#[rstest]
#[tokio::test]
async fn test_character_without_bucket_fetches_nothing(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;

    check!(index.search("zebra", &["classes"]).await.is_empty());
    check!(index.search("", &["all", "classes"]).await.is_empty());
    check!(index.cache().fetch_count() == 0);
}

#[rstest]
#[tokio::test]
async fn test_concurrent_queries_share_shard_fetches(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;

    let (ti, tim, tick) = tokio::join!(
        index.search("ti", &["all"]),
        index.search("tim", &["all"]),
        index.search("tick", &["all"])
    );

    check!(index.cache().fetch_count() == 1);
    check!(tim.iter().all(|r| ti.contains(r)));
    check!(labels(&tick) == ["tick", "ticks"]);
    check!(index.search("tim", &["all"]).await == tim);
}

#[rstest]
#[tokio::test]
async fn test_missing_manifest_fails_to_open(fixture_dir: FixtureDir) {
    fixture_dir.remove_file("searchdata.js");
    let_assert!(
        Err(IndexError::Manifest { .. }) =
            SearchIndex::open(fixture_dir.source(), IndexOptions::default()).await
    );
}

#[rstest]
#[tokio::test]
async fn test_manifest_sections(fixture_dir: FixtureDir) {
    let_assert!(Ok(manifest) = fixture_dir.source().manifest().await);
    let names: Vec<_> = manifest.sections().iter().map(|s| s.name.as_str()).collect();
    check!(names == ["all", "classes", "namespaces"]);

    let_assert!(Some(all) = manifest.section("all"));
    check!(all.shard_for('r') == Some(ShardId::new("all", 15)));
    check!(all.shard_for('t').map(|id| id.file_name()) == Some("all_11.js".to_string()));
}

#[rstest]
#[tokio::test]
async fn test_search_tool_renders_grouped_results(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let defaults = SearchDefaults {
        sections: Vec::new(),
        limit: 2,
    };

    let request = SearchRequest {
        query: "Timer".to_string(),
        sections: None,
        limit: None,
    };
    let_assert!(Ok(text) = handle_search(&index, request, &defaults).await);
    check!(text.starts_with("Search results for 'Timer' in all (4 found):"));
    check!(text.contains("1. timer (4 locations)"));
    check!(text.contains("   • Nextsim::Timer → ../class_nextsim_1_1_timer.html"));
    check!(text.contains("2. Timer.cpp → ../_timer_8cpp.html"));
    check!(text.contains("... and 2 more"));
}

#[rstest]
#[tokio::test]
async fn test_search_tool_rejects_unknown_section(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let defaults = SearchDefaults {
        sections: vec!["all".to_string()],
        limit: 10,
    };

    let request = SearchRequest {
        query: "timer".to_string(),
        sections: Some(vec!["functions".to_string()]),
        limit: None,
    };
    let_assert!(Err(message) = handle_search(&index, request, &defaults).await);
    check!(message.contains("unknown index section 'functions'"));
    check!(message.contains("all, classes, namespaces"));
}

#[rstest]
#[tokio::test]
async fn test_search_tool_reports_no_results(fixture_dir: FixtureDir) {
    let index = fixture_dir.open().await;
    let defaults = SearchDefaults {
        sections: vec!["classes".to_string()],
        limit: 10,
    };

    let request = SearchRequest {
        query: "tz".to_string(),
        sections: None,
        limit: None,
    };
    let_assert!(Ok(text) = handle_search(&index, request, &defaults).await);
    check!(text.starts_with("No results found for 'tz' in classes."));
}
