mod common;

use voicy_stats::db::WordCount;
use voicy_stats::stats::{WordFrequencyIndexer, TOP_WORDS_LIMIT};
use voicy_stats::StatsError;

use common::*;

fn word(word: &str, count: u64) -> WordCount {
    WordCount {
        word: word.to_string(),
        count,
    }
}

#[tokio::test]
async fn rebuild_counts_words_across_voices() {
    let db = open_memory_db();
    db.insert_voices(vec![
        voice_with_text("Hello world, hello again!"),
        voice_with_text("world peace"),
        voice_with_text("the cat sat on a mat"),
        voice_at(fixed_now(), chrono::Duration::hours(2), 3, None),
    ])
    .await
    .unwrap();

    let report = WordFrequencyIndexer::new(db.clone(), 1000)
        .rebuild()
        .await
        .unwrap();
    assert_eq!(report.texts, 3);
    assert_eq!(report.words, 4);

    assert_eq!(
        db.all_words().await.unwrap(),
        vec![word("again", 1), word("hello", 2), word("peace", 1), word("world", 2)]
    );
}

#[tokio::test]
async fn short_tokens_never_reach_the_table() {
    let db = open_memory_db();
    db.insert_voice(&voice_with_text("the cat sat on a mat"))
        .await
        .unwrap();

    let indexer = WordFrequencyIndexer::new(db.clone(), 1000);
    indexer.rebuild().await.unwrap();
    assert!(db.all_words().await.unwrap().is_empty());

    db.insert_voice(&voice_with_text("the cat jumped")).await.unwrap();
    indexer.rebuild().await.unwrap();
    assert_eq!(db.all_words().await.unwrap(), vec![word("jumped", 1)]);
}

#[tokio::test]
async fn rebuilding_twice_gives_the_same_table() {
    let db = open_memory_db();
    db.insert_voices(vec![
        voice_with_text("Morning meeting about quarterly numbers"),
        voice_with_text("quarterly review meeting moved"),
        voice_with_text("café résumé naïve café"),
    ])
    .await
    .unwrap();

    let indexer = WordFrequencyIndexer::new(db.clone(), 1000);
    indexer.rebuild().await.unwrap();
    let first = db.all_words().await.unwrap();
    indexer.rebuild().await.unwrap();
    let second = db.all_words().await.unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn batch_size_does_not_change_the_result() {
    let db = open_memory_db();
    db.insert_voices(vec![
        voice_with_text("alpha bravo charlie delta"),
        voice_with_text("echo foxtrot golf hotel india"),
        voice_with_text("alpha echo kilo lima"),
    ])
    .await
    .unwrap();

    let single = WordFrequencyIndexer::new(db.clone(), 1).rebuild().await.unwrap();
    let by_one = db.all_words().await.unwrap();
    let bulk = WordFrequencyIndexer::new(db.clone(), 1000).rebuild().await.unwrap();
    let by_thousand = db.all_words().await.unwrap();

    assert_eq!(single.batches, single.words);
    assert_eq!(bulk.batches, 1);
    assert_eq!(by_one, by_thousand);
}

#[tokio::test]
async fn old_table_survives_a_failed_rebuild() {
    let db = open_memory_db();
    db.insert_voice(&voice_with_text("persistent words remain"))
        .await
        .unwrap();
    let indexer = WordFrequencyIndexer::new(db.clone(), 1000);
    indexer.rebuild().await.unwrap();
    let before = db.all_words().await.unwrap();

    db.execute(|conn| {
        conn.execute_batch("DROP TABLE voices;")?;
        Ok(())
    })
    .await
    .unwrap();

    let err = indexer.rebuild().await.unwrap_err();
    assert!(matches!(err, StatsError::RebuildFailure { .. }), "{err}");
    assert_eq!(db.all_words().await.unwrap(), before);
}

#[tokio::test]
async fn invalid_batch_is_rolled_back_and_live_table_kept() {
    let db = open_memory_db();
    db.begin_word_rebuild().await.unwrap();
    db.insert_rebuild_words(vec![word("valid", 3)]).await.unwrap();
    db.commit_word_rebuild().await.unwrap();

    db.begin_word_rebuild().await.unwrap();
    let result = db
        .insert_rebuild_words(vec![word("fresh", 1), word("1234", 2)])
        .await;
    assert!(result.is_err());
    db.discard_word_rebuild().await.unwrap();

    assert_eq!(db.all_words().await.unwrap(), vec![word("valid", 3)]);
}

#[tokio::test]
async fn top_words_are_ordered_by_count() {
    let db = open_memory_db();
    let mut texts = Vec::new();
    for i in 0..25u32 {
        let repeated = format!("{} ", letters(i)).repeat(i as usize + 1);
        texts.push(voice_with_text(repeated.trim()));
    }
    db.insert_voices(texts).await.unwrap();
    WordFrequencyIndexer::new(db.clone(), 10).rebuild().await.unwrap();

    let top = db.top_words(TOP_WORDS_LIMIT).await.unwrap();
    assert_eq!(top.len(), TOP_WORDS_LIMIT);
    assert_eq!(top[0].count, 25);
    assert!(top.windows(2).all(|pair| pair[0].count >= pair[1].count));
}

/// Distinct letters-only word for each index.
fn letters(i: u32) -> String {
    let first = char::from(b'a' + (i % 26) as u8);
    format!("word{first}")
}
