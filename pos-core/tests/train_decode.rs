use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use pos_core::corpus::tokenize;
use pos_core::{decode, evaluate, fixture, Alignment, Corpus, HmmModel, State};

const TRAIN_WORDS: &str = "\
The dog saw a cat .
A cat saw the dog .
The old dog barks .
She saw the old cat .
Dogs bark and cats meow .
";

const TRAIN_TAGS: &str = "\
DET N V DET N .
DET N V DET N .
DET ADJ N V .
PRO V DET ADJ N .
N V CNJ N V .
";

fn train_corpus() -> Corpus {
    Corpus::from_readers(
        Cursor::new(TRAIN_WORDS),
        Cursor::new(TRAIN_TAGS),
        Alignment::Strict,
    )
    .unwrap()
}

#[test]
fn test_training_rows_are_distributions() {
    let model = HmmModel::train(&train_corpus().sentences);
    for (id, label) in model.tags().iter() {
        let row = model.emission_row(id);
        let sum: f64 = row.values().map(|p| p.exp()).sum();
        assert!((sum - 1.0).abs() < 1e-9, "emissão de {label}: {sum}");

        let succ: Vec<f64> = model.successors(State::Tag(id)).map(|(_, p)| p.exp()).collect();
        if !succ.is_empty() {
            let sum: f64 = succ.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "transição de {label}: {sum}");
        }
    }
    let start: f64 = model.successors(State::Start).map(|(_, p)| p.exp()).sum();
    assert!((start - 1.0).abs() < 1e-9);
}

#[test]
fn test_self_evaluation_is_perfect() {
    let corpus = train_corpus();
    let model = HmmModel::train(&corpus.sentences);
    let eval = evaluate(&model, &corpus.sentences);
    assert_eq!(eval.overall.correct, eval.overall.total);
    assert_eq!(eval.overall.total, corpus.total_tokens());
    assert_eq!(eval.sequences_correct, corpus.len());
}

#[test]
fn test_unseen_words_keep_length() {
    let model = HmmModel::train(&train_corpus().sentences);
    let words = tokenize("The purple zebra saw a dog and barks loudly .");
    let tags = decode(&model, &words);
    assert_eq!(tags.len(), words.len());
    assert_eq!(tags[0], "DET");
    assert_eq!(tags[4], "DET");
}

#[test]
fn test_held_out_accuracy_is_reported() {
    let model = HmmModel::train(&train_corpus().sentences);
    let test = Corpus::from_pairs([("the cat saw a dog .", "DET N V DET N ."), ("she barks .", "PRO V .")]);
    let eval = evaluate(&model, &test.sentences);
    assert_eq!(eval.overall.total, 9);
    assert!(eval.overall.ratio() > 0.5);
    assert!(eval.to_string().contains("Acurácia por item"));
}

#[test]
fn test_model_is_shared_across_threads() {
    let model = Arc::new(fixture::drill_model());
    let handles: Vec<_> = fixture::DRILL_SENTENCES
        .iter()
        .map(|&(words, expected)| {
            let model = Arc::clone(&model);
            thread::spawn(move || assert_eq!(decode(&model, words), expected))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_empty_training_data() {
    let corpus = Corpus::from_readers(Cursor::new(""), Cursor::new(""), Alignment::Strict).unwrap();
    assert!(corpus.is_empty());
    let model = HmmModel::train(&corpus.sentences);
    assert!(model.is_empty());
    assert!(decode(&model, &["hello"]).is_empty());
    assert!(decode::<&str>(&model, &[]).is_empty());
}
