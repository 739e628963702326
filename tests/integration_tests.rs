//! Integration tests for eqbleu

use eqbleu::classes::observer::RecordingObserver;
use eqbleu::*;

/// Ground-truth and predicted segmentations of a sign reading
/// "CAUTION / CHILDREN PLAYING"
fn caution_annotators() -> Vec<AnnotatorMapping> {
    vec![
        AnnotatorMapping::from_blocks([vec![1], vec![2, 3]]),
        AnnotatorMapping::from_blocks([vec![1, 2, 3]]),
    ]
}

/// Ground truth with tentative locations, and a prediction that splits and
/// regroups it
fn letter_annotators() -> Vec<AnnotatorMapping> {
    vec![
        AnnotatorMapping::from_blocks([vec![1, 2, -3, 4, -5], vec![6, 7]]),
        AnnotatorMapping::from_blocks([vec![1, 2, 4, 7], vec![6], vec![-8, -9]]),
    ]
}

type ImageKey = (usize, Block);

fn lookup() -> TranslationTable<ImageKey> {
    let mut table = TranslationTable::new();
    table.insert((0, Block::from([1])), ["CAUTION"]);
    table.insert((0, Block::from([2, 3])), ["CHILDREN PLAYING"]);
    table.insert((0, Block::from([1, 2, 3])), "CAUTION CHILDREN PLAYING");

    table.insert(
        (1, Block::from([1, 2, -3, 4, -5])),
        ["i love you dearly", "i am very fond of you"],
    );
    table.insert((1, Block::from([6, 7])), ["fine", "all right", "yes"]);
    table.insert((1, Block::from([1, 2, 4, 7])), "i love yes");
    table.insert((1, Block::from([6])), "fine");
    table.insert((1, Block::from([-8, -9])), "the the the");
    table
}

/// Build one image's classes and turn them into keyed segments
fn image_segments(image: usize, annotators: &[AnnotatorMapping]) -> Vec<Segment<ImageKey>> {
    let classes = build_equivalence_classes(annotators, MergeMode::Uncertain).unwrap();
    classes
        .segments(0, 1)
        .unwrap()
        .into_iter()
        .map(|segment| segment.map_keys(|block| (image, block)))
        .collect()
}

fn corpus() -> Vec<Vec<Segment<ImageKey>>> {
    vec![
        image_segments(0, &caution_annotators()),
        image_segments(1, &letter_annotators()),
    ]
}

#[test]
fn test_full_pipeline() {
    let config = BleuConfig::new()
        .with_smoothing(Smoothing::Exp)
        .with_effective_order(true);
    let report = corpus_bleu(&corpus(), &lookup(), &config).unwrap();

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.documents[0].correct, [3, 1, 0, 0]);
    assert_eq!(report.documents[0].total, [3, 2, 1, 0]);
    assert_eq!(report.documents[1].correct, [4, 1, 0, 0]);
    assert_eq!(report.documents[1].total, [7, 4, 2, 0]);

    let bleu = &report.bleu;
    assert_eq!(bleu.correct, [7, 2, 0, 0]);
    assert_eq!(bleu.total, [10, 6, 3, 0]);
    assert_eq!(bleu.sys_len, 10);
    assert_eq!(bleu.ref_len, 8);
    assert_eq!(bleu.brevity_penalty, 1.0);
    assert_eq!(bleu.effective_order, 3);

    let expected = (70.0f64 * (200.0 / 6.0) * (100.0 / 6.0)).cbrt();
    assert!((bleu.score - expected).abs() < 1e-9);
    assert!((bleu.score - 33.88).abs() < 0.01);
}

#[test]
fn test_caution_scores_perfectly_when_ngrams_span_blocks() {
    let segments = image_segments(0, &caution_annotators());
    let table = lookup();

    let joined = BleuScorer::with_config(
        BleuConfig::new()
            .with_effective_order(true)
            .with_ngram_span(NgramSpan::Superblock),
    )
    .unwrap();
    let result = joined.score_segment(&segments[0], &table).unwrap();
    assert_eq!(result.correct, [3, 2, 1, 0]);
    assert!((result.score - 100.0).abs() < 1e-9);

    let per_block = BleuScorer::with_config(
        BleuConfig::new()
            .with_smoothing(Smoothing::Exp)
            .with_effective_order(true),
    )
    .unwrap();
    let result = per_block.score_segment(&segments[0], &table).unwrap();
    assert_eq!(result.correct, [3, 1, 0, 0]);
    assert!((result.score - 62.996).abs() < 1e-3);
}

#[test]
fn test_missing_translation_propagates() {
    let mut segments = corpus();
    segments[1][0].candidates.push((1, Block::from([42])));

    let err = corpus_bleu(&segments, &lookup(), &BleuConfig::new()).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("42"));
}

#[test]
fn test_config_from_json_drives_scoring() {
    let config =
        BleuConfig::from_json(r#"{"smoothing": "exp", "use_effective_order": true}"#).unwrap();
    assert_eq!(config.smooth_floor, 0.01);
    assert_eq!(config.ngram_span, NgramSpan::Block);

    let report = corpus_bleu(&corpus(), &lookup(), &config).unwrap();
    assert!((report.bleu.score - 33.88).abs() < 0.01);

    assert!(BleuConfig::from_json(r#"{"smooth_floor": -0.5}"#).is_err());
    assert!(BleuConfig::from_json(r#"{"smoothing": "add_one"}"#).is_err());
}

#[test]
fn test_string_keyed_table_from_json() {
    let table: TranslationTable<String> = TranslationTable::from_json(
        r#"{
            "a1": ["i love you dearly", "i am very fond of you"],
            "a2": ["fine", "all right", "yes"],
            "b1": "i love yes",
            "b2": "fine",
            "b3": "the the the"
        }"#,
    )
    .unwrap();

    fn names(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }
    let image = vec![
        Segment::new(names(&["a1", "a2"]), names(&["b1", "b2"])),
        Segment::new(Vec::new(), names(&["b3"])),
    ];
    let report = corpus_bleu(&[image], &table, &BleuConfig::new()).unwrap();
    assert_eq!(report.totals.correct, [4, 1, 0, 0]);
    assert_eq!(report.totals.total, [7, 4, 2, 0]);
    assert_eq!(report.totals.sys_len, 7);
    assert_eq!(report.totals.ref_len, 5);
}

#[test]
fn test_trusted_enumeration_end_to_end() {
    let annotators = vec![
        AnnotatorMapping::from_blocks([vec![1], vec![2, 3], vec![4, 5]]),
        AnnotatorMapping::from_blocks([vec![1, 2, 3], vec![5, 4]]),
        AnnotatorMapping::from_blocks([vec![1, 2, 3], vec![4, 5]]),
    ];
    let classes = build_equivalence_classes(&annotators, MergeMode::Trusted).unwrap();

    assert_eq!(classes.len(), 2);
    let partition: Vec<Vec<Location>> = classes
        .classes()
        .iter()
        .map(|c| c.members().iter().copied().collect())
        .collect();
    assert!(partition.contains(&vec![1, 2, 3]));
    assert!(partition.contains(&vec![4, 5]));

    for class in classes.classes() {
        assert_eq!(class.superblocks().len(), 3);
        assert_eq!(class.unique_superblocks().len(), 2);
    }
    assert_eq!(classes.all_combinations().count(), 4);
}

#[test]
fn test_uncertain_requires_two_annotators() {
    let mut annotators = letter_annotators();
    annotators.push(AnnotatorMapping::from_blocks([vec![1]]));
    let err = build_equivalence_classes(&annotators, MergeMode::Uncertain).unwrap_err();
    assert!(err.is_precondition());

    let err = build_equivalence_classes(&letter_annotators(), MergeMode::Trusted).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn test_observer_sees_merge() {
    let mut observer = RecordingObserver::default();
    let classes = EquivalenceClassBuilder::new(MergeMode::Uncertain)
        .build_with_observer(&caution_annotators(), &mut observer)
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(observer.rounds, vec![(0, 2), (1, 1)]);

    let (id, members, replaced) = observer.created.last().unwrap();
    assert_eq!(*id, classes.classes()[0].id());
    assert_eq!(members.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(replaced.len(), 2);
}

#[test]
fn test_display_of_letter_classes() {
    let classes = build_equivalence_classes(&letter_annotators(), MergeMode::Uncertain).unwrap();
    let text = classes.to_string();
    let first = text.lines().next().unwrap();
    assert!(first.ends_with(": [1, 2, -3, 4, -5, 6, 7]"));
    assert!(text.contains("sb1: [(1, 2, 4, 7), (6)]"));
}
