use propsearch::{
    CandidateBuilder, CloneCopier, Clue, ClueKind, Concept, DbpOntologySource, DbpPropertySource,
    Fact, FanoutConfig, FanoutGenerator, InMemoryKnowledgeSource, InMemoryProvenanceStore, LexicalRelatedness,
    PropertyLabelWriter, QuestionContext,
};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

fn knowledge() -> Arc<InMemoryKnowledgeSource> {
    let k = Arc::new(InMemoryKnowledgeSource::new());
    for (property, value) in [("birth place", "Ulm, Kingdom of Württemberg"), ("spouse", "Elsa Einstein")] {
        let fact = Fact::builder()
            .subject("Einstein")
            .property(property)
            .value(value)
            .origin_feature("OriginDBpOntology")
            .build()
            .unwrap();
        k.insert("Einstein", fact).unwrap();
    }
    k
}

fn generator(dump: Arc<PropertyLabelWriter>) -> FanoutGenerator {
    let builder = CandidateBuilder::new(
        Arc::new(DbpOntologySource::new(knowledge())),
        Arc::new(LexicalRelatedness::default()),
        Arc::new(InMemoryProvenanceStore::new()),
    );
    FanoutGenerator::new(builder, Arc::new(CloneCopier)).with_dump(dump)
}

fn question(id: &str) -> QuestionContext {
    QuestionContext::new(id, "Where was Einstein born?")
        .with_concept(Concept::new("Einstein"))
        .with_clue(Clue::new(ClueKind::Sv, "born"))
        .with_clue(Clue::new(ClueKind::Subject, "birth place"))
        .with_clue(Clue::new(ClueKind::Token, "place"))
        .with_answer_pattern("ulm")
}

#[test]
fn dump_records_one_line_per_fact() {
    let dir = tempfile::tempdir().unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(dir.path()));
    generator(Arc::clone(&dump)).generate_all(&question("q1")).unwrap();

    let content = fs::read_to_string(dir.path().join("q1-prop.txt")).unwrap();
    assert_eq!(
        content,
        "<Q> Where was Einstein born?\n1 2 birth place\n0 0 spouse\n"
    );
}

#[test]
fn dump_appends_across_cycles_with_single_header() {
    let dir = tempfile::tempdir().unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(dir.path()));
    let mut g = generator(dump);
    g.generate_all(&question("q1")).unwrap();
    g.generate_all(&question("q1")).unwrap();

    let content = fs::read_to_string(dir.path().join("q1-prop.txt")).unwrap();
    assert_eq!(content.matches("<Q>").count(), 1);
    assert_eq!(content.lines().count(), 5);
}

#[test]
fn question_without_answer_pattern_is_not_dumped() {
    let dir = tempfile::tempdir().unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(dir.path()));
    let mut q = question("q2");
    q.answer_pattern = None;

    let out = generator(dump).generate_all(&q).unwrap();
    assert_eq!(out.len(), 2);
    assert!(!dir.path().join("q2-prop.txt").exists());
}

#[test]
fn dump_failure_does_not_affect_generation() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the dump directory should be.
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "not a directory").unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(&blocked));

    let out = generator(dump).generate_all(&question("q3")).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out[1].candidate.is_last);
}

#[test]
fn concurrent_cycles_share_one_writer() {
    let dir = tempfile::tempdir().unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(dir.path()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dump = Arc::clone(&dump);
            thread::spawn(move || {
                let mut g = generator(dump);
                for _ in 0..5 {
                    g.generate_all(&question("shared")).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let content = fs::read_to_string(dir.path().join("shared-prop.txt")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + 4 * 5 * 2);
    assert_eq!(lines[0], "<Q> Where was Einstein born?");
    assert!(lines[1..]
        .iter()
        .all(|l| *l == "1 2 birth place" || *l == "0 0 spouse"));
}

#[test]
fn config_enables_dump() {
    let dir = tempfile::tempdir().unwrap();
    let config = FanoutConfig {
        max_jobs: 2,
        dump_property_labels: Some(dir.path().to_path_buf()),
    };
    let builder = CandidateBuilder::new(
        Arc::new(DbpOntologySource::new(knowledge())),
        Arc::new(LexicalRelatedness::default()),
        Arc::new(InMemoryProvenanceStore::new()),
    );
    let pool = config.output_pool();
    let mut g = FanoutGenerator::from_config(builder, Arc::new(CloneCopier), pool, &config);
    let out = g.generate_all(&question("q4")).unwrap();

    assert_eq!(out.len(), 2);
    assert!(dir.path().join("q4-prop.txt").exists());
}

#[test]
fn sources_from_one_config_write_one_header_per_question() {
    const QUESTIONS: usize = 200;
    let dir = tempfile::tempdir().unwrap();
    let config = FanoutConfig {
        max_jobs: 2,
        dump_property_labels: Some(dir.path().to_path_buf()),
    };
    let pool = config.output_pool();
    let onto = CandidateBuilder::new(
        Arc::new(DbpOntologySource::new(knowledge())),
        Arc::new(LexicalRelatedness::default()),
        Arc::new(InMemoryProvenanceStore::new()),
    );
    let prop = CandidateBuilder::new(
        Arc::new(DbpPropertySource::new(knowledge())),
        Arc::new(LexicalRelatedness::default()),
        Arc::new(InMemoryProvenanceStore::new()),
    );
    let generators = vec![
        FanoutGenerator::from_config(onto, Arc::new(CloneCopier), Arc::clone(&pool), &config),
        FanoutGenerator::from_config(prop, Arc::new(CloneCopier), Arc::clone(&pool), &config),
    ];
    let barrier = Arc::new(Barrier::new(generators.len()));

    let handles: Vec<_> = generators
        .into_iter()
        .map(|mut g| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                for i in 0..QUESTIONS {
                    let q = question(&format!("race{i}"));
                    barrier.wait();
                    assert_eq!(g.generate_all(&q).unwrap().len(), 2);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for i in 0..QUESTIONS {
        let content = fs::read_to_string(dir.path().join(format!("race{i}-prop.txt"))).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(content.matches("<Q>").count(), 1, "race{i}");
        assert_eq!(lines[0], "<Q> Where was Einstein born?");
        assert_eq!(lines.len(), 1 + 2 * 2);
    }
}

#[test]
fn question_id_with_separator_is_not_dumped() {
    let root = tempfile::tempdir().unwrap();
    let dump = Arc::new(PropertyLabelWriter::new(root.path().join("dumps")));

    let out = generator(dump).generate_all(&question("../escaped")).unwrap();
    assert_eq!(out.len(), 2);
    assert!(!root.path().join("escaped-prop.txt").exists());
    assert!(!root.path().join("dumps").exists());
}
