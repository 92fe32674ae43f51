use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use propsearch::{
    CandidateBuilder, CloneCopier, Clue, ClueKind, Concept, DbpOntologySource, Fact,
    FanoutGenerator, InMemoryKnowledgeSource, InMemoryProvenanceStore, LexicalRelatedness,
    OutputPool, QuestionContext,
};

fn make_generator(facts: usize) -> FanoutGenerator {
    let knowledge = Arc::new(InMemoryKnowledgeSource::new());
    for i in 0..facts {
        let fact = Fact::builder()
            .subject("Einstein")
            .property(format!("notable place {i}"))
            .value(format!("Place {i}"))
            .value_resource(format!("http://dbpedia.org/resource/Place_{i}"))
            .origin_feature("OriginDBpOntology")
            .score(0.5)
            .build()
            .unwrap();
        knowledge.insert("Einstein", fact).unwrap();
    }

    let builder = CandidateBuilder::new(
        Arc::new(DbpOntologySource::new(knowledge)),
        Arc::new(LexicalRelatedness::default()),
        Arc::new(InMemoryProvenanceStore::new()),
    );
    FanoutGenerator::new(builder, Arc::new(CloneCopier)).with_pool(Arc::new(OutputPool::new(2)))
}

fn question() -> QuestionContext {
    QuestionContext::new("bench", "Which places is Einstein notable for?")
        .with_concept(Concept::new("Einstein").by_subject())
        .with_clue(Clue::new(ClueKind::Focus, "places"))
        .with_clue(Clue::new(ClueKind::Subject, "notable place"))
        .with_clue(Clue::new(ClueKind::Ne, "Einstein"))
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout/cycle");
    let q = question();
    for facts in [1usize, 16, 128] {
        let mut generator = make_generator(facts);
        group.throughput(Throughput::Elements(facts as u64));
        group.bench_with_input(BenchmarkId::from_parameter(facts), &facts, |b, _| {
            b.iter(|| {
                generator.begin(&q).unwrap();
                // Records are dropped as they are pulled, recycling pool slots.
                for record in generator.stream() {
                    criterion::black_box(record.unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
