use propsearch::{
    CandidateBuilder, CloneCopier, Concept, DbpOntologySource, Fact, FanoutError, FanoutGenerator,
    InMemoryKnowledgeSource, InMemoryProvenanceStore, LexicalRelatedness, OutputPool,
    ProvenanceStore, QuestionContext,
};
use std::sync::Arc;
use std::thread;

const FACTS: usize = 6;

fn knowledge() -> Arc<InMemoryKnowledgeSource> {
    let k = Arc::new(InMemoryKnowledgeSource::new());
    for i in 0..FACTS {
        let fact = Fact::builder()
            .subject("Einstein")
            .property(format!("property {i}"))
            .value(format!("value {i}"))
            .origin_feature("OriginDBpOntology")
            .build()
            .unwrap();
        k.insert("Einstein", fact).unwrap();
    }
    k
}

fn generator(
    knowledge: Arc<InMemoryKnowledgeSource>,
    provenance: Arc<dyn ProvenanceStore>,
    pool: Arc<OutputPool>,
) -> FanoutGenerator {
    let builder = CandidateBuilder::new(
        Arc::new(DbpOntologySource::new(knowledge)),
        Arc::new(LexicalRelatedness::default()),
        provenance,
    );
    FanoutGenerator::new(builder, Arc::new(CloneCopier)).with_pool(pool)
}

fn question(i: usize) -> QuestionContext {
    QuestionContext::new(format!("q{i}"), "Tell me about Einstein")
        .with_concept(Concept::new("Einstein"))
}

#[test]
fn pool_sized_for_jobs_never_exhausts() {
    const JOBS: usize = 4;
    let pool = Arc::new(OutputPool::for_max_jobs(JOBS));
    let knowledge = knowledge();
    let provenance = Arc::new(InMemoryProvenanceStore::new());

    let handles: Vec<_> = (0..JOBS)
        .map(|job| {
            let pool = Arc::clone(&pool);
            let knowledge = Arc::clone(&knowledge);
            let provenance: Arc<dyn ProvenanceStore> = provenance.clone();
            thread::spawn(move || {
                let mut g = generator(knowledge, provenance, pool);
                let mut emitted = 0;
                for round in 0..10 {
                    g.begin(&question(job * 100 + round)).unwrap();
                    // One record downstream while the next one is filled.
                    let mut in_flight = None;
                    while g.has_more().unwrap() {
                        let next = g.produce_next().unwrap();
                        in_flight = Some(next);
                        emitted += 1;
                    }
                    drop(in_flight);
                }
                emitted
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, JOBS * 10 * FACTS);
    assert_eq!(pool.available(), pool.capacity());
    assert_eq!(provenance.source_count().unwrap(), total);
}

#[test]
fn holding_more_than_capacity_fails_acquisition() {
    let pool = Arc::new(OutputPool::for_max_jobs(1));
    let mut g = generator(
        knowledge(),
        Arc::new(InMemoryProvenanceStore::new()),
        Arc::clone(&pool),
    );
    g.begin(&question(0)).unwrap();

    let held: Vec<_> = (0..2).map(|_| g.produce_next().unwrap()).collect();
    let err = g.produce_next().unwrap_err();
    assert!(matches!(err, FanoutError::Pool(_)));

    drop(held);
    let rest: Vec<_> = g.stream().map(|r| r.unwrap().into_parts().1).collect();
    assert_eq!(rest.len(), FACTS - 2);
    assert!(rest.last().unwrap().is_last);
}

#[test]
fn generators_share_provenance_ids() {
    let pool = Arc::new(OutputPool::new(8));
    let provenance = Arc::new(InMemoryProvenanceStore::new());
    let mut a = generator(knowledge(), provenance.clone(), Arc::clone(&pool));
    let mut b = generator(knowledge(), provenance.clone(), Arc::clone(&pool));

    let ids_a: Vec<_> = a
        .generate_all(&question(1))
        .unwrap()
        .into_iter()
        .map(|r| r.candidate.source_id.unwrap())
        .collect();
    let ids_b: Vec<_> = b
        .generate_all(&question(2))
        .unwrap()
        .into_iter()
        .map(|r| r.candidate.source_id.unwrap())
        .collect();
    assert!(ids_a.iter().all(|id| !ids_b.contains(id)));
}
