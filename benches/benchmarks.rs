// benches/benchmarks.rs — Performance benchmarks (criterion)
//
// Hot paths on every request:
//   1. Demo fallback matching
//   2. Conversation context rendering
//   3. SSE chunking of an answer
//   4. Session history writes and reads

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use booomerangs::demo::DemoResponder;
use booomerangs::memory::{ConversationStore, ConversationTurn};
use booomerangs::provider::image::placeholder_svg;
use booomerangs::sessions::{open_in_memory, NewMessage};
use booomerangs::util::chunk_words;

// ─── Helpers ────────────────────────────────────────────────────────────────

/// A store with `users` conversations, each filled to the turn cap.
fn populated_memory(users: usize) -> ConversationStore {
    let store = ConversationStore::default();
    for u in 0..users {
        let user = format!("user-{u}");
        for i in 0..10 {
            store.append(&user, ConversationTurn::user(format!("Вопрос номер {i} про Rust")));
            store.append(
                &user,
                ConversationTurn::assistant(
                    format!("Ответ номер {i}: используйте Result и оператор ?"),
                    "chatfree",
                ),
            );
        }
    }
    store
}

fn long_answer(words: usize) -> String {
    (0..words)
        .map(|i| format!("слово{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Benchmark: Demo responder ──────────────────────────────────────────────

fn bench_demo(c: &mut Criterion) {
    let responder = DemoResponder::with_seed(booomerangs::demo::default_templates(), 7);

    let mut group = c.benchmark_group("demo");

    group.bench_function("greeting_match", |b| {
        b.iter(|| responder.respond(black_box("Привет, как дела?")))
    });

    group.bench_function("no_match_generic", |b| {
        b.iter(|| responder.respond(black_box("расскажи о квантовой хромодинамике")))
    });

    group.finish();
}

// ─── Benchmark: Conversation memory ─────────────────────────────────────────

fn bench_memory(c: &mut Criterion) {
    let store = populated_memory(1000);

    let mut group = c.benchmark_group("memory");

    group.bench_function("context_prefix_full", |b| {
        b.iter(|| store.context_prefix(black_box("user-500")))
    });

    group.bench_function("context_prefix_unknown", |b| {
        b.iter(|| store.context_prefix(black_box("nobody")))
    });

    group.bench_function("append_capped", |b| {
        b.iter(|| store.append("user-1", ConversationTurn::user(black_box("ещё вопрос"))))
    });

    group.bench_function("stats_1000_users", |b| b.iter(|| store.stats()));

    group.finish();
}

// ─── Benchmark: Streaming chunker ───────────────────────────────────────────

fn bench_chunking(c: &mut Criterion) {
    let short = long_answer(30);
    let long = long_answer(3000);

    let mut group = c.benchmark_group("chunking");

    group.bench_function("chunk_30_words", |b| {
        b.iter(|| chunk_words(black_box(&short), 3))
    });

    group.bench_function("chunk_3000_words", |b| {
        b.iter(|| chunk_words(black_box(&long), 3))
    });

    group.finish();
}

// ─── Benchmark: Image placeholder ───────────────────────────────────────────

fn bench_placeholder(c: &mut Criterion) {
    c.bench_function("placeholder_svg", |b| {
        b.iter(|| placeholder_svg(black_box("рыжий кот <на> крыше & луна")))
    });
}

// ─── Benchmark: Session store ───────────────────────────────────────────────

fn bench_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("sessions");

    group.bench_function("insert_message", |b| {
        let store = open_in_memory().expect("open store");
        let session = store.create_session("1", "bench").expect("create session");
        b.iter(|| {
            store
                .insert_message(session.id, black_box(&NewMessage::user("привет")))
                .expect("insert")
        })
    });

    group.bench_function("list_messages_200", |b| {
        let store = open_in_memory().expect("open store");
        let session = store.create_session("1", "bench").expect("create session");
        for i in 0..200 {
            store
                .insert_message(session.id, &NewMessage::user(format!("сообщение {i}")))
                .expect("insert");
        }
        b.iter(|| store.list_messages(black_box(session.id)).expect("list"))
    });

    group.finish();
}

// ─── Main ───────────────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_demo,
    bench_memory,
    bench_chunking,
    bench_placeholder,
    bench_sessions,
);
criterion_main!(benches);
