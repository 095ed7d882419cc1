use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use family_tree_layout::config::{LabelConfig, LayoutConfig, RenderConfig};
use family_tree_layout::ir::{FamilySnapshot, Person, PersonId};
use family_tree_layout::layout::{LabelContext, compute_layout};
use family_tree_layout::render::render_svg;
use family_tree_layout::theme::Theme;
use chrono::NaiveDate;
use std::hint::black_box;

/// Every couple in a generation has `children` kids; each kid marries a
/// parentless partner, and the pattern repeats for `generations` rows.
fn synthetic_family(generations: u32, children: u32) -> FamilySnapshot {
    let mut people: Vec<Person> = Vec::new();
    let mut next_id: PersonId = 1;
    let mut alloc = |people: &mut Vec<Person>, year: i32| -> usize {
        let birth = NaiveDate::from_ymd_opt(year, 1 + next_id % 12, 1 + next_id % 28)
            .expect("day within 1..=28");
        people.push(Person::new(next_id, &format!("Person {next_id}"), birth));
        next_id += 1;
        people.len() - 1
    };

    let a = alloc(&mut people, 1900);
    let b = alloc(&mut people, 1901);
    let mut couples = vec![(a, b)];
    for generation in 1..generations {
        let year = 1900 + generation as i32 * 25;
        let mut next_couples = Vec::new();
        for &(a, b) in &couples {
            for _ in 0..children {
                let child = alloc(&mut people, year);
                let spouse = alloc(&mut people, year);
                let (a_id, b_id) = (people[a].id, people[b].id);
                let (child_id, spouse_id) = (people[child].id, people[spouse].id);
                people[child].parent_ids = vec![a_id, b_id];
                people[child].spouse_id = Some(spouse_id);
                people[spouse].spouse_id = Some(child_id);
                people[a].children_ids.push(child_id);
                people[b].children_ids.push(child_id);
                next_couples.push((child, spouse));
            }
        }
        couples = next_couples;
    }
    people[a].spouse_id = Some(people[b].id);
    people[b].spouse_id = Some(people[a].id);
    FamilySnapshot::new(people).expect("synthetic family is valid")
}

fn bench_layout(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let label_config = LabelConfig::default();
    let labels = LabelContext::new(&label_config, None);

    let mut group = c.benchmark_group("layout");
    for (generations, children) in [(3, 3), (4, 3), (5, 2)] {
        let snapshot = synthetic_family(generations, children);
        group.bench_with_input(
            BenchmarkId::new("compute_layout", format!("{generations}x{children}")),
            &snapshot,
            |b, snapshot| {
                b.iter(|| {
                    compute_layout(black_box(snapshot), &config, &theme, &labels)
                        .expect("acyclic")
                })
            },
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let render_config = RenderConfig::default();
    let label_config = LabelConfig::default();
    let labels = LabelContext::new(&label_config, None);
    let snapshot = synthetic_family(4, 3);
    let layout = compute_layout(&snapshot, &config, &theme, &labels).expect("acyclic");

    c.bench_function("render_svg/4x3", |b| {
        b.iter(|| render_svg(black_box(&layout.graph), &theme, &config, &render_config))
    });
}

criterion_group!(benches, bench_layout, bench_render);
criterion_main!(benches);
