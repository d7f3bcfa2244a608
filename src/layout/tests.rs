use std::rc::Rc;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use super::sizing::Breakpoint;
use super::*;

#[derive(Debug, Clone)]
struct TestItem {
    id: usize,
    content: ItemContent,
}

impl LayoutItem for TestItem {
    type Id = usize;

    fn id(&self) -> &usize {
        &self.id
    }

    fn content(&self) -> ItemContent {
        self.content
    }
}

fn folder(id: usize) -> TestItem {
    TestItem {
        id,
        content: ItemContent::Folder,
    }
}

fn image(id: usize, width: u32, height: u32) -> TestItem {
    TestItem {
        id,
        content: ItemContent::Image {
            bitmap: BitmapState::Loaded(BitmapSize::new(width, height)),
            caption: Caption::Info,
        },
    }
}

fn pending(id: usize) -> TestItem {
    TestItem {
        id,
        content: ItemContent::Image {
            bitmap: BitmapState::Pending,
            caption: Caption::Info,
        },
    }
}

fn failed(id: usize) -> TestItem {
    TestItem {
        id,
        content: ItemContent::Image {
            bitmap: BitmapState::Failed,
            caption: Caption::Info,
        },
    }
}

fn engine(items: Vec<TestItem>) -> Waterfall<TestItem> {
    engine_with_options(Options::default(), items)
}

fn engine_with_options(options: Options, items: Vec<TestItem>) -> Waterfall<TestItem> {
    let mut waterfall = Waterfall::new(Rc::new(options));
    waterfall.set_items(items);
    waterfall
}

fn placements(waterfall: &Waterfall<TestItem>) -> Vec<(usize, Placement)> {
    waterfall
        .pass()
        .unwrap()
        .placements()
        .map(|(id, placement)| (*id, placement))
        .collect()
}

#[test]
fn empty_pass_completes_immediately() {
    let mut waterfall = engine(vec![]);
    waterfall.begin_pass(1000.);

    let pass = waterfall.pass().unwrap();
    assert!(pass.is_complete());
    assert_eq!(pass.container_height(), 0.);
    pass.verify_invariants();
}

#[test]
fn five_folders_over_three_columns() {
    // Three columns with a 16 px gap; folder cards are 220 + 60 = 280 tall.
    let options = Options {
        breakpoints: vec![Breakpoint {
            max_viewport: 2000.,
            columns: 3,
            gap: 16.,
        }],
        ..Options::default()
    };
    let mut waterfall = engine_with_options(options, (0..5).map(folder).collect());
    waterfall.begin_pass(1000.);

    let pass = waterfall.pass().unwrap();
    assert!(pass.is_complete());
    pass.verify_invariants();

    // (1000 - 60 - 2 * 16) / 3 = 302.67 floors to 302.
    let width = pass.config().item_width;
    assert_eq!(width, 302.);
    let step = width + 16.;

    let expected = [
        (0., 0.),
        (step, 0.),
        (2. * step, 0.),
        (0., 296.),
        (step, 296.),
    ];
    for (id, (x, y)) in expected.iter().enumerate() {
        let placement = pass.placement_of(&id).unwrap();
        assert_eq!(placement.x, *x, "item {id}");
        assert_eq!(placement.y, *y, "item {id}");
        assert_eq!(placement.height, 280., "item {id}");
    }

    // Two rounds of 280 + 16 in the first two columns.
    assert_eq!(pass.container_height(), 592.);
}

#[test]
fn folder_columns_stay_balanced() {
    for count in 1..40 {
        let mut waterfall = engine((0..count).map(folder).collect());
        waterfall.begin_pass(1000.);

        let pass = waterfall.pass().unwrap();
        assert!(pass.is_complete());
        pass.verify_invariants();

        let heights = pass.column_heights().heights();
        let max = heights.iter().copied().fold(0., f64::max);
        let min = heights.iter().copied().fold(f64::INFINITY, f64::min);
        // One folder card slot, gap included.
        assert!(
            max - min <= 280. + 14.,
            "{count} folders spread {max}-{min}"
        );
        assert_eq!(pass.container_height(), max);
    }
}

#[test]
fn image_height_follows_aspect_ratio() {
    let mut waterfall = engine(vec![image(0, 6000, 4000)]);
    waterfall.begin_pass(1000.);

    let placement = waterfall.pass().unwrap().placement_of(&0).unwrap();
    // 304 px wide at 2:3 aspect, plus the 50 px info caption.
    assert_abs_diff_eq!(placement.height, 304. * (4000. / 6000.) + 50., epsilon = 1e-9);
}

#[test]
fn deleted_caption_is_shorter() {
    let item = TestItem {
        id: 0,
        content: ItemContent::Image {
            bitmap: BitmapState::Loaded(BitmapSize::new(1000, 1000)),
            caption: Caption::DeletedAt,
        },
    };
    let mut waterfall = engine(vec![item]);
    waterfall.begin_pass(1000.);

    let placement = waterfall.pass().unwrap().placement_of(&0).unwrap();
    assert_abs_diff_eq!(placement.height, 304. + 30., epsilon = 1e-9);
}

#[test]
fn failed_image_gets_fallback_height() {
    let mut waterfall = engine(vec![failed(0), folder(1)]);
    waterfall.begin_pass(1000.);

    let pass = waterfall.pass().unwrap();
    assert!(pass.is_complete(), "failed loads must not stall the pass");
    let placement = pass.placement_of(&0).unwrap();
    assert_eq!(placement.height, 304. + 50.);
}

#[test]
fn zero_sized_bitmap_measures_like_a_failure() {
    let mut waterfall = engine(vec![image(0, 0, 4000)]);
    waterfall.begin_pass(1000.);

    let placement = waterfall.pass().unwrap().placement_of(&0).unwrap();
    assert_eq!(placement.height, 304. + 50.);
}

#[test]
fn pending_image_defers_later_items() {
    let mut waterfall = engine(vec![image(0, 1000, 1000), pending(1), folder(2)]);
    let generation = waterfall.begin_pass(1000.);

    {
        let pass = waterfall.pass().unwrap();
        assert!(!pass.is_complete());
        // Item 0 is placed, item 2 waits behind the pending item 1.
        assert_eq!(pass.placements().count(), 1);
        assert_eq!(pass.pending().copied().collect::<Vec<_>>(), vec![1]);
        pass.verify_invariants();
    }

    let resolution = waterfall.resolve_image(generation, &1, Ok(BitmapSize::new(2000, 1000)));
    assert_eq!(resolution, Resolution::Measured { pass_complete: true });

    let pass = waterfall.pass().unwrap();
    assert_eq!(pass.placements().count(), 3);
    pass.verify_invariants();
}

#[test]
fn load_failure_resolves_to_fallback() {
    let mut waterfall = engine(vec![pending(0)]);
    let generation = waterfall.begin_pass(1000.);

    let resolution = waterfall.resolve_image(generation, &0, Err(LoadError::Failed));
    assert_eq!(resolution, Resolution::Measured { pass_complete: true });

    let placement = waterfall.pass().unwrap().placement_of(&0).unwrap();
    assert_eq!(placement.height, 304. + 50.);
}

#[test]
fn settle_order_does_not_change_the_layout() {
    let items = vec![pending(0), folder(1), pending(2), image(3, 3000, 2000), pending(4)];
    let sizes = [
        (0, BitmapSize::new(1000, 3000)),
        (2, BitmapSize::new(1000, 500)),
        (4, BitmapSize::new(1000, 1000)),
    ];

    let mut forward = engine(items.clone());
    let generation = forward.begin_pass(1000.);
    for (id, size) in sizes {
        forward.resolve_image(generation, &id, Ok(size));
    }

    let mut backward = engine(items);
    let generation = backward.begin_pass(1000.);
    for (id, size) in sizes.iter().rev() {
        backward.resolve_image(generation, id, Ok(*size));
    }

    assert!(forward.pass().unwrap().is_complete());
    assert_eq!(placements(&forward), placements(&backward));
}

#[test]
fn identical_passes_are_idempotent() {
    let mut waterfall = engine(vec![
        image(0, 6000, 4000),
        folder(1),
        image(2, 4000, 6000),
        failed(3),
        image(4, 1000, 1000),
    ]);

    waterfall.begin_pass(1200.);
    let first = placements(&waterfall);
    let first_height = waterfall.pass().unwrap().container_height();

    waterfall.begin_pass(1200.);
    let second = placements(&waterfall);

    assert_eq!(first, second);
    assert_eq!(waterfall.pass().unwrap().container_height(), first_height);
}

#[test]
fn stale_generation_is_discarded() {
    let mut waterfall = engine(vec![pending(0), folder(1)]);
    let old = waterfall.begin_pass(1000.);
    let _new = waterfall.begin_pass(480.);

    let resolution = waterfall.resolve_image(old, &0, Ok(BitmapSize::new(1000, 1000)));
    assert_eq!(resolution, Resolution::Stale);

    // The live pass still waits for its own measurement of item 0.
    let pass = waterfall.pass().unwrap();
    assert!(!pass.is_complete());
    assert_eq!(pass.pending().count(), 1);
    pass.verify_invariants();
}

#[test]
fn measurement_for_unknown_item_is_rejected() {
    let mut waterfall = engine(vec![folder(0)]);
    let generation = waterfall.begin_pass(1000.);

    let resolution = waterfall.resolve_image(generation, &7, Ok(BitmapSize::new(1, 1)));
    assert_eq!(resolution, Resolution::UnknownItem);
}

#[test]
fn duplicate_measurement_is_ignored() {
    let mut waterfall = engine(vec![pending(0)]);
    let generation = waterfall.begin_pass(1000.);

    waterfall.resolve_image(generation, &0, Ok(BitmapSize::new(1000, 2000)));
    let before = placements(&waterfall);

    let resolution = waterfall.resolve_image(generation, &0, Ok(BitmapSize::new(1000, 9000)));
    assert_eq!(resolution, Resolution::Measured { pass_complete: true });
    assert_eq!(placements(&waterfall), before);
}

#[test]
fn replacing_items_drops_the_live_pass() {
    let mut waterfall = engine(vec![pending(0)]);
    let generation = waterfall.begin_pass(1000.);

    waterfall.set_items(vec![folder(1)]);
    assert!(waterfall.pass().is_none());

    // The in-flight measurement from before the swap is now stale.
    let resolution = waterfall.resolve_image(generation, &0, Ok(BitmapSize::new(1, 1)));
    assert_eq!(resolution, Resolution::Stale);
}

fn arb_content() -> impl Strategy<Value = ItemContent> {
    let caption = prop_oneof![
        Just(Caption::None),
        Just(Caption::Info),
        Just(Caption::DeletedAt),
    ];
    prop_oneof![
        Just(ItemContent::Folder),
        (1u32..6000, 1u32..6000, caption.clone()).prop_map(|(w, h, caption)| {
            ItemContent::Image {
                bitmap: BitmapState::Loaded(BitmapSize::new(w, h)),
                caption,
            }
        }),
        caption
            .clone()
            .prop_map(|caption| ItemContent::Image { bitmap: BitmapState::Pending, caption }),
        caption.prop_map(|caption| ItemContent::Image { bitmap: BitmapState::Failed, caption }),
    ]
}

proptest! {
    #[test]
    fn random_passes_hold_invariants(
        contents in prop::collection::vec(arb_content(), 0..40),
        viewport in 100f64..3000.,
        order in prop::collection::vec(any::<prop::sample::Index>(), 40),
        sizes in prop::collection::vec((1u32..6000, 1u32..6000), 40),
    ) {
        let items: Vec<TestItem> = contents
            .iter()
            .enumerate()
            .map(|(id, content)| TestItem { id, content: *content })
            .collect();

        // Reference: settle pending bitmaps in item order.
        let mut reference = engine(items.clone());
        let generation = reference.begin_pass(viewport);
        let pending_ids: Vec<usize> =
            reference.pass().unwrap().pending().copied().collect();
        for id in &pending_ids {
            let (w, h) = sizes[id % sizes.len()];
            reference.resolve_image(generation, id, Ok(BitmapSize::new(w, h)));
        }

        // Same items, settle order permuted by the index sequence.
        let mut shuffled = engine(items);
        let generation = shuffled.begin_pass(viewport);
        let mut remaining = pending_ids.clone();
        let mut order = order.iter();
        while !remaining.is_empty() {
            let pick = order.next().unwrap().index(remaining.len());
            let id = remaining.swap_remove(pick);
            let (w, h) = sizes[id % sizes.len()];
            shuffled.resolve_image(generation, &id, Ok(BitmapSize::new(w, h)));
            shuffled.pass().unwrap().verify_invariants();
        }

        let reference_pass = reference.pass().unwrap();
        let shuffled_pass = shuffled.pass().unwrap();
        prop_assert!(reference_pass.is_complete());
        prop_assert!(shuffled_pass.is_complete());
        reference_pass.verify_invariants();
        shuffled_pass.verify_invariants();

        prop_assert_eq!(
            placements(&reference),
            placements(&shuffled),
        );
        prop_assert_eq!(
            reference_pass.container_height(),
            shuffled_pass.container_height()
        );
    }
}
