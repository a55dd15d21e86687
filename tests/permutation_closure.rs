//! Property tests: every operator maps valid tours to valid tours and leaves
//! the pinned prefix in place.

use proptest::prelude::*;
use u_tsp_ga::distance::{DistanceModel, EdgeWeight};
use u_tsp_ga::ga::operators::{
    greedy_crossover, invert_mutation, order_crossover, random_tour, segment_swap_mutation,
    stochastic_tour, swap_mutation,
};
use u_tsp_ga::ga::Fallback;
use u_tsp_ga::random::create_rng;
use u_tsp_ga::tour::Tour;

/// City coordinates plus a pinned prefix length that leaves at least two
/// movable cities.
fn instance() -> impl Strategy<Value = (Vec<(f64, f64)>, usize)> {
    (4usize..40)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), n),
                0..=n - 2,
            )
        })
}

fn metric() -> impl Strategy<Value = EdgeWeight> {
    prop_oneof![Just(EdgeWeight::Att), Just(EdgeWeight::Euc2d)]
}

fn fallback() -> impl Strategy<Value = Fallback> {
    prop_oneof![
        Just(Fallback::Nearest),
        Just(Fallback::ParentOrder),
        Just(Fallback::Random)
    ]
}

fn assert_tour(perm: &[usize], n: usize, pinned: usize) -> Result<(), TestCaseError> {
    match Tour::new(perm.to_vec()).check(n, pinned) {
        Ok(()) => Ok(()),
        Err(defect) => Err(TestCaseError::fail(format!("{perm:?}: {defect}"))),
    }
}

proptest! {
    #[test]
    fn stochastic_initialization_is_a_permutation(
        (coords, pinned) in instance(),
        metric in metric(),
        seed in any::<u64>(),
    ) {
        let n = coords.len();
        let model = DistanceModel::new(coords, metric).unwrap();
        let mut rng = create_rng(seed);
        let tour = stochastic_tour(&model, pinned, &mut rng);
        assert_tour(&tour, n, pinned)?;
    }

    #[test]
    fn greedy_crossover_is_closed(
        (coords, pinned) in instance(),
        metric in metric(),
        fallback in fallback(),
        seed in any::<u64>(),
    ) {
        let n = coords.len();
        let model = DistanceModel::new(coords, metric).unwrap();
        let mut rng = create_rng(seed);
        let p1 = random_tour(n, pinned, &mut rng);
        let p2 = stochastic_tour(&model, pinned, &mut rng);

        let child = greedy_crossover(&p1, &p2, &model, pinned, fallback, &mut rng);
        assert_tour(&child, n, pinned)?;
        prop_assert_eq!(&child[..pinned], &p1[..pinned]);
    }

    #[test]
    fn order_crossover_is_closed(
        (coords, pinned) in instance(),
        seed in any::<u64>(),
    ) {
        let n = coords.len();
        let mut rng = create_rng(seed);
        let p1 = random_tour(n, pinned, &mut rng);
        let p2 = random_tour(n, pinned, &mut rng);

        let child = order_crossover(&p1, &p2, pinned, &mut rng);
        assert_tour(&child, n, pinned)?;
        prop_assert_eq!(&child[..pinned], &p1[..pinned]);
    }

    #[test]
    fn mutations_are_closed(
        (coords, pinned) in instance(),
        seed in any::<u64>(),
    ) {
        let n = coords.len();
        let mut rng = create_rng(seed);
        let original = random_tour(n, pinned, &mut rng);

        let mut perm = original.clone();
        segment_swap_mutation(&mut perm, pinned, &mut rng);
        assert_tour(&perm, n, pinned)?;
        prop_assert_ne!(&perm, &original);

        let mut perm = original.clone();
        invert_mutation(&mut perm, pinned, &mut rng);
        assert_tour(&perm, n, pinned)?;

        let mut perm = original;
        swap_mutation(&mut perm, pinned, &mut rng);
        assert_tour(&perm, n, pinned)?;
    }

    #[test]
    fn distances_are_non_negative_and_reflexive(
        (coords, _) in instance(),
        metric in metric(),
    ) {
        let model = DistanceModel::new(coords, metric).unwrap();
        for a in 0..model.len() {
            prop_assert_eq!(model.distance(a, a), 0.0);
            for b in 0..model.len() {
                prop_assert!(model.distance(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn euc_2d_is_symmetric((coords, _) in instance()) {
        let model = DistanceModel::new(coords, EdgeWeight::Euc2d).unwrap();
        for a in 0..model.len() {
            for b in 0..model.len() {
                prop_assert_eq!(model.distance(a, b), model.distance(b, a));
            }
        }
    }
}
