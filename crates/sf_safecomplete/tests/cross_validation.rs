use ahash::AHashSet;
use num_bigint::BigUint;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use sf_safecomplete::*;
use sf_structure::FoldingPairs;
use sf_structure::Pair;
use sf_structure::Sequence;
use sf_structure::NAIDX;

/// Every secondary structure of `[i, j]` admissible under the pairing rule.
fn all_structures(seq: &Sequence, mh: usize, i: usize, j: usize) -> Vec<Vec<Pair>> {
    if i > j {
        return vec![vec![]];
    }
    let mut out = all_structures(seq, mh, i + 1, j);
    for k in i + 1..=j {
        if !seq.can_pair(i, k, mh) {
            continue;
        }
        let inner = all_structures(seq, mh, i + 1, k - 1);
        let outer = all_structures(seq, mh, k + 1, j);
        for a in &inner {
            for b in &outer {
                let mut s = vec![Pair::new(i as NAIDX, k as NAIDX)];
                s.extend(a);
                s.extend(b);
                out.push(s);
            }
        }
    }
    out
}

/// All maximum-pairing foldings by exhaustive search.
fn brute_force(seq: &Sequence, mh: usize) -> AHashSet<FoldingPairs> {
    let all = all_structures(seq, mh, 0, seq.len() - 1);
    let best = all.iter().map(|s| s.len()).max().unwrap_or(0);
    all.into_iter()
        .filter(|s| s.len() == best)
        .map(|s| {
            let mut f = FoldingPairs::unpaired(seq.len());
            for p in s {
                f.set_pair(p);
            }
            f
        })
        .collect()
}

fn random_sequence(rng: &mut StdRng, len: usize) -> Sequence {
    let s: String = (0..len).map(|_| ['A', 'C', 'G', 'U'][rng.random_range(0..4)]).collect();
    s.parse().unwrap()
}

fn check(seq: &Sequence, mh: usize) {
    let label = format!("{seq} (min hairpin {mh})");
    let expected = brute_force(seq, mh);

    let pred = Predictor::new(seq, FoldingRules::with_min_hairpin(mh)).unwrap();
    assert_eq!(pred.num_solutions(), &BigUint::from(expected.len()), "{label}");
    let best = expected.iter().next().map_or(0, |f| f.pair_count());
    assert_eq!(pred.optimal_pairs(), best, "{label}");

    // The raw tree has no duplicate foldings, so the decomposition rules
    // are disjoint.
    let raw = pred.build_tree().unwrap();
    let raw_all: Vec<FoldingPairs> = pred.foldings(&raw).collect();
    let raw_set: AHashSet<FoldingPairs> = raw_all.iter().cloned().collect();
    assert_eq!(raw_all.len(), raw_set.len(), "{label}");
    assert_eq!(raw_set, expected, "{label}");

    let tree = pred.fold_tree().unwrap();
    let all: Vec<FoldingPairs> = pred.foldings(&tree).collect();
    let set: AHashSet<FoldingPairs> = all.iter().cloned().collect();
    assert_eq!(all.len(), set.len(), "{label}");
    assert_eq!(set, expected, "{label}");

    let v = wuchty_fill(seq, mh);
    let wuchty: Vec<FoldingPairs> = wuchty_all(seq, &v, mh, 1_000_000).unwrap();
    assert_eq!(wuchty.len(), expected.len(), "{label}");
    assert_eq!(wuchty.into_iter().collect::<AHashSet<_>>(), expected, "{label}");

    let nussinov: AHashSet<FoldingPairs> =
        NussinovDP::new(seq, mh).all_mfe_foldings(usize::MAX).unwrap().into_iter().collect();
    assert_eq!(nussinov, expected, "{label}");

    let safety = pred.safety(&tree).unwrap();
    assert_eq!(safety, pred.safety(&raw).unwrap(), "{label}");
    safety.check_against(&trivial_safety(&all).unwrap()).unwrap();
    pred.cross_check(&tree, &safety, 1_000_000).unwrap();
    for i in 0..seq.len() {
        let free = all.iter().filter(|f| f[i].is_none()).count();
        assert_eq!(safety.single(i), &BigUint::from(free), "{label} base {i}");
        for &j in &safety.partners(i) {
            let direct = all.iter().filter(|f| f[i] == Some(j)).count();
            assert_eq!(
                safety.pair_count(i as NAIDX, j),
                BigUint::from(direct),
                "{label} pair {i} {j}"
            );
        }
    }
}

#[test]
fn test_random_sequences() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        let len = rng.random_range(1..=13);
        let mh = [0, 1, 3][rng.random_range(0..3)];
        let seq = random_sequence(&mut rng, len);
        check(&seq, mh);
    }
}

#[test]
fn test_gc_rich_sequences() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let len = rng.random_range(6..=12);
        let s: String = (0..len).map(|_| ['G', 'C'][rng.random_range(0..2)]).collect();
        check(&s.parse().unwrap(), 0);
    }
}

#[test]
fn test_hairpin_scenario() {
    let seq: Sequence = "GGGAAAUCC".parse().unwrap();
    check(&seq, 3);
    let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
    assert_eq!(pred.optimal_pairs(), 3);
    let tree = pred.fold_tree().unwrap();
    let all = collect_foldings(&tree, seq.len(), 10).unwrap();
    assert!(all.iter().any(|f| f.to_partners() == vec![8, 7, 6, -1, -1, -1, 2, 1, 0]));
    assert_eq!(BigUint::from(all.len()), *pred.num_solutions());
}

#[test]
fn test_two_base_scenarios() {
    let seq: Sequence = "CG".parse().unwrap();
    let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(0)).unwrap();
    let tree = pred.fold_tree().unwrap();
    let all: Vec<FoldingPairs> = pred.foldings(&tree).collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].to_partners(), vec![1, 0]);
    assert_eq!(pred.safety(&tree).unwrap().safe(), &[true, true]);

    let seq: Sequence = "AC".parse().unwrap();
    let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(0)).unwrap();
    assert_eq!(pred.optimal_pairs(), 0);
    assert_eq!(pred.num_solutions(), &BigUint::from(1u32));
    let tree = pred.fold_tree().unwrap();
    let safety = pred.safety(&tree).unwrap();
    assert_eq!(safety.safe(), &[true, true]);
    assert_eq!(safety.single(0), safety.total());
}

#[test]
fn test_ambiguous_scenario() {
    let seq: Sequence = "GAAAACC".parse().unwrap();
    let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
    let tree = pred.fold_tree().unwrap();
    let safety = pred.safety(&tree).unwrap();
    assert_eq!(pred.num_solutions(), &BigUint::from(2u32));
    assert!(safety.num_safe() < seq.len());
    for i in 0..seq.len() {
        let paired: BigUint = safety
            .partners(i)
            .iter()
            .map(|&j| safety.pair_count(i as NAIDX, j))
            .sum();
        assert_eq!(paired + safety.single(i), *safety.total());
    }
}

#[test]
fn test_large_counts_are_exact() {
    // (GC)^40 without hairpin constraint has Catalan(40) optimal foldings.
    let seq: Sequence = "GC".repeat(40).parse().unwrap();
    let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(0)).unwrap();
    let c40: BigUint = "2622127042276492108820".parse().unwrap();
    assert_eq!(pred.num_solutions(), &c40);
}
