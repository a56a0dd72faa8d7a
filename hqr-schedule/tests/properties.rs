use hqr_schedule::{
    DomainSize, EliminationKind, HighLevelSize, PivotSchedule, ScheduleConfig, TileGrid,
    TreeTopology,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;

fn random_topology(rng: &mut StdRng) -> TreeTopology {
    TreeTopology::ALL[rng.gen_range(0..TreeTopology::ALL.len())]
}

fn random_case(rng: &mut StdRng) -> (TileGrid, ScheduleConfig) {
    let mt = rng.gen_range(1..=24);
    let nt = rng.gen_range(1..=24);
    let p = rng.gen_range(1..=5);
    let q = rng.gen_range(1..=3);
    let grid = TileGrid::new(mt, nt, p, q).unwrap();
    let domain_size = if rng.gen_bool(0.3) {
        DomainSize::Auto
    } else {
        DomainSize::Fixed(rng.gen_range(1..=mt + 2))
    };
    let high_level_size = if rng.gen_bool(0.5) {
        HighLevelSize::Auto
    } else {
        HighLevelSize::Fixed(rng.gen_range(1..=p + 1))
    };
    let config = ScheduleConfig {
        low_level: random_topology(rng),
        high_level: random_topology(rng),
        domain_size,
        high_level_size,
        domino: rng.gen_bool(0.5),
        round_robin_roots: rng.gen_bool(0.5),
    };
    (grid, config)
}

fn random_schedules(seed: u64, count: usize) -> Vec<PivotSchedule> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let (grid, config) = random_case(&mut rng);
            PivotSchedule::new(grid, config).unwrap()
        })
        .collect()
}

#[test]
fn test_every_live_row_eliminated_once() {
    for s in random_schedules(1, 200) {
        let mt = s.grid().mt();
        for k in 0..s.grid().nt() {
            let count = s.active_elimination_count(k).unwrap();
            let mut rows: Vec<usize> = (0..count).map(|i| s.tile_at(k, i).unwrap()).collect();
            assert!(rows.iter().all(|&m| s.kind_of(k, m).unwrap().is_active()));
            if k < s.columns() {
                assert_eq!(rows[0], k);
                assert_eq!(s.kind_of(k, k).unwrap(), EliminationKind::Panel);
                rows.sort_unstable();
                assert_eq!(rows, (k..mt).collect::<Vec<_>>());
            } else {
                assert!(rows.is_empty());
                assert_eq!(s.kind_of(k, mt - 1).unwrap(), EliminationKind::Inactive);
            }
        }
    }
}

#[test]
fn test_pivots_form_a_forest_rooted_at_panel() {
    for s in random_schedules(2, 200) {
        let mt = s.grid().mt();
        for k in 0..s.columns() {
            assert_eq!(s.pivot_of(k, k).unwrap(), k);
            for m in k + 1..mt {
                let mut cur = m;
                let mut hops = 0;
                while cur != k {
                    let next = s.pivot_of(k, cur).unwrap();
                    assert!(next >= k && next < mt && next != cur);
                    // a tile leaves the schedule no earlier than what merged into it
                    if next != k {
                        assert!(s.step_of(k, next).unwrap() >= s.step_of(k, cur).unwrap());
                    }
                    cur = next;
                    hops += 1;
                    assert!(hops < mt, "pivot cycle at column {k}");
                }
            }
            for m in 0..k {
                assert_eq!(s.kind_of(k, m).unwrap(), EliminationKind::Inactive);
                assert!(s.pivot_of(k, m).is_err());
            }
        }
    }
}

#[test]
fn test_merge_kind_matches_domains() {
    for s in random_schedules(3, 200) {
        let part = s.partition();
        for k in 0..s.columns() {
            for node in s.nodes(k).unwrap().filter(|n| n.kind.is_merge()) {
                let same = part.domain_of(node.tile).map(|d| d.index)
                    == part.domain_of(node.pivot).map(|d| d.index);
                assert_eq!(same, node.kind == EliminationKind::LocalMerge);
            }
        }
    }
}

#[test]
fn test_chain_links_round_trip() {
    for s in random_schedules(4, 200) {
        let mt = s.grid().mt();
        for k in 0..s.columns() {
            for p in k..mt {
                let mut prev = None;
                let mut cur = s.first_in_chain(k, p).unwrap();
                while let Some(m) = cur {
                    assert_eq!(s.pivot_of(k, m).unwrap(), p);
                    assert_eq!(s.prev_in_chain(k, p, m).unwrap(), prev);
                    let next = s.next_in_chain(k, p, m).unwrap();
                    if let Some(n) = next {
                        assert_eq!(s.prev_in_chain(k, p, n).unwrap(), Some(m));
                        assert!(s.step_of(k, n).unwrap() > s.step_of(k, m).unwrap());
                    }
                    prev = Some(m);
                    cur = next;
                }
                assert_eq!(s.last_in_chain(k, p).unwrap(), prev);
            }
        }
    }
}

#[test]
fn test_chain_law_holds_for_every_pivot_pair() {
    for s in random_schedules(8, 200) {
        for k in 0..s.columns() {
            for m in k..s.grid().mt() {
                let p = s.pivot_of(k, m).unwrap();
                if let Some(n) = s.next_in_chain(k, p, m).unwrap() {
                    assert_eq!(s.prev_in_chain(k, p, n).unwrap(), Some(m));
                }
                if let Some(before) = s.prev_in_chain(k, p, m).unwrap() {
                    assert_eq!(s.next_in_chain(k, p, before).unwrap(), Some(m));
                }
            }
            // the panel is its own pivot and sits outside every chain
            assert_eq!(s.next_in_chain(k, k, k).unwrap(), None);
            assert_eq!(s.prev_in_chain(k, k, k).unwrap(), None);
        }
    }
}

#[test]
fn test_local_merges_never_cross_process_rows() {
    for s in random_schedules(9, 300) {
        let part = s.partition();
        for d in part.domains() {
            let (lo_owner, _) = s.grid().owner(d.lo, 0).unwrap();
            let (hi_owner, _) = s.grid().owner(d.hi - 1, 0).unwrap();
            assert_eq!(lo_owner, d.process);
            assert_eq!(hi_owner, d.process);
        }
        for k in 0..s.columns() {
            for node in s.nodes(k).unwrap() {
                if node.kind == EliminationKind::LocalMerge {
                    assert!(!s.crosses_process(k, node.tile).unwrap());
                }
            }
        }
    }
}

#[test]
fn test_domain_of_covers_rows_exactly() {
    for s in random_schedules(10, 200) {
        let mt = s.grid().mt();
        let part = s.partition();
        for m in 0..mt {
            let d = part.domain_of(m).unwrap();
            assert!(d.contains(m));
        }
        assert!(part.domain_of(mt).is_none());
        assert!(part.domain_of(mt + 5).is_none());
        assert_eq!(part.domains().last().unwrap().hi, mt);
    }
}

#[test]
fn test_index_of_inverts_tile_at() {
    for s in random_schedules(5, 100) {
        for k in 0..s.columns() {
            for i in 0..s.active_elimination_count(k).unwrap() {
                let m = s.tile_at(k, i).unwrap();
                assert_eq!(s.index_of(k, m).unwrap(), i);
            }
        }
    }
}

#[test]
fn test_domino_keeps_pivot_relation() {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..150 {
        let (grid, config) = random_case(&mut rng);
        let plain = PivotSchedule::new(grid, config.with_domino(false)).unwrap();
        let domino = PivotSchedule::new(grid, config.with_domino(true)).unwrap();
        for k in 0..plain.columns() {
            for m in k..grid.mt() {
                assert_eq!(plain.pivot_of(k, m), domino.pivot_of(k, m));
                assert_eq!(plain.kind_of(k, m), domino.kind_of(k, m));
                assert!(domino.step_of(k, m).unwrap() <= plain.step_of(k, m).unwrap());
            }
            assert!(domino.step_count(k).unwrap() <= plain.step_count(k).unwrap());
        }
        domino.validate().unwrap();
    }
}

#[test]
fn test_round_robin_keeps_tree_shapes() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..150 {
        let (grid, config) = random_case(&mut rng);
        let fixed = PivotSchedule::new(grid, config.with_round_robin_roots(false)).unwrap();
        let rotating = PivotSchedule::new(grid, config.with_round_robin_roots(true)).unwrap();
        for k in 0..fixed.columns() {
            let a = fixed.low_level().column(k);
            let b = rotating.low_level().column(k);
            assert_eq!(a.len(), b.len());
            for (da, db) in a.iter().zip(b) {
                assert_eq!(da.domain, db.domain);
                assert_eq!(da.reduction.tree(), db.reduction.tree());
                let mut la = da.leaves().to_vec();
                let mut lb = db.leaves().to_vec();
                la.sort_unstable();
                lb.sort_unstable();
                assert_eq!(la, lb);
            }
            // the panel tile stays the root of its own domain
            assert_eq!(rotating.low_level().roots(k).next(), Some(k));
        }
    }
}

#[test]
fn test_round_robin_moves_domain_roots() {
    let grid = TileGrid::new(8, 4, 2, 1).unwrap();
    let config = ScheduleConfig::default()
        .with_domain_size(DomainSize::Fixed(4))
        .with_round_robin_roots(true);
    let s = PivotSchedule::new(grid, config).unwrap();
    let roots: Vec<usize> = (0..4).map(|k| s.low_level().roots(k).nth(1).unwrap()).collect();
    assert_eq!(roots, vec![4, 5, 6, 7]);
    assert_eq!(s.pivot_of(2, 6).unwrap(), 2);
    assert_eq!(s.kind_of(2, 6).unwrap(), EliminationKind::DomainMerge);
}

#[test]
fn test_concurrent_queries_match_sequential() {
    let grid = TileGrid::new(40, 30, 4, 2).unwrap();
    let config = ScheduleConfig::default()
        .with_low_level(TreeTopology::Greedy)
        .with_high_level(TreeTopology::Fibonacci)
        .with_domino(true);
    let s = PivotSchedule::new(grid, config).unwrap();

    let walk = |k: usize| -> Vec<(usize, usize, usize)> {
        s.nodes(k)
            .unwrap()
            .map(|n| (n.tile, s.pivot_of(k, n.tile).unwrap(), n.step))
            .collect()
    };
    let expected: Vec<_> = (0..s.columns()).map(walk).collect();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let walk = &walk;
                scope.spawn(move || {
                    (0..30)
                        .filter(|k| k % 4 == t)
                        .map(|k| (k, walk(k)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for (k, got) in handle.join().unwrap() {
                assert_eq!(got, expected[k]);
            }
        }
    });
}

#[test]
fn test_configuration_errors() {
    assert!(TileGrid::new(0, 3, 1, 1).is_err());
    assert!(TileGrid::new(3, 3, 1, 0).is_err());
    let grid = TileGrid::new(4, 4, 1, 1).unwrap();
    let err = PivotSchedule::new(
        grid,
        ScheduleConfig::default().with_domain_size(DomainSize::Fixed(0)),
    )
    .unwrap_err();
    assert!(err.is_configuration());
    assert!(ScheduleConfig::from_codes(0, 7, 0, 0, 0, 0).is_err());
}
