use boardgen::config::range_types::{AttemptBudget, UnitFraction};
use boardgen::grid::ORTHOGONAL_OFFSETS;
use boardgen::placement::static_fill::StaticParams;
use boardgen::placement::FocusSettings;
use boardgen::rules::presets::PRESET_NAMES;
use boardgen::{
    BoardGenerator, BoardGrid, GenerationSettings, OverwritePolicy, Placement, Rgba8,
    TerrainCategory, TerrainRule, Topology, get_rule_preset,
};
use pathfinding::prelude::bfs_reach;
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn rocks(coverage: f32) -> TerrainRule {
    TerrainRule {
        name: "Rocks".to_string(),
        category: TerrainCategory::ROCK,
        obstacle: true,
        cost: 0,
        color: Rgba8::opaque(120, 120, 120),
        order: 0,
        rarity: 0.0,
        coverage,
        overwrite: OverwritePolicy::default(),
        focus: FocusSettings::default(),
        placement: Placement::Static(StaticParams::default()),
    }
}

fn settings(width: u32, height: u32, seed: u64) -> GenerationSettings {
    GenerationSettings {
        width,
        height,
        seed,
        ..GenerationSettings::default()
    }
}

fn oracle_reachable(grid: &BoardGrid, start: usize) -> usize {
    bfs_reach(start, |&cell| {
        let x = (cell % grid.width() as usize) as i32;
        let y = (cell / grid.width() as usize) as i32;
        ORTHOGONAL_OFFSETS
            .iter()
            .filter_map(move |(dx, dy)| grid.index_at(x + dx, y + dy))
            .filter(|&next| !grid.blocked()[next])
            .collect::<Vec<_>>()
    })
    .count()
}

#[test]
fn static_obstacles_on_small_board_meet_thresholds() {
    let settings = GenerationSettings {
        min_unblocked: UnitFraction::new(0.7),
        min_reachable: UnitFraction::new(0.9),
        max_attempts: AttemptBudget::new(50),
        topology: Topology::Four,
        ..settings(10, 10, 42)
    };
    let mut generator = BoardGenerator::new();
    let outcome = generator.generate(&[rocks(0.2)], &settings).unwrap();

    assert!(outcome.attempts <= 50);
    assert!(outcome.accepted);
    let grid = generator.grid().clone();
    assert!(grid.open_count() >= 70);

    let start = outcome.start.unwrap();
    let reachable = generator.reachable_count(start, Topology::Four).unwrap();
    assert!(reachable as f32 / grid.open_count() as f32 >= 0.9);
}

#[test]
fn same_seed_gives_identical_boards() {
    for name in PRESET_NAMES {
        let rules = get_rule_preset(name).unwrap();
        let mut first = BoardGenerator::new();
        let mut second = BoardGenerator::new();
        let a = first.generate(&rules, &settings(48, 32, 2024)).unwrap();
        let b = second.generate(&rules, &settings(48, 32, 2024)).unwrap();

        assert_eq!(a, b, "{name}");
        assert_eq!(first.grid().blocked(), second.grid().blocked());
        assert_eq!(first.grid().terrain_costs(), second.grid().terrain_costs());
        assert_eq!(first.grid().categories(), second.grid().categories());
        assert_eq!(first.grid().colors(), second.grid().colors());
        assert_eq!(first.grid().paint_layers(), second.grid().paint_layers());
    }
}

#[test]
fn generated_boards_hold_cell_invariants() {
    for name in PRESET_NAMES {
        let rules = get_rule_preset(name).unwrap();
        let mut generator = BoardGenerator::new();
        for seed in 1..=4 {
            let settings = settings(40, 40, seed);
            let outcome = generator.generate(&rules, &settings).unwrap();
            let grid = generator.grid();

            for (blocked, cost) in grid.blocked().iter().zip(grid.terrain_costs()) {
                if *blocked {
                    assert_eq!(*cost, 0, "{name}/{seed}");
                } else {
                    assert!(*cost >= 1, "{name}/{seed}");
                }
            }

            let budget = ((1.0 - settings.min_unblocked.get()) * 1600.0).round() as usize;
            assert!(grid.blocked_count() <= budget, "{name}/{seed}");
            assert!(grid.paint_layers().iter().all(|&l| (l as usize) <= rules.len()));

            let min_open_cost = grid
                .blocked()
                .iter()
                .zip(grid.terrain_costs())
                .filter(|(blocked, _)| !**blocked)
                .map(|(_, cost)| *cost)
                .min()
                .unwrap_or(1);
            assert_eq!(outcome.min_terrain_cost, min_open_cost.max(1));
        }
    }
}

#[test]
fn flood_fill_matches_bfs_oracle() {
    let rules = get_rule_preset("caverns").unwrap();
    let mut generator = BoardGenerator::new();
    for seed in [3, 17, 99] {
        let outcome = generator.generate(&rules, &settings(36, 24, seed)).unwrap();
        let start = outcome.start.unwrap();

        let four = generator.reachable_count(start, Topology::Four).unwrap();
        assert_eq!(four, oracle_reachable(generator.grid(), start));

        let eight = generator.reachable_count(start, Topology::Eight).unwrap();
        assert!(eight >= four);
    }
}

#[test]
fn goal_picker_returns_distant_reachable_cells() {
    let rules = get_rule_preset("rocky").unwrap();
    let mut generator = BoardGenerator::new();
    let outcome = generator.generate(&rules, &settings(32, 32, 5)).unwrap();
    let start = outcome.start.unwrap();
    let mut rng = Pcg64::seed_from_u64(1);

    for _ in 0..50 {
        let goal = generator
            .pick_goal(start, 10, Topology::Four, &mut rng)
            .unwrap()
            .unwrap();
        assert_ne!(goal, start);
        assert!(generator.reachability().is_reachable(goal));
        let a = generator.grid().index_to_coord(start).unwrap();
        let b = generator.grid().index_to_coord(goal).unwrap();
        assert!(a.manhattan_distance(&b) >= 10);
    }
}

#[test]
fn coordinates_round_trip() {
    let grid = BoardGrid::new(7, 5).unwrap();
    for index in 0..grid.cell_count() {
        let coord = grid.index_to_coord(index).unwrap();
        assert_eq!(grid.coord_to_index(coord.x, coord.y).unwrap(), index);
    }
    for y in 0..5 {
        for x in 0..7 {
            let index = grid.coord_to_index(x, y).unwrap();
            let coord = grid.index_to_coord(index).unwrap();
            assert_eq!((coord.x, coord.y), (x, y));
        }
    }
    assert!(grid.coord_to_index(7, 0).is_err());
    assert!(grid.index_to_coord(35).is_err());
}

#[test]
fn regenerating_at_new_size_resizes_board() {
    let rules = get_rule_preset("open_field").unwrap();
    let mut generator = BoardGenerator::new();
    generator.generate(&rules, &settings(20, 20, 8)).unwrap();
    assert_eq!(generator.grid().cell_count(), 400);

    generator.generate(&rules, &settings(30, 10, 8)).unwrap();
    assert_eq!((generator.grid().width(), generator.grid().height()), (30, 10));
    assert_eq!(generator.grid().blocked().len(), 300);
}
