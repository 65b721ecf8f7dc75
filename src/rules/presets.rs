//! Built-in rule sets

use super::{OverwritePolicy, Placement, TerrainRule};
use crate::errors::{BoardError, BoardResult};
use crate::grid::{Rgba8, TerrainCategory};
use crate::placement::blob::BlobParams;
use crate::placement::lichtenberg::{EdgePairMode, LichtenbergParams};
use crate::placement::static_fill::StaticParams;
use crate::placement::{AreaFocus, FocusSettings};

pub const PRESET_NAMES: [&str; 4] = ["open_field", "rocky", "river_lands", "caverns"];

fn terrain(
    name: &str,
    category: TerrainCategory,
    cost: u32,
    color: Rgba8,
    coverage: f32,
    placement: Placement,
) -> TerrainRule {
    TerrainRule {
        name: name.to_string(),
        category,
        obstacle: false,
        cost,
        color,
        order: 0,
        rarity: 0.0,
        coverage,
        overwrite: OverwritePolicy::default(),
        focus: FocusSettings::default(),
        placement,
    }
}

fn obstacle(
    name: &str,
    category: TerrainCategory,
    color: Rgba8,
    coverage: f32,
    placement: Placement,
) -> TerrainRule {
    TerrainRule {
        obstacle: true,
        cost: 0,
        ..terrain(name, category, 0, color, coverage, placement)
    }
}

fn open_field() -> Vec<TerrainRule> {
    vec![
        terrain(
            "Meadow",
            TerrainCategory::GRASS,
            1,
            Rgba8::opaque(96, 176, 72),
            0.3,
            Placement::Static(StaticParams {
                cluster_bias: 0.6,
                cluster_radius: 2,
            }),
        ),
        TerrainRule {
            order: 1,
            ..terrain(
                "Woods",
                TerrainCategory::FOREST,
                2,
                Rgba8::opaque(34, 110, 46),
                0.15,
                Placement::Blob(BlobParams::default()),
            )
        },
        TerrainRule {
            order: 2,
            rarity: 0.7,
            ..obstacle(
                "Boulders",
                TerrainCategory::ROCK,
                Rgba8::opaque(128, 128, 128),
                0.03,
                Placement::Static(StaticParams::default()),
            )
        },
    ]
}

fn rocky() -> Vec<TerrainRule> {
    vec![
        terrain(
            "Gravel",
            TerrainCategory::SAND,
            2,
            Rgba8::opaque(186, 170, 130),
            0.12,
            Placement::Static(StaticParams {
                cluster_bias: 0.4,
                cluster_radius: 3,
            }),
        ),
        TerrainRule {
            order: 1,
            focus: FocusSettings::with_focus(AreaFocus::Interior),
            ..obstacle(
                "Ridges",
                TerrainCategory::MOUNTAIN,
                Rgba8::opaque(110, 96, 84),
                0.1,
                Placement::Blob(BlobParams {
                    min_blobs: 1,
                    max_blobs: 3,
                    average_size: 18,
                    ..BlobParams::default()
                }),
            )
        },
        TerrainRule {
            order: 1,
            rarity: 0.3,
            ..obstacle(
                "Rocks",
                TerrainCategory::ROCK,
                Rgba8::opaque(140, 140, 140),
                0.12,
                Placement::Static(StaticParams {
                    cluster_bias: 0.3,
                    cluster_radius: 1,
                }),
            )
        },
    ]
}

fn river_lands() -> Vec<TerrainRule> {
    vec![
        terrain(
            "Grassland",
            TerrainCategory::GRASS,
            1,
            Rgba8::opaque(110, 180, 80),
            0.4,
            Placement::Blob(BlobParams {
                min_blobs: 3,
                max_blobs: 6,
                average_size: 60,
                smoothing_passes: 2,
                ..BlobParams::default()
            }),
        ),
        TerrainRule {
            order: 1,
            ..obstacle(
                "River",
                TerrainCategory::WATER,
                Rgba8::opaque(40, 96, 210),
                0.12,
                Placement::Lichtenberg(LichtenbergParams {
                    min_path_count: 1,
                    max_path_count: 2,
                    cells_per_path: 120,
                    goal_growth_bias: 0.7,
                    branch_spawn_chance: 0.05,
                    max_active_walkers: 3,
                    widen_passes: 1,
                    edge_pairs: Some(EdgePairMode::Opposite),
                    ..LichtenbergParams::default()
                }),
            )
        },
        TerrainRule {
            order: 2,
            overwrite: OverwritePolicy {
                allow_overwrite_terrain: true,
                ..OverwritePolicy::default()
            },
            ..terrain(
                "Marsh",
                TerrainCategory::SWAMP,
                4,
                Rgba8::opaque(76, 104, 70),
                0.06,
                Placement::Blob(BlobParams {
                    average_size: 12,
                    ..BlobParams::default()
                }),
            )
        },
        TerrainRule {
            order: 3,
            rarity: 0.5,
            overwrite: OverwritePolicy {
                allow_overwrite_obstacle: true,
                allow_overwrite_terrain: true,
                only_affect_base: false,
            },
            ..terrain(
                "Road",
                TerrainCategory::ROAD,
                1,
                Rgba8::opaque(150, 120, 80),
                0.05,
                Placement::Lichtenberg(LichtenbergParams {
                    min_path_count: 1,
                    max_path_count: 1,
                    cells_per_path: 90,
                    goal_growth_bias: 0.85,
                    branch_spawn_chance: 0.0,
                    max_active_walkers: 1,
                    repel_penalty_from_existing: false,
                    edge_pairs: Some(EdgePairMode::Adjacent),
                    ..LichtenbergParams::default()
                }),
            )
        },
    ]
}

fn caverns() -> Vec<TerrainRule> {
    vec![
        TerrainRule {
            focus: FocusSettings {
                focus: AreaFocus::Weighted,
                edge_weight: 3.0,
                interior_weight: 1.0,
                anywhere_weight: 0.0,
                ..FocusSettings::default()
            },
            ..obstacle(
                "Cave Walls",
                TerrainCategory::WALL,
                Rgba8::opaque(58, 50, 46),
                0.25,
                Placement::Blob(BlobParams {
                    min_blobs: 4,
                    max_blobs: 8,
                    average_size: 30,
                    grow_chance: 0.7,
                    smoothing_passes: 2,
                    ..BlobParams::default()
                }),
            )
        },
        TerrainRule {
            order: 1,
            overwrite: OverwritePolicy {
                only_affect_base: true,
                ..OverwritePolicy::default()
            },
            ..terrain(
                "Mud",
                TerrainCategory::SWAMP,
                3,
                Rgba8::opaque(92, 74, 52),
                0.1,
                Placement::Blob(BlobParams::default()),
            )
        },
        TerrainRule {
            order: 2,
            rarity: 0.8,
            ..obstacle(
                "Lava Fissure",
                TerrainCategory::LAVA,
                Rgba8::opaque(220, 70, 20),
                0.04,
                Placement::Lichtenberg(LichtenbergParams {
                    cells_per_path: 30,
                    branch_spawn_chance: 0.2,
                    origin: FocusSettings::with_focus(AreaFocus::Interior),
                    aim: FocusSettings::with_focus(AreaFocus::Interior),
                    ..LichtenbergParams::default()
                }),
            )
        },
    ]
}

/// Get a built-in rule set by name
pub fn get_rule_preset(name: &str) -> Option<Vec<TerrainRule>> {
    match name {
        "open_field" => Some(open_field()),
        "rocky" => Some(rocky()),
        "river_lands" => Some(river_lands()),
        "caverns" => Some(caverns()),
        _ => None,
    }
}

/// Like [`get_rule_preset`], but unknown names are an error
pub fn load_rule_preset(name: &str) -> BoardResult<Vec<TerrainRule>> {
    get_rule_preset(name).ok_or_else(|| BoardError::UnknownPreset {
        name: name.to_string(),
    })
}
