//! Authored terrain rules: what to paint, where, and what it may overwrite

use crate::errors::{BoardError, BoardResult};
use crate::grid::{BoardGrid, CellPaint, Rgba8, TerrainCategory};
use crate::placement::blob::BlobParams;
use crate::placement::focus::FocusSettings;
use crate::placement::lichtenberg::LichtenbergParams;
use crate::placement::static_fill::StaticParams;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub mod presets;

/// Which cells a rule may paint over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverwritePolicy {
    /// May turn a blocked cell back into open terrain
    pub allow_overwrite_obstacle: bool,
    /// May only paint cells no other rule has touched
    pub only_affect_base: bool,
    /// May paint over cells already painted by another rule
    pub allow_overwrite_terrain: bool,
}

/// Cell-selection strategy and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    Static(StaticParams),
    Blob(BlobParams),
    Lichtenberg(LichtenbergParams),
}

impl Placement {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Placement::Static(_) => "static",
            Placement::Blob(_) => "blob",
            Placement::Lichtenberg(_) => "lichtenberg",
        }
    }

    fn validate_params(&self) -> Result<(), ValidationErrors> {
        match self {
            Placement::Static(params) => params.validate(),
            Placement::Blob(params) => params.validate(),
            Placement::Lichtenberg(params) => params.validate(),
        }
    }
}

fn default_cost() -> u32 {
    1
}

/// A single terrain rule, read-only during generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TerrainRule {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub category: TerrainCategory,
    #[serde(default)]
    pub obstacle: bool,
    #[validate(range(max = 100_000))]
    #[serde(default = "default_cost")]
    pub cost: u32,
    pub color: Rgba8,
    /// Lower orders are painted first
    #[serde(default)]
    pub order: i32,
    /// 0 = common, 1 = rare; rarer rules tend to be painted later within an order
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub rarity: f32,
    /// Fraction of all cells the rule tries to paint
    #[validate(range(min = 0.0, max = 1.0))]
    pub coverage: f32,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    #[validate(nested)]
    #[serde(default)]
    pub focus: FocusSettings,
    pub placement: Placement,
}

impl TerrainRule {
    /// Validate the rule and its placement parameters
    pub fn check(&self) -> BoardResult<()> {
        let describe = |errors: ValidationErrors| BoardError::InvalidRule {
            name: self.name.clone(),
            reason: describe_validation_errors(&errors),
        };
        self.validate().map_err(describe)?;
        self.placement.validate_params().map_err(describe)?;
        Ok(())
    }

    /// Cap on proposed cells for a board of `cell_count` cells
    pub fn coverage_cap(&self, cell_count: usize) -> usize {
        ((self.coverage.clamp(0.0, 1.0) as f64) * cell_count as f64).round() as usize
    }

    /// Whether placement may route through this cell: open cells only,
    /// unless the rule may overwrite obstacles
    pub fn can_enter(&self, grid: &BoardGrid, index: usize) -> bool {
        self.overwrite.allow_overwrite_obstacle || grid.is_open_unchecked(index)
    }

    /// Cell values this rule writes under the given paint layer
    pub fn cell_paint(&self, layer: u8) -> CellPaint {
        CellPaint {
            blocked: self.obstacle,
            category: self.category,
            cost: if self.obstacle { 0 } else { self.cost.max(1) },
            color: self.color,
            layer,
        }
    }
}

/// Validate a whole rule list, including the paint-layer limit
pub fn check_rules(rules: &[TerrainRule]) -> BoardResult<()> {
    if rules.len() > u8::MAX as usize {
        return Err(BoardError::TooManyRules { count: rules.len() });
    }
    rules.iter().try_for_each(TerrainRule::check)
}

/// Flatten validator output into a single readable line
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors.iter().map(|e| e.code.to_string()).collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    if parts.is_empty() {
        parts.push(errors.to_string());
    }
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocks() -> TerrainRule {
        TerrainRule {
            name: "Rocks".to_string(),
            category: TerrainCategory::ROCK,
            obstacle: true,
            cost: 4,
            color: Rgba8::opaque(100, 100, 100),
            order: 0,
            rarity: 0.0,
            coverage: 0.2,
            overwrite: OverwritePolicy::default(),
            focus: FocusSettings::default(),
            placement: Placement::Static(StaticParams::default()),
        }
    }

    #[test]
    fn test_valid_rule_passes() {
        assert!(rocks().check().is_ok());
    }

    #[test]
    fn test_coverage_out_of_range() {
        let rule = TerrainRule {
            coverage: 1.5,
            ..rocks()
        };
        let err = rule.check().unwrap_err();
        assert!(matches!(err, BoardError::InvalidRule { .. }));
        assert!(err.to_string().contains("coverage"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let rule = TerrainRule {
            name: String::new(),
            ..rocks()
        };
        assert!(rule.check().is_err());
    }

    #[test]
    fn test_invalid_placement_params_rejected() {
        let rule = TerrainRule {
            placement: Placement::Blob(BlobParams {
                min_blobs: 5,
                max_blobs: 2,
                ..BlobParams::default()
            }),
            ..rocks()
        };
        assert!(rule.check().is_err());
    }

    #[test]
    fn test_obstacle_paint_has_zero_cost() {
        let paint = rocks().cell_paint(3);
        assert!(paint.blocked);
        assert_eq!(paint.cost, 0);
        assert_eq!(paint.layer, 3);
    }

    #[test]
    fn test_blocked_cells_need_obstacle_overwrite() {
        let mut grid = BoardGrid::new(2, 1).unwrap();
        grid.set_cell(1, rocks().cell_paint(1)).unwrap();

        let rule = rocks();
        assert!(rule.can_enter(&grid, 0));
        assert!(!rule.can_enter(&grid, 1));

        let clearing = TerrainRule {
            overwrite: OverwritePolicy {
                allow_overwrite_obstacle: true,
                ..OverwritePolicy::default()
            },
            ..rocks()
        };
        assert!(clearing.can_enter(&grid, 1));
    }

    #[test]
    fn test_coverage_cap() {
        assert_eq!(rocks().coverage_cap(100), 20);
        assert_eq!(rocks().coverage_cap(7), 1);
    }

    #[test]
    fn test_too_many_rules() {
        let rules = vec![rocks(); 256];
        assert!(matches!(
            check_rules(&rules),
            Err(BoardError::TooManyRules { count: 256 })
        ));
        assert!(check_rules(&rules[..255]).is_ok());
    }

    #[test]
    fn test_rule_from_toml() {
        let source = r#"
            name = "Marsh"
            category = "swamp"
            cost = 3
            color = [60, 90, 60, 255]
            coverage = 0.15
            rarity = 0.4

            [overwrite]
            allow_overwrite_terrain = true

            [focus]
            focus = "interior"

            [placement]
            mode = "blob"
            min_blobs = 2
            max_blobs = 4
        "#;
        let rule: TerrainRule = toml::from_str(source).unwrap();
        assert_eq!(rule.category, TerrainCategory::SWAMP);
        assert!(!rule.obstacle);
        assert!(rule.overwrite.allow_overwrite_terrain);
        assert!(matches!(rule.placement, Placement::Blob(ref p) if p.max_blobs == 4));
        assert!(rule.check().is_ok());
    }
}
