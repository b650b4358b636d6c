//! Migration rules: turning source animations into overlay groups
//!
//! Every animation state is looked up (case-insensitively) in a
//! [`MigrationTable`]. States without an entry pass through unchanged, one
//! overlay group per frame. `delete` states produce nothing and exist only
//! to feed `compose` rules, which overlay the frames of another animation
//! family onto the primary at a named anchor point.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::geometry::OverlayGroup;
use crate::models::{Animation, Point, StateKey};

/// How one animation state is migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MigrationRule {
    /// One overlay group per frame, state name kept.
    Identity,
    /// No output.
    Delete,
    /// One output animation per composite whose family is present.
    Compose { composites: Vec<Composite> },
}

/// One composite output of a `compose` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    /// State of the secondary animation family (case-insensitive).
    pub family: String,
    /// Point label on the primary frame where the secondary origin is placed.
    pub anchor: String,
    /// State name of the produced animation.
    pub output: String,
    /// Label of the derived point carried from the secondary frame. When
    /// `None`, composited frames carry no points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Non-fatal problems found while migrating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationWarning {
    /// A composite's secondary family is absent; that output was skipped.
    DependencyMissing { state: String, family: String },
    /// The anchor point exists but has an invalid coordinate; `(0, 0)` was used.
    AnchorInvalid { state: String, frame: usize, anchor: String },
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationWarning::DependencyMissing { state, family } => {
                write!(f, "'{}' has no '{}' animation to compose with, skipped", state, family)
            }
            MigrationWarning::AnchorInvalid { state, frame, anchor } => {
                write!(f, "'{}' frame {} has an invalid '{}' point, using (0, 0)", state, frame, anchor)
            }
        }
    }
}

static IDENTITY: MigrationRule = MigrationRule::Identity;

/// Mapping from normalised state key to rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTable {
    rules: HashMap<StateKey, MigrationRule>,
}

impl MigrationTable {
    /// A table with no rules: every state is migrated by identity.
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Add or replace the rule for `state`.
    pub fn insert(&mut self, state: &str, rule: MigrationRule) {
        self.rules.insert(StateKey::new(state), rule);
    }

    pub fn rule_for(&self, key: &StateKey) -> &MigrationRule {
        self.rules.get(key).unwrap_or(&IDENTITY)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for MigrationTable {
    /// Hand and hilt attachments are folded into the character swing.
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("HAND", MigrationRule::Delete);
        table.insert("HILT", MigrationRule::Delete);
        table.insert(
            "CHARACTER_SWING",
            MigrationRule::Compose {
                composites: vec![
                    Composite {
                        family: "HILT".to_string(),
                        anchor: "HILT".to_string(),
                        output: "CHARACTER_SWING_HILT".to_string(),
                        endpoint: Some("ENDPOINT".to_string()),
                    },
                    Composite {
                        family: "HAND".to_string(),
                        anchor: "HILT".to_string(),
                        output: "CHARACTER_SWING_HAND".to_string(),
                        endpoint: None,
                    },
                ],
            },
        );
        table
    }
}

/// Overlay groups for one output animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedState {
    pub state: String,
    pub groups: Vec<OverlayGroup>,
}

/// Output of [`migrate`].
#[derive(Debug, Clone, Default)]
pub struct Migration {
    pub states: Vec<MigratedState>,
    pub warnings: Vec<MigrationWarning>,
}

/// Apply `table` to every animation in order.
///
/// Frames are cloned into the groups, so the input set is never aliased by
/// the geometry that is resolved later.
pub fn migrate(animations: &[Animation], table: &MigrationTable) -> Migration {
    let mut migration = Migration::default();

    for animation in animations {
        match table.rule_for(animation.key()) {
            MigrationRule::Identity => {
                migration.states.push(MigratedState {
                    state: animation.state().to_string(),
                    groups: identity_groups(animation),
                });
            }
            MigrationRule::Delete => {
                debug!(state = animation.state(), "deleted by migration");
            }
            MigrationRule::Compose { composites } => {
                for composite in composites {
                    let family_key = StateKey::new(&composite.family);
                    let Some(family) = animations.iter().find(|a| a.key() == &family_key) else {
                        let warning = MigrationWarning::DependencyMissing {
                            state: animation.state().to_string(),
                            family: composite.family.clone(),
                        };
                        warn!("{}", warning);
                        migration.warnings.push(warning);
                        continue;
                    };

                    debug!(
                        state = animation.state(),
                        family = family.state(),
                        output = %composite.output,
                        "composing"
                    );
                    let groups = compose(animation, family, composite, &mut migration.warnings);
                    migration.states.push(MigratedState { state: composite.output.clone(), groups });
                }
            }
        }
    }

    migration
}

fn identity_groups(animation: &Animation) -> Vec<OverlayGroup> {
    animation.frames.iter().cloned().map(OverlayGroup::new).collect()
}

/// Overlay `family` frame `i` onto `primary` frame `i + 1`.
///
/// Frame 0 of the primary is left bare and loses its points. Primary frames
/// past the end of the family keep their own points; family frames past the
/// end of the primary are ignored.
fn compose(
    primary: &Animation,
    family: &Animation,
    composite: &Composite,
    warnings: &mut Vec<MigrationWarning>,
) -> Vec<OverlayGroup> {
    let mut groups = identity_groups(primary);

    if let Some(first) = groups.first_mut() {
        first.out_frame.points.clear();
    }

    for (index, (group, secondary)) in groups.iter_mut().skip(1).zip(&family.frames).enumerate() {
        let base = group.primary();
        let (anchor_x, anchor_y) = match base.find_point(&composite.anchor) {
            Some(point) => point.coords().unwrap_or_else(|| {
                let warning = MigrationWarning::AnchorInvalid {
                    state: primary.state().to_string(),
                    frame: index + 1,
                    anchor: composite.anchor.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                (0, 0)
            }),
            None => (0, 0),
        };

        let offsetx = anchor_x - base.originx;
        let offsety = anchor_y - base.originy;
        group.push(secondary.clone(), offsetx, offsety);

        group.out_frame.points = match &composite.endpoint {
            Some(label) => {
                // Secondary-local point expressed in primary-local coordinates
                let corner_x = anchor_x - secondary.originx;
                let corner_y = anchor_y - secondary.originy;
                let (x, y) = match secondary.find_point(label) {
                    Some(end) => (end.x.map(|x| corner_x + x), end.y.map(|y| corner_y + y)),
                    None => (Some(corner_x), Some(corner_y)),
                };
                vec![Point { label: label.clone(), x, y }]
            }
            None => Vec::new(),
        };
    }

    groups
}
