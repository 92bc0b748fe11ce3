//! Weapon model classification
//!
//! Phase one labels a record from its keywords and animation type. Phase two
//! runs once the mesh is loaded and lets the root's `Prn` attachment tag
//! settle models that phase one left unknown or labelled as staves.

use std::fmt;
use std::str::FromStr;

use sheath_scene::SceneGraph;
use sheath_shared::fs::normalize_asset_path;
use tracing::{debug, warn};

use crate::records::{AnimationType, WeaponRecord};

/// Shape of a weapon model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModelClassification {
    #[default]
    Unknown,
    Sword,
    Dagger,
    Mace,
    Axe,
    Staff,
    TwoHandMelee,
    TwoHandRange,
    Shield,
}

/// Behavioural group derived from a [`ModelClassification`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WeaponCategory {
    #[default]
    Unknown,
    OneHandMelee,
    TwoHandMelee,
    Shield,
    TwoHandRange,
    Staff,
}

impl fmt::Display for ModelClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for WeaponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ModelClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [ModelClassification; 9] = [
            ModelClassification::Unknown,
            ModelClassification::Sword,
            ModelClassification::Dagger,
            ModelClassification::Mace,
            ModelClassification::Axe,
            ModelClassification::Staff,
            ModelClassification::TwoHandMelee,
            ModelClassification::TwoHandRange,
            ModelClassification::Shield,
        ];
        ALL.into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model classification: {}", s))
    }
}

/// Keywords checked in this order; the first one present wins.
const KEYWORD_PRIORITY: &[(&str, ModelClassification)] = &[
    ("WeapTypeDagger", ModelClassification::Dagger),
    ("WeapTypeSword", ModelClassification::Sword),
    ("WeapTypeWarAxe", ModelClassification::Axe),
    ("WeapTypeMace", ModelClassification::Mace),
    ("WeapTypeBattleaxe", ModelClassification::TwoHandMelee),
    ("WeapTypeGreatsword", ModelClassification::TwoHandMelee),
    ("WeapTypeWarhammer", ModelClassification::TwoHandMelee),
    ("WeapTypeBow", ModelClassification::TwoHandRange),
    ("WeapTypeStaff", ModelClassification::Staff),
];

/// Extra data key carrying the attachment tag.
const PRN_KEY: &str = "Prn";

/// Right-hand variants of left-hand assets end their file stem with this.
const RIGHT_HAND_SUFFIX: &str = "right";

impl ModelClassification {
    /// Phase one: classify from record metadata alone.
    pub fn classify(record: &WeaponRecord) -> Self {
        for (keyword, classification) in KEYWORD_PRIORITY {
            if record
                .keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
            {
                return *classification;
            }
        }
        // Spears and similar mods only carry the sword animation
        if record.animation_type == AnimationType::OneHandSword {
            return ModelClassification::Sword;
        }
        ModelClassification::Unknown
    }

    /// Phase two: reconcile with the `Prn` tag on the mesh root.
    ///
    /// Only `Unknown` and `Staff` are ever overridden. The first `Prn` entry
    /// found ends the scan whether or not its tag is recognised.
    pub fn refine(self, mesh_path: &str, graph: &SceneGraph) -> Self {
        let root = match graph.root_node() {
            Ok((_, root)) => root,
            Err(e) => {
                warn!("{}: {}", mesh_path, e);
                return ModelClassification::Unknown;
            }
        };

        let Some((_, tag)) = graph
            .extra_data_pairs(&root.av)
            .into_iter()
            .find(|(key, _)| *key == PRN_KEY)
        else {
            return self;
        };

        let refined = match self {
            ModelClassification::Unknown => {
                let right_handed = is_right_hand_variant(mesh_path);
                from_any_tag(tag, right_handed).unwrap_or(self)
            }
            // Staves and one-handers share the `*Left` naming, so a one-hand
            // tag outranks the staff keyword
            ModelClassification::Staff => from_one_hand_tag(tag).unwrap_or(self),
            _ => self,
        };
        if refined != self {
            debug!("{}: Prn tag {} refines {} to {}", mesh_path, tag, self, refined);
        }
        refined
    }

    pub fn category(self) -> WeaponCategory {
        match self {
            ModelClassification::Unknown => WeaponCategory::Unknown,
            ModelClassification::Sword
            | ModelClassification::Dagger
            | ModelClassification::Mace
            | ModelClassification::Axe => WeaponCategory::OneHandMelee,
            ModelClassification::Staff => WeaponCategory::Staff,
            ModelClassification::TwoHandMelee => WeaponCategory::TwoHandMelee,
            ModelClassification::TwoHandRange => WeaponCategory::TwoHandRange,
            ModelClassification::Shield => WeaponCategory::Shield,
        }
    }
}

fn is_right_hand_variant(mesh_path: &str) -> bool {
    let normalized = normalize_asset_path(mesh_path);
    let file_name = normalized.rsplit('/').next().unwrap_or_default();
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    stem.ends_with(RIGHT_HAND_SUFFIX)
}

fn from_one_hand_tag(tag: &str) -> Option<ModelClassification> {
    match tag {
        "WeaponDagger" => Some(ModelClassification::Dagger),
        "WeaponSword" => Some(ModelClassification::Sword),
        "WeaponAxe" => Some(ModelClassification::Axe),
        "WeaponMace" => Some(ModelClassification::Mace),
        _ => None,
    }
}

fn from_any_tag(tag: &str, right_handed: bool) -> Option<ModelClassification> {
    from_one_hand_tag(tag).or(match tag {
        // Some right-hand staff copies carry the left-hand tag
        "WeaponStaff" if !right_handed => Some(ModelClassification::Staff),
        "WeaponBack" => Some(ModelClassification::TwoHandMelee),
        "WeaponBow" => Some(ModelClassification::TwoHandRange),
        "SHIELD" => Some(ModelClassification::Shield),
        _ => None,
    })
}

impl WeaponCategory {
    /// Whether meshes of this category get a mirrored scabbard.
    pub fn accepts(self, accept_two_handed: bool) -> bool {
        match self {
            WeaponCategory::OneHandMelee => true,
            WeaponCategory::TwoHandMelee => accept_two_handed,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheath_scene::{AvObject, Block, Node, StringExtraData};

    fn record(keywords: &[&str], animation_type: AnimationType) -> WeaponRecord {
        WeaponRecord {
            id: "Test".into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            animation_type,
            playable: true,
            model: Some("weapons/test.sgf".into()),
            first_person: None,
        }
    }

    fn tagged_graph(tags: &[(&str, &str)]) -> SceneGraph {
        let mut graph = SceneGraph::new();
        let mut av = AvObject::default();
        for (key, value) in tags {
            let name = Some(graph.add_or_find_string(key));
            let value = Some(graph.add_or_find_string(value));
            av.extra_data
                .push(graph.add_block(Block::StringExtraData(StringExtraData { name, value })));
        }
        let root = graph.add_block(Block::Node(Node {
            av,
            children: Vec::new(),
        }));
        graph.set_root(root);
        graph
    }

    #[test]
    fn test_keyword_beats_animation() {
        let dagger = record(&["WeapTypeDagger"], AnimationType::OneHandSword);
        assert_eq!(
            ModelClassification::classify(&dagger),
            ModelClassification::Dagger
        );

        let spear = record(&[], AnimationType::OneHandSword);
        assert_eq!(
            ModelClassification::classify(&spear),
            ModelClassification::Sword
        );

        let unknown = record(&["ArmorHeavy"], AnimationType::TwoHandAxe);
        assert_eq!(
            ModelClassification::classify(&unknown),
            ModelClassification::Unknown
        );
    }

    #[test]
    fn test_keyword_priority_order() {
        // Staff is checked last even when listed first
        let both = record(&["WeapTypeStaff", "WeapTypeMace"], AnimationType::Other);
        assert_eq!(
            ModelClassification::classify(&both),
            ModelClassification::Mace
        );

        let greatsword = record(&["WeapTypeGreatsword"], AnimationType::Other);
        assert_eq!(
            ModelClassification::classify(&greatsword),
            ModelClassification::TwoHandMelee
        );

        let bow = record(&["weaptypebow"], AnimationType::Bow);
        assert_eq!(
            ModelClassification::classify(&bow),
            ModelClassification::TwoHandRange
        );
    }

    #[test]
    fn test_refine_never_overrides_sword() {
        let graph = tagged_graph(&[("Prn", "WeaponStaff")]);
        assert_eq!(
            ModelClassification::Sword.refine("weapons/sword.sgf", &graph),
            ModelClassification::Sword
        );
    }

    #[test]
    fn test_refine_unknown_uses_full_table() {
        let cases = [
            ("WeaponDagger", ModelClassification::Dagger),
            ("WeaponAxe", ModelClassification::Axe),
            ("WeaponStaff", ModelClassification::Staff),
            ("WeaponBack", ModelClassification::TwoHandMelee),
            ("WeaponBow", ModelClassification::TwoHandRange),
            ("SHIELD", ModelClassification::Shield),
            ("WeaponSomething", ModelClassification::Unknown),
        ];
        for (tag, expected) in cases {
            let graph = tagged_graph(&[("Prn", tag)]);
            assert_eq!(
                ModelClassification::Unknown.refine("weapons/thing.sgf", &graph),
                expected,
                "tag {tag}"
            );
        }
    }

    #[test]
    fn test_refine_ignores_staff_tag_on_right_hand_variant() {
        let graph = tagged_graph(&[("Prn", "WeaponStaff")]);
        assert_eq!(
            ModelClassification::Unknown.refine("Weapons\\Staff\\StaffRight.sgf", &graph),
            ModelClassification::Unknown
        );
    }

    #[test]
    fn test_right_hand_variant_naming() {
        assert!(is_right_hand_variant("weapons/staff/staffright.sgf"));
        assert!(is_right_hand_variant("Weapons\\StaffRight.nif"));
        assert!(!is_right_hand_variant("weapons/right/staffleft.sgf"));
        assert!(!is_right_hand_variant("weapons/staff.sgf"));
    }

    #[test]
    fn test_refine_staff_accepts_only_one_hand_tags() {
        let sword = tagged_graph(&[("Prn", "WeaponSword")]);
        assert_eq!(
            ModelClassification::Staff.refine("weapons/staff.sgf", &sword),
            ModelClassification::Sword
        );

        let shield = tagged_graph(&[("Prn", "SHIELD")]);
        assert_eq!(
            ModelClassification::Staff.refine("weapons/staff.sgf", &shield),
            ModelClassification::Staff
        );
    }

    #[test]
    fn test_first_prn_ends_scan() {
        let graph = tagged_graph(&[
            ("Note", "WeaponSword"),
            ("Prn", "WeaponUnknown"),
            ("Prn", "WeaponDagger"),
        ]);
        assert_eq!(
            ModelClassification::Unknown.refine("weapons/thing.sgf", &graph),
            ModelClassification::Unknown
        );
    }

    #[test]
    fn test_refine_without_root_is_unknown() {
        let graph = SceneGraph::new();
        assert_eq!(
            ModelClassification::Staff.refine("weapons/staff.sgf", &graph),
            ModelClassification::Unknown
        );
    }

    #[test]
    fn test_parse_classification() {
        assert_eq!(
            "dagger".parse::<ModelClassification>(),
            Ok(ModelClassification::Dagger)
        );
        assert_eq!(
            "TwoHandMelee".parse::<ModelClassification>(),
            Ok(ModelClassification::TwoHandMelee)
        );
        assert!("Spear".parse::<ModelClassification>().is_err());
    }

    #[test]
    fn test_category_acceptance() {
        assert!(ModelClassification::Mace.category().accepts(false));
        assert!(!ModelClassification::TwoHandMelee.category().accepts(false));
        assert!(ModelClassification::TwoHandMelee.category().accepts(true));
        assert!(!ModelClassification::Staff.category().accepts(true));
        assert!(!ModelClassification::Shield.category().accepts(true));
        assert_eq!(
            ModelClassification::TwoHandRange.category(),
            WeaponCategory::TwoHandRange
        );
    }
}
