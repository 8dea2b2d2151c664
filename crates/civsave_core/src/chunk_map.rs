//! Which chunk ordinal holds which per-slot table.
//!
//! Chunks carry no tags; meaning comes purely from position. The low
//! ordinals are shared, while the colour table and the second copy of the
//! status table sit three chunks later in Beyond Earth saves.

use serde::{Deserialize, Serialize};

use crate::header::Variant;

pub const DISPLAY_NAMES_ORDINAL: usize = 1;
pub const STATUS_ORDINAL: usize = 2;
pub const CIVILIZATION_NAMES_ORDINAL: usize = 6;
pub const LEADERS_ORDINAL: usize = 7;
pub const PASSWORDS_ORDINAL: usize = 11;

/// The active player index sits this many bytes before the leader chunk end.
pub const ACTIVE_PLAYER_BACK_OFFSET: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkRole {
    DisplayNames,
    Status,
    CivilizationNames,
    Leaders,
    Passwords,
    Colors,
}

impl ChunkRole {
    /// Tentative roles are only confirmed once the first payload value has
    /// been read (see [`Classification::Tentative`]).
    pub fn is_tentative(self) -> bool {
        matches!(self, Self::Colors)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DisplayNames => "display_names",
            Self::Status => "status",
            Self::CivilizationNames => "civilization_names",
            Self::Leaders => "leaders",
            Self::Passwords => "passwords",
            Self::Colors => "colors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unclassified,
    Tentative(ChunkRole),
    Confirmed(ChunkRole),
}

#[derive(Debug)]
pub struct VariantLayout {
    roles: &'static [(usize, ChunkRole)],
}

const CIV5_ROLES: [(usize, ChunkRole); 7] = [
    (DISPLAY_NAMES_ORDINAL, ChunkRole::DisplayNames),
    (STATUS_ORDINAL, ChunkRole::Status),
    (CIVILIZATION_NAMES_ORDINAL, ChunkRole::CivilizationNames),
    (LEADERS_ORDINAL, ChunkRole::Leaders),
    (PASSWORDS_ORDINAL, ChunkRole::Passwords),
    (23, ChunkRole::Colors),
    (26, ChunkRole::Status),
];

const BEYOND_EARTH_ROLES: [(usize, ChunkRole); 7] = [
    (DISPLAY_NAMES_ORDINAL, ChunkRole::DisplayNames),
    (STATUS_ORDINAL, ChunkRole::Status),
    (CIVILIZATION_NAMES_ORDINAL, ChunkRole::CivilizationNames),
    (LEADERS_ORDINAL, ChunkRole::Leaders),
    (PASSWORDS_ORDINAL, ChunkRole::Passwords),
    (26, ChunkRole::Colors),
    (29, ChunkRole::Status),
];

static CIV5_LAYOUT: VariantLayout = VariantLayout { roles: &CIV5_ROLES };
static BEYOND_EARTH_LAYOUT: VariantLayout = VariantLayout {
    roles: &BEYOND_EARTH_ROLES,
};

impl Variant {
    pub fn layout(self) -> &'static VariantLayout {
        match self {
            Self::Civ5 => &CIV5_LAYOUT,
            Self::BeyondEarth => &BEYOND_EARTH_LAYOUT,
        }
    }
}

impl VariantLayout {
    pub fn role_at(&self, ordinal: usize) -> Option<ChunkRole> {
        self.roles
            .iter()
            .find(|(at, _)| *at == ordinal)
            .map(|(_, role)| *role)
    }

    pub fn classify(&self, ordinal: usize) -> Classification {
        match self.role_at(ordinal) {
            None => Classification::Unclassified,
            Some(role) if role.is_tentative() => Classification::Tentative(role),
            Some(role) => Classification::Confirmed(role),
        }
    }

    /// Every ordinal holding `role`, in file order. For status this is the
    /// primary table followed by its mirror.
    pub fn ordinals_of(&self, role: ChunkRole) -> Vec<usize> {
        self.roles
            .iter()
            .filter(|(_, r)| *r == role)
            .map(|(at, _)| *at)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_ordinals_match_for_both_variants() {
        for variant in Variant::ALL {
            let layout = variant.layout();
            assert_eq!(layout.role_at(1), Some(ChunkRole::DisplayNames));
            assert_eq!(layout.role_at(2), Some(ChunkRole::Status));
            assert_eq!(layout.role_at(6), Some(ChunkRole::CivilizationNames));
            assert_eq!(layout.role_at(7), Some(ChunkRole::Leaders));
            assert_eq!(layout.role_at(11), Some(ChunkRole::Passwords));
            assert_eq!(layout.role_at(0), None);
        }
    }

    #[test]
    fn beyond_earth_shifts_colors_and_status_mirror() {
        assert_eq!(Variant::Civ5.layout().ordinals_of(ChunkRole::Colors), vec![23]);
        assert_eq!(
            Variant::Civ5.layout().ordinals_of(ChunkRole::Status),
            vec![2, 26]
        );
        assert_eq!(
            Variant::BeyondEarth.layout().ordinals_of(ChunkRole::Colors),
            vec![26]
        );
        assert_eq!(
            Variant::BeyondEarth.layout().ordinals_of(ChunkRole::Status),
            vec![2, 29]
        );
    }

    #[test]
    fn colors_are_tentative() {
        assert_eq!(
            Variant::Civ5.layout().classify(23),
            Classification::Tentative(ChunkRole::Colors)
        );
        assert_eq!(
            Variant::Civ5.layout().classify(26),
            Classification::Confirmed(ChunkRole::Status)
        );
        assert_eq!(
            Variant::BeyondEarth.layout().classify(23),
            Classification::Unclassified
        );
    }
}
