//! Ngũ Hành (Five Elements) system
//!
//! The conquering cycle (tương khắc): Kim → Mộc → Thổ → Thủy → Hỏa → Kim.

use serde::{Deserialize, Serialize};

/// The five elements. Every character, dragon, and elemental skill carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Kim,  // Metal
    Moc,  // Wood
    Thuy, // Water
    Hoa,  // Fire
    Tho,  // Earth
}

pub const ALL_ELEMENTS: [Element; 5] = [
    Element::Kim,
    Element::Moc,
    Element::Thuy,
    Element::Hoa,
    Element::Tho,
];

impl Element {
    /// The element this element conquers (khắc).
    pub fn conquers(&self) -> Element {
        match self {
            Element::Kim => Element::Moc,
            Element::Moc => Element::Tho,
            Element::Tho => Element::Thuy,
            Element::Thuy => Element::Hoa,
            Element::Hoa => Element::Kim,
        }
    }

    /// The element this element is conquered by (bị khắc).
    pub fn conquered_by(&self) -> Element {
        match self {
            Element::Kim => Element::Hoa,
            Element::Moc => Element::Kim,
            Element::Tho => Element::Moc,
            Element::Thuy => Element::Tho,
            Element::Hoa => Element::Thuy,
        }
    }

    /// Damage multiplier when this element attacks `defender`.
    ///
    /// 1.5 on advantage, 0.7 on disadvantage, 1.0 otherwise.
    pub fn multiplier(&self, defender: Element) -> f64 {
        if self.conquers() == defender {
            1.5
        } else if self.conquered_by() == defender {
            0.7
        } else {
            1.0
        }
    }

    /// Display name with diacritics.
    pub fn display_name(&self) -> &'static str {
        match self {
            Element::Kim => "Kim",
            Element::Moc => "Mộc",
            Element::Thuy => "Thủy",
            Element::Hoa => "Hỏa",
            Element::Tho => "Thổ",
        }
    }

    /// Lowercase tag used in the database and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Kim => "kim",
            Element::Moc => "moc",
            Element::Thuy => "thuy",
            Element::Hoa => "hoa",
            Element::Tho => "tho",
        }
    }

    pub fn parse(s: &str) -> Option<Element> {
        match s {
            "kim" => Some(Element::Kim),
            "moc" => Some(Element::Moc),
            "thuy" => Some(Element::Thuy),
            "hoa" => Some(Element::Hoa),
            "tho" => Some(Element::Tho),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conquering_cycle_is_a_bijection() {
        // Each element conquers exactly one element and is conquered by exactly one
        let mut conquered = std::collections::HashSet::new();
        let mut conquerors = std::collections::HashSet::new();
        for e in ALL_ELEMENTS {
            conquered.insert(e.conquers());
            conquerors.insert(e.conquered_by());
        }
        assert_eq!(conquered.len(), 5);
        assert_eq!(conquerors.len(), 5);
    }

    #[test]
    fn conquers_and_conquered_by_agree() {
        for e in ALL_ELEMENTS {
            assert_eq!(e.conquers().conquered_by(), e);
        }
    }

    #[test]
    fn cycle_closes_after_five_steps() {
        let mut e = Element::Kim;
        for _ in 0..5 {
            e = e.conquers();
        }
        assert_eq!(e, Element::Kim);
    }

    #[test]
    fn multiplier_values() {
        // Kim khắc Mộc
        assert_eq!(Element::Kim.multiplier(Element::Moc), 1.5);
        // Hỏa khắc Kim, so Kim attacking Hỏa is at a disadvantage
        assert_eq!(Element::Kim.multiplier(Element::Hoa), 0.7);
        // Kim vs Thủy is neutral
        assert_eq!(Element::Kim.multiplier(Element::Thuy), 1.0);
        assert_eq!(Element::Kim.multiplier(Element::Kim), 1.0);
    }

    #[test]
    fn parse_round_trips() {
        for e in ALL_ELEMENTS {
            assert_eq!(Element::parse(e.as_str()), Some(e));
        }
        assert_eq!(Element::parse("void"), None);
    }
}
