//! Gacha banner definitions: rarity rates, pull costs, pity, and rate-up.

pub struct BannerDef {
    pub id: &'static str,
    pub name: &'static str,
    /// (rarity, rate percent); rates sum to 100, listed highest rarity first.
    pub rates: &'static [(u32, u32)],
    pub pity_threshold: u32,
    pub cost_single: u64,
    pub cost_multi: u64,
    pub featured: Option<&'static str>,
    /// Percent chance that a 5-star pull is the featured hero.
    pub featured_rate_up: u32,
}

pub const BANNERS: &[BannerDef] = &[
    BannerDef {
        id: "standard",
        name: "Banner Tiêu Chuẩn",
        rates: &[(5, 2), (4, 18), (3, 80)],
        pity_threshold: 90,
        cost_single: 160,
        cost_multi: 1440,
        featured: None,
        featured_rate_up: 0,
    },
    BannerDef {
        id: "limited_quan_vu",
        name: "Banner Quan Vũ",
        rates: &[(5, 5), (4, 20), (3, 75)],
        pity_threshold: 80,
        cost_single: 160,
        cost_multi: 1440,
        featured: Some("quan_vu"),
        featured_rate_up: 50,
    },
];

pub fn get_banner(id: &str) -> Option<&'static BannerDef> {
    BANNERS.iter().find(|b| b.id == id)
}

impl BannerDef {
    /// Map a uniform roll in [0, 100) to a rarity, walking the rate table
    /// from the rarest entry down.
    pub fn rarity_for_roll(&self, roll: f64) -> u32 {
        let mut cumulative = 0.0;
        for (rarity, rate) in self.rates {
            cumulative += *rate as f64;
            if roll < cumulative {
                return *rarity;
            }
        }
        // Rates sum to 100, so this only triggers on a degenerate table
        self.rates.last().map(|(r, _)| *r).unwrap_or(3)
    }
}
