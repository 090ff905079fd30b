//! Fixed pools a team's identity is drawn from.
//!
//! New teams prefer values no other team uses yet; once a pool is exhausted
//! values are reused.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

pub const TEAM_COLORS: [&str; 14] = [
    "#7CB9E8", // bright blue
    "#F0B6D5", // bright pink
    "#98FB98", // pale green
    "#FFB347", // pastel orange
    "#87CEEB", // sky blue
    "#DDA0DD", // plum
    "#F4C430", // saffron
    "#FF69B4", // hot pink
    "#98FF98", // mint green
    "#E6E6FA", // lavender
    "#FFA07A", // light salmon
    "#9370DB", // medium purple
    "#40E0D0", // turquoise
    "#FFBF00", // amber
];

pub const TEAM_ICONS: [&str; 14] = [
    "Star",
    "Lightning",
    "Rocket",
    "Fire",
    "Waves",
    "Snowflake",
    "Flame",
    "Sparkle",
    "Flare",
    "Flower",
    "Mind",
    "Cloud",
    "Leaf",
    "Wind",
];

pub const TEAM_NAME_SUGGESTIONS: [&str; 30] = [
    "Dill-icious Dynamos",
    "Mighty Picklers",
    "Smash and Dash",
    "The Pickle Paddlers",
    "Net Ninjas",
    "Dill Pickle Power",
    "The Court Jesters",
    "Rally Rascals",
    "Paddle Pushers",
    "The Pickleball Wizards",
    "Holcomb Heroes",
    "The Dilly Dallyers",
    "Ace Avengers",
    "The Smash Bros",
    "Pickleball Pirates",
    "The Net Setters",
    "Rally Rebels",
    "The Court Crushers",
    "Paddle Warriors",
    "The Pickleball Posse",
    "Burton Ballers",
    "The Pickleball Panthers",
    "Dill-ightful Players",
    "The Smash Sisters/Brothers",
    "The Net Navigators",
    "Rally Rockstars",
    "The Paddle Pals",
    "The Court Commanders",
    "The Pickleball Phantoms",
    "Dill-ight Brigade",
];

/// A color and icon pair handed out together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub color: &'static str,
    pub icon_name: &'static str,
}

/// returns the palette entry matching `color`, ignoring the case of the hex digits
pub fn color(color: &str) -> Option<&'static str> {
    TEAM_COLORS
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(color))
}

pub fn icon(name: &str) -> Option<&'static str> {
    TEAM_ICONS.iter().copied().find(|candidate| *candidate == name)
}

pub fn pick_color<R: Rng + ?Sized>(used: &[&str], rng: &mut R) -> &'static str {
    pick(&TEAM_COLORS, used, rng)
}

pub fn pick_icon<R: Rng + ?Sized>(used: &[&str], rng: &mut R) -> &'static str {
    pick(&TEAM_ICONS, used, rng)
}

pub fn pick_name<R: Rng + ?Sized>(used: &[&str], rng: &mut R) -> &'static str {
    pick(&TEAM_NAME_SUGGESTIONS, used, rng)
}

/// Shuffles both pools independently and deals out `count` identities.
///
/// Up to the pool size every identity has a distinct color and a distinct icon.
pub fn deal<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Identity> {
    let mut colors = TEAM_COLORS;
    let mut icons = TEAM_ICONS;
    colors.shuffle(rng);
    icons.shuffle(rng);

    (0..count)
        .map(|index| Identity {
            color: colors[index % colors.len()],
            icon_name: icons[index % icons.len()],
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], used: &[&str], rng: &mut R) -> &'static str {
    let used: HashSet<&str> = used.iter().copied().collect();
    let unused: Vec<&'static str> = pool
        .iter()
        .copied()
        .filter(|value| !used.contains(value))
        .collect();

    unused
        .choose(rng)
        .or_else(|| pool.choose(rng))
        .copied()
        .unwrap_or(pool[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn unused_colors_are_preferred() {
        let mut rng = rng();
        let used: Vec<&str> = TEAM_COLORS[..13].to_vec();

        for _ in 0..20 {
            assert_eq!(pick_color(&used, &mut rng), "#FFBF00");
        }
    }

    #[test]
    fn unused_icons_are_preferred() {
        let mut rng = rng();
        let used: Vec<&str> = TEAM_ICONS.iter().copied().filter(|i| *i != "Mind").collect();

        assert_eq!(pick_icon(&used, &mut rng), "Mind");
    }

    #[test]
    fn exhausted_pools_are_reused() {
        let mut rng = rng();

        let color = pick_color(&TEAM_COLORS, &mut rng);
        assert!(TEAM_COLORS.contains(&color));

        let icon = pick_icon(&TEAM_ICONS, &mut rng);
        assert!(TEAM_ICONS.contains(&icon));
    }

    #[test]
    fn teams_created_one_by_one_get_distinct_colors() {
        let mut rng = rng();
        let mut used: Vec<&str> = Vec::new();

        for _ in 0..TEAM_COLORS.len() {
            let color = pick_color(&used, &mut rng);
            assert!(!used.contains(&color));
            used.push(color);
        }
    }

    #[test]
    fn suggested_names_skip_existing_teams() {
        let mut rng = rng();
        let used: Vec<&str> = TEAM_NAME_SUGGESTIONS[1..].to_vec();

        assert_eq!(pick_name(&used, &mut rng), "Dill-icious Dynamos");
    }

    #[test]
    fn dealt_identities_are_distinct_up_to_the_pool_size() {
        let mut rng = rng();
        let identities = deal(TEAM_COLORS.len(), &mut rng);

        let colors: HashSet<&str> = identities.iter().map(|i| i.color).collect();
        let icons: HashSet<&str> = identities.iter().map(|i| i.icon_name).collect();

        assert_eq!(colors.len(), TEAM_COLORS.len());
        assert_eq!(icons.len(), TEAM_ICONS.len());
    }

    #[test]
    fn dealing_more_than_the_pool_wraps_around() {
        let mut rng = rng();
        let identities = deal(TEAM_COLORS.len() + 2, &mut rng);

        assert_eq!(identities.len(), TEAM_COLORS.len() + 2);
        assert_eq!(identities[0], identities[TEAM_COLORS.len()]);
    }

    #[test]
    fn palette_lookups() {
        assert_eq!(color("#7cb9e8"), Some("#7CB9E8"));
        assert_eq!(color("#000000"), None);
        assert_eq!(icon("Rocket"), Some("Rocket"));
        assert_eq!(icon("rocket"), None);
    }
}
