//! Team balancing and spawn placement

use glam::Vec2;
use rand::Rng;

use super::field::{self, CENTER_CLEARANCE, PLAYER_RADIUS};
use super::Team;

/// Team for a newly joining player: the smaller side, ties broken at random
pub fn next_team<R: Rng + ?Sized>(sizes: [usize; 2], rng: &mut R) -> Team {
    match sizes[0].cmp(&sizes[1]) {
        std::cmp::Ordering::Less => Team::Left,
        std::cmp::Ordering::Greater => Team::Right,
        std::cmp::Ordering::Equal => {
            if rng.gen_bool(0.5) {
                Team::Left
            } else {
                Team::Right
            }
        }
    }
}

/// Random spot in `team`'s half, inset by the player radius and kept out of
/// the center restart zone
pub fn placement<R: Rng + ?Sized>(team: Team, rng: &mut R) -> Vec2 {
    let hfw = field::half_width() - PLAYER_RADIUS;
    let hfh = field::half_height() - PLAYER_RADIUS;

    let x = rng.gen_range(0.0..hfw) * team.side();
    let y = rng.gen_range(-hfh..hfh);
    let pos = Vec2::new(x, y);

    let dist = pos.length();
    if dist >= CENTER_CLEARANCE {
        return pos;
    }
    let dir = if dist > f32::EPSILON {
        pos / dist
    } else {
        Vec2::new(team.side(), 0.0)
    };
    dir * CENTER_CLEARANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_smaller_team_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(next_team([0, 1], &mut rng), Team::Left);
        assert_eq!(next_team([3, 2], &mut rng), Team::Right);
    }

    #[test]
    fn test_ties_pick_both_sides() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picks: Vec<Team> = (0..64).map(|_| next_team([2, 2], &mut rng)).collect();

        assert!(picks.contains(&Team::Left));
        assert!(picks.contains(&Team::Right));
    }

    #[test]
    fn test_placement_stays_in_own_half_and_out_of_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            for team in [Team::Left, Team::Right] {
                let pos = placement(team, &mut rng);

                assert!(pos.x * team.side() >= 0.0, "{pos} not in half of team {team}");
                assert!(pos.x.abs() <= field::half_width() - PLAYER_RADIUS + 1e-3);
                assert!(pos.y.abs() <= field::half_height() - PLAYER_RADIUS + 1e-3);
                assert!(pos.length() >= CENTER_CLEARANCE - 1e-3);
            }
        }
    }
}
